use clap::Args;
use rust_decimal::Decimal;

use fincalc_core::credit_card::payoff::{
    self, CreditCardPayoffInput, PayoffStrategy, DEFAULT_MINIMUM_FLOOR, DEFAULT_MINIMUM_PERCENT,
};

use super::{required, resolve_input, CommandResult};

/// Arguments for the credit card payoff calculator.
///
/// Without `--payment` or `--months` the card is paid at the issuer minimum.
#[derive(Args)]
pub struct CreditCardArgs {
    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Current balance
    #[arg(long)]
    pub balance: Option<Decimal>,

    /// APR as a decimal (0.1999 = 19.99%)
    #[arg(long)]
    pub apr: Option<Decimal>,

    /// Fixed monthly payment
    #[arg(long, conflicts_with = "months")]
    pub payment: Option<Decimal>,

    /// Pay off in this many months
    #[arg(long)]
    pub months: Option<u32>,

    /// Minimum payment as a share of the balance
    #[arg(long)]
    pub min_percent: Option<Decimal>,

    /// Minimum payment floor
    #[arg(long)]
    pub min_floor: Option<Decimal>,

    /// Minimum payment excludes the month's interest
    #[arg(long)]
    pub min_without_interest: bool,
}

pub fn run_credit_card(args: CreditCardArgs) -> CommandResult {
    let input: CreditCardPayoffInput = resolve_input(args.input.as_deref(), || {
        let strategy = match (args.payment, args.months) {
            (Some(payment), _) => PayoffStrategy::FixedPayment { payment },
            (None, Some(months)) => PayoffStrategy::PayoffInMonths { months },
            (None, None) => PayoffStrategy::MinimumPayment {
                percent_of_balance: args.min_percent.unwrap_or(DEFAULT_MINIMUM_PERCENT),
                floor: args.min_floor.unwrap_or(DEFAULT_MINIMUM_FLOOR),
                plus_interest: !args.min_without_interest,
            },
        };
        Ok(CreditCardPayoffInput {
            balance: required(args.balance, "balance")?,
            apr: required(args.apr, "apr")?,
            strategy,
        })
    })?;

    let result = payoff::calculate_credit_card_payoff(&input)?;
    Ok(serde_json::to_value(result)?)
}
