use clap::Args;
use rust_decimal::Decimal;

use fincalc_core::payment::loan_payment::{self, LoanPaymentInput, PaymentMode};

use super::{required, resolve_input, CommandResult, FrequencyArg};

/// Arguments for the loan payment calculator
#[derive(Args)]
pub struct PaymentArgs {
    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan amount
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Annual interest rate as a decimal (0.05 = 5%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in years; solves for the payment
    #[arg(long, conflicts_with = "payment")]
    pub years: Option<Decimal>,

    /// Payment per period; solves for the term
    #[arg(long)]
    pub payment: Option<Decimal>,

    /// Payment frequency
    #[arg(long, value_enum, default_value = "monthly")]
    pub frequency: FrequencyArg,

    /// Amount left outstanding after the last regular payment
    #[arg(long)]
    pub balloon: Option<Decimal>,
}

pub fn run_payment(args: PaymentArgs) -> CommandResult {
    let input: LoanPaymentInput = resolve_input(args.input.as_deref(), || {
        let mode = match (args.years, args.payment) {
            (_, Some(payment)) => PaymentMode::FixedPayment { payment },
            (years, None) => PaymentMode::FixedTerm {
                years: required(years, "years")?,
            },
        };
        Ok(LoanPaymentInput {
            loan_amount: required(args.amount, "amount")?,
            annual_rate: required(args.rate, "rate")?,
            frequency: args.frequency.into(),
            mode,
            balloon: args.balloon,
        })
    })?;

    let result = loan_payment::calculate_loan_payment(&input)?;
    Ok(serde_json::to_value(result)?)
}
