use clap::Args;
use rust_decimal::Decimal;

use fincalc_core::annuity::payout::{self, AnnuityPayoutInput, PayoutMode};

use super::{required, resolve_input, timing, CommandResult, FrequencyArg};

/// Arguments for the annuity payout calculator
#[derive(Args)]
pub struct AnnuityArgs {
    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Starting principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Expected annual return as a decimal
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Payout length in years; solves for the payment
    #[arg(long, conflicts_with = "payment")]
    pub years: Option<Decimal>,

    /// Payout per period; solves for how long it lasts
    #[arg(long)]
    pub payment: Option<Decimal>,

    #[arg(long, value_enum, default_value = "monthly")]
    pub frequency: FrequencyArg,

    /// Payments at the start of each period (annuity due)
    #[arg(long)]
    pub due: bool,
}

pub fn run_annuity(args: AnnuityArgs) -> CommandResult {
    let input: AnnuityPayoutInput = resolve_input(args.input.as_deref(), || {
        let mode = match args.payment {
            Some(payment) => PayoutMode::FixedPayment { payment },
            None => PayoutMode::FixedLength {
                years: required(args.years, "years")?,
            },
        };
        Ok(AnnuityPayoutInput {
            principal: required(args.principal, "principal")?,
            annual_rate: required(args.rate, "rate")?,
            frequency: args.frequency.into(),
            timing: timing(args.due),
            mode,
        })
    })?;

    let result = payout::calculate_annuity_payout(&input)?;
    Ok(serde_json::to_value(result)?)
}
