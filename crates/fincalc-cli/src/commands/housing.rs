use clap::Args;
use rust_decimal::Decimal;

use fincalc_core::housing::rent_affordability::{self, RentAffordabilityInput};

use super::{required, resolve_input, CommandResult};

/// Arguments for the rent affordability calculator
#[derive(Args)]
pub struct RentArgs {
    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Annual gross income
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Existing monthly debt payments
    #[arg(long, default_value = "0")]
    pub debts: Decimal,

    /// Rent-to-income ratio (default 0.30)
    #[arg(long)]
    pub ratio: Option<Decimal>,

    /// Maximum debt-to-income ratio (default 0.36)
    #[arg(long)]
    pub dti: Option<Decimal>,

    /// Rent to check against the recommendation
    #[arg(long)]
    pub desired: Option<Decimal>,
}

pub fn run_rent(args: RentArgs) -> CommandResult {
    let input: RentAffordabilityInput = resolve_input(args.input.as_deref(), || {
        Ok(RentAffordabilityInput {
            annual_income: required(args.income, "income")?,
            monthly_debt_payments: args.debts,
            rent_to_income_ratio: args.ratio,
            max_debt_to_income: args.dti,
            desired_rent: args.desired,
        })
    })?;

    let result = rent_affordability::calculate_rent_affordability(&input)?;
    Ok(serde_json::to_value(result)?)
}
