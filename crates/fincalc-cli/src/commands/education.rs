use clap::Args;
use rust_decimal::Decimal;

use fincalc_core::education::college_cost::{self, CollegeCostInput};

use super::{required, resolve_input, CommandResult};

/// Arguments for the college cost calculator
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct CollegeArgs {
    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Today's annual cost of attendance
    #[arg(long)]
    pub cost: Option<Decimal>,

    #[arg(long)]
    pub years_until: Option<u32>,

    #[arg(long, default_value = "4")]
    pub years_in_college: u32,

    /// Annual increase in college costs
    #[arg(long, default_value = "0.05")]
    pub inflation: Decimal,

    #[arg(long, default_value = "0")]
    pub savings: Decimal,

    /// Expected annual return on savings
    #[arg(long = "return", default_value = "0.06")]
    pub annual_return: Decimal,

    /// Share of the cost paid from savings
    #[arg(long, default_value = "1")]
    pub share: Decimal,
}

pub fn run_college(args: CollegeArgs) -> CommandResult {
    let input: CollegeCostInput = resolve_input(args.input.as_deref(), || {
        Ok(CollegeCostInput {
            current_annual_cost: required(args.cost, "cost")?,
            years_until_college: required(args.years_until, "years-until")?,
            years_in_college: args.years_in_college,
            cost_inflation: args.inflation,
            current_savings: args.savings,
            annual_return: args.annual_return,
            share_funded: args.share,
        })
    })?;

    let result = college_cost::calculate_college_cost(&input)?;
    Ok(serde_json::to_value(result)?)
}
