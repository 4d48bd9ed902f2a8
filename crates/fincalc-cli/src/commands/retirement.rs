use clap::Args;
use rust_decimal::Decimal;

use fincalc_core::retirement::k401::{self, K401Input, MatchTier};

use super::{required, resolve_input, CommandResult};

/// Arguments for the 401(k) projection.
///
/// Flags describe a single match tier; multi-tier formulas need `--input`.
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct K401Args {
    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[arg(long)]
    pub current_age: Option<u32>,

    #[arg(long, default_value = "67")]
    pub retirement_age: u32,

    #[arg(long, default_value = "90")]
    pub life_expectancy: u32,

    /// Annual salary
    #[arg(long)]
    pub salary: Option<Decimal>,

    /// Current 401(k) balance
    #[arg(long, default_value = "0")]
    pub balance: Decimal,

    /// Employee contribution as a share of salary
    #[arg(long)]
    pub contribution_rate: Option<Decimal>,

    /// Employer dollars per employee dollar
    #[arg(long, default_value = "0")]
    pub match_rate: Decimal,

    /// Share of salary the employer matches
    #[arg(long, default_value = "0")]
    pub match_limit: Decimal,

    #[arg(long, default_value = "0.03")]
    pub salary_growth: Decimal,

    /// Expected annual return
    #[arg(long = "return", default_value = "0.06")]
    pub annual_return: Decimal,

    #[arg(long, default_value = "0.025")]
    pub inflation: Decimal,

    /// Override the annual deferral limit
    #[arg(long)]
    pub limit: Option<Decimal>,

    /// Ignore the age-50 catch-up allowance
    #[arg(long)]
    pub no_catch_up: bool,
}

pub fn run_k401(args: K401Args) -> CommandResult {
    let input: K401Input = resolve_input(args.input.as_deref(), || {
        let employer_match = if args.match_rate > Decimal::ZERO && args.match_limit > Decimal::ZERO {
            vec![MatchTier {
                match_rate: args.match_rate,
                up_to_salary_pct: args.match_limit,
            }]
        } else {
            Vec::new()
        };
        Ok(K401Input {
            current_age: required(args.current_age, "current-age")?,
            retirement_age: args.retirement_age,
            life_expectancy: args.life_expectancy,
            annual_salary: required(args.salary, "salary")?,
            current_balance: args.balance,
            contribution_rate: required(args.contribution_rate, "contribution-rate")?,
            employer_match,
            salary_growth_rate: args.salary_growth,
            annual_return: args.annual_return,
            inflation_rate: args.inflation,
            contribution_limit: args.limit,
            catch_up_eligible: !args.no_catch_up,
        })
    })?;

    let result = k401::calculate_k401(&input)?;
    Ok(serde_json::to_value(result)?)
}
