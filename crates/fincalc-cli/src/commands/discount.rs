use clap::Args;
use rust_decimal::Decimal;

use fincalc_core::discount::pricing::{self, DiscountInput, DiscountKind};

use super::{required, resolve_input, CommandResult};

/// Arguments for the discount calculator
#[derive(Args)]
pub struct DiscountArgs {
    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Original price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Percent off as a decimal (0.2 = 20%)
    #[arg(long, conflicts_with = "amount_off")]
    pub percent: Option<Decimal>,

    /// Flat amount off
    #[arg(long)]
    pub amount_off: Option<Decimal>,

    /// Additional percent off, applied after the previous discounts (repeatable)
    #[arg(long)]
    pub extra: Vec<Decimal>,

    /// Sales tax rate applied to the discounted price
    #[arg(long)]
    pub tax: Option<Decimal>,
}

/// Arguments for solving the discount rate
#[derive(Args)]
pub struct DiscountRateArgs {
    /// Original price
    #[arg(long)]
    pub price: Decimal,

    /// Sale price
    #[arg(long)]
    pub sale: Decimal,
}

pub fn run_discount(args: DiscountArgs) -> CommandResult {
    let input: DiscountInput = resolve_input(args.input.as_deref(), || {
        let discount = match (args.percent, args.amount_off) {
            (Some(rate), _) => DiscountKind::PercentOff(rate),
            (None, Some(amount)) => DiscountKind::AmountOff(amount),
            (None, None) => return Err("--percent or --amount-off is required (or provide --input)".into()),
        };
        Ok(DiscountInput {
            list_price: required(args.price, "price")?,
            discount,
            additional_discounts: args.extra,
            sales_tax_rate: args.tax,
        })
    })?;

    let result = pricing::calculate_discount(&input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_discount_rate(args: DiscountRateArgs) -> CommandResult {
    let result = pricing::solve_discount_rate(args.price, args.sale)?;
    Ok(serde_json::to_value(result)?)
}
