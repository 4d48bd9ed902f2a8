use clap::Args;
use rust_decimal::Decimal;

use fincalc_core::lease::lease_payment::{self, AutoLeaseInput, LeaseInput, ResidualValue};

use super::{required, resolve_input, timing, CommandResult};

/// Arguments for a general lease
#[derive(Args)]
pub struct LeaseArgs {
    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Asset value at inception
    #[arg(long)]
    pub asset_value: Option<Decimal>,

    /// Residual value at the end of the term
    #[arg(long)]
    pub residual: Option<Decimal>,

    /// Annual rate as a decimal
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub months: Option<u32>,

    /// Payments made in advance
    #[arg(long)]
    pub advance: bool,
}

/// Arguments for a dealer-style auto lease
#[derive(Args)]
pub struct AutoLeaseArgs {
    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Negotiated vehicle price
    #[arg(long)]
    pub price: Option<Decimal>,

    #[arg(long, default_value = "0")]
    pub down_payment: Decimal,

    #[arg(long, default_value = "0")]
    pub trade_in: Decimal,

    /// Fees rolled into the capitalized cost
    #[arg(long, default_value = "0")]
    pub fees: Decimal,

    /// Residual as an amount
    #[arg(long, conflicts_with = "residual_percent")]
    pub residual: Option<Decimal>,

    /// Residual as a share of the price (0.55 = 55%)
    #[arg(long)]
    pub residual_percent: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub months: Option<u32>,

    /// APR as a decimal
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Sales tax on each payment as a decimal
    #[arg(long, default_value = "0")]
    pub tax: Decimal,
}

pub fn run_lease(args: LeaseArgs) -> CommandResult {
    let input: LeaseInput = resolve_input(args.input.as_deref(), || {
        Ok(LeaseInput {
            asset_value: required(args.asset_value, "asset-value")?,
            residual_value: required(args.residual, "residual")?,
            annual_rate: required(args.rate, "rate")?,
            term_months: required(args.months, "months")?,
            timing: timing(args.advance),
        })
    })?;

    let result = lease_payment::calculate_lease(&input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_auto_lease(args: AutoLeaseArgs) -> CommandResult {
    let input: AutoLeaseInput = resolve_input(args.input.as_deref(), || {
        let residual = match (args.residual, args.residual_percent) {
            (Some(amount), _) => ResidualValue::Amount(amount),
            (None, Some(pct)) => ResidualValue::PercentOfPrice(pct),
            (None, None) => {
                return Err("--residual or --residual-percent is required (or provide --input)".into())
            }
        };
        Ok(AutoLeaseInput {
            vehicle_price: required(args.price, "price")?,
            down_payment: args.down_payment,
            trade_in_value: args.trade_in,
            capitalized_fees: args.fees,
            residual,
            term_months: required(args.months, "months")?,
            annual_rate: required(args.rate, "rate")?,
            sales_tax_rate: args.tax,
        })
    })?;

    let result = lease_payment::calculate_auto_lease(&input)?;
    Ok(serde_json::to_value(result)?)
}
