//! Lease payments.
//!
//! `calculate_lease` treats a lease as a loan on the asset value that is
//! amortized down to the residual value, so the schedule ends at the residual
//! instead of zero. `calculate_auto_lease` follows the dealer convention of
//! splitting the monthly payment into a depreciation fee, a finance fee
//! priced with the money factor, and sales tax on both.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{amortize_fixed_term, summarize_by_year, AmortizationRow, YearSummary};
use crate::error::FinCalcError;
use crate::time_value::balloon_payment;
use crate::types::{with_metadata, ComputationOutput, Money, PaymentTiming, Rate};
use crate::validation::{reject_findings, Validator};
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// APR (in percent) divided by 2400 gives the money factor; as a decimal
/// rate the divisor is 24.
const MONEY_FACTOR_DIVISOR: Decimal = dec!(24);
const MAX_LEASE_TERM_MONTHS: u32 = 120;

// ---------------------------------------------------------------------------
// General lease
// ---------------------------------------------------------------------------

/// Input for a general lease payment calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseInput {
    /// Value of the leased asset at inception
    pub asset_value: Money,
    /// Value expected to remain at the end of the term
    pub residual_value: Money,
    /// Annual interest rate implicit in the lease
    pub annual_rate: Rate,
    pub term_months: u32,
    /// `Beginning` for payments made in advance
    #[serde(default)]
    pub timing: PaymentTiming,
}

/// Output of a general lease calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseOutput {
    pub monthly_payment: Money,
    pub total_payments: Money,
    pub total_interest: Money,
    /// Depreciation of the asset over the term (value less residual)
    pub total_depreciation: Money,
    pub residual_value: Money,
    pub schedule: Vec<AmortizationRow>,
    pub annual_summary: Vec<YearSummary>,
}

/// Range checks for [`LeaseInput`].
pub fn validate_lease(input: &LeaseInput) -> Vec<String> {
    let mut v = Validator::new();
    v.positive("Asset value", input.asset_value)
        .non_negative("Residual value", input.residual_value)
        .range("Interest rate", input.annual_rate, dec!(0), dec!(0.40))
        .range_u32("Lease term (months)", input.term_months, 1, MAX_LEASE_TERM_MONTHS);
    v.finish()
}

/// Monthly lease payment with the residual value treated as a balloon.
///
/// A residual at or above the asset value leaves nothing to amortize and is
/// rejected as a financial impossibility.
pub fn calculate_lease(input: &LeaseInput) -> FinCalcResult<ComputationOutput<LeaseOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    reject_findings(validate_lease(input))?;

    if input.residual_value >= input.asset_value {
        return Err(FinCalcError::FinancialImpossibility(format!(
            "Residual value {} must be less than the asset value {}",
            input.residual_value, input.asset_value
        )));
    }

    let rate = input.annual_rate / dec!(12);
    let payment = balloon_payment(
        input.asset_value,
        rate,
        input.term_months,
        input.residual_value,
        input.timing,
    )?;

    let run = amortize_fixed_term(
        input.asset_value,
        rate,
        payment,
        input.term_months,
        input.residual_value,
        input.timing,
    );

    log::debug!("lease: payment={payment} residual={}", input.residual_value);

    let annual_summary = summarize_by_year(&run.rows, 12);
    let output = LeaseOutput {
        monthly_payment: payment,
        total_payments: run.total_paid,
        total_interest: run.total_interest,
        total_depreciation: input.asset_value - input.residual_value,
        residual_value: input.residual_value,
        schedule: run.rows,
        annual_summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Lease Payment (annuity with residual balloon)",
        &serde_json::json!({
            "asset_value": input.asset_value.to_string(),
            "residual_value": input.residual_value.to_string(),
            "annual_rate": input.annual_rate.to_string(),
            "term_months": input.term_months,
            "timing": format!("{:?}", input.timing),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Auto lease
// ---------------------------------------------------------------------------

/// How the residual of a vehicle lease is quoted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResidualValue {
    Amount(Money),
    /// Share of the vehicle price (e.g. 0.55 = 55%)
    PercentOfPrice(Rate),
}

/// Input for a dealer-style auto lease.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoLeaseInput {
    pub vehicle_price: Money,
    #[serde(default)]
    pub down_payment: Money,
    #[serde(default)]
    pub trade_in_value: Money,
    /// Acquisition and dealer fees rolled into the capitalized cost
    #[serde(default)]
    pub capitalized_fees: Money,
    pub residual: ResidualValue,
    pub term_months: u32,
    /// Annual percentage rate, converted to a money factor
    pub annual_rate: Rate,
    /// Sales tax charged on each monthly payment
    #[serde(default)]
    pub sales_tax_rate: Rate,
}

/// Breakdown of a dealer-style auto lease payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoLeaseOutput {
    pub money_factor: Decimal,
    pub gross_capitalized_cost: Money,
    pub net_capitalized_cost: Money,
    pub residual_value: Money,
    pub monthly_depreciation: Money,
    pub monthly_finance_charge: Money,
    pub monthly_tax: Money,
    pub monthly_payment: Money,
    pub total_of_payments: Money,
    pub total_finance_charges: Money,
    /// Payments plus the down payment and trade-in given up
    pub total_lease_cost: Money,
}

/// Range checks for [`AutoLeaseInput`].
pub fn validate_auto_lease(input: &AutoLeaseInput) -> Vec<String> {
    let mut v = Validator::new();
    v.positive("Vehicle price", input.vehicle_price)
        .non_negative("Down payment", input.down_payment)
        .non_negative("Trade-in value", input.trade_in_value)
        .non_negative("Capitalized fees", input.capitalized_fees)
        .range_u32("Lease term (months)", input.term_months, 1, MAX_LEASE_TERM_MONTHS)
        .range("Interest rate", input.annual_rate, dec!(0), dec!(0.40))
        .range("Sales tax", input.sales_tax_rate, dec!(0), dec!(0.25));

    match &input.residual {
        ResidualValue::Amount(amount) => {
            v.non_negative("Residual value", *amount);
        }
        ResidualValue::PercentOfPrice(pct) => {
            v.range("Residual percentage", *pct, dec!(0), dec!(1));
        }
    }

    v.finish()
}

/// Dealer-style monthly payment: depreciation + finance charge + tax.
pub fn calculate_auto_lease(
    input: &AutoLeaseInput,
) -> FinCalcResult<ComputationOutput<AutoLeaseOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    reject_findings(validate_auto_lease(input))?;

    let residual = match &input.residual {
        ResidualValue::Amount(amount) => *amount,
        ResidualValue::PercentOfPrice(pct) => input.vehicle_price * pct,
    };

    let gross_cap_cost = input.vehicle_price + input.capitalized_fees;
    let net_cap_cost = gross_cap_cost - input.down_payment - input.trade_in_value;

    if residual >= net_cap_cost {
        return Err(FinCalcError::FinancialImpossibility(format!(
            "Residual value {residual} must be less than the net capitalized cost {net_cap_cost}"
        )));
    }

    let term = Decimal::from(input.term_months);
    let money_factor = input.annual_rate / MONEY_FACTOR_DIVISOR;

    let depreciation = (net_cap_cost - residual) / term;
    let finance_charge = (net_cap_cost + residual) * money_factor;
    let tax = (depreciation + finance_charge) * input.sales_tax_rate;
    let monthly_payment = depreciation + finance_charge + tax;

    let total_of_payments = monthly_payment * term;
    let total_lease_cost = total_of_payments + input.down_payment + input.trade_in_value;

    if input.down_payment > gross_cap_cost * dec!(0.20) {
        warnings.push(
            "Down payment exceeds 20% of the capitalized cost; it is lost if the vehicle is totaled"
                .into(),
        );
    }

    log::debug!(
        "auto lease: net cap cost={net_cap_cost} residual={residual} payment={monthly_payment}"
    );

    let output = AutoLeaseOutput {
        money_factor,
        gross_capitalized_cost: gross_cap_cost,
        net_capitalized_cost: net_cap_cost,
        residual_value: residual,
        monthly_depreciation: depreciation,
        monthly_finance_charge: finance_charge,
        monthly_tax: tax,
        monthly_payment,
        total_of_payments,
        total_finance_charges: finance_charge * term,
        total_lease_cost,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Auto Lease (depreciation + money-factor finance charge)",
        &serde_json::json!({
            "vehicle_price": input.vehicle_price.to_string(),
            "term_months": input.term_months,
            "annual_rate": input.annual_rate.to_string(),
            "money_factor": money_factor.to_string(),
            "sales_tax_rate": input.sales_tax_rate.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_lease() -> LeaseInput {
        LeaseInput {
            asset_value: dec!(50_000),
            residual_value: dec!(20_000),
            annual_rate: dec!(0.06),
            term_months: 36,
            timing: PaymentTiming::End,
        }
    }

    fn sample_auto_lease() -> AutoLeaseInput {
        AutoLeaseInput {
            vehicle_price: dec!(40_000),
            down_payment: dec!(2_000),
            trade_in_value: Decimal::ZERO,
            capitalized_fees: Decimal::ZERO,
            residual: ResidualValue::PercentOfPrice(dec!(0.55)),
            term_months: 36,
            annual_rate: dec!(0.048),
            sales_tax_rate: dec!(0.07),
        }
    }

    #[test]
    fn test_lease_schedule_ends_at_residual() {
        let out = calculate_lease(&sample_lease()).unwrap().result;
        let last = out.schedule.last().unwrap();
        assert!((last.remaining_balance - dec!(20_000)).abs() < dec!(0.000001));
        assert_eq!(out.schedule.len(), 36);
        // Payments plus the discounted residual recover the asset value
        let r = dec!(0.005);
        let factor = crate::time_value::compound(r, 36);
        let pv = out.monthly_payment * (Decimal::ONE - Decimal::ONE / factor) / r
            + dec!(20_000) / factor;
        assert!((pv - dec!(50_000)).abs() < dec!(0.0001), "pv={pv}");
    }

    #[test]
    fn test_lease_in_advance_is_cheaper() {
        let arrears = calculate_lease(&sample_lease()).unwrap().result;
        let mut input = sample_lease();
        input.timing = PaymentTiming::Beginning;
        let advance = calculate_lease(&input).unwrap().result;
        assert!(advance.monthly_payment < arrears.monthly_payment);
        let last = advance.schedule.last().unwrap();
        assert!((last.remaining_balance - dec!(20_000)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_lease_zero_rate_is_straight_line() {
        let mut input = sample_lease();
        input.annual_rate = Decimal::ZERO;
        let out = calculate_lease(&input).unwrap().result;
        assert_eq!(out.monthly_payment, dec!(30_000) / dec!(36));
        assert_eq!(out.total_interest, Decimal::ZERO);
    }

    #[test]
    fn test_residual_at_asset_value_is_impossible() {
        let mut input = sample_lease();
        input.residual_value = dec!(50_000);
        let err = calculate_lease(&input).unwrap_err();
        assert!(matches!(err, FinCalcError::FinancialImpossibility(_)));
    }

    #[test]
    fn test_money_factor() {
        let out = calculate_auto_lease(&sample_auto_lease()).unwrap().result;
        // 4.8% / 2400 = 0.002
        assert_eq!(out.money_factor, dec!(0.002));
    }

    #[test]
    fn test_auto_lease_breakdown() {
        let out = calculate_auto_lease(&sample_auto_lease()).unwrap().result;
        // Net cap cost 38,000; residual 22,000
        assert_eq!(out.net_capitalized_cost, dec!(38_000));
        assert_eq!(out.residual_value, dec!(22_000));
        // Depreciation = 16,000 / 36
        assert_eq!(out.monthly_depreciation, dec!(16_000) / dec!(36));
        // Finance = 60,000 * 0.002 = 120
        assert_eq!(out.monthly_finance_charge, dec!(120));
        let pre_tax = out.monthly_depreciation + out.monthly_finance_charge;
        assert_eq!(out.monthly_tax, pre_tax * dec!(0.07));
        assert_eq!(out.monthly_payment, pre_tax + out.monthly_tax);
        assert_eq!(out.total_lease_cost, out.total_of_payments + dec!(2_000));
    }

    #[test]
    fn test_auto_lease_residual_above_cap_cost() {
        let mut input = sample_auto_lease();
        input.residual = ResidualValue::Amount(dec!(39_000));
        let err = calculate_auto_lease(&input).unwrap_err();
        assert!(matches!(err, FinCalcError::FinancialImpossibility(_)));
    }

    #[test]
    fn test_auto_lease_validation() {
        let mut input = sample_auto_lease();
        input.term_months = 0;
        input.annual_rate = dec!(0.45);
        input.residual = ResidualValue::PercentOfPrice(dec!(1.2));
        assert_eq!(validate_auto_lease(&input).len(), 3);
    }
}
