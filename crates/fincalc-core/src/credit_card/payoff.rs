//! Credit card payoff.
//!
//! Interest accrues monthly at APR / 12 on the outstanding balance. The
//! payoff can be driven by a fixed monthly payment, by a target payoff date,
//! or by the issuer's minimum-payment formula, which is recomputed from the
//! balance every month.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{
    amortize_until_paid, summarize_by_year, AmortizationRow, PaymentRule, YearSummary,
    DEFAULT_MAX_PERIODS,
};
use crate::time_value::pmt;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::validation::{reject_findings, Validator};
use crate::FinCalcResult;

/// Issuers typically quote the minimum as 1% of the balance plus interest.
pub const DEFAULT_MINIMUM_PERCENT: Decimal = dec!(0.01);
/// Minimum payment floor when the percentage falls below it.
pub const DEFAULT_MINIMUM_FLOOR: Decimal = dec!(25);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PayoffStrategy {
    /// Pay the same amount every month.
    FixedPayment { payment: Money },
    /// Pay off in exactly this many months; solve for the payment.
    PayoffInMonths { months: u32 },
    /// Pay only the issuer minimum, recomputed every month.
    MinimumPayment {
        percent_of_balance: Rate,
        floor: Money,
        plus_interest: bool,
    },
}

impl PayoffStrategy {
    /// Minimum payment with the common issuer defaults.
    pub fn default_minimum() -> Self {
        PayoffStrategy::MinimumPayment {
            percent_of_balance: DEFAULT_MINIMUM_PERCENT,
            floor: DEFAULT_MINIMUM_FLOOR,
            plus_interest: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditCardPayoffInput {
    pub balance: Money,
    /// Annual percentage rate
    pub apr: Rate,
    pub strategy: PayoffStrategy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditCardPayoffOutput {
    /// Payment due in the first month
    pub first_payment: Money,
    pub months_to_payoff: u32,
    pub total_paid: Money,
    pub total_interest: Money,
    pub paid_off: bool,
    /// The payment does not cover monthly interest; the balance will grow
    pub will_grow: bool,
    /// Gave up after the month cap with a balance left
    pub hit_limit: bool,
    pub remaining_balance: Money,
    pub schedule: Vec<AmortizationRow>,
    pub annual_summary: Vec<YearSummary>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate_credit_card_payoff(input: &CreditCardPayoffInput) -> Vec<String> {
    let mut v = Validator::new();
    v.positive("Credit card balance", input.balance)
        .range("APR", input.apr, dec!(0), dec!(0.40));

    match &input.strategy {
        PayoffStrategy::FixedPayment { payment } => {
            v.positive("Monthly payment", *payment);
        }
        PayoffStrategy::PayoffInMonths { months } => {
            v.range_u32("Months to pay off", *months, 1, DEFAULT_MAX_PERIODS);
        }
        PayoffStrategy::MinimumPayment {
            percent_of_balance,
            floor,
            ..
        } => {
            v.range("Minimum payment percentage", *percent_of_balance, dec!(0), dec!(1))
                .non_negative("Minimum payment floor", *floor)
                .ensure(
                    *percent_of_balance > Decimal::ZERO || *floor > Decimal::ZERO,
                    "Minimum payment needs a percentage or a floor",
                );
        }
    }

    v.finish()
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Simulate paying down a credit card balance month by month.
pub fn calculate_credit_card_payoff(
    input: &CreditCardPayoffInput,
) -> FinCalcResult<ComputationOutput<CreditCardPayoffOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    reject_findings(validate_credit_card_payoff(input))?;

    let rate = input.apr / dec!(12);

    let rule = match &input.strategy {
        PayoffStrategy::FixedPayment { payment } => PaymentRule::Fixed(*payment),
        PayoffStrategy::PayoffInMonths { months } => {
            PaymentRule::Fixed(-pmt(rate, *months, input.balance, Decimal::ZERO)?)
        }
        PayoffStrategy::MinimumPayment {
            percent_of_balance,
            floor,
            plus_interest,
        } => PaymentRule::Minimum {
            percent_of_balance: *percent_of_balance,
            floor: *floor,
            plus_interest: *plus_interest,
        },
    };

    let run = amortize_until_paid(input.balance, rate, &rule, DEFAULT_MAX_PERIODS);
    log::debug!("credit card payoff: {:?} -> {} months", input.strategy, run.periods);

    let first_interest = input.balance * rate;
    let first_payment = run
        .rows
        .first()
        .map(|r| r.payment)
        .unwrap_or_else(|| rule.payment_for(input.balance, first_interest));

    if run.will_grow {
        log::warn!("credit card payment does not cover interest; balance will grow");
        warnings.push(format!(
            "The payment does not cover the monthly interest of {first_interest}; \
             the balance will grow and never be paid off"
        ));
    }
    if run.hit_limit {
        warnings.push(format!(
            "Not paid off after {DEFAULT_MAX_PERIODS} months; {} would remain",
            run.final_balance
        ));
    }
    if matches!(input.strategy, PayoffStrategy::MinimumPayment { .. })
        && run.paid_off
        && run.periods > 120
    {
        warnings.push(format!(
            "Paying only the minimum takes {} years",
            Decimal::from(run.periods) / dec!(12)
        ));
    }

    let annual_summary = summarize_by_year(&run.rows, 12);

    let output = CreditCardPayoffOutput {
        first_payment,
        months_to_payoff: run.periods,
        total_paid: run.total_paid,
        total_interest: run.total_interest,
        paid_off: run.paid_off,
        will_grow: run.will_grow,
        hit_limit: run.hit_limit,
        remaining_balance: run.final_balance,
        schedule: run.rows,
        annual_summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Credit Card Payoff (monthly compounding at APR / 12)",
        &serde_json::json!({
            "balance": input.balance.to_string(),
            "apr": input.apr.to_string(),
            "strategy": format!("{:?}", input.strategy),
            "max_months": DEFAULT_MAX_PERIODS,
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

    fn card(strategy: PayoffStrategy) -> CreditCardPayoffInput {
        CreditCardPayoffInput {
            balance: dec!(5_000),
            apr: dec!(0.18),
            strategy,
        }
    }

    #[test]
    fn test_fixed_payment_payoff() {
        let out = calculate_credit_card_payoff(&card(PayoffStrategy::FixedPayment {
            payment: dec!(200),
        }))
        .unwrap()
        .result;
        // 5,000 at 1.5%/month with 200/month ≈ 32 months
        assert_eq!(out.months_to_payoff, 32);
        assert!(out.paid_off);
        assert!(out.total_interest > dec!(1_000) && out.total_interest < dec!(1_400));
        assert!((out.total_paid - out.total_interest - dec!(5_000)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_payoff_in_months_solves_payment() {
        let out = calculate_credit_card_payoff(&card(PayoffStrategy::PayoffInMonths {
            months: 24,
        }))
        .unwrap()
        .result;
        assert_eq!(out.months_to_payoff, 24);
        // 5,000 over 24 months at 1.5% ≈ 249.62
        assert!((out.first_payment - dec!(249.62)).abs() < dec!(0.01), "pmt={}", out.first_payment);
    }

    #[test]
    fn test_minimum_payment_recomputed() {
        let out = calculate_credit_card_payoff(&card(PayoffStrategy::default_minimum()))
            .unwrap();
        let result = &out.result;
        // 1% of 5,000 + 75 interest
        assert_eq!(result.first_payment, dec!(125));
        assert!(result.paid_off);
        assert!(result.schedule[10].payment < result.first_payment);
        assert!(result.months_to_payoff > 120);
        assert!(out.warnings.iter().any(|w| w.contains("minimum")));
    }

    #[test]
    fn test_payment_below_interest_will_grow() {
        let out = calculate_credit_card_payoff(&card(PayoffStrategy::FixedPayment {
            payment: dec!(50),
        }))
        .unwrap();
        assert!(out.result.will_grow);
        assert!(!out.result.paid_off);
        assert_eq!(out.result.months_to_payoff, 0);
        assert_eq!(out.result.first_payment, dec!(50));
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_minimum_without_interest_below_rate_will_grow() {
        // 1% of balance, no interest added, 0 floor, 18% APR: never amortizes
        let out = calculate_credit_card_payoff(&card(PayoffStrategy::MinimumPayment {
            percent_of_balance: dec!(0.01),
            floor: Decimal::ZERO,
            plus_interest: false,
        }))
        .unwrap()
        .result;
        assert!(out.will_grow);
    }

    #[test]
    fn test_zero_apr() {
        let mut input = card(PayoffStrategy::FixedPayment { payment: dec!(500) });
        input.apr = Decimal::ZERO;
        let out = calculate_credit_card_payoff(&input).unwrap().result;
        assert_eq!(out.months_to_payoff, 10);
        assert_eq!(out.total_interest, Decimal::ZERO);
    }

    #[test]
    fn test_apr_out_of_range() {
        let mut input = card(PayoffStrategy::FixedPayment { payment: dec!(100) });
        input.apr = dec!(0.45);
        let findings = validate_credit_card_payoff(&input);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].contains("APR"));
    }
}
