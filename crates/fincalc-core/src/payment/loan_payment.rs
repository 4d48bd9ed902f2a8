//! Loan payment and amortization schedule.
//!
//! Solves either for the periodic payment given a term, or for the term
//! given a payment. An optional balloon amount stays outstanding after the
//! last regular payment.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{
    amortize_fixed_term, amortize_until_paid, summarize_by_year, AmortizationRow, PaymentRule,
    YearSummary, DEFAULT_MAX_PERIODS,
};
use crate::time_value::balloon_payment;
use crate::types::{with_metadata, ComputationOutput, Money, PaymentFrequency, PaymentTiming, Rate, Years};
use crate::validation::{reject_findings, Validator};
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// What the borrower fixes; the calculator solves for the other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PaymentMode {
    /// Fixed loan term, solve for the payment.
    FixedTerm { years: Years },
    /// Fixed payment per period, solve for the term.
    FixedPayment { payment: Money },
}

/// Input for the payment calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanPaymentInput {
    pub loan_amount: Money,
    /// Nominal annual interest rate
    pub annual_rate: Rate,
    #[serde(default)]
    pub frequency: PaymentFrequency,
    pub mode: PaymentMode,
    /// Amount left outstanding after the final regular payment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balloon: Option<Money>,
}

/// Output of the payment calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanPaymentOutput {
    /// Regular payment per period
    pub payment: Money,
    pub number_of_payments: u32,
    /// Term in years implied by the number of payments
    pub term_years: Decimal,
    /// Sum of all scheduled payments, excluding the balloon
    pub total_payments: Money,
    pub total_interest: Money,
    pub balloon: Money,
    /// Interest as a share of everything paid
    pub interest_share: Rate,
    /// Payment does not exceed the first period's interest
    pub will_not_amortize: bool,
    /// Schedule stopped at the period cap
    pub hit_limit: bool,
    pub schedule: Vec<AmortizationRow>,
    pub annual_summary: Vec<YearSummary>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Range checks for [`LoanPaymentInput`]; empty when the input is usable.
pub fn validate_loan_payment(input: &LoanPaymentInput) -> Vec<String> {
    let mut v = Validator::new();
    v.positive("Loan amount", input.loan_amount)
        .range("Interest rate", input.annual_rate, dec!(0), dec!(0.50));

    match &input.mode {
        PaymentMode::FixedTerm { years } => {
            v.range("Loan term (years)", *years, dec!(0.25), dec!(50));
        }
        PaymentMode::FixedPayment { payment } => {
            v.positive("Payment", *payment).ensure(
                input.balloon.is_none(),
                "A balloon payment requires a fixed loan term",
            );
        }
    }

    if let Some(balloon) = input.balloon {
        v.non_negative("Balloon payment", balloon).ensure(
            balloon < input.loan_amount,
            "Balloon payment must be less than the loan amount",
        );
    }

    v.finish()
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Compute the loan payment (or term) and the full amortization schedule.
pub fn calculate_loan_payment(
    input: &LoanPaymentInput,
) -> FinCalcResult<ComputationOutput<LoanPaymentOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    reject_findings(validate_loan_payment(input))?;

    let periods_per_year = input.frequency.periods_per_year();
    let rate = input.frequency.periodic_rate(input.annual_rate);
    let balloon = input.balloon.unwrap_or(Decimal::ZERO);

    log::debug!(
        "loan payment: amount={} rate={} mode={:?}",
        input.loan_amount,
        input.annual_rate,
        input.mode
    );

    let (payment, run) = match &input.mode {
        PaymentMode::FixedTerm { years } => {
            let periods = input.frequency.periods_in(*years).max(1);
            if let Some(note) = input.frequency.rounded_term_warning(*years, periods) {
                warnings.push(note);
            }
            let payment =
                balloon_payment(input.loan_amount, rate, periods, balloon, PaymentTiming::End)?;
            let run = amortize_fixed_term(
                input.loan_amount,
                rate,
                payment,
                periods,
                balloon,
                PaymentTiming::End,
            );
            (payment, run)
        }
        PaymentMode::FixedPayment { payment } => {
            let run = amortize_until_paid(
                input.loan_amount,
                rate,
                &PaymentRule::Fixed(*payment),
                DEFAULT_MAX_PERIODS,
            );
            (*payment, run)
        }
    };

    if run.will_grow {
        warnings.push(format!(
            "A payment of {payment} does not cover the {} of interest charged in the first period; \
             the loan will never be repaid",
            input.loan_amount * rate
        ));
    }
    if run.hit_limit {
        warnings.push(format!(
            "Schedule truncated at {DEFAULT_MAX_PERIODS} payments with {} still outstanding",
            run.final_balance
        ));
    }

    let total_payments = run.total_paid;
    let total_interest = run.total_interest;
    let total_outlay = total_payments + balloon;
    let interest_share = if total_outlay.is_zero() {
        Decimal::ZERO
    } else {
        total_interest / total_outlay
    };

    let annual_summary = summarize_by_year(&run.rows, periods_per_year);

    let output = LoanPaymentOutput {
        payment,
        number_of_payments: run.periods,
        term_years: Decimal::from(run.periods) / Decimal::from(periods_per_year),
        total_payments,
        total_interest,
        balloon,
        interest_share,
        will_not_amortize: run.will_grow,
        hit_limit: run.hit_limit,
        schedule: run.rows,
        annual_summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan Payment (level-payment amortization with optional balloon)",
        &serde_json::json!({
            "loan_amount": input.loan_amount.to_string(),
            "annual_rate": input.annual_rate.to_string(),
            "frequency": format!("{:?}", input.frequency),
            "mode": format!("{:?}", input.mode),
            "balloon": balloon.to_string(),
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
    use crate::validation::MAX_AMOUNT;

    fn fixed_term(amount: Money, rate: Rate, years: Years) -> LoanPaymentInput {
        LoanPaymentInput {
            loan_amount: amount,
            annual_rate: rate,
            frequency: PaymentFrequency::Monthly,
            mode: PaymentMode::FixedTerm { years },
            balloon: None,
        }
    }

    #[test]
    fn test_reference_scenario() {
        let input = fixed_term(dec!(500_000), dec!(0.05), dec!(10));
        let out = calculate_loan_payment(&input).unwrap().result;

        assert!((out.payment - dec!(5303.28)).abs() < dec!(0.01), "payment={}", out.payment);
        assert!(
            (out.total_interest - dec!(136_393.09)).abs() < dec!(0.01),
            "interest={}",
            out.total_interest
        );
        assert_eq!(out.number_of_payments, 120);
        assert_eq!(out.annual_summary.len(), 10);
    }

    #[test]
    fn test_zero_rate_divides_linearly() {
        let input = fixed_term(dec!(12_000), Decimal::ZERO, dec!(1));
        let out = calculate_loan_payment(&input).unwrap().result;
        assert_eq!(out.payment, dec!(1_000));
        assert_eq!(out.total_interest, Decimal::ZERO);
    }

    #[test]
    fn test_balloon_left_outstanding() {
        let mut input = fixed_term(dec!(40_000), dec!(0.06), dec!(5));
        input.balloon = Some(dec!(10_000));
        let out = calculate_loan_payment(&input).unwrap().result;

        let last = out.schedule.last().unwrap();
        assert!((last.remaining_balance - dec!(10_000)).abs() < dec!(0.000001));

        // Cheaper than fully amortizing
        let full = calculate_loan_payment(&fixed_term(dec!(40_000), dec!(0.06), dec!(5)))
            .unwrap()
            .result;
        assert!(out.payment < full.payment);
    }

    #[test]
    fn test_fixed_payment_solves_term() {
        let input = LoanPaymentInput {
            loan_amount: dec!(20_000),
            annual_rate: dec!(0.06),
            frequency: PaymentFrequency::Monthly,
            mode: PaymentMode::FixedPayment { payment: dec!(386.66) },
            balloon: None,
        };
        let out = calculate_loan_payment(&input).unwrap().result;
        // 386.66/month retires 20k at 6% in ~60 months
        assert!(out.number_of_payments == 60 || out.number_of_payments == 61);
        assert!(!out.will_not_amortize);
    }

    #[test]
    fn test_fixed_payment_below_interest() {
        let input = LoanPaymentInput {
            loan_amount: dec!(100_000),
            annual_rate: dec!(0.12),
            frequency: PaymentFrequency::Monthly,
            mode: PaymentMode::FixedPayment { payment: dec!(900) },
            balloon: None,
        };
        let out = calculate_loan_payment(&input).unwrap();
        assert!(out.result.will_not_amortize);
        assert!(out.result.schedule.is_empty());
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_balloon_rejected_without_term() {
        let input = LoanPaymentInput {
            loan_amount: dec!(10_000),
            annual_rate: dec!(0.05),
            frequency: PaymentFrequency::Monthly,
            mode: PaymentMode::FixedPayment { payment: dec!(200) },
            balloon: Some(dec!(1_000)),
        };
        let findings = validate_loan_payment(&input);
        assert_eq!(findings, vec!["A balloon payment requires a fixed loan term".to_string()]);
    }

    #[test]
    fn test_fractional_term_warns_with_term_used() {
        let mut input = fixed_term(dec!(10_000), dec!(0.05), dec!(2.4));
        input.frequency = PaymentFrequency::Annually;
        let out = calculate_loan_payment(&input).unwrap();
        assert_eq!(out.result.number_of_payments, 2);
        assert_eq!(out.result.term_years, dec!(2));
        assert_eq!(
            out.warnings,
            vec![
                "A term of 2.4 years is not a whole number of Annually payments; \
                 using 2 payments (2 years)"
                    .to_string()
            ]
        );

        // A quarter year rounds down to nothing and is bumped to one payment
        input.mode = PaymentMode::FixedTerm { years: dec!(0.25) };
        let out = calculate_loan_payment(&input).unwrap();
        assert_eq!(out.result.number_of_payments, 1);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_amount_above_ceiling_rejected() {
        let mut input = fixed_term(Decimal::MAX, dec!(0.5), dec!(50));
        input.frequency = PaymentFrequency::Weekly;
        assert_eq!(validate_loan_payment(&input).len(), 1);
        assert!(calculate_loan_payment(&input).is_err());

        input.loan_amount = MAX_AMOUNT;
        assert!(calculate_loan_payment(&input).is_ok());
    }

    #[test]
    fn test_validation_findings() {
        let mut input = fixed_term(dec!(0), dec!(0.75), dec!(80));
        input.balloon = Some(dec!(5));
        let findings = validate_loan_payment(&input);
        assert_eq!(findings.len(), 4);

        let err = calculate_loan_payment(&input).unwrap_err();
        assert_eq!(err.findings().len(), 4);
    }
}
