//! Annuity payout: how much a lump sum pays per period, or how long a
//! chosen payout lasts.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{
    amortize_fixed_term, amortize_until_paid, summarize_by_year, AmortizationRow, PaymentRule,
    YearSummary, DEFAULT_MAX_PERIODS,
};
use crate::time_value::annuity_payment;
use crate::types::{
    with_metadata, ComputationOutput, Money, PaymentFrequency, PaymentTiming, Rate, Years,
};
use crate::validation::{reject_findings, Validator};
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which side of the payout is fixed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PayoutMode {
    /// Pay out over a fixed number of years; solve for the payment.
    FixedLength { years: Years },
    /// Pay a fixed amount per period; solve for how long it lasts.
    FixedPayment { payment: Money },
}

/// Input for the annuity payout calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnuityPayoutInput {
    /// Starting principal
    pub principal: Money,
    /// Expected annual return on the remaining balance
    pub annual_rate: Rate,
    #[serde(default)]
    pub frequency: PaymentFrequency,
    #[serde(default)]
    pub timing: PaymentTiming,
    pub mode: PayoutMode,
}

/// Output of the annuity payout calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnuityPayoutOutput {
    /// Payment per period
    pub payment: Money,
    pub number_of_payments: u32,
    pub duration_years: Decimal,
    pub total_payments: Money,
    /// Return earned on the balance while it was paid out
    pub total_interest: Money,
    /// Principal fully paid out
    pub depletes: bool,
    /// Payment is no larger than the return: principal never shrinks
    pub perpetual_income: bool,
    /// Schedule stopped at the period cap
    pub hit_limit: bool,
    pub schedule: Vec<AmortizationRow>,
    pub annual_summary: Vec<YearSummary>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Range checks for [`AnnuityPayoutInput`].
pub fn validate_annuity_payout(input: &AnnuityPayoutInput) -> Vec<String> {
    let mut v = Validator::new();
    v.positive("Starting principal", input.principal)
        .range("Annual return", input.annual_rate, dec!(0), dec!(0.30));

    match &input.mode {
        PayoutMode::FixedLength { years } => {
            v.range("Payout length (years)", *years, dec!(0.25), dec!(100));
        }
        PayoutMode::FixedPayment { payment } => {
            v.positive("Payout amount", *payment);
        }
    }

    v.finish()
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Compute the annuity payout and its period-by-period drawdown.
pub fn calculate_annuity_payout(
    input: &AnnuityPayoutInput,
) -> FinCalcResult<ComputationOutput<AnnuityPayoutOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    reject_findings(validate_annuity_payout(input))?;

    let periods_per_year = input.frequency.periods_per_year();
    let rate = input.frequency.periodic_rate(input.annual_rate);

    let (payment, run) = match &input.mode {
        PayoutMode::FixedLength { years } => {
            let periods = input.frequency.periods_in(*years).max(1);
            if let Some(note) = input.frequency.rounded_term_warning(*years, periods) {
                warnings.push(note);
            }
            let payment = annuity_payment(input.principal, rate, periods, input.timing)?;
            let run = amortize_fixed_term(
                input.principal,
                rate,
                payment,
                periods,
                Decimal::ZERO,
                input.timing,
            );
            (payment, run)
        }
        PayoutMode::FixedPayment { payment } => {
            let payment = *payment;
            // An annuity due pays the first amount immediately, so the
            // remainder is drawn down as an ordinary annuity.
            let (opening, first_row) = match input.timing {
                PaymentTiming::End => (input.principal, None),
                PaymentTiming::Beginning => {
                    let first = payment.min(input.principal);
                    (
                        input.principal - first,
                        Some(AmortizationRow {
                            period: 1,
                            payment: first,
                            interest: Decimal::ZERO,
                            principal: first,
                            remaining_balance: input.principal - first,
                        }),
                    )
                }
            };

            // The up-front payment counts against the cap
            let max_periods = match first_row {
                Some(_) => DEFAULT_MAX_PERIODS - 1,
                None => DEFAULT_MAX_PERIODS,
            };
            let mut run = amortize_until_paid(
                opening,
                rate,
                &PaymentRule::Fixed(payment),
                max_periods,
            );
            // A perpetual payout has no schedule, up-front payment included
            if let Some(first) = first_row.filter(|_| !run.will_grow) {
                for row in run.rows.iter_mut() {
                    row.period += 1;
                }
                run.total_paid += first.payment;
                run.total_principal += first.principal;
                run.periods += 1;
                run.rows.insert(0, first);
            }
            (payment, run)
        }
    };

    log::debug!("annuity payout: payment={payment} periods={}", run.periods);

    if run.will_grow {
        warnings.push(format!(
            "A payout of {payment} is covered by the return on the balance; \
             the principal is never depleted"
        ));
    }
    if run.hit_limit {
        log::warn!("annuity payout truncated at {DEFAULT_MAX_PERIODS} payments");
        warnings.push(format!(
            "Payout schedule truncated at {DEFAULT_MAX_PERIODS} payments with {} remaining",
            run.final_balance
        ));
    }

    let annual_summary = summarize_by_year(&run.rows, periods_per_year);

    let output = AnnuityPayoutOutput {
        payment,
        number_of_payments: run.periods,
        duration_years: Decimal::from(run.periods) / Decimal::from(periods_per_year),
        total_payments: run.total_paid,
        total_interest: run.total_interest,
        depletes: run.paid_off,
        perpetual_income: run.will_grow,
        hit_limit: run.hit_limit,
        schedule: run.rows,
        annual_summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Annuity Payout (present value of a level annuity)",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "annual_rate": input.annual_rate.to_string(),
            "frequency": format!("{:?}", input.frequency),
            "timing": format!("{:?}", input.timing),
            "mode": format!("{:?}", input.mode),
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
    use crate::time_value::compound;

    fn fixed_length(principal: Money, rate: Rate, years: Years) -> AnnuityPayoutInput {
        AnnuityPayoutInput {
            principal,
            annual_rate: rate,
            frequency: PaymentFrequency::Monthly,
            timing: PaymentTiming::End,
            mode: PayoutMode::FixedLength { years },
        }
    }

    #[test]
    fn test_payment_satisfies_present_value_identity() {
        let input = fixed_length(dec!(250_000), dec!(0.06), dec!(20));
        let out = calculate_annuity_payout(&input).unwrap().result;

        let r = dec!(0.005);
        let pv = out.payment * (Decimal::ONE - Decimal::ONE / compound(r, 240)) / r;
        assert!((pv - dec!(250_000)).abs() < dec!(0.0001), "pv={pv}");
        assert!(out.depletes);
        assert_eq!(out.number_of_payments, 240);
    }

    #[test]
    fn test_zero_rate_is_principal_over_periods() {
        let input = fixed_length(dec!(120_000), Decimal::ZERO, dec!(10));
        let out = calculate_annuity_payout(&input).unwrap().result;
        assert_eq!(out.payment, dec!(1_000));
        assert_eq!(out.total_interest, Decimal::ZERO);
    }

    #[test]
    fn test_annuity_due_pays_less_per_period() {
        let ordinary = calculate_annuity_payout(&fixed_length(dec!(100_000), dec!(0.05), dec!(15)))
            .unwrap()
            .result;
        let mut due_input = fixed_length(dec!(100_000), dec!(0.05), dec!(15));
        due_input.timing = PaymentTiming::Beginning;
        let due = calculate_annuity_payout(&due_input).unwrap().result;

        assert!(due.payment < ordinary.payment);
        assert!(due.schedule.last().unwrap().remaining_balance.abs() < dec!(0.01));
    }

    #[test]
    fn test_fixed_payment_duration() {
        let input = AnnuityPayoutInput {
            principal: dec!(100_000),
            annual_rate: dec!(0.04),
            frequency: PaymentFrequency::Monthly,
            timing: PaymentTiming::End,
            mode: PayoutMode::FixedPayment { payment: dec!(1_000) },
        };
        let out = calculate_annuity_payout(&input).unwrap().result;
        // NPER = -ln(1 - 100000*0.04/12/1000) / ln(1 + 0.04/12) ≈ 121.8
        assert_eq!(out.number_of_payments, 122);
        assert!(out.depletes);
        assert!((out.duration_years - dec!(10.1667)).abs() < dec!(0.001));
        // Final payment is the partial remainder
        assert!(out.schedule.last().unwrap().payment < dec!(1_000));
    }

    #[test]
    fn test_fixed_payment_due_takes_first_payment_up_front() {
        let input = AnnuityPayoutInput {
            principal: dec!(10_000),
            annual_rate: dec!(0.06),
            frequency: PaymentFrequency::Annually,
            timing: PaymentTiming::Beginning,
            mode: PayoutMode::FixedPayment { payment: dec!(2_000) },
        };
        let out = calculate_annuity_payout(&input).unwrap().result;
        assert_eq!(out.schedule[0].payment, dec!(2_000));
        assert_eq!(out.schedule[0].interest, Decimal::ZERO);
        assert_eq!(out.schedule[1].period, 2);
        assert!(out.depletes);
    }

    #[test]
    fn test_payment_below_return_never_depletes() {
        let input = AnnuityPayoutInput {
            principal: dec!(500_000),
            annual_rate: dec!(0.06),
            frequency: PaymentFrequency::Monthly,
            timing: PaymentTiming::End,
            mode: PayoutMode::FixedPayment { payment: dec!(2_000) },
        };
        let out = calculate_annuity_payout(&input).unwrap();
        assert!(out.result.perpetual_income);
        assert!(!out.result.depletes);
        assert!(!out.warnings.is_empty());
    }

    fn due_payout(principal: Money, rate: Rate, payment: Money) -> AnnuityPayoutInput {
        AnnuityPayoutInput {
            principal,
            annual_rate: rate,
            frequency: PaymentFrequency::Monthly,
            timing: PaymentTiming::Beginning,
            mode: PayoutMode::FixedPayment { payment },
        }
    }

    #[test]
    fn test_due_payout_up_front_payment_counts_toward_cap() {
        let out = calculate_annuity_payout(&due_payout(dec!(1_000_000), dec!(0.06), dec!(5_000)))
            .unwrap()
            .result;
        assert!(out.hit_limit);
        assert_eq!(out.number_of_payments, DEFAULT_MAX_PERIODS);
        assert_eq!(out.schedule.len(), DEFAULT_MAX_PERIODS as usize);
        assert_eq!(out.schedule.last().unwrap().period, DEFAULT_MAX_PERIODS);
    }

    #[test]
    fn test_perpetual_due_payout_has_no_schedule() {
        let out = calculate_annuity_payout(&due_payout(dec!(1_000_000), dec!(0.06), dec!(2_000)))
            .unwrap();
        assert!(out.result.perpetual_income);
        assert!(out.result.schedule.is_empty());
        assert_eq!(out.result.number_of_payments, 0);
        assert_eq!(out.result.total_payments, Decimal::ZERO);
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_fractional_length_warns_about_rounding() {
        let mut input = fixed_length(dec!(50_000), dec!(0.05), dec!(2.4));
        input.frequency = PaymentFrequency::Annually;
        let out = calculate_annuity_payout(&input).unwrap();
        assert_eq!(out.result.number_of_payments, 2);
        assert!(out.warnings.iter().any(|w| w.contains("using 2 payments")));
    }

    #[test]
    fn test_rejects_out_of_range() {
        let input = fixed_length(dec!(-5), dec!(0.45), dec!(0));
        assert_eq!(validate_annuity_payout(&input).len(), 3);
    }
}
