use fincalc_core::amortization::{amortize_until_paid, PaymentRule, DEFAULT_MAX_PERIODS};
use fincalc_core::annuity::payout::{self, AnnuityPayoutInput, PayoutMode};
use fincalc_core::payment::loan_payment::{self, LoanPaymentInput, PaymentMode};
use fincalc_core::time_value::compound;
use fincalc_core::{FinCalcError, PaymentFrequency, PaymentTiming};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Loan payment
// ===========================================================================

fn mortgage() -> LoanPaymentInput {
    LoanPaymentInput {
        loan_amount: dec!(500_000),
        annual_rate: dec!(0.05),
        frequency: PaymentFrequency::Monthly,
        mode: PaymentMode::FixedTerm { years: dec!(10) },
        balloon: None,
    }
}

#[test]
fn test_reference_mortgage_payment_and_interest() {
    let out = loan_payment::calculate_loan_payment(&mortgage()).unwrap();
    let r = &out.result;

    assert_eq!(r.payment.round_dp(2), dec!(5303.28));
    assert_eq!(r.total_interest.round_dp(2), dec!(136393.09));
    assert_eq!(r.number_of_payments, 120);
    assert_eq!(r.term_years, dec!(10));
    assert!(out.warnings.is_empty());
}

#[test]
fn test_schedule_sums_match_totals() {
    let r = loan_payment::calculate_loan_payment(&mortgage())
        .unwrap()
        .result;

    let principal: Decimal = r.schedule.iter().map(|row| row.principal).sum();
    let interest: Decimal = r.schedule.iter().map(|row| row.interest).sum();
    let paid: Decimal = r.schedule.iter().map(|row| row.payment).sum();

    assert!((principal - dec!(500_000)).abs() < dec!(0.01));
    assert!((interest - r.total_interest).abs() < dec!(0.000001));
    assert!((paid - r.total_payments).abs() < dec!(0.000001));
    assert!(r.schedule.last().unwrap().remaining_balance.abs() < dec!(0.01));
}

#[test]
fn test_balance_never_increases() {
    let r = loan_payment::calculate_loan_payment(&mortgage())
        .unwrap()
        .result;
    for pair in r.schedule.windows(2) {
        assert!(pair[1].remaining_balance <= pair[0].remaining_balance);
    }
}

#[test]
fn test_yearly_summary_adds_up() {
    let r = loan_payment::calculate_loan_payment(&mortgage())
        .unwrap()
        .result;
    let yearly_interest: Decimal = r.annual_summary.iter().map(|y| y.interest).sum();
    assert!((yearly_interest - r.total_interest).abs() < dec!(0.000001));
    assert_eq!(r.annual_summary[0].year, 1);
    assert!((r.annual_summary[0].payments - r.payment * dec!(12)).abs() < dec!(0.000001));
}

#[test]
fn test_biweekly_schedule() {
    let mut input = mortgage();
    input.frequency = PaymentFrequency::Biweekly;
    let r = loan_payment::calculate_loan_payment(&input).unwrap().result;
    assert_eq!(r.number_of_payments, 260);
    assert_eq!(r.annual_summary.len(), 10);
}

#[test]
fn test_zero_rate_is_linear() {
    let mut input = mortgage();
    input.annual_rate = Decimal::ZERO;
    let r = loan_payment::calculate_loan_payment(&input).unwrap().result;
    assert_eq!(r.payment, dec!(500_000) / dec!(120));
    assert_eq!(r.total_interest, Decimal::ZERO);
}

#[test]
fn test_payment_below_interest_is_flagged_not_looped() {
    let input = LoanPaymentInput {
        mode: PaymentMode::FixedPayment {
            payment: dec!(2_000),
        },
        ..mortgage()
    };
    let r = loan_payment::calculate_loan_payment(&input).unwrap().result;
    assert!(r.will_not_amortize);
    assert!(!r.hit_limit);
    assert_eq!(r.number_of_payments, 0);
}

#[test]
fn test_open_ended_loop_respects_cap() {
    // Barely above the 5.00 of monthly interest: would take far longer than 600 months
    let run = amortize_until_paid(
        dec!(1_000),
        dec!(0.005),
        &PaymentRule::Fixed(dec!(5.01)),
        DEFAULT_MAX_PERIODS,
    );
    assert!(run.hit_limit);
    assert!(!run.paid_off);
    assert_eq!(run.periods, DEFAULT_MAX_PERIODS);
    assert_eq!(run.rows.len(), DEFAULT_MAX_PERIODS as usize);
}

#[test]
fn test_validation_error_lists_findings() {
    let mut input = mortgage();
    input.loan_amount = dec!(-1);
    input.annual_rate = dec!(0.9);
    match loan_payment::calculate_loan_payment(&input) {
        Err(FinCalcError::Validation(findings)) => assert_eq!(findings.len(), 2),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn test_input_from_json() {
    let json = r#"{
        "loan_amount": "500000",
        "annual_rate": "0.05",
        "mode": { "FixedTerm": { "years": "10" } }
    }"#;
    let input: LoanPaymentInput = serde_json::from_str(json).unwrap();
    assert_eq!(input.frequency, PaymentFrequency::Monthly);
    let out = loan_payment::calculate_loan_payment(&input).unwrap();

    let value = serde_json::to_value(&out).unwrap();
    assert_eq!(value["result"]["number_of_payments"], 120);
    assert!(value["metadata"]["precision"].is_string());
}

// ===========================================================================
// Annuity payout
// ===========================================================================

#[test]
fn test_annuity_present_value_identity_across_frequencies() {
    for frequency in [
        PaymentFrequency::Monthly,
        PaymentFrequency::Quarterly,
        PaymentFrequency::Annually,
    ] {
        let input = AnnuityPayoutInput {
            principal: dec!(300_000),
            annual_rate: dec!(0.045),
            frequency,
            timing: PaymentTiming::End,
            mode: PayoutMode::FixedLength { years: dec!(25) },
        };
        let r = payout::calculate_annuity_payout(&input).unwrap().result;

        let rate = frequency.periodic_rate(dec!(0.045));
        let n = r.number_of_payments;
        let pv = r.payment * (Decimal::ONE - Decimal::ONE / compound(rate, n)) / rate;
        assert!((pv - dec!(300_000)).abs() < dec!(0.001), "{frequency:?}: pv={pv}");
    }
}

#[test]
fn test_annuity_due_identity() {
    let input = AnnuityPayoutInput {
        principal: dec!(100_000),
        annual_rate: dec!(0.06),
        frequency: PaymentFrequency::Monthly,
        timing: PaymentTiming::Beginning,
        mode: PayoutMode::FixedLength { years: dec!(10) },
    };
    let r = payout::calculate_annuity_payout(&input).unwrap().result;
    let rate = dec!(0.005);
    let pv = r.payment * (Decimal::ONE - Decimal::ONE / compound(rate, 120)) / rate
        * (Decimal::ONE + rate);
    assert!((pv - dec!(100_000)).abs() < dec!(0.001));
}

#[test]
fn test_annuity_zero_rate() {
    let input = AnnuityPayoutInput {
        principal: dec!(60_000),
        annual_rate: Decimal::ZERO,
        frequency: PaymentFrequency::Monthly,
        timing: PaymentTiming::End,
        mode: PayoutMode::FixedLength { years: dec!(5) },
    };
    let r = payout::calculate_annuity_payout(&input).unwrap().result;
    assert_eq!(r.payment, dec!(1_000));
    assert!(r.depletes);
}
