use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

use crate::error::FinCalcError;
use crate::types::{Money, PaymentTiming, Rate};
use crate::FinCalcResult;

/// Compute (1 + r)^n via iterative multiplication (avoids Decimal::powd drift).
pub fn compound(rate: Rate, n: u32) -> Decimal {
    let mut result = Decimal::ONE;
    let factor = Decimal::ONE + rate;
    for _ in 0..n {
        result *= factor;
    }
    result
}

/// (1 + r)^n, or `None` when the result leaves the `Decimal` range.
pub fn checked_compound(rate: Rate, n: u32) -> Option<Decimal> {
    let factor = Decimal::ONE + rate;
    (0..n).try_fold(Decimal::ONE, |acc, _| acc.checked_mul(factor))
}

/// Present Value
pub fn pv(rate: Rate, nper: u32, pmt: Money, fv: Money) -> FinCalcResult<Money> {
    if rate.is_zero() {
        return Ok(-(pmt * Decimal::from(nper) + fv));
    }

    let factor = compound(rate, nper);

    if factor.is_zero() {
        return Err(FinCalcError::DivisionByZero {
            context: "PV factor".into(),
        });
    }

    let annuity_factor = (Decimal::ONE - Decimal::ONE / factor) / rate;
    Ok(-(pmt * annuity_factor + fv / factor))
}

/// Future Value
pub fn fv(rate: Rate, nper: u32, pmt: Money, present_value: Money) -> FinCalcResult<Money> {
    if rate.is_zero() {
        return Ok(-(present_value + pmt * Decimal::from(nper)));
    }

    let factor = compound(rate, nper);
    let annuity_factor = (factor - Decimal::ONE) / rate;

    Ok(-(present_value * factor + pmt * annuity_factor))
}

/// Payment (PMT)
pub fn pmt(rate: Rate, nper: u32, present_value: Money, future_value: Money) -> FinCalcResult<Money> {
    if nper == 0 {
        return Err(FinCalcError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(-(present_value + future_value) / Decimal::from(nper));
    }

    let factor = compound(rate, nper);
    let annuity_factor = (factor - Decimal::ONE) / rate;

    if annuity_factor.is_zero() {
        return Err(FinCalcError::DivisionByZero {
            context: "PMT annuity factor".into(),
        });
    }

    Ok(-(present_value * factor + future_value) / annuity_factor)
}

/// Number of periods (NPER) for end-of-period payments, spreadsheet sign
/// convention. Fractional: the last period is a partial payment.
pub fn nper(rate: Rate, pmt: Money, present_value: Money, future_value: Money) -> FinCalcResult<Decimal> {
    if pmt.is_zero() {
        return Err(FinCalcError::DivisionByZero {
            context: "NPER payment".into(),
        });
    }

    if rate.is_zero() {
        return Ok(-(present_value + future_value) / pmt);
    }

    let numerator = pmt - future_value * rate;
    let denominator = pmt + present_value * rate;
    if denominator.is_zero() || numerator / denominator <= Decimal::ZERO {
        return Err(FinCalcError::FinancialImpossibility(
            "Payment does not cover the interest accruing each period".into(),
        ));
    }

    let ratio = numerator / denominator;
    Ok(ratio.ln() / (Decimal::ONE + rate).ln())
}

/// Level payment that amortizes `principal` to zero over `n` periods,
/// returned as a positive amount.
pub fn annuity_payment(
    principal: Money,
    rate: Rate,
    n: u32,
    timing: PaymentTiming,
) -> FinCalcResult<Money> {
    balloon_payment(principal, rate, n, Decimal::ZERO, timing)
}

/// Level payment that leaves `balloon` outstanding after `n` periods:
/// (P - B / (1+r)^n) * r / (1 - (1+r)^-n)
pub fn balloon_payment(
    principal: Money,
    rate: Rate,
    n: u32,
    balloon: Money,
    timing: PaymentTiming,
) -> FinCalcResult<Money> {
    if n == 0 {
        return Err(FinCalcError::InvalidInput {
            field: "periods".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok((principal - balloon) / Decimal::from(n));
    }

    let factor = checked_compound(rate, n)
        .filter(|f| !f.is_zero())
        .ok_or_else(|| {
            FinCalcError::FinancialImpossibility(format!(
                "Compounding {rate} over {n} periods is outside the supported range"
            ))
        })?;
    let denom = Decimal::ONE - Decimal::ONE / factor;
    if denom.is_zero() {
        return Err(FinCalcError::DivisionByZero {
            context: "annuity payment factor".into(),
        });
    }

    let payment = (principal - balloon / factor) * rate / denom;
    Ok(match timing {
        PaymentTiming::End => payment,
        PaymentTiming::Beginning => payment / (Decimal::ONE + rate),
    })
}

/// Present value of `n` level payments: PV = pmt * [(1 - (1+r)^-n) / r]
pub fn annuity_present_value(payment: Money, rate: Rate, n: u32, timing: PaymentTiming) -> Money {
    if rate.is_zero() || n == 0 {
        return payment * Decimal::from(n);
    }
    let pv = payment * (Decimal::ONE - Decimal::ONE / compound(rate, n)) / rate;
    match timing {
        PaymentTiming::End => pv,
        PaymentTiming::Beginning => pv * (Decimal::ONE + rate),
    }
}

/// End-of-period deposit required to accumulate `target` in `n` periods:
/// pmt = FV * r / ((1+r)^n - 1)
pub fn sinking_fund_payment(target: Money, rate: Rate, n: u32) -> Money {
    if n == 0 {
        return Decimal::ZERO;
    }
    if rate.is_zero() {
        return target / Decimal::from(n);
    }
    let denom = compound(rate, n) - Decimal::ONE;
    if denom.is_zero() {
        return target / Decimal::from(n);
    }
    target * rate / denom
}
