//! Period-by-period amortization shared by the loan, lease, annuity and
//! credit-card calculators.
//!
//! Every loop here is bounded: fixed-term schedules run exactly the requested
//! number of periods, open-ended schedules stop at `max_periods` and report
//! `hit_limit` instead of running forever. A payment that never exceeds the
//! interest accruing on the balance is reported as `will_grow`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, PaymentTiming, Rate};

/// Cap applied to open-ended schedules (50 years of monthly payments).
pub const DEFAULT_MAX_PERIODS: u32 = 600;

/// A balance within half a cent of zero counts as paid off.
pub const BALANCE_TOLERANCE: Decimal = dec!(0.005);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A single row of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// Period number (1-indexed)
    pub period: u32,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub remaining_balance: Money,
}

/// How the payment for each period is determined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PaymentRule {
    /// The same payment every period.
    Fixed(Money),
    /// Recomputed every period from the outstanding balance, never below `floor`.
    Minimum {
        /// Share of the opening balance (e.g. 0.01 = 1%)
        percent_of_balance: Rate,
        /// Lowest payment ever requested
        floor: Money,
        /// Add the period's interest on top of the percentage
        plus_interest: bool,
    },
}

impl PaymentRule {
    /// Payment requested for a period opening at `balance` and accruing `interest`.
    pub fn payment_for(&self, balance: Money, interest: Money) -> Money {
        match self {
            PaymentRule::Fixed(payment) => *payment,
            PaymentRule::Minimum {
                percent_of_balance,
                floor,
                plus_interest,
            } => {
                let mut payment = balance * percent_of_balance;
                if *plus_interest {
                    payment += interest;
                }
                payment.max(*floor)
            }
        }
    }
}

/// Outcome of running an amortization loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationRun {
    pub rows: Vec<AmortizationRow>,
    pub periods: u32,
    pub total_paid: Money,
    pub total_interest: Money,
    pub total_principal: Money,
    pub final_balance: Money,
    /// Balance reached zero (within tolerance)
    pub paid_off: bool,
    /// Loop stopped at the period cap with a balance still outstanding
    pub hit_limit: bool,
    /// A payment did not cover the interest accrued for its period
    pub will_grow: bool,
}

/// Calendar-year roll-up of schedule rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearSummary {
    pub year: u32,
    pub payments: Money,
    pub interest: Money,
    pub principal: Money,
    pub ending_balance: Money,
}

// ---------------------------------------------------------------------------
// Fixed term
// ---------------------------------------------------------------------------

/// Amortize over exactly `periods` periods with a level `payment`.
///
/// The final period absorbs any residue so that the closing balance equals
/// `balloon` exactly. With `PaymentTiming::Beginning` each payment is applied
/// before interest accrues on the period.
pub fn amortize_fixed_term(
    principal: Money,
    rate: Rate,
    payment: Money,
    periods: u32,
    balloon: Money,
    timing: PaymentTiming,
) -> AmortizationRun {
    let mut rows = Vec::with_capacity(periods as usize);
    let mut balance = principal;
    let mut total_paid = Decimal::ZERO;
    let mut total_interest = Decimal::ZERO;

    for period in 1..=periods {
        let interest = match timing {
            PaymentTiming::End => balance * rate,
            PaymentTiming::Beginning => (balance - payment) * rate,
        };

        let (this_payment, principal_part) = if period == periods {
            // Pay down to the balloon exactly.
            let principal_part = balance - balloon;
            (principal_part + interest, principal_part)
        } else {
            (payment, payment - interest)
        };

        balance -= principal_part;
        total_paid += this_payment;
        total_interest += interest;

        rows.push(AmortizationRow {
            period,
            payment: this_payment,
            interest,
            principal: principal_part,
            remaining_balance: balance,
        });
    }

    AmortizationRun {
        rows,
        periods,
        total_paid,
        total_interest,
        total_principal: principal - balance,
        final_balance: balance,
        paid_off: balance.abs() <= BALANCE_TOLERANCE,
        hit_limit: false,
        will_grow: false,
    }
}

// ---------------------------------------------------------------------------
// Open ended
// ---------------------------------------------------------------------------

/// Amortize until the balance is repaid, the payment stops covering interest,
/// or `max_periods` is reached.
pub fn amortize_until_paid(
    principal: Money,
    rate: Rate,
    rule: &PaymentRule,
    max_periods: u32,
) -> AmortizationRun {
    let mut rows = Vec::new();
    let mut balance = principal;
    let mut total_paid = Decimal::ZERO;
    let mut total_interest = Decimal::ZERO;
    let mut will_grow = false;
    let mut period = 0u32;

    while balance > BALANCE_TOLERANCE && period < max_periods {
        let interest = balance * rate;
        let requested = rule.payment_for(balance, interest);

        // Final payment never overshoots what is owed.
        let payment = requested.min(balance + interest);
        if payment <= interest {
            will_grow = true;
            break;
        }

        period += 1;
        let principal_part = payment - interest;
        balance -= principal_part;
        total_paid += payment;
        total_interest += interest;

        rows.push(AmortizationRow {
            period,
            payment,
            interest,
            principal: principal_part,
            remaining_balance: balance,
        });
    }

    let paid_off = balance <= BALANCE_TOLERANCE;
    if !paid_off && !will_grow {
        log::warn!(
            "amortization stopped at the {max_periods}-period cap with {balance} outstanding"
        );
    }

    AmortizationRun {
        rows,
        periods: period,
        total_paid,
        total_interest,
        total_principal: principal - balance,
        final_balance: balance,
        paid_off,
        hit_limit: !paid_off && !will_grow,
        will_grow,
    }
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

/// Roll schedule rows up into years of `periods_per_year` periods.
pub fn summarize_by_year(rows: &[AmortizationRow], periods_per_year: u32) -> Vec<YearSummary> {
    if periods_per_year == 0 {
        return Vec::new();
    }

    rows.chunks(periods_per_year as usize)
        .enumerate()
        .map(|(idx, chunk)| YearSummary {
            year: idx as u32 + 1,
            payments: chunk.iter().map(|r| r.payment).sum(),
            interest: chunk.iter().map(|r| r.interest).sum(),
            principal: chunk.iter().map(|r| r.principal).sum(),
            ending_balance: chunk
                .last()
                .map(|r| r.remaining_balance)
                .unwrap_or_default(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
