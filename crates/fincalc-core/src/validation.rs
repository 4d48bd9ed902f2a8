//! Range checks shared by every calculator.
//!
//! Findings are collected as plain sentences rather than returned as the
//! first error, so a form can show every problem at once.

use rust_decimal::Decimal;

use rust_decimal_macros::dec;

use crate::error::FinCalcError;
use crate::FinCalcResult;

/// Largest monetary amount accepted by any calculator.
pub const MAX_AMOUNT: Decimal = dec!(1_000_000_000_000_000);

/// Accumulates human-readable validation findings.
#[derive(Debug, Default)]
pub struct Validator {
    findings: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `value` must lie within `[min, max]`.
    pub fn range(&mut self, label: &str, value: Decimal, min: Decimal, max: Decimal) -> &mut Self {
        if value < min || value > max {
            self.findings
                .push(format!("{label} must be between {min} and {max} (got {value})"));
        }
        self
    }

    /// Integer variant of [`Validator::range`], used for ages, terms and counts.
    pub fn range_u32(&mut self, label: &str, value: u32, min: u32, max: u32) -> &mut Self {
        if value < min || value > max {
            self.findings
                .push(format!("{label} must be between {min} and {max} (got {value})"));
        }
        self
    }

    /// Amount above zero and at most [`MAX_AMOUNT`].
    pub fn positive(&mut self, label: &str, value: Decimal) -> &mut Self {
        if value <= Decimal::ZERO {
            self.findings
                .push(format!("{label} must be greater than 0 (got {value})"));
        }
        self.at_most_max(label, value)
    }

    /// Amount of zero or more, at most [`MAX_AMOUNT`].
    pub fn non_negative(&mut self, label: &str, value: Decimal) -> &mut Self {
        if value < Decimal::ZERO {
            self.findings
                .push(format!("{label} cannot be negative (got {value})"));
        }
        self.at_most_max(label, value)
    }

    fn at_most_max(&mut self, label: &str, value: Decimal) -> &mut Self {
        if value > MAX_AMOUNT {
            self.findings
                .push(format!("{label} cannot exceed {MAX_AMOUNT} (got {value})"));
        }
        self
    }

    /// Record `message` unless `condition` holds.
    pub fn ensure(&mut self, condition: bool, message: impl Into<String>) -> &mut Self {
        if !condition {
            self.findings.push(message.into());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn finish(self) -> Vec<String> {
        self.findings
    }
}

/// Turn a list of findings into a `Validation` error when non-empty.
pub fn reject_findings(findings: Vec<String>) -> FinCalcResult<()> {
    if findings.is_empty() {
        Ok(())
    } else {
        log::debug!("input rejected with {} finding(s)", findings.len());
        Err(FinCalcError::Validation(findings))
    }
}
