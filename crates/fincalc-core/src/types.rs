use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Year fractions or counts
pub type Years = Decimal;

/// How often a payment (or deposit, or withdrawal) recurs within a year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentFrequency {
    Weekly,
    Biweekly,
    SemiMonthly,
    #[default]
    Monthly,
    Quarterly,
    SemiAnnually,
    Annually,
}

impl PaymentFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            PaymentFrequency::Weekly => 52,
            PaymentFrequency::Biweekly => 26,
            PaymentFrequency::SemiMonthly => 24,
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::Quarterly => 4,
            PaymentFrequency::SemiAnnually => 2,
            PaymentFrequency::Annually => 1,
        }
    }

    /// Nominal annual rate split evenly across the periods of a year.
    pub fn periodic_rate(self, annual_rate: Rate) -> Rate {
        annual_rate / Decimal::from(self.periods_per_year())
    }

    /// Whole number of periods covering `years`, rounded to the nearest period.
    pub fn periods_in(self, years: Years) -> u32 {
        let periods = (years * Decimal::from(self.periods_per_year())).round();
        periods.to_u32().unwrap_or(0)
    }

    /// Warning for a term that had to be rounded to `periods` payments.
    pub fn rounded_term_warning(self, years: Years, periods: u32) -> Option<String> {
        let per_year = Decimal::from(self.periods_per_year());
        if years * per_year == Decimal::from(periods) {
            return None;
        }
        Some(format!(
            "A term of {} years is not a whole number of {:?} payments; using {periods} payments ({} years)",
            years.normalize(),
            self,
            (Decimal::from(periods) / per_year).normalize()
        ))
    }
}

/// Whether payments fall at the end (ordinary annuity) or the beginning
/// (annuity due) of each period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentTiming {
    #[default]
    End,
    Beginning,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
