//! Currency conversion through a USD-quoted rate table.
//!
//! Every rate is quoted as units of the currency per one US dollar, so any
//! cross rate is `rate[to] / rate[from]`. A bundled snapshot covers the
//! major ISO 4217 codes; callers can override or extend it per code.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::error::FinCalcError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::validation::{reject_findings, Validator};
use crate::FinCalcResult;

/// Date of the bundled reference snapshot (ISO 8601).
pub const REFERENCE_RATES_AS_OF: &str = "2024-06-28";

/// Bounds on caller-supplied units per USD.
const MIN_CUSTOM_RATE: Decimal = dec!(0.000001);
const MAX_CUSTOM_RATE: Decimal = dec!(1_000_000);

/// Units per USD in the bundled snapshot.
const REFERENCE_RATES: &[(&str, Decimal)] = &[
    ("USD", dec!(1)),
    ("EUR", dec!(0.9335)),
    ("GBP", dec!(0.7906)),
    ("JPY", dec!(160.88)),
    ("CHF", dec!(0.8985)),
    ("CAD", dec!(1.3679)),
    ("AUD", dec!(1.4993)),
    ("NZD", dec!(1.6418)),
    ("CNY", dec!(7.2672)),
    ("HKD", dec!(7.8071)),
    ("SGD", dec!(1.3553)),
    ("INR", dec!(83.38)),
    ("KRW", dec!(1376.90)),
    ("MXN", dec!(18.32)),
    ("BRL", dec!(5.59)),
    ("ZAR", dec!(18.25)),
    ("SEK", dec!(10.59)),
    ("NOK", dec!(10.65)),
    ("DKK", dec!(6.9636)),
    ("PLN", dec!(4.0216)),
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateSource {
    /// Both legs came from the bundled snapshot
    Reference,
    /// At least one leg came from the caller's table
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConversionInput {
    pub amount: Money,
    pub from: String,
    pub to: String,
    /// Units per USD, keyed by ISO code; entries override the snapshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rates: Option<BTreeMap<String, Rate>>,
    /// Quote date of `rates`, reported back when any custom rate is used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rates_as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConversionOutput {
    pub amount: Money,
    pub from: String,
    pub to: String,
    pub converted_amount: Money,
    /// Units of `to` per unit of `from`
    pub rate: Rate,
    /// Units of `from` per unit of `to`
    pub inverse_rate: Rate,
    pub rate_source: RateSource,
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiConversionInput {
    pub amount: Money,
    pub from: String,
    pub targets: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rates: Option<BTreeMap<String, Rate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rates_as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionQuote {
    pub to: String,
    pub converted_amount: Money,
    pub rate: Rate,
    pub rate_source: RateSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiConversionOutput {
    pub amount: Money,
    pub from: String,
    pub conversions: Vec<ConversionQuote>,
    pub as_of: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Rate table
// ---------------------------------------------------------------------------

/// The bundled snapshot, keyed by ISO code.
pub fn reference_rates() -> BTreeMap<String, Rate> {
    REFERENCE_RATES
        .iter()
        .map(|(code, rate)| (code.to_string(), *rate))
        .collect()
}

pub fn reference_rates_as_of() -> Option<NaiveDate> {
    NaiveDate::parse_from_str(REFERENCE_RATES_AS_OF, "%Y-%m-%d").ok()
}

fn normalize(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Snapshot merged with caller overrides; override codes are normalized too.
struct RateTable {
    reference: BTreeMap<String, Rate>,
    custom: BTreeMap<String, Rate>,
}

impl RateTable {
    fn new(overrides: Option<&BTreeMap<String, Rate>>) -> Self {
        let custom = overrides
            .map(|m| m.iter().map(|(k, v)| (normalize(k), *v)).collect())
            .unwrap_or_default();
        Self {
            reference: reference_rates(),
            custom,
        }
    }

    fn lookup(&self, code: &str) -> Option<(Rate, RateSource)> {
        self.custom
            .get(code)
            .map(|r| (*r, RateSource::Custom))
            .or_else(|| self.reference.get(code).map(|r| (*r, RateSource::Reference)))
    }

    fn cross(&self, from: &str, to: &str) -> FinCalcResult<(Rate, RateSource)> {
        let (from_rate, from_src) = self.lookup(from).ok_or_else(|| unknown(from))?;
        let (to_rate, to_src) = self.lookup(to).ok_or_else(|| unknown(to))?;
        if from_rate.is_zero() {
            return Err(FinCalcError::DivisionByZero {
                context: format!("{from} rate"),
            });
        }
        let source = if from_src == RateSource::Custom || to_src == RateSource::Custom {
            RateSource::Custom
        } else {
            RateSource::Reference
        };
        Ok((to_rate / from_rate, source))
    }

    fn check_code(&self, v: &mut Validator, label: &str, code: &str) {
        let well_formed = code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic());
        v.ensure(
            well_formed,
            format!("{label} must be a three-letter ISO code (got \"{code}\")"),
        );
        if well_formed {
            v.ensure(
                self.lookup(code).is_some(),
                format!("No exchange rate available for {code}"),
            );
        }
    }

    fn check_custom(&self, v: &mut Validator) {
        for (code, rate) in &self.custom {
            v.range(
                &format!("Exchange rate for {code}"),
                *rate,
                MIN_CUSTOM_RATE,
                MAX_CUSTOM_RATE,
            );
        }
    }
}

fn unknown(code: &str) -> FinCalcError {
    FinCalcError::InvalidInput {
        field: "currency".into(),
        reason: format!("No exchange rate available for {code}"),
    }
}

fn as_of(source: RateSource, rates_as_of: Option<NaiveDate>) -> Option<NaiveDate> {
    match source {
        RateSource::Reference => reference_rates_as_of(),
        RateSource::Custom => rates_as_of,
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate_currency_conversion(input: &CurrencyConversionInput) -> Vec<String> {
    let table = RateTable::new(input.rates.as_ref());
    let mut v = Validator::new();
    v.non_negative("Amount", input.amount);
    table.check_code(&mut v, "From currency", &normalize(&input.from));
    table.check_code(&mut v, "To currency", &normalize(&input.to));
    table.check_custom(&mut v);
    v.finish()
}

pub fn validate_multi_conversion(input: &MultiConversionInput) -> Vec<String> {
    let table = RateTable::new(input.rates.as_ref());
    let mut v = Validator::new();
    v.non_negative("Amount", input.amount)
        .ensure(!input.targets.is_empty(), "At least one target currency is required");
    table.check_code(&mut v, "From currency", &normalize(&input.from));
    for target in &input.targets {
        table.check_code(&mut v, "Target currency", &normalize(target));
    }
    table.check_custom(&mut v);
    v.finish()
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Convert an amount from one currency to another.
pub fn convert_currency(
    input: &CurrencyConversionInput,
) -> FinCalcResult<ComputationOutput<CurrencyConversionOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    reject_findings(validate_currency_conversion(input))?;

    let table = RateTable::new(input.rates.as_ref());
    let from = normalize(&input.from);
    let to = normalize(&input.to);
    let (rate, rate_source) = table.cross(&from, &to)?;
    let inverse_rate = if rate.is_zero() {
        Decimal::ZERO
    } else {
        Decimal::ONE / rate
    };

    if rate_source == RateSource::Reference {
        warnings.push(format!(
            "Using reference rates as of {REFERENCE_RATES_AS_OF}; live rates will differ"
        ));
    }

    log::debug!("convert {} {from} -> {to} at {rate}", input.amount);

    let output = CurrencyConversionOutput {
        amount: input.amount,
        converted_amount: input.amount * rate,
        rate,
        inverse_rate,
        rate_source,
        as_of: as_of(rate_source, input.rates_as_of),
        from,
        to,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Currency Conversion (USD cross rates)",
        &serde_json::json!({
            "quote_convention": "units per USD",
            "reference_as_of": REFERENCE_RATES_AS_OF,
            "custom_rates": input.rates.as_ref().map(|m| m.len()).unwrap_or(0),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Convert one amount into several target currencies.
pub fn convert_to_many(
    input: &MultiConversionInput,
) -> FinCalcResult<ComputationOutput<MultiConversionOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    reject_findings(validate_multi_conversion(input))?;

    let table = RateTable::new(input.rates.as_ref());
    let from = normalize(&input.from);

    let conversions = input
        .targets
        .iter()
        .map(|target| {
            let to = normalize(target);
            let (rate, rate_source) = table.cross(&from, &to)?;
            Ok(ConversionQuote {
                converted_amount: input.amount * rate,
                rate,
                rate_source,
                to,
            })
        })
        .collect::<FinCalcResult<Vec<_>>>()?;

    let any_custom = conversions
        .iter()
        .any(|q| q.rate_source == RateSource::Custom);
    let source = if any_custom {
        RateSource::Custom
    } else {
        RateSource::Reference
    };
    if conversions
        .iter()
        .any(|q| q.rate_source == RateSource::Reference)
    {
        warnings.push(format!(
            "Some quotes use reference rates as of {REFERENCE_RATES_AS_OF}"
        ));
    }

    let output = MultiConversionOutput {
        amount: input.amount,
        from,
        conversions,
        as_of: as_of(source, input.rates_as_of),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Currency Conversion (one source, many targets)",
        &serde_json::json!({
            "quote_convention": "units per USD",
            "reference_as_of": REFERENCE_RATES_AS_OF,
            "targets": input.targets.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
