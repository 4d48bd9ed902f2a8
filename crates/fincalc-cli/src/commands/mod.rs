pub mod annuity;
pub mod credit_card;
pub mod currency;
pub mod discount;
pub mod education;
pub mod housing;
pub mod lease;
pub mod payment;
pub mod retirement;

use clap::ValueEnum;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::error::Error;

use fincalc_core::{PaymentFrequency, PaymentTiming};

use crate::input;

pub type CommandResult = Result<Value, Box<dyn Error>>;

/// Resolve a calculator input from `--input`, then piped stdin, then flags.
pub fn resolve_input<T, F>(path: Option<&str>, from_flags: F) -> Result<T, Box<dyn Error>>
where
    T: DeserializeOwned,
    F: FnOnce() -> Result<T, Box<dyn Error>>,
{
    if let Some(path) = path {
        log::debug!("reading input from {path}");
        return input::file::read_input(path);
    }
    if let Some(value) = input::stdin::read_stdin()? {
        log::debug!("reading input from stdin");
        return Ok(serde_json::from_value(value)?);
    }
    from_flags()
}

/// Unwrap a flag that is mandatory when no input file is given.
pub fn required<T>(value: Option<T>, flag: &str) -> Result<T, Box<dyn Error>> {
    value.ok_or_else(|| format!("--{flag} is required (or provide --input)").into())
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum FrequencyArg {
    Weekly,
    Biweekly,
    SemiMonthly,
    #[default]
    Monthly,
    Quarterly,
    SemiAnnually,
    Annually,
}

impl From<FrequencyArg> for PaymentFrequency {
    fn from(arg: FrequencyArg) -> Self {
        match arg {
            FrequencyArg::Weekly => PaymentFrequency::Weekly,
            FrequencyArg::Biweekly => PaymentFrequency::Biweekly,
            FrequencyArg::SemiMonthly => PaymentFrequency::SemiMonthly,
            FrequencyArg::Monthly => PaymentFrequency::Monthly,
            FrequencyArg::Quarterly => PaymentFrequency::Quarterly,
            FrequencyArg::SemiAnnually => PaymentFrequency::SemiAnnually,
            FrequencyArg::Annually => PaymentFrequency::Annually,
        }
    }
}

pub fn timing(due: bool) -> PaymentTiming {
    if due {
        PaymentTiming::Beginning
    } else {
        PaymentTiming::End
    }
}
