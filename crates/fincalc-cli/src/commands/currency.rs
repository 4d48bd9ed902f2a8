use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;

use fincalc_core::currency::conversion::{
    self, CurrencyConversionInput, MultiConversionInput,
};

use super::{required, CommandResult};
use crate::input;

/// Arguments for currency conversion.
///
/// More than one `--to` converts into each target.
#[derive(Args)]
pub struct ConvertArgs {
    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Source currency code
    #[arg(long)]
    pub from: Option<String>,

    /// Target currency code (repeatable)
    #[arg(long, num_args = 1..)]
    pub to: Vec<String>,

    /// Rate override as CODE=UNITS_PER_USD (repeatable)
    #[arg(long = "rate", value_parser = parse_rate)]
    pub rates: Vec<(String, Decimal)>,

    /// Print the bundled reference rates and exit
    #[arg(long)]
    pub list_rates: bool,
}

fn parse_rate(s: &str) -> Result<(String, Decimal), String> {
    let (code, rate) = s
        .split_once('=')
        .ok_or_else(|| format!("expected CODE=RATE, got '{s}'"))?;
    let rate: Decimal = rate
        .trim()
        .parse()
        .map_err(|e| format!("invalid rate '{rate}': {e}"))?;
    Ok((code.trim().to_string(), rate))
}

fn overrides(rates: Vec<(String, Decimal)>) -> Option<BTreeMap<String, Decimal>> {
    if rates.is_empty() {
        None
    } else {
        Some(rates.into_iter().collect())
    }
}

fn load_file(path: &str) -> Result<Value, Box<dyn Error>> {
    input::file::read_input::<Value>(path)
}

pub fn run_convert(args: ConvertArgs) -> CommandResult {
    if args.list_rates {
        return Ok(serde_json::json!({
            "result": conversion::reference_rates(),
            "methodology": "Bundled reference rates (units per USD)",
            "warnings": [],
            "as_of": conversion::REFERENCE_RATES_AS_OF,
        }));
    }

    // A file or piped document with "targets" is a multi-target request
    let document = match args.input.as_deref() {
        Some(path) => Some(load_file(path)?),
        None => input::stdin::read_stdin()?,
    };
    if let Some(doc) = document {
        if doc.get("targets").is_some() {
            let multi: MultiConversionInput = serde_json::from_value(doc)?;
            return Ok(serde_json::to_value(conversion::convert_to_many(&multi)?)?);
        }
        let single: CurrencyConversionInput = serde_json::from_value(doc)?;
        return Ok(serde_json::to_value(conversion::convert_currency(&single)?)?);
    }

    let amount = required(args.amount, "amount")?;
    let from = required(args.from, "from")?;
    let rates = overrides(args.rates);

    match args.to.len() {
        0 => Err("--to is required (or provide --input)".into()),
        1 => {
            let single = CurrencyConversionInput {
                amount,
                from,
                to: args.to[0].clone(),
                rates,
                rates_as_of: None,
            };
            Ok(serde_json::to_value(conversion::convert_currency(&single)?)?)
        }
        _ => {
            let multi = MultiConversionInput {
                amount,
                from,
                targets: args.to,
                rates,
                rates_as_of: None,
            };
            Ok(serde_json::to_value(conversion::convert_to_many(&multi)?)?)
        }
    }
}
