use serde_json::{Map, Value};
use std::io::{self, Write};

/// Row collections worth exporting, in priority order.
const ROW_KEYS: &[&str] = &[
    "schedule",
    "year_by_year",
    "conversions",
    "steps",
    "annual_summary",
];

/// Write CSV to stdout: the calculation's schedule when it has one,
/// otherwise a two-column field/value listing.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    if let Err(e) = write_csv(stdout.lock(), value) {
        eprintln!("CSV output error: {e}");
    }
}

fn write_csv<W: Write>(out: W, value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(out);

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(map) => match rows_of(map) {
            Some(rows) => write_rows(&mut wtr, rows)?,
            None => {
                wtr.write_record(["field", "value"])?;
                for (key, val) in map {
                    wtr.write_record([key.as_str(), &field(val)])?;
                }
            }
        },
        Value::Array(rows) => write_rows(&mut wtr, rows)?,
        other => wtr.write_record([field(other)])?,
    }

    wtr.flush()?;
    Ok(())
}

fn rows_of(map: &Map<String, Value>) -> Option<&Vec<Value>> {
    ROW_KEYS.iter().find_map(|key| match map.get(*key) {
        Some(Value::Array(rows)) if !rows.is_empty() => Some(rows),
        _ => None,
    })
}

fn write_rows<W: Write>(
    wtr: &mut csv::Writer<W>,
    rows: &[Value],
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(Value::Object(first)) = rows.first() else {
        for row in rows {
            wtr.write_record([field(row)])?;
        }
        return Ok(());
    };

    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    wtr.write_record(&headers)?;
    for row in rows.iter().filter_map(Value::as_object) {
        let record: Vec<String> = headers
            .iter()
            .map(|h| row.get(*h).map(field).unwrap_or_default())
            .collect();
        wtr.write_record(&record)?;
    }
    Ok(())
}

fn field(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
