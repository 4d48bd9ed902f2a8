use colored::Colorize;
use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Print the scalar results as a Field/Value table, followed by one table per
/// row collection (schedules, yearly summaries, quotes).
pub fn print_table(value: &Value) {
    let Value::Object(envelope) = value else {
        println!("{value}");
        return;
    };

    match envelope.get("result") {
        Some(Value::Object(result)) => print_result(result),
        Some(other) => println!("{}", cell(other)),
        None => print_result(envelope),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\n{}", "Warnings:".yellow().bold());
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {w}");
            }
        }
    }

    if let Some(Value::String(methodology)) = envelope.get("methodology") {
        println!("\nMethodology: {methodology}");
    }
}

fn print_result(result: &Map<String, Value>) {
    let mut summary = Builder::default();
    summary.push_record(["Field", "Value"]);
    let mut collections = Vec::new();

    for (key, val) in result {
        match val {
            Value::Array(rows) if rows.first().is_some_and(Value::is_object) => {
                collections.push((key, rows));
            }
            _ => summary.push_record([key.as_str(), &cell(val)]),
        }
    }
    println!("{}", Table::from(summary));

    for (title, rows) in collections {
        println!("\n{}", title.replace('_', " ").bold());
        println!("{}", rows_table(rows));
    }
}

fn rows_table(rows: &[Value]) -> Table {
    let headers: Vec<String> = rows
        .first()
        .and_then(Value::as_object)
        .map(|first| first.keys().cloned().collect())
        .unwrap_or_default();

    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(|h| h.replace('_', " ")));
    for row in rows.iter().filter_map(Value::as_object) {
        builder.push_record(
            headers
                .iter()
                .map(|h| row.get(h).map(cell).unwrap_or_default()),
        );
    }
    Table::from(builder)
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => arr.iter().map(cell).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
