use serde_json::Value;

/// Headline field of each calculator, in priority order.
const HEADLINE_KEYS: &[&str] = &[
    "payment",
    "monthly_payment",
    "first_payment",
    "balance_at_retirement",
    "annual_savings_needed",
    "converted_amount",
    "final_price_with_tax",
    "final_price",
    "discount_rate",
    "recommended_monthly_rent",
];

/// Print only the headline answer of a calculation.
pub fn print_minimal(value: &Value) {
    println!("{}", headline(value));
}

fn headline(value: &Value) -> String {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let Value::Object(map) = result else {
        return scalar(result);
    };

    if let Some(val) = HEADLINE_KEYS
        .iter()
        .filter_map(|key| map.get(*key))
        .find(|val| !val.is_null())
    {
        return scalar(val);
    }

    // Multi-currency quotes: one "CODE amount" per line
    if let Some(Value::Array(quotes)) = map.get("conversions") {
        return quotes
            .iter()
            .map(|q| {
                format!(
                    "{} {}",
                    q.get("to").map(scalar).unwrap_or_default(),
                    q.get("converted_amount").map(scalar).unwrap_or_default()
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
    }

    map.iter()
        .next()
        .map(|(key, val)| format!("{key}: {}", scalar(val)))
        .unwrap_or_default()
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
