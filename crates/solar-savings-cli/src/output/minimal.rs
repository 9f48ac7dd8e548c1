use rust_decimal::Decimal;
use serde_json::Value;

use super::{display_scalar, format_money, result_of};

/// Headline figures, tried in order. Currency paths print as dollars.
const HEADLINES: [(&str, bool); 4] = [
    ("/summary/total_savings", true),
    ("/base_case_total_savings", true),
    ("/cagr", false),
    ("/productivity_factor", false),
];

/// Print just the key answer of the command.
pub fn print_minimal(value: &Value) {
    println!("{}", headline(result_of(value)));
}

fn headline(result: &Value) -> String {
    for (pointer, money) in HEADLINES {
        match result.pointer(pointer) {
            Some(Value::Null) | None => continue,
            Some(val) => {
                let amount = val.as_str().and_then(|s| s.parse::<Decimal>().ok());
                return match amount {
                    Some(d) if money => format_money(d),
                    _ => display_scalar(val),
                };
            }
        }
    }

    match result {
        Value::Object(map) => match map.iter().next() {
            Some((key, val)) => format!("{key}: {}", display_scalar(val)),
            None => String::new(),
        },
        other => display_scalar(other),
    }
}
