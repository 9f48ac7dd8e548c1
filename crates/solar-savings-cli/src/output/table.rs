use colored::Colorize;
use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{display_scalar, flatten, is_record_list, result_of, RECORD_KEYS};

/// Render the envelope as tables: scalar fields first, then each record
/// list, then the sensitivity grid when present.
pub fn print_table(value: &Value) {
    let result = result_of(value);
    match result {
        Value::Object(map) => print_result(map),
        Value::Array(items) => print_records(items),
        other => println!("{}", display_scalar(other)),
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\n{}", "Warnings:".yellow().bold());
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {w}");
            }
        }
    }
    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {meth}");
    }
}

fn print_result(map: &Map<String, Value>) {
    let mut fields = Vec::new();
    flatten("", map, &mut fields);

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in &fields {
        if is_record_list(val) || key == "matrix" || key.ends_with("_values") {
            continue;
        }
        builder.push_record([key.clone(), display_scalar(val)]);
    }
    println!("{}", Table::from(builder));

    for key in RECORD_KEYS {
        match map.get(key) {
            Some(list @ Value::Array(items)) if is_record_list(list) => {
                println!("\n{}", key.bold());
                print_records(items);
            }
            _ => {}
        }
    }

    if let Some(grid) = sensitivity_grid(map) {
        println!("\n{}", "total_savings".bold());
        println!("{grid}");
    }
}

fn print_records(items: &[Value]) {
    let Some(Value::Object(first)) = items.first() else {
        for item in items {
            println!("{}", display_scalar(item));
        }
        return;
    };

    let mut headers = Vec::new();
    flatten("", first, &mut headers);
    let headers: Vec<String> = headers.into_iter().map(|(k, _)| k).collect();

    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for item in items {
        let Value::Object(map) = item else { continue };
        let mut cells = Vec::new();
        flatten("", map, &mut cells);
        let row: Vec<String> = headers
            .iter()
            .map(|h| {
                cells
                    .iter()
                    .find(|(k, _)| k == h)
                    .map(|(_, v)| display_scalar(v))
                    .unwrap_or_default()
            })
            .collect();
        builder.push_record(row);
    }
    println!("{}", Table::from(builder));
}

/// Grid of total savings with variable 1 down the side and variable 2 across.
fn sensitivity_grid(map: &Map<String, Value>) -> Option<Table> {
    let Value::Array(matrix) = map.get("matrix")? else {
        return None;
    };
    let v1_name = map.get("variable_1_name").and_then(Value::as_str)?;
    let v1_values = map.get("variable_1_values")?.as_array()?;
    let v2_name = map.get("variable_2_name").and_then(Value::as_str);
    let v2_values = map
        .get("variable_2_values")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut builder = Builder::default();
    let mut header = vec![match v2_name {
        Some(v2) => format!("{v1_name} \\ {v2}"),
        None => v1_name.to_string(),
    }];
    if v2_values.is_empty() {
        header.push("total_savings".to_string());
    } else {
        header.extend(v2_values.iter().map(display_scalar));
    }
    builder.push_record(header);

    for (v1, row) in v1_values.iter().zip(matrix) {
        let mut record = vec![display_scalar(v1)];
        if let Value::Array(cells) = row {
            record.extend(cells.iter().map(display_scalar));
        }
        builder.push_record(record);
    }
    Some(Table::from(builder))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_two_way_grid_layout() {
        let result = json!({
            "variable_1_name": "system_kw",
            "variable_2_name": "current_kwh_cost",
            "variable_1_values": ["4", "6"],
            "variable_2_values": ["0.10", "0.20"],
            "matrix": [["100.5", "200"], [null, "400"]],
        });
        let grid = sensitivity_grid(result.as_object().unwrap())
            .unwrap()
            .to_string();
        assert!(grid.contains("system_kw \\ current_kwh_cost"));
        assert!(grid.contains("0.20"));
        assert!(grid.contains("100.5"));
        assert!(grid.contains('-'));
    }

    #[test]
    fn test_no_grid_without_matrix() {
        let result = json!({"rows": []});
        assert!(sensitivity_grid(result.as_object().unwrap()).is_none());
    }
}
