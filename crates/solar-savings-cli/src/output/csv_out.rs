use serde_json::{Map, Value};
use std::io;

use super::{flatten, is_record_list, result_of, RECORD_KEYS};

/// Write the primary table of the result as CSV to stdout.
///
/// Record lists (yearly rows, trend points, regions, site levels) become one
/// line per record; a sensitivity grid becomes one line per cell; anything
/// else is written as field/value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    if let Err(e) = write_csv(&mut wtr, result_of(value)) {
        eprintln!("failed to write CSV output: {e}");
    }
}

fn write_csv<W: io::Write>(wtr: &mut csv::Writer<W>, result: &Value) -> csv::Result<()> {
    match result {
        Value::Object(map) => {
            if map.contains_key("matrix") {
                write_grid(wtr, map)?;
            } else if let Some(items) = RECORD_KEYS
                .iter()
                .filter_map(|k| map.get(*k))
                .find(|v| is_record_list(v))
                .and_then(Value::as_array)
            {
                write_records(wtr, items)?;
            } else {
                let mut fields = Vec::new();
                flatten("", map, &mut fields);
                wtr.write_record(["field", "value"])?;
                for (key, val) in &fields {
                    wtr.write_record([key.as_str(), &csv_cell(val)])?;
                }
            }
        }
        Value::Array(items) => write_records(wtr, items)?,
        other => wtr.write_record([csv_cell(other)])?,
    }
    wtr.flush()?;
    Ok(())
}

fn write_records<W: io::Write>(wtr: &mut csv::Writer<W>, items: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = items.first() else {
        return Ok(());
    };
    let mut header_fields = Vec::new();
    flatten("", first, &mut header_fields);
    let headers: Vec<&str> = header_fields.iter().map(|(k, _)| k.as_str()).collect();
    wtr.write_record(&headers)?;

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
                    .map(|(_, v)| csv_cell(v))
                    .unwrap_or_default()
            })
            .collect();
        wtr.write_record(&row)?;
    }
    Ok(())
}

/// Long format: one line per (variable_1, variable_2) cell.
fn write_grid<W: io::Write>(wtr: &mut csv::Writer<W>, map: &Map<String, Value>) -> csv::Result<()> {
    let name = |key: &str| map.get(key).and_then(Value::as_str).unwrap_or(key).to_string();
    let empty = Vec::new();
    let v1_values = map.get("variable_1_values").and_then(Value::as_array).unwrap_or(&empty);
    let v2_values = map.get("variable_2_values").and_then(Value::as_array).unwrap_or(&empty);
    let matrix = map.get("matrix").and_then(Value::as_array).unwrap_or(&empty);
    let two_way = !v2_values.is_empty();

    let mut header = vec![name("variable_1_name")];
    if two_way {
        header.push(name("variable_2_name"));
    }
    header.push("total_savings".to_string());
    wtr.write_record(&header)?;

    for (v1, row) in v1_values.iter().zip(matrix) {
        let cells = row.as_array().map(Vec::as_slice).unwrap_or_default();
        if two_way {
            for (v2, cell) in v2_values.iter().zip(cells) {
                wtr.write_record([csv_cell(v1), csv_cell(v2), csv_cell(cell)])?;
            }
        } else if let Some(cell) = cells.first() {
            wtr.write_record([csv_cell(v1), csv_cell(cell)])?;
        }
    }
    Ok(())
}

fn csv_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
