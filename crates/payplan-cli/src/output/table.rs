use payplan_core::ScheduleEntry;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::csv_out::SCHEDULE_HEADER;

/// Fields of an analysis result that get their own section.
const SECTIONED_FIELDS: [&str; 3] = ["schedule", "skipped_phases", "termination"];

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(result) => print_result_table(result, map),
            None => print_flat_object(map),
        },
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    let Value::Object(res_map) = result else {
        print_flat_object(envelope);
        return;
    };

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in res_map {
        if !SECTIONED_FIELDS.contains(&key.as_str()) {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
    }
    println!("{}", Table::from(builder));

    if let Some(entries) = super::schedule_entries(&Value::Object(envelope.clone())) {
        println!("\nPayment schedule:");
        print_schedule(&entries);
    }

    if let Some(Value::Array(skipped)) = res_map.get("skipped_phases") {
        if !skipped.is_empty() {
            println!("\nSkipped phases:");
            print_array_table(skipped);
        }
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_schedule(entries: &[ScheduleEntry]) {
    if entries.is_empty() {
        println!("(no payments)");
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(SCHEDULE_HEADER);
    for e in entries {
        builder.push_record([
            e.phase.clone(),
            e.payment_date.format("%b %d, %Y").to_string(),
            money(e.payment),
            money(e.interest),
            money(e.principal),
            money(e.balance),
        ]);
    }
    println!("{}", Table::from(builder));
}

fn print_flat_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_array_table(arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        if arr.is_empty() {
            println!("(empty)");
        }
        for item in arr {
            println!("{}", format_value(item));
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }
    println!("{}", Table::from(builder));
}

/// Two decimal places with comma thousands separators.
fn money(value: Decimal) -> String {
    let s = format!("{:.2}", value.round_dp(2));
    let (sign, body) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };
    let (int_part, frac) = body.split_once('.').unwrap_or((body, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}.{frac}")
}

fn format_value(value: &Value) -> String {
    match value {
        // Decimals travel as strings; show them at display precision.
        Value::String(s) => match s.parse::<Decimal>() {
            Ok(d) => d.round_dp(2).to_string(),
            Err(_) => s.clone(),
        },
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
