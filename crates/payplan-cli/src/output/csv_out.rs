use payplan_core::ScheduleEntry;
use serde_json::Value;
use std::io::{self, Write};

/// Column order of every schedule export.
pub const SCHEDULE_HEADER: [&str; 6] = [
    "Phase",
    "Payment Date",
    "Payment",
    "Interest",
    "Principal",
    "Balance",
];

/// Write the full schedule, header first, amounts at full precision.
/// Returns the number of data rows.
pub fn write_schedule_csv<W: Write>(
    writer: W,
    entries: &[ScheduleEntry],
) -> Result<usize, Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(SCHEDULE_HEADER)?;
    for e in entries {
        wtr.write_record([
            e.phase.clone(),
            e.payment_date.format("%Y-%m-%d").to_string(),
            e.payment.normalize().to_string(),
            e.interest.normalize().to_string(),
            e.principal.normalize().to_string(),
            e.balance.normalize().to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(entries.len())
}

/// Write output as CSV to stdout. Analysis output is written as the schedule.
pub fn print_csv(value: &Value) {
    if let Some(entries) = super::schedule_entries(value) {
        if let Err(e) = write_schedule_csv(io::stdout().lock(), &entries) {
            eprintln!("CSV error: {}", e);
        }
        return;
    }

    let mut wtr = csv::Writer::from_writer(io::stdout().lock());
    match value {
        Value::Object(map) => {
            let fields = match map.get("result") {
                Some(Value::Object(result)) => result,
                _ => map,
            };
            let _ = wtr.write_record(["field", "value"]);
            for (key, val) in fields {
                let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
            }
        }
        Value::Array(rows) => write_rows(&mut wtr, rows),
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }
    let _ = wtr.flush();
}

fn write_rows<W: Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        for item in rows {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);
    for item in rows {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_schedule_csv_layout() {
        let entry = ScheduleEntry {
            phase: "Phase 1".into(),
            payment_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            payment: dec!(100000.0),
            interest: dec!(19712.5256673511),
            principal: dec!(80287.4743326489),
            balance: dec!(719712.5256673511),
        };
        let mut buf = Vec::new();
        let rows = write_schedule_csv(&mut buf, &[entry]).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(rows, 1);
        assert_eq!(
            text,
            "Phase,Payment Date,Payment,Interest,Principal,Balance\n\
             Phase 1,2025-06-30,100000,19712.5256673511,80287.4743326489,719712.5256673511\n"
        );
    }

    #[test]
    fn test_schedule_csv_keeps_every_digit() {
        let interest = dec!(0.1234567890123456789012345678);
        let entry = ScheduleEntry {
            phase: "Phase 3".into(),
            payment_date: NaiveDate::from_ymd_opt(2027, 1, 1).unwrap(),
            payment: dec!(1000),
            interest,
            principal: dec!(1000) - interest,
            balance: dec!(0),
        };
        let mut buf = Vec::new();
        write_schedule_csv(&mut buf, &[entry.clone()]).unwrap();

        let mut rdr = csv::Reader::from_reader(buf.as_slice());
        let record = rdr.records().next().unwrap().unwrap();
        let parsed: Vec<rust_decimal::Decimal> =
            (2..6).map(|i| record[i].parse().unwrap()).collect();
        assert_eq!(
            parsed,
            vec![entry.payment, entry.interest, entry.principal, entry.balance]
        );
    }
}
