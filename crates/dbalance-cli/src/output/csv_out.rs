use serde_json::Value;
use std::io::{self, Write};

use super::{plain, result_of};

/// Write each report section as CSV to stdout, separated by a blank line.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    if let Err(e) = write_csv(value, stdout.lock()) {
        eprintln!("CSV output error: {}", e);
    }
}

pub fn write_csv<W: Write>(value: &Value, mut out: W) -> Result<(), Box<dyn std::error::Error>> {
    let result = result_of(value);

    if let Some(Value::Array(holdings)) = result.get("holdings") {
        write_array_csv(&mut out, holdings)?;
    }

    if let Some(Value::Object(summary)) = result.get("summary") {
        out.write_all(b"\n")?;
        let mut wtr = csv::Writer::from_writer(&mut out);
        wtr.write_record(["field", "value"])?;
        for (key, val) in summary {
            wtr.write_record([key.as_str(), &plain(val)])?;
        }
        wtr.flush()?;
    }

    if let Some(Value::Array(changes)) = result.get("target").and_then(|t| t.get("changes")) {
        out.write_all(b"\n")?;
        write_array_csv(&mut out, changes)?;
    }

    out.flush()?;
    Ok(())
}

fn write_array_csv<W: Write>(out: W, arr: &[Value]) -> Result<(), Box<dyn std::error::Error>> {
    let Some(Value::Object(first)) = arr.first() else {
        return Ok(());
    };

    let mut wtr = csv::Writer::from_writer(out);
    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    wtr.write_record(&headers)?;

    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(plain).unwrap_or_default())
                .collect();
            wtr.write_record(&row)?;
        }
    }

    wtr.flush()?;
    Ok(())
}
