use serde_json::Value;

/// Print the balance report envelope as pretty JSON.
///
/// The envelope keeps the field order of the report:
///
/// ```text
/// {
///   "result": { "holdings": [...], "summary": {...}, "target": {...} | null },
///   "methodology": "...",
///   "assumptions": { "target_yield": ... | null, "sort": "Yield" | "MarketValue" },
///   "warnings": [...],
///   "metadata": { "version": "...", "precision": "..." }
/// }
/// ```
///
/// Decimals are strings, so `"3.00"` rather than `3.0`. Undefined values
/// (a zero-value portfolio's yield, a report without `-y`) are `null`.
pub fn print_json(value: &Value) {
    match render_json(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("error: could not encode report as JSON: {}", e),
    }
}

fn render_json(value: &Value) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_keeps_section_order() {
        let value = json!({
            "result": { "summary": { "portfolio_yield_pct": null } },
            "methodology": "m",
            "assumptions": {},
            "warnings": ["Portfolio has zero market value; yield is undefined"],
            "metadata": { "version": "0.1.0", "precision": "rust_decimal_128bit" }
        });
        let text = render_json(&value).unwrap();
        let offsets: Vec<usize> = ["result", "methodology", "assumptions", "warnings", "metadata"]
            .iter()
            .map(|key| text.find(&format!("\"{}\"", key)).unwrap())
            .collect();
        assert!(offsets.windows(2).all(|w| w[0] < w[1]), "{}", text);
        assert!(text.contains("\"portfolio_yield_pct\": null"));
    }

    #[test]
    fn test_decimal_strings_are_not_reformatted() {
        let value = json!({ "result": { "summary": { "portfolio_yield_pct": "3.00" } } });
        assert!(render_json(&value).unwrap().contains("\"3.00\""));
    }
}
