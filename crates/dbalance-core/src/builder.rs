//! Builds [`Position`] records from rows of delimited text.
//!
//! Columns are mapped by ordinal, not by header name. The layout is the
//! "Fundamental" view export:
//!
//! | Ordinal | Column          | Used as                 |
//! |---------|-----------------|-------------------------|
//! | 0       | Symbol          | `symbol`                |
//! | 1       | Qty             | `quantity` (with unit)  |
//! | 2       | Description     | `description`           |
//! | 3       | Price           | `price`                 |
//! | 4       | Chg ($)         | —                       |
//! | 5       | 52-week high    | `yearly_high`           |
//! | 6       | 52-week low     | `yearly_low`            |
//! | 7       | P/E             | —                       |
//! | 8       | Div yield       | `dividend_yield`        |
//! | 9+      | Ex-div date, …  | —                       |
//!
//! The first row is a header and contributes nothing.

use serde::{Deserialize, Serialize};
use std::io::Read;

use crate::fields::{parse_decimal, parse_quantity, parse_yield};
use crate::error::BalanceError;
use crate::position::Position;
use crate::BalanceResult;

const SYMBOL: usize = 0;
const QUANTITY: usize = 1;
const DESCRIPTION: usize = 2;
const PRICE: usize = 3;
const YEARLY_HIGH: usize = 5;
const YEARLY_LOW: usize = 6;
const DIVIDEND_YIELD: usize = 8;

/// Number of leading rows skipped before data.
pub const HEADER_ROWS: usize = 1;

/// Field separator of the export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Delimiter {
    #[default]
    Tab,
    Comma,
}

impl Delimiter {
    pub fn as_byte(&self) -> u8 {
        match self {
            Delimiter::Tab => b'\t',
            Delimiter::Comma => b',',
        }
    }
}

/// Fold one field into the record being built.
pub fn apply_field(mut position: Position, ordinal: usize, field: &str) -> Position {
    match ordinal {
        SYMBOL => position.symbol = field.to_string(),
        QUANTITY => position.quantity = parse_quantity(field),
        DESCRIPTION => position.description = field.to_string(),
        PRICE => position.price = parse_decimal(field),
        YEARLY_HIGH => position.yearly_high = parse_decimal(field),
        YEARLY_LOW => position.yearly_low = parse_decimal(field),
        DIVIDEND_YIELD => position.dividend_yield = parse_yield(field),
        _ => {}
    }
    position
}

/// Build a single record from the fields of one row.
///
/// Returns `None` for a row with no fields at all.
pub fn build_position<I, S>(fields: I) -> Option<Position>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut fields = fields.into_iter().enumerate().peekable();
    fields.peek()?;
    Some(fields.fold(Position::default(), |position, (ordinal, field)| {
        apply_field(position, ordinal, field.as_ref())
    }))
}

/// Build records from every data row, skipping the header.
pub fn build_positions<R, I, S>(rows: R) -> Vec<Position>
where
    R: IntoIterator<Item = I>,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    rows.into_iter()
        .skip(HEADER_ROWS)
        .filter_map(build_position)
        .inspect(|p| {
            tracing::debug!(
                symbol = %p.symbol,
                quantity = p.quantity,
                price = %p.price,
                dividend_yield = %p.dividend_yield,
                "built position"
            )
        })
        .collect()
}

/// Decode delimited text and build positions from it.
///
/// Rows may have any number of fields and cells need not be UTF-8; invalid
/// bytes are replaced with U+FFFD. Structural problems (an unterminated quoted
/// field) surface as [`BalanceError::Decode`]; bad cell values do not.
pub fn read_positions<R: Read>(
    mut reader: R,
    delimiter: Delimiter,
) -> BalanceResult<Vec<Position>> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;

    if let Some(line) = unterminated_quote(&data, delimiter.as_byte()) {
        tracing::warn!(line, "unterminated quoted field");
        return Err(BalanceError::Decode(format!(
            "unterminated quoted field starting on line {}",
            line
        )));
    }

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter.as_byte())
        .from_reader(data.as_slice());

    let rows = rdr.byte_records().collect::<Result<Vec<_>, _>>()?;
    let positions = build_positions(rows.iter().map(|row| row.iter().map(String::from_utf8_lossy)));

    tracing::info!(
        rows = rows.len(),
        positions = positions.len(),
        "read portfolio export"
    );
    Ok(positions)
}

/// Line (1-based) of a quoted field that is never closed, if any.
///
/// A quote only opens a field when it is the field's first byte; elsewhere it
/// is literal. Inside a quoted field `""` is an escaped quote.
fn unterminated_quote(data: &[u8], delimiter: u8) -> Option<usize> {
    let mut line = 1;
    let mut opened_on = None;
    let mut field_start = true;
    let mut bytes = data.iter().copied().peekable();

    while let Some(b) = bytes.next() {
        if b == b'\n' {
            line += 1;
        }
        match opened_on {
            Some(_) => {
                if b == b'"' {
                    if bytes.peek() == Some(&b'"') {
                        bytes.next();
                    } else {
                        opened_on = None;
                    }
                }
            }
            None => {
                if b == b'"' && field_start {
                    opened_on = Some(line);
                }
                field_start = b == delimiter || b == b'\n' || b == b'\r';
            }
        }
    }
    opened_on
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    const HEADER: &str =
        "Symbol\tQty\tDescription\tPrice\tChg ($)\t52 Wk High\t52 Wk Low\tP/E\tDiv Yield\tEx-Div Date\n";

    #[test]
    fn test_full_row_maps_every_ordinal() {
        let text = format!(
            "{}KO\t10M\tCoca-Cola Co\t61.20\t+0.35\t64.99\t51.55\t24.1\t3.01%\t3/14/2024\n",
            HEADER
        );
        let positions = read_positions(text.as_bytes(), Delimiter::Tab).unwrap();
        assert_eq!(positions.len(), 1);
        let ko = &positions[0];
        assert_eq!(ko.symbol, "KO");
        assert_eq!(ko.quantity, 100);
        assert_eq!(ko.description, "Coca-Cola Co");
        assert_eq!(ko.price, dec!(61.20));
        assert_eq!(ko.yearly_high, dec!(64.99));
        assert_eq!(ko.yearly_low, dec!(51.55));
        assert_eq!(ko.dividend_yield, dec!(0.0301));
    }

    #[test]
    fn test_header_row_is_skipped() {
        let positions = read_positions(HEADER.as_bytes(), Delimiter::Tab).unwrap();
        assert!(positions.is_empty());
    }

    #[test]
    fn test_short_row_leaves_defaults() {
        let text = format!("{}CASH\t500\n", HEADER);
        let positions = read_positions(text.as_bytes(), Delimiter::Tab).unwrap();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].symbol, "CASH");
        assert_eq!(positions[0].quantity, 500);
        assert_eq!(positions[0].price, Decimal::ZERO);
        assert_eq!(positions[0].dividend_yield, Decimal::ZERO);
        assert!(positions[0].description.is_empty());
    }

    #[test]
    fn test_malformed_numbers_resolve_to_zero() {
        let text = format!("{}XYZ\tlots\tThing\tn/a\t\t\t\t\t--\n", HEADER);
        let positions = read_positions(text.as_bytes(), Delimiter::Tab).unwrap();
        assert_eq!(positions[0].quantity, 0);
        assert_eq!(positions[0].price, Decimal::ZERO);
        assert_eq!(positions[0].dividend_yield, Decimal::ZERO);
    }

    #[test]
    fn test_comma_delimiter_with_quoting() {
        let text = "h\nT,\"1,000\",\"AT&T, Inc.\",17.50,,,,,6.3\n";
        let positions = read_positions(text.as_bytes(), Delimiter::Comma).unwrap();
        assert_eq!(positions[0].symbol, "T");
        // quantity stops at the grouping comma, as the export never groups digits
        assert_eq!(positions[0].quantity, 1);
        assert_eq!(positions[0].description, "AT&T, Inc.");
        assert_eq!(positions[0].price, dec!(17.50));
        assert_eq!(positions[0].dividend_yield, dec!(0.063));
    }

    #[test]
    fn test_extra_columns_ignored() {
        let rows = vec![
            vec!["header"],
            vec!["A", "1", "", "2", "", "", "", "", "4", "x", "y", "z"],
        ];
        let positions = build_positions(rows);
        assert_eq!(positions[0].market_value(), Some(dec!(2)));
        assert_eq!(positions[0].dividend_yield, dec!(0.04));
    }

    #[test]
    fn test_duplicate_symbols_kept_separately() {
        let rows = vec![vec!["h"], vec!["A", "1"], vec!["A", "2"]];
        let positions = build_positions(rows);
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[1].quantity, 2);
    }

    #[test]
    fn test_empty_row_produces_no_record() {
        let rows: Vec<Vec<&str>> = vec![vec!["h"], vec![], vec!["B"]];
        let positions = build_positions(rows);
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].symbol, "B");
    }

    #[test]
    fn test_latin1_description_is_read_lossily() {
        let bytes: &[u8] = b"h\nA\t100\tCaf\xe9 Corp\t10\t\t\t\t\t4%\n";
        let positions = read_positions(bytes, Delimiter::Tab).unwrap();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].description, "Caf\u{FFFD} Corp");
        assert_eq!(positions[0].price, dec!(10));
        assert_eq!(positions[0].dividend_yield, dec!(0.04));
    }

    #[test]
    fn test_unterminated_quote_is_decode_error() {
        let text = "h\nA\t100\t\"Acme\t10\t\t\t\t\t4%\nB\t50\tBeta\t20\t\t\t\t\t2%\nC\t10\tGamma\t5\t\t\t\t\t1%\n";
        let err = read_positions(text.as_bytes(), Delimiter::Tab).unwrap_err();
        match err {
            BalanceError::Decode(msg) => assert!(msg.contains("line 2"), "{}", msg),
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_quoted_field_may_span_lines() {
        let text = "h\nA\t100\t\"Acme\nHoldings\"\t10\nB\t5\t\"say \"\"hi\"\"\"\t2\n";
        let positions = read_positions(text.as_bytes(), Delimiter::Tab).unwrap();
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0].description, "Acme\nHoldings");
        assert_eq!(positions[1].description, "say \"hi\"");
    }

    #[test]
    fn test_quote_inside_field_is_literal() {
        let text = "h\nP\t3\t5\" pipe\t12\n";
        let positions = read_positions(text.as_bytes(), Delimiter::Tab).unwrap();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].price, dec!(12));
    }
}
