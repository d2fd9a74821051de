//! # Aggregation Task File Parser
//!
//! Customers upload aggregation tasks as CSV with columns
//! `container_id, gtin, sscc` - except the delimiter varies by export
//! tool, header order is arbitrary, older files say `quantity` where
//! they mean `container_id`, and some rows are simply broken.
//!
//! ## Parsing Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  raw text                                                               │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  sniff delimiter (first 2048 chars; , ; TAB | ; fallback ,)            │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  read header, trim names, map quantity -> container_id                 │
//! │     │            └── missing column? -> MissingColumns                 │
//! │     ▼                                                                   │
//! │  per row: trim fields, drop empties,                                   │
//! │           SSCC must be 18 digits, GTIN 14 digits                       │
//! │     │            └── bad row? counted as skipped, not fatal            │
//! │     ▼                                                                   │
//! │  TaskFileReport { rows, skipped, delimiter }                           │
//! │            └── zero rows? -> NoValidRows                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pure: reads from an in-memory string, touches no file system. The
//! repository layer feeds it and upserts the result.

use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};

use crate::error::TaskFileError;
use crate::validation::{validate_gtin, validate_sscc};

/// Delimiters the sniffer considers, in tie-break order.
const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

/// How much of the file the sniffer looks at.
const SNIFF_WINDOW: usize = 2048;

/// One valid task row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFileRow {
    pub container_id: String,
    pub gtin: String,
    pub sscc: String,
}

/// Result of parsing one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFileReport {
    /// Rows that passed validation, in file order.
    pub rows: Vec<TaskFileRow>,

    /// Rows dropped for empty fields or invalid SSCC/GTIN.
    pub skipped: usize,

    /// The delimiter the sniffer settled on.
    pub delimiter: u8,
}

/// Parses an aggregation task file.
///
/// ## Errors
/// - [`TaskFileError::MissingColumns`] - header lacks a required column
/// - [`TaskFileError::NoValidRows`] - nothing survived row validation
/// - [`TaskFileError::Csv`] - structurally broken CSV
pub fn parse_task_file(content: &str) -> Result<TaskFileReport, TaskFileError> {
    let delimiter = sniff_delimiter(content);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let find = |name: &str| headers.iter().position(|h| h == name);

    // Older exports say "quantity" where they mean "container_id"
    let container_idx = find("container_id").or_else(|| find("quantity"));
    let gtin_idx = find("gtin");
    let sscc_idx = find("sscc");

    let (container_idx, gtin_idx, sscc_idx) = match (container_idx, gtin_idx, sscc_idx) {
        (Some(c), Some(g), Some(s)) => (c, g, s),
        _ => {
            return Err(TaskFileError::MissingColumns {
                found: headers.iter().map(str::to_string).collect(),
            });
        }
    };

    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for record in reader.records() {
        let record = record?;

        let field = |idx: usize| record.get(idx).unwrap_or("").trim();
        let container_id = field(container_idx);
        let gtin = field(gtin_idx);
        let sscc = field(sscc_idx);

        if container_id.is_empty() || gtin.is_empty() || sscc.is_empty() {
            skipped += 1;
            continue;
        }
        if validate_sscc(sscc).is_err() || validate_gtin(gtin).is_err() {
            skipped += 1;
            continue;
        }

        rows.push(TaskFileRow {
            container_id: container_id.to_string(),
            gtin: gtin.to_string(),
            sscc: sscc.to_string(),
        });
    }

    if rows.is_empty() {
        return Err(TaskFileError::NoValidRows { skipped });
    }

    Ok(TaskFileReport {
        rows,
        skipped,
        delimiter,
    })
}

/// Picks the most frequent candidate delimiter in the header line.
///
/// Only the first [`SNIFF_WINDOW`] characters are considered, and only
/// the first line of those: counting across rows would let field
/// contents outvote the header.
fn sniff_delimiter(content: &str) -> u8 {
    // char-wise truncation: a byte cut could split a multibyte character
    let header_line: String = content
        .lines()
        .next()
        .unwrap_or("")
        .chars()
        .take(SNIFF_WINDOW)
        .collect();

    DELIMITER_CANDIDATES
        .iter()
        .copied()
        .map(|candidate| {
            let count = header_line.bytes().filter(|&b| b == candidate).count();
            (candidate, count)
        })
        .max_by_key(|&(_, count)| count)
        .filter(|&(_, count)| count > 0)
        .map(|(candidate, _)| candidate)
        .unwrap_or(b',')
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SSCC_A: &str = "046123456700000426";
    const SSCC_B: &str = "046123456700000433";
    const GTIN: &str = "04600266011725";

    #[test]
    fn test_parse_comma_file() {
        let content = format!(
            "container_id,gtin,sscc\nBOX-1,{GTIN},{SSCC_A}\nBOX-2,{GTIN},{SSCC_B}\n"
        );
        let report = parse_task_file(&content).unwrap();

        assert_eq!(report.delimiter, b',');
        assert_eq!(report.skipped, 0);
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].container_id, "BOX-1");
        assert_eq!(report.rows[0].sscc, SSCC_A);
    }

    #[test]
    fn test_sniffs_semicolon_and_tab() {
        let content = format!("container_id;gtin;sscc\nBOX-1;{GTIN};{SSCC_A}\n");
        let report = parse_task_file(&content).unwrap();
        assert_eq!(report.delimiter, b';');
        assert_eq!(report.rows.len(), 1);

        let content = format!("container_id\tgtin\tsscc\nBOX-1\t{GTIN}\t{SSCC_A}\n");
        let report = parse_task_file(&content).unwrap();
        assert_eq!(report.delimiter, b'\t');
        assert_eq!(report.rows.len(), 1);
    }

    #[test]
    fn test_quantity_header_alias() {
        let content = format!("quantity,gtin,sscc\n12,{GTIN},{SSCC_A}\n");
        let report = parse_task_file(&content).unwrap();
        assert_eq!(report.rows[0].container_id, "12");
    }

    #[test]
    fn test_header_order_does_not_matter() {
        let content = format!("sscc,container_id,gtin\n{SSCC_A},BOX-9,{GTIN}\n");
        let report = parse_task_file(&content).unwrap();
        assert_eq!(report.rows[0].container_id, "BOX-9");
        assert_eq!(report.rows[0].gtin, GTIN);
        assert_eq!(report.rows[0].sscc, SSCC_A);
    }

    #[test]
    fn test_invalid_rows_are_counted_not_fatal() {
        let content = format!(
            "container_id,gtin,sscc\n\
             BOX-1,{GTIN},{SSCC_A}\n\
             BOX-2,{GTIN},123\n\
             BOX-3,badgtin,{SSCC_B}\n\
             ,{GTIN},{SSCC_B}\n"
        );
        let report = parse_task_file(&content).unwrap();
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.skipped, 3);
    }

    #[test]
    fn test_missing_columns() {
        let content = "container_id,gtin\nBOX-1,04600266011725\n";
        match parse_task_file(content) {
            Err(TaskFileError::MissingColumns { found }) => {
                assert_eq!(found, vec!["container_id", "gtin"]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_no_valid_rows() {
        let content = "container_id,gtin,sscc\nBOX-1,bad,bad\n";
        assert!(matches!(
            parse_task_file(content),
            Err(TaskFileError::NoValidRows { skipped: 1 })
        ));
    }
}
