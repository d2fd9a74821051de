//! # Tobacco DataMatrix Parser
//!
//! Scanners deliver tobacco codes with assorted garbage around them: BOM
//! bytes, carriage returns, stray group separators from the symbology
//! layer. This module cleans the raw scan and slices the fixed-layout
//! 29-character tobacco format.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Tobacco DataMatrix - 29 characters, positional                         │
//! │                                                                         │
//! │   [0:14]   GTIN of the marked pack                                     │
//! │   [14:21]  serial number (7 chars)                                     │
//! │   [21:25]  AI 8005 value - maximum retail price code                   │
//! │   [25:29]  crypto tail (AI 93)                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Longer tobacco formats with AI 91/92 crypto blocks are a different
//! wire shape and are rejected here by the length check.

use serde::{Deserialize, Serialize};

use crate::error::DataMatrixError;
use crate::TOBACCO_DM_LENGTH;

/// A parsed 29-character tobacco DataMatrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TobaccoCode {
    /// The cleaned code exactly as sliced below.
    pub datamatrix: String,

    /// GTIN of the marked pack (14 chars).
    pub gtin: String,

    /// Serial number (7 chars).
    pub serial: String,

    /// AI 8005 value: maximum retail price code (4 chars).
    pub code_8005: String,

    /// Crypto verification tail, AI 93 (4 chars).
    pub crypto_93: String,
}

/// Cleans and parses a raw tobacco DataMatrix scan.
///
/// Cleanup removes every control character (including DEL) except GS
/// (0x1D, the symbology field separator), then trims surrounding
/// whitespace. This kills BOMs, CR/LF and other hidden characters that
/// scanners prepend.
///
/// ## Example
/// ```rust
/// use markflow_core::datamatrix::parse_tobacco;
///
/// let code = parse_tobacco("04600266011725abc1234AB12x9z8").unwrap();
/// assert_eq!(code.gtin, "04600266011725");
/// assert_eq!(code.serial, "abc1234");
/// assert_eq!(code.code_8005, "AB12");
/// assert_eq!(code.crypto_93, "x9z8");
/// ```
///
/// ## Errors
/// [`DataMatrixError::InvalidLength`] when the cleaned code is not
/// exactly 29 characters.
pub fn parse_tobacco(raw: &str) -> Result<TobaccoCode, DataMatrixError> {
    let cleaned: String = raw
        .chars()
        .filter(|&c| !(c.is_control() && c != '\u{1d}'))
        .collect();
    let cleaned = cleaned.trim();

    let chars: Vec<char> = cleaned.chars().collect();
    if chars.len() != TOBACCO_DM_LENGTH {
        return Err(DataMatrixError::InvalidLength {
            length: chars.len(),
        });
    }

    let slice = |from: usize, to: usize| chars[from..to].iter().collect::<String>();

    Ok(TobaccoCode {
        datamatrix: cleaned.to_string(),
        gtin: slice(0, 14),
        serial: slice(14, 21),
        code_8005: slice(21, 25),
        crypto_93: slice(25, 29),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "04600266011725abc1234AB12x9z8";

    #[test]
    fn test_parse_slices_positionally() {
        let code = parse_tobacco(SAMPLE).unwrap();
        assert_eq!(code.datamatrix, SAMPLE);
        assert_eq!(code.gtin, "04600266011725");
        assert_eq!(code.serial, "abc1234");
        assert_eq!(code.code_8005, "AB12");
        assert_eq!(code.crypto_93, "x9z8");
    }

    #[test]
    fn test_parse_strips_scanner_garbage() {
        // BOM-ish control bytes, CR/LF and surrounding whitespace all go
        let dirty = format!("\u{0002}  {SAMPLE}\r\n\u{0004}");
        let code = parse_tobacco(&dirty).unwrap();
        assert_eq!(code.datamatrix, SAMPLE);
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert_eq!(
            parse_tobacco("too-short"),
            Err(DataMatrixError::InvalidLength { length: 9 })
        );
        let long = format!("{SAMPLE}00");
        assert_eq!(
            parse_tobacco(&long),
            Err(DataMatrixError::InvalidLength { length: 31 })
        );
        assert_eq!(
            parse_tobacco(""),
            Err(DataMatrixError::InvalidLength { length: 0 })
        );
    }

    #[test]
    fn test_embedded_gs_counts_toward_length() {
        // GS survives cleanup, so a 29-char code with an interior GS
        // is still 29 chars and parses; the GS lands in its slice.
        let with_gs = format!("04600266011725abc1234AB12x9z\u{1d}");
        let code = parse_tobacco(&with_gs).unwrap();
        assert_eq!(code.crypto_93, "x9z\u{1d}");
    }
}
