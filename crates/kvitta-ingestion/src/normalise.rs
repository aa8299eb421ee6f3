//! OCR-text normalisation.
//!
//! Raw OCR output from receipts is noisy: payment-terminal boilerplate,
//! barcode digit runs, locale decimal commas, and item names split across
//! lines. `normalise` cleans all of that deterministically so the
//! extraction prompt only carries content lines.

use lazy_static::lazy_static;
use regex::Regex;

/// Whole-line noise markers (case-insensitive substring match). These are
/// Swedish receipt boilerplate: card/Swish payment rows, VAT labels,
/// terminal ids, loyalty jargon and totals phrasing — not purchase content.
const NOISE_KEYWORDS: &[&str] = &[
    "swish",
    "kort",
    "orgnr",
    "vat",
    "moms",
    "kopiakvitto",
    "terminal",
    "powered",
    "verifikat",
    "service",
    "id",
    "barcode",
    "total att betala",
    "vxl",
    "tack för besöket",
    "betalning",
    "summa att betala",
];

lazy_static! {
    /// A line that is nothing but 8+ digits — barcodes, EAN runs.
    static ref BARCODE_LINE: Regex = Regex::new(r"^[0-9]{8,}$").unwrap();
    /// Locale decimal comma with exactly two digits after it.
    static ref DECIMAL_COMMA: Regex = Regex::new(r"(\d+),(\d{2})").unwrap();
}

/// Clean raw OCR text into a compact, extraction-friendly form.
///
/// Line-level filtering only: a line is kept or dropped whole, never
/// partially redacted. A kept line with no digits is treated as the
/// continuation of the previous kept line (OCR likes to split an item
/// name from its price row).
pub fn normalise(raw: &str) -> String {
    let mut kept: Vec<String> = Vec::new();
    let mut have_previous = false;

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let lower = line.to_lowercase();
        if NOISE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            continue;
        }

        if BARCODE_LINE.is_match(line) {
            continue;
        }

        let line = DECIMAL_COMMA.replace_all(line, "${1}.${2}");

        if have_previous && !line.chars().any(|c| c.is_ascii_digit()) {
            if let Some(previous) = kept.last_mut() {
                previous.push(' ');
                previous.push_str(&line);
            }
        } else {
            kept.push(line.into_owned());
            have_previous = true;
        }
    }

    kept.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_noise_and_barcodes_and_fixes_decimals() {
        let raw = "Coop\n123,45\nkortbetalning\n9999999999";
        assert_eq!(normalise(raw), "Coop\n123.45");
    }

    #[test]
    fn decimal_comma_rewrite_is_scoped() {
        assert_eq!(normalise("12,34"), "12.34");
        assert_eq!(normalise("12.34"), "12.34");
        assert_eq!(normalise("abc,def"), "abc,def");
    }

    #[test]
    fn barcode_lines_never_survive() {
        let out = normalise("12345678\nICA Nära\n876543210987\nMjölk 15,90");
        assert!(!out.lines().any(|l| BARCODE_LINE.is_match(l)));
    }

    #[test]
    fn digitless_continuation_merges_into_previous_line() {
        // "extra prisnedsatt" carries no digits, so it belongs to the row above.
        let raw = "Mjölk 15,90\nextra prisnedsatt\nBröd 22,00";
        assert_eq!(normalise(raw), "Mjölk 15.90 extra prisnedsatt\nBröd 22.00");
    }

    #[test]
    fn leading_digitless_line_starts_the_output() {
        assert_eq!(normalise("Coop\nMjölk 15,90"), "Coop\nMjölk 15.90");
    }

    #[test]
    fn idempotent_on_clean_input() {
        let raw = "Coop Konsum\nMjölk 15,90\nBröd 22,00\nÄpplen 31,50";
        let once = normalise(raw);
        assert_eq!(normalise(&once), once);
    }

    #[test]
    fn blank_lines_and_whitespace_are_dropped() {
        assert_eq!(normalise("\n   \nCoop\n\n  123,45  \n"), "Coop\n123.45");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalise(""), "");
    }
}
