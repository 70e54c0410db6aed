//! Row parser for top-down export lines
//!
//! A data row has the shape `<indented label>;<total>;<self>;<signature...>`.
//! The signature may itself contain the delimiter, so everything after the
//! third delimiter is kept as one field.

use serde::{Deserialize, Serialize};

/// Minimum number of delimited fields for a data row.
pub const MIN_FIELDS: usize = 4;

/// One parsed data row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedRow {
    pub raw_label: String,
    pub short_name: String,
    pub full_signature: String,
    pub total_time: f64,
    pub self_time: f64,
    pub indent_level: usize,
    /// 1-based physical line number
    pub source_position: u64,
    /// Number of numeric fields that failed to parse and were set to 0.0
    pub coerced_fields: u8,
}

/// Why a line produced no row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    Blank,
    TooFewFields,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Row(ParsedRow),
    Skip(SkipReason),
}

impl RowOutcome {
    pub fn into_row(self) -> Option<ParsedRow> {
        match self {
            RowOutcome::Row(row) => Some(row),
            RowOutcome::Skip(_) => None,
        }
    }
}

/// Count leading U+0020 characters. Tabs are not indentation.
pub fn count_leading_spaces(label: &str) -> usize {
    label.bytes().take_while(|b| *b == b' ').count()
}

/// Parse a time column. Non-numeric and non-finite values yield `None`.
pub fn parse_time(field: &str) -> Option<f64> {
    field
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Parse one post-header line.
pub fn parse_row(line: &str, source_position: u64, delimiter: char) -> RowOutcome {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.trim().is_empty() {
        return RowOutcome::Skip(SkipReason::Blank);
    }

    let fields: Vec<&str> = line.splitn(MIN_FIELDS, delimiter).collect();
    if fields.len() < MIN_FIELDS {
        return RowOutcome::Skip(SkipReason::TooFewFields);
    }

    let raw_label = fields[0];
    let mut coerced_fields = 0u8;
    let mut time_field = |field: &str| {
        parse_time(field).unwrap_or_else(|| {
            coerced_fields += 1;
            0.0
        })
    };
    let total_time = time_field(fields[1]);
    let self_time = time_field(fields[2]);

    RowOutcome::Row(ParsedRow {
        raw_label: raw_label.to_string(),
        short_name: raw_label.trim().to_string(),
        full_signature: fields[3].trim().to_string(),
        total_time,
        self_time,
        indent_level: count_leading_spaces(raw_label),
        source_position,
        coerced_fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(line: &str) -> ParsedRow {
        parse_row(line, 1, ';').into_row().unwrap()
    }

    #[test]
    fn test_parse_basic_row() {
        let parsed = row("  foo;6.5;2.0;ns::foo(int)");
        assert_eq!(parsed.raw_label, "  foo");
        assert_eq!(parsed.short_name, "foo");
        assert_eq!(parsed.full_signature, "ns::foo(int)");
        assert_eq!(parsed.total_time, 6.5);
        assert_eq!(parsed.self_time, 2.0);
        assert_eq!(parsed.indent_level, 2);
        assert_eq!(parsed.coerced_fields, 0);
    }

    #[test]
    fn test_signature_keeps_embedded_delimiters() {
        let parsed = row("bar;1;1;operator;(a;b);extra");
        assert_eq!(parsed.full_signature, "operator;(a;b);extra");
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        assert_eq!(parse_row("", 3, ';'), RowOutcome::Skip(SkipReason::Blank));
        assert_eq!(parse_row("   \t ", 3, ';'), RowOutcome::Skip(SkipReason::Blank));
        assert_eq!(parse_row("\r", 3, ';'), RowOutcome::Skip(SkipReason::Blank));
    }

    #[test]
    fn test_too_few_fields_are_skipped() {
        assert_eq!(
            parse_row("decorative;row", 9, ';'),
            RowOutcome::Skip(SkipReason::TooFewFields)
        );
        assert_eq!(
            parse_row("a;1;2", 9, ';'),
            RowOutcome::Skip(SkipReason::TooFewFields)
        );
    }

    #[test]
    fn test_unparsable_times_default_to_zero() {
        let parsed = row("baz;n/a;;sig");
        assert_eq!(parsed.total_time, 0.0);
        assert_eq!(parsed.self_time, 0.0);
        assert_eq!(parsed.coerced_fields, 2);
    }

    #[test]
    fn test_non_finite_times_are_coerced() {
        let parsed = row("baz;NaN;inf;sig");
        assert_eq!(parsed.total_time, 0.0);
        assert_eq!(parsed.self_time, 0.0);
        assert_eq!(parsed.coerced_fields, 2);
    }

    #[test]
    fn test_tabs_do_not_count_as_indentation() {
        let parsed = row("\t  qux;1;1;sig");
        assert_eq!(parsed.indent_level, 0);
        assert_eq!(parsed.short_name, "qux");
    }

    #[test]
    fn test_crlf_line_endings() {
        let parsed = row(" q;1.5;0.5;sig\r");
        assert_eq!(parsed.full_signature, "sig");
        assert_eq!(parsed.indent_level, 1);
    }

    #[test]
    fn test_empty_signature_is_allowed() {
        let parsed = row("Total;10;0;");
        assert_eq!(parsed.full_signature, "");
        assert_eq!(parsed.short_name, "Total");
    }

    #[test]
    fn test_custom_delimiter() {
        let parsed = parse_row("  a|3|1|sig|tail", 4, '|').into_row().unwrap();
        assert_eq!(parsed.total_time, 3.0);
        assert_eq!(parsed.full_signature, "sig|tail");
        assert_eq!(parsed.source_position, 4);
    }

    #[test]
    fn test_times_tolerate_whitespace_and_exponents() {
        let parsed = row("a; 1e-3 ;  2.5 ;sig");
        assert_eq!(parsed.total_time, 0.001);
        assert_eq!(parsed.self_time, 2.5);
    }
}
