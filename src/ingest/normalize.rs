//! Reference total and percentage normalization

use serde::{Deserialize, Serialize};

use super::export::ProfileExport;
use super::row::parse_time;

/// Denominator used when the reference total is zero or missing.
pub const FALLBACK_TOTAL: f64 = 1.0;

/// The single denominator for every percentage in one import
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTotal {
    value: f64,
    substituted: bool,
}

impl ReferenceTotal {
    /// Read the aggregate-time field of the export's first data line.
    ///
    /// Must run before any node is built: every percentage depends on it.
    pub fn from_export(export: &ProfileExport, delimiter: char) -> Self {
        let field = export
            .reference_line()
            .and_then(|line| line.text.split(delimiter).nth(1));
        let total = Self::from_field(field);

        if total.substituted {
            tracing::warn!(
                line = ?export.reference_line().map(|line| line.position),
                "reference total missing or zero; using {}",
                FALLBACK_TOTAL
            );
        }
        total
    }

    /// Parse a raw aggregate-time field; `None` means the field was absent.
    pub fn from_field(field: Option<&str>) -> Self {
        match field.and_then(parse_time) {
            Some(value) if value != 0.0 => Self {
                value,
                substituted: false,
            },
            _ => Self {
                value: FALLBACK_TOTAL,
                substituted: true,
            },
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Whether [`FALLBACK_TOTAL`] replaced the parsed value.
    pub fn substituted(&self) -> bool {
        self.substituted
    }

    pub fn percentage_of(&self, total_time: f64) -> f64 {
        total_time / self.value * 100.0
    }
}
