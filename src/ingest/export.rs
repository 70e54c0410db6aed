//! Buffered view of a top-down export file
//!
//! Lines up to and including the column-header marker are dropped. The rest
//! are kept with their physical line numbers so that the reference total can
//! be fixed before the tree pass runs over the same buffer.

use std::path::{Path, PathBuf};

use super::{ImportConfig, IngestError};

/// A post-header line and its 1-based line number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLine {
    pub position: u64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileExport {
    source: Option<PathBuf>,
    header_position: Option<u64>,
    lines: Vec<DataLine>,
}

impl ProfileExport {
    /// Read an export from disk.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn read(path: &Path, config: &ImportConfig) -> Result<Self, IngestError> {
        let bytes = std::fs::read(path).map_err(|source| IngestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8_lossy(&bytes);
        let mut export = Self::from_text(&text, config);
        export.source = Some(path.to_path_buf());
        Ok(export)
    }

    pub fn from_text(text: &str, config: &ImportConfig) -> Self {
        let mut header_position = None;
        let mut lines = Vec::new();

        for (index, line) in text.lines().enumerate() {
            let position = index as u64 + 1;
            if header_position.is_none() {
                if line.starts_with(&config.header_marker) {
                    header_position = Some(position);
                }
                continue;
            }
            lines.push(DataLine {
                position,
                text: line.to_string(),
            });
        }

        Self {
            source: None,
            header_position,
            lines,
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn header_found(&self) -> bool {
        self.header_position.is_some()
    }

    pub fn header_position(&self) -> Option<u64> {
        self.header_position
    }

    /// Lines after the header, in file order.
    pub fn lines(&self) -> &[DataLine] {
        &self.lines
    }

    /// First non-blank post-header line: the grand-total row.
    pub fn reference_line(&self) -> Option<&DataLine> {
        self.lines.iter().find(|line| !line.text.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Some preamble\n\
Function Stack;CPU Time:Total;CPU Time:Self;Function\n\
\n\
Total;10.0;0;\n\
  main;9.0;1.0;main()\n";

    #[test]
    fn test_lines_before_header_are_dropped() {
        let export = ProfileExport::from_text(SAMPLE, &ImportConfig::default());
        assert!(export.header_found());
        assert_eq!(export.header_position(), Some(2));
        assert_eq!(export.lines().len(), 3);
        assert_eq!(export.lines()[0].position, 3);
    }

    #[test]
    fn test_reference_line_skips_blank_lines() {
        let export = ProfileExport::from_text(SAMPLE, &ImportConfig::default());
        let reference = export.reference_line().unwrap();
        assert_eq!(reference.position, 4);
        assert!(reference.text.starts_with("Total;"));
    }

    #[test]
    fn test_missing_header_yields_no_lines() {
        let export = ProfileExport::from_text("a;1;1;a\nb;2;2;b\n", &ImportConfig::default());
        assert!(!export.header_found());
        assert!(export.lines().is_empty());
        assert!(export.reference_line().is_none());
    }

    #[test]
    fn test_custom_header_marker() {
        let config = ImportConfig {
            header_marker: "Stack|".to_string(),
            ..ImportConfig::default()
        };
        let export = ProfileExport::from_text("Stack|T|S|F\nroot|1|1|r\n", &config);
        assert_eq!(export.lines().len(), 1);
        assert_eq!(export.lines()[0].position, 2);
    }

    #[test]
    fn test_read_reports_path_on_failure() {
        let missing = Path::new("/nonexistent/topdown/profile.csv");
        let err = ProfileExport::read(missing, &ImportConfig::default()).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/topdown/profile.csv"));
    }
}
