//! Export command implementation

use anyhow::Result;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use topdown::ExportConfig;

use crate::common::open_graph;

/// Write the whole graph to `output`, or stdout when `None`.
pub fn run_export(db_path: PathBuf, config: ExportConfig, output: Option<PathBuf>) -> Result<()> {
    let graph = open_graph(&db_path)?;
    let rendered = graph.export(&config)?;

    match output {
        Some(path) => {
            let mut file = File::create(&path)
                .map_err(|e| anyhow::anyhow!("Failed to create {}: {}", path.display(), e))?;
            file.write_all(rendered.as_bytes())?;
            if !rendered.is_empty() && !rendered.ends_with('\n') {
                file.write_all(b"\n")?;
            }
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            if !rendered.is_empty() && !rendered.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}
