//! File-backed result sink.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;
use verif_evaluate::{ResultSink, ResultTable, VerifyError};

/// Writes each result table as pretty JSON to `<dir>/<table name>.json`.
#[derive(Debug, Clone)]
pub struct JsonDirSink {
    dir: PathBuf,
}

impl JsonDirSink {
    /// Create a sink writing into `dir`. The directory is created on the
    /// first write if missing.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Destination path for a table name.
    pub fn path_for(&self, table_name: &str) -> PathBuf {
        self.dir.join(format!("{table_name}.json"))
    }
}

impl ResultSink for JsonDirSink {
    fn write_table(&mut self, table: &ResultTable) -> Result<(), VerifyError> {
        let io_err = |path: &Path, e: std::io::Error| VerifyError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        };

        fs::create_dir_all(&self.dir).map_err(|e| io_err(&self.dir, e))?;

        let json = serde_json::to_string_pretty(table).map_err(|e| VerifyError::Serialization {
            reason: e.to_string(),
        })?;
        let path = self.path_for(&table.name);
        fs::write(&path, json).map_err(|e| io_err(&path, e))?;

        info!(path = %path.display(), rows = table.rows.len(), "result table written");
        Ok(())
    }
}
