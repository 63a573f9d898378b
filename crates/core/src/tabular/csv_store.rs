//! CSV persistence for tabular results.

use std::fs;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use log::{debug, info, warn};
use serde_json::Value;

use super::tabular_model::{render_cell, Table};
use crate::errors::{Error, Result};

/// Writes tables into a fixed output directory, overwriting existing files.
#[derive(Debug, Clone)]
pub struct CsvDirectory {
    dir: PathBuf,
}

impl CsvDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Save a table as `<dir>/<file_name>`.
    ///
    /// An empty table is not written; `Ok(None)` is returned and any
    /// previous file is left untouched.
    pub fn save(&self, table: &Table, file_name: &str) -> Result<Option<PathBuf>> {
        if table.is_empty() {
            warn!("No data to save for {}: table is empty", file_name);
            return Ok(None);
        }

        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(file_name);
        write_csv(table, &path)?;
        info!("CSV file saved to {} ({} rows)", path.display(), table.len());
        Ok(Some(path))
    }

    /// Load `<dir>/<file_name>` back into a table of text cells.
    pub fn load(&self, file_name: &str) -> Result<Table> {
        read_csv(&self.path_for(file_name))
    }
}

/// Write a header row followed by every data row.
pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let mut writer = WriterBuilder::new().from_path(path)?;
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(render_cell))?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a CSV with a header row. Empty fields become null, everything else text.
pub fn read_csv(path: &Path) -> Result<Table> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut table = Table::new(columns);

    for record in reader.records() {
        let record = record?;
        let row = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    Value::Null
                } else {
                    Value::String(field.to_string())
                }
            })
            .collect();
        table.push_row(row)?;
    }

    debug!("Read {} rows from {}", table.len(), path.display());
    Ok(table)
}
