//! State-file bootstrap: read `state.json`, creating it with defaults first
//! when it does not exist.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use super::settings_model::RunSettings;
use crate::errors::{Error, Result};

#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the settings, writing the defaults to disk first if the file is missing.
    pub fn load_or_create(&self) -> Result<RunSettings> {
        if !self.path.exists() {
            let defaults = RunSettings::default();
            self.save(&defaults)?;
            info!("{} created with default settings.", self.path.display());
            return Ok(defaults);
        }

        debug!("{} already exists.", self.path.display());
        self.load()
    }

    pub fn load(&self) -> Result<RunSettings> {
        let raw = fs::read_to_string(&self.path)?;
        serde_json::from_str(&raw).map_err(|e| {
            Error::ConfigIO(format!(
                "Failed to parse state file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    pub fn save(&self, settings: &RunSettings) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut buf = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        settings.serialize(&mut serializer)?;
        fs::write(&self.path, buf)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_or_create_writes_defaults() {
        let dir = tempdir().unwrap();
        let state = StateFile::new(dir.path().join("state.json"));

        let settings = state.load_or_create().unwrap();
        assert_eq!(settings, RunSettings::default());

        let raw = fs::read_to_string(state.path()).unwrap();
        assert!(raw.contains("    \"ENABLE_GOOGLE_SHEETS_INTEGRATION\": false"));
        assert!(raw.contains("\"SPREADSHEET_NAME\": \"M1 Finance Management\""));
        assert!(raw.contains("\"CREATE_CSV_FILES\": true"));
    }

    #[test]
    fn test_load_or_create_keeps_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(
            &path,
            r#"{"ENABLE_GOOGLE_SHEETS_INTEGRATION": true, "SPREADSHEET_NAME": "Taxes", "USE_DATABASE": false}"#,
        )
        .unwrap();

        let settings = StateFile::new(&path).load_or_create().unwrap();
        assert!(settings.enable_google_sheets_integration);
        assert_eq!(settings.spreadsheet_name, "Taxes");
        // Missing keys fall back to defaults.
        assert!(settings.create_csv_files);
        assert!(settings.generate_tax_lots_sheets);
        assert!(!settings.generate_securities_info_sheet);
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();

        let err = StateFile::new(&path).load_or_create().unwrap_err();
        assert!(matches!(err, Error::ConfigIO(_)));
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempdir().unwrap();
        let state = StateFile::new(dir.path().join("nested").join("state.json"));
        let settings = RunSettings {
            generate_securities_info_sheet: true,
            ..Default::default()
        };

        state.save(&settings).unwrap();
        assert_eq!(state.load().unwrap(), settings);
    }
}
