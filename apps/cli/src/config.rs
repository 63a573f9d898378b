use std::path::PathBuf;

use lotsync_connect::{Credentials, DEFAULT_LENS_API_URL};
use lotsync_core::constants::{DEFAULT_CSV_DIR, DEFAULT_STATE_FILE};
use lotsync_core::{Error, Result};

const DEFAULT_GOOGLE_CREDENTIALS: &str = "credentials.json";

/// Process configuration from the environment (and `.env`).
///
/// Lens credentials are only checked when a login is needed, so a
/// `--from-csv` run works without them.
pub struct Config {
    pub email: Option<String>,
    pub password: Option<String>,
    pub mfa_audience: bool,
    pub segment_id: Option<String>,
    /// `OTHER_ACCOUNT_ID` when set, else `ACCOUNT_ID`.
    pub account_id: Option<String>,
    pub lens_url: String,
    pub state_file: PathBuf,
    pub csv_dir: PathBuf,
    pub google_credentials: PathBuf,
    pub finnhub_api_key: Option<String>,
}

/// Everything needed to log in and fetch.
pub struct LensConfig {
    pub url: String,
    pub segment_id: String,
    pub account_id: String,
    pub credentials: Credentials,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from a variable source. Empty values count as unset.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mfa_audience = match get("MFA_AUDIENCE") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                Error::InvalidConfigValue(format!("MFA_AUDIENCE must be true or false, got '{}'", raw))
            })?,
            None => false,
        };

        Ok(Self {
            email: get("EMAIL"),
            password: get("PASSWORD"),
            mfa_audience,
            segment_id: get("SEGMENT_ID"),
            account_id: get("OTHER_ACCOUNT_ID").or_else(|| get("ACCOUNT_ID")),
            lens_url: get("LOTSYNC_LENS_URL").unwrap_or_else(|| DEFAULT_LENS_API_URL.to_string()),
            state_file: get("LOTSYNC_STATE_FILE")
                .unwrap_or_else(|| DEFAULT_STATE_FILE.to_string())
                .into(),
            csv_dir: get("LOTSYNC_CSV_DIR")
                .unwrap_or_else(|| DEFAULT_CSV_DIR.to_string())
                .into(),
            google_credentials: get("GOOGLE_CREDENTIALS_PATH")
                .unwrap_or_else(|| DEFAULT_GOOGLE_CREDENTIALS.to_string())
                .into(),
            finnhub_api_key: get("FINNHUB_API_KEY"),
        })
    }

    /// Command-line paths take precedence over the environment.
    pub fn with_overrides(mut self, state_file: Option<PathBuf>, csv_dir: Option<PathBuf>) -> Self {
        if let Some(path) = state_file {
            self.state_file = path;
        }
        if let Some(dir) = csv_dir {
            self.csv_dir = dir;
        }
        self
    }

    pub fn lens(&self) -> Result<LensConfig> {
        let require = |value: &Option<String>, key: &str| {
            value
                .clone()
                .ok_or_else(|| Error::MissingConfigKey(key.to_string()))
        };

        Ok(LensConfig {
            url: self.lens_url.clone(),
            segment_id: require(&self.segment_id, "SEGMENT_ID")?,
            account_id: require(&self.account_id, "ACCOUNT_ID")?,
            credentials: Credentials {
                username: require(&self.email, "EMAIL")?,
                password: require(&self.password, "PASSWORD")?,
                mfa_audience: self.mfa_audience,
            },
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
