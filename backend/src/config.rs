//! Service configuration from the environment.
//!
//! | Variable                | Default               |
//! |-------------------------|-----------------------|
//! | `ANTHROPIC_API_KEY`     | unset (AI disabled)   |
//! | `CASHFLOW_MODEL`        | [`DEFAULT_MODEL`]     |
//! | `CASHFLOW_LEDGER`       | `data/ledger.csv`     |
//! | `CASHFLOW_UPLOAD_DIR`   | `static/uploads`      |
//! | `CASHFLOW_RECEIPTS_DIR` | `.cashflow/receipts`  |
//! | `CASHFLOW_STATIC_DIR`   | `frontend/dist`       |
//! | `PORT`                  | `5001`                |

use std::env;
use std::path::PathBuf;

use crate::ai::{AiClient, DEFAULT_MODEL};
use crate::error::ConfigError;
use crate::registry::DEFAULT_REGISTRY_DIR;

pub const DEFAULT_PORT: u16 = 5001;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_key: Option<String>,
    pub model: String,
    pub ledger_path: PathBuf,
    pub upload_dir: PathBuf,
    pub receipts_dir: PathBuf,
    pub static_dir: PathBuf,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            ledger_path: PathBuf::from("data/ledger.csv"),
            upload_dir: PathBuf::from("static/uploads"),
            receipts_dir: PathBuf::from(DEFAULT_REGISTRY_DIR),
            static_dir: PathBuf::from("frontend/dist"),
            port: DEFAULT_PORT,
        }
    }
}

impl Settings {
    /// Read settings from the process environment, loading `.env` first.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read settings through `lookup`; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidVar {
                name: "PORT".to_string(),
                value: raw,
            })?,
            None => defaults.port,
        };

        Ok(Self {
            api_key: get("ANTHROPIC_API_KEY"),
            model: get("CASHFLOW_MODEL").unwrap_or(defaults.model),
            ledger_path: get("CASHFLOW_LEDGER").map(PathBuf::from).unwrap_or(defaults.ledger_path),
            upload_dir: get("CASHFLOW_UPLOAD_DIR").map(PathBuf::from).unwrap_or(defaults.upload_dir),
            receipts_dir: get("CASHFLOW_RECEIPTS_DIR").map(PathBuf::from).unwrap_or(defaults.receipts_dir),
            static_dir: get("CASHFLOW_STATIC_DIR").map(PathBuf::from).unwrap_or(defaults.static_dir),
            port,
        })
    }

    /// Client for the configured model, or `None` without an API key.
    pub fn ai_client(&self) -> Option<AiClient> {
        self.api_key
            .as_ref()
            .map(|key| AiClient::new(key.clone()).with_model(&self.model))
    }
}
