//! Client configuration
//!
//! A client runs either locally, assembling training sets from a metadata
//! database on disk, or against a hosted serving endpoint. Configuration
//! comes from a JSON file or from the environment:
//!
//! | variable | meaning |
//! |---|---|
//! | `TRAINSET_HOST` | serving endpoint, selects hosted mode |
//! | `TRAINSET_CERT` | PEM root certificate for the endpoint |
//! | `TRAINSET_METADATA_PATH` | metadata database, selects local mode |

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use trainset_readers::CsvReaderOptions;

use crate::error::{Error, Result};

/// Environment variable naming the serving endpoint
pub const HOST_ENV: &str = "TRAINSET_HOST";

/// Environment variable naming a PEM root certificate
pub const CERT_ENV: &str = "TRAINSET_CERT";

/// Environment variable naming the local metadata database
pub const METADATA_PATH_ENV: &str = "TRAINSET_METADATA_PATH";

/// Where training data comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClientMode {
    /// Assemble in process from a local metadata database
    Local {
        /// Path of the SQLite metadata database
        metadata_path: PathBuf,
    },

    /// Stream pre-joined rows from a serving endpoint
    Hosted {
        /// `host:port` of the endpoint
        host: String,

        /// Use plain HTTP instead of TLS
        #[serde(default)]
        insecure: bool,

        /// PEM root certificate to trust, in addition to the system roots
        #[serde(default)]
        cert_path: Option<PathBuf>,
    },
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Local or hosted operation
    pub mode: ClientMode,

    /// Seed for reproducible shuffles; entropy when unset
    #[serde(default)]
    pub shuffle_seed: Option<u64>,

    /// Options for reading raw CSV sources in local mode
    #[serde(default)]
    pub csv: CsvReaderOptions,
}

impl ClientConfig {
    /// Local mode over the metadata database at `metadata_path`
    pub fn local(metadata_path: impl Into<PathBuf>) -> Self {
        Self::with_mode(ClientMode::Local {
            metadata_path: metadata_path.into(),
        })
    }

    /// Hosted mode against `host` over TLS
    pub fn hosted(host: impl Into<String>) -> Self {
        Self::with_mode(ClientMode::Hosted {
            host: host.into(),
            insecure: false,
            cert_path: None,
        })
    }

    fn with_mode(mode: ClientMode) -> Self {
        Self {
            mode,
            shuffle_seed: None,
            csv: CsvReaderOptions::default(),
        }
    }

    /// Set the shuffle seed
    #[must_use]
    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    /// Read a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from a variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup(HOST_ENV).filter(|h| !h.is_empty());
        let metadata_path = lookup(METADATA_PATH_ENV).filter(|p| !p.is_empty());

        let config = match (host, metadata_path) {
            (Some(_), Some(_)) => {
                return Err(Error::Config(format!(
                    "{HOST_ENV} and {METADATA_PATH_ENV} cannot both be set"
                )))
            }
            (Some(host), None) => Self::with_mode(ClientMode::Hosted {
                host,
                insecure: false,
                cert_path: lookup(CERT_ENV).filter(|c| !c.is_empty()).map(PathBuf::from),
            }),
            (None, Some(path)) => Self::local(path),
            (None, None) => {
                return Err(Error::Config(format!(
                    "set {HOST_ENV} for hosted mode or {METADATA_PATH_ENV} for local mode"
                )))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values no client can use
    pub fn validate(&self) -> Result<()> {
        match &self.mode {
            ClientMode::Hosted { host, .. } if host.trim().is_empty() => {
                Err(Error::Config("hosted mode needs a host".into()))
            }
            ClientMode::Local { metadata_path } if metadata_path.as_os_str().is_empty() => {
                Err(Error::Config("local mode needs a metadata path".into()))
            }
            _ => Ok(()),
        }
    }
}
