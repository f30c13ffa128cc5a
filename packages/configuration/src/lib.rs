//! Configuration data structures for the `SwarmShare` tracker and peer agents.
//!
//! The configuration is loaded from a [TOML](https://toml.io/en/) document.
//! Every section and every field is optional: missing values take the
//! defaults documented on each struct.
//!
//! The document can be provided in two ways:
//!
//! 1. The whole TOML content in the `SWARMSHARE_CONFIG_TOML` environment
//!    variable. This is handy for containers and tests.
//! 2. A file. The path is taken from the `SWARMSHARE_CONFIG_TOML_PATH`
//!    environment variable, or the default path passed by the binary.
//!
//! If neither is present the default configuration is used.
//!
//! A complete configuration with the default values:
//!
//! ```toml
//! [logging]
//! threshold = "info"
//!
//! [tracker]
//! bind_address = "0.0.0.0:8080"
//! statistics = true
//!
//! [peer]
//! bind_address = "0.0.0.0:9090"
//! peer_port = 9090
//! content_dir = "./dataset"
//! storage_dir = "./storage"
//! advertise = "chunked"
//! watch = true
//!
//! [network]
//! chunk_size = 65536
//! max_field_size = 67108864
//! connect_timeout_secs = 5
//! read_timeout_secs = 30
//! ```
//!
//! The `tracker_address` of the `[peer]` section has no default. When it is
//! missing the peer binary asks for it.
pub mod logging;
pub mod network;
pub mod peer;
pub mod tracker;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use swarmshare_located_error::{Located, LocatedError};

pub use self::logging::{Logging, Threshold};
pub use self::network::Network;
pub use self::peer::{AdvertiseMode, Peer};
pub use self::tracker::Tracker;

/// The whole configuration in TOML format.
pub const ENV_VAR_CONFIG_TOML: &str = "SWARMSHARE_CONFIG_TOML";

/// The path to the TOML configuration file.
pub const ENV_VAR_CONFIG_TOML_PATH: &str = "SWARMSHARE_CONFIG_TOML_PATH";

/// Default port where the tracker listens.
pub const DEFAULT_TRACKER_PORT: u16 = 8080;

/// Default port where every peer agent serves chunks to other peers.
pub const DEFAULT_PEER_PORT: u16 = 9090;

/// Where the configuration comes from.
#[derive(Debug, Default, Clone)]
pub struct Info {
    config_toml: Option<String>,
    config_toml_path: String,
}

impl Info {
    /// Builds the configuration source from the environment.
    ///
    /// `default_config_toml_path` is used when `SWARMSHARE_CONFIG_TOML_PATH`
    /// is not set.
    #[must_use]
    pub fn new(default_config_toml_path: &str) -> Self {
        let config_toml = std::env::var(ENV_VAR_CONFIG_TOML).ok();
        let config_toml_path =
            std::env::var(ENV_VAR_CONFIG_TOML_PATH).unwrap_or_else(|_| default_config_toml_path.to_string());

        Self {
            config_toml,
            config_toml_path,
        }
    }

    /// A source with an inline TOML document. It ignores the environment.
    #[must_use]
    pub fn from_toml(config_toml: &str) -> Self {
        Self {
            config_toml: Some(config_toml.to_string()),
            config_toml_path: String::new(),
        }
    }

    /// A source with a file path. It ignores the environment.
    #[must_use]
    pub fn from_path(config_toml_path: &str) -> Self {
        Self {
            config_toml: None,
            config_toml_path: config_toml_path.to_string(),
        }
    }
}

/// Errors that can occur when loading the configuration.
#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    #[error("Unable to read the configuration file {path}: {source}")]
    UnableToReadConfigFile {
        path: String,
        source: LocatedError<'static, std::io::Error>,
    },

    #[error("Invalid TOML configuration: {source}")]
    InvalidToml {
        source: LocatedError<'static, toml::de::Error>,
    },

    #[error("Invalid value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// The root configuration.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Default)]
#[serde(default)]
pub struct Configuration {
    /// Logging configuration.
    pub logging: Logging,

    /// Configuration for the tracker service.
    pub tracker: Tracker,

    /// Configuration for the peer agent.
    pub peer: Peer,

    /// Settings shared by every node of the network. They must be the same
    /// on all peers.
    pub network: Network,
}

impl Configuration {
    /// Loads the configuration from the given source.
    ///
    /// # Errors
    ///
    /// Will return an error if the file exists but cannot be read, if the
    /// document is not valid TOML, or if a value is out of range.
    pub fn load(info: &Info) -> Result<Configuration, Error> {
        let configuration = match &info.config_toml {
            Some(config_toml) => Self::load_from_toml(config_toml)?,
            None => {
                if Path::new(&info.config_toml_path).is_file() {
                    Self::load_from_file(&info.config_toml_path)?
                } else {
                    Configuration::default()
                }
            }
        };

        configuration.validate()?;

        Ok(configuration)
    }

    /// Loads the configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Will return an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &str) -> Result<Configuration, Error> {
        let config_toml = fs::read_to_string(path).map_err(|err| Error::UnableToReadConfigFile {
            path: path.to_string(),
            source: Located(err).into(),
        })?;

        Self::load_from_toml(&config_toml)
    }

    /// Parses the configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Will return an error if the document cannot be parsed.
    pub fn load_from_toml(config_toml: &str) -> Result<Configuration, Error> {
        toml::from_str(config_toml).map_err(|err| Error::InvalidToml {
            source: Located(err).into(),
        })
    }

    /// Checks the values that can not be expressed with types.
    ///
    /// # Errors
    ///
    /// Will return an [`Error::InvalidValue`] for the first invalid value.
    pub fn validate(&self) -> Result<(), Error> {
        self.network.validate()
    }
}
