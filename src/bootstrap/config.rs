//! Initialize configuration from file or env var.
//!
//! All environment variables are prefixed with `SWARMSHARE_`.
use swarmshare_configuration::{Configuration, Info};

/// The default path for the configuration file, relative to the working
/// directory.
pub const DEFAULT_PATH_CONFIG: &str = "./share/default/config/swarmshare.toml";

/// It loads the application configuration from the environment.
///
/// There are two methods to inject the configuration:
///
/// 1. By using a config file: `swarmshare.toml`, or the file named by
///    `SWARMSHARE_CONFIG_TOML_PATH`.
/// 2. Environment variable: `SWARMSHARE_CONFIG_TOML`. The variable contains
///    the same contents as the `swarmshare.toml` file.
///
/// Environment variable has priority over the config file. When neither is
/// present the default configuration is used.
///
/// # Errors
///
/// Will return an error if the configuration can not be read, parsed or
/// validated.
pub fn initialize_configuration() -> Result<Configuration, swarmshare_configuration::Error> {
    Configuration::load(&Info::new(DEFAULT_PATH_CONFIG))
}
