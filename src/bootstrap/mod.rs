//! Process bootstrap: configuration and logging.
pub mod config;
pub mod logging;
