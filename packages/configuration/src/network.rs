use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Settings every node must agree on, plus the timeouts for outbound calls.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[serde(default)]
pub struct Network {
    /// Size in bytes of the chunks files are split into. Peers with different
    /// chunk sizes can not exchange chunked content.
    pub chunk_size: usize,

    /// Largest string, byte buffer or list accepted from the wire.
    pub max_field_size: usize,

    /// Timeout for opening a connection to another node.
    pub connect_timeout_secs: u64,

    /// Timeout for receiving a response from another node.
    pub read_timeout_secs: u64,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            chunk_size: 64 * 1024,
            max_field_size: 64 * 1024 * 1024,
            connect_timeout_secs: 5,
            read_timeout_secs: 30,
        }
    }
}

impl Network {
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidValue {
                field: "network.chunk_size",
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.max_field_size < self.chunk_size {
            return Err(Error::InvalidValue {
                field: "network.max_field_size",
                reason: format!("must be at least the chunk size ({})", self.chunk_size),
            });
        }

        Ok(())
    }
}
