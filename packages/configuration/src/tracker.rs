use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};

use crate::DEFAULT_TRACKER_PORT;

/// Configuration for the tracker service.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[serde(default)]
pub struct Tracker {
    /// The address the tracker will bind to.
    /// The format is `ip:port`, for example `0.0.0.0:8080`. If you want to
    /// listen to all interfaces, use `0.0.0.0`. If the port is `0` the OS
    /// picks a free one.
    pub bind_address: SocketAddr,

    /// Whether the tracker collects usage statistics (connections and
    /// requests per kind).
    pub statistics: bool,
}

impl Default for Tracker {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_TRACKER_PORT),
            statistics: true,
        }
    }
}
