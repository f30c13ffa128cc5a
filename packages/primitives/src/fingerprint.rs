//! Content fingerprints.
//!
//! A [`Fingerprint`] identifies either a whole file or a single chunk of a
//! file. It is the value produced by the content fingerprint function (see the
//! `swarmshare-content` package) and it is what peers advertise to the tracker.
//!
//! > **NOTICE**: fingerprints are not collision resistant. Two different
//! > buffers can share the same fingerprint.
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Numeric content identifier.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Constructor,
    derive_more::Display,
    derive_more::From,
    derive_more::Into,
)]
#[serde(transparent)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// The fingerprint of an empty buffer.
    pub const ZERO: Fingerprint = Fingerprint(0);

    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

/// Error returned when a fingerprint cannot be parsed from user input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid fingerprint: {input:?}, expected an unsigned decimal integer")]
pub struct ParseFingerprintError {
    pub input: String,
}

impl FromStr for Fingerprint {
    type Err = ParseFingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Fingerprint).map_err(|_| ParseFingerprintError {
            input: s.to_string(),
        })
    }
}
