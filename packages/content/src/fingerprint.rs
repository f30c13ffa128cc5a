//! The content fingerprint function.
//!
//! The fingerprint of a buffer is the sum of its bytes. It is the same for
//! whole files and for chunks, and registration and lookup must both use it
//! or fingerprints will never match.
//!
//! ```rust
//! use swarmshare_content::fingerprint;
//! use swarmshare_primitives::Fingerprint;
//!
//! assert_eq!(fingerprint(&[1, 2, 3]), Fingerprint::new(6));
//! assert_eq!(fingerprint(&[]), Fingerprint::ZERO);
//! ```
//!
//! > **WARNING**: the sum is commutative, so any permutation of a buffer
//! > collides with the buffer itself. The rest of the system tolerates
//! > collisions, it does not prevent them.
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use swarmshare_located_error::Located;
use swarmshare_primitives::Fingerprint;

use crate::error::StorageError;

/// Computes the fingerprint of a buffer. The empty buffer has fingerprint `0`.
#[must_use]
pub fn fingerprint(bytes: &[u8]) -> Fingerprint {
    Fingerprint::new(accumulate(0, bytes))
}

/// Computes the fingerprint of a whole file without loading it in memory.
///
/// # Errors
///
/// Will return a [`StorageError::Read`] if the file can not be opened or read.
pub fn fingerprint_file(path: &Path) -> Result<Fingerprint, StorageError> {
    let read_error = |err: std::io::Error| StorageError::Read {
        path: path.to_path_buf(),
        source: Located(err).into(),
    };

    let mut reader = BufReader::new(File::open(path).map_err(read_error)?);
    let mut buffer = [0u8; 8 * 1024];
    let mut sum = 0u64;

    loop {
        let read = reader.read(&mut buffer).map_err(read_error)?;
        if read == 0 {
            break;
        }
        sum = accumulate(sum, &buffer[..read]);
    }

    Ok(Fingerprint::new(sum))
}

fn accumulate(sum: u64, bytes: &[u8]) -> u64 {
    bytes.iter().fold(sum, |acc, byte| acc.wrapping_add(u64::from(*byte)))
}
