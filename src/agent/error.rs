use std::path::PathBuf;

use swarmshare_content::StorageError;
use swarmshare_located_error::LocatedError;

use crate::servers;
use crate::watcher::WatchError;

/// Errors starting or stopping a peer agent.
#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    #[error("Unable to prepare the directory {}: {source}", .path.display())]
    Directory {
        path: PathBuf,
        source: LocatedError<'static, std::io::Error>,
    },

    #[error("Unable to scan the content directory: {0}")]
    Scan(#[from] StorageError),

    #[error(transparent)]
    Tracker(#[from] swarmshare_tracker_client::Error),

    #[error(transparent)]
    Server(#[from] servers::Error),

    #[error(transparent)]
    Watch(#[from] WatchError),

    #[error("The {task} task failed: {reason}")]
    Task { task: &'static str, reason: String },
}
