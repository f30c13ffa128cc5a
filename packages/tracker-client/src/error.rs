use swarmshare_located_error::{Located, LocatedError};
use swarmshare_wire_protocol::DecodeError;

#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    #[error("Unable to connect to the tracker at {address}: {source}")]
    Connect {
        address: String,
        source: LocatedError<'static, std::io::Error>,
    },

    #[error("Timed out connecting to the tracker at {address}")]
    ConnectTimeout { address: String },

    #[error("Unable to send the request to the tracker: {source}")]
    Send {
        source: LocatedError<'static, std::io::Error>,
    },

    #[error("Unable to read the tracker response: {source}")]
    Receive { source: DecodeError },

    #[error("Timed out waiting for the tracker response")]
    ResponseTimeout,

    #[error("The connection to the tracker was lost after a failed request")]
    ConnectionLost,
}

impl From<std::io::Error> for Error {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Error::Send {
            source: Located(err).into(),
        }
    }
}

impl From<DecodeError> for Error {
    fn from(source: DecodeError) -> Self {
        Error::Receive { source }
    }
}
