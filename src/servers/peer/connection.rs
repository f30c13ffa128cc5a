use std::sync::Arc;

use swarmshare_peer_core::{Reply, RequestHandler};
use swarmshare_primitives::PeerAddress;
use swarmshare_wire_protocol::{FieldReader, FieldWriter, Inbound, PeerRequest};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tracing::instrument;

use crate::servers::signals::connections_halted;

/// Serves the requests of another peer until the connection closes.
#[instrument(skip(stream, request_handler, max_field_size, halt), fields(peer = %remote))]
pub async fn handle_connection(
    stream: TcpStream,
    remote: PeerAddress,
    request_handler: Arc<RequestHandler>,
    max_field_size: usize,
    mut halt: watch::Receiver<bool>,
) {
    let (read_half, write_half) = stream.into_split();
    let mut reader = FieldReader::with_max_field_size(read_half, max_field_size);
    let mut writer = FieldWriter::new(write_half);

    loop {
        let inbound = tokio::select! {
            inbound = PeerRequest::read_from(&mut reader) => inbound,
            () = connections_halted(&mut halt) => break,
        };

        match inbound {
            Ok(Inbound::Request(request)) => {
                if let Reply::Chunk(bytes) = request_handler.handle_request(remote, request).await {
                    let sent = match writer.write_bytes(bytes).await {
                        Ok(()) => writer.flush().await,
                        Err(err) => Err(err),
                    };

                    if let Err(err) = sent {
                        tracing::warn!("unable to send the chunk: {err}");
                        break;
                    }
                }
            }
            Ok(Inbound::Unknown(kind)) => tracing::warn!(kind, "unknown request kind, ignoring it"),
            Err(err) if err.is_disconnect() => break,
            Err(err) => {
                tracing::warn!(%err, "malformed message, closing the connection");
                break;
            }
        }
    }

    tracing::debug!("connection closed");
}
