use std::sync::Arc;

use swarmshare_primitives::PeerAddress;
use swarmshare_tracker_core::request_handler::{Reply, RequestHandler};
use swarmshare_wire_protocol::{FieldReader, FieldWriter, Inbound, TrackerRequest};
use tokio::io::AsyncWrite;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tracing::instrument;

use crate::servers::signals::connections_halted;

/// Serves one peer connection until it closes.
///
/// The peer's fingerprints are released exactly once, whatever the reason
/// the connection closed.
#[instrument(skip(stream, request_handler, max_field_size, halt), fields(peer = %remote))]
pub async fn handle_connection(
    stream: TcpStream,
    remote: PeerAddress,
    request_handler: Arc<RequestHandler>,
    max_field_size: usize,
    mut halt: watch::Receiver<bool>,
) {
    request_handler.handle_connection(&remote);

    let (read_half, write_half) = stream.into_split();
    let mut reader = FieldReader::with_max_field_size(read_half, max_field_size);
    let mut writer = FieldWriter::new(write_half);

    loop {
        let inbound = tokio::select! {
            inbound = TrackerRequest::read_from(&mut reader) => inbound,
            () = connections_halted(&mut halt) => {
                tracing::debug!("closing the connection, the tracker is stopping");
                break;
            }
        };

        match inbound {
            Ok(Inbound::Request(request)) => {
                if let Reply::Peers(peers) = request_handler.handle_request(&remote, request) {
                    if let Err(err) = write_peers(&mut writer, &peers).await {
                        tracing::warn!("unable to send the query response: {err}");
                        break;
                    }
                }
            }
            Ok(Inbound::Unknown(kind)) => request_handler.handle_unknown_request(&remote, &kind),
            Err(err) if err.is_disconnect() => break,
            Err(err) => {
                request_handler.handle_decode_error(&remote, &err);
                break;
            }
        }
    }

    request_handler.handle_disconnection(&remote);
}

async fn write_peers<W: AsyncWrite + Unpin>(writer: &mut FieldWriter<W>, peers: &[PeerAddress]) -> std::io::Result<()> {
    writer
        .write_string_list(peers.iter().map(ToString::to_string).collect())
        .await?;
    writer.flush().await
}
