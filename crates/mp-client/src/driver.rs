use std::sync::Arc;

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::tungstenite::protocol::Message;
use tracing::{debug, warn};

use crate::client::{ControlMsg, RtClientParts, Shared};
use crate::dispatch::dispatch_frame;
use crate::event::RtEvent;
use crate::status::ConnectionStatus;

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("websocket: {0}")]
    Ws(#[from] WsError),
}

/// Publish a status transition on both the `watch` channel (current
/// value, polled) and the typed event broadcast (history, observed).
fn set_status(shared: &Shared, status: ConnectionStatus) {
    let _ = shared.status.send(status);
    let _ = shared.events.send(RtEvent::Status(status));
}

/// Owns the background task for one [`crate::client::RtClient`]. Not
/// cloneable; `run` consumes it and drives the connection until the
/// control channel closes (every client handle dropped).
pub struct RtClientDriver {
    shared: Arc<Shared>,
    control_rx: UnboundedReceiver<ControlMsg>,
}

impl From<RtClientParts> for RtClientDriver {
    fn from(parts: RtClientParts) -> Self {
        RtClientDriver {
            shared: parts.shared,
            control_rx: parts.control_rx,
        }
    }
}

impl RtClientDriver {
    /// Drive the client against a real server at `url` until every
    /// [`crate::client::RtClient`] handle is dropped. Reconnection is
    /// the caller's responsibility: a transport error returns control
    /// to the caller with status left `Disconnected`.
    pub async fn run(mut self, url: &str) -> Result<(), DriverError> {
        loop {
            match self.control_rx.recv().await {
                None => return Ok(()),
                Some(ControlMsg::Connect) => {
                    set_status(&self.shared, ConnectionStatus::Connecting);
                    let (ws, _response) = match tokio_tungstenite::connect_async(url).await {
                        Ok(pair) => pair,
                        Err(err) => {
                            warn!(error = %err, "connect failed");
                            set_status(&self.shared, ConnectionStatus::Disconnected);
                            continue;
                        }
                    };
                    set_status(&self.shared, ConnectionStatus::Connected);
                    let status = drive_connection(ws, &self.shared, &mut self.control_rx).await;
                    set_status(&self.shared, status);
                }
                Some(ControlMsg::Disconnect | ControlMsg::Send(_)) => {
                    debug!("ignoring control message while disconnected");
                }
            }
        }
    }
}

/// Drive one open transport from just-connected to closed, handling
/// control messages and incoming frames. Generic over the transport so
/// it can be driven by an in-memory duplex stream in tests, mirroring
/// the receiver session loop's `run_session_loop<S>` shape.
pub(crate) async fn drive_connection<S>(
    mut ws: S,
    shared: &Arc<Shared>,
    control_rx: &mut UnboundedReceiver<ControlMsg>,
) -> ConnectionStatus
where
    S: Stream<Item = Result<Message, WsError>> + Sink<Message, Error = WsError> + Unpin,
{
    loop {
        tokio::select! {
            biased;
            ctrl = control_rx.recv() => {
                match ctrl {
                    None => return ConnectionStatus::Disconnected,
                    Some(ControlMsg::Connect) => {}
                    Some(ControlMsg::Disconnect) => {
                        set_status(shared, ConnectionStatus::Disconnecting);
                        let _ = ws.send(Message::Close(None)).await;
                    }
                    Some(ControlMsg::Send(frame)) => {
                        if let Err(err) = ws.send(Message::Text(frame.into())).await {
                            warn!(error = %err, "send failed");
                            return ConnectionStatus::Disconnected;
                        }
                    }
                }
            }
            msg = ws.next() => {
                match msg {
                    None => return ConnectionStatus::Disconnected,
                    Some(Err(err)) => {
                        warn!(error = %err, "transport error");
                        return ConnectionStatus::Disconnected;
                    }
                    Some(Ok(Message::Close(_))) => return ConnectionStatus::Disconnected,
                    Some(Ok(Message::Ping(data))) => {
                        let _ = ws.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Text(text))) => {
                        let events = shared.events.clone();
                        dispatch_frame(&text, &shared.pending, &mut |event: RtEvent| {
                            let _ = events.send(event);
                        });
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mp_protocol::{Method, PingRequest, RtRequest};
    use tokio::io::{AsyncRead, AsyncWrite, duplex};
    use tokio_tungstenite::WebSocketStream;
    use tokio_tungstenite::tungstenite::protocol::Role;

    async fn fake_pair() -> (
        WebSocketStream<impl AsyncRead + AsyncWrite + Unpin>,
        WebSocketStream<impl AsyncRead + AsyncWrite + Unpin>,
    ) {
        let (client_io, server_io) = duplex(64 * 1024);
        let client = WebSocketStream::from_raw_socket(client_io, Role::Client, None).await;
        let server = WebSocketStream::from_raw_socket(server_io, Role::Server, None).await;
        (client, server)
    }

    #[tokio::test]
    async fn e1_multi_message_frame_dispatches_subscribe_reply_then_push() {
        let (mut server_side, client_side) = fake_pair().await;
        let shared = Shared::for_test(5, Method::Subscribe);
        let mut events = shared.events.subscribe();
        let (_control_tx, mut control_rx) = tokio::sync::mpsc::unbounded_channel();

        let frame = "{\"id\":5,\"result\":{}}\n{\"result\":{\"data\":{\"EventID\":\"e3e455f8-f977-11e9-bccf-1a111111f111\",\"EventType\":\"AllocateEventType\",\"ServerID\":12345,\"AllocationID\":\"e3e455f8-f977-11e9-bccf-2a222222f222\"}}}";
        server_side
            .send(Message::Text(frame.into()))
            .await
            .unwrap();
        server_side.send(Message::Close(None)).await.unwrap();

        let status = drive_connection(client_side, &shared, &mut control_rx).await;
        assert_eq!(status, ConnectionStatus::Disconnected);

        let first = events.try_recv().unwrap();
        assert!(matches!(first, RtEvent::SubscribeReply { id: 5, .. }));
        let second = events.try_recv().unwrap();
        assert!(matches!(second, RtEvent::Publication(_)));
    }

    #[tokio::test]
    async fn send_control_message_forwards_frame_to_transport() {
        let (mut server_side, client_side) = fake_pair().await;
        let shared = Shared::for_test(1, Method::Ping);
        let (control_tx, mut control_rx) = tokio::sync::mpsc::unbounded_channel();

        let envelope = mp_protocol::CommandEnvelope::new(1, &PingRequest {});
        assert_eq!(PingRequest::METHOD, Method::Ping);
        let frame = serde_json::to_string(&envelope).unwrap();
        control_tx.send(ControlMsg::Send(frame.clone())).unwrap();
        control_tx.send(ControlMsg::Disconnect).unwrap();
        drop(control_tx);

        let status = drive_connection(client_side, &shared, &mut control_rx).await;
        assert_eq!(status, ConnectionStatus::Disconnected);

        match server_side.next().await.unwrap().unwrap() {
            Message::Text(received) => assert_eq!(received, frame),
            other => panic!("unexpected message: {other:?}"),
        }
    }
}
