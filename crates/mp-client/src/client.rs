use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use mp_protocol::{
    CommandEnvelope, ConnectRequest, HistoryRequest, Method, PingRequest, PresenceRequest,
    PresenceStatsRequest, PublishRequest, RefreshRequest, RpcRequest, RtRequest, SendRequest,
    SubRefreshRequest, SubscribeRequest, UnsubscribeRequest,
};
use tokio::sync::{broadcast, mpsc, watch};

use crate::event::RtEvent;
use crate::status::ConnectionStatus;

/// Outbound control-plane instructions consumed by the connection driver.
/// `Send(frame)` carries an already-serialized `CommandEnvelope`.
pub(crate) enum ControlMsg {
    Connect,
    Disconnect,
    Send(String),
}

/// State shared between the cloneable [`RtClient`] handle and the
/// background driver task.
pub(crate) struct Shared {
    next_id: AtomicU32,
    pub(crate) pending: Mutex<HashMap<u32, Method>>,
    pub(crate) events: broadcast::Sender<RtEvent>,
    pub(crate) status: watch::Sender<ConnectionStatus>,
}

impl Shared {
    /// Allocate the next request id, skipping zero — id 0 is reserved
    /// for server pushes and must never be handed out to a request
    /// (`spec.md` §4.4 Testable Property 1).
    fn alloc_id(&self) -> u32 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if id == 0 {
            self.next_id.fetch_add(1, Ordering::Relaxed)
        } else {
            id
        }
    }

    /// Build a `Shared` with a single pending entry and a connected
    /// status, for driving a fake transport directly in tests.
    #[cfg(test)]
    pub(crate) fn for_test(id: u32, method: Method) -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        let (status, _) = watch::channel(ConnectionStatus::Connected);
        let mut pending = HashMap::new();
        pending.insert(id, method);
        Arc::new(Shared {
            next_id: AtomicU32::new(1),
            pending: Mutex::new(pending),
            events,
            status,
        })
    }
}

/// A cloneable handle to a real-time connection. Cloning shares the
/// same pending-request table, event stream, and control channel; it
/// does not open a second transport.
#[derive(Clone)]
pub struct RtClient {
    shared: Arc<Shared>,
    control: mpsc::UnboundedSender<ControlMsg>,
}

/// Returned by [`RtClient::new`]: the handle plus the receiving ends
/// the caller hands to [`crate::driver::RtClientDriver::run`].
pub struct RtClientParts {
    pub client: RtClient,
    pub(crate) control_rx: mpsc::UnboundedReceiver<ControlMsg>,
    pub(crate) shared: Arc<Shared>,
}

impl RtClient {
    /// Build a new client handle and the parts its driver needs. The
    /// handle is usable immediately; no transport is open until
    /// [`RtClient::connect`] is called and the driver processes it.
    pub fn new() -> (Self, RtClientParts) {
        let (events, _) = broadcast::channel(256);
        let (status, _) = watch::channel(ConnectionStatus::Disconnected);
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            next_id: AtomicU32::new(1),
            pending: Mutex::new(HashMap::new()),
            events,
            status,
        });
        let client = RtClient {
            shared: shared.clone(),
            control: control_tx,
        };
        (
            client.clone(),
            RtClientParts {
                client,
                control_rx,
                shared,
            },
        )
    }

    /// Subscribe a fresh receiver to the typed event stream.
    pub fn subscribe_events(&self) -> broadcast::Receiver<RtEvent> {
        self.shared.events.subscribe()
    }

    /// Subscribe a fresh receiver to connection status transitions.
    pub fn subscribe_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.shared.status.subscribe()
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.shared.status.borrow()
    }

    /// Trigger the Disconnected -> Connecting transition. A no-op if
    /// already connecting or connected.
    pub fn connect(&self) {
        let _ = self.control.send(ControlMsg::Connect);
    }

    /// Trigger the Connected -> Disconnecting transition. Forbidden
    /// (and ignored by the driver) while `Connecting`.
    pub fn disconnect(&self) {
        let _ = self.control.send(ControlMsg::Disconnect);
    }

    /// Serialize `params` into a command envelope under a freshly
    /// allocated id, record the pending method so the reply can be
    /// decoded, and hand the frame to the driver. Returns the id so
    /// callers can correlate a later [`RtEvent`] reply.
    ///
    /// `Method::Send` replies never arrive — its pending entry is
    /// removed immediately after enqueueing rather than left to leak.
    fn call<T: RtRequest>(&self, params: T) -> u32 {
        let id = self.shared.alloc_id();
        self.shared.pending.lock().unwrap().insert(id, T::METHOD);
        let envelope = CommandEnvelope::new(id, &params);
        let frame = serde_json::to_string(&envelope).expect("command envelope always serializes");
        let _ = self.control.send(ControlMsg::Send(frame));
        if T::METHOD == Method::Send {
            self.shared.pending.lock().unwrap().remove(&id);
        }
        id
    }

    /// Send an explicit `Connect` command over an already-open
    /// transport. Normally issued implicitly by the driver right after
    /// the socket opens; exposed directly so every wire method has a
    /// corresponding public operation.
    pub fn send_connect(&self, params: ConnectRequest) -> u32 {
        self.call(params)
    }

    pub fn subscribe(&self, params: SubscribeRequest) -> u32 {
        self.call(params)
    }

    pub fn unsubscribe(&self, params: UnsubscribeRequest) -> u32 {
        self.call(params)
    }

    pub fn publish(&self, params: PublishRequest) -> u32 {
        self.call(params)
    }

    pub fn presence(&self, params: PresenceRequest) -> u32 {
        self.call(params)
    }

    pub fn presence_stats(&self, params: PresenceStatsRequest) -> u32 {
        self.call(params)
    }

    pub fn history(&self, params: HistoryRequest) -> u32 {
        self.call(params)
    }

    pub fn ping(&self, params: PingRequest) -> u32 {
        self.call(params)
    }

    pub fn send(&self, params: SendRequest) -> u32 {
        self.call(params)
    }

    pub fn rpc(&self, params: RpcRequest) -> u32 {
        self.call(params)
    }

    pub fn refresh(&self, params: RefreshRequest) -> u32 {
        self.call(params)
    }

    pub fn sub_refresh(&self, params: SubRefreshRequest) -> u32 {
        self.call(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocated_ids_never_repeat_zero() {
        let (client, _parts) = RtClient::new();
        let mut ids = Vec::new();
        for _ in 0..5 {
            ids.push(client.call(PingRequest {}));
        }
        assert!(ids.iter().all(|id| *id != 0));
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn id_allocator_skips_zero_on_wraparound() {
        let (client, _parts) = RtClient::new();
        client.shared.next_id.store(u32::MAX, Ordering::Relaxed);
        let before_wrap = client.call(PingRequest {});
        let after_wrap = client.call(PingRequest {});
        assert_eq!(before_wrap, u32::MAX);
        assert_eq!(after_wrap, 1);
    }

    #[test]
    fn send_method_pending_entry_is_removed_immediately() {
        let (client, parts) = RtClient::new();
        let id = client.send(SendRequest {
            data: serde_json::json!({"k": "v"}),
        });
        assert!(!parts.shared.pending.lock().unwrap().contains_key(&id));
    }

    #[test]
    fn non_send_method_pending_entry_is_recorded() {
        let (client, parts) = RtClient::new();
        let id = client.ping(PingRequest {});
        assert_eq!(
            parts.shared.pending.lock().unwrap().get(&id).copied(),
            Some(Method::Ping)
        );
    }
}
