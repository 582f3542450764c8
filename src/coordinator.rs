//! The allocation coordinator: wires the bootstrap config, the
//! real-time client, and the control API client into the one
//! operation surface a host program needs (`spec.md` §4.5).

use std::sync::Arc;

use mp_client::{ConnectionStatus, RtClient, RtClientDriver, RtEvent};
use mp_config::ServerConfig;
use mp_protocol::{ConnectRequest, SubscribeRequest};
use tokio::sync::{Mutex, broadcast};

use crate::allocation::{decode_allocate_event, decode_deallocate_event, AllocationId};
use crate::control_api::ControlApiClient;
use crate::error::{ErrorResponseBody, PayloadAllocationErrorResponseBody, PayloadTokenResponseBody};
use crate::events::{AllocationNotification, SdkEvent};

const CONTROL_API_BASE_URL: &str = "http://localhost:8086";
const WEBSOCKET_URL: &str = "ws://localhost:8086/v1/connection/websocket";

/// Wires C1 (`mp-config`), C4 (`mp-client`), and the HTTP control
/// client together. Construction opens no sockets; call
/// [`AllocationCoordinator::subscribe_to_server_events`] to connect.
pub struct AllocationCoordinator {
    config: ServerConfig,
    rt: RtClient,
    control: ControlApiClient,
    allocation_id: Arc<Mutex<AllocationId>>,
    events: broadcast::Sender<SdkEvent>,
}

impl AllocationCoordinator {
    /// Build the coordinator and spawn the background task that
    /// drives the real-time connection and dispatches allocation
    /// events. The caller never touches the driver directly.
    pub fn new(config: ServerConfig) -> Result<Self, reqwest::Error> {
        let (rt, parts) = RtClient::new();
        let control = ControlApiClient::new(CONTROL_API_BASE_URL)?;
        let (events_tx, _) = broadcast::channel(256);
        let allocation_id = Arc::new(Mutex::new(AllocationId::Absent));

        let mut rt_events = rt.subscribe_events();
        let server_id = config.server_id;
        let coordinator_rt = rt.clone();
        let dispatch_events = events_tx.clone();
        let dispatch_allocation_id = Arc::clone(&allocation_id);
        tokio::spawn(async move {
            while let Ok(event) = rt_events.recv().await {
                dispatch_event(
                    event,
                    server_id,
                    &coordinator_rt,
                    &dispatch_allocation_id,
                    &dispatch_events,
                )
                .await;
            }
        });

        tokio::spawn(async move {
            if let Err(err) = RtClientDriver::from(parts).run(WEBSOCKET_URL).await {
                tracing::error!(error = %err, "real-time client driver exited");
            }
        });

        Ok(AllocationCoordinator {
            config,
            rt,
            control,
            allocation_id,
            events: events_tx,
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SdkEvent> {
        self.events.subscribe()
    }

    pub async fn allocation_id(&self) -> AllocationId {
        *self.allocation_id.lock().await
    }

    /// Thin pass-through to `RtClient::connect()`.
    pub fn subscribe_to_server_events(&self) {
        self.rt.connect();
    }

    /// Thin pass-through to `RtClient::disconnect()`.
    pub fn unsubscribe_to_server_events(&self) {
        self.rt.disconnect();
    }

    /// Fails synchronously with a 400 if no allocation is present
    /// (`spec.md` §7, E5), without issuing an HTTP request.
    pub async fn ready_server_for_players(&self) -> Result<(), ErrorResponseBody> {
        let allocation_id = self.allocation_id().await.uuid().ok_or_else(ErrorResponseBody::invalid_allocation_id)?;
        self.control
            .ready_server(self.config.server_id, allocation_id)
            .await
    }

    pub async fn unready_server(&self) -> Result<(), ErrorResponseBody> {
        self.control.unready_server(self.config.server_id).await
    }

    pub async fn get_payload_allocation(&self) -> Result<String, PayloadAllocationErrorResponseBody> {
        self.control.payload_allocation().await
    }

    pub async fn get_payload_token(&self) -> Result<PayloadTokenResponseBody, PayloadTokenResponseBody> {
        self.control.payload_token().await
    }
}

async fn dispatch_event(
    event: RtEvent,
    server_id: i64,
    rt: &RtClient,
    allocation_id: &Mutex<AllocationId>,
    events: &broadcast::Sender<SdkEvent>,
) {
    match event {
        RtEvent::Status(ConnectionStatus::Connected) => {
            rt.send_connect(ConnectRequest::default());
        }
        RtEvent::ConnectReply { .. } => {
            rt.subscribe(SubscribeRequest {
                channel: format!("server#{server_id}"),
                ..Default::default()
            });
        }
        RtEvent::Publication(push) => {
            if let Some(allocate) = decode_allocate_event(&push.data) {
                *allocation_id.lock().await = AllocationId::Present(allocate.allocation_id);
                let _ = events.send(SdkEvent::Allocated(AllocationNotification {
                    event_id: allocate.event_id,
                    server_id: allocate.server_id,
                    allocation_id: allocate.allocation_id,
                }));
            } else if let Some(deallocate) = decode_deallocate_event(&push.data) {
                *allocation_id.lock().await = AllocationId::Absent;
                let _ = events.send(SdkEvent::Deallocated(AllocationNotification {
                    event_id: deallocate.event_id,
                    server_id: deallocate.server_id,
                    allocation_id: deallocate.allocation_id,
                }));
            } else {
                tracing::warn!("publication on server channel was neither an allocate nor a deallocate event, dropping");
            }
        }
        other => {
            let _ = events.send(SdkEvent::Rt(other));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn test_config() -> ServerConfig {
        ServerConfig {
            server_id: 12345,
            allocation_id: String::new(),
            query_port: 7778,
            game_port: 7777,
            server_log_dir: "/home".to_owned(),
        }
    }

    #[tokio::test]
    async fn e1_allocate_publication_updates_allocation_id_and_broadcasts() {
        let allocation_id = Arc::new(Mutex::new(AllocationId::Absent));
        let (events_tx, mut events_rx) = broadcast::channel(16);
        let (rt, _parts) = RtClient::new();

        let publication = mp_protocol::PublicationPush {
            data: serde_json::json!({
                "EventID": "e3e455f8-f977-11e9-bccf-1a111111f111",
                "EventType": "AllocateEventType",
                "ServerID": 12345,
                "AllocationID": "e3e455f8-f977-11e9-bccf-2a222222f222",
            }),
            offset: None,
        };

        dispatch_event(
            RtEvent::Publication(publication),
            12345,
            &rt,
            &allocation_id,
            &events_tx,
        )
        .await;

        assert_eq!(
            *allocation_id.lock().await,
            AllocationId::Present(
                "e3e455f8-f977-11e9-bccf-2a222222f222".parse().unwrap()
            )
        );
        match events_rx.try_recv().unwrap() {
            SdkEvent::Allocated(notification) => {
                assert_eq!(notification.server_id, 12345);
            }
            other => panic!("expected Allocated, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_publication_leaves_allocation_id_unchanged() {
        let allocation_id = Arc::new(Mutex::new(AllocationId::Absent));
        let (events_tx, _events_rx) = broadcast::channel(16);
        let (rt, _parts) = RtClient::new();

        let publication = mp_protocol::PublicationPush {
            data: serde_json::json!({"unrelated": true}),
            offset: None,
        };
        dispatch_event(
            RtEvent::Publication(publication),
            12345,
            &rt,
            &allocation_id,
            &events_tx,
        )
        .await;

        assert_eq!(*allocation_id.lock().await, AllocationId::Absent);
    }

    #[tokio::test]
    async fn deallocate_publication_clears_allocation_id() {
        let allocation_id = Arc::new(Mutex::new(AllocationId::Present(Uuid::nil())));
        let (events_tx, mut events_rx) = broadcast::channel(16);
        let (rt, _parts) = RtClient::new();

        let publication = mp_protocol::PublicationPush {
            data: serde_json::json!({
                "EventID": "e3e455f8-f977-11e9-bccf-1a111111f111",
                "EventType": "DeallocateEventType",
                "ServerID": 12345,
                "AllocationID": "e3e455f8-f977-11e9-bccf-2a222222f222",
            }),
            offset: None,
        };
        dispatch_event(
            RtEvent::Publication(publication),
            12345,
            &rt,
            &allocation_id,
            &events_tx,
        )
        .await;

        assert_eq!(*allocation_id.lock().await, AllocationId::Absent);
        assert!(matches!(events_rx.try_recv().unwrap(), SdkEvent::Deallocated(_)));
    }

    #[tokio::test]
    async fn e5_ready_without_allocation_fails_synchronously_without_http() {
        let coordinator = AllocationCoordinator::new(test_config()).unwrap();
        let result = coordinator.ready_server_for_players().await;
        let error = result.unwrap_err();
        assert_eq!(error.status, 400);
        assert_eq!(error.title, "Invalid Allocation ID");
    }

    #[tokio::test]
    async fn connect_reply_does_not_panic_and_is_not_rebroadcast() {
        let allocation_id = Arc::new(Mutex::new(AllocationId::Absent));
        let (events_tx, mut events_rx) = broadcast::channel(16);
        let (rt, _parts) = RtClient::new();

        dispatch_event(
            RtEvent::ConnectReply {
                id: 1,
                result: mp_protocol::ConnectResult::default(),
            },
            12345,
            &rt,
            &allocation_id,
            &events_tx,
        )
        .await;

        assert!(events_rx.try_recv().is_err(), "ConnectReply is consumed, not passed through");
    }
}
