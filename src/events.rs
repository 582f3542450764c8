//! Events broadcast to host ("game") code.
//!
//! The source exposes `OnAllocate`/`OnDeallocate` multicast delegates
//! directly on the subsystem. Here both collapse into a single
//! [`SdkEvent`] broadcast channel, matching the teacher's
//! `ui_tx: broadcast::Sender<ReceiverUiEvent>` pattern
//! (`services/receiver/src/control_api.rs::AppState`) rather than one
//! channel per delegate.

use uuid::Uuid;

use mp_client::RtEvent;

/// Carries the fields of an allocation lifecycle publication
/// (`spec.md` §4.5: "broadcast an allocation notification carrying
/// EventId, ServerId, AllocationId").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationNotification {
    pub event_id: Uuid,
    pub server_id: i64,
    pub allocation_id: Uuid,
}

/// Everything the coordinator broadcasts to subscribers: allocation
/// lifecycle notifications, plus a pass-through of any other
/// real-time event a host might want to observe directly.
#[derive(Debug, Clone)]
pub enum SdkEvent {
    Allocated(AllocationNotification),
    Deallocated(AllocationNotification),
    Rt(RtEvent),
}
