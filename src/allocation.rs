//! Allocation lifecycle types: the `AllocationId` state and the two
//! publication payloads that drive its transitions.

use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

const ALLOCATE_EVENT_TYPE: &str = "AllocateEventType";
const DEALLOCATE_EVENT_TYPE: &str = "DeallocateEventType";

/// The allocation state: absent, or present with the fleet-assigned
/// UUID. Set by [`AllocateEvent`], cleared by [`DeallocateEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AllocationId {
    #[default]
    Absent,
    Present(Uuid),
}

impl AllocationId {
    pub fn is_present(&self) -> bool {
        matches!(self, AllocationId::Present(_))
    }

    pub fn uuid(&self) -> Option<Uuid> {
        match self {
            AllocationId::Present(id) => Some(*id),
            AllocationId::Absent => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawAllocationEvent {
    #[serde(rename = "EventID")]
    event_id: Uuid,
    #[serde(rename = "EventType")]
    event_type: String,
    #[serde(rename = "ServerID")]
    server_id: i64,
    #[serde(rename = "AllocationID")]
    allocation_id: Uuid,
}

/// A decoded `AllocateEventType` publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocateEvent {
    pub event_id: Uuid,
    pub server_id: i64,
    pub allocation_id: Uuid,
}

/// A decoded `DeallocateEventType` publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeallocateEvent {
    pub event_id: Uuid,
    pub server_id: i64,
    pub allocation_id: Uuid,
}

/// Decode `data` as an `AllocateEvent`. Returns `None` if the shape
/// doesn't match or `EventType` isn't the exact expected literal —
/// the mismatch must never mutate `AllocationId` (`spec.md` §3).
pub fn decode_allocate_event(data: &Value) -> Option<AllocateEvent> {
    let raw: RawAllocationEvent = serde_json::from_value(data.clone()).ok()?;
    (raw.event_type == ALLOCATE_EVENT_TYPE).then_some(AllocateEvent {
        event_id: raw.event_id,
        server_id: raw.server_id,
        allocation_id: raw.allocation_id,
    })
}

/// Decode `data` as a `DeallocateEvent`, with the same literal-match
/// discipline as [`decode_allocate_event`].
pub fn decode_deallocate_event(data: &Value) -> Option<DeallocateEvent> {
    let raw: RawAllocationEvent = serde_json::from_value(data.clone()).ok()?;
    (raw.event_type == DEALLOCATE_EVENT_TYPE).then_some(DeallocateEvent {
        event_id: raw.event_id,
        server_id: raw.server_id,
        allocation_id: raw.allocation_id,
    })
}
