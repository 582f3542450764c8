//! Multiplay Game Server SDK.
//!
//! Five components, each owned by its own crate: [`mp_config`] reads
//! the fleet-provided bootstrap file, [`mp_query`] answers liveness
//! queries over UDP, [`mp_protocol`] catalogues the real-time wire
//! messages, [`mp_client`] drives the real-time WebSocket connection,
//! and this crate's [`AllocationCoordinator`] wires the three
//! together into the allocation lifecycle a host program actually
//! calls.

mod allocation;
mod control_api;
mod coordinator;
mod error;
mod events;

pub use allocation::{AllocateEvent, AllocationId, DeallocateEvent};
pub use control_api::ControlApiClient;
pub use coordinator::AllocationCoordinator;
pub use error::{ErrorResponseBody, PayloadAllocationErrorResponseBody, PayloadTokenResponseBody};
pub use events::{AllocationNotification, SdkEvent};

pub use mp_client::{ConnectionStatus, RtEvent};
pub use mp_config::ServerConfig;
