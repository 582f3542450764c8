//! mp-client: a real-time WebSocket client over the Centrifuge-style
//! JSON protocol defined in `mp-protocol`.
//!
//! [`RtClient`] is a cheap, cloneable handle; the actual socket lives
//! in an [`RtClientDriver`] owned by a background task spawned with
//! [`RtClientDriver::run`]. Split construction keeps the connection
//! state machine out of the public handle, matching the uplink
//! session's connect/handle split this crate is grounded on.

mod client;
mod dispatch;
mod driver;
mod event;
mod status;

pub use client::{RtClient, RtClientParts};
pub use driver::{DriverError, RtClientDriver};
pub use event::{ErrorBody, RtEvent};
pub use status::ConnectionStatus;
