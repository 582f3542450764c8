//! mp-protocol: the real-time RPC/push message catalogue.
//!
//! All WebSocket frames are JSON. Commands carry an integer `method`
//! tag (see [`Method`]); pushes carry an integer `type` tag (see
//! [`PushType`]) that defaults to `Publication` when absent. Decoding
//! a reply's `result` requires knowing which request `id` it answers —
//! the mapping from `id` to result type lives in `mp-client`'s pending
//! request table, not here.

mod disconnect;
mod method;
mod push;
mod request;
mod result;

pub use disconnect::DisconnectCode;
pub use method::{Method, UnknownMethod};
pub use push::{
    ConnectPush, DisconnectPush, JoinPush, LeavePush, MessagePush, PublicationPush, PushEnvelope,
    PushType, RefreshPush, SubscribePush, UnknownPushType, UnsubscribePush,
};
pub use request::{
    CommandEnvelope, ConnectRequest, HistoryRequest, PingRequest, PresenceRequest,
    PresenceStatsRequest, PublishRequest, RefreshRequest, RpcRequest, RtRequest, SendRequest,
    SubRefreshRequest, SubscribeRequest, UnsubscribeRequest,
};
pub use result::{
    ClientInfo, ConnectResult, HistoryResult, PingResult, PresenceResult, PresenceStatsResult,
    Publication, PublishResult, RefreshResult, RpcResult, SubRefreshResult, SubscribeResult,
    UnsubscribeResult,
};
