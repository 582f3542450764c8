use serde::Serialize;
use serde_json::Value;

use crate::method::Method;

/// Implemented by every outbound request payload; ties the payload to
/// its wire method tag so the client never has to infer it from shape.
pub trait RtRequest: Serialize {
    const METHOD: Method;
}

/// The full outbound frame: `{"id":N,"method":M,"params":{...}}`.
#[derive(Debug, Serialize)]
pub struct CommandEnvelope<'a, T: Serialize> {
    pub id: u32,
    pub method: u32,
    pub params: &'a T,
}

impl<'a, T: RtRequest> CommandEnvelope<'a, T> {
    pub fn new(id: u32, params: &'a T) -> Self {
        Self {
            id,
            method: u32::from(T::METHOD),
            params,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConnectRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RtRequest for ConnectRequest {
    const METHOD: Method = Method::Connect;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubscribeRequest {
    pub channel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recover: Option<bool>,
    /// Last known offset for recovery. Wide enough that JSON-number
    /// fidelity matters; `serde_json` round-trips `u64` exactly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epoch: Option<String>,
}

impl RtRequest for SubscribeRequest {
    const METHOD: Method = Method::Subscribe;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UnsubscribeRequest {
    pub channel: String,
}

impl RtRequest for UnsubscribeRequest {
    const METHOD: Method = Method::Unsubscribe;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PublishRequest {
    pub channel: String,
    pub data: Value,
}

impl RtRequest for PublishRequest {
    const METHOD: Method = Method::Publish;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PresenceRequest {
    pub channel: String,
}

impl RtRequest for PresenceRequest {
    const METHOD: Method = Method::Presence;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PresenceStatsRequest {
    pub channel: String,
}

impl RtRequest for PresenceStatsRequest {
    const METHOD: Method = Method::PresenceStats;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoryRequest {
    pub channel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since_offset: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since_epoch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverse: Option<bool>,
}

impl RtRequest for HistoryRequest {
    const METHOD: Method = Method::History;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PingRequest {}

impl RtRequest for PingRequest {
    const METHOD: Method = Method::Ping;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SendRequest {
    pub data: Value,
}

impl RtRequest for SendRequest {
    const METHOD: Method = Method::Send;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RpcRequest {
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RtRequest for RpcRequest {
    const METHOD: Method = Method::Rpc;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RefreshRequest {
    pub token: String,
}

impl RtRequest for RefreshRequest {
    const METHOD: Method = Method::Refresh;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubRefreshRequest {
    pub channel: String,
    pub token: String,
}

impl RtRequest for SubRefreshRequest {
    const METHOD: Method = Method::SubRefresh;
}
