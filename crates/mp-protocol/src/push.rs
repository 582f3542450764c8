use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::result::{ClientInfo, Publication};

/// Wire tag for a server-initiated push. Absent on the wire defaults to
/// `Publication` (observed server behavior, `spec.md` §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum PushType {
    Publication = 0,
    Join = 1,
    Leave = 2,
    Unsubscribe = 3,
    Message = 4,
    Subscribe = 5,
    Connect = 6,
    Disconnect = 7,
    Refresh = 8,
}

impl Default for PushType {
    fn default() -> Self {
        PushType::Publication
    }
}

impl From<PushType> for u32 {
    fn from(push_type: PushType) -> u32 {
        push_type as u32
    }
}

impl TryFrom<u32> for PushType {
    type Error = UnknownPushType;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PushType::Publication),
            1 => Ok(PushType::Join),
            2 => Ok(PushType::Leave),
            3 => Ok(PushType::Unsubscribe),
            4 => Ok(PushType::Message),
            5 => Ok(PushType::Subscribe),
            6 => Ok(PushType::Connect),
            7 => Ok(PushType::Disconnect),
            8 => Ok(PushType::Refresh),
            other => Err(UnknownPushType(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownPushType(pub u32);

impl std::fmt::Display for UnknownPushType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown push type tag {}", self.0)
    }
}

impl std::error::Error for UnknownPushType {}

/// The `result` object of a push frame: `{"type": T?, "data": {...}}`.
/// `push_type` defaults to `Publication` when the wire omits `type`.
#[derive(Debug, Clone, Deserialize)]
pub struct PushEnvelope {
    #[serde(rename = "type", default)]
    pub push_type: PushType,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PublicationPush {
    pub data: Value,
    #[serde(default)]
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JoinPush {
    #[serde(default)]
    pub info: ClientInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LeavePush {
    #[serde(default)]
    pub info: ClientInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UnsubscribePush {
    #[serde(default)]
    pub code: Option<u32>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MessagePush {
    #[serde(default)]
    pub data: Value,
}

/// A server-initiated subscribe push (e.g. the server subscribed this
/// client to a channel it did not itself request). All documented
/// fields are decoded — see `spec.md` §4.3 open question.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SubscribePush {
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub recoverable: Option<bool>,
    #[serde(default)]
    pub positioned: Option<bool>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub publications: Vec<Publication>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConnectPush {
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub expires: Option<bool>,
    #[serde(default)]
    pub ttl: Option<u32>,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DisconnectPush {
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub reconnect: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RefreshPush {
    #[serde(default)]
    pub expires: Option<bool>,
    #[serde(default)]
    pub ttl: Option<u32>,
}
