use serde::{Deserialize, Serialize};

/// Wire tag for an outbound command. Values are frozen protocol
/// constants, not implementation details — do not renumber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum Method {
    Connect = 0,
    Subscribe = 1,
    Unsubscribe = 2,
    Publish = 3,
    Presence = 4,
    PresenceStats = 5,
    History = 6,
    Ping = 7,
    Send = 8,
    Rpc = 9,
    Refresh = 10,
    SubRefresh = 11,
}

impl From<Method> for u32 {
    fn from(method: Method) -> u32 {
        method as u32
    }
}

impl TryFrom<u32> for Method {
    type Error = UnknownMethod;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Method::Connect),
            1 => Ok(Method::Subscribe),
            2 => Ok(Method::Unsubscribe),
            3 => Ok(Method::Publish),
            4 => Ok(Method::Presence),
            5 => Ok(Method::PresenceStats),
            6 => Ok(Method::History),
            7 => Ok(Method::Ping),
            8 => Ok(Method::Send),
            9 => Ok(Method::Rpc),
            10 => Ok(Method::Refresh),
            11 => Ok(Method::SubRefresh),
            other => Err(UnknownMethod(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMethod(pub u32);

impl std::fmt::Display for UnknownMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown method tag {}", self.0)
    }
}

impl std::error::Error for UnknownMethod {}
