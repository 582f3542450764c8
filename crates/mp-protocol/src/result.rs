use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A single item of channel history, shared by `SubscribeResult` (the
/// recovered tail) and `HistoryResult`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

/// Per-client presence info, shared by `PresenceResult`, `JoinPush`, and
/// `LeavePush`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub client: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conn_info: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chan_info: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConnectResult {
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
pub struct SubscribeResult {
    #[serde(default)]
    pub expires: Option<bool>,
    #[serde(default)]
    pub ttl: Option<u32>,
    #[serde(default)]
    pub recoverable: Option<bool>,
    #[serde(default)]
    pub publications: Vec<Publication>,
    #[serde(default)]
    pub recovered: Option<bool>,
    #[serde(default)]
    pub epoch: Option<String>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub positioned: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UnsubscribeResult {}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PublishResult {}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PresenceResult {
    #[serde(default)]
    pub presence: HashMap<String, ClientInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PresenceStatsResult {
    #[serde(default)]
    pub num_clients: u32,
    #[serde(default)]
    pub num_users: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HistoryResult {
    #[serde(default)]
    pub publications: Vec<Publication>,
    #[serde(default)]
    pub epoch: Option<String>,
    #[serde(default)]
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PingResult {}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RpcResult {
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RefreshResult {
    #[serde(default)]
    pub expires: Option<bool>,
    #[serde(default)]
    pub ttl: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SubRefreshResult {
    #[serde(default)]
    pub expires: Option<bool>,
    #[serde(default)]
    pub ttl: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_result_decodes_documented_fields_not_an_empty_shell() {
        let value = serde_json::json!({
            "expires": true,
            "ttl": 30,
            "recoverable": true,
            "publications": [{"data": {"a": 1}, "offset": 5}],
            "recovered": false,
            "epoch": "ep1",
            "offset": 9,
            "positioned": true,
        });
        let result: SubscribeResult = serde_json::from_value(value).unwrap();
        assert_eq!(result.publications.len(), 1);
        assert_eq!(result.publications[0].offset, Some(5));
        assert_eq!(result.epoch.as_deref(), Some("ep1"));
        assert_eq!(result.offset, Some(9));
    }

    #[test]
    fn missing_fields_default_rather_than_error() {
        let result: SubscribeResult = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(result, SubscribeResult::default());
    }

    #[test]
    fn presence_result_decodes_map() {
        let value = serde_json::json!({
            "presence": {
                "client-1": {"user": "u1", "client": "client-1"}
            }
        });
        let result: PresenceResult = serde_json::from_value(value).unwrap();
        assert_eq!(result.presence.len(), 1);
        assert_eq!(result.presence["client-1"].user, "u1");
    }
}
