//! HTTP client for the fleet sidecar's local control API.
//!
//! Grounded on `services/receiver/src/control_api.rs`'s
//! `fetch_server_streams` helper: a short-timeout `reqwest::Client`,
//! a typed success shape per endpoint, and an endpoint-specific error
//! body decoded on any non-2xx response.

use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

use crate::error::{ErrorResponseBody, PayloadAllocationErrorResponseBody, PayloadTokenResponseBody};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Serialize)]
struct ReadyServerRequest {
    #[serde(rename = "serverId")]
    server_id: i64,
    #[serde(rename = "allocationId")]
    allocation_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
struct UnreadyServerRequest {
    #[serde(rename = "serverId")]
    server_id: i64,
}

/// Thin wrapper over the four endpoints named in `spec.md` §6, all
/// relative to a single base URL (`http://localhost:8086` in
/// production).
pub struct ControlApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ControlApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(ControlApiClient {
            http,
            base_url: base_url.into(),
        })
    }

    pub async fn ready_server(
        &self,
        server_id: i64,
        allocation_id: Uuid,
    ) -> Result<(), ErrorResponseBody> {
        let url = format!("{}/v1/gameserver/ready", self.base_url);
        let body = ReadyServerRequest {
            server_id,
            allocation_id,
        };
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|_| ErrorResponseBody::deserialize_failed("ReadyServer"))?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(decode_error_body(response, "ReadyServer").await)
    }

    pub async fn unready_server(&self, server_id: i64) -> Result<(), ErrorResponseBody> {
        let url = format!("{}/v1/gameserver/unready", self.base_url);
        let body = UnreadyServerRequest { server_id };
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|_| ErrorResponseBody::deserialize_failed("UnreadyServer"))?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(decode_error_body(response, "UnreadyServer").await)
    }

    /// Returns the raw response body string on success, per
    /// `spec.md` §4.5 ("`onSuccess` receives the raw response body
    /// string").
    pub async fn payload_allocation(&self) -> Result<String, PayloadAllocationErrorResponseBody> {
        let url = format!("{}/v1/payload/allocation", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|_| PayloadAllocationErrorResponseBody::deserialize_failed())?;
        if !response.status().is_success() {
            return Err(decode_payload_allocation_error(response).await);
        }
        response
            .text()
            .await
            .map_err(|_| PayloadAllocationErrorResponseBody::parse_failed())
    }

    pub async fn payload_token(&self) -> Result<PayloadTokenResponseBody, PayloadTokenResponseBody> {
        let url = format!("{}/v1/payload/token", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|_| PayloadTokenResponseBody::deserialize_failed())?;
        let is_success = response.status().is_success();
        let body = response.json::<PayloadTokenResponseBody>().await;
        match (is_success, body) {
            (true, Ok(body)) => Ok(body),
            (true, Err(_)) => Err(PayloadTokenResponseBody::parse_failed()),
            (false, Ok(body)) => Err(body),
            (false, Err(_)) => Err(PayloadTokenResponseBody::deserialize_failed()),
        }
    }
}

async fn decode_error_body(response: reqwest::Response, endpoint: &str) -> ErrorResponseBody {
    match response.json::<ErrorResponseBody>().await {
        Ok(body) => body,
        Err(_) => ErrorResponseBody::parse_failed(endpoint),
    }
}

async fn decode_payload_allocation_error(
    response: reqwest::Response,
) -> PayloadAllocationErrorResponseBody {
    match response.json::<PayloadAllocationErrorResponseBody>().await {
        Ok(body) => body,
        Err(_) => PayloadAllocationErrorResponseBody::parse_failed(),
    }
}
