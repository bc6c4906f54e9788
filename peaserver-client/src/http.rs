//! HTTP transport: POST the payload; the response body is a response envelope.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use peaserver_core::{integrity, Request, ResponseEnvelope};
use serde_json::Value;

use crate::error::ClientError;
use crate::transport::Transport;

/// Header carrying the numeric operation tag.
pub const OPERATION_HEADER: &str = "x-pea-operation";
/// Header carrying the request ID.
pub const REQUEST_ID_HEADER: &str = "x-pea-request-id";
/// Header carrying the hex SHA-256 of the payload.
pub const DIGEST_HEADER: &str = "x-pea-payload-sha256";

/// One POST per request; connection reuse is reqwest's concern.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn exchange(
        &self,
        address: &str,
        request: &Request,
        timeout: Duration,
    ) -> Result<HashMap<String, Value>, ClientError> {
        let mut builder = self
            .client
            .post(address)
            .timeout(timeout)
            .header(OPERATION_HEADER, request.operation.tag().to_string())
            .header(REQUEST_ID_HEADER, request.request_id.to_string())
            .header(DIGEST_HEADER, integrity::digest_hex(&request.payload));
        if let Some(fields) = &request.header_field {
            for (name, value) in fields {
                builder = builder.header(name.as_str(), header_text(value));
            }
        }
        let response = builder
            .body(request.payload.clone())
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, timeout))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| map_reqwest_error(e, timeout))?;
        match serde_json::from_slice::<ResponseEnvelope>(&body) {
            Ok(ResponseEnvelope::Ok(map)) => Ok(map),
            Ok(ResponseEnvelope::Err(e)) => Err(ClientError::Server {
                kind: e.kind,
                message: e.message,
            }),
            Err(_) if !status.is_success() => Err(ClientError::Server {
                kind: "http".to_string(),
                message: format!("server replied {status}"),
            }),
            Err(e) => Err(ClientError::Protocol(format!(
                "unparseable response body: {e}"
            ))),
        }
    }
}

/// Header fields are arbitrary JSON values; strings go on the wire verbatim,
/// everything else compact-encoded.
fn header_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn map_reqwest_error(e: reqwest::Error, timeout: Duration) -> ClientError {
    if e.is_timeout() {
        ClientError::Timeout(timeout)
    } else if e.is_builder() {
        ClientError::Configuration(e.to_string())
    } else {
        ClientError::Transport(std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}
