//! PeaServer message types: operations, request envelope, response envelope.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::integrity;

/// Current protocol version. Carried in every request frame.
pub const PROTOCOL_VERSION: u8 = 1;

/// Intent of a request. The numeric tags are internal labels (1101..);
/// they appear on the wire only in the HTTP operation header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Store,
    Delete,
    Transfer,
}

impl Operation {
    pub const fn tag(self) -> u16 {
        match self {
            Operation::Store => 1101,
            Operation::Delete => 1102,
            Operation::Transfer => 1103,
        }
    }

    pub const fn from_tag(tag: u16) -> Option<Self> {
        match tag {
            1101 => Some(Operation::Store),
            1102 => Some(Operation::Delete),
            1103 => Some(Operation::Transfer),
            _ => None,
        }
    }
}

/// One outbound request: intent, optional header fields, opaque payload.
/// The request ID correlates a request with its response and log events.
#[derive(Debug, Clone)]
pub struct Request {
    pub request_id: Uuid,
    pub operation: Operation,
    pub header_field: Option<HashMap<String, Value>>,
    pub payload: Vec<u8>,
}

impl Request {
    pub fn new(
        operation: Operation,
        header_field: Option<HashMap<String, Value>>,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            operation,
            header_field,
            payload,
        }
    }
}

/// JSON section of a request frame. The payload travels raw after it;
/// `payload_len` and `payload_sha256` let the receiver validate the split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestMeta {
    pub version: u8,
    pub request_id: Uuid,
    pub operation: Operation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_field: Option<HashMap<String, Value>>,
    pub payload_len: u64,
    pub payload_sha256: String,
}

impl RequestMeta {
    pub fn from_request(request: &Request) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            request_id: request.request_id,
            operation: request.operation,
            header_field: request.header_field.clone(),
            payload_len: request.payload.len() as u64,
            payload_sha256: integrity::digest_hex(&request.payload),
        }
    }

    /// Check a received payload against the digest carried in the meta section.
    pub fn verify_payload(&self, payload: &[u8]) -> bool {
        integrity::verify_payload(payload, &self.payload_sha256)
    }
}

/// Outcome of a request as sent by the server: exactly one of a result
/// mapping or an error. Externally tagged JSON: `{"ok": {..}}` / `{"err": {..}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseEnvelope {
    Ok(HashMap<String, Value>),
    Err(ServerError),
}

/// Server-signaled failure: a machine-readable kind plus a human message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerError {
    pub kind: String,
    pub message: String,
}
