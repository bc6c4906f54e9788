//! Transport seam: one exchange = one request out, one response mapping back.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use peaserver_core::{wire, Request, ResponseEnvelope};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::ClientError;

/// Delivers one request to an address and obtains its response mapping.
/// Implementations must be safe for concurrent use; the client issues
/// overlapping exchanges on a shared instance.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn exchange(
        &self,
        address: &str,
        request: &Request,
        timeout: Duration,
    ) -> Result<HashMap<String, Value>, ClientError>;
}

/// Framed exchange over a fresh TCP connection per request.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpTransport;

#[async_trait]
impl Transport for TcpTransport {
    async fn exchange(
        &self,
        address: &str,
        request: &Request,
        timeout: Duration,
    ) -> Result<HashMap<String, Value>, ClientError> {
        match tokio::time::timeout(timeout, exchange_once(address, request)).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout(timeout)),
        }
    }
}

async fn exchange_once(
    address: &str,
    request: &Request,
) -> Result<HashMap<String, Value>, ClientError> {
    let frame =
        wire::encode_request(request).map_err(|e| ClientError::Protocol(e.to_string()))?;
    let mut stream = TcpStream::connect(address).await?;
    stream.write_all(&frame).await?;
    stream.flush().await?;
    match read_response(&mut stream).await? {
        ResponseEnvelope::Ok(map) => Ok(map),
        ResponseEnvelope::Err(e) => Err(ClientError::Server {
            kind: e.kind,
            message: e.message,
        }),
    }
}

/// Read until one full response frame decodes. EOF before a full frame is a
/// transport fault, not a protocol one.
async fn read_response(stream: &mut TcpStream) -> Result<ResponseEnvelope, ClientError> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        match wire::decode_response(&buf) {
            Ok((envelope, _)) => return Ok(envelope),
            Err(wire::FrameDecodeError::NeedMore) => {}
            Err(e) => return Err(ClientError::Protocol(e.to_string())),
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(ClientError::Transport(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed before a full response frame",
            )));
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}
