//! Framing: length-prefix (4 bytes LE) + JSON body.
//!
//! A request frame carries a second length prefix splitting the body into a
//! JSON meta section and the raw payload, so binary payloads never pass
//! through the JSON codec. A response frame is a single JSON envelope.

use crate::protocol::{Request, RequestMeta, ResponseEnvelope, PROTOCOL_VERSION};

const LEN_SIZE: usize = 4;
const MAX_FRAME_LEN: u32 = 16 * 1024 * 1024; // 16 MiB

/// Encode a request into a single frame:
/// 4 bytes LE frame length + 4 bytes LE meta length + meta JSON + payload.
pub fn encode_request(request: &Request) -> Result<Vec<u8>, FrameEncodeError> {
    let meta = RequestMeta::from_request(request);
    let meta_bytes = serde_json::to_vec(&meta).map_err(FrameEncodeError::Encode)?;
    let body_len = LEN_SIZE + meta_bytes.len() + request.payload.len();
    if body_len > MAX_FRAME_LEN as usize {
        return Err(FrameEncodeError::TooLarge);
    }
    let mut out = Vec::with_capacity(LEN_SIZE + body_len);
    out.extend_from_slice(&(body_len as u32).to_le_bytes());
    out.extend_from_slice(&(meta_bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(&meta_bytes);
    out.extend_from_slice(&request.payload);
    Ok(out)
}

/// Encode a response envelope: 4 bytes LE length + envelope JSON.
pub fn encode_response(envelope: &ResponseEnvelope) -> Result<Vec<u8>, FrameEncodeError> {
    let body = serde_json::to_vec(envelope).map_err(FrameEncodeError::Encode)?;
    if body.len() > MAX_FRAME_LEN as usize {
        return Err(FrameEncodeError::TooLarge);
    }
    let mut out = Vec::with_capacity(LEN_SIZE + body.len());
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(&body);
    Ok(out)
}

/// Error encoding a frame (JSON or size limit).
#[derive(Debug, thiserror::Error)]
pub enum FrameEncodeError {
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("frame too large")]
    TooLarge,
}

/// Decode one request frame from the front of `bytes`. Returns the meta
/// section, the payload, and the number of bytes consumed.
/// Call with a partial buffer; `NeedMore` means read more and try again.
pub fn decode_request(bytes: &[u8]) -> Result<(RequestMeta, Vec<u8>, usize), FrameDecodeError> {
    let (body, consumed) = frame_body(bytes)?;
    if body.len() < LEN_SIZE {
        return Err(FrameDecodeError::Malformed("missing meta length"));
    }
    let meta_len = u32::from_le_bytes([body[0], body[1], body[2], body[3]]) as usize;
    if LEN_SIZE + meta_len > body.len() {
        return Err(FrameDecodeError::Malformed("meta section out of range"));
    }
    let meta: RequestMeta = serde_json::from_slice(&body[LEN_SIZE..LEN_SIZE + meta_len])
        .map_err(FrameDecodeError::Decode)?;
    if meta.version != PROTOCOL_VERSION {
        return Err(FrameDecodeError::Version(meta.version));
    }
    let payload = body[LEN_SIZE + meta_len..].to_vec();
    if meta.payload_len != payload.len() as u64 {
        return Err(FrameDecodeError::PayloadLength);
    }
    Ok((meta, payload, consumed))
}

/// Decode one response frame from the front of `bytes`. Returns the envelope
/// and the number of bytes consumed. Same partial-buffer contract as
/// [`decode_request`].
pub fn decode_response(bytes: &[u8]) -> Result<(ResponseEnvelope, usize), FrameDecodeError> {
    let (body, consumed) = frame_body(bytes)?;
    let envelope: ResponseEnvelope =
        serde_json::from_slice(body).map_err(FrameDecodeError::Decode)?;
    Ok((envelope, consumed))
}

/// Split the length-prefixed body off the front of `bytes`.
fn frame_body(bytes: &[u8]) -> Result<(&[u8], usize), FrameDecodeError> {
    if bytes.len() < LEN_SIZE {
        return Err(FrameDecodeError::NeedMore);
    }
    let len = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    if len > MAX_FRAME_LEN as usize {
        return Err(FrameDecodeError::TooLarge);
    }
    if bytes.len() < LEN_SIZE + len {
        return Err(FrameDecodeError::NeedMore);
    }
    Ok((&bytes[LEN_SIZE..LEN_SIZE + len], LEN_SIZE + len))
}

/// Error decoding a frame (need more bytes, size limit, or malformed body).
#[derive(Debug, thiserror::Error)]
pub enum FrameDecodeError {
    #[error("need more bytes")]
    NeedMore,
    #[error("frame too large")]
    TooLarge,
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("unsupported protocol version {0}")]
    Version(u8),
    #[error("payload length does not match meta")]
    PayloadLength,
    #[error("malformed frame: {0}")]
    Malformed(&'static str),
}
