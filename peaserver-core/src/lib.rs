//! PeaServer wire contract: request/response envelopes and framing.
//! Transport-agnostic; I/O lives in peaserver-client.

pub mod integrity;
pub mod protocol;
pub mod wire;

pub use protocol::{
    Operation, Request, RequestMeta, ResponseEnvelope, ServerError, PROTOCOL_VERSION,
};
pub use wire::{
    decode_request, decode_response, encode_request, encode_response, FrameDecodeError,
    FrameEncodeError,
};
