//! Async client for a PeaServer endpoint.
//!
//! One handle per remote address; binary payloads out, key/value mappings
//! back, exactly one completion per request. The wire contract lives in
//! `peaserver-core`; transports are pluggable behind [`Transport`].

pub mod client;
pub mod error;
pub mod http;
mod landmarks;
pub mod transport;

pub use client::PeaServer;
pub use error::{ClientError, ErrorKind};
pub use http::HttpTransport;
pub use peaserver_core::Operation;
pub use transport::{TcpTransport, Transport};
