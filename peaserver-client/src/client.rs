//! PeaServer client handle: bound address, pluggable transport, landmarks
//! snapshot.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use peaserver_core::{Operation, Request};
use serde_json::Value;
use tracing::debug;

use crate::error::ClientError;
use crate::http::HttpTransport;
use crate::landmarks;
use crate::transport::{TcpTransport, Transport};

/// Handle to one remote PeaServer endpoint.
///
/// Built only through [`PeaServer::with_address`] or
/// [`PeaServer::with_transport`]; every live instance carries its (possibly
/// absent) address for its whole lifetime. Safe to share: concurrent requests
/// are independent and each completes exactly once.
pub struct PeaServer {
    address: Option<String>,
    transport: Arc<dyn Transport>,
    landmarks: HashMap<String, Value>,
}

impl PeaServer {
    /// Create a client bound to `address`. `None` or an empty string leaves
    /// the client unbound: construction succeeds, sends fail fast with a
    /// configuration error. `http://`/`https://` addresses select the HTTP
    /// transport; anything else the framed TCP transport.
    pub fn with_address(address: Option<impl Into<String>>) -> Self {
        let address = address.map(Into::into);
        let transport: Arc<dyn Transport> = match address.as_deref() {
            Some(a) if is_http(a) => Arc::new(HttpTransport::new()),
            _ => Arc::new(TcpTransport),
        };
        Self::assemble(address, transport)
    }

    /// Create a client with a caller-supplied transport.
    pub fn with_transport(
        address: Option<impl Into<String>>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self::assemble(address.map(Into::into), transport)
    }

    fn assemble(address: Option<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            address,
            transport,
            landmarks: landmarks::bundled_map(),
        }
    }

    /// The address this client was bound to, verbatim.
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Landmarks snapshot. Synchronous and infallible; the data is bundled
    /// at construction.
    pub fn landmarks_map(&self) -> &HashMap<String, Value> {
        &self.landmarks
    }

    /// Send `payload` with the given operation and wait for the server's
    /// response mapping. One exchange, no retries; the timeout bounds the
    /// whole exchange.
    pub async fn request(
        &self,
        payload: Vec<u8>,
        header_field: Option<HashMap<String, Value>>,
        operation: Operation,
        timeout: Duration,
    ) -> Result<HashMap<String, Value>, ClientError> {
        dispatch(
            self.transport.clone(),
            self.address.clone(),
            payload,
            header_field,
            operation,
            timeout,
        )
        .await
    }

    /// Callback form of [`PeaServer::request`]: the handler runs on a spawned
    /// task and is invoked exactly once, never before this call returns.
    /// Must be called within a tokio runtime.
    pub fn send_data<F>(
        &self,
        payload: Vec<u8>,
        header_field: Option<HashMap<String, Value>>,
        operation: Operation,
        timeout: Duration,
        response_handler: F,
    ) where
        F: FnOnce(Result<HashMap<String, Value>, ClientError>) + Send + 'static,
    {
        let transport = self.transport.clone();
        let address = self.address.clone();
        tokio::spawn(async move {
            let result =
                dispatch(transport, address, payload, header_field, operation, timeout).await;
            response_handler(result);
        });
    }
}

fn is_http(address: &str) -> bool {
    let lower = address.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Validate, build the request, run one exchange. All failures funnel into
/// the returned result; configuration faults never reach the transport.
async fn dispatch(
    transport: Arc<dyn Transport>,
    address: Option<String>,
    payload: Vec<u8>,
    header_field: Option<HashMap<String, Value>>,
    operation: Operation,
    timeout: Duration,
) -> Result<HashMap<String, Value>, ClientError> {
    if timeout.is_zero() {
        return Err(ClientError::Configuration(
            "timeout must be greater than zero".to_string(),
        ));
    }
    let address = match address.filter(|a| !a.is_empty()) {
        Some(a) => a,
        None => {
            return Err(ClientError::Configuration(
                "client has no server address bound".to_string(),
            ))
        }
    };
    let request = Request::new(operation, header_field, payload);
    debug!(
        request_id = %request.request_id,
        operation = ?operation,
        payload_len = request.payload.len(),
        "sending request"
    );
    let result = transport.exchange(&address, &request, timeout).await;
    if let Err(e) = &result {
        debug!(request_id = %request.request_id, error = %e, "request failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::{mpsc, oneshot, Mutex};

    use super::*;
    use crate::error::ErrorKind;

    /// Replies immediately with a fixed mapping; counts exchanges.
    struct CountingTransport {
        calls: AtomicUsize,
    }

    impl CountingTransport {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Transport for CountingTransport {
        async fn exchange(
            &self,
            _address: &str,
            request: &Request,
            _timeout: Duration,
        ) -> Result<HashMap<String, Value>, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut map = HashMap::new();
            map.insert("echo_len".to_string(), Value::from(request.payload.len()));
            map.insert(
                "operation".to_string(),
                serde_json::to_value(request.operation).unwrap(),
            );
            Ok(map)
        }
    }

    /// Holds every exchange until the test releases the gate.
    struct GatedTransport {
        gates: Mutex<Vec<oneshot::Receiver<()>>>,
    }

    #[async_trait]
    impl Transport for GatedTransport {
        async fn exchange(
            &self,
            _address: &str,
            _request: &Request,
            _timeout: Duration,
        ) -> Result<HashMap<String, Value>, ClientError> {
            let gate = self.gates.lock().await.pop().expect("no gate left");
            gate.await.expect("gate dropped");
            Ok(HashMap::new())
        }
    }

    /// Always reports a server-signaled failure.
    struct FailingTransport;

    #[async_trait]
    impl Transport for FailingTransport {
        async fn exchange(
            &self,
            _address: &str,
            _request: &Request,
            _timeout: Duration,
        ) -> Result<HashMap<String, Value>, ClientError> {
            Err(ClientError::Server {
                kind: "denied".to_string(),
                message: "operation rejected".to_string(),
            })
        }
    }

    #[test]
    fn address_identity_preserved() {
        let client = PeaServer::with_address(Some("10.0.0.5:9000"));
        assert_eq!(client.address(), Some("10.0.0.5:9000"));

        let empty = PeaServer::with_address(Some(""));
        assert_eq!(empty.address(), Some(""));

        let unbound = PeaServer::with_address(None::<String>);
        assert_eq!(unbound.address(), None);
    }

    #[test]
    fn landmarks_available_on_fresh_client() {
        let client = PeaServer::with_address(None::<String>);
        assert!(!client.landmarks_map().is_empty());
        // Stable across calls: same snapshot, no refresh.
        assert_eq!(client.landmarks_map().len(), client.landmarks_map().len());
    }

    #[tokio::test]
    async fn zero_timeout_fails_without_transport_io() {
        let transport = CountingTransport::new();
        let client = PeaServer::with_transport(Some("10.0.0.5:9000"), transport.clone());
        let err = client
            .request(b"abc".to_vec(), None, Operation::Store, Duration::ZERO)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unbound_address_fails_without_transport_io() {
        let transport = CountingTransport::new();
        for client in [
            PeaServer::with_transport(None::<String>, transport.clone()),
            PeaServer::with_transport(Some(""), transport.clone()),
        ] {
            let err = client
                .request(
                    b"abc".to_vec(),
                    None,
                    Operation::Delete,
                    Duration::from_secs(1),
                )
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Configuration);
        }
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn handler_fires_exactly_once() {
        let transport = CountingTransport::new();
        let client = PeaServer::with_transport(Some("10.0.0.5:9000"), transport.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();
        client.send_data(
            b"abc".to_vec(),
            None,
            Operation::Store,
            Duration::from_secs(1),
            move |result| {
                tx.send(result).unwrap();
            },
        );
        let result = rx.recv().await.expect("handler should fire");
        let map = result.unwrap();
        assert_eq!(map.get("echo_len"), Some(&Value::from(3)));
        // The sender moved into the FnOnce handler; the channel closing
        // without another message is the once-and-only-once signal.
        assert!(rx.recv().await.is_none());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn completion_is_not_synchronous() {
        let (gate_tx, gate_rx) = oneshot::channel();
        let transport = Arc::new(GatedTransport {
            gates: Mutex::new(vec![gate_rx]),
        });
        let client = PeaServer::with_transport(Some("10.0.0.5:9000"), transport);
        let (tx, mut rx) = mpsc::unbounded_channel();
        client.send_data(
            b"abc".to_vec(),
            None,
            Operation::Store,
            Duration::from_secs(5),
            move |result| {
                tx.send(result).unwrap();
            },
        );
        // send_data returned; the exchange is still held at the gate.
        assert!(rx.try_recv().is_err());
        gate_tx.send(()).unwrap();
        assert!(rx.recv().await.expect("handler should fire").is_ok());
    }

    #[tokio::test]
    async fn concurrent_sends_complete_independently() {
        let (gate_tx_a, gate_rx_a) = oneshot::channel();
        let (gate_tx_b, gate_rx_b) = oneshot::channel();
        let transport = Arc::new(GatedTransport {
            gates: Mutex::new(vec![gate_rx_a, gate_rx_b]),
        });
        let client = PeaServer::with_transport(Some("10.0.0.5:9000"), transport);
        let (tx, mut rx) = mpsc::unbounded_channel();
        for operation in [Operation::Store, Operation::Delete] {
            let tx = tx.clone();
            client.send_data(
                b"abc".to_vec(),
                None,
                operation,
                Duration::from_secs(5),
                move |result| {
                    tx.send((operation, result)).unwrap();
                },
            );
        }
        drop(tx);
        // Both in flight; release in reverse order.
        gate_tx_a.send(()).unwrap();
        gate_tx_b.send(()).unwrap();
        let mut seen = Vec::new();
        while let Some((operation, result)) = rx.recv().await {
            assert!(result.is_ok());
            seen.push(operation);
        }
        seen.sort_by_key(|op| op.tag());
        assert_eq!(seen, vec![Operation::Store, Operation::Delete]);
    }

    #[tokio::test]
    async fn server_failure_reaches_handler_once() {
        let client = PeaServer::with_transport(Some("10.0.0.5:9000"), Arc::new(FailingTransport));
        let (tx, mut rx) = mpsc::unbounded_channel();
        client.send_data(
            b"abc".to_vec(),
            None,
            Operation::Transfer,
            Duration::from_secs(1),
            move |result| {
                tx.send(result).unwrap();
            },
        );
        let err = rx.recv().await.expect("handler should fire").unwrap_err();
        match err {
            ClientError::Server { kind, .. } => assert_eq!(kind, "denied"),
            other => panic!("expected Server error, got {other:?}"),
        }
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn transport_selection_by_scheme() {
        // Indirect check: http addresses build, tcp addresses build; both
        // preserve the address verbatim.
        let http = PeaServer::with_address(Some("http://10.0.0.5:9000/api"));
        assert_eq!(http.address(), Some("http://10.0.0.5:9000/api"));
        let tcp = PeaServer::with_address(Some("10.0.0.5:9000"));
        assert_eq!(tcp.address(), Some("10.0.0.5:9000"));
    }
}
