//! A minimal JSON-RPC 2.0 transport over HTTP(S).

use crate::RpcError;
use async_trait::async_trait;
use reqwest::{
    Client,
    header::{CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    fmt::Debug,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};
use tracing::trace;
use url::Url;

/// The JSON-RPC protocol version sent with every request.
pub const JSONRPC_VERSION: &str = "2.0";

/// The header carrying the provider API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum number of body characters echoed back in a [`RpcError::Status`].
const MAX_ERROR_BODY: usize = 256;

/// A generic request/response JSON-RPC client.
///
/// Implementations perform exactly one round trip per call and never retry; retry policy is
/// left to callers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RpcTransport: Debug + Send + Sync {
    /// Sends `method` with the ordered `params` and returns the raw `result` value.
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError>;
}

/// A JSON-RPC request envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonRpcRequest<'a> {
    /// The protocol version.
    pub jsonrpc: &'static str,
    /// The request correlation id.
    pub id: u64,
    /// The method name.
    pub method: &'a str,
    /// The ordered parameters.
    pub params: &'a [Value],
}

/// The error object embedded in a failed JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JsonRpcErrorObject {
    /// The error code.
    pub code: i64,
    /// The error message.
    pub message: String,
}

/// A JSON-RPC response envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JsonRpcResponse {
    /// The echoed correlation id. Servers may answer with a number, a string or null.
    #[serde(default)]
    pub id: Value,
    /// The result, if the call succeeded.
    #[serde(default)]
    pub result: Option<Value>,
    /// The error, if the call failed.
    #[serde(default)]
    pub error: Option<JsonRpcErrorObject>,
}

impl JsonRpcResponse {
    /// Returns `true` if the envelope carries a result or an error object.
    pub const fn has_payload(&self) -> bool {
        self.result.is_some() || self.error.is_some()
    }

    /// Checks the envelope against the request `id` and extracts the result.
    pub fn into_result(self, expected_id: u64, method: &str) -> Result<Value, RpcError> {
        if !id_matches(&self.id, expected_id) {
            return Err(RpcError::IdMismatch { expected: expected_id, got: self.id.to_string() });
        }
        if let Some(JsonRpcErrorObject { code, message }) = self.error {
            return Err(RpcError::Remote { code, message });
        }
        match self.result {
            Some(Value::Null) | None => Err(RpcError::MissingResult(method.to_string())),
            Some(result) => Ok(result),
        }
    }
}

/// Returns `true` if a response id echoes the numeric request id.
fn id_matches(id: &Value, expected: u64) -> bool {
    match id {
        Value::Number(n) => n.as_u64() == Some(expected),
        Value::String(s) => s.parse::<u64>().ok() == Some(expected),
        _ => false,
    }
}

/// An [`RpcTransport`] that POSTs each request to a single HTTP(S) endpoint.
#[derive(Debug)]
pub struct HttpTransport {
    /// The endpoint all requests are posted to.
    endpoint: Url,
    /// The inner reqwest client, carrying the default headers.
    client: Client,
    /// Process-local request id counter.
    next_id: AtomicU64,
}

impl HttpTransport {
    /// Creates a transport with the given default headers.
    pub fn new(endpoint: Url, headers: HeaderMap) -> Result<Self, RpcError> {
        let client = Client::builder()
            .default_headers(headers)
            .timeout(DEFAULT_TIMEOUT)
            .build()?;
        Ok(Self::with_client(endpoint, client))
    }

    /// Creates a transport that authenticates with an API key header.
    pub fn with_api_key(endpoint: Url, api_key: &str) -> Result<Self, RpcError> {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_str(api_key)?);
        Self::new(endpoint, headers)
    }

    /// Wraps an existing reqwest [`Client`].
    pub const fn with_client(endpoint: Url, client: Client) -> Self {
        Self { endpoint, client, next_id: AtomicU64::new(1) }
    }

    /// Returns the endpoint this transport posts to.
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let id = self.next_id();
        let body = JsonRpcRequest { jsonrpc: JSONRPC_VERSION, id, method, params: &params };
        trace!(target: "bitcoin_rpc", id, method, "Sending request");

        let res = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        let bytes = res.bytes().await?;
        // A non-success status only defers to the body if the body is a real answer.
        let envelope = match serde_json::from_slice::<JsonRpcResponse>(&bytes) {
            Ok(envelope) if envelope.has_payload() => envelope,
            _ if !status.is_success() => {
                let body = String::from_utf8_lossy(&bytes).chars().take(MAX_ERROR_BODY).collect();
                return Err(RpcError::Status { status: status.as_u16(), body });
            }
            Ok(envelope) if !envelope.id.is_null() => envelope,
            Ok(_) => {
                return Err(RpcError::Malformed("envelope has no id, result or error".to_string()));
            }
            Err(e) => return Err(RpcError::Malformed(e.to_string())),
        };

        envelope.into_result(id, method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, Request, ResponseTemplate,
        matchers::{body_partial_json, header, method},
    };

    fn transport(server: &MockServer) -> HttpTransport {
        HttpTransport::with_api_key(server.uri().parse().unwrap(), "test-key").unwrap()
    }

    /// Responds with a successful envelope echoing the request id.
    fn echo_result(result: Value) -> impl Fn(&Request) -> ResponseTemplate + Send + Sync + 'static {
        move |req: &Request| {
            let body: Value = serde_json::from_slice(&req.body).unwrap();
            ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": body["id"],
                "result": result,
            }))
        }
    }

    #[tokio::test]
    async fn test_request_returns_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("x-api-key", "test-key"))
            .and(body_partial_json(json!({ "jsonrpc": "2.0", "method": "getblockcount" })))
            .respond_with(echo_result(json!(840_000)))
            .mount(&server)
            .await;

        let transport = transport(&server);
        let result = transport.request("getblockcount", vec![]).await.unwrap();
        assert_eq!(result, json!(840_000));
    }

    #[tokio::test]
    async fn test_request_ids_are_unique() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(echo_result(json!(1))).mount(&server).await;

        let transport = transport(&server);
        transport.request("getblockcount", vec![]).await.unwrap();
        transport.request("getblockcount", vec![]).await.unwrap();

        let received = server.received_requests().await.unwrap();
        let ids: Vec<Value> = received
            .iter()
            .map(|r| serde_json::from_slice::<Value>(&r.body).unwrap()["id"].clone())
            .collect();
        assert_eq!(ids, vec![json!(1), json!(2)]);
    }

    #[tokio::test]
    async fn test_id_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 999,
                "result": 1,
            })))
            .mount(&server)
            .await;

        let transport = transport(&server);
        let err = transport.request("getblockcount", vec![]).await.unwrap_err();
        assert!(matches!(err, RpcError::IdMismatch { expected: 1, .. }));
    }

    #[tokio::test]
    async fn test_remote_error_object() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(|req: &Request| {
                let body: Value = serde_json::from_slice(&req.body).unwrap();
                ResponseTemplate::new(500).set_body_json(json!({
                    "jsonrpc": "2.0",
                    "id": body["id"],
                    "error": { "code": -8, "message": "Block height out of range" },
                }))
            })
            .mount(&server)
            .await;

        let transport = transport(&server);
        let err = transport.request("getblockhash", vec![json!(9_999_999)]).await.unwrap_err();
        match err {
            RpcError::Remote { code, message } => {
                assert_eq!(code, -8);
                assert_eq!(message, "Block height out of range");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_http_failure_without_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let transport = transport(&server);
        let err = transport.request("getblockcount", vec![]).await.unwrap_err();
        assert!(matches!(err, RpcError::Status { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let transport = transport(&server);
        let err = transport.request("getblockcount", vec![]).await.unwrap_err();
        assert!(matches!(err, RpcError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_http_failure_with_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429).set_body_json(json!({ "message": "Too Many Requests" })),
            )
            .mount(&server)
            .await;

        let transport = transport(&server);
        let err = transport.request("getblockcount", vec![]).await.unwrap_err();
        match err {
            RpcError::Status { status, body } => {
                assert_eq!(status, 429);
                assert!(body.contains("Too Many Requests"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_object_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let transport = transport(&server);
        let err = transport.request("getblockcount", vec![]).await.unwrap_err();
        assert!(matches!(err, RpcError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_echoed_id_without_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(|req: &Request| {
                let body: Value = serde_json::from_slice(&req.body).unwrap();
                ResponseTemplate::new(200).set_body_json(json!({ "id": body["id"] }))
            })
            .mount(&server)
            .await;

        let transport = transport(&server);
        let err = transport.request("getblockcount", vec![]).await.unwrap_err();
        assert!(matches!(err, RpcError::MissingResult(_)));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let addr = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        let endpoint = format!("http://{addr}").parse().unwrap();
        let transport = HttpTransport::with_api_key(endpoint, "test-key").unwrap();

        let err = transport.request("getblockcount", vec![]).await.unwrap_err();
        assert!(matches!(err, RpcError::Transport(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_invalid_api_key_header() {
        let endpoint = "http://localhost:8332".parse().unwrap();
        let err = HttpTransport::with_api_key(endpoint, "bad\nkey").unwrap_err();
        assert!(matches!(err, RpcError::InvalidHeader(_)));
    }

    #[test]
    fn test_string_id_is_accepted() {
        let res = JsonRpcResponse { id: json!("7"), result: Some(json!("ok")), error: None };
        assert_eq!(res.into_result(7, "m").unwrap(), json!("ok"));
    }

    #[test]
    fn test_null_result_is_missing() {
        let res = JsonRpcResponse { id: json!(3), result: Some(Value::Null), error: None };
        assert!(matches!(res.into_result(3, "m"), Err(RpcError::MissingResult(_))));
    }
}
