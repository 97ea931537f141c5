//! HTTP client for the Responses API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest_middleware::ClientWithMiddleware;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use colloquy_common::{Config, DecodePolicy, ErrorResponse, Response, ResponsesRequest};

use crate::error::ClientError;
use crate::middleware::RequestLogger;
use crate::sse;
use crate::{EventStream, PayloadStream, ResponsesApi};

/// Result of `DELETE /responses/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedResponse {
    /// ID of the deleted response.
    pub id: String,
    /// Whether the response was deleted.
    pub deleted: bool,
}

/// A page of the input items of a stored response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputItemList {
    /// The input items, passed through untouched.
    pub data: Vec<serde_json::Value>,
    /// ID of the first item in the page.
    #[serde(default)]
    pub first_id: Option<String>,
    /// ID of the last item in the page.
    #[serde(default)]
    pub last_id: Option<String>,
    /// Whether more items are available.
    #[serde(default)]
    pub has_more: bool,
}

/// An uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileObject {
    /// File ID, usable in `input_file` parts.
    pub id: String,
    /// Size in bytes.
    #[serde(default)]
    pub bytes: u64,
    /// Unix timestamp of the upload.
    #[serde(default)]
    pub created_at: i64,
    /// File name.
    pub filename: String,
    /// Intended purpose, e.g. `user_data` or `assistants`.
    pub purpose: String,
}

/// Client for the Responses API.
///
/// Non-streaming calls go through a middleware client that logs each request
/// and honours the configured timeout; streaming calls use a plain client
/// without one so long generations are not cut off.
#[derive(Clone)]
pub struct ResponsesClient {
    client: ClientWithMiddleware,
    streaming_client: reqwest::Client,
    api_key: Arc<SecretString>,
    base_url: Url,
    config: Arc<Config>,
}

impl std::fmt::Debug for ResponsesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponsesClient")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url.as_str())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ResponsesClient {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the API key is missing or the
    /// base URL is invalid, or `ClientError::Network` if the HTTP client
    /// cannot be built.
    pub fn new(config: Config) -> Result<Self, ClientError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| ClientError::Configuration("API key is required".to_string()))?;

        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ClientError::Configuration(format!("Invalid base URL '{}': {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Configuration(format!(
                "Base URL '{base_url}' cannot carry a path"
            )));
        }

        let reqwest_client = match config.timeout_seconds {
            Some(timeout) => reqwest::Client::builder()
                .timeout(Duration::from_secs(timeout))
                .build()?,
            None => reqwest::Client::builder().build()?,
        };
        let streaming_client = reqwest::Client::builder().build()?;

        let client = reqwest_middleware::ClientBuilder::new(reqwest_client)
            .with(RequestLogger)
            .build();

        Ok(Self {
            client,
            streaming_client,
            api_key: Arc::new(api_key),
            base_url,
            config: Arc::new(config),
        })
    }

    /// The configuration this client was built from.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Builds `{base_url}/{segments...}`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ClientError::Configuration(format!("Base URL '{}' cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Authentication and account headers sent with every request.
    fn headers(&self) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", self.api_key.expose_secret()))
            .map_err(|_| {
                ClientError::Configuration("API key contains invalid header characters".to_string())
            })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        if let Some(organization) = &self.config.organization {
            let value = HeaderValue::from_str(organization).map_err(|e| {
                ClientError::Configuration(format!("Invalid organization header: {e}"))
            })?;
            headers.insert("OpenAI-Organization", value);
        }
        if let Some(project) = &self.config.project {
            let value = HeaderValue::from_str(project)
                .map_err(|e| ClientError::Configuration(format!("Invalid project header: {e}")))?;
            headers.insert("OpenAI-Project", value);
        }

        Ok(headers)
    }

    /// Sends a prepared request and decodes a JSON body.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest_middleware::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.headers(self.headers()?).send().await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let response_text = response.text().await?;
        debug!("Raw API response: {response_text}");
        serde_json::from_str(&response_text).map_err(|e| {
            ClientError::InvalidResponse(format!("Unexpected response body: {e}"))
        })
    }

    /// Streams a response and decodes its events using the configured policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or the API rejects it.
    pub async fn stream_events(&self, request: &ResponsesRequest) -> Result<EventStream, ClientError> {
        let payloads = self.stream(request).await?;
        Ok(sse::decode_events(payloads, self.config.decode_policy))
    }

    /// Fetches a stored response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response does not exist.
    pub async fn retrieve(&self, response_id: &str) -> Result<Response, ClientError> {
        let url = self.endpoint(&["responses", response_id])?;
        self.send_json(self.client.get(url)).await
    }

    /// Deletes a stored response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response does not exist.
    pub async fn delete(&self, response_id: &str) -> Result<DeletedResponse, ClientError> {
        let url = self.endpoint(&["responses", response_id])?;
        self.send_json(self.client.delete(url)).await
    }

    /// Cancels a background response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be cancelled.
    pub async fn cancel(&self, response_id: &str) -> Result<Response, ClientError> {
        let url = self.endpoint(&["responses", response_id, "cancel"])?;
        self.send_json(self.client.post(url)).await
    }

    /// Lists the input items of a stored response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response does not exist.
    pub async fn input_items(&self, response_id: &str) -> Result<InputItemList, ClientError> {
        let url = self.endpoint(&["responses", response_id, "input_items"])?;
        self.send_json(self.client.get(url)).await
    }

    /// Uploads a file with a multipart `POST /files`.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload fails or the API rejects it.
    pub async fn upload_file(
        &self,
        filename: &str,
        contents: Vec<u8>,
        purpose: &str,
    ) -> Result<FileObject, ClientError> {
        let url = self.endpoint(&["files"])?;
        debug!("Uploading {filename} ({} bytes) for {purpose}", contents.len());

        let form = Form::new()
            .text("purpose", purpose.to_string())
            .part("file", Part::bytes(contents).file_name(filename.to_string()));

        self.send_json(self.client.post(url).multipart(form)).await
    }
}

#[async_trait]
impl ResponsesApi for ResponsesClient {
    async fn create(&self, request: &ResponsesRequest) -> Result<Response, ClientError> {
        let url = self.endpoint(&["responses"])?;
        let body = request.clone().streaming(false);
        self.send_json(self.client.post(url).json(&body)).await
    }

    async fn stream(&self, request: &ResponsesRequest) -> Result<PayloadStream, ClientError> {
        let url = self.endpoint(&["responses"])?;
        let body = request.clone().streaming(true);

        let response = self
            .streaming_client
            .post(url)
            .headers(self.headers()?)
            .header(ACCEPT, "text/event-stream")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        debug!("Stream opened with status {}", response.status());
        Ok(sse::payloads(response.bytes_stream()))
    }

    fn decode_policy(&self) -> DecodePolicy {
        self.config.decode_policy
    }
}

/// Maps a non-2xx response onto a `ClientError`, using the API error body
/// when it parses.
async fn error_from_response(response: reqwest::Response) -> ClientError {
    let status = response.status().as_u16();
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            warn!("Failed to read error response body: {e}");
            String::new()
        }
    };
    classify_error(status, body)
}

fn classify_error(status: u16, body: String) -> ClientError {
    let parsed = serde_json::from_str::<ErrorResponse>(&body).ok();
    error!("API request failed with status {status}");

    match (status, parsed) {
        (401, Some(parsed)) => ClientError::Authentication(parsed.error.message),
        (401, None) => ClientError::Authentication(body),
        (429, parsed) => ClientError::RateLimit(parsed.map_or(body, |p| p.error.message)),
        (_, Some(parsed)) => ClientError::Api {
            status,
            error: parsed.error,
        },
        (_, None) => ClientError::Http { status, body },
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]

    use futures::StreamExt;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use wiremock::matchers::{body_partial_json, header, header_regex, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use colloquy_common::{ResponseStatus, StreamEvent};

    use super::*;

    fn create_test_config(base_url: &str) -> Config {
        Config::new().with_api_key("test-key").with_base_url(base_url)
    }

    fn create_test_request() -> ResponsesRequest {
        ResponsesRequest::builder().model("gpt-4o").input("Hello").build()
    }

    fn completed_response_json() -> serde_json::Value {
        json!({
            "id": "resp_123",
            "object": "response",
            "created_at": 1_677_652_288,
            "model": "gpt-4o",
            "output": [{
                "type": "message",
                "id": "msg_1",
                "role": "assistant",
                "content": [{
                    "type": "output_text",
                    "text": "Hello! How can I help you today?",
                    "annotations": []
                }]
            }],
            "status": "completed",
            "usage": {
                "input_tokens": 10,
                "output_tokens": 20,
                "total_tokens": 30
            }
        })
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let err = ResponsesClient::new(Config::new()).unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let client = ResponsesClient::new(create_test_config("http://localhost")).unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("test-key"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client =
            ResponsesClient::new(create_test_config("http://localhost:9000/v1/")).unwrap();
        let url = client.endpoint(&["responses", "resp/../x", "cancel"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9000/v1/responses/resp%2F..%2Fx/cancel"
        );
    }

    #[tokio::test]
    async fn test_create_sends_non_streaming_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/responses"))
            .and(header("authorization", "Bearer test-key"))
            .and(header("content-type", "application/json"))
            .and(body_partial_json(json!({"model": "gpt-4o", "input": "Hello", "stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(completed_response_json()))
            .mount(&mock_server)
            .await;

        let client = ResponsesClient::new(create_test_config(&mock_server.uri())).unwrap();
        let response = client.create(&create_test_request()).await.unwrap();

        assert_eq!(response.id, "resp_123");
        assert_eq!(response.status, ResponseStatus::Completed);
        assert_eq!(response.output_text(), "Hello! How can I help you today?");
        assert_eq!(response.usage.unwrap().total_tokens, 30);
    }

    #[tokio::test]
    async fn test_organization_and_project_headers() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/responses"))
            .and(header("openai-organization", "org_1"))
            .and(header("openai-project", "proj_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completed_response_json()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = create_test_config(&mock_server.uri())
            .with_organization("org_1")
            .with_project("proj_1");
        let client = ResponsesClient::new(config).unwrap();

        client.create(&create_test_request()).await.unwrap();
    }

    #[tokio::test]
    async fn test_structured_error_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/responses"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "type": "invalid_request_error",
                    "code": "model_not_found",
                    "message": "The model does not exist",
                    "param": "model"
                }
            })))
            .mount(&mock_server)
            .await;

        let client = ResponsesClient::new(create_test_config(&mock_server.uri())).unwrap();
        let err = client.create(&create_test_request()).await.unwrap_err();

        let ClientError::Api { status, error } = err else {
            panic!("expected API error, got {err:?}");
        };
        assert_eq!(status, 400);
        assert_eq!(error.code.as_deref(), Some("model_not_found"));
        assert_eq!(error.param.as_deref(), Some("model"));
    }

    #[tokio::test]
    async fn test_unstructured_error_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/responses"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&mock_server)
            .await;

        let client = ResponsesClient::new(create_test_config(&mock_server.uri())).unwrap();
        let err = client.create(&create_test_request()).await.unwrap_err();

        assert!(matches!(err, ClientError::Http { status: 502, ref body } if body == "Bad Gateway"));
        assert_eq!(err.status(), Some(502));
    }

    #[tokio::test]
    async fn test_authentication_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/responses"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"type": "invalid_request_error", "message": "Invalid API key"}
            })))
            .mount(&mock_server)
            .await;

        let client = ResponsesClient::new(create_test_config(&mock_server.uri())).unwrap();
        let err = client.create(&create_test_request()).await.unwrap_err();

        assert!(err.is_authentication_error());
        assert_eq!(err.to_string(), "Authentication error: Invalid API key");
    }

    #[tokio::test]
    async fn test_rate_limit_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/responses"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"type": "rate_limit_error", "message": "slow down"}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ResponsesClient::new(create_test_config(&mock_server.uri())).unwrap();
        let err = client.create(&create_test_request()).await.unwrap_err();

        assert!(err.is_rate_limit_error());
        assert_eq!(err.to_string(), "Rate limit exceeded: slow down");
    }

    #[tokio::test]
    async fn test_retrieve_delete_cancel_and_input_items() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/responses/resp_123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completed_response_json()))
            .mount(&mock_server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/responses/resp_123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "resp_123", "object": "response.deleted", "deleted": true
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/responses/resp_123/cancel"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "resp_123", "status": "cancelled", "output": []
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/responses/resp_123/input_items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [{"type": "message", "id": "msg_0", "role": "user",
                          "content": [{"type": "input_text", "text": "Hello"}]}],
                "first_id": "msg_0",
                "last_id": "msg_0",
                "has_more": false
            })))
            .mount(&mock_server)
            .await;

        let client = ResponsesClient::new(create_test_config(&mock_server.uri())).unwrap();

        let retrieved = client.retrieve("resp_123").await.unwrap();
        assert_eq!(retrieved.status, ResponseStatus::Completed);

        let deleted = client.delete("resp_123").await.unwrap();
        assert!(deleted.deleted);

        let cancelled = client.cancel("resp_123").await.unwrap();
        assert_eq!(cancelled.status, ResponseStatus::Cancelled);

        let items = client.input_items("resp_123").await.unwrap();
        assert_eq!(items.data.len(), 1);
        assert_eq!(items.first_id.as_deref(), Some("msg_0"));
        assert!(!items.has_more);
    }

    #[tokio::test]
    async fn test_upload_file_is_multipart() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/files"))
            .and(header("authorization", "Bearer test-key"))
            .and(header_regex("content-type", "^multipart/form-data; boundary="))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "file_1",
                "object": "file",
                "bytes": 5,
                "created_at": 1_700_000_000,
                "filename": "notes.txt",
                "purpose": "user_data"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ResponsesClient::new(create_test_config(&mock_server.uri())).unwrap();
        let file = client
            .upload_file("notes.txt", b"hello".to_vec(), "user_data")
            .await
            .unwrap();

        assert_eq!(file.id, "file_1");
        assert_eq!(file.bytes, 5);

        let requests = mock_server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("name=\"purpose\""));
        assert!(body.contains("filename=\"notes.txt\""));
        assert!(body.contains("hello"));
    }

    #[tokio::test]
    async fn test_stream_error_status_is_typed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/responses"))
            .and(body_partial_json(json!({"stream": true})))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": {"type": "server_error", "message": "overloaded"}
            })))
            .mount(&mock_server)
            .await;

        let client = ResponsesClient::new(create_test_config(&mock_server.uri())).unwrap();
        let Err(err) = client.stream(&create_test_request()).await else {
            panic!("expected stream to be rejected");
        };

        assert!(matches!(err, ClientError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_stream_events_over_sse() {
        let mock_server = MockServer::start().await;

        let body = [
            r#"data: {"type":"response.created","response":{"id":"resp_s1","status":"in_progress","output":[]}}"#,
            r#"data: {"type":"response.output_text.delta","output_index":0,"item_id":"msg_1","content_index":0,"delta":"Hi"}"#,
            r#"data: {"type":"response.completed","response":{"id":"resp_s1","status":"completed","output":[]}}"#,
            "data: [DONE]",
        ]
        .map(|line| format!("{line}\n\n"))
        .concat();

        Mock::given(method("POST"))
            .and(path("/responses"))
            .and(header("accept", "text/event-stream"))
            .and(body_partial_json(json!({"stream": true})))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(body),
            )
            .mount(&mock_server)
            .await;

        let client = ResponsesClient::new(create_test_config(&mock_server.uri())).unwrap();
        let events: Vec<StreamEvent> = client
            .stream_events(&create_test_request())
            .await
            .unwrap()
            .map(Result::unwrap)
            .collect()
            .await;

        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], StreamEvent::ResponseCreated { .. }));
        assert!(matches!(events[2], StreamEvent::ResponseCompleted { .. }));
    }

    // ========================================================================
    // Integration tests via raw TCP SSE server
    // ========================================================================

    #[tokio::test]
    async fn test_stream_events_across_tcp_writes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await;

            let head = "HTTP/1.1 200 OK\r\n\
                        Content-Type: text/event-stream\r\n\
                        Cache-Control: no-cache\r\n\
                        Connection: close\r\n\
                        \r\n";
            let _ = socket.write_all(head.as_bytes()).await;

            // A single event split mid-payload, then a CRLF-framed one.
            let pieces = [
                "data: {\"type\":\"response.created\",\"resp",
                "onse\":{\"id\":\"resp_t1\",\"status\":\"in_progress\"}}\n\n",
                "data: {\"type\":\"response.completed\",\"response\":{\"id\":\"resp_t1\",\"status\":\"completed\"}}\r\n\r\n",
            ];
            for piece in pieces {
                let _ = socket.write_all(piece.as_bytes()).await;
                let _ = socket.flush().await;
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        });

        let client =
            ResponsesClient::new(create_test_config(&format!("http://{addr}"))).unwrap();
        let events: Vec<StreamEvent> = client
            .stream_events(&create_test_request())
            .await
            .unwrap()
            .map(Result::unwrap)
            .collect()
            .await;

        assert_eq!(events.len(), 2);
        let StreamEvent::ResponseCompleted { response } = &events[1] else {
            panic!("expected response.completed");
        };
        assert_eq!(response.id, "resp_t1");
    }

    #[tokio::test]
    async fn test_dropping_stream_releases_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (closed_tx, closed_rx) = tokio::sync::oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await;

            let head = "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\n\r\n";
            let _ = socket.write_all(head.as_bytes()).await;

            let event = "data: {\"type\":\"response.created\",\"response\":{\"id\":\"resp_d1\",\"status\":\"in_progress\"}}\n\n";
            for _ in 0..1_000 {
                if socket.write_all(event.as_bytes()).await.is_err() {
                    let _ = closed_tx.send(());
                    return;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        });

        let client =
            ResponsesClient::new(create_test_config(&format!("http://{addr}"))).unwrap();
        let mut events = client.stream_events(&create_test_request()).await.unwrap();
        let first = events.next().await.unwrap().unwrap();
        assert!(matches!(first, StreamEvent::ResponseCreated { .. }));

        drop(events);

        tokio::time::timeout(Duration::from_secs(5), closed_rx)
            .await
            .expect("server should observe the closed connection")
            .unwrap();
    }
}
