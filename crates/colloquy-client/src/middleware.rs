//! Request logging for the non-streaming client.

use std::time::Instant;

use async_trait::async_trait;
use http::Extensions;
use log::{debug, warn};
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};

/// Logs method, path, status and latency of every request.
///
/// Only the URL path is logged; headers carry the API key.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestLogger;

#[async_trait]
impl Middleware for RequestLogger {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let method = req.method().clone();
        let path = req.url().path().to_string();
        let started = Instant::now();

        let result = next.run(req, extensions).await;
        let elapsed = started.elapsed();
        match &result {
            Ok(response) => debug!("{method} {path} -> {} in {elapsed:?}", response.status()),
            Err(e) => warn!("{method} {path} failed after {elapsed:?}: {e}"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client() -> reqwest_middleware::ClientWithMiddleware {
        reqwest_middleware::ClientBuilder::new(reqwest::Client::new())
            .with(RequestLogger)
            .build()
    }

    #[tokio::test]
    async fn test_logger_passes_response_through() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/responses/resp_1"))
            .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let response = client()
            .get(format!("{}/responses/resp_1", mock_server.uri()))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 404);
        assert_eq!(response.text().await.unwrap(), "gone");
    }

    #[tokio::test]
    async fn test_logger_passes_transport_error_through() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = client().get(format!("http://{addr}/responses")).send().await;

        assert!(matches!(result, Err(reqwest_middleware::Error::Reqwest(_))));
    }
}
