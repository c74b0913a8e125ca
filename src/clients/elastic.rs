use std::time::{Duration, Instant};

use chrono::Utc;
use reqwest::{Client, Method};
use serde_json::Value;

use crate::trace::{TransportResponse, TransportTracer};

/// Build a reqwest client with sane defaults (connect and request timeouts).
fn make_http_client() -> Client {
    Client::builder()
        .connect_timeout(Duration::from_secs(2))
        .timeout(Duration::from_secs(6))
        .build()
        .expect("reqwest client")
}

/// HTTP transport for the search backend.
///
/// Every round trip is timed and reported to the tracer, on success and on
/// transport failure alike; tracer outcomes never affect the request.
pub struct ElasticTransport<T: TransportTracer> {
    base: String,
    http: Client,
    tracer: T,
}

impl<T: TransportTracer> ElasticTransport<T> {
    pub fn new(base: impl Into<String>, tracer: T) -> Self {
        Self {
            base: base.into(),
            http: make_http_client(),
            tracer,
        }
    }

    /// Same as [`new`](Self::new) with a caller-supplied client.
    pub fn with_client(base: impl Into<String>, http: Client, tracer: T) -> Self {
        Self {
            base: base.into(),
            http,
            tracer,
        }
    }

    pub async fn get(&self, path: &str) -> Result<TransportResponse, reqwest::Error> {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<TransportResponse, reqwest::Error> {
        self.send(Method::POST, path, Some(body)).await
    }

    /// Perform one round trip against the backend.
    ///
    /// The response body is buffered only when the tracer opted in via
    /// `response_body_enabled`; the captured response is returned to the
    /// caller either way.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<TransportResponse, reqwest::Error> {
        let url = format!(
            "{}/{}",
            self.base.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut builder = self.http.request(method, &url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let request = builder.build()?;
        let logged = self.loggable_copy(&request);

        let started_at = Utc::now();
        let timer = Instant::now();
        let outcome = self.http.execute(request).await;
        let duration = timer.elapsed();

        match outcome {
            Ok(response) => {
                let captured = capture(response, self.tracer.response_body_enabled()).await?;
                if let Some(logged) = &logged {
                    let _ = self
                        .tracer
                        .log_round_trip(logged, Some(&captured), None, started_at, duration);
                }
                Ok(captured)
            }
            Err(err) => {
                if let Some(logged) = &logged {
                    let _ = self
                        .tracer
                        .log_round_trip(logged, None, Some(&err), started_at, duration);
                }
                Err(err)
            }
        }
    }

    /// The request handed to the tracer. Body included only when the tracer
    /// opted in; streaming bodies cannot be copied and yield `None`.
    fn loggable_copy(&self, request: &reqwest::Request) -> Option<reqwest::Request> {
        if self.tracer.request_body_enabled() {
            return request.try_clone();
        }
        let mut copy = reqwest::Request::new(request.method().clone(), request.url().clone());
        *copy.headers_mut() = request.headers().clone();
        Some(copy)
    }
}

async fn capture(
    response: reqwest::Response,
    with_body: bool,
) -> Result<TransportResponse, reqwest::Error> {
    let status = response.status();
    let headers = response.headers().clone();
    let body = if with_body {
        Some(response.bytes().await?.to_vec())
    } else {
        None
    };
    Ok(TransportResponse {
        status,
        headers,
        body,
    })
}
