use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde_json::{json, Map, Value};

use crate::error::LogError;
use crate::logger::Logger;

/// Generic printer capability: values are rendered into the message text
/// rather than attached as structured fields.
pub trait Printer {
    fn print(&self, values: &[Value]);
    /// Substitute `values` into `{}` placeholders in `format`. Values past
    /// the last placeholder are appended to the message; with no values the
    /// format string is the message verbatim.
    fn printf(&self, format: &str, values: &[Value]);
}

/// HTTP round-trip tracing capability, consumed by the search-backend
/// transport: one record per outbound request/response pair, transport
/// errors logged as data rather than propagated.
pub trait TransportTracer {
    fn log_round_trip(
        &self,
        request: &reqwest::Request,
        response: Option<&TransportResponse>,
        error: Option<&reqwest::Error>,
        started_at: DateTime<Utc>,
        duration: Duration,
    ) -> Result<(), LogError>;

    /// Whether the transport should hand request bodies to the tracer.
    fn request_body_enabled(&self) -> bool;

    /// Whether the transport should buffer response bodies for the tracer.
    fn response_body_enabled(&self) -> bool;
}

/// What the transport captured of one response.
///
/// `body` is `None` when the tracer did not opt in via
/// [`TransportTracer::response_body_enabled`].
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl TransportResponse {
    pub fn body_text(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(self.body.as_deref().unwrap_or_default())
    }
}

impl Printer for Logger {
    fn print(&self, values: &[Value]) {
        self.info(&render_values(values), &[], &[]);
    }

    fn printf(&self, format: &str, values: &[Value]) {
        self.info(&render_format(format, values), &[], &[]);
    }
}

impl TransportTracer for Logger {
    fn log_round_trip(
        &self,
        request: &reqwest::Request,
        response: Option<&TransportResponse>,
        error: Option<&reqwest::Error>,
        started_at: DateTime<Utc>,
        duration: Duration,
    ) -> Result<(), LogError> {
        self.info(
            "elastic",
            &["request", "response", "error", "time", "duration"],
            &[
                request_fields(request),
                response.map(response_fields).unwrap_or(Value::Null),
                error
                    .map(|e| Value::String(e.to_string()))
                    .unwrap_or(Value::Null),
                Value::String(started_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
                json!(duration.as_millis() as u64),
            ],
        );
        Ok(())
    }

    fn request_body_enabled(&self) -> bool {
        true
    }

    fn response_body_enabled(&self) -> bool {
        true
    }
}

// Both capabilities pass through references, so the `&'static Logger`
// handed out by `crate::global` injects directly into a transport.
impl<T: Printer + ?Sized> Printer for &T {
    fn print(&self, values: &[Value]) {
        (**self).print(values);
    }

    fn printf(&self, format: &str, values: &[Value]) {
        (**self).printf(format, values);
    }
}

impl<T: TransportTracer + ?Sized> TransportTracer for &T {
    fn log_round_trip(
        &self,
        request: &reqwest::Request,
        response: Option<&TransportResponse>,
        error: Option<&reqwest::Error>,
        started_at: DateTime<Utc>,
        duration: Duration,
    ) -> Result<(), LogError> {
        (**self).log_round_trip(request, response, error, started_at, duration)
    }

    fn request_body_enabled(&self) -> bool {
        (**self).request_body_enabled()
    }

    fn response_body_enabled(&self) -> bool {
        (**self).response_body_enabled()
    }
}

fn render_values(values: &[Value]) -> String {
    values
        .iter()
        .map(display_value)
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_format(format: &str, values: &[Value]) -> String {
    let mut out = String::with_capacity(format.len());
    let mut rest = format;
    let mut values = values.iter();
    while let Some(at) = rest.find("{}") {
        match values.next() {
            Some(value) => {
                out.push_str(&rest[..at]);
                out.push_str(&display_value(value));
                rest = &rest[at + 2..];
            }
            // placeholders past the value list stay literal
            None => break,
        }
    }
    out.push_str(rest);
    for value in values {
        out.push(' ');
        out.push_str(&display_value(value));
    }
    out
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn header_fields(headers: &HeaderMap) -> Value {
    let mut fields = Map::new();
    for (name, value) in headers {
        fields.insert(
            name.as_str().to_string(),
            Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()),
        );
    }
    Value::Object(fields)
}

fn request_fields(request: &reqwest::Request) -> Value {
    let mut fields = Map::new();
    fields.insert(
        "method".to_string(),
        Value::String(request.method().as_str().to_string()),
    );
    fields.insert(
        "url".to_string(),
        Value::String(request.url().as_str().to_string()),
    );
    fields.insert("headers".to_string(), header_fields(request.headers()));
    if let Some(bytes) = request.body().and_then(|b| b.as_bytes()) {
        fields.insert(
            "body".to_string(),
            Value::String(String::from_utf8_lossy(bytes).into_owned()),
        );
    }
    Value::Object(fields)
}

fn response_fields(response: &TransportResponse) -> Value {
    json!({
        "status": response.status.as_u16(),
        "headers": header_fields(&response.headers),
        "body": response.body_text(),
    })
}
