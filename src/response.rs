//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Build a [`Response`] in a handler and return it, or return anything that
//! implements [`IntoResponse`]: a [`Status`], a [`Json`] value, a `String`.

use bytes::Bytes;
use http_body_util::Full;
use serde::Serialize;
use tracing::error;

use crate::status::Status;

/// An outgoing HTTP response.
///
/// ```rust
/// use agenda::{Response, Status};
///
/// Response::json(br#"{"id":1}"#.to_vec());
/// Response::html("<p>ok</p>");
/// Response::builder()
///     .status(Status::Created)
///     .header("location", "/api/pessoas/1")
///     .json(br#"{"id":1}"#.to_vec());
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    body: Vec<u8>,
    headers: Vec<(String, String)>,
    status: Status,
}

impl Response {
    /// `200 OK` with `application/json`.
    pub fn json(body: Vec<u8>) -> Self {
        Self::builder().json(body)
    }

    /// `200 OK` with `text/html; charset=utf-8`.
    pub fn html(body: impl Into<String>) -> Self {
        Self::builder().html(body)
    }

    /// `200 OK` with `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// Response with no body.
    pub fn status(code: Status) -> Self {
        Self { body: Vec::new(), headers: Vec::new(), status: code }
    }

    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: Status::Ok }
    }

    pub fn status_code(&self) -> Status { self.status }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn push_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_owned(), value.to_owned()));
    }

    pub(crate) fn clear_body(&mut self) {
        self.body.clear();
    }

    /// Converts into the hyper response the server writes out.
    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let len = self.body.len();
        let mut builder = http::Response::builder().status(http::StatusCode::from(self.status));
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
            .header(http::header::CONTENT_LENGTH, len)
            .body(Full::new(Bytes::from(self.body)))
            .unwrap_or_else(|e| {
                error!("invalid response header: {e}");
                let mut fallback = http::Response::new(Full::new(Bytes::new()));
                *fallback.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
                fallback
            })
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`]. Defaults to `Status::Ok`.
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: Status,
}

impl ResponseBuilder {
    pub fn status(mut self, code: Status) -> Self {
        self.status = code;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn json(self, body: Vec<u8>) -> Response {
        self.finish("application/json", body)
    }

    pub fn html(self, body: impl Into<String>) -> Response {
        self.finish("text/html; charset=utf-8", body.into().into_bytes())
    }

    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish("text/plain; charset=utf-8", body.into().into_bytes())
    }

    /// Terminate with no body (e.g. `Status::NoContent`, `Status::SeeOther`).
    pub fn no_body(self) -> Response {
        Response { body: Vec::new(), headers: self.headers, status: self.status }
    }

    fn finish(self, content_type: &str, body: Vec<u8>) -> Response {
        let mut headers = vec![("content-type".to_owned(), content_type.to_owned())];
        headers.extend(self.headers);
        Response { body, headers, status: self.status }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

/// Return a [`Status`] directly from a handler: `return Status::NotFound`
impl IntoResponse for Status {
    fn into_response(self) -> Response { Response::status(self) }
}

impl<T: IntoResponse, E: IntoResponse> IntoResponse for Result<T, E> {
    fn into_response(self) -> Response {
        match self {
            Ok(v) => v.into_response(),
            Err(e) => e.into_response(),
        }
    }
}

/// A serialisable body sent as `application/json` with the given status.
pub struct Json<T>(pub Status, pub T);

impl<T: Serialize> Json<T> {
    pub fn ok(value: T) -> Self {
        Self(Status::Ok, value)
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.1) {
            Ok(bytes) => Response::builder().status(self.0).json(bytes),
            Err(e) => {
                error!("failed to serialise response body: {e}");
                Response::status(Status::InternalServerError)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_puts_content_type_first() {
        let res = Response::builder()
            .status(Status::Created)
            .header("location", "/api/pessoas/1")
            .json(b"{}".to_vec());
        assert_eq!(res.status_code(), Status::Created);
        assert_eq!(res.header("Content-Type"), Some("application/json"));
        assert_eq!(res.header("location"), Some("/api/pessoas/1"));
    }

    #[test]
    fn json_wrapper_serialises_with_status() {
        let res = Json(Status::NotFound, serde_json::json!({"erro": "x"})).into_response();
        assert_eq!(res.status_code(), Status::NotFound);
        assert_eq!(res.body(), br#"{"erro":"x"}"#);
    }

    #[test]
    fn converts_into_hyper_response() {
        let inner = Response::html("<p>oi</p>").into_inner();
        assert_eq!(inner.status(), http::StatusCode::OK);
        assert_eq!(inner.headers()["content-length"], "9");
        assert_eq!(inner.headers()["content-type"], "text/html; charset=utf-8");
    }
}
