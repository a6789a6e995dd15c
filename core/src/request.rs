//! Request builder.
//!
//! # Design
//! A `Request` is configured through consuming `with_*` calls and consumed
//! exactly once by `execute`, which moves it into the resulting `Response` as
//! a back-reference. Header and body-parameter calls merge like `Url`
//! parameters and may be repeated.

use tracing::debug;

use crate::body::{encode_form, encode_json, Body, JsonValue};
use crate::error::ApiError;
use crate::header::{BodyFormat, HeaderSet, HttpMessage};
use crate::http::{HttpRequest, Transport};
use crate::response::Response;
use crate::url::Url;

#[derive(Clone, derive_more::Debug)]
pub struct Request {
    verb: String,
    url: Url,
    headers: HeaderSet,
    #[debug(ignore)]
    body: Body,
}

impl Request {
    /// Creates a request; the verb is normalized to uppercase.
    pub fn new(verb: impl AsRef<str>, url: Url) -> Self {
        Self {
            verb: verb.as_ref().to_uppercase(),
            url,
            headers: HeaderSet::new(),
            body: Body::Empty,
        }
    }

    pub fn verb(&self) -> &str {
        &self.verb
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers.extend(headers);
        self
    }

    /// Replaces the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets one field of a JSON object body.
    ///
    /// A body that is not a JSON object is replaced by a new object.
    #[must_use]
    pub fn with_body_param(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        if let Body::Json(JsonValue::Object(fields)) = &mut self.body {
            fields.insert(name.into(), value.into());
        } else {
            let mut fields = serde_json::Map::new();
            fields.insert(name.into(), value.into());
            self.body = Body::Json(JsonValue::Object(fields));
        }
        self
    }

    #[must_use]
    pub fn with_body_params<I, K, V>(self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<JsonValue>,
    {
        params
            .into_iter()
            .fold(self, |request, (name, value)| request.with_body_param(name, value))
    }

    /// The body as configured, before content negotiation.
    pub fn raw_body(&self) -> &Body {
        &self.body
    }

    /// The body as it goes on the wire.
    ///
    /// `application/json` bodies become JSON text and
    /// `application/x-www-form-urlencoded` bodies a query string; any other
    /// content type passes the body through unchanged.
    pub fn body(&self) -> Result<Body, ApiError> {
        match self.headers.body_format() {
            BodyFormat::Json => encode_json(&self.body).map(Body::Text),
            BodyFormat::Form => encode_form(&self.body).map(Body::Text),
            BodyFormat::Passthrough => Ok(self.body.clone()),
        }
    }

    /// Sends the request through `transport`.
    ///
    /// The body is only attached for non-`GET` verbs and when non-empty.
    pub fn execute<T>(self, transport: &T, follow_redirects: bool) -> Result<Response, ApiError>
    where
        T: Transport + ?Sized,
    {
        let body = if self.verb != "GET" && !self.body.is_empty() {
            Some(self.body()?)
        } else {
            None
        };

        let exchange = HttpRequest {
            method: self.verb.clone(),
            url: self.url.build(),
            headers: self.headers.to_pairs(),
            body,
            follow_redirects,
        };

        debug!(method = %self.verb, url = self.url.base(), "sending...");
        let raw = transport.execute(exchange)?;
        debug!(status = raw.status, "...receiving");

        Ok(Response::from_raw(raw).with_request(self))
    }
}

impl HttpMessage for Request {
    fn headers(&self) -> &HeaderSet {
        &self.headers
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io;

    use serde_json::json;

    use super::*;
    use crate::error::TransportError;
    use crate::header::CONTENT_TYPE;
    use crate::http::HttpResponse;

    #[derive(Default)]
    struct Recorder {
        seen: RefCell<Vec<HttpRequest>>,
    }

    impl Transport for Recorder {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.borrow_mut().push(request);
            Ok(HttpResponse::assemble(
                200,
                [("Content-Type", "application/json")],
                br#"{"ok":true}"#,
            ))
        }
    }

    struct Refused;

    impl Transport for Refused {
        fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
            Err(TransportError::new(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            )))
        }
    }

    fn url() -> Url {
        Url::new("http://localhost/things").with_param("client_id", "abc")
    }

    #[test]
    fn verb_is_uppercased() {
        assert_eq!(Request::new("patch", url()).verb(), "PATCH");
    }

    #[test]
    fn json_body_serializes_to_json_text() {
        let request = Request::new("POST", url())
            .with_header(CONTENT_TYPE, "application/json")
            .with_body(json!({"a": 1}));
        assert_eq!(request.body().unwrap(), Body::Text(r#"{"a":1}"#.to_string()));
    }

    #[test]
    fn form_body_serializes_to_query_string() {
        let request = Request::new("POST", url())
            .with_header(CONTENT_TYPE, "application/x-www-form-urlencoded; charset=utf-8")
            .with_body_param("grant_type", "password")
            .with_body_params([("username", "user"), ("password", "p&ss")]);
        assert_eq!(
            request.body().unwrap(),
            Body::Text("grant_type=password&username=user&password=p%26ss".to_string())
        );
    }

    #[test]
    fn unknown_content_type_passes_body_through() {
        let request = Request::new("PUT", url())
            .with_header(CONTENT_TYPE, "application/octet-stream")
            .with_body(vec![1u8, 2, 3]);
        assert_eq!(request.body().unwrap(), Body::Bytes(vec![1, 2, 3]));

        let structured = Request::new("PUT", url()).with_body(json!({"a": 1}));
        assert_eq!(structured.body().unwrap(), Body::Json(json!({"a": 1})));
    }

    #[test]
    fn body_param_replaces_non_object_body() {
        let request = Request::new("POST", url())
            .with_body("text")
            .with_body_param("a", 1)
            .with_body_param("b", "two")
            .with_body_param("a", 3);
        assert_eq!(request.raw_body(), &Body::Json(json!({"a": 3, "b": "two"})));
    }

    #[test]
    fn headers_merge_with_last_write_winning() {
        let request = Request::new("GET", url())
            .with_headers([("Accept", "text/plain"), ("X-One", "1")])
            .with_header("accept", "application/json");
        assert_eq!(request.header("Accept"), Some("application/json"));
        assert_eq!(request.headers().len(), 2);
        assert!(request.has_header("X-One"));
    }

    #[test]
    fn execute_hands_transport_rendered_request() {
        let transport = Recorder::default();
        let response = Request::new("post", url())
            .with_header(CONTENT_TYPE, "application/json")
            .with_body(json!({"title": "x"}))
            .execute(&transport, true)
            .unwrap();

        let seen = transport.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, "POST");
        assert_eq!(seen[0].url, "http://localhost/things?client_id=abc");
        assert_eq!(
            seen[0].headers,
            vec![("Content-Type".to_string(), "application/json".to_string())]
        );
        assert_eq!(seen[0].body, Some(Body::Text(r#"{"title":"x"}"#.to_string())));
        assert!(seen[0].follow_redirects);

        assert_eq!(response.status(), 200);
        assert_eq!(response.body().unwrap(), Body::Json(json!({"ok": true})));
        assert_eq!(response.request().map(Request::verb), Some("POST"));
    }

    #[test]
    fn get_and_empty_bodies_are_not_attached() {
        let transport = Recorder::default();
        Request::new("GET", url())
            .with_body(json!({"ignored": true}))
            .execute(&transport, false)
            .unwrap();
        Request::new("DELETE", url())
            .with_body(json!({}))
            .execute(&transport, false)
            .unwrap();

        let seen = transport.seen.borrow();
        assert!(seen.iter().all(|request| request.body.is_none()));
        assert!(!seen[0].follow_redirects);
    }

    #[test]
    fn transport_failure_is_a_transport_error() {
        let err = Request::new("GET", url()).execute(&Refused, true).unwrap_err();
        match err {
            ApiError::Transport(err) => assert_eq!(err.message(), "connection refused"),
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[test]
    fn debug_output_hides_body() {
        let request = Request::new("POST", url()).with_body_param("password", "hunter2");
        assert!(!format!("{request:?}").contains("hunter2"));
    }
}
