//! Response returned by `Request::execute`.
//!
//! # Design
//! A `Response` is immutable once built. `body()` decodes on every call from
//! `raw_body` and the `Content-Type` header only; nothing is cached.

use serde::de::DeserializeOwned;

use crate::body::{Body, JsonValue};
use crate::error::ApiError;
use crate::header::{BodyFormat, HeaderSet, HttpMessage};
use crate::http::HttpResponse;
use crate::request::Request;

#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: HeaderSet,
    raw_body: Vec<u8>,
    request: Option<Box<Request>>,
}

impl Response {
    pub fn new(status: u16, headers: HeaderSet, raw_body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            raw_body,
            request: None,
        }
    }

    /// Splits a transport's raw output at the reported header boundary.
    pub fn from_raw(raw: HttpResponse) -> Self {
        let HttpResponse {
            status,
            mut raw,
            header_size,
        } = raw;

        let header_size = header_size.min(raw.len());
        let raw_body = raw.split_off(header_size);
        let headers = HeaderSet::from_wire(&String::from_utf8_lossy(&raw));
        Self::new(status, headers, raw_body)
    }

    pub(crate) fn with_request(mut self, request: Request) -> Self {
        self.request = Some(Box::new(request));
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn raw_body(&self) -> &[u8] {
        &self.raw_body
    }

    /// The body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.raw_body).into_owned()
    }

    /// The request that produced this response, when it came from
    /// `Request::execute`.
    pub fn request(&self) -> Option<&Request> {
        self.request.as_deref()
    }

    /// Decodes the body according to `Content-Type`.
    ///
    /// `application/json` bodies are parsed into a [`JsonValue`]; every other
    /// body is returned as raw bytes.
    pub fn body(&self) -> Result<Body, ApiError> {
        match self.headers.body_format() {
            BodyFormat::Json => serde_json::from_slice::<JsonValue>(&self.raw_body)
                .map(Body::Json)
                .map_err(ApiError::decode),
            BodyFormat::Form | BodyFormat::Passthrough => Ok(Body::Bytes(self.raw_body.clone())),
        }
    }

    /// Deserializes a JSON body into `T`, whatever the declared content type.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.raw_body).map_err(ApiError::decode)
    }
}

impl HttpMessage for Response {
    fn headers(&self) -> &HeaderSet {
        &self.headers
    }
}
