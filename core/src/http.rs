//! Transport seam for the host-does-IO pattern.
//!
//! # Design
//! `Request::execute` renders itself into an `HttpRequest` described as plain
//! data and hands it to a `Transport`. The transport performs the network
//! exchange and returns an `HttpResponse`: the status and the raw bytes with
//! the position where the header block ends. Sockets, TLS and redirect
//! following live behind this trait, which keeps the core deterministic and
//! lets tests substitute a stub.
//!
//! All fields use owned types so values can be recorded or moved across
//! threads without lifetime concerns.

use crate::body::Body;
use crate::error::TransportError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl AsRef<str> for HttpMethod {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP exchange to perform, described as plain data.
///
/// `body` is already serialized according to the request's `Content-Type`,
/// except for structured values with no negotiated format, which
/// `Body::into_bytes` renders as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Body>,
    pub follow_redirects: bool,
}

/// What a transport got back: the status code and the raw header block
/// followed by the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub raw: Vec<u8>,
    /// Length of the header block at the start of `raw`.
    pub header_size: usize,
}

impl HttpResponse {
    /// Assembles a raw response from a status, header pairs and a body.
    pub fn assemble<'a, I>(status: u16, headers: I, body: &[u8]) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut head = format!("HTTP/1.1 {status}\r\n");
        for (name, value) in headers {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }
        head.push_str("\r\n");

        let header_size = head.len();
        let mut raw = head.into_bytes();
        raw.extend_from_slice(body);
        Self {
            status,
            raw,
            header_size,
        }
    }
}

/// Performs network exchanges on behalf of requests.
///
/// Implementations must not retain the request beyond the call and must
/// release any connection they open before returning, on success and failure.
/// Non-2xx statuses are data, not errors.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}
