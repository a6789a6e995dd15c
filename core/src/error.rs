//! Error types for the SoundCloud client.
//!
//! # Design
//! Every public operation returns `Result<T, ApiError>`. `AuthorizationRequired`
//! gets a dedicated variant because callers routinely distinguish "log in
//! first" from "the server rejected the call." All other non-2xx/3xx responses
//! land in `HttpError` with the status code, the body text and the full
//! response for debugging. Network-level failures never produce a response;
//! they are wrapped in `TransportError`.

use std::error::Error;
use std::fmt;

use crate::response::Response;

/// Errors returned by `Session`, `Request` and `Response` operations.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum ApiError {
    /// A credential or field required by the operation is not configured.
    ///
    /// Raised before anything is sent over the wire.
    #[display("configuration error: {message}")]
    #[from(skip)]
    Configuration {
        /// Which field is missing.
        message: String,
    },

    /// The transport failed before any HTTP response was obtained.
    Transport(TransportError),

    /// A body could not be decoded from, or encoded to, its declared
    /// content type.
    #[display("decode error: {message}")]
    #[from(skip)]
    Decode {
        /// Description of the decoding failure.
        message: String,
    },

    /// A header value could not be parsed.
    #[display("parse error: {message}")]
    #[from(skip)]
    Parse {
        /// Description of the malformed header.
        message: String,
    },

    /// The server answered 401: the application must (re)authorize.
    #[display("you must authorize your application first")]
    #[from(skip)]
    AuthorizationRequired {
        /// The 401 response.
        response: Box<Response>,
    },

    /// The server answered with a status outside `[200, 400)` other than 401.
    #[display("HTTP {status}: {body}")]
    #[from(skip)]
    HttpError {
        /// The HTTP status code.
        status: u16,
        /// The response body, decoded lossily as UTF-8.
        body: String,
        /// The offending response.
        response: Box<Response>,
    },
}

impl ApiError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn decode(message: impl fmt::Display) -> Self {
        Self::Decode {
            message: message.to_string(),
        }
    }

    /// The HTTP status carried by the error, if a response was received.
    pub fn status(&self) -> Option<u16> {
        self.response().map(Response::status)
    }

    /// The response that caused the error, if any.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::AuthorizationRequired { response } | Self::HttpError { response, .. } => {
                Some(&**response)
            }
            _ => None,
        }
    }

    pub fn is_authorization_required(&self) -> bool {
        matches!(self, Self::AuthorizationRequired { .. })
    }
}

/// A failure reported by a [`Transport`](crate::Transport): DNS, refused
/// connection, TLS, timeout.
///
/// Always wraps the adapter's native error.
#[derive(Debug)]
pub struct TransportError {
    message: String,
    source: Box<dyn Error + Send + Sync>,
}

impl TransportError {
    pub fn new<E>(source: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        let source = source.into();
        Self {
            message: source.to_string(),
            source,
        }
    }

    /// The adapter's diagnostic message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transport failed: {}", self.message)
    }
}

impl Error for TransportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.source.as_ref())
    }
}
