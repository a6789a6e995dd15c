//! Synchronous client core for the SoundCloud REST API.
//!
//! # Overview
//! An HTTP abstraction layer (`Url`, `HeaderSet`, `Request`, `Response`) with
//! content negotiation for JSON and form-urlencoded bodies, and a `Session`
//! that drives the OAuth2 authorization-code and password grants and injects
//! the bearer token into every API call.
//!
//! # Design
//! - The network exchange sits behind the `Transport` trait (host-does-IO):
//!   requests are rendered to plain `HttpRequest` data, and the transport
//!   returns raw bytes plus the header boundary. `UreqTransport` is the
//!   default blocking implementation.
//! - Builders consume and return values; a `Request` is consumed exactly once
//!   by `execute` and kept as the `Response`'s back-reference.
//! - Every public operation returns `Result<_, ApiError>`; a 401 is the
//!   `AuthorizationRequired` variant.
//! - Each call returns its own `Response`; there is no "last response" state.

pub mod body;
pub mod config;
pub mod error;
pub mod header;
pub mod http;
pub mod request;
pub mod response;
pub mod session;
pub mod transport;
pub mod types;
pub mod url;

pub use body::{Body, JsonValue};
pub use config::ClientConfig;
pub use error::{ApiError, TransportError};
pub use header::{parse_content_type, BodyFormat, ContentType, HeaderSet, HttpMessage};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use request::Request;
pub use response::Response;
pub use session::{validate, Session};
pub use transport::UreqTransport;
pub use types::{GrantType, TokenResponse};
pub use url::Url;
