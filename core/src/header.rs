//! HTTP headers and content negotiation.
//!
//! # Design
//! `HeaderSet` stores names exactly as given but matches them
//! case-insensitively, because transports disagree on casing (`ureq` reports
//! lowercase names, callers usually write `Content-Type`). Each name holds a
//! single value; the last write wins.
//!
//! Content negotiation only looks at the main type of `Content-Type`:
//! `application/json` and `application/x-www-form-urlencoded` are encoded and
//! decoded, everything else passes through untouched.

use indexmap::IndexMap;

use crate::error::ApiError;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const ACCEPT: &str = "Accept";
pub const AUTHORIZATION: &str = "Authorization";
pub const USER_AGENT: &str = "User-Agent";

/// A set of HTTP headers, at most one value per name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: IndexMap<String, String>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`, replacing any existing value whatever its case.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if let Some(index) = self.position(&name) {
            self.entries.shift_remove_index(index);
        }
        self.entries.insert(name, value.into());
    }

    /// Merges `other` into this set; `other` wins on collision.
    pub fn extend<I, K, V>(&mut self, other: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in other {
            self.insert(name, value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name)
            .and_then(|index| self.entries.get_index(index))
            .map(|(_, value)| value.as_str())
    }

    /// True iff the header is present and its value is non-empty.
    ///
    /// A header stored with an empty value is reported as absent.
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some_and(|value| !value.is_empty())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.position(name)?;
        self.entries.shift_remove_index(index).map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Header pairs as handed to a transport.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Renders `Name: Value` lines joined by CRLF.
    pub fn to_wire(&self) -> String {
        self.iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect::<Vec<_>>()
            .join("\r\n")
    }

    /// Parses a raw header block.
    ///
    /// Lines without `": "` (status lines, blank lines) are skipped. When a
    /// redirect chain produced several blocks, later values win.
    pub fn from_wire(raw: &str) -> Self {
        let mut headers = Self::new();
        for line in raw.lines() {
            let Some((name, value)) = line.split_once(": ") else {
                continue;
            };
            headers.insert(name, value);
        }
        headers
    }

    /// The negotiated body format, from `Content-Type`.
    pub fn body_format(&self) -> BodyFormat {
        BodyFormat::negotiate(self)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .keys()
            .position(|key| key.eq_ignore_ascii_case(name))
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        headers.extend(iter);
        headers
    }
}

/// Read access shared by requests and responses.
pub trait HttpMessage {
    fn headers(&self) -> &HeaderSet;

    fn header(&self, name: &str) -> Option<&str> {
        self.headers().get(name)
    }

    /// See [`HeaderSet::has`]: empty values count as absent.
    fn has_header(&self, name: &str) -> bool {
        self.headers().has(name)
    }
}

/// A parsed `Content-Type`-style header: `main/type; key=value; ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    main_type: String,
    parameters: IndexMap<String, String>,
    malformed: Option<String>,
}

impl ContentType {
    /// Always available, even when the parameter list is malformed.
    pub fn main_type(&self) -> &str {
        &self.main_type
    }

    /// The `key=value` parameters.
    ///
    /// Fails with [`ApiError::Parse`] if a segment had no `=`.
    pub fn parameters(&self) -> Result<&IndexMap<String, String>, ApiError> {
        match &self.malformed {
            Some(token) => Err(ApiError::Parse {
                message: format!("malformed header parameter '{token}' in '{}'", self.main_type),
            }),
            None => Ok(&self.parameters),
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    pub fn is(&self, mime: &mime::Mime) -> bool {
        self.main_type.eq_ignore_ascii_case(mime.as_ref())
    }
}

/// Splits a header value on `"; "`: the first segment is the main type, the
/// others are `key=value` pairs split once on `=`.
pub fn parse_content_type(value: &str) -> ContentType {
    let mut segments = value.split("; ");
    let main_type = segments.next().unwrap_or_default().trim().to_string();

    let mut parameters = IndexMap::new();
    let mut malformed = None;
    for segment in segments {
        match segment.split_once('=') {
            Some((key, value)) => {
                parameters.insert(key.to_string(), value.to_string());
            }
            None => {
                malformed.get_or_insert_with(|| segment.to_string());
            }
        }
    }

    ContentType {
        main_type,
        parameters,
        malformed,
    }
}

/// How a body is encoded or decoded for a given `Content-Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Json,
    Form,
    Passthrough,
}

impl BodyFormat {
    pub fn negotiate(headers: &HeaderSet) -> Self {
        if !headers.has(CONTENT_TYPE) {
            return Self::Passthrough;
        }
        let content_type = parse_content_type(headers.get(CONTENT_TYPE).unwrap_or_default());
        if content_type.is(&mime::APPLICATION_JSON) {
            Self::Json
        } else if content_type.is(&mime::APPLICATION_WWW_FORM_URLENCODED) {
            Self::Form
        } else {
            Self::Passthrough
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_main_type_and_charset() {
        let content_type = parse_content_type("application/json; charset=utf-8");
        assert_eq!(content_type.main_type(), "application/json");
        let parameters = content_type.parameters().unwrap();
        assert_eq!(parameters.len(), 1);
        assert_eq!(parameters.get("charset").map(String::as_str), Some("utf-8"));
    }

    #[test]
    fn parameter_value_is_split_once() {
        let content_type = parse_content_type("multipart/form-data; boundary=a=b");
        assert_eq!(content_type.parameter("boundary"), Some("a=b"));
    }

    #[test]
    fn malformed_parameter_keeps_main_type() {
        let content_type = parse_content_type("text/html; garbage; charset=utf-8");
        assert_eq!(content_type.main_type(), "text/html");
        let err = content_type.parameters().unwrap_err();
        assert!(matches!(err, ApiError::Parse { .. }));
    }

    #[test]
    fn has_header_is_false_when_absent() {
        let headers = HeaderSet::new();
        assert!(!headers.has("X-Missing"));
        assert_eq!(headers.get("X-Missing"), None);
    }

    #[test]
    fn has_header_is_false_when_value_is_empty() {
        let headers: HeaderSet = [("X-Empty", "")].into_iter().collect();
        assert!(!headers.has("X-Empty"));
        assert_eq!(headers.get("X-Empty"), Some(""));
    }

    #[test]
    fn last_write_wins_across_case() {
        let mut headers = HeaderSet::new();
        headers.insert("content-type", "text/plain");
        headers.insert("Content-Type", "application/json");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("CONTENT-TYPE"), Some("application/json"));
        assert_eq!(headers.iter().next(), Some(("Content-Type", "application/json")));
    }

    #[test]
    fn wire_format_round_trips() {
        let headers: HeaderSet = [
            ("Accept", "application/json"),
            ("Authorization", "OAuth tok123"),
            ("X-Ratio", "a: b"),
            ("X-Pad", " padded "),
        ]
        .into_iter()
        .collect();

        let wire = headers.to_wire();
        assert_eq!(
            wire,
            "Accept: application/json\r\nAuthorization: OAuth tok123\r\nX-Ratio: a: b\r\nX-Pad:  padded "
        );
        assert_eq!(HeaderSet::from_wire(&wire), headers);
    }

    #[test]
    fn from_wire_skips_status_lines() {
        let raw = "HTTP/1.1 302 Found\r\nLocation: /tracks/1\r\n\r\nHTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n";
        let headers = HeaderSet::from_wire(raw);
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("location"), Some("/tracks/1"));
        assert_eq!(headers.get("content-type"), Some("application/json"));
    }

    #[test]
    fn negotiates_body_format() {
        let json: HeaderSet = [(CONTENT_TYPE, "application/json; charset=utf-8")]
            .into_iter()
            .collect();
        let form: HeaderSet = [(CONTENT_TYPE, "application/x-www-form-urlencoded")]
            .into_iter()
            .collect();
        let text: HeaderSet = [(CONTENT_TYPE, "text/plain")].into_iter().collect();
        let empty: HeaderSet = [(CONTENT_TYPE, "")].into_iter().collect();

        assert_eq!(json.body_format(), BodyFormat::Json);
        assert_eq!(form.body_format(), BodyFormat::Form);
        assert_eq!(text.body_format(), BodyFormat::Passthrough);
        assert_eq!(empty.body_format(), BodyFormat::Passthrough);
        assert_eq!(HeaderSet::new().body_format(), BodyFormat::Passthrough);
    }
}
