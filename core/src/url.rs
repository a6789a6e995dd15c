//! A base address plus an ordered set of query parameters.
//!
//! # Design
//! Parameters keep insertion order so the rendered URL is reproducible; a
//! repeated key overwrites the earlier value in place. The builder methods
//! consume and return the value, so a `Url` is never aliased while being
//! configured.

use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    base: String,
    params: IndexMap<String, String>,
}

impl Url {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            params: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_params<I, K, V>(self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        params
            .into_iter()
            .fold(self, |url, (name, value)| url.with_param(name, value))
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn params(&self) -> &IndexMap<String, String> {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Renders `base?key=value&...` with form-urlencoded pairs in insertion
    /// order.
    ///
    /// The `?` is omitted when there are no parameters.
    pub fn build(&self) -> String {
        if self.params.is_empty() {
            return self.base.clone();
        }
        // String pairs cannot fail to serialize.
        let query = serde_urlencoded::to_string(&self.params).unwrap_or_default();
        format!("{}?{query}", self.base)
    }
}

impl std::fmt::Display for Url {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.build())
    }
}
