//! Owned network request.

use crate::{NetworkError, Result};
use http::Method;
use serde::Serialize;

/// Request body, already encoded.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// No body.
    Empty,
    /// `application/json`.
    Json(Vec<u8>),
}

impl RequestBody {
    /// Content type header value for this body, if any.
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::Empty => None,
            Self::Json(_) => Some("application/json"),
        }
    }
}

/// A request described as plain data.
///
/// Encoding failures are kept until [`url`](Self::url) is resolved, so the
/// builder chain stays infallible.
#[derive(Debug, Clone)]
pub struct NetworkRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) body: RequestBody,
    pub(crate) build_error: Option<String>,
}

impl NetworkRequest {
    /// Create a request. `path` is either absolute or relative to the base URL.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body: RequestBody::Empty,
            build_error: None,
        }
    }

    /// Create a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Create a POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set the body as JSON.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        match serde_json::to_vec(body) {
            Ok(bytes) => self.body = RequestBody::Json(bytes),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize JSON body");
                self.build_error = Some(e.to_string());
            }
        }
        self
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path as given.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Encoded body.
    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Resolve the final URL against an optional base URL.
    pub fn url(&self, base_url: Option<&str>) -> Result<url::Url> {
        if let Some(error) = &self.build_error {
            return Err(NetworkError::RequestBuild(error.clone()));
        }

        let mut url = match url::Url::parse(&self.path) {
            Ok(absolute) => absolute,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = base_url.ok_or_else(|| {
                    NetworkError::InvalidUrl(format!("relative path without base URL: {}", self.path))
                })?;
                url::Url::parse(base)?.join(&self.path)?
            }
            Err(e) => return Err(NetworkError::InvalidUrl(e.to_string())),
        };

        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }
}
