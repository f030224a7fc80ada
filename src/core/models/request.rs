use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::core::errors::{Result, VerseError};

/// HTTP verbs used by the backend API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A call to be sent through the request pipeline.
///
/// `path` is relative to the configured base URL. Header names are kept
/// as given; the pipeline only ever adds `Authorization`.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
    pub headers: BTreeMap<String, String>,
}

impl OutboundRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: BTreeMap::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Attach a JSON body.
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Set `name`, replacing any existing header that differs only in case.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
        self.headers.insert(name.to_string(), value.into());
    }

    /// Look up a header by name, ignoring ASCII case.
    #[cfg(test)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A response as reported by the transport, whatever its status.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx and 3xx count as success; anything from 400 up is a failure.
    pub fn is_success(&self) -> bool {
        self.status < 400
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Parse the raw body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| VerseError::InvalidResponse {
            detail: format!("body is not the expected JSON: {e}"),
        })
    }

    /// Unwrap the backend's `{code, message, data}` envelope.
    ///
    /// A non-200 `code` is a business error even when the HTTP status is 200.
    pub fn envelope<T: DeserializeOwned>(&self) -> Result<T> {
        let env: ApiEnvelope<T> = self.json()?;
        if env.code != 200 {
            return Err(VerseError::Backend {
                code: env.code,
                message: env.message,
            });
        }
        env.data.ok_or_else(|| VerseError::InvalidResponse {
            detail: "envelope has no data".into(),
        })
    }

    /// Like [`envelope`](Self::envelope) for operations that return no data.
    pub fn envelope_message(&self) -> Result<String> {
        let env: ApiEnvelope<serde_json::Value> = self.json()?;
        if env.code != 200 {
            return Err(VerseError::Backend {
                code: env.code,
                message: env.message,
            });
        }
        Ok(env.message)
    }
}

/// Standard reply wrapper used by every backend endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}
