//! Response model
//!
//! Every completed exchange becomes a [`DiffbotResponse`]: the status, the
//! headers and a [`Content`] value decoded once according to the
//! `content-type` header. Endpoint-specific views ([`EntitiesResponse`],
//! [`BulkJobStatusResponse`], ...) are thin newtypes that dereference to the
//! base response and add accessors over the already-parsed content.

mod bulkjob;
mod coverage;
mod entities;

pub use bulkjob::{
    BulkJobCreateResponse, BulkJobResultsResponse, BulkJobStatusResponse, ListBulkJobsResponse,
    REPORT_ID_HEADER,
};
pub use coverage::CoverageReportResponse;
pub use entities::EntitiesResponse;

use crate::error::{Error, Result};
use bytes::Bytes;
use http::{HeaderMap, StatusCode, header::CONTENT_TYPE};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

const JSON_LINES_TYPES: [&str; 4] = [
    "application/json-lines",
    "application/jsonl",
    "application/x-ndjson",
    "application/x-jsonlines",
];

/// Decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// A single JSON document.
    Json(Value),
    /// One JSON document per non-blank line, in order.
    JsonLines(Vec<Value>),
    /// Unparsed text (CSV reports, plain text, unknown types).
    Text(String),
}

/// The shape of a [`Content`] value, without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// [`Content::Json`]
    Json,
    /// [`Content::JsonLines`]
    JsonLines,
    /// [`Content::Text`]
    Text,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ContentKind {
    /// Short lowercase name, used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Json => "json",
            ContentKind::JsonLines => "json-lines",
            ContentKind::Text => "text",
        }
    }

    /// Pick the decoder for a `content-type` header value.
    ///
    /// Parameters such as `; charset=utf-8` are ignored, and so is case.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(raw) = content_type else {
            return ContentKind::Text;
        };
        let mime = raw
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if JSON_LINES_TYPES.contains(&mime.as_str()) {
            ContentKind::JsonLines
        } else if mime == "application/json" || mime.ends_with("+json") {
            ContentKind::Json
        } else {
            ContentKind::Text
        }
    }
}

impl Content {
    /// Decode a body of the given kind.
    pub fn parse(kind: ContentKind, body: &[u8]) -> Result<Self> {
        match kind {
            ContentKind::Json => Ok(Content::Json(serde_json::from_slice(body)?)),
            ContentKind::JsonLines => parse_json_lines(body).map(Content::JsonLines),
            ContentKind::Text => std::str::from_utf8(body)
                .map(|text| Content::Text(text.to_owned()))
                .map_err(|e| Error::Parse(format!("response body is not valid UTF-8: {e}"))),
        }
    }

    /// Which variant this is.
    pub fn kind(&self) -> ContentKind {
        match self {
            Content::Json(_) => ContentKind::Json,
            Content::JsonLines(_) => ContentKind::JsonLines,
            Content::Text(_) => ContentKind::Text,
        }
    }

    /// The JSON document, if this is [`Content::Json`].
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Content::Json(value) => Some(value),
            _ => None,
        }
    }

    /// The parsed lines, if this is [`Content::JsonLines`].
    pub fn as_lines(&self) -> Option<&[Value]> {
        match self {
            Content::JsonLines(lines) => Some(lines),
            _ => None,
        }
    }

    /// The raw text, if this is [`Content::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(text),
            _ => None,
        }
    }
}

fn parse_json_lines(body: &[u8]) -> Result<Vec<Value>> {
    let text = std::str::from_utf8(body)
        .map_err(|e| Error::Parse(format!("JSON-lines body is not valid UTF-8: {e}")))?;

    let mut values = Vec::new();
    for (index, line) in text.split('\n').enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value = serde_json::from_str(line)
            .map_err(|e| Error::Parse(format!("invalid JSON on line {}: {e}", index + 1)))?;
        values.push(value);
    }
    Ok(values)
}

/// A successful API response with decoded content.
#[derive(Debug, Clone)]
pub struct DiffbotResponse {
    status: StatusCode,
    headers: HeaderMap,
    content: Content,
    elapsed: Duration,
}

impl DiffbotResponse {
    /// Build a response from a completed exchange, decoding the body
    /// according to its `content-type`.
    pub fn create(status: StatusCode, headers: HeaderMap, body: Bytes) -> Result<Self> {
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok());
        let content = Content::parse(ContentKind::from_content_type(content_type), &body)?;
        Ok(Self::new(status, headers, content))
    }

    /// Wrap already-decoded content.
    pub fn new(status: StatusCode, headers: HeaderMap, content: Content) -> Self {
        Self {
            status,
            headers,
            content,
            elapsed: Duration::ZERO,
        }
    }

    /// Record how long the exchange took.
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    /// HTTP status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A single header value, looked up case-insensitively.
    ///
    /// Returns `None` when the header is missing or not visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Decoded body.
    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Consume the response, keeping only the decoded body.
    pub fn into_content(self) -> Content {
        self.content
    }

    /// Time from sending the request to having the full body.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Shorthand for `content().as_json()`.
    pub fn json(&self) -> Option<&Value> {
        self.content.as_json()
    }

    /// Shorthand for `content().as_lines()`.
    pub fn lines(&self) -> Option<&[Value]> {
        self.content.as_lines()
    }

    /// Shorthand for `content().as_text()`.
    pub fn text(&self) -> Option<&str> {
        self.content.as_text()
    }
}

/// Implements `Deref`, `From` and `into_inner` for a response newtype.
macro_rules! typed_response {
    ($name:ident) => {
        impl ::std::ops::Deref for $name {
            type Target = $crate::response::DiffbotResponse;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl From<$crate::response::DiffbotResponse> for $name {
            fn from(response: $crate::response::DiffbotResponse) -> Self {
                Self(response)
            }
        }

        impl $name {
            /// Unwrap into the untyped response.
            pub fn into_inner(self) -> $crate::response::DiffbotResponse {
                self.0
            }
        }
    };
}
pub(crate) use typed_response;
