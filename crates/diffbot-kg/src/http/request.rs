//! HTTP request builder

use crate::error::{Error, Result};
use crate::params::Params;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// One outbound exchange, before it is handed to a [`Session`](super::Session).
///
/// Parameters always go into the query string. A JSON body, when present, is
/// sent as-is with `content-type: application/json` unless a content type
/// header was set explicitly.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    url: Url,
    query: Params,
    json_body: Option<Value>,
    headers: HeaderMap,
    timeout: Option<Duration>,
}

impl RequestBuilder {
    /// Create a new request builder.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            query: Params::new(),
            json_body: None,
            headers: HeaderMap::new(),
            timeout: None,
        }
    }

    /// Shorthand for a GET request.
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Shorthand for a POST request.
    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    /// Set the query parameters, replacing any set before.
    pub fn query(mut self, params: Params) -> Self {
        self.query = params;
        self
    }

    /// Set the JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.json_body = Some(body);
        self
    }

    /// Merge extra headers, overwriting same-named ones.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        for (name, value) in headers.iter() {
            self.headers.insert(name.clone(), value.clone());
        }
        self
    }

    /// Set a single header.
    ///
    /// # Errors
    /// Returns an error if the header name or value contains invalid characters.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let name_str = name.into();
        let value_str = value.into();

        let name: HeaderName = name_str
            .parse()
            .map_err(|_| Error::InvalidHeaderName(name_str.clone()))?;
        let value: HeaderValue = value_str
            .parse()
            .map_err(|_| Error::InvalidHeaderValue(value_str.clone()))?;

        self.headers.insert(name, value);
        Ok(self)
    }

    /// Override the session timeout for this request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// URL without the parameters.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Query parameters.
    pub fn query_params(&self) -> &Params {
        &self.query
    }

    /// JSON body, if any.
    pub fn json_body(&self) -> Option<&Value> {
        self.json_body.as_ref()
    }

    /// Headers set on this request.
    pub fn header_map(&self) -> &HeaderMap {
        &self.headers
    }

    /// Per-request timeout override.
    pub fn timeout_override(&self) -> Option<Duration> {
        self.timeout
    }

    /// The URL with every parameter form-encoded into its query string.
    pub fn full_url(&self) -> Url {
        with_query(&self.url, &self.query)
    }

    /// Encode the URL and body and hand them to `client`.
    ///
    /// The body is serialized here and nowhere else.
    pub(crate) fn into_reqwest(
        self,
        client: &reqwest::Client,
        timeout: Duration,
    ) -> Result<PreparedRequest> {
        let url = self.full_url();
        let query_len = url.query().map_or(0, str::len);
        let mut headers = self.headers;
        let body = match self.json_body {
            Some(body) => {
                if !headers.contains_key(CONTENT_TYPE) {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                }
                Some(serde_json::to_vec(&body)?)
            }
            None => None,
        };
        let body_size = body.as_ref().map(Vec::len);

        let mut request = client
            .request(self.method, url)
            .headers(headers)
            .timeout(timeout);
        if let Some(body) = body {
            request = request.body(body);
        }
        Ok(PreparedRequest {
            request,
            query_len,
            body_size,
        })
    }
}

/// A request ready to send, with the encoded sizes used for logging.
#[derive(Debug)]
pub(crate) struct PreparedRequest {
    pub(crate) request: reqwest::RequestBuilder,
    pub(crate) query_len: usize,
    pub(crate) body_size: Option<usize>,
}

/// Append `params` to the query string of `url`.
pub(crate) fn with_query(url: &Url, params: &Params) -> Url {
    let mut url = url.clone();
    let pairs = params.to_query_pairs();
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }
    url
}
