//! Parameter merging and GET/POST selection
//!
//! The API accepts parameters either in the query string of a GET or as the
//! JSON body of a POST. Long queries (a DQL query with many clauses, say)
//! exceed what servers accept in a request line, so the router measures the
//! encoded URL and falls back to POST above a threshold.

use super::request::{RequestBuilder, with_query};
use super::session::Session;
use crate::error::Result;
use crate::params::Params;
use crate::response::DiffbotResponse;
use serde_json::Value;
use tracing::debug;
use url::Url;

/// Encoded URL length at or below which GET is used.
pub const DEFAULT_URL_LENGTH_THRESHOLD: usize = 3000;

/// How a request's parameters travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Everything in the query string.
    Get,
    /// Token in the query string, everything else in a JSON body.
    Post,
}

/// Pick the transport for a URL of `encoded_len` bytes.
///
/// A URL exactly at the threshold still goes as GET.
pub fn select_transport(encoded_len: usize, threshold: usize) -> Transport {
    if encoded_len <= threshold {
        Transport::Get
    } else {
        Transport::Post
    }
}

/// Byte length of `url` once `params` are form-encoded into its query string.
pub fn encoded_url_length(url: &Url, params: &Params) -> usize {
    with_query(url, params).as_str().len()
}

/// Applies default parameters and routes calls through a [`Session`].
#[derive(Debug, Clone)]
pub struct Router {
    session: Session,
    defaults: Params,
    url_length_threshold: usize,
}

impl Router {
    /// Create a router. `defaults` normally carries the token.
    pub fn new(session: Session, defaults: Params, url_length_threshold: usize) -> Self {
        Self {
            session,
            defaults,
            url_length_threshold,
        }
    }

    /// The session requests go through.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Parameters added to every call.
    pub fn defaults(&self) -> &Params {
        &self.defaults
    }

    /// The GET/POST switch point.
    pub fn url_length_threshold(&self) -> usize {
        self.url_length_threshold
    }

    /// Overlay per-call parameters on the defaults, dropping nulls.
    pub fn merge_params(&self, params: Option<Params>) -> Params {
        self.defaults.merge(params.as_ref())
    }

    /// GET with all merged parameters in the query string.
    pub async fn get(&self, url: Url, params: Option<Params>) -> Result<DiffbotResponse> {
        let params = self.merge_params(params);
        self.session.get(url, params, None).await
    }

    /// POST with only the token in the query and every other merged
    /// parameter in the JSON body.
    pub async fn post_params(&self, url: Url, params: Option<Params>) -> Result<DiffbotResponse> {
        let (token, body) = self.merge_params(params).split_token();
        self.session.post(url, token, None, body.into_json()).await
    }

    /// POST a caller-supplied JSON body, with all merged parameters in the
    /// query string.
    pub async fn post_json(
        &self,
        url: Url,
        params: Option<Params>,
        body: Value,
    ) -> Result<DiffbotResponse> {
        let params = self.merge_params(params);
        self.session.post(url, params, None, body).await
    }

    /// GET if the encoded URL fits within the threshold, POST otherwise.
    pub async fn get_or_post(&self, url: Url, params: Option<Params>) -> Result<DiffbotResponse> {
        let params = self.merge_params(params);
        match self.route(&url, &params) {
            Transport::Get => self.session.get(url, params, None).await,
            Transport::Post => {
                let (token, body) = params.split_token();
                self.session.post(url, token, None, body.into_json()).await
            }
        }
    }

    /// The transport [`get_or_post`](Self::get_or_post) would use for
    /// already-merged parameters.
    pub fn route(&self, url: &Url, params: &Params) -> Transport {
        let encoded_len = encoded_url_length(url, params);
        let transport = select_transport(encoded_len, self.url_length_threshold);
        if transport == Transport::Post {
            debug!(
                path = url.path(),
                encoded_len,
                threshold = self.url_length_threshold,
                "URL too long for GET, sending as POST"
            );
        }
        transport
    }

    /// Build the GET request [`get`](Self::get) would send, without sending it.
    pub fn build_get(&self, url: Url, params: Option<Params>) -> RequestBuilder {
        RequestBuilder::get(url).query(self.merge_params(params))
    }
}
