//! API resource endpoints
//!
//! Each client wraps a [`BaseClient`], which holds the router, the URL root
//! and the validated default parameters.

pub mod enhance;
pub mod search;

pub use enhance::{ENHANCE_PARAMS, EnhanceClient, PollOptions};
pub use search::{SEARCH_PARAMS, SearchClient};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::{Router, Session};
use crate::params::{Params, TOKEN_PARAM};
use secrecy::ExposeSecret;
use url::Url;

/// Base trait for API resources.
pub trait Resource {
    /// The shared client state.
    fn base(&self) -> &BaseClient;

    /// The session requests go through.
    fn session(&self) -> &Session {
        self.base().router().session()
    }

    /// Close the underlying session. Safe to call more than once.
    fn close(&self) {
        self.session().close();
    }
}

/// State shared by every endpoint client.
#[derive(Debug, Clone)]
pub struct BaseClient {
    router: Router,
    base_url: Url,
}

impl BaseClient {
    /// Build a client with its own session.
    ///
    /// # Errors
    /// - [`Error::MissingConfig`] if no token is configured
    /// - [`Error::InvalidParam`] if a default parameter is not in `allowed_params`
    /// - [`Error::InvalidUrl`] if the base URL is empty, unparseable or not http(s)
    pub fn new(config: &ClientConfig, allowed_params: &[&str]) -> Result<Self> {
        let session = Session::new(config.session_config());
        Self::with_session(config, allowed_params, session)
    }

    /// Build a client that sends through an existing session.
    pub fn with_session(
        config: &ClientConfig,
        allowed_params: &[&str],
        session: Session,
    ) -> Result<Self> {
        let token = config
            .token
            .as_ref()
            .map(|token| token.expose_secret())
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                Error::MissingConfig("API token (set DIFFBOT_TOKEN or ClientConfig::token)".into())
            })?;

        if let Some(key) = config
            .default_params
            .keys()
            .find(|key| !allowed_params.contains(key))
        {
            return Err(Error::InvalidParam(key.to_string()));
        }

        let base_url = parse_base_url(config.base_url.as_deref())?;

        let mut defaults = config.default_params.clone();
        defaults.insert(TOKEN_PARAM, token);

        Ok(Self {
            router: Router::new(session, defaults, config.url_length_threshold),
            base_url,
        })
    }

    /// The router requests go through.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// URL root all endpoint paths are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL, percent-encoding each one.
    pub fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn parse_base_url(base_url: Option<&str>) -> Result<Url> {
    let base_url = base_url.unwrap_or(crate::DEFAULT_BASE_URL);

    if base_url.trim().is_empty() {
        return Err(Error::InvalidUrl("Base URL cannot be empty".to_string()));
    }

    let url: Url = base_url
        .parse()
        .map_err(|e| Error::InvalidUrl(format!("{e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::InvalidUrl(format!(
            "Invalid URL scheme '{scheme}'. Only 'http' and 'https' are supported."
        ))),
    }
}

/// Merge a single parameter into optional per-call parameters.
pub(crate) fn with_param(params: Option<Params>, key: &str, value: &str) -> Params {
    params.unwrap_or_default().with(key, value)
}
