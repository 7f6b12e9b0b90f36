//! Knowledge Graph search (DQL) endpoint

use super::{BaseClient, Resource, with_param};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::Session;
use crate::params::Params;
use crate::response::{CoverageReportResponse, EntitiesResponse};

/// Default parameters a [`SearchClient`] accepts.
pub const SEARCH_PARAMS: &[&str] = &["jsonmode", "nonCanonicalFacts", "size"];

/// Client for DQL search and search coverage reports.
///
/// # Example
///
/// ```rust,no_run
/// use diffbot_kg::{Params, SearchClient};
///
/// # async fn example() -> diffbot_kg::Result<()> {
/// let client = SearchClient::new("your-token")?;
/// let response = client
///     .search(Params::new().with("query", "type:Organization name:\"Diffbot\"").with("size", 1))
///     .await?;
/// for entity in response.entities() {
///     println!("{}", entity["name"]);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SearchClient {
    base: BaseClient,
}

impl Resource for SearchClient {
    fn base(&self) -> &BaseClient {
        &self.base
    }
}

impl SearchClient {
    /// Create a client with the given token and default settings.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::from_config(ClientConfig::with_token(token))
    }

    /// Create a client from a full configuration.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            base: BaseClient::new(&config, SEARCH_PARAMS)?,
        })
    }

    /// Create a client that shares an existing session.
    pub fn with_session(config: ClientConfig, session: Session) -> Result<Self> {
        Ok(Self {
            base: BaseClient::with_session(&config, SEARCH_PARAMS, session)?,
        })
    }

    /// Create a client from `DIFFBOT_*` environment variables.
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self> {
        Self::from_config(ClientConfig::from_env()?)
    }

    /// Run a DQL search.
    ///
    /// `params` must include `query`. Long queries are sent as POST.
    pub async fn search(&self, params: Params) -> Result<EntitiesResponse> {
        let url = self.base.url(&["dql"])?;
        let response = self.base.router().get_or_post(url, Some(params)).await?;
        Ok(response.into())
    }

    /// Download a coverage report by its id.
    pub async fn coverage_report_by_id(&self, report_id: &str) -> Result<CoverageReportResponse> {
        let url = self.base.url(&["dql", "report", report_id])?;
        let response = self.base.router().get(url, None).await?;
        Ok(response.into())
    }

    /// Download the coverage report for a DQL query.
    pub async fn coverage_report_by_query(&self, query: &str) -> Result<CoverageReportResponse> {
        let url = self.base.url(&["dql", "report"])?;
        let params = with_param(None, "query", query);
        let response = self.base.router().get(url, Some(params)).await?;
        Ok(response.into())
    }
}
