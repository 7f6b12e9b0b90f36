//! # diffbot-kg
//!
//! Async Rust client for the Diffbot Knowledge Graph API:
//! - DQL search and search coverage reports
//! - Entity enhancement
//! - Bulk enhancement jobs: create, poll, download, stop
//! - Bounded concurrency and optional requests-per-second pacing
//! - Automatic GET/POST selection for long queries
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use diffbot_kg::{EnhanceClient, Params, Resource, SearchClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let search = SearchClient::new("your-token")?;
//!     let response = search
//!         .search(Params::new().with("query", "type:Organization name:\"Diffbot\""))
//!         .await?;
//!     println!("{:?} hits", response.hits());
//!
//!     let enhance = EnhanceClient::with_session(
//!         diffbot_kg::ClientConfig::with_token("your-token"),
//!         search.session().clone(),
//!     )?;
//!     let org = enhance
//!         .enhance(Params::new().with("type", "Organization").with("name", "Diffbot"))
//!         .await?;
//!     println!("{:?}", org.entities().first());
//!
//!     search.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Errors and retries
//!
//! Requests are never retried implicitly. A failed call returns an
//! [`Error`]; [`Error::is_retryable`] says whether trying again could help
//! and [`retry::retry_with_backoff`] does it for you.

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Re-export commonly used types
pub use config::{ClientConfig, ClientConfigBuilder, ConnectionPoolConfig, RateLimitConfig};
pub use error::{Error, Result};
pub use http::{Router, Session, SessionConfig, Transport};
pub use params::Params;
pub use resources::{BaseClient, EnhanceClient, PollOptions, Resource, SearchClient};
pub use response::{
    BulkJobCreateResponse, BulkJobResultsResponse, BulkJobStatusResponse, Content, ContentKind,
    CoverageReportResponse, DiffbotResponse, EntitiesResponse, ListBulkJobsResponse,
};

// Module declarations
pub mod config;
pub mod error;
pub mod http;
pub mod observability;
pub mod params;
pub mod resources;
pub mod response;
pub mod retry;

// Re-export key dependencies for convenience
pub use diffbot_kg_core;
pub use serde_json::Value as JsonValue;

/// Prelude module for common imports
///
/// # Examples
///
/// ```rust
/// use diffbot_kg::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        ClientConfig, DiffbotResponse, EnhanceClient, Error, Params, PollOptions, Resource,
        Result, SearchClient,
        retry::{ExponentialBackoff, retry_with_backoff},
    };
}

/// SDK version, automatically updated from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://kg.diffbot.com/kg/v3/";
