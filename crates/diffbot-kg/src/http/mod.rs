//! HTTP layer: session, admission control, requests and routing

pub use limiter::{ConcurrencyLimiter, DEFAULT_MAX_CONCURRENCY};
pub use request::RequestBuilder;
pub use router::{
    DEFAULT_URL_LENGTH_THRESHOLD, Router, Transport, encoded_url_length, select_transport,
};
pub use session::{Session, SessionConfig};

mod limiter;
mod request;
mod router;
mod session;

// Re-export HTTP types from the http crate for convenience
pub use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
