//! Common test utilities and helpers

use diffbot_kg::{ClientConfig, EnhanceClient, SearchClient};
use std::collections::BTreeMap;
use std::path::Path;
use wiremock::MockServer;
use wiremock::matchers::{PathExactMatcher, path};

/// Token used by every test client
#[allow(dead_code)]
pub const TEST_TOKEN: &str = "test-token-0123456789abcdef";

/// Load a response fixture by file name
#[allow(dead_code)]
pub fn load_fixture(name: &str) -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let path = Path::new(manifest_dir)
        .join("tests")
        .join("fixtures")
        .join("responses")
        .join(name);

    std::fs::read_to_string(&path).unwrap_or_else(|e| {
        panic!(
            "Failed to load response fixture '{}' from {:?}: {}",
            name, path, e
        )
    })
}

/// Base URL of the mock API, mirroring the real `/kg/v3/` root
#[allow(dead_code)]
pub fn base_url(server: &MockServer) -> String {
    format!("{}/kg/v3/", server.uri())
}

/// Matcher for a path under the API root
#[allow(dead_code)]
pub fn api_path(endpoint: &str) -> PathExactMatcher {
    path(format!("/kg/v3/{endpoint}"))
}

/// Client configuration pointing at the mock server
#[allow(dead_code)]
pub fn config(server: &MockServer) -> ClientConfig {
    ClientConfig::builder()
        .token(TEST_TOKEN)
        .base_url(base_url(server))
        .build()
}

/// Search client pointing at the mock server
#[allow(dead_code)]
pub fn search_client(server: &MockServer) -> SearchClient {
    SearchClient::from_config(config(server)).expect("Failed to build search client")
}

/// Enhance client pointing at the mock server
#[allow(dead_code)]
pub fn enhance_client(server: &MockServer) -> EnhanceClient {
    EnhanceClient::from_config(config(server)).expect("Failed to build enhance client")
}

/// Decoded query string of a received request
#[allow(dead_code)]
pub fn query_pairs(request: &wiremock::Request) -> BTreeMap<String, String> {
    request.url.query_pairs().into_owned().collect()
}

/// Every request the mock server has seen so far
#[allow(dead_code)]
pub async fn received(server: &MockServer) -> Vec<wiremock::Request> {
    server
        .received_requests()
        .await
        .expect("request recording is enabled by default")
}

/// Route client logs to the test output. Filter with `RUST_LOG`.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
