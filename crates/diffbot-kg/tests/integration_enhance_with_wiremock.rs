//! Integration tests for the enhance client and bulk jobs using wiremock

mod common;

use assert_matches::assert_matches;
use diffbot_kg::retry::ExponentialBackoff;
use diffbot_kg::{
    ClientConfig, EnhanceClient, Error, Params, PollOptions, Resource, SearchClient, Session,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{body_json, method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const JOB_ID: &str = "job-123";

fn status_body(status: &str) -> Value {
    json!({
        "content": {
            "job_id": JOB_ID,
            "status": status,
            "reports": [{"reportId": "report-1"}]
        }
    })
}

fn fast_polling(timeout: Duration) -> PollOptions {
    PollOptions::default().timeout(timeout).backoff(
        ExponentialBackoff::builder()
            .initial_delay(Duration::from_millis(10))
            .multiplier(1.5)
            .max_delay(Duration::from_millis(50))
            .jitter(0.0)
            .build(),
    )
}

#[tokio::test]
async fn test_enhance_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(common::api_path("enhance"))
        .and(query_param("token", common::TEST_TOKEN))
        .and(query_param("type", "Organization"))
        .and(query_param("name", "Diffbot"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            common::load_fixture("enhance_organization.json"),
            "application/json",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = common::enhance_client(&mock_server);
    let response = client
        .enhance(
            Params::new()
                .with("type", "Organization")
                .with("name", "Diffbot"),
        )
        .await
        .expect("Enhance failed");

    let entities = response.entities();
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0]["id"], "EKSmr0FrCMm2y6Q1c6ZHxTQ");
    assert_eq!(entities[0]["nbEmployees"], 50);

    mock_server.verify().await;
}

#[tokio::test]
async fn test_create_bulkjob() {
    let mock_server = MockServer::start().await;
    let data = vec![
        json!({"type": "Organization", "name": "Diffbot"}),
        json!({"type": "Organization", "name": "Apple"}),
    ];

    Mock::given(method("POST"))
        .and(common::api_path("enhance/bulk"))
        .and(query_param("token", common::TEST_TOKEN))
        .and(query_param("size", "1"))
        .and(body_json(json!(data.clone())))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "job_id": JOB_ID,
            "status": "SUBMITTED"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = common::enhance_client(&mock_server);
    let response = client
        .create_bulkjob(data, Some(Params::new().with("size", 1)))
        .await
        .expect("Create failed");

    assert_eq!(response.status(), 202);
    assert_eq!(response.job_id().unwrap(), JOB_ID);

    mock_server.verify().await;
}

#[tokio::test]
async fn test_list_bulkjobs() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(common::api_path("enhance/bulk/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"job_id": "job-001", "status": "COMPLETE"},
            {"job_id": JOB_ID, "status": "RUNNING"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = common::enhance_client(&mock_server);
    let response = client.list_bulkjobs().await.unwrap();

    assert_eq!(response.jobs().len(), 2);
    assert_eq!(response.find(JOB_ID).unwrap()["status"], "RUNNING");
    assert!(response.find("job-999").is_none());

    mock_server.verify().await;
}

#[tokio::test]
async fn test_bulkjob_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(common::api_path("enhance/bulk/job-123/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("RUNNING")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = common::enhance_client(&mock_server);
    let status = client.bulkjob_status(JOB_ID).await.unwrap();

    assert_eq!(status.job_id().unwrap(), JOB_ID);
    assert_eq!(status.job_status(), Some("RUNNING"));
    assert!(!status.is_complete());
    assert_eq!(status.reports().len(), 1);

    mock_server.verify().await;
}

#[tokio::test]
async fn test_bulkjob_results() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(common::api_path("enhance/bulk/job-123"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(
                    common::load_fixture("bulkjob_results.jsonl"),
                    "application/json-lines",
                )
                .insert_header("x-diffbot-reportid", "report-1"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = common::enhance_client(&mock_server);
    let results = client.bulkjob_results(JOB_ID).await.unwrap();

    assert_eq!(results.blocks().len(), 2);
    assert_eq!(results.job_id().unwrap(), JOB_ID);
    assert_eq!(results.report_id(), Some("report-1"));

    let names: Vec<_> = results
        .entities()
        .iter()
        .map(|entity| entity["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Diffbot", "Apple Inc."]);

    mock_server.verify().await;
}

#[tokio::test]
async fn test_single_bulkjob_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(common::api_path("enhance/bulk/job-123/0"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            common::load_fixture("enhance_organization.json"),
            "application/json",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = common::enhance_client(&mock_server);
    let result = client.single_bulkjob_result(JOB_ID, 0).await.unwrap();
    assert_eq!(result.entities()[0]["name"], "Diffbot");

    mock_server.verify().await;
}

#[tokio::test]
async fn test_bulkjob_coverage_report() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(common::api_path("enhance/bulk/job-123/coverage/report-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(common::load_fixture("coverage_report.csv"), "text/csv"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = common::enhance_client(&mock_server);
    let report = client
        .bulkjob_coverage_report(JOB_ID, "report-1")
        .await
        .unwrap();
    assert_eq!(report.rows().next(), Some("field,coverage,count"));

    mock_server.verify().await;
}

#[tokio::test]
async fn test_stop_bulkjob() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(common::api_path("enhance/bulk/job-123/stop"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "job_id": JOB_ID,
            "status": "STOPPED",
            "message": "Job stopped"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = common::enhance_client(&mock_server);
    let stopped = client.stop_bulkjob(JOB_ID).await.unwrap();

    assert_eq!(stopped.job_id().unwrap(), JOB_ID);
    assert_eq!(stopped.job_status(), Some("STOPPED"));
    assert_eq!(stopped.message(), Some("Job stopped"));

    mock_server.verify().await;
}

#[tokio::test]
async fn test_wait_for_bulkjob_polls_until_complete() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(common::api_path("enhance/bulk/job-123/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("RUNNING")))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(common::api_path("enhance/bulk/job-123/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("COMPLETE")))
        .mount(&mock_server)
        .await;

    let client = common::enhance_client(&mock_server);
    let status = client
        .wait_for_bulkjob(JOB_ID, fast_polling(Duration::from_secs(5)))
        .await
        .expect("Job should complete");

    assert!(status.is_complete());
    assert_eq!(common::received(&mock_server).await.len(), 3);
}

#[tokio::test]
async fn test_wait_for_bulkjob_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(common::api_path("enhance/bulk/job-123/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("RUNNING")))
        .mount(&mock_server)
        .await;

    let client = common::enhance_client(&mock_server);
    let timeout = Duration::from_millis(200);
    let error = client
        .wait_for_bulkjob(JOB_ID, fast_polling(timeout))
        .await
        .unwrap_err();

    assert_matches!(error, Error::Timeout(d) if d == timeout);
    assert!(common::received(&mock_server).await.len() >= 2);
}

#[tokio::test]
async fn test_wait_for_bulkjob_propagates_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(common::api_path("enhance/bulk/job-123/status"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Unknown job"))
        .mount(&mock_server)
        .await;

    let client = common::enhance_client(&mock_server);
    let error = client
        .wait_for_bulkjob(JOB_ID, fast_polling(Duration::from_secs(5)))
        .await
        .unwrap_err();

    assert_matches!(error, Error::Client { status: 404, .. });
}

#[tokio::test]
async fn test_clients_share_one_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            common::load_fixture("enhance_organization.json"),
            "application/json",
        ))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = common::config(&mock_server);
    let session = Session::new(config.session_config());
    let search = SearchClient::with_session(config.clone(), session.clone()).unwrap();
    let enhance = EnhanceClient::with_session(config, session.clone()).unwrap();

    search
        .search(Params::new().with("query", "type:Organization"))
        .await
        .unwrap();
    enhance
        .enhance(Params::new().with("name", "Diffbot"))
        .await
        .unwrap();

    assert_eq!(session.pools_created(), 1);

    enhance.close();
    assert!(!search.session().is_open());

    mock_server.verify().await;
}

#[tokio::test]
async fn test_enhance_rejects_search_only_params() {
    let config = ClientConfig::builder()
        .token(common::TEST_TOKEN)
        .default_param("filter", "x")
        .build();
    assert_matches!(
        EnhanceClient::from_config(config),
        Err(Error::InvalidParam(ref key)) if key == "filter"
    );
}
