//! Bulk enhancement job responses.

use super::entities::entities_of;
use super::{DiffbotResponse, typed_response};
use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// Header carrying the coverage report id of a bulk result download.
pub const REPORT_ID_HEADER: &str = "x-diffbot-reportid";

/// Status value of a finished job.
const COMPLETE: &str = "COMPLETE";

/// Reply to creating a bulk job: `{"job_id": "...", ...}`.
#[derive(Debug, Clone)]
pub struct BulkJobCreateResponse(DiffbotResponse);

typed_response!(BulkJobCreateResponse);

impl BulkJobCreateResponse {
    /// Id of the new job.
    pub fn job_id(&self) -> Result<&str> {
        self.json()
            .and_then(|body| body.get("job_id"))
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Lookup("No job_id found in bulk job create response".into()))
    }
}

/// Status of one bulk job.
///
/// The status endpoint nests the block under `content`; the stop endpoint
/// returns it at the top level. Both shapes are accepted.
#[derive(Debug, Clone)]
pub struct BulkJobStatusResponse(DiffbotResponse);

typed_response!(BulkJobStatusResponse);

impl BulkJobStatusResponse {
    fn block(&self) -> Option<&Map<String, Value>> {
        let body = self.json()?.as_object()?;
        match body.get("content").and_then(Value::as_object) {
            Some(inner) => Some(inner),
            None => Some(body),
        }
    }

    fn field(&self, name: &str) -> Option<&Value> {
        self.block().and_then(|block| block.get(name))
    }

    /// Id of the job this status describes.
    pub fn job_id(&self) -> Result<&str> {
        self.field("job_id")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Lookup("No job_id found in bulk job status response".into()))
    }

    /// Raw status string, such as `RUNNING` or `COMPLETE`.
    pub fn job_status(&self) -> Option<&str> {
        self.field("status").and_then(Value::as_str)
    }

    /// Whether the job has finished.
    pub fn is_complete(&self) -> bool {
        self.job_status() == Some(COMPLETE)
    }

    /// Coverage reports produced so far.
    pub fn reports(&self) -> &[Value] {
        self.field("reports")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Free-form message, present on stop replies.
    pub fn message(&self) -> Option<&str> {
        self.field("message").and_then(Value::as_str)
    }
}

/// Every bulk job owned by the token: a JSON array of job descriptions.
#[derive(Debug, Clone)]
pub struct ListBulkJobsResponse(DiffbotResponse);

typed_response!(ListBulkJobsResponse);

impl ListBulkJobsResponse {
    /// All listed jobs.
    pub fn jobs(&self) -> &[Value] {
        self.json()
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The job with the given id, if listed.
    pub fn find(&self, job_id: &str) -> Option<&Value> {
        self.jobs()
            .iter()
            .find(|job| job.get("job_id").and_then(Value::as_str) == Some(job_id))
    }
}

/// Full results of a bulk job: one entities block per submitted request.
///
/// Usually delivered as JSON-lines; a plain JSON array is accepted too.
#[derive(Debug, Clone)]
pub struct BulkJobResultsResponse(DiffbotResponse);

typed_response!(BulkJobResultsResponse);

impl BulkJobResultsResponse {
    /// Result blocks in response order.
    pub fn blocks(&self) -> &[Value] {
        if let Some(lines) = self.lines() {
            return lines;
        }
        self.json()
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Id of the job, taken from the first block that records it.
    pub fn job_id(&self) -> Result<&str> {
        self.blocks()
            .iter()
            .find_map(|block| {
                block
                    .pointer("/request_ctx/query_ctx/bulkjobId")
                    .and_then(Value::as_str)
            })
            .ok_or_else(|| Error::Lookup("No bulkjobId found in bulk job results".into()))
    }

    /// Coverage report id from the `X-Diffbot-ReportId` header.
    pub fn report_id(&self) -> Option<&str> {
        self.header(REPORT_ID_HEADER)
    }

    /// Entities of every block, flattened in order.
    pub fn entities(&self) -> Vec<&Value> {
        self.blocks()
            .iter()
            .flat_map(|block| entities_of(Some(block)))
            .collect()
    }
}
