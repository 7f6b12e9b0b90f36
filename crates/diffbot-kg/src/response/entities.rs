use super::{DiffbotResponse, typed_response};
use serde_json::Value;

/// Search and enhance results: `{"hits": n, "data": [{"entity": {...}}, ...]}`.
#[derive(Debug, Clone)]
pub struct EntitiesResponse(DiffbotResponse);

typed_response!(EntitiesResponse);

impl EntitiesResponse {
    /// Total number of matches reported by the API.
    pub fn hits(&self) -> Option<u64> {
        self.json().and_then(|body| body.get("hits")).and_then(Value::as_u64)
    }

    /// The `data` records, empty if the body has none.
    pub fn data(&self) -> &[Value] {
        data_of(self.json())
    }

    /// The `entity` of each `data` record, skipping records without one.
    pub fn entities(&self) -> Vec<&Value> {
        entities_of(self.json())
    }
}

pub(super) fn data_of(body: Option<&Value>) -> &[Value] {
    body.and_then(|body| body.get("data"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

pub(super) fn entities_of(body: Option<&Value>) -> Vec<&Value> {
    data_of(body)
        .iter()
        .filter_map(|record| record.get("entity"))
        .collect()
}
