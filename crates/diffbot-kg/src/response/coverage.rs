use super::{DiffbotResponse, typed_response};

/// A coverage report, delivered as CSV text.
#[derive(Debug, Clone)]
pub struct CoverageReportResponse(DiffbotResponse);

typed_response!(CoverageReportResponse);

impl CoverageReportResponse {
    /// The report as returned. Empty if the body was not text.
    pub fn report(&self) -> &str {
        self.text().unwrap_or_default()
    }

    /// Non-empty lines of the report, header row included.
    pub fn rows(&self) -> impl Iterator<Item = &str> {
        self.report()
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
    }
}
