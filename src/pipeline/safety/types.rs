use serde::Serialize;

use crate::pipeline::structuring::types::ExtractedTest;

/// Response status. Verification never fails, so `ok` is the only value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Ok,
}

/// The only entity returned to callers.
///
/// Built once by the guardrail and read-only afterwards; every test in it
/// passed name verification against the source text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifiedResult {
    tests: Vec<ExtractedTest>,
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    status: ResultStatus,
}

impl VerifiedResult {
    pub(crate) fn new(
        tests: Vec<ExtractedTest>,
        summary: String,
        warnings: Option<Vec<String>>,
    ) -> Self {
        Self {
            tests,
            summary,
            warnings,
            status: ResultStatus::Ok,
        }
    }

    pub fn tests(&self) -> &[ExtractedTest] {
        &self.tests
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn warnings(&self) -> Option<&[String]> {
        self.warnings.as_deref()
    }

    pub fn status(&self) -> ResultStatus {
        self.status
    }
}
