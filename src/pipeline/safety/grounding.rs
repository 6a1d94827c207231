use std::collections::BTreeSet;

use super::similarity::{NormalizedLevenshtein, Similarity};
use super::types::VerifiedResult;
use crate::pipeline::extraction::RawReportText;
use crate::pipeline::structuring::types::{CandidateResult, ExtractedTest};

/// Minimum similarity between a test name and some source word.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;

/// Leading text of the single warning emitted when tests are dropped.
pub const DROPPED_TESTS_WARNING_PREFIX: &str = "Guardrail triggered: the following tests were \
     excluded because they could not be verified against the source report: ";

/// Post-generation check that every reported test is grounded in the OCR text.
///
/// Policy is verify-or-drop: a test whose name has no close match among the
/// source words is removed and named in a warning. The request never fails
/// here. Only names are checked; value, unit and status pass through as the
/// model produced them, and the summary is copied without re-verification.
pub struct ResultGuardrail {
    similarity: Box<dyn Similarity>,
    threshold: f64,
}

impl ResultGuardrail {
    pub fn new(similarity: Box<dyn Similarity>, threshold: f64) -> Self {
        Self {
            similarity,
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn verify(&self, candidate: &CandidateResult, raw_text: &RawReportText) -> VerifiedResult {
        let words: BTreeSet<String> = raw_text.lowercase_words().collect();

        let mut accepted: Vec<ExtractedTest> = Vec::with_capacity(candidate.tests.len());
        let mut dropped: Vec<&str> = Vec::new();

        for test in &candidate.tests {
            if test.name.is_empty() {
                tracing::debug!("Skipping test entry with empty name");
                continue;
            }

            let best = self.best_score(&test.name.to_lowercase(), &words);
            if best >= self.threshold {
                accepted.push(test.clone());
            } else {
                tracing::warn!(
                    test = %test.name,
                    best_score = best,
                    threshold = self.threshold,
                    "Dropping test not found in source text"
                );
                dropped.push(&test.name);
            }
        }

        tracing::info!(
            accepted = accepted.len(),
            dropped = dropped.len(),
            "Guardrail verification finished"
        );

        let warnings = if dropped.is_empty() {
            None
        } else {
            Some(vec![format!(
                "{DROPPED_TESTS_WARNING_PREFIX}{}",
                dropped.join(", ")
            )])
        };

        VerifiedResult::new(accepted, candidate.summary.clone(), warnings)
    }

    /// Highest similarity between `name` and any source word; 0.0 if none.
    fn best_score(&self, name: &str, words: &BTreeSet<String>) -> f64 {
        if words.contains(name) {
            return 1.0;
        }
        words
            .iter()
            .map(|word| self.similarity.similarity(name, word))
            .fold(0.0, f64::max)
    }
}

impl Default for ResultGuardrail {
    fn default() -> Self {
        Self::new(Box::new(NormalizedLevenshtein), DEFAULT_SIMILARITY_THRESHOLD)
    }
}
