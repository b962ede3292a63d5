use std::fmt::Write;

use super::{GenerationError, Generator};
use crate::context::GenerationPayload;

/// Deterministic fallback used when no language model is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateGenerator;

impl Generator for TemplateGenerator {
    fn name(&self) -> &'static str {
        "template"
    }

    fn generate(&self, payload: &GenerationPayload) -> Result<String, GenerationError> {
        if payload.no_candidates {
            return Ok(
                "No employees found matching your criteria. Please try a different query.".into(),
            );
        }

        let mut out = format!(
            "Found {} relevant employee{} for your query. Here are the top matches:\n",
            payload.candidates.len(),
            if payload.candidates.len() == 1 { "" } else { "s" }
        );
        for candidate in &payload.candidates {
            let role = if candidate.role.trim().is_empty() {
                "team member"
            } else {
                candidate.role.as_str()
            };
            let _ = write!(
                out,
                "\n- {} - {} with {} years experience ({})",
                candidate.name, role, candidate.experience_years, candidate.availability
            );
        }
        Ok(out)
    }
}
