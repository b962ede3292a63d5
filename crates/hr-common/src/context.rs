use std::fmt::Write;

use serde::Serialize;

use crate::matching::RankedCandidate;
use crate::query::Constraint;
use crate::Availability;

/// Marker carried by a payload whose shortlist is empty.
pub const NO_CANDIDATES_MARKER: &str = "NO_CANDIDATES_FOUND";

/// One shortlisted employee as the generation step sees it. Fields are declared in render
/// order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateContext {
    pub rank: usize,
    pub id: i64,
    pub name: String,
    pub role: String,
    pub department: String,
    pub experience_years: f64,
    pub skills: Vec<String>,
    pub availability: Availability,
    pub projects: Vec<String>,
    pub similarity_score: f32,
    pub matched_constraints: Vec<Constraint>,
}

impl CandidateContext {
    fn from_ranked(rank: usize, candidate: &RankedCandidate<'_>) -> Self {
        let record = candidate.record;
        Self {
            rank,
            id: record.id,
            name: record.name.clone(),
            role: record.role.clone(),
            department: record.department.clone(),
            experience_years: record.experience_years,
            skills: record.skill_labels.clone(),
            availability: record.availability,
            projects: record.projects.clone(),
            similarity_score: candidate.similarity_score,
            matched_constraints: candidate.matched_constraints.clone(),
        }
    }

    /// Stable multi-line block used in prompts and snapshot tests.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}. {} ({})", self.rank, self.name, role_label(self));
        let _ = writeln!(out, "   - Department: {}", or_dash(&self.department));
        let _ = writeln!(out, "   - Experience: {} years", self.experience_years);
        let _ = writeln!(out, "   - Skills: {}", join_or_dash(&self.skills));
        let _ = writeln!(out, "   - Availability: {}", self.availability);
        let _ = writeln!(out, "   - Key Projects: {}", join_or_dash(&self.projects));
        out
    }
}

fn role_label(candidate: &CandidateContext) -> &str {
    if candidate.role.trim().is_empty() {
        "role not listed"
    } else {
        &candidate.role
    }
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}

fn join_or_dash(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}

/// Everything the generation step receives. Identical inputs produce byte-identical
/// payloads and prompts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationPayload {
    pub query: String,
    pub candidates: Vec<CandidateContext>,
    pub no_candidates: bool,
    /// [`NO_CANDIDATES_MARKER`] when the shortlist is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<&'static str>,
    pub context_text: String,
}

impl GenerationPayload {
    pub fn is_empty(&self) -> bool {
        self.no_candidates
    }

    /// Instruction prompt for an instruction-tuned model.
    pub fn render_prompt(&self) -> String {
        if self.no_candidates {
            return format!(
                "[INST] You are an HR assistant. A user asked: \"{query}\"\n\n\
                 {marker}: no employees match these criteria. Explain that no matches were \
                 found and suggest how the request could be broadened.\n\n\
                 Respond in a professional, helpful tone. [/INST]",
                query = self.query,
                marker = NO_CANDIDATES_MARKER,
            );
        }

        format!(
            "[INST] You are an HR assistant helping to staff projects.\n\n\
             User Query: \"{query}\"\n\n\
             Most relevant employees, best match first:\n\n{context}\n\
             Write a short, friendly answer that presents these candidates in the order \
             given, explains why each one fits, and mentions their availability. Do not \
             mention anyone who is not listed. [/INST]",
            query = self.query,
            context = self.context_text,
        )
    }
}

/// Pure formatting boundary between the retrieval core and generation: no ranking, no
/// filtering.
pub fn assemble(raw_text: &str, shortlist: &[RankedCandidate<'_>]) -> GenerationPayload {
    let candidates: Vec<CandidateContext> = shortlist
        .iter()
        .enumerate()
        .map(|(idx, candidate)| CandidateContext::from_ranked(idx + 1, candidate))
        .collect();

    let no_candidates = candidates.is_empty();
    let context_text = if no_candidates {
        NO_CANDIDATES_MARKER.to_string()
    } else {
        candidates
            .iter()
            .map(CandidateContext::render)
            .collect::<Vec<_>>()
            .join("\n")
    };

    GenerationPayload {
        query: raw_text.to_string(),
        candidates,
        no_candidates,
        marker: no_candidates.then_some(NO_CANDIDATES_MARKER),
        context_text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::rank_by_vector;
    use crate::store::tests::employee;
    use crate::store::{EmbedderInfo, RecordStore, ValidatedEmployees};

    fn store() -> RecordStore {
        let mut alice = employee(1, "Alice", &["Python", "AWS"], 5.0);
        alice.projects = vec!["Healthcare Portal".into(), "Billing".into()];
        let mut bob = employee(2, "Bob", &["Java"], 2.0);
        bob.availability = Availability::Busy;
        bob.role = String::new();
        let info = EmbedderInfo {
            name: "fixed".into(),
            version: "test".into(),
            dimension: 2,
        };
        let employees = ValidatedEmployees::new(vec![alice, bob]).unwrap();
        RecordStore::from_embeddings(employees, vec![vec![1.0, 0.0], vec![0.5, 0.5]], info).unwrap()
    }

    #[test]
    fn renders_candidates_in_fixed_field_order() {
        let store = store();
        let ranked = rank_by_vector(&[1.0, 0.0], store.records());
        let payload = assemble("python people", &ranked);

        assert!(!payload.no_candidates);
        assert_eq!(payload.marker, None);
        assert_eq!(payload.candidates[0].rank, 1);
        assert_eq!(
            payload.candidates[0].render(),
            "1. Alice (Developer)\n   - Department: Engineering\n   - Experience: 5 years\n   \
             - Skills: Python, AWS\n   - Availability: available\n   \
             - Key Projects: Healthcare Portal, Billing\n"
        );
        assert!(payload.candidates[1].render().starts_with("2. Bob (role not listed)"));
        assert!(payload.context_text.contains("Key Projects: -"));
    }

    #[test]
    fn identical_input_gives_identical_payload() {
        let store = store();
        let first = assemble("q", &rank_by_vector(&[1.0, 0.0], store.records()));
        let second = assemble("q", &rank_by_vector(&[1.0, 0.0], store.records()));
        assert_eq!(first, second);
        assert_eq!(first.render_prompt(), second.render_prompt());
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn empty_shortlist_carries_the_marker() {
        let payload = assemble("Find Rust wizards", &[]);
        assert!(payload.no_candidates);
        assert_eq!(payload.marker, Some(NO_CANDIDATES_MARKER));
        assert_eq!(payload.query, "Find Rust wizards");
        assert!(payload.render_prompt().contains(NO_CANDIDATES_MARKER));
        assert!(payload.render_prompt().contains("Find Rust wizards"));
    }

    #[test]
    fn prompt_lists_candidates_in_order() {
        let store = store();
        let payload = assemble("anyone", &rank_by_vector(&[1.0, 0.0], store.records()));
        let prompt = payload.render_prompt();
        let alice = prompt.find("1. Alice").unwrap();
        let bob = prompt.find("2. Bob").unwrap();
        assert!(alice < bob);
        assert!(prompt.starts_with("[INST]"));
        assert!(prompt.ends_with("[/INST]"));
    }
}
