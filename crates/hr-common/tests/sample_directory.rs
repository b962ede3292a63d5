use std::path::PathBuf;

use hr_common::embedding::HashEmbedder;
use hr_common::matching::{DirectorySearch, retrieve_with};
use hr_common::query::{Constraint, QueryInterpreter};
use hr_common::store::{EmployeeSource, JsonFileSource, RecordStore};

fn sample_store() -> (RecordStore, HashEmbedder) {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/employees.json");
    let employees = JsonFileSource::new(path).load_all().unwrap();
    let embedder = HashEmbedder::new(256);
    let store = RecordStore::build(employees, &embedder).unwrap();
    (store, embedder)
}

#[test]
fn sample_directory_loads() {
    let (store, _) = sample_store();
    assert_eq!(store.len(), 12);
    assert!(store.get(9).unwrap().has_skill("golang"));
    assert!(store.vocabulary().resolve_skill("k8s").is_some());
}

#[test]
fn shortlist_members_satisfy_every_constraint() {
    let (store, embedder) = sample_store();
    let interpreter = QueryInterpreter::default();
    let queries = [
        "Find Python developers with 3+ years experience",
        "available AWS and Docker engineers",
        "someone from the Data Science team who knows PyTorch",
        "busy React people",
        "k8s experts with at least 5 years",
    ];

    for query in queries {
        let outcome = retrieve_with(&store, &embedder, &interpreter, query, Some(10)).unwrap();
        assert!(outcome.parsed.has_constraints(), "{query}");
        for candidate in &outcome.payload.candidates {
            let record = store.get(candidate.id).unwrap();
            for constraint in &outcome.parsed.constraints {
                assert!(constraint.matches(record), "{query}: {} fails {constraint}", record.name);
            }
        }
        let scores: Vec<f32> = outcome
            .payload
            .candidates
            .iter()
            .map(|c| c.similarity_score)
            .collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]), "{query}");
    }
}

#[test]
fn top_k_bounds_the_shortlist() {
    let (store, embedder) = sample_store();
    let interpreter = QueryInterpreter::default();
    let outcome =
        retrieve_with(&store, &embedder, &interpreter, "Python developers", Some(2)).unwrap();
    assert_eq!(outcome.payload.candidates.len(), 2);

    let everyone = retrieve_with(&store, &embedder, &interpreter, "anyone at all", Some(20)).unwrap();
    assert_eq!(everyone.payload.candidates.len(), 12);
}

#[test]
fn devops_query_finds_david() {
    let (store, embedder) = sample_store();
    let outcome = retrieve_with(
        &store,
        &embedder,
        &QueryInterpreter::default(),
        "Who knows Kubernetes and Terraform?",
        None,
    )
    .unwrap();
    assert_eq!(
        outcome.parsed.constraints,
        vec![Constraint::SkillIn {
            skills: ["kubernetes".to_string(), "terraform".to_string()].into()
        }]
    );
    let ids: Vec<i64> = outcome.payload.candidates.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![4]);
}

#[test]
fn directory_search_uses_the_same_filters() {
    let (store, _) = sample_store();
    let search = DirectorySearch {
        skills: Some("python".into()),
        department: Some("data science".into()),
        availability: Some("available".into()),
        ..Default::default()
    };
    let ids: Vec<i64> = search.run(&store).unwrap().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![3, 6, 11]);
}
