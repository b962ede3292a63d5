use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

use regex::Regex;

use super::patterns::department_pattern;
use crate::skill_normalizer::lookup_alias;
use crate::store::EmployeeRecord;

#[derive(Debug, Clone)]
struct DepartmentCue {
    name: String,
    pattern: Regex,
}

/// Skills and departments present in a store snapshot. Query phrases only become hard
/// constraints when they name something in here.
#[derive(Debug, Clone, Default)]
pub struct QueryVocabulary {
    skills: BTreeSet<String>,
    departments: Vec<DepartmentCue>,
}

impl QueryVocabulary {
    pub fn from_records(records: &[EmployeeRecord]) -> Self {
        let skills = records
            .iter()
            .flat_map(|record| record.skills.iter().cloned())
            .collect();

        // first spelling wins; records arrive in id order
        let mut departments: BTreeMap<String, String> = BTreeMap::new();
        for record in records {
            let name = record.department.trim();
            if name.is_empty() {
                continue;
            }
            departments
                .entry(name.to_lowercase())
                .or_insert_with(|| name.to_string());
        }

        Self::new(skills, departments.into_values())
    }

    pub fn new(skills: BTreeSet<String>, departments: impl IntoIterator<Item = String>) -> Self {
        let departments = departments
            .into_iter()
            .filter_map(|name| {
                department_pattern(&name).map(|pattern| DepartmentCue { name, pattern })
            })
            .collect();
        Self {
            skills,
            departments,
        }
    }

    pub fn skill_count(&self) -> usize {
        self.skills.len()
    }

    pub fn department_count(&self) -> usize {
        self.departments.len()
    }

    pub fn skills(&self) -> impl Iterator<Item = &str> {
        self.skills.iter().map(String::as_str)
    }

    /// Canonical skill named by `phrase`, if any employee has it.
    pub fn resolve_skill(&self, phrase: &str) -> Option<String> {
        let lowered = phrase.trim().to_lowercase();
        if lowered.is_empty() {
            return None;
        }
        if self.skills.contains(&lowered) {
            return Some(lowered);
        }
        lookup_alias(&lowered)
            .filter(|canonical| self.skills.contains(*canonical))
            .map(str::to_string)
    }

    /// Earliest department mention with a cue word ("in Design", "Sales team"). Longer
    /// names win when two mentions start at the same offset.
    pub fn find_department(&self, text: &str) -> Option<(String, Range<usize>)> {
        self.departments
            .iter()
            .filter_map(|cue| cue.pattern.find(text).map(|m| (&cue.name, m.range())))
            .min_by(|(_, a), (_, b)| a.start.cmp(&b.start).then(b.len().cmp(&a.len())))
            .map(|(name, span)| (name.clone(), span))
    }
}
