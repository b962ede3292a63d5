use std::collections::BTreeSet;

use serde::Deserialize;

use crate::query::{Constraint, push_unique};
use crate::skill_normalizer::normalize_skill;
use crate::store::{EmployeeRecord, RecordStore};
use crate::{Availability, RetrievalError};

/// Structured directory filter (`GET /api/employees/search`). Every field is optional;
/// all given fields must hold. `skills` is comma-separated and matches any listed skill.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DirectorySearch {
    pub skills: Option<String>,
    pub min_experience: Option<f64>,
    pub max_experience: Option<f64>,
    pub department: Option<String>,
    pub availability: Option<String>,
    pub project_keyword: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn experience_bound(name: &str, value: Option<f64>) -> Result<Option<f64>, RetrievalError> {
    match value {
        Some(years) if !years.is_finite() || years < 0.0 => Err(RetrievalError::InvalidQuery(
            format!("{name} must be a non-negative number"),
        )),
        other => Ok(other),
    }
}

impl DirectorySearch {
    /// Translate into the same constraint variants the query pipeline uses.
    pub fn constraints(&self) -> Result<Vec<Constraint>, RetrievalError> {
        let mut constraints = Vec::new();

        if let Some(raw) = non_blank(&self.skills) {
            let skills: BTreeSet<String> = raw
                .split(',')
                .map(normalize_skill)
                .filter(|skill| !skill.is_empty())
                .collect();
            if !skills.is_empty() {
                push_unique(&mut constraints, Constraint::SkillAny { skills });
            }
        }

        let min = experience_bound("min_experience", self.min_experience)?;
        let max = experience_bound("max_experience", self.max_experience)?;
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(RetrievalError::InvalidQuery(format!(
                    "min_experience {min} exceeds max_experience {max}"
                )));
            }
        }
        if let Some(years) = min {
            push_unique(&mut constraints, Constraint::MinExperience { years });
        }
        if let Some(years) = max {
            push_unique(&mut constraints, Constraint::MaxExperience { years });
        }

        if let Some(raw) = non_blank(&self.availability) {
            let availability: Availability = raw.parse().map_err(|_| {
                RetrievalError::InvalidQuery(format!(
                    "availability must be one of available, busy, unavailable; got {raw:?}"
                ))
            })?;
            push_unique(&mut constraints, Constraint::AvailabilityEquals { availability });
        }

        if let Some(department) = non_blank(&self.department) {
            push_unique(
                &mut constraints,
                Constraint::DepartmentEquals {
                    department: department.to_string(),
                },
            );
        }

        if let Some(keyword) = non_blank(&self.project_keyword) {
            push_unique(
                &mut constraints,
                Constraint::ProjectKeyword {
                    keyword: keyword.to_string(),
                },
            );
        }

        Ok(constraints)
    }

    /// Matching records in ascending id order.
    pub fn run<'a>(&self, store: &'a RecordStore) -> Result<Vec<&'a EmployeeRecord>, RetrievalError> {
        let constraints = self.constraints()?;
        Ok(store
            .records()
            .iter()
            .filter(|record| constraints.iter().all(|c| c.matches(record)))
            .collect())
    }
}
