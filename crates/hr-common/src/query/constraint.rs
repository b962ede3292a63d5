use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::Availability;
use crate::store::EmployeeRecord;

/// Hard eligibility predicate. Every variant evaluates against a single record, so the
/// filter engine treats them uniformly.
///
/// The first four variants come out of query interpretation; the remaining ones are
/// produced by structured directory search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Constraint {
    /// All listed (canonical) skills must be present.
    SkillIn { skills: BTreeSet<String> },
    /// Inclusive lower bound on experience.
    MinExperience { years: f64 },
    AvailabilityEquals { availability: Availability },
    /// Case-insensitive department match.
    DepartmentEquals { department: String },
    /// At least one listed skill must be present.
    SkillAny { skills: BTreeSet<String> },
    /// Inclusive upper bound on experience.
    MaxExperience { years: f64 },
    /// Case-insensitive substring of any project name.
    ProjectKeyword { keyword: String },
}

impl Constraint {
    pub fn matches(&self, record: &EmployeeRecord) -> bool {
        match self {
            Constraint::SkillIn { skills } => skills.iter().all(|skill| record.has_skill(skill)),
            Constraint::MinExperience { years } => record.experience_years >= *years,
            Constraint::AvailabilityEquals { availability } => {
                record.availability == *availability
            }
            Constraint::DepartmentEquals { department } => {
                record.department.trim().to_lowercase() == department.trim().to_lowercase()
            }
            Constraint::SkillAny { skills } => skills.iter().any(|skill| record.has_skill(skill)),
            Constraint::MaxExperience { years } => record.experience_years <= *years,
            Constraint::ProjectKeyword { keyword } => {
                let needle = keyword.trim().to_lowercase();
                record
                    .projects
                    .iter()
                    .any(|project| project.to_lowercase().contains(&needle))
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Constraint::SkillIn { .. } => "skill_in",
            Constraint::MinExperience { .. } => "min_experience",
            Constraint::AvailabilityEquals { .. } => "availability_equals",
            Constraint::DepartmentEquals { .. } => "department_equals",
            Constraint::SkillAny { .. } => "skill_any",
            Constraint::MaxExperience { .. } => "max_experience",
            Constraint::ProjectKeyword { .. } => "project_keyword",
        }
    }
}

fn join(skills: &BTreeSet<String>, sep: &str) -> String {
    skills.iter().map(String::as_str).collect::<Vec<_>>().join(sep)
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::SkillIn { skills } => write!(f, "skills: {}", join(skills, " and ")),
            Constraint::MinExperience { years } => write!(f, "at least {years} years"),
            Constraint::AvailabilityEquals { availability } => write!(f, "{availability}"),
            Constraint::DepartmentEquals { department } => write!(f, "department: {department}"),
            Constraint::SkillAny { skills } => write!(f, "skills: {}", join(skills, " or ")),
            Constraint::MaxExperience { years } => write!(f, "at most {years} years"),
            Constraint::ProjectKeyword { keyword } => write!(f, "project: {keyword}"),
        }
    }
}

/// Append unless an equal constraint is already present, keeping first-seen order.
pub fn push_unique(constraints: &mut Vec<Constraint>, constraint: Constraint) {
    if !constraints.contains(&constraint) {
        constraints.push(constraint);
    }
}
