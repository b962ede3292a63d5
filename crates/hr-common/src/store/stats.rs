use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::EmployeeRecord;
use crate::Availability;

const TOP_SKILLS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillCount {
    pub skill: String,
    pub employees: usize,
}

/// Directory summary served by `/api/employees/stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectoryStats {
    pub total_employees: usize,
    pub available_employees: usize,
    pub busy_employees: usize,
    pub unavailable_employees: usize,
    pub average_experience: f64,
    pub departments: BTreeMap<String, usize>,
    pub top_skills: Vec<SkillCount>,
}

pub fn compute(records: &[EmployeeRecord]) -> DirectoryStats {
    let mut by_availability: HashMap<Availability, usize> = HashMap::new();
    let mut departments: BTreeMap<String, usize> = BTreeMap::new();
    let mut skills: HashMap<&str, usize> = HashMap::new();
    let mut total_experience = 0.0;

    for record in records {
        *by_availability.entry(record.availability).or_default() += 1;
        let department = if record.department.trim().is_empty() {
            "Unknown".to_string()
        } else {
            record.department.clone()
        };
        *departments.entry(department).or_default() += 1;
        for skill in &record.skills {
            *skills.entry(skill.as_str()).or_default() += 1;
        }
        total_experience += record.experience_years;
    }

    let average_experience = if records.is_empty() {
        0.0
    } else {
        (total_experience / records.len() as f64 * 10.0).round() / 10.0
    };

    let mut top_skills: Vec<SkillCount> = skills
        .into_iter()
        .map(|(skill, employees)| SkillCount {
            skill: skill.to_string(),
            employees,
        })
        .collect();
    top_skills.sort_by(|a, b| b.employees.cmp(&a.employees).then_with(|| a.skill.cmp(&b.skill)));
    top_skills.truncate(TOP_SKILLS);

    let count = |state| by_availability.get(&state).copied().unwrap_or(0);
    DirectoryStats {
        total_employees: records.len(),
        available_employees: count(Availability::Available),
        busy_employees: count(Availability::Busy),
        unavailable_employees: count(Availability::Unavailable),
        average_experience,
        departments,
        top_skills,
    }
}
