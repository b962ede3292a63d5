pub mod config;
pub mod context;
pub mod embedding;
pub mod error;
pub mod generation;
mod http_client;
pub mod logging;
pub mod matching;
pub mod query;
pub mod run_id;
pub mod skill_normalizer;
pub mod store;
pub mod worker;

use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display, EnumString};

pub use error::RetrievalError;

/// Staffing state of an employee.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    AsRefStr,
    Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Availability {
    Available,
    Busy,
    Unavailable,
}

impl<'de> Deserialize<'de> for Availability {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("unknown availability: {raw}")))
    }
}

/// Employee as stored in the directory file (`{"employees": [...]}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience_years: f64,
    #[serde(default)]
    pub projects: Vec<String>,
    pub availability: Availability,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_parses_case_insensitively() {
        assert_eq!("Available".parse::<Availability>().ok(), Some(Availability::Available));
        assert_eq!("BUSY".parse::<Availability>().ok(), Some(Availability::Busy));
        assert!("on holiday".parse::<Availability>().is_err());
        assert_eq!(Availability::Unavailable.as_ref(), "unavailable");
    }

    #[test]
    fn employee_deserializes_with_defaults() {
        let employee: Employee = serde_json::from_str(
            r#"{"id": 7, "name": "Dana", "experience_years": 4, "availability": " Busy "}"#,
        )
        .unwrap();

        assert_eq!(employee.id, 7);
        assert_eq!(employee.availability, Availability::Busy);
        assert!(employee.skills.is_empty());
        assert_eq!(employee.experience_years, 4.0);
    }
}
