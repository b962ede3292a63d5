use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::Employee;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("employee data file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid employee JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Bulk-load side of the directory's backing persistence. Called only at startup and on
/// reload.
pub trait EmployeeSource: Send + Sync {
    /// Human-readable origin for logs ("data/employees.json", "memory").
    fn describe(&self) -> String;

    fn load_all(&self) -> Result<Vec<Employee>, LoadError>;
}

#[derive(Deserialize)]
struct EmployeeFile {
    #[serde(default)]
    employees: Vec<Employee>,
}

/// `{"employees": [...]}` document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EmployeeSource for JsonFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load_all(&self) -> Result<Vec<Employee>, LoadError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                LoadError::NotFound(self.path.clone())
            } else {
                LoadError::Io {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;
        let file: EmployeeFile = serde_json::from_str(&raw).map_err(|source| LoadError::Parse {
            path: self.path.clone(),
            source,
        })?;

        info!(
            path = %self.path.display(),
            employees = file.employees.len(),
            "loaded employee data"
        );
        Ok(file.employees)
    }
}

/// Fixed in-process list; used for tests and embedding the service in other binaries.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    employees: Vec<Employee>,
}

impl InMemorySource {
    pub fn new(employees: Vec<Employee>) -> Self {
        Self { employees }
    }
}

impl EmployeeSource for InMemorySource {
    fn describe(&self) -> String {
        "memory".into()
    }

    fn load_all(&self) -> Result<Vec<Employee>, LoadError> {
        Ok(self.employees.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Availability;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("hr-match-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_employee_document() {
        let path = temp_file(
            "employees.json",
            r#"{"employees": [{"id": 1, "name": "Alice", "role": "Developer",
                "department": "Engineering", "skills": ["Python"], "experience_years": 5,
                "projects": ["Portal"], "availability": "available"}]}"#,
        );

        let employees = JsonFileSource::new(&path).load_all().unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(employees.len(), 1);
        assert_eq!(employees[0].name, "Alice");
        assert_eq!(employees[0].availability, Availability::Available);
    }

    #[test]
    fn missing_file_is_reported_as_not_found() {
        let err = JsonFileSource::new("/nonexistent/hr-match/employees.json")
            .load_all()
            .unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let path = temp_file("broken.json", "{\"employees\": [");
        let err = JsonFileSource::new(&path).load_all().unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(matches!(err, LoadError::Parse { .. }));
    }
}
