use crate::Employee;

/// Canonical text rendering used to embed a record. Field order is fixed; changing it
/// changes every stored vector.
pub fn employee_document(employee: &Employee) -> String {
    format!(
        "Name: {}\nRole: {}\nDepartment: {}\nExperience: {} years\nSkills: {}\nProjects: {}\nAvailability: {}",
        employee.name,
        employee.role,
        employee.department,
        employee.experience_years,
        employee.skills.join(", "),
        employee.projects.join(", "),
        employee.availability,
    )
}
