//! Employee management - adding and removing people who share lunches.

use crate::{
    core::state::AppState,
    errors::{Error, Result},
    models::Employee,
};

/// Adds an employee with a zero balance, trimming the name.
///
/// # Errors
/// Returns [`Error::Validation`] for an empty name or a name already in use.
pub fn add_employee(state: &mut AppState, name: &str) -> Result<Employee> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation {
            message: "Employee name cannot be empty".to_string(),
        });
    }
    if state.employee_by_name(name).is_some() {
        return Err(Error::Validation {
            message: format!("An employee named '{name}' already exists"),
        });
    }

    let employee = Employee::new(name);
    state.employees.push(employee.clone());
    Ok(employee)
}

/// Removes an employee. Their past lunch items stay in the records as orphans.
///
/// # Errors
/// Returns [`Error::EmployeeNotFound`] if the id is unknown.
pub fn remove_employee(state: &mut AppState, employee_id: &str) -> Result<Employee> {
    let index = state
        .employees
        .iter()
        .position(|employee| employee.id == employee_id)
        .ok_or_else(|| Error::EmployeeNotFound {
            id: employee_id.to_string(),
        })?;
    Ok(state.employees.remove(index))
}
