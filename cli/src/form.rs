//! Create/edit form state and its validation policy.
//!
//! Validation lives here, at the form boundary, not in the core: the service
//! applies its own rules and the repository passes its messages through.

use tablero_core::api::Task;

/// One validation policy for both create and edit: title required, 3-100
/// chars after trimming; description up to 500 chars.
pub fn validate(title: &str, description: &str) -> Result<(), String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err("El título es obligatorio".to_string());
    }
    let len = trimmed.chars().count();
    if len < 3 {
        return Err("El título debe tener al menos 3 caracteres".to_string());
    }
    if len > 100 {
        return Err("El título no puede exceder 100 caracteres".to_string());
    }
    if description.chars().count() > 500 {
        return Err("La descripción no puede exceder 500 caracteres".to_string());
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Title,
    Description,
    Completed,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Title => FormField::Description,
            FormField::Description => FormField::Completed,
            FormField::Completed => FormField::Title,
        }
    }
}

/// Form contents plus the id of the task being edited, if any. A `None`
/// `editing` means the submit creates a new task.
#[derive(Debug, Clone, Default)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub editing: Option<i64>,
    pub field: FormField,
}

impl TaskForm {
    pub fn create() -> Self {
        Self::default()
    }

    /// Pre-fill from an existing task, as the edit dialog does.
    pub fn edit(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            completed: task.status.is_completed(),
            editing: Some(task.id),
            field: FormField::Title,
        }
    }

    pub fn focus_next(&mut self) {
        self.field = self.field.next();
    }

    pub fn validate(&self) -> Result<(), String> {
        validate(&self.title, &self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tablero_core::api::Status;

    #[test]
    fn title_is_required() {
        assert_eq!(validate("   ", "").unwrap_err(), "El título es obligatorio");
    }

    #[test]
    fn title_length_bounds() {
        assert_eq!(
            validate("ab", "").unwrap_err(),
            "El título debe tener al menos 3 caracteres"
        );
        assert!(validate("abc", "").is_ok());
        assert!(validate(&"a".repeat(100), "").is_ok());
        assert_eq!(
            validate(&"a".repeat(101), "").unwrap_err(),
            "El título no puede exceder 100 caracteres"
        );
    }

    #[test]
    fn title_is_trimmed_before_measuring() {
        // Two visible chars padded with spaces is still too short.
        assert!(validate("  ab  ", "").is_err());
        assert!(validate("  abc  ", "").is_ok());
    }

    #[test]
    fn description_upper_bound() {
        assert!(validate("abc", &"d".repeat(500)).is_ok());
        assert_eq!(
            validate("abc", &"d".repeat(501)).unwrap_err(),
            "La descripción no puede exceder 500 caracteres"
        );
    }

    #[test]
    fn edit_prefills_from_task() {
        let task = Task {
            id: 4,
            title: "Comprar leche".to_string(),
            description: "supermercado".to_string(),
            status: Status::Completed,
        };
        let form = TaskForm::edit(&task);
        assert_eq!(form.editing, Some(4));
        assert_eq!(form.title, "Comprar leche");
        assert!(form.completed);
        assert_eq!(form.field, FormField::Title);
    }

    #[test]
    fn focus_cycles_through_fields() {
        let mut form = TaskForm::create();
        assert_eq!(form.field, FormField::Title);
        form.focus_next();
        assert_eq!(form.field, FormField::Description);
        form.focus_next();
        assert_eq!(form.field, FormField::Completed);
        form.focus_next();
        assert_eq!(form.field, FormField::Title);
    }
}
