use chrono::{
    DateTime,
    Utc,
};

use super::{
    models::{
        NewTask,
        TaskTypes,
    },
    ReminderError,
};

pub const MISSING_TITLE: &str = "Please enter a task title";
pub const MISSING_REMINDER: &str = "Please enter a reminder message";
pub const UNKNOWN_TASK_TYPE: &str = "Please choose a valid task type";
pub const MISSING_DESCRIPTION: &str = "Please enter a task description";

/// What the user typed into the manual task form.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskForm {
    pub title: String,
    pub task_type: String,
    pub reminder_text: String,
    pub notification_time: DateTime<Utc>,
}

impl TaskForm {
    /// Checks the form before anything is sent to the server.
    pub fn validate(&self, task_types: &TaskTypes) -> Result<NewTask, ReminderError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ReminderError::Validation(MISSING_TITLE.to_string()));
        }

        let reminder_text = self.reminder_text.trim();
        if reminder_text.is_empty() {
            return Err(ReminderError::Validation(MISSING_REMINDER.to_string()));
        }

        if !task_types.contains(&self.task_type) {
            return Err(ReminderError::Validation(UNKNOWN_TASK_TYPE.to_string()));
        }

        Ok(NewTask {
            title: title.to_string(),
            task_type: self.task_type.clone(),
            notification_time: self.notification_time,
            reminder_text: reminder_text.to_string(),
        })
    }
}

/// Trims a natural-language description, rejecting blank input.
pub fn validate_description(text: &str) -> Result<&str, ReminderError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ReminderError::Validation(MISSING_DESCRIPTION.to_string()));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str, reminder: &str, task_type: &str) -> TaskForm {
        TaskForm {
            title: title.to_string(),
            task_type: task_type.to_string(),
            reminder_text: reminder.to_string(),
            notification_time: "2031-03-04T10:00:00Z".parse().unwrap(),
        }
    }

    fn message(result: Result<NewTask, ReminderError>) -> String {
        match result {
            Err(ReminderError::Validation(message)) => message,
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_form_is_trimmed() {
        let new_task = form("  Dentist ", " Bring card  ", "Health").validate(&TaskTypes::default());
        let new_task = new_task.unwrap();
        assert_eq!(new_task.title, "Dentist");
        assert_eq!(new_task.reminder_text, "Bring card");
        assert_eq!(new_task.task_type, "Health");
    }

    #[test]
    fn test_blank_fields_are_rejected() {
        let types = TaskTypes::default();
        assert_eq!(message(form("", "x", "Work").validate(&types)), MISSING_TITLE);
        assert_eq!(message(form("   ", "x", "Work").validate(&types)), MISSING_TITLE);
        assert_eq!(message(form("x", " \n", "Work").validate(&types)), MISSING_REMINDER);
        // title is checked first
        assert_eq!(message(form("", "", "Work").validate(&types)), MISSING_TITLE);
    }

    #[test]
    fn test_task_type_must_be_known() {
        let types = TaskTypes::from_fetched(vec!["Errand".to_string()]);
        assert_eq!(message(form("x", "y", "Work").validate(&types)), UNKNOWN_TASK_TYPE);
        assert!(form("x", "y", "Errand").validate(&types).is_ok());
    }

    #[test]
    fn test_description() {
        assert_eq!(validate_description("  call mom at 5  ").unwrap(), "call mom at 5");
        assert!(matches!(validate_description("\t"), Err(ReminderError::Validation(_))));
    }
}
