use std::fmt;

pub const FETCH_FAILED: &str =
    "Failed to fetch tasks. Please check if the server is running and try again.";
pub const ADD_FAILED: &str =
    "Failed to add task. Please check if the server is running and try again.";
pub const DELETE_FAILED: &str =
    "Failed to delete task. Please check if the server is running and try again.";
pub const ENHANCE_FAILED: &str = "Failed to process task. Please try again.";
pub const PERMISSION_DENIED: &str = "Failed to get permission for notifications!";
pub const TASK_ADDED: &str = "Task added successfully";
pub const TASK_DELETED: &str = "Task deleted successfully";

/// Severity of a user-visible alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Error,
}

/// A non-blocking message for the user. The controller queues them; the
/// front end drains and shows them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: AlertKind::Error, title: "Error".to_string(), message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: AlertKind::Success, title: "Success".to_string(), message: message.into() }
    }

    pub fn is_error(&self) -> bool {
        self.kind == AlertKind::Error
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}
