use std::fmt;

use chrono::{
    DateTime,
    Utc,
};
use uuid::Uuid;

use crate::core::{
    ReminderError,
    TaskId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationId(Uuid);

impl NotificationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A one-shot local notification.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRequest {
    pub task_id: TaskId,
    pub title: String,
    pub body: String,
    pub fire_at: DateTime<Utc>,
}

/// The host's notification facility.
pub trait NotificationService: Send + Sync {
    fn request_permission(&self) -> PermissionStatus;

    fn schedule(&self, request: NotificationRequest) -> Result<NotificationId, ReminderError>;

    fn cancel(&self, id: &NotificationId) -> Result<(), ReminderError>;
}

impl<T: NotificationService + ?Sized> NotificationService for std::sync::Arc<T> {
    fn request_permission(&self) -> PermissionStatus {
        (**self).request_permission()
    }

    fn schedule(&self, request: NotificationRequest) -> Result<NotificationId, ReminderError> {
        (**self).schedule(request)
    }

    fn cancel(&self, id: &NotificationId) -> Result<(), ReminderError> {
        (**self).cancel(id)
    }
}
