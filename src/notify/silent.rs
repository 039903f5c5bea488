use tracing::debug;

use super::service::{
    NotificationId,
    NotificationRequest,
    NotificationService,
    PermissionStatus,
};
use crate::core::ReminderError;

/// Accepts every request and delivers nothing.
///
/// For short-lived commands that exit before any reminder could fire, so no
/// timers are armed and no runtime is needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

impl NotificationService for SilentNotifier {
    fn request_permission(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    fn schedule(&self, request: NotificationRequest) -> Result<NotificationId, ReminderError> {
        debug!(task_id = %request.task_id, "Not arming a reminder in a one-shot run");
        Ok(NotificationId::new())
    }

    fn cancel(&self, _id: &NotificationId) -> Result<(), ReminderError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{
        Duration,
        Utc,
    };

    use super::*;
    use crate::core::TaskId;

    #[test]
    fn test_schedules_without_a_runtime() {
        let notifier = SilentNotifier;
        let request = NotificationRequest {
            task_id: TaskId::from(1),
            title: "Stretch".to_string(),
            body: "Five minutes".to_string(),
            fire_at: Utc::now() + Duration::minutes(5),
        };

        assert_eq!(notifier.request_permission(), PermissionStatus::Granted);
        let id = notifier.schedule(request).unwrap();
        assert!(notifier.cancel(&id).is_ok());
    }
}
