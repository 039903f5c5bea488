use chrono::{
    DateTime,
    Utc,
};
use tracing::{
    debug,
    warn,
};

use super::service::{
    NotificationId,
    NotificationRequest,
    NotificationService,
};
use crate::core::Task;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleOutcome {
    Scheduled(NotificationId),
    /// The trigger is not in the future.
    Skipped,
    /// The service refused; already logged.
    Failed,
}

/// Turns tasks into one-shot notifications, skipping anything already due.
pub struct NotificationScheduler<N> {
    service: N,
}

impl<N: NotificationService> NotificationScheduler<N> {
    pub fn new(service: N) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &N {
        &self.service
    }

    pub fn schedule(&self, task: &Task) -> ScheduleOutcome {
        self.schedule_at(task, Utc::now())
    }

    pub fn schedule_at(&self, task: &Task, now: DateTime<Utc>) -> ScheduleOutcome {
        if task.notification_time <= now {
            debug!(task_id = %task.id, title = %task.title, "Skipping notification for past task");
            return ScheduleOutcome::Skipped;
        }

        let request = NotificationRequest {
            task_id: task.id.clone(),
            title: task.title.clone(),
            body: task.reminder_text.clone(),
            fire_at: task.notification_time,
        };

        match self.service.schedule(request) {
            Ok(id) => {
                debug!(
                    task_id = %task.id,
                    notification_id = %id,
                    fire_at = %task.notification_time,
                    "Notification scheduled"
                );
                ScheduleOutcome::Scheduled(id)
            }
            Err(e) => {
                warn!(task_id = %task.id, error = %e, "Error scheduling notification");
                ScheduleOutcome::Failed
            }
        }
    }

    /// Best effort, like scheduling.
    pub fn cancel(&self, id: &NotificationId) {
        if let Err(e) = self.service.cancel(id) {
            warn!(notification_id = %id, error = %e, "Error cancelling notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Duration;

    use super::*;
    use crate::{
        core::{
            ReminderError,
            TaskId,
        },
        notify::PermissionStatus,
    };

    #[derive(Default)]
    struct Recorder {
        scheduled: Mutex<Vec<NotificationRequest>>,
        fail: bool,
    }

    impl NotificationService for Recorder {
        fn request_permission(&self) -> PermissionStatus {
            PermissionStatus::Granted
        }

        fn schedule(&self, request: NotificationRequest) -> Result<NotificationId, ReminderError> {
            if self.fail {
                return Err(ReminderError::Notification("denied by host".into()));
            }
            self.scheduled.lock().unwrap().push(request);
            Ok(NotificationId::new())
        }

        fn cancel(&self, _id: &NotificationId) -> Result<(), ReminderError> {
            Ok(())
        }
    }

    fn task_at(time: DateTime<Utc>) -> Task {
        Task {
            id: TaskId::from(1),
            title: "Pay rent".to_string(),
            task_type: "Personal".to_string(),
            notification_time: time,
            reminder_text: "Before noon".to_string(),
            created_at: None,
        }
    }

    #[test]
    fn test_past_and_present_are_skipped() {
        let scheduler = NotificationScheduler::new(Recorder::default());
        let now = Utc::now();

        assert_eq!(scheduler.schedule_at(&task_at(now), now), ScheduleOutcome::Skipped);
        assert_eq!(
            scheduler.schedule_at(&task_at(now - Duration::days(3)), now),
            ScheduleOutcome::Skipped
        );
        assert!(scheduler.service().scheduled.lock().unwrap().is_empty());
    }

    #[test]
    fn test_future_registers_once_per_call() {
        let scheduler = NotificationScheduler::new(Recorder::default());
        let now = Utc::now();
        let task = task_at(now + Duration::seconds(1));

        assert!(matches!(scheduler.schedule_at(&task, now), ScheduleOutcome::Scheduled(_)));
        {
            let scheduled = scheduler.service().scheduled.lock().unwrap();
            assert_eq!(scheduled.len(), 1);
            assert_eq!(scheduled[0].title, "Pay rent");
            assert_eq!(scheduled[0].body, "Before noon");
            assert_eq!(scheduled[0].fire_at, task.notification_time);
        }

        scheduler.schedule_at(&task, now);
        assert_eq!(scheduler.service().scheduled.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_service_failure_is_swallowed() {
        let scheduler = NotificationScheduler::new(Recorder { fail: true, ..Default::default() });
        let now = Utc::now();
        assert_eq!(
            scheduler.schedule_at(&task_at(now + Duration::hours(1)), now),
            ScheduleOutcome::Failed
        );
    }
}
