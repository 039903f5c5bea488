pub mod local;
pub mod scheduler;
pub mod service;
pub mod silent;

pub use local::LocalNotifier;
pub use scheduler::{
    NotificationScheduler,
    ScheduleOutcome,
};
pub use service::{
    NotificationId,
    NotificationRequest,
    NotificationService,
    PermissionStatus,
};
pub use silent::SilentNotifier;
