//! Task reminder client: REST task API, Socket.IO live updates and local
//! one-shot notifications, driven by a single event-consuming controller.

pub mod api;
pub mod app;
pub mod config;
pub mod core;
pub mod live;
pub mod logging;
pub mod notify;
pub mod persistence;

pub use api::ApiClient;
pub use app::{
    Alert,
    AlertKind,
    App,
    UserAction,
};
pub use config::ClientSettings;
pub use crate::core::{
    ReminderError,
    Task,
    TaskForm,
    TaskId,
    TaskStore,
    TaskTypes,
};
