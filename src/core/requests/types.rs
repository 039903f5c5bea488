use crate::{
    core::{
        Task,
        TaskId,
    },
    live::LiveEvent,
};

/// Everything that can change client state, delivered to the controller's loop.
#[derive(Debug, Clone)]
pub enum AppEvent {
    TasksLoaded(Result<Vec<Task>, String>),
    TaskTypesLoaded(Result<Vec<String>, String>),
    TaskCreated(Result<Task, String>),
    TaskEnhanced(Result<Task, String>),
    TaskDeleted { id: TaskId, result: Result<(), String> },

    Live(LiveEvent),
}

impl AppEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            AppEvent::TasksLoaded(_) => "tasks_loaded",
            AppEvent::TaskTypesLoaded(_) => "task_types_loaded",
            AppEvent::TaskCreated(_) => "task_created",
            AppEvent::TaskEnhanced(_) => "task_enhanced",
            AppEvent::TaskDeleted { .. } => "task_deleted",
            AppEvent::Live(event) => match event {
                LiveEvent::Connected { .. } => "live_connected",
                LiveEvent::Disconnected { .. } => "live_disconnected",
                LiveEvent::Error(_) => "live_error",
                LiveEvent::TaskCreated(_) => "live_new_task",
                LiveEvent::TaskDeleted(_) => "live_delete_task",
            },
        }
    }

    /// True for the answer to a request the controller dispatched.
    pub fn is_request_outcome(&self) -> bool {
        !matches!(self, AppEvent::Live(_))
    }
}
