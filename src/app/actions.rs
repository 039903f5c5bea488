use crate::core::{
    TaskForm,
    TaskId,
};

// What the front end can ask the controller to do
#[derive(Debug, Clone)]
pub enum UserAction {
    AddTask(TaskForm),
    EnhanceTask(String),
    DeleteTask(TaskId),
    Refresh,
}
