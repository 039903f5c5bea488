pub mod errors;
pub mod form;
pub mod models;
pub mod requests;
pub mod store;
pub mod utils;

pub use errors::ReminderError;
pub use form::TaskForm;
pub use models::{
    NewTask,
    Task,
    TaskId,
    TaskTypes,
};
pub use requests::{
    AppEvent,
    RequestManager,
};
pub use store::TaskStore;
