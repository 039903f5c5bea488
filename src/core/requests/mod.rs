pub mod manager;
pub mod types;

pub use manager::RequestManager;
pub use types::AppEvent;
