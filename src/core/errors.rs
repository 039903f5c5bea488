use thiserror::Error;
use tokio::sync::mpsc::error::SendError;
use tokio_tungstenite::tungstenite;

#[derive(Error, Debug)]
pub enum ReminderError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reqwest error: {0}")]
    Reqwest(Box<reqwest::Error>),

    #[error("HTTP error {status} from {url}: {message}")]
    Status { status: u16, url: String, message: String },

    #[error("WebSocket error: {0}")]
    WebSocket(Box<tungstenite::Error>),

    #[error("Live channel protocol error: {0}")]
    Protocol(String),

    #[error("Event channel closed: {0}")]
    ChannelClosed(String),

    #[error("{0}")]
    Validation(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl<T> From<SendError<T>> for ReminderError {
    fn from(error: SendError<T>) -> Self {
        ReminderError::ChannelClosed(error.to_string())
    }
}

impl From<std::io::Error> for ReminderError {
    fn from(error: std::io::Error) -> Self {
        ReminderError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for ReminderError {
    fn from(error: reqwest::Error) -> Self {
        ReminderError::Reqwest(Box::new(error))
    }
}

impl From<tungstenite::Error> for ReminderError {
    fn from(error: tungstenite::Error) -> Self {
        ReminderError::WebSocket(Box::new(error))
    }
}
