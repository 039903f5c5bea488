use std::{
    cmp::Ordering,
    fmt,
    hash::{
        Hash,
        Hasher,
    },
    str::FromStr,
};

use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Deserializer,
    Serialize,
    Serializer,
};

use super::utils::wire_time;

pub const DEFAULT_TASK_TYPES: [&str; 5] = ["Work", "Personal", "Shopping", "Health", "Other"];

/// Server-assigned task identifier.
///
/// The server hands out integers today; the client only ever compares and
/// echoes ids, so they are kept as opaque text. An id that arrived as a JSON
/// number goes back out as one; anything else is echoed as a string.
#[derive(Debug, Clone)]
pub struct TaskId {
    text: String,
    numeric: bool,
}

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self { text: id.into(), numeric: false }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

// identity is the text alone; the wire shape does not matter
impl PartialEq for TaskId {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for TaskId {}

impl Hash for TaskId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl PartialOrd for TaskId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TaskId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.text.cmp(&other.text)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<i64> for TaskId {
    fn from(id: i64) -> Self {
        Self { text: id.to_string(), numeric: true }
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl FromStr for TaskId {
    type Err = std::convert::Infallible;

    /// Canonical integers ("42", not "042") count as numeric ids.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        Ok(match text.parse::<i64>() {
            Ok(number) if number.to_string() == text => Self::from(number),
            _ => Self::new(text),
        })
    }
}

impl Serialize for TaskId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.text.parse::<i64>() {
            Ok(number) if self.numeric => serializer.serialize_i64(number),
            _ => serializer.serialize_str(&self.text),
        }
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(number) => TaskId::from(number),
            RawId::Text(text) => TaskId::new(text),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub task_type: String,
    #[serde(with = "wire_time")]
    pub notification_time: DateTime<Utc>,
    pub reminder_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Body of a create request. The enhancer answers in the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub task_type: String,
    #[serde(with = "wire_time")]
    pub notification_time: DateTime<Utc>,
    pub reminder_text: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct EnhanceRequest<'a> {
    pub text: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeletedTask {
    pub id: TaskId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: String,
}

/// Ordered set of task type labels offered to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskTypes(Vec<String>);

impl TaskTypes {
    /// Falls back to the built-in set when the server sends nothing usable.
    pub fn from_fetched(labels: Vec<String>) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(labels.len());
        for label in labels {
            let label = label.trim().to_string();
            if !label.is_empty() && !unique.contains(&label) {
                unique.push(label);
            }
        }

        if unique.is_empty() {
            Self::default()
        } else {
            Self(unique)
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|known| known == label)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn first(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or(DEFAULT_TASK_TYPES[0])
    }
}

impl Default for TaskTypes {
    fn default() -> Self {
        Self(DEFAULT_TASK_TYPES.iter().map(|label| label.to_string()).collect())
    }
}
