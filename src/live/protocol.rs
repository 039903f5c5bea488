//! Engine.IO v4 / Socket.IO v5 text framing, the subset the task server speaks.

use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use crate::core::{
    models::DeletedTask,
    ReminderError,
    Task,
    TaskId,
};

pub const ENGINE_PROTOCOL: &str = "4";
pub const CONNECT_DEFAULT_NAMESPACE: &str = "40";
pub const DISCONNECT_DEFAULT_NAMESPACE: &str = "41";

pub const NEW_TASK_EVENT: &str = "new_task";
pub const DELETE_TASK_EVENT: &str = "delete_task";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    #[serde(default)]
    pub sid: String,
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default)]
    pub ping_timeout: u64,
}

#[derive(Debug, PartialEq)]
pub enum EnginePacket<'a> {
    Open(Handshake),
    Close,
    Ping(&'a str),
    Pong(&'a str),
    Message(&'a str),
    Upgrade,
    Noop,
}

#[derive(Debug, PartialEq)]
pub enum SocketPacket {
    Connect(Option<Value>),
    Disconnect,
    Event { namespace: String, name: String, args: Vec<Value> },
    Ack,
    ConnectError(Option<Value>),
}

/// What the live channel reports to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent {
    Connected { sid: Option<String> },
    Disconnected { reason: String },
    Error(String),
    TaskCreated(Task),
    TaskDeleted(TaskId),
}

pub fn parse_engine(frame: &str) -> Result<EnginePacket<'_>, ReminderError> {
    let mut chars = frame.chars();
    let kind = chars.next().ok_or_else(|| ReminderError::Protocol("empty frame".into()))?;
    let data = chars.as_str();

    Ok(match kind {
        '0' => EnginePacket::Open(serde_json::from_str(data)?),
        '1' => EnginePacket::Close,
        '2' => EnginePacket::Ping(data),
        '3' => EnginePacket::Pong(data),
        '4' => EnginePacket::Message(data),
        '5' => EnginePacket::Upgrade,
        '6' => EnginePacket::Noop,
        other => {
            return Err(ReminderError::Protocol(format!("unknown engine packet type '{}'", other)))
        }
    })
}

pub fn parse_socket(data: &str) -> Result<SocketPacket, ReminderError> {
    let mut chars = data.chars();
    let kind = chars.next().ok_or_else(|| ReminderError::Protocol("empty message".into()))?;
    let (namespace, rest) = split_namespace(chars.as_str());

    match kind {
        '0' => Ok(SocketPacket::Connect(optional_json(rest)?)),
        '1' => Ok(SocketPacket::Disconnect),
        '2' => {
            // an ack id may sit between the namespace and the payload
            let payload = rest.trim_start_matches(|c: char| c.is_ascii_digit());
            let mut args: Vec<Value> = serde_json::from_str(payload)?;
            if args.is_empty() {
                return Err(ReminderError::Protocol("event without a name".into()));
            }
            let name = match args.remove(0) {
                Value::String(name) => name,
                other => {
                    return Err(ReminderError::Protocol(format!("event name is not a string: {}", other)))
                }
            };
            Ok(SocketPacket::Event { namespace: namespace.to_string(), name, args })
        }
        '3' | '6' => Ok(SocketPacket::Ack),
        '4' => Ok(SocketPacket::ConnectError(optional_json(rest)?)),
        '5' => Err(ReminderError::Protocol("binary events are not supported".into())),
        other => Err(ReminderError::Protocol(format!("unknown socket packet type '{}'", other))),
    }
}

/// Maps a Socket.IO event onto a task update. Unknown events yield `None`.
pub fn decode_event(name: &str, args: Vec<Value>) -> Result<Option<LiveEvent>, ReminderError> {
    let payload = args.into_iter().next().unwrap_or(Value::Null);

    match name {
        NEW_TASK_EVENT => Ok(Some(LiveEvent::TaskCreated(serde_json::from_value::<Task>(payload)?))),
        DELETE_TASK_EVENT => {
            let deleted: DeletedTask = serde_json::from_value(payload)?;
            Ok(Some(LiveEvent::TaskDeleted(deleted.id)))
        }
        _ => Ok(None),
    }
}

/// `http://host:5000` becomes `ws://host:5000/socket.io/?EIO=4&transport=websocket`.
pub fn socket_url(base: &Url) -> Result<Url, ReminderError> {
    let mut url = base.clone();
    let scheme = match base.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(ReminderError::InvalidUrl(format!("unsupported scheme {}", other))),
    };
    url.set_scheme(scheme).map_err(|_| ReminderError::InvalidUrl(base.to_string()))?;

    url.path_segments_mut()
        .map_err(|_| ReminderError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(["socket.io", ""]);
    url.set_query(Some(&format!("EIO={}&transport=websocket", ENGINE_PROTOCOL)));
    url.set_fragment(None);
    Ok(url)
}

fn split_namespace(rest: &str) -> (&str, &str) {
    if rest.starts_with('/') {
        match rest.find(',') {
            Some(comma) => (&rest[..comma], &rest[comma + 1..]),
            None => (rest, ""),
        }
    } else {
        ("/", rest)
    }
}

fn optional_json(rest: &str) -> Result<Option<Value>, ReminderError> {
    if rest.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(serde_json::from_str(rest)?))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_engine_packets() {
        let open = parse_engine(r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000}"#)
            .unwrap();
        assert_eq!(
            open,
            EnginePacket::Open(Handshake {
                sid: "abc".to_string(),
                ping_interval: 25000,
                ping_timeout: 20000
            })
        );
        assert_eq!(parse_engine("2").unwrap(), EnginePacket::Ping(""));
        assert_eq!(parse_engine("2probe").unwrap(), EnginePacket::Ping("probe"));
        assert_eq!(parse_engine("40").unwrap(), EnginePacket::Message("0"));
        assert_eq!(parse_engine("1").unwrap(), EnginePacket::Close);
        assert!(parse_engine("").is_err());
        assert!(parse_engine("9").is_err());
    }

    #[test]
    fn test_socket_connect_and_errors() {
        assert_eq!(
            parse_socket(r#"0{"sid":"xyz"}"#).unwrap(),
            SocketPacket::Connect(Some(json!({"sid": "xyz"})))
        );
        assert_eq!(parse_socket("0").unwrap(), SocketPacket::Connect(None));
        assert_eq!(parse_socket("1").unwrap(), SocketPacket::Disconnect);
        assert_eq!(
            parse_socket(r#"4{"message":"nope"}"#).unwrap(),
            SocketPacket::ConnectError(Some(json!({"message": "nope"})))
        );
    }

    #[test]
    fn test_socket_event_with_namespace_and_ack() {
        let packet = parse_socket(r#"2/admin,13["delete_task",{"id":5}]"#).unwrap();
        assert_eq!(
            packet,
            SocketPacket::Event {
                namespace: "/admin".to_string(),
                name: "delete_task".to_string(),
                args: vec![json!({"id": 5})],
            }
        );

        assert!(parse_socket("2[]").is_err());
        assert!(parse_socket("2[42]").is_err());
    }

    #[test]
    fn test_decode_task_events() {
        let created = decode_event(
            NEW_TASK_EVENT,
            vec![json!({
                "id": 3,
                "title": "Gym",
                "task_type": "Health",
                "notification_time": "2030-02-02T07:00:00.000Z",
                "reminder_text": "Leg day"
            })],
        )
        .unwrap();
        match created {
            Some(LiveEvent::TaskCreated(task)) => assert_eq!(task.id, TaskId::from(3)),
            other => panic!("Expected TaskCreated, got {:?}", other),
        }

        let deleted = decode_event(DELETE_TASK_EVENT, vec![json!({"id": 5})]).unwrap();
        assert_eq!(deleted, Some(LiveEvent::TaskDeleted(TaskId::from(5))));

        assert_eq!(decode_event("something_else", vec![]).unwrap(), None);
        assert!(decode_event(NEW_TASK_EVENT, vec![json!({"id": 1})]).is_err());
        assert!(decode_event(DELETE_TASK_EVENT, vec![]).is_err());
    }

    #[test]
    fn test_socket_url() {
        let url = socket_url(&Url::parse("http://192.168.1.8:5000").unwrap()).unwrap();
        assert_eq!(url.as_str(), "ws://192.168.1.8:5000/socket.io/?EIO=4&transport=websocket");

        let secure = socket_url(&Url::parse("https://example.com/app/").unwrap()).unwrap();
        assert_eq!(secure.as_str(), "wss://example.com/app/socket.io/?EIO=4&transport=websocket");
    }
}
