use futures_util::{
    Sink,
    SinkExt,
    StreamExt,
};
use serde_json::Value;
use tokio::{
    io::{
        AsyncRead,
        AsyncWrite,
    },
    sync::{
        mpsc::UnboundedSender,
        oneshot,
    },
};
use tokio_tungstenite::{
    tungstenite::{
        self,
        protocol::Message,
    },
    WebSocketStream,
};
use tracing::{
    debug,
    warn,
};

use super::protocol::{
    decode_event,
    parse_engine,
    parse_socket,
    EnginePacket,
    LiveEvent,
    SocketPacket,
    CONNECT_DEFAULT_NAMESPACE,
    DISCONNECT_DEFAULT_NAMESPACE,
};
use crate::core::{
    AppEvent,
    ReminderError,
};

enum Flow {
    Continue,
    Stop,
}

/// Drives one Socket.IO session until the server goes away or `shutdown` fires.
///
/// Dropping the shutdown sender counts as a shutdown request.
pub(crate) async fn run_session<S>(
    ws_stream: WebSocketStream<S>,
    events: UnboundedSender<AppEvent>,
    mut shutdown: oneshot::Receiver<()>,
) -> Result<(), ReminderError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                debug!("[live] Closing channel");
                let _ = ws_sender.send(Message::text(DISCONNECT_DEFAULT_NAMESPACE)).await;
                let _ = ws_sender.send(Message::Close(None)).await;
                emit(&events, LiveEvent::Disconnected { reason: "client closed".to_string() });
                return Ok(());
            }
            msg = ws_receiver.next() => {
                let flow = match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_frame(text.as_str(), &mut ws_sender, &events).await?
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let reason = frame
                            .map(|frame| frame.reason.as_str().to_string())
                            .filter(|reason| !reason.is_empty())
                            .unwrap_or_else(|| "server closed the connection".to_string());
                        emit(&events, LiveEvent::Disconnected { reason });
                        Flow::Stop
                    }
                    Some(Ok(_)) => Flow::Continue,
                    Some(Err(e)) => {
                        emit(&events, LiveEvent::Error(e.to_string()));
                        emit(&events, LiveEvent::Disconnected { reason: "connection lost".to_string() });
                        return Err(e.into());
                    }
                    None => {
                        emit(&events, LiveEvent::Disconnected {
                            reason: "connection dropped".to_string(),
                        });
                        Flow::Stop
                    }
                };

                if let Flow::Stop = flow {
                    return Ok(());
                }
            }
        }
    }
}

async fn handle_frame<W>(
    frame: &str,
    ws_sender: &mut W,
    events: &UnboundedSender<AppEvent>,
) -> Result<Flow, ReminderError>
where
    W: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    let packet = match parse_engine(frame) {
        Ok(packet) => packet,
        Err(e) => {
            warn!(error = %e, frame, "[live] Ignoring unreadable frame");
            return Ok(Flow::Continue);
        }
    };

    match packet {
        EnginePacket::Open(handshake) => {
            debug!(sid = %handshake.sid, ping_interval = handshake.ping_interval, "[live] Engine open");
            ws_sender.send(Message::text(CONNECT_DEFAULT_NAMESPACE)).await?;
        }
        EnginePacket::Ping(data) => {
            ws_sender.send(Message::text(format!("3{}", data))).await?;
        }
        EnginePacket::Close => {
            emit(events, LiveEvent::Disconnected { reason: "server closed the session".to_string() });
            return Ok(Flow::Stop);
        }
        EnginePacket::Message(data) => return Ok(handle_message(data, events)),
        EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => {}
    }

    Ok(Flow::Continue)
}

fn handle_message(data: &str, events: &UnboundedSender<AppEvent>) -> Flow {
    let packet = match parse_socket(data) {
        Ok(packet) => packet,
        Err(e) => {
            warn!(error = %e, data, "[live] Ignoring unreadable message");
            return Flow::Continue;
        }
    };

    match packet {
        SocketPacket::Connect(payload) => {
            let sid = payload
                .as_ref()
                .and_then(|payload| payload.get("sid"))
                .and_then(Value::as_str)
                .map(str::to_string);
            emit(events, LiveEvent::Connected { sid })
        }
        SocketPacket::Event { namespace, name, args } => {
            if namespace != "/" {
                debug!(%namespace, %name, "[live] Ignoring event outside the default namespace");
                return Flow::Continue;
            }
            match decode_event(&name, args) {
                Ok(Some(event)) => emit(events, event),
                Ok(None) => {
                    debug!(%name, "[live] Ignoring unknown event");
                    Flow::Continue
                }
                Err(e) => {
                    warn!(error = %e, %name, "[live] Dropping malformed event payload");
                    Flow::Continue
                }
            }
        }
        SocketPacket::ConnectError(payload) => {
            let message = payload
                .as_ref()
                .and_then(|payload| payload.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("connection refused")
                .to_string();
            emit(events, LiveEvent::Error(message));
            Flow::Stop
        }
        SocketPacket::Disconnect => {
            emit(events, LiveEvent::Disconnected { reason: "server disconnected".to_string() });
            Flow::Stop
        }
        SocketPacket::Ack => Flow::Continue,
    }
}

/// Forwards an event to the controller; stops the session once nobody listens.
fn emit(events: &UnboundedSender<AppEvent>, event: LiveEvent) -> Flow {
    match events.send(AppEvent::Live(event)) {
        Ok(()) => Flow::Continue,
        Err(_) => Flow::Stop,
    }
}
