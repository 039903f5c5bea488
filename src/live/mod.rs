pub mod connection;
pub mod protocol;

use std::time::Duration;

use reqwest::Url;
use tokio::{
    sync::{
        mpsc::UnboundedSender,
        oneshot,
    },
    task::JoinHandle,
};
use tracing::{
    debug,
    error,
    info,
};

pub use protocol::LiveEvent;

use crate::core::AppEvent;

const CLOSE_GRACE_MS: u64 = 2000;

/// Handle to the background Socket.IO session that streams task updates.
///
/// There is no reconnect: once the session ends the handle stays finished.
pub struct LiveChannel {
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl LiveChannel {
    /// Connects in the background. Failures are reported as `LiveEvent::Error`.
    pub fn open(api_url: &Url, events: UnboundedSender<AppEvent>) -> Self {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let api_url = api_url.clone();

        let handle = tokio::spawn(async move {
            let url = match protocol::socket_url(&api_url) {
                Ok(url) => url,
                Err(e) => {
                    let _ = events.send(AppEvent::Live(LiveEvent::Error(e.to_string())));
                    return;
                }
            };

            info!(%url, "[live] Connecting");
            let ws_stream = match tokio_tungstenite::connect_async(url.as_str()).await {
                Ok((ws_stream, _)) => ws_stream,
                Err(e) => {
                    error!(error = %e, %url, "[live] Connection failed");
                    let _ = events.send(AppEvent::Live(LiveEvent::Error(e.to_string())));
                    return;
                }
            };

            if let Err(e) = connection::run_session(ws_stream, events, shutdown_rx).await {
                error!(error = %e, "[live] Session ended with error");
            }
            debug!("[live] Session finished");
        });

        Self { shutdown: Some(shutdown_tx), handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Sends a Socket.IO disconnect and waits briefly for the session to wind down.
    pub async fn close(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }

        let abort = self.handle.abort_handle();
        if tokio::time::timeout(Duration::from_millis(CLOSE_GRACE_MS), &mut self.handle)
            .await
            .is_err()
        {
            debug!("[live] Session did not stop in time, aborting");
            abort.abort();
        }
    }
}

impl Drop for LiveChannel {
    fn drop(&mut self) {
        if self.shutdown.is_some() {
            self.handle.abort();
        }
    }
}
