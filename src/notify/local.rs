use std::{
    collections::HashMap,
    sync::{
        Arc,
        Mutex,
    },
    time::Duration,
};

use chrono::Utc;
use tokio::{
    runtime::Handle,
    sync::mpsc::{
        self,
        UnboundedReceiver,
        UnboundedSender,
    },
    task::JoinHandle,
};
use tracing::{
    debug,
    info,
};

use super::service::{
    NotificationId,
    NotificationRequest,
    NotificationService,
    PermissionStatus,
};
use crate::core::ReminderError;

type PendingMap = Arc<Mutex<HashMap<NotificationId, JoinHandle<()>>>>;

/// In-process notifier: one tokio timer per notification, delivered on a channel
/// when it fires. Must be used from inside a tokio runtime.
pub struct LocalNotifier {
    delivered: UnboundedSender<NotificationRequest>,
    pending: PendingMap,
}

impl LocalNotifier {
    pub fn new() -> (Self, UnboundedReceiver<NotificationRequest>) {
        let (delivered, receiver) = mpsc::unbounded_channel();
        (Self { delivered, pending: Arc::new(Mutex::new(HashMap::new())) }, receiver)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().map(|pending| pending.len()).unwrap_or(0)
    }
}

impl NotificationService for LocalNotifier {
    fn request_permission(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    fn schedule(&self, request: NotificationRequest) -> Result<NotificationId, ReminderError> {
        let runtime = Handle::try_current()
            .map_err(|e| ReminderError::Notification(format!("no async runtime: {}", e)))?;

        let id = NotificationId::new();
        let delay = (request.fire_at - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        let delivered = self.delivered.clone();
        let pending = self.pending.clone();
        let timer_id = id.clone();

        let mut guard = self
            .pending
            .lock()
            .map_err(|_| ReminderError::Notification("notification registry poisoned".into()))?;

        // holding the lock keeps a zero-delay timer from removing itself before insertion
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            info!(task_id = %request.task_id, title = %request.title, "Notification fired");
            let _ = delivered.send(request);
            if let Ok(mut pending) = pending.lock() {
                pending.remove(&timer_id);
            }
        });
        guard.insert(id.clone(), handle);

        debug!(notification_id = %id, delay_secs = delay.as_secs(), "Notification timer armed");
        Ok(id)
    }

    fn cancel(&self, id: &NotificationId) -> Result<(), ReminderError> {
        let mut pending = self
            .pending
            .lock()
            .map_err(|_| ReminderError::Notification("notification registry poisoned".into()))?;

        if let Some(handle) = pending.remove(id) {
            handle.abort();
            debug!(notification_id = %id, "Notification cancelled");
        }
        Ok(())
    }
}
