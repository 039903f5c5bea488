pub mod actions;
pub mod alerts;

use std::{
    collections::HashMap,
    mem,
};

use tokio::sync::mpsc::{
    self,
    UnboundedReceiver,
    UnboundedSender,
};
use tracing::{
    debug,
    error,
    info,
    warn,
};

pub use actions::UserAction;
pub use alerts::{
    Alert,
    AlertKind,
};

use crate::{
    api::ApiClient,
    core::{
        form::validate_description,
        AppEvent,
        ReminderError,
        RequestManager,
        Task,
        TaskId,
        TaskStore,
        TaskTypes,
    },
    live::{
        LiveChannel,
        LiveEvent,
    },
    notify::{
        NotificationId,
        NotificationScheduler,
        NotificationService,
        PermissionStatus,
        ScheduleOutcome,
    },
};

/// Top-level controller: owns the task list and is the only thing that mutates it.
///
/// Requests, live pushes and timers all report back as `AppEvent`s on one
/// channel, and `handle_event` applies them one at a time.
pub struct App<N: NotificationService> {
    store: TaskStore,
    task_types: TaskTypes,
    requests: RequestManager,
    scheduler: NotificationScheduler<N>,
    // one registered notification per task, however many times it arrives
    ledger: HashMap<TaskId, NotificationId>,
    // tasks merged while a fetch was in flight; that response may predate them
    merged_during_refresh: HashMap<TaskId, Task>,
    pending_refreshes: usize,
    alerts: Vec<Alert>,
    sender: UnboundedSender<AppEvent>,
    receiver: UnboundedReceiver<AppEvent>,
    live: Option<LiveChannel>,
    live_connected: bool,
    in_flight: usize,
}

impl<N: NotificationService> App<N> {
    pub fn new(api: ApiClient, notifier: N) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        Self {
            store: TaskStore::new(),
            task_types: TaskTypes::default(),
            requests: RequestManager::new(api, sender.clone()),
            scheduler: NotificationScheduler::new(notifier),
            ledger: HashMap::new(),
            merged_during_refresh: HashMap::new(),
            pending_refreshes: 0,
            alerts: Vec::new(),
            sender,
            receiver,
            live: None,
            live_connected: false,
            in_flight: 0,
        }
    }

    /// Startup sequence: permission, initial fetches, then the live channel.
    pub fn start(&mut self, live_updates: bool) {
        if self.scheduler.service().request_permission() == PermissionStatus::Denied {
            warn!("Notification permission denied");
            self.alerts.push(Alert::error(alerts::PERMISSION_DENIED));
        }

        self.refresh();
        self.in_flight += 1;
        self.requests.load_task_types();

        if live_updates {
            self.live = Some(LiveChannel::open(self.requests.api().base_url(), self.sender.clone()));
        }
    }

    pub fn refresh(&mut self) {
        self.in_flight += 1;
        self.pending_refreshes += 1;
        self.requests.load_tasks();
    }

    pub fn handle_action(&mut self, action: UserAction) {
        debug!(?action, "User action");

        match action {
            UserAction::AddTask(form) => match form.validate(&self.task_types) {
                Ok(new_task) => {
                    self.in_flight += 1;
                    self.requests.create_task(new_task);
                }
                Err(e) => self.reject(e),
            },
            UserAction::EnhanceTask(text) => match validate_description(&text) {
                Ok(text) => {
                    self.in_flight += 1;
                    self.requests.enhance_task(text.to_string());
                }
                Err(e) => self.reject(e),
            },
            UserAction::DeleteTask(id) => {
                self.in_flight += 1;
                self.requests.delete_task(id);
            }
            UserAction::Refresh => self.refresh(),
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        debug!(event = event.event_type(), "Handling event");

        if event.is_request_outcome() {
            self.in_flight = self.in_flight.saturating_sub(1);
        }

        match event {
            AppEvent::TasksLoaded(Ok(tasks)) => {
                self.apply_loaded(tasks);
                self.finish_refresh();
            }
            AppEvent::TasksLoaded(Err(_)) => {
                self.alerts.push(Alert::error(alerts::FETCH_FAILED));
                self.finish_refresh();
            }

            AppEvent::TaskTypesLoaded(Ok(labels)) => {
                self.task_types = TaskTypes::from_fetched(labels);
            }
            AppEvent::TaskTypesLoaded(Err(e)) => {
                warn!(error = %e, "Using default task types");
            }

            AppEvent::TaskCreated(Ok(task)) => {
                info!(task_id = %task.id, title = %task.title, "Added task");
                self.merge(task);
                self.refresh();
                self.alerts.push(Alert::success(alerts::TASK_ADDED));
            }
            AppEvent::TaskCreated(Err(_)) => self.alerts.push(Alert::error(alerts::ADD_FAILED)),

            AppEvent::TaskEnhanced(Ok(task)) => {
                info!(task_id = %task.id, title = %task.title, "Added task from description");
                self.merge(task);
                self.alerts.push(Alert::success(alerts::TASK_ADDED));
            }
            AppEvent::TaskEnhanced(Err(_)) => {
                self.alerts.push(Alert::error(alerts::ENHANCE_FAILED))
            }

            AppEvent::TaskDeleted { id, result: Ok(()) } => {
                info!(task_id = %id, "Deleted task");
                self.remove(&id);
                self.refresh();
                self.alerts.push(Alert::success(alerts::TASK_DELETED));
            }
            AppEvent::TaskDeleted { result: Err(_), .. } => {
                self.alerts.push(Alert::error(alerts::DELETE_FAILED))
            }

            AppEvent::Live(event) => self.apply_live(event),
        }
    }

    fn apply_live(&mut self, event: LiveEvent) {
        match event {
            LiveEvent::Connected { sid } => {
                self.live_connected = true;
                info!(sid = sid.as_deref().unwrap_or("-"), "Connected to live channel");
            }
            LiveEvent::Disconnected { reason } => {
                self.live_connected = false;
                info!(%reason, "Disconnected from live channel");
            }
            LiveEvent::Error(e) => {
                error!(error = %e, "Live channel error");
            }
            LiveEvent::TaskCreated(task) => {
                debug!(task_id = %task.id, "Received new task");
                if !self.store.contains(&task.id) {
                    self.merge(task);
                }
            }
            LiveEvent::TaskDeleted(id) => {
                debug!(task_id = %id, "Task deleted remotely");
                self.remove(&id);
            }
        }
    }

    fn apply_loaded(&mut self, tasks: Vec<Task>) {
        info!(count = tasks.len(), "Fetched tasks");

        for task in &tasks {
            self.ensure_scheduled(task);
        }
        self.store.replace_all(tasks);

        // the fetch may have been answered before these existed server-side
        for task in self.merged_during_refresh.values() {
            self.store.apply_create(task.clone());
        }
    }

    fn finish_refresh(&mut self) {
        self.pending_refreshes = self.pending_refreshes.saturating_sub(1);
        if self.pending_refreshes == 0 {
            self.merged_during_refresh.clear();
        }
    }

    fn merge(&mut self, task: Task) {
        self.ensure_scheduled(&task);
        if self.pending_refreshes > 0 {
            self.merged_during_refresh.insert(task.id.clone(), task.clone());
        }
        self.store.apply_create(task);
    }

    /// Notifications are only cancelled here, on an explicit delete.
    fn remove(&mut self, id: &TaskId) {
        self.store.apply_delete(id);
        self.merged_during_refresh.remove(id);
        self.forget(id);
    }

    fn ensure_scheduled(&mut self, task: &Task) {
        if self.ledger.contains_key(&task.id) {
            return;
        }
        if let ScheduleOutcome::Scheduled(notification_id) = self.scheduler.schedule(task) {
            self.ledger.insert(task.id.clone(), notification_id);
        }
    }

    fn forget(&mut self, id: &TaskId) {
        if let Some(notification_id) = self.ledger.remove(id) {
            self.scheduler.cancel(&notification_id);
        }
    }

    fn reject(&mut self, error: ReminderError) {
        warn!(error = %error, "Rejected input");
        self.alerts.push(Alert::error(error.to_string()));
    }

    pub async fn next_event(&mut self) -> Option<AppEvent> {
        self.receiver.recv().await
    }

    /// Processes events until every dispatched request has answered.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.receiver.recv().await {
                Some(event) => self.handle_event(event),
                None => break,
            }
        }
    }

    /// Closes the live channel. In-flight requests are left to finish on their own.
    pub async fn shutdown(&mut self) {
        if let Some(live) = self.live.take() {
            live.close().await;
        }
        self.live_connected = false;
    }

    pub fn sender(&self) -> UnboundedSender<AppEvent> {
        self.sender.clone()
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    pub fn task_types(&self) -> &TaskTypes {
        &self.task_types
    }

    pub fn take_alerts(&mut self) -> Vec<Alert> {
        mem::take(&mut self.alerts)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn is_live_connected(&self) -> bool {
        self.live_connected
    }

    pub fn notification_for(&self, id: &TaskId) -> Option<&NotificationId> {
        self.ledger.get(id)
    }

    pub fn scheduler(&self) -> &NotificationScheduler<N> {
        &self.scheduler
    }
}
