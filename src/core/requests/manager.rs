use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::error;

use super::AppEvent;
use crate::{
    api::ApiClient,
    core::{
        NewTask,
        TaskId,
    },
};

/// Runs API calls off the controller's loop and reports each outcome as an `AppEvent`.
///
/// Nothing here touches client state; the controller applies results in order.
#[derive(Clone)]
pub struct RequestManager {
    api: Arc<ApiClient>,
    sender: UnboundedSender<AppEvent>,
}

impl RequestManager {
    pub fn new(api: ApiClient, sender: UnboundedSender<AppEvent>) -> Self {
        Self { api: Arc::new(api), sender }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    fn request_context(&self) -> (UnboundedSender<AppEvent>, Arc<ApiClient>) {
        (self.sender.clone(), self.api.clone())
    }

    pub fn load_tasks(&self) {
        let (sender, api) = self.request_context();

        tokio::spawn(async move {
            let result = api.fetch_tasks().await.map_err(|e| {
                error!(error = %e, "Error fetching tasks");
                e.to_string()
            });
            let _ = sender.send(AppEvent::TasksLoaded(result));
        });
    }

    pub fn load_task_types(&self) {
        let (sender, api) = self.request_context();

        tokio::spawn(async move {
            let result = api.fetch_task_types().await.map_err(|e| {
                error!(error = %e, "Error fetching task types");
                e.to_string()
            });
            let _ = sender.send(AppEvent::TaskTypesLoaded(result));
        });
    }

    pub fn create_task(&self, new_task: NewTask) {
        let (sender, api) = self.request_context();

        tokio::spawn(async move {
            let result = api.create_task(&new_task).await.map_err(|e| {
                error!(error = %e, title = %new_task.title, "Error adding task");
                e.to_string()
            });
            let _ = sender.send(AppEvent::TaskCreated(result));
        });
    }

    pub fn delete_task(&self, id: TaskId) {
        let (sender, api) = self.request_context();

        tokio::spawn(async move {
            let result = api.delete_task(&id).await.map_err(|e| {
                error!(error = %e, task_id = %id, "Error deleting task");
                e.to_string()
            });
            let _ = sender.send(AppEvent::TaskDeleted { id, result });
        });
    }

    /// Lets the server interpret `text`, then stores the derived task.
    pub fn enhance_task(&self, text: String) {
        let (sender, api) = self.request_context();

        tokio::spawn(async move {
            let result = async {
                let derived = api.enhance_task(&text).await?;
                api.create_task(&derived).await
            }
            .await
            .map_err(|e| {
                error!(error = %e, "Error processing task");
                e.to_string()
            });
            let _ = sender.send(AppEvent::TaskEnhanced(result));
        });
    }
}
