use std::time::Duration;

use reqwest::{
    header::USER_AGENT,
    Client,
    Response,
    Url,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::core::{
    models::{
        ApiErrorBody,
        EnhanceRequest,
    },
    NewTask,
    ReminderError,
    Task,
    TaskId,
};

const CONNECT_TIMEOUT_SECS: u64 = 10;
const CLIENT_AGENT: &str = concat!("taskbell/", env!("CARGO_PKG_VERSION"), " (+reqwest)");

/// Async client for the task server's REST routes under `/api`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ReminderError> {
        let mut base_url = Url::parse(base_url.trim())
            .map_err(|e| ReminderError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(ReminderError::InvalidUrl(format!(
                "{}: expected an http(s) URL",
                base_url
            )));
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ReminderError::Config(format!("HTTP client build failed: {e}")))?;

        base_url.set_query(None);
        base_url.set_fragment(None);

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn fetch_tasks(&self) -> Result<Vec<Task>, ReminderError> {
        let url = self.endpoint(&["api", "tasks"])?;
        debug!(%url, "Fetching tasks");
        let response = self.client.get(url).header(USER_AGENT, CLIENT_AGENT).send().await?;
        read_json(response).await
    }

    pub async fn fetch_task_types(&self) -> Result<Vec<String>, ReminderError> {
        let url = self.endpoint(&["api", "task-types"])?;
        debug!(%url, "Fetching task types");
        let response = self.client.get(url).header(USER_AGENT, CLIENT_AGENT).send().await?;
        read_json(response).await
    }

    pub async fn create_task(&self, new_task: &NewTask) -> Result<Task, ReminderError> {
        let url = self.endpoint(&["api", "tasks"])?;
        debug!(%url, title = %new_task.title, "Adding task");
        let response =
            self.client.post(url).header(USER_AGENT, CLIENT_AGENT).json(new_task).send().await?;
        read_json(response).await
    }

    pub async fn delete_task(&self, id: &TaskId) -> Result<(), ReminderError> {
        let url = self.endpoint(&["api", "tasks", id.as_str()])?;
        debug!(%url, task_id = %id, "Deleting task");
        let response = self.client.delete(url).header(USER_AGENT, CLIENT_AGENT).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    /// Asks the server to turn free text into a task. Nothing is stored.
    pub async fn enhance_task(&self, text: &str) -> Result<NewTask, ReminderError> {
        let url = self.endpoint(&["api", "enhance-task"])?;
        debug!(%url, text, "Enhancing task");
        let response = self
            .client
            .post(url)
            .header(USER_AGENT, CLIENT_AGENT)
            .json(&EnhanceRequest { text })
            .send()
            .await?;
        read_json(response).await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ReminderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ReminderError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ReminderError> {
    let response = ensure_success(response).await?;
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

async fn ensure_success(response: Response) -> Result<Response, ReminderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|parsed| parsed.error)
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("request failed").to_string());

    Err(ReminderError::Status { status: status.as_u16(), url, message })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = ApiClient::new("http://10.0.0.2:5000").unwrap();
        assert_eq!(client.endpoint(&["api", "tasks"]).unwrap().as_str(), "http://10.0.0.2:5000/api/tasks");

        let nested = ApiClient::new("https://example.com/reminders/").unwrap();
        assert_eq!(
            nested.endpoint(&["api", "tasks", "12"]).unwrap().as_str(),
            "https://example.com/reminders/api/tasks/12"
        );
    }

    #[test]
    fn test_task_id_is_escaped() {
        let client = ApiClient::new("http://localhost:5000").unwrap();
        let url = client.endpoint(&["api", "tasks", "a/b"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/tasks/a%2Fb");
    }

    #[test]
    fn test_rejects_non_http_urls() {
        assert!(matches!(ApiClient::new("not a url"), Err(ReminderError::InvalidUrl(_))));
        assert!(matches!(ApiClient::new("ftp://host/"), Err(ReminderError::InvalidUrl(_))));
    }
}
