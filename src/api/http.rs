use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use crate::config::ApiConfig;
use crate::core::list::ListId;
use crate::core::task::TaskId;

use super::{Gateway, ListRecord, NetworkFailure, TaskRecord};

#[derive(Serialize)]
struct NewList<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct NewTask<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct CompletionPatch {
    completed: bool,
}

/// Gateway implementation speaking the backend's JSON protocol.
pub struct HttpGateway {
    base_url: String,
    http: Client,
}

impl HttpGateway {
    pub fn new(config: &ApiConfig) -> Result<Self, String> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Map a reqwest error onto the uniform failure type.
fn failure(err: reqwest::Error) -> NetworkFailure {
    match err.status() {
        Some(status) => NetworkFailure::Status(status.as_u16()),
        None => NetworkFailure::Transport(err.to_string()),
    }
}

/// Check the status and decode the JSON body of a successful response.
async fn into_record<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, NetworkFailure> {
    let status = resp.status();
    if !status.is_success() {
        return Err(NetworkFailure::Status(status.as_u16()));
    }
    resp.json::<T>().await.map_err(failure)
}

/// Check the status of a response whose body does not matter (deletes
/// answer 204).
fn into_empty(resp: reqwest::Response) -> Result<(), NetworkFailure> {
    let status = resp.status();
    if !status.is_success() {
        return Err(NetworkFailure::Status(status.as_u16()));
    }
    Ok(())
}

impl Gateway for HttpGateway {
    async fn create_list(&self, name: &str) -> Result<ListRecord, NetworkFailure> {
        let resp = self
            .http
            .post(self.url("/lists"))
            .json(&NewList { name })
            .send()
            .await
            .map_err(failure)?;
        into_record(resp).await
    }

    async fn delete_list(&self, id: &ListId) -> Result<(), NetworkFailure> {
        let resp = self
            .http
            .delete(self.url(&format!("/lists/{}", id)))
            .send()
            .await
            .map_err(failure)?;
        into_empty(resp)
    }

    async fn create_task(
        &self,
        list_id: &ListId,
        text: &str,
    ) -> Result<TaskRecord, NetworkFailure> {
        let resp = self
            .http
            .post(self.url(&format!("/lists/{}/tasks", list_id)))
            .json(&NewTask { text })
            .send()
            .await
            .map_err(failure)?;
        into_record(resp).await
    }

    async fn update_task_completion(
        &self,
        id: &TaskId,
        completed: bool,
    ) -> Result<TaskRecord, NetworkFailure> {
        let resp = self
            .http
            .patch(self.url(&format!("/tasks/{}", id)))
            .json(&CompletionPatch { completed })
            .send()
            .await
            .map_err(failure)?;
        into_record(resp).await
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), NetworkFailure> {
        let resp = self
            .http
            .delete(self.url(&format!("/tasks/{}", id)))
            .send()
            .await
            .map_err(failure)?;
        into_empty(resp)
    }
}
