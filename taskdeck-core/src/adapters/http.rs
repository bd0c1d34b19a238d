//! Task service HTTP client
//!
//! Talks JSON to the task-management REST API:
//! - POST /api/auth/signin, POST /api/auth/signup (no auth header)
//! - GET/POST /api/tasks, GET/PUT/DELETE /api/tasks/{id}
//! - PATCH /api/tasks/{id}/status?status=..., GET /api/tasks/overdue

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::domain::result::{Error, Result};
use crate::domain::{Credentials, SignInResponse, SignUpRequest, Task, TaskFields, TaskId, TaskStatus};
use crate::ports::TaskApi;

/// Default request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Error body shape used by the server (`{"message": "..."}`)
#[derive(Debug, Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: Option<String>,
}

/// HTTP implementation of [`TaskApi`]
#[derive(Debug)]
pub struct HttpTaskApi {
    client: Client,
    base_url: String,
    timeout_secs: u64,
}

impl HttpTaskApi {
    /// Create a client for the server at `base_url` (e.g. `http://localhost:8080`)
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid API URL '{}': {}", base_url, e)))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(Error::Config(format!(
                "API URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// Send a request and turn any non-success status into an application error
    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().map_err(|e| self.map_request_error(e))?;
        Self::check_response_status(response)
    }

    fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request)?;
        response
            .json::<T>()
            .map_err(|e| Error::transport(format!("Invalid response from server: {}", e)))
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::transport(format!(
                "Connection timed out after {} seconds",
                self.timeout_secs
            ))
        } else if error.is_connect() {
            Error::transport(format!("Unable to connect to {}", self.base_url))
        } else {
            Error::transport(format!("Request failed: {}", error))
        }
    }

    /// Pass 2xx responses through; otherwise read the `message` field if any
    fn check_response_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .ok()
            .and_then(|body| serde_json::from_str::<MessageBody>(&body).ok())
            .and_then(|body| body.message);

        Err(Error::application(status.as_u16(), message))
    }
}

impl TaskApi for HttpTaskApi {
    fn sign_in(&self, credentials: &Credentials) -> Result<SignInResponse> {
        self.send_json(self.client.post(self.url("/auth/signin")).json(credentials))
    }

    fn sign_up(&self, request: &SignUpRequest) -> Result<()> {
        self.send(self.client.post(self.url("/auth/signup")).json(request))?;
        Ok(())
    }

    fn list_tasks(&self, token: &str) -> Result<Vec<Task>> {
        self.send_json(self.client.get(self.url("/tasks")).bearer_auth(token))
    }

    fn get_task(&self, token: &str, id: TaskId) -> Result<Task> {
        self.send_json(
            self.client
                .get(self.url(&format!("/tasks/{}", id)))
                .bearer_auth(token),
        )
    }

    fn list_overdue(&self, token: &str) -> Result<Vec<Task>> {
        self.send_json(self.client.get(self.url("/tasks/overdue")).bearer_auth(token))
    }

    fn create_task(&self, token: &str, fields: &TaskFields) -> Result<Task> {
        self.send_json(
            self.client
                .post(self.url("/tasks"))
                .bearer_auth(token)
                .json(fields),
        )
    }

    fn update_task(&self, token: &str, id: TaskId, fields: &TaskFields) -> Result<Task> {
        self.send_json(
            self.client
                .put(self.url(&format!("/tasks/{}", id)))
                .bearer_auth(token)
                .json(fields),
        )
    }

    fn update_status(&self, token: &str, id: TaskId, status: TaskStatus) -> Result<Task> {
        self.send_json(
            self.client
                .patch(self.url(&format!("/tasks/{}/status", id)))
                .query(&[("status", status.as_str())])
                .bearer_auth(token),
        )
    }

    fn delete_task(&self, token: &str, id: TaskId) -> Result<()> {
        self.send(
            self.client
                .delete(self.url(&format!("/tasks/{}", id)))
                .bearer_auth(token),
        )?;
        Ok(())
    }
}
