//! Eremetic scheduler client.
//!
//! A lightweight client for the scheduler's task endpoints:
//!
//! - `POST {prefix}/task` launches a task and returns its id
//! - `GET {prefix}/task/{id}/stdout` and `/stderr` read the task's logs
//! - `POST {prefix}/task/{id}/kill` asks the scheduler to stop a task
//!
//! The primary entry point is [`EremeticClient`]. Failures are reported as
//! [`ApiError`], whose [`ApiError::user_message`] is the text to put in
//! front of a user.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use eremetic_api::EremeticClient;
//!
//! let client = EremeticClient::new("http://localhost:8000", None, Duration::from_secs(30))?;
//! let task_id = client.launch_task(&request).await?;
//! println!("launched {task_id}");
//! ```

use std::env;
use std::error::Error as _;
use std::time::Duration;

use eremetic_types::{LogStream, TaskId, TaskLaunchRequest};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, header};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Message shown when the scheduler rejects a request without saying why.
pub const GENERIC_FAILURE_MESSAGE: &str = "The scheduler could not process the request";

/// Characters escaped when a task id becomes a single path segment.
const SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Failures talking to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("invalid scheduler URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),
    /// The scheduler answered with a non-success status.
    #[error("scheduler returned HTTP {status}: {}", message.as_deref().unwrap_or(GENERIC_FAILURE_MESSAGE))]
    Rejected { status: u16, message: Option<String> },
    /// A success response the client could not interpret.
    #[error("unexpected scheduler response: {0}")]
    UnexpectedBody(String),
}

impl ApiError {
    /// Text for the user: the scheduler's own message when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected { message: Some(message), .. } => message.clone(),
            ApiError::Rejected { status, message: None } => format!("{GENERIC_FAILURE_MESSAGE} (HTTP {status})"),
            ApiError::Network(reason) => format!("Could not reach the scheduler: {reason}"),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        // The top-level reqwest message hides the cause (refused, TLS, timeout).
        let mut reason = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            reason.push_str(": ");
            reason.push_str(&cause.to_string());
            source = cause.source();
        }
        ApiError::Network(reason)
    }
}

/// Thin wrapper around a configured `reqwest::Client` for one scheduler.
#[derive(Debug, Clone)]
pub struct EremeticClient {
    base_url: String,
    http: Client,
    user_agent: String,
}

impl EremeticClient {
    /// Build a client for `base_url`, optionally below a path prefix.
    ///
    /// The prefix is inserted between the host and `/task`, so a scheduler
    /// served behind `/eremetic` is reached with `url_prefix = "/eremetic"`.
    pub fn new(base_url: &str, url_prefix: Option<&str>, timeout: Duration) -> Result<Self, ApiError> {
        validate_base_url(base_url)?;

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .build()
            .map_err(|error| ApiError::Network(format!("build http client: {error}")))?;

        Ok(Self {
            base_url: join_prefix(base_url, url_prefix),
            http,
            user_agent: format!("eremetic-launcher/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
        })
    }

    /// Scheduler root including any prefix, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "building request");
        self.http.request(method, url).header(header::USER_AGENT, &self.user_agent)
    }

    /// Submit a launch request and return the id the scheduler assigned.
    pub async fn launch_task(&self, request: &TaskLaunchRequest) -> Result<TaskId, ApiError> {
        let response = self.request(Method::POST, "/task").json(request).send().await?;
        let response = ensure_success(response).await?;

        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;
        let task_id = parse_task_id(&body, location.as_deref())?;
        debug!(%task_id, "launch accepted");
        Ok(task_id)
    }

    /// Fetch one log stream of a task as text.
    pub async fn task_log(&self, task_id: &TaskId, stream: LogStream) -> Result<String, ApiError> {
        let path = format!("/task/{}/{}", task_segment(task_id), stream.as_str());
        let response = self.request(Method::GET, &path).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.text().await?)
    }

    /// Ask the scheduler to kill a running task.
    pub async fn kill_task(&self, task_id: &TaskId) -> Result<(), ApiError> {
        let path = format!("/task/{}/kill", task_segment(task_id));
        let response = self.request(Method::POST, &path).send().await?;
        let status = response.status();
        if status == StatusCode::ACCEPTED {
            return Ok(());
        }
        let response = ensure_success(response).await?;
        Err(ApiError::UnexpectedBody(format!("kill answered HTTP {}", response.status().as_u16())))
    }
}

fn task_segment(task_id: &TaskId) -> String {
    utf8_percent_encode(task_id.as_str(), SEGMENT_ENCODE_SET).to_string()
}

async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    debug!(status = status.as_u16(), %body, "request rejected");
    Err(ApiError::Rejected {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// Pull a human-readable message out of an error body.
///
/// Accepts `{"message": ..}`, `{"error": ..}` (message preferred) or a bare
/// JSON string.
pub fn error_message(body: &str) -> Option<String> {
    let message = match serde_json::from_str::<Value>(body).ok()? {
        Value::String(text) => text,
        Value::Object(map) => ["message", "error"]
            .iter()
            .find_map(|field| map.get(*field).and_then(Value::as_str).map(str::to_string))?,
        _ => return None,
    };
    let message = message.trim();
    (!message.is_empty()).then(|| message.to_string())
}

/// Extract the created task id from a launch response.
///
/// The body may be a bare JSON string or an object with `taskId`, `task_id`
/// or `id`. A `Location` header ending in `/task/<id>` is used otherwise.
pub fn parse_task_id(body: &str, location: Option<&str>) -> Result<TaskId, ApiError> {
    let from_body = serde_json::from_str::<Value>(body).ok().and_then(|value| match value {
        Value::String(id) => Some(id),
        Value::Object(map) => ["taskId", "task_id", "id"]
            .iter()
            .find_map(|field| map.get(*field).and_then(Value::as_str).map(str::to_string)),
        _ => None,
    });
    let from_location = || {
        let location = location?;
        let (_, id) = location.trim_end_matches('/').rsplit_once("/task/")?;
        Some(id.to_string())
    };

    from_body
        .filter(|id| !id.trim().is_empty())
        .or_else(from_location)
        .filter(|id| !id.is_empty())
        .map(TaskId::new)
        .ok_or_else(|| ApiError::UnexpectedBody(format!("no task id in response body '{}'", body.trim())))
}

/// Validate that a base URL is usable: `http` or `https` with a host.
pub fn validate_base_url(base: &str) -> Result<(), ApiError> {
    let invalid = |reason: String| ApiError::InvalidBaseUrl {
        url: base.to_string(),
        reason,
    };
    let parsed = Url::parse(base).map_err(|error| invalid(error.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("scheme must be http or https, got '{}'", parsed.scheme())));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("a host is required".to_string()));
    }
    Ok(())
}

fn join_prefix(base_url: &str, url_prefix: Option<&str>) -> String {
    let base = base_url.trim_end_matches('/');
    match url_prefix.map(|prefix| prefix.trim_matches('/')).filter(|prefix| !prefix.is_empty()) {
        Some(prefix) => format!("{base}/{prefix}"),
        None => base.to_string(),
    }
}
