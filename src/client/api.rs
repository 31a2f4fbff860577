use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use time::Date;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::foods::FoodReference;
use crate::logs::{day::format_calendar_date, LogEntry, LogEntryInput};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{status}: {message}")]
    Status { status: StatusCode, message: String },
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status(),
        }
    }
}

/// Thin REST client for the `/api` surface. Each call is one request; nothing is retried.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// `base_url` is the server origin, e.g. `http://localhost:5001`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<FoodReference>, ClientError> {
        let res = self
            .http
            .get(self.url("/search"))
            .query(&[("q", query)])
            .send()
            .await?;
        json(res).await
    }

    pub async fn food(&self, name: &str) -> Result<FoodReference, ClientError> {
        let res = self
            .http
            .get(self.url("/food"))
            .query(&[("name", name)])
            .send()
            .await?;
        json(res).await
    }

    pub async fn create_log(&self, input: &LogEntryInput) -> Result<LogEntry, ClientError> {
        let res = self.http.post(self.url("/log")).json(input).send().await?;
        json(res).await
    }

    pub async fn logs_by_date(&self, date: Date) -> Result<Vec<LogEntry>, ClientError> {
        let res = self
            .http
            .get(self.url("/log/date"))
            .query(&[("date", format_calendar_date(date))])
            .send()
            .await?;
        json(res).await
    }

    pub async fn delete_log(&self, id: Uuid) -> Result<(), ClientError> {
        let res = self
            .http
            .delete(self.url(&format!("/log/{id}")))
            .send()
            .await?;
        check(res).await.map(|_| ())
    }
}

async fn check(res: Response) -> Result<Response, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("msg").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or(body);
    warn!(%status, %message, "api request failed");
    Err(ClientError::Status { status, message })
}

async fn json<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
    let res = check(res).await?;
    debug!(url = %res.url(), "api response");
    Ok(res.json::<T>().await?)
}
