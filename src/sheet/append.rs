// src/sheet/append.rs

use std::sync::Arc;

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, instrument, warn};
use url::Url;

use super::fetch::SheetFetcher;
use super::records::{to_records, FieldValue, Record};
use crate::config::Config;
use crate::error::SheetError;

pub const MAX_TASK_CHARS: usize = 100;

/// Body of a write request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTask {
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub created_date: Option<String>,
}

impl NewTask {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: Some(task.into()),
            ..Self::default()
        }
    }
}

/// Appends rows through the authenticated values-append endpoint.
///
/// The next id is computed from a fresh read of the sheet, so two appends
/// running at the same time can pick the same id. Callers that care must
/// serialise appends.
#[derive(Clone)]
pub struct AppendAdapter {
    client: Client,
    config: Arc<Config>,
    fetcher: SheetFetcher,
}

impl AppendAdapter {
    pub fn new(client: Client, config: Arc<Config>) -> Self {
        let fetcher = SheetFetcher::new(client.clone(), config.clone());
        Self {
            client,
            config,
            fetcher,
        }
    }

    #[instrument(level = "info", skip(self, new_task), fields(sheet_id = %self.config.sheet_id))]
    pub async fn append(&self, new_task: NewTask) -> Result<Record, SheetError> {
        let token = self.config.write_token.as_deref().ok_or_else(|| {
            SheetError::Configuration("write credential is not configured".to_string())
        })?;
        let task = validate_task(new_task.task.as_deref())?;

        let outcome = self.fetcher.fetch_rows().await;
        if outcome.is_degraded() {
            warn!("computing next id from fallback rows");
        }
        let id = next_id(&to_records(outcome.matrix()))?;
        let completed = new_task.completed.unwrap_or(false);
        let created_date = new_task
            .created_date
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(today);

        let url = Url::parse(&self.config.append_url())?;
        let body = json!({ "values": [[id, task, completed, created_date]] });
        let resp = self
            .client
            .post(url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = match resp.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(
                        status = status.as_u16(),
                        "could not read append error body: {}",
                        e
                    );
                    String::new()
                }
            };
            error!(status = status.as_u16(), %body, "append rejected");
            return Err(SheetError::UpstreamWrite {
                status: status.as_u16(),
                body,
            });
        }
        info!(id, "appended row");

        let mut record = Record::new();
        record.insert("id", FieldValue::Id(id));
        record.insert("task", FieldValue::Text(task));
        record.insert("completed", FieldValue::Flag(completed));
        record.insert("created_date", FieldValue::Text(created_date));
        Ok(record)
    }
}

/// Trimmed task text, or a validation error when it is missing, blank, or
/// longer than [`MAX_TASK_CHARS`].
pub fn validate_task(task: Option<&str>) -> Result<String, SheetError> {
    let task = task.map(str::trim).unwrap_or("");
    if task.is_empty() {
        return Err(SheetError::Validation("task is required".to_string()));
    }
    if task.chars().count() > MAX_TASK_CHARS {
        return Err(SheetError::Validation(format!(
            "task must be at most {} characters",
            MAX_TASK_CHARS
        )));
    }
    Ok(task.to_string())
}

/// One past the largest id present, or 1 for an empty sheet.
pub fn next_id(records: &[Record]) -> Result<i64, SheetError> {
    match records.iter().filter_map(Record::id).max() {
        None => Ok(1),
        Some(max) => max.checked_add(1).ok_or(SheetError::IdExhausted(max)),
    }
}

fn today() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}
