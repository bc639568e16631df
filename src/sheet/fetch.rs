// src/sheet/fetch.rs

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    redirect::Policy,
    Client,
};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::fallback::fallback_matrix;
use super::tokenize::{sanitize, tokenize_with, RowMatrix};
use crate::config::Config;

const MAX_REDIRECTS: usize = 10;

/// Result of reading the sheet. Both arms carry rows; `Degraded` borrows the
/// built-in fallback because the live read failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Live(RowMatrix),
    Degraded(&'static RowMatrix),
}

impl FetchOutcome {
    pub fn matrix(&self) -> &RowMatrix {
        match self {
            FetchOutcome::Live(m) => m,
            FetchOutcome::Degraded(m) => m,
        }
    }

    pub fn into_matrix(self) -> RowMatrix {
        match self {
            FetchOutcome::Live(m) => m,
            FetchOutcome::Degraded(m) => m.clone(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, FetchOutcome::Degraded(_))
    }

    /// Label reported to API callers.
    pub fn source(&self) -> &'static str {
        match self {
            FetchOutcome::Live(_) => "google_sheets",
            FetchOutcome::Degraded(_) => "fallback",
        }
    }
}

/// HTTP client shared by the fetcher and the append adapter: browser-like
/// user agent, redirects followed.
pub fn build_client(config: &Config) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/csv,text/plain;q=0.9,*/*;q=0.8"),
    );
    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .build()
        .context("building http client")
}

#[derive(Clone)]
pub struct SheetFetcher {
    client: Client,
    config: Arc<Config>,
}

impl SheetFetcher {
    pub fn new(client: Client, config: Arc<Config>) -> Self {
        Self { client, config }
    }

    /// Read the sheet. Never fails: any transport error or non-2xx status is
    /// logged and answered with the fallback rows.
    #[instrument(level = "info", skip(self), fields(sheet_id = %self.config.sheet_id))]
    pub async fn fetch_rows(&self) -> FetchOutcome {
        match self.fetch_live().await {
            Ok(matrix) => {
                info!(rows = matrix.len(), "fetched sheet");
                FetchOutcome::Live(matrix)
            }
            Err(e) => {
                warn!("sheet read failed, serving fallback rows: {:#}", e);
                FetchOutcome::Degraded(fallback_matrix())
            }
        }
    }

    async fn fetch_live(&self) -> Result<RowMatrix> {
        let url = Url::parse(&self.config.csv_url())
            .with_context(|| format!("parsing csv url {}", self.config.csv_url()))?;
        debug!(%url, "fetching csv export");

        let text = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Non-success status {}", url))?
            .text()
            .await
            .with_context(|| format!("Reading text from {}", url))?;

        let matrix = tokenize_with(self.config.tokenizer, &text)?;
        Ok(sanitize(matrix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{TokenizerMode, DEFAULT_USER_AGENT};
    use crate::sheet::records::to_records;
    use crate::test_upstream::{self, unreachable_config, Behavior};

    fn fetcher(config: Config) -> SheetFetcher {
        let client = build_client(&config).unwrap();
        SheetFetcher::new(client, Arc::new(config))
    }

    #[tokio::test]
    async fn live_read_is_tokenized_and_sanitized() {
        let upstream = test_upstream::spawn(Behavior::default()).await;
        let outcome = fetcher(upstream.config()).fetch_rows().await;

        assert!(!outcome.is_degraded());
        assert_eq!(outcome.source(), "google_sheets");
        // trailing CRLF produces a blank row that must be gone
        assert_eq!(outcome.matrix().len(), 4);
        let ids: Vec<_> = to_records(outcome.matrix())
            .iter()
            .filter_map(|r| r.id())
            .collect();
        assert_eq!(ids, vec![1, 2, 7]);
    }

    #[tokio::test]
    async fn sends_browser_user_agent() {
        let upstream = test_upstream::spawn(Behavior::default()).await;
        fetcher(upstream.config()).fetch_rows().await;
        let agents = upstream.user_agents.lock().unwrap().clone();
        assert_eq!(agents, vec![DEFAULT_USER_AGENT.to_string()]);
    }

    #[tokio::test]
    async fn non_success_status_degrades_to_fallback() {
        let upstream = test_upstream::spawn(Behavior {
            csv_status: 500,
            csv_body: "boom".to_string(),
            ..Behavior::default()
        })
        .await;
        let outcome = fetcher(upstream.config()).fetch_rows().await;

        assert_eq!(outcome, FetchOutcome::Degraded(fallback_matrix()));
        assert_eq!(outcome.source(), "fallback");
        assert_eq!(upstream.hits(), 1);
    }

    #[tokio::test]
    async fn network_failure_degrades_to_fallback() {
        let outcome = fetcher(unreachable_config()).fetch_rows().await;
        assert_eq!(outcome, FetchOutcome::Degraded(fallback_matrix()));
    }

    #[tokio::test]
    async fn follows_redirects() {
        let upstream = test_upstream::spawn(Behavior::default()).await;
        let config = upstream
            .config()
            .with_csv_url_template(format!("http://{}/moved/{{sheet_id}}", upstream.addr));
        let outcome = fetcher(config).fetch_rows().await;

        assert!(!outcome.is_degraded());
        assert_eq!(upstream.csv_hits.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn strict_mode_keeps_quoted_commas() {
        let upstream = test_upstream::spawn(Behavior {
            csv_body: "id,task\n1,\"milk, eggs\"\n".to_string(),
            ..Behavior::default()
        })
        .await;
        let legacy = fetcher(upstream.config()).fetch_rows().await;
        let strict = fetcher(upstream.config().with_tokenizer(TokenizerMode::Strict))
            .fetch_rows()
            .await;

        assert_eq!(legacy.matrix()[1], vec!["1", "milk", " eggs"]);
        assert_eq!(strict.matrix()[1], vec!["1", "milk, eggs"]);
    }

    #[tokio::test]
    async fn empty_export_is_live_and_empty() {
        let upstream = test_upstream::spawn(Behavior {
            csv_body: String::new(),
            ..Behavior::default()
        })
        .await;
        let outcome = fetcher(upstream.config()).fetch_rows().await;
        assert_eq!(outcome, FetchOutcome::Live(Vec::new()));
    }
}
