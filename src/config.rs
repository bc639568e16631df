// src/config.rs

use std::env;

/// Spreadsheet served when `SHEET_ID` is not set.
pub const DEFAULT_SHEET_ID: &str = "1h2Zl4bXnYvQ0y6o2yX9kFq3tB8Yd1cVw5sLr7mJpA0E";

pub const DEFAULT_CSV_URL_TEMPLATE: &str =
    "https://docs.google.com/spreadsheets/d/{sheet_id}/export?format=csv";

pub const DEFAULT_APPEND_URL_TEMPLATE: &str = "https://sheets.googleapis.com/v4/spreadsheets/{sheet_id}/values/Sheet1!A:D:append?valueInputOption=USER_ENTERED&insertDataOption=INSERT_ROWS";

/// Some export paths reject anything that doesn't look like a browser.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const DEFAULT_PORT: u16 = 8080;

/// Which CSV tokenizer turns the export body into rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenizerMode {
    /// Split on newlines and commas, strip every quote character.
    #[default]
    Legacy,
    /// RFC-4180 parsing; quoted commas and newlines survive.
    Strict,
}

/// Everything the fetcher, the append adapter and the server need, gathered
/// once at startup and passed in explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub sheet_id: String,
    pub csv_url_template: String,
    pub append_url_template: String,
    pub write_token: Option<String>,
    pub write_enabled: bool,
    pub tokenizer: TokenizerMode,
    pub user_agent: String,
    pub port: u16,
}

impl Config {
    pub fn new(sheet_id: impl Into<String>) -> Self {
        Self {
            sheet_id: sheet_id.into(),
            csv_url_template: DEFAULT_CSV_URL_TEMPLATE.to_string(),
            append_url_template: DEFAULT_APPEND_URL_TEMPLATE.to_string(),
            write_token: None,
            write_enabled: false,
            tokenizer: TokenizerMode::Legacy,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            port: DEFAULT_PORT,
        }
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source. Empty values
    /// are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut cfg = Self::new(get("SHEET_ID").unwrap_or_else(|| DEFAULT_SHEET_ID.to_string()));
        if let Some(t) = get("SHEET_CSV_URL") {
            cfg.csv_url_template = t;
        }
        if let Some(t) = get("SHEET_APPEND_URL") {
            cfg.append_url_template = t;
        }
        if let Some(ua) = get("SHEETGATE_USER_AGENT") {
            cfg.user_agent = ua;
        }
        cfg.write_token = get("SHEETS_ACCESS_TOKEN");
        cfg.write_enabled = get("SHEETGATE_ENABLE_WRITES").is_some_and(|v| parse_flag(&v));
        if get("SHEETGATE_STRICT_CSV").is_some_and(|v| parse_flag(&v)) {
            cfg.tokenizer = TokenizerMode::Strict;
        }
        cfg.port = get("PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);
        cfg
    }

    pub fn with_csv_url_template(mut self, template: impl Into<String>) -> Self {
        self.csv_url_template = template.into();
        self
    }

    pub fn with_append_url_template(mut self, template: impl Into<String>) -> Self {
        self.append_url_template = template.into();
        self
    }

    pub fn with_write_token(mut self, token: impl Into<String>) -> Self {
        self.write_token = Some(token.into());
        self
    }

    pub fn with_writes_enabled(mut self, enabled: bool) -> Self {
        self.write_enabled = enabled;
        self
    }

    pub fn with_tokenizer(mut self, mode: TokenizerMode) -> Self {
        self.tokenizer = mode;
        self
    }

    pub fn csv_url(&self) -> String {
        fill_template(&self.csv_url_template, &self.sheet_id)
    }

    pub fn append_url(&self) -> String {
        fill_template(&self.append_url_template, &self.sheet_id)
    }
}

fn fill_template(template: &str, sheet_id: &str) -> String {
    template.replace("{sheet_id}", sheet_id)
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}
