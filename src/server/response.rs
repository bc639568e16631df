// src/server/response.rs

use serde::Serialize;
use warp::{
    http::StatusCode,
    reply::{self, Json, WithStatus},
};

use crate::sheet::Record;

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub data: Vec<Record>,
    pub count: usize,
    pub source: String,
    pub sheet_id: String,
    pub last_updated: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub success: bool,
    pub message: String,
    pub data: Record,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

pub type JsonReply = WithStatus<Json>;

pub fn json_reply<T: Serialize>(status: StatusCode, body: &T) -> JsonReply {
    reply::with_status(reply::json(body), status)
}
