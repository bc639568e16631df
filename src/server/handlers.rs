// src/server/handlers.rs

use std::convert::Infallible;

use chrono::{SecondsFormat, Utc};
use tracing::{error, info, warn};
use warp::{
    http::{Method, StatusCode},
    hyper::body::Bytes,
    reject::Rejection,
    reply::Reply,
};

use super::response::{json_reply, CreatedResponse, ErrorResponse, JsonReply, ListResponse};
use super::Gateway;
use crate::error::SheetError;
use crate::sheet::{to_records, NewTask};

pub async fn health_check() -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&serde_json::json!({
        "status": "healthy",
        "service": "sheetgate"
    })))
}

/// Anything on `/api/tasks` the read and write routes did not take.
pub async fn method_not_allowed(method: Method, gateway: Gateway) -> Result<JsonReply, Rejection> {
    if method == Method::POST && gateway.config().write_enabled {
        // The write route already rejected this one (body too large or
        // unsized); let that rejection through.
        return Err(warp::reject::not_found());
    }
    info!(%method, "tasks method refused");
    Ok(json_reply(
        StatusCode::METHOD_NOT_ALLOWED,
        &ErrorResponse::new(format!("Method {} not allowed", method)),
    ))
}

pub async fn list_tasks(gateway: Gateway) -> Result<JsonReply, Rejection> {
    info!("tasks read");
    let outcome = gateway.fetcher().fetch_rows().await;
    let data = to_records(outcome.matrix());
    info!(count = data.len(), source = outcome.source(), "serving tasks");

    Ok(json_reply(
        StatusCode::OK,
        &ListResponse {
            success: true,
            count: data.len(),
            data,
            source: outcome.source().to_string(),
            sheet_id: gateway.config().sheet_id.clone(),
            last_updated: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        },
    ))
}

pub async fn create_task(gateway: Gateway, body: Bytes) -> Result<JsonReply, Rejection> {
    info!(bytes = body.len(), "tasks write");
    let new_task: NewTask = if body.is_empty() {
        NewTask::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(t) => t,
            Err(e) => {
                warn!("rejecting unparseable body: {}", e);
                return Ok(json_reply(
                    StatusCode::BAD_REQUEST,
                    &ErrorResponse::new(format!("Invalid JSON body: {}", e)),
                ));
            }
        }
    };

    Ok(match gateway.appender().append(new_task).await {
        Ok(record) => json_reply(
            StatusCode::CREATED,
            &CreatedResponse {
                success: true,
                message: "Task added successfully".to_string(),
                data: record,
            },
        ),
        Err(e) => error_reply(&e),
    })
}

fn error_reply(err: &SheetError) -> JsonReply {
    match err {
        SheetError::Validation(msg) => {
            warn!("validation failed: {}", msg);
            json_reply(StatusCode::BAD_REQUEST, &ErrorResponse::new(msg.clone()))
        }
        SheetError::Configuration(msg) => {
            error!("write path misconfigured: {}", msg);
            json_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                &ErrorResponse::new(format!("Server configuration error: {}", msg)),
            )
        }
        other => {
            error!("append failed: {}", other);
            json_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                &ErrorResponse::new("Failed to add task").with_error(other.to_string()),
            )
        }
    }
}

/// Turn leftover warp rejections into the same JSON envelope.
pub async fn handle_rejection(err: Rejection) -> Result<JsonReply, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("Request body exceeds {} bytes", super::MAX_BODY_BYTES),
        )
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        (
            StatusCode::LENGTH_REQUIRED,
            "Content-Length is required".to_string(),
        )
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else if let Some(e) = err.find::<warp::cors::CorsForbidden>() {
        (StatusCode::FORBIDDEN, e.to_string())
    } else {
        error!("unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    };
    Ok(json_reply(status, &ErrorResponse::new(message)))
}
