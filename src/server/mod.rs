// src/server/mod.rs

use std::{convert::Infallible, sync::Arc};

use anyhow::Result;
use warp::{reject::Rejection, reply::Reply, Filter};

use crate::config::Config;
use crate::sheet::{build_client, AppendAdapter, SheetFetcher};

pub mod handlers;
pub mod response;

/// Largest write body buffered before the request is refused with 413.
pub const MAX_BODY_BYTES: u64 = 16 * 1024;

/// Per-process handles shared by every request. Holds no mutable state.
#[derive(Clone)]
pub struct Gateway {
    config: Arc<Config>,
    fetcher: SheetFetcher,
    appender: AppendAdapter,
}

impl Gateway {
    pub fn new(config: Config) -> Result<Self> {
        let client = build_client(&config)?;
        let config = Arc::new(config);
        Ok(Self {
            fetcher: SheetFetcher::new(client.clone(), config.clone()),
            appender: AppendAdapter::new(client, config.clone()),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn fetcher(&self) -> &SheetFetcher {
        &self.fetcher
    }

    pub fn appender(&self) -> &AppendAdapter {
        &self.appender
    }
}

fn with_gateway(
    gateway: Gateway,
) -> impl Filter<Extract = (Gateway,), Error = Infallible> + Clone {
    warp::any().map(move || gateway.clone())
}

/// Passes the gateway through only when writes are enabled; otherwise the
/// request falls through to the 405 route.
fn writable(gateway: Gateway) -> impl Filter<Extract = (Gateway,), Error = Rejection> + Clone {
    with_gateway(gateway).and_then(|gateway: Gateway| async move {
        if gateway.config().write_enabled {
            Ok(gateway)
        } else {
            Err(warp::reject::not_found())
        }
    })
}

/// `/health` plus the `/api/tasks` resource, with CORS and JSON rejections.
pub fn routes(
    gateway: Gateway,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(handlers::health_check);

    // Only the write route reads a body, and only up to MAX_BODY_BYTES.
    let tasks = warp::path!("api" / "tasks");
    let list = tasks
        .clone()
        .and(warp::get())
        .and(with_gateway(gateway.clone()))
        .and_then(handlers::list_tasks);
    let create = tasks
        .clone()
        .and(warp::post())
        .and(writable(gateway.clone()))
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::bytes())
        .and_then(handlers::create_task);
    let other = tasks
        .and(warp::method())
        .and(with_gateway(gateway))
        .and_then(handlers::method_not_allowed);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_header("content-type");

    health
        .or(list)
        .or(create)
        .or(other)
        .with(cors)
        .recover(handlers::handle_rejection)
        .with(warp::trace::request())
}
