// src/test_upstream.rs
//
// In-process stand-in for the spreadsheet export and append endpoints.

use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use serde_json::Value;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use warp::{
    http::{StatusCode, Uri},
    Filter,
};

use crate::config::Config;

pub const SAMPLE_CSV: &str = "\"id\",\"task\",\"completed\",\"created_date\"\r\n\"1\",\"Learn APIs\",\"FALSE\",\"2024-07-13\"\r\n\"2\",\"Write tests\",\"TRUE\",\"2024-07-14\"\r\n\"7\",\"Ship\",\"false\",\"2024-07-20\"\r\n";

#[derive(Clone)]
pub struct Behavior {
    pub csv_status: u16,
    pub csv_body: String,
    pub append_status: u16,
    pub append_body: String,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            csv_status: 200,
            csv_body: SAMPLE_CSV.to_string(),
            append_status: 200,
            append_body: r#"{"updates":{"updatedRows":1}}"#.to_string(),
        }
    }
}

pub struct Upstream {
    pub addr: SocketAddr,
    pub csv_hits: Arc<AtomicUsize>,
    pub append_hits: Arc<AtomicUsize>,
    pub user_agents: Arc<Mutex<Vec<String>>>,
    pub authorizations: Arc<Mutex<Vec<String>>>,
    pub appended: Arc<Mutex<Vec<Value>>>,
}

impl Upstream {
    pub fn config(&self) -> Config {
        Config::new("test-sheet")
            .with_csv_url_template(format!("http://{}/sheets/{{sheet_id}}/export.csv", self.addr))
            .with_append_url_template(format!("http://{}/sheets/{{sheet_id}}/append", self.addr))
    }

    pub fn hits(&self) -> usize {
        self.csv_hits.load(Ordering::SeqCst) + self.append_hits.load(Ordering::SeqCst)
    }
}

pub fn init_test_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sheetgate=debug")),
        )
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap()
}

pub async fn spawn(behavior: Behavior) -> Upstream {
    init_test_logging();
    let csv_hits = Arc::new(AtomicUsize::new(0));
    let append_hits = Arc::new(AtomicUsize::new(0));
    let user_agents = Arc::new(Mutex::new(Vec::new()));
    let authorizations = Arc::new(Mutex::new(Vec::new()));
    let appended = Arc::new(Mutex::new(Vec::new()));

    let csv = {
        let hits = csv_hits.clone();
        let agents = user_agents.clone();
        let b = behavior.clone();
        warp::get()
            .and(warp::path!("sheets" / String / "export.csv"))
            .and(warp::header::optional::<String>("user-agent"))
            .map(move |_sheet: String, ua: Option<String>| {
                hits.fetch_add(1, Ordering::SeqCst);
                agents.lock().unwrap().push(ua.unwrap_or_default());
                warp::reply::with_status(b.csv_body.clone(), status(b.csv_status))
            })
    };

    let moved = warp::get()
        .and(warp::path!("moved" / String))
        .map(|sheet: String| {
            let to: Uri = format!("/sheets/{sheet}/export.csv").parse().unwrap();
            warp::redirect::found(to)
        });

    let append = {
        let hits = append_hits.clone();
        let auths = authorizations.clone();
        let rows = appended.clone();
        let b = behavior.clone();
        warp::post()
            .and(warp::path!("sheets" / String / "append"))
            .and(warp::header::optional::<String>("authorization"))
            .and(warp::body::json())
            .map(move |_sheet: String, auth: Option<String>, body: Value| {
                hits.fetch_add(1, Ordering::SeqCst);
                auths.lock().unwrap().push(auth.unwrap_or_default());
                rows.lock().unwrap().push(body);
                warp::reply::with_status(b.append_body.clone(), status(b.append_status))
            })
    };

    let (addr, server) =
        warp::serve(csv.or(moved).or(append)).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);

    Upstream {
        addr,
        csv_hits,
        append_hits,
        user_agents,
        authorizations,
        appended,
    }
}

/// Config whose endpoints refuse connections.
pub fn unreachable_config() -> Config {
    init_test_logging();
    Config::new("test-sheet")
        .with_csv_url_template("http://127.0.0.1:1/sheets/{sheet_id}/export.csv")
        .with_append_url_template("http://127.0.0.1:1/sheets/{sheet_id}/append")
}
