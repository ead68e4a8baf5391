// src/server/mod.rs
pub mod session;

use serde::{Deserialize, Serialize};
use std::{convert::Infallible, sync::Arc};
use tracing::info;
use warp::{reject::Rejection, reply::Reply, Filter};

use crate::{
    config::AppConfig,
    data::{resolve, AffectedBy, Table},
    view::{page::render_index, project, ChartSpec},
};

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<Table>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(table: Table, config: AppConfig) -> Self {
        Self {
            table: Arc::new(table),
            config: Arc::new(config),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UpdateQuery {
    slct_impact: Option<String>,
}

#[derive(Debug, Serialize)]
struct UpdateResponse {
    status: String,
    figure: ChartSpec,
}

#[derive(Debug, Serialize)]
struct OptionsResponse {
    options: [AffectedBy; 6],
    default: AffectedBy,
}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

async fn health_check(state: AppState) -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "records": state.table.len(),
        "source": state.table.source().display().to_string(),
        "loaded_at": state.table.loaded_at().to_rfc3339(),
    })))
}

/// One-shot version of the dropdown callback. A missing value means the
/// default selection.
async fn update_graph(query: UpdateQuery, state: AppState) -> Result<impl Reply, Rejection> {
    let selection = query
        .slct_impact
        .unwrap_or_else(|| AffectedBy::default().as_str().to_string());
    info!(selection = %selection, "bee-killer selected");

    let view = resolve(state.table.records(), &selection);
    let (status, figure) = project(&view, &selection);
    Ok(warp::reply::json(&UpdateResponse { status, figure }))
}

/// All dashboard routes.
pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let index = warp::path::end()
        .and(warp::get())
        .map(|| warp::reply::html(render_index(AffectedBy::default())));

    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(health_check);

    let options = warp::path!("api" / "options").and(warp::get()).map(|| {
        warp::reply::json(&OptionsResponse {
            options: AffectedBy::ALL,
            default: AffectedBy::default(),
        })
    });

    let update = warp::path!("api" / "update")
        .and(warp::get())
        .and(warp::query::<UpdateQuery>())
        .and(with_state(state.clone()))
        .and_then(update_graph);

    let ws = warp::path("ws")
        .and(warp::path::end())
        .and(warp::ws())
        .and(with_state(state))
        .map(|ws: warp::ws::Ws, state: AppState| {
            ws.on_upgrade(move |socket| session::run(socket, state.table))
        });

    index
        .or(health)
        .or(options)
        .or(update)
        .or(ws)
        .with(warp::trace::request())
}
