//! HTTP API over the statistics engine.

pub mod dto;
pub mod error;

use crate::core::{PriceRecord, StatsEngine};
use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use dto::CryptoDto;
use error::ApiError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    day: u32,
    month: u32,
    year: i32,
}

/// Assemble the API router.
pub fn router(engine: Arc<StatsEngine>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/crypto/stats/normalized", get(stats_by_normalized_range))
        .route("/crypto/stats/highest", get(highest_for_day))
        .route("/crypto/stats/{symbol}", get(stats_for_symbol))
        .route("/data/records", post(add_records))
        .layer(TraceLayer::new_for_http())
        .with_state(engine)
}

/// Serves the API until Ctrl+C.
pub async fn serve(engine: Arc<StatsEngine>, bind: &str, port: u16) -> Result<()> {
    let addr: SocketAddr = format!("{bind}:{port}")
        .parse()
        .with_context(|| format!("Invalid bind address: {bind}:{port}"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(engine))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn logged<T: Serialize>(body: T) -> Json<T> {
    if let Ok(text) = serde_json::to_string(&body) {
        debug!("Response body: {text}");
    }
    Json(body)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn stats_by_normalized_range(
    State(engine): State<Arc<StatsEngine>>,
) -> Result<Json<Vec<CryptoDto>>, ApiError> {
    let stats = engine.all_currencies_by_normalized_range().await?;
    Ok(logged(stats.into_iter().map(CryptoDto::from).collect()))
}

async fn stats_for_symbol(
    State(engine): State<Arc<StatsEngine>>,
    Path(symbol): Path<String>,
) -> Result<Json<CryptoDto>, ApiError> {
    let stats = engine.stats_for_currency(&symbol).await?;
    Ok(logged(stats.into()))
}

async fn highest_for_day(
    State(engine): State<Arc<StatsEngine>>,
    Query(q): Query<DateQuery>,
) -> Result<Json<CryptoDto>, ApiError> {
    let stats = engine
        .highest_normalized_range_on_date(q.day, q.month, q.year)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "No price data for {:02}-{:02}-{}",
                q.day, q.month, q.year
            ))
        })?;
    Ok(logged(stats.into()))
}

async fn add_records(
    State(engine): State<Arc<StatsEngine>>,
    Json(records): Json<Vec<PriceRecord>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let saved = records.len();
    engine.add_new_data(records).await?;
    Ok((StatusCode::CREATED, logged(json!({ "saved": saved }))))
}
