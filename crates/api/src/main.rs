use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use finsight_core::domain::history::Period;
use finsight_core::domain::preference::PreferenceVector;
use finsight_core::domain::summary::StockSummary;
use finsight_core::pipeline::Pipeline;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = finsight_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let pipeline: Option<Pipeline> = match Pipeline::from_settings(&settings) {
        Ok(pipeline) => Some(pipeline),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "pipeline construction failed; starting API in degraded mode");
            None
        }
    };

    let state = AppState { pipeline };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/analyze", post(analyze))
        .route("/documents/query", post(query_documents))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    pipeline: Option<Pipeline>,
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    query: String,
    ticker: String,
    #[serde(default)]
    period: Period,
    #[serde(default)]
    preferences: PreferenceVector,
    #[serde(default = "default_use_rules")]
    use_rules: bool,
}

fn default_use_rules() -> bool {
    true
}

#[derive(Debug, Serialize)]
struct AnalyzeResponse {
    request_id: Uuid,
    response: String,
    sources: Vec<String>,
    summary: Option<StockSummary>,
    backend: &'static str,
}

async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, StatusCode> {
    let Some(pipeline) = &state.pipeline else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    if req.query.trim().is_empty() || req.ticker.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, ticker = %req.ticker, use_rules = req.use_rules, "analyze request");

    let outcome = pipeline
        .analyze(
            &req.query,
            &req.ticker,
            req.preferences,
            req.use_rules,
            req.period,
        )
        .await
        .map_err(|e| {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(%request_id, error = %e, "analyze failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(AnalyzeResponse {
        request_id,
        response: outcome.response,
        sources: outcome.sources,
        summary: outcome.summary,
        backend: outcome.backend,
    }))
}

#[derive(Debug, Deserialize)]
struct DocumentQueryRequest {
    query: String,
}

#[derive(Debug, Serialize)]
struct DocumentQueryResponse {
    request_id: Uuid,
    response: String,
    sources: Vec<String>,
}

async fn query_documents(
    State(state): State<AppState>,
    Json(req): Json<DocumentQueryRequest>,
) -> Result<Json<DocumentQueryResponse>, StatusCode> {
    let Some(pipeline) = &state.pipeline else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    if req.query.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, "document query request");

    let answer = pipeline.answer_from_documents(&req.query).await.map_err(|e| {
        sentry_anyhow::capture_anyhow(&e);
        tracing::error!(%request_id, error = %e, "document query failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(DocumentQueryResponse {
        request_id,
        response: answer.response,
        sources: answer.sources,
    }))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &finsight_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
