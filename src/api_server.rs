// Axum API server module
//
// Purpose: JSON API over the plant store + care engine, with optional
// polishing of recommendation text (cached with moka).

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use moka::future::Cache;
use serde::Deserialize;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::care::{evaluate, evaluate_all, PlantObservation, PlantReport};
use crate::config::AppConfig;
use crate::polish::{polish_or_original, CompletionPolisher, IdentityPolisher, Polisher};
use crate::repository::{CsvStore, GrowthEntry, GrowthLog, NewPlant, PlantRepository, StoreError};
use crate::species;

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub plants: Arc<dyn PlantRepository>,
    pub growth: Arc<dyn GrowthLog>,
    pub polisher: Arc<dyn Polisher>,
    /// Unpolished text -> polished text
    pub polish_cache: Cache<String, String>,
}

impl AppState {
    pub fn new<S>(store: Arc<S>, polisher: Arc<dyn Polisher>) -> Self
    where
        S: PlantRepository + GrowthLog + 'static,
    {
        let polish_cache = Cache::builder()
            .max_capacity(1_000)
            .time_to_live(Duration::from_secs(300)) // 5 min TTL
            .build();

        Self {
            plants: store.clone(),
            growth: store,
            polisher,
            polish_cache,
        }
    }

    /// CSV store in `DATA_DIR`, completion polisher when a key is configured
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        tracing::info!("Opening plant store...");
        let store = Arc::new(CsvStore::open(&config.data_dir)?);

        let polisher: Arc<dyn Polisher> = match &config.polish.api_key {
            Some(key) => {
                tracing::info!("Polishing enabled via {} ({})", config.polish.endpoint, config.polish.model);
                Arc::new(CompletionPolisher::new(
                    config.polish.endpoint.clone(),
                    key.clone(),
                    config.polish.model.clone(),
                    config.polish.timeout,
                )?)
            }
            None => {
                tracing::info!("No polishing key configured, recommendations are served verbatim");
                Arc::new(IdentityPolisher)
            }
        };

        Ok(Self::new(store, polisher))
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Species reference table
        .route("/api/species", get(list_species))
        .route("/api/species/:name", get(get_species))

        // Plants
        .route("/api/plants", get(list_plants).post(add_plant))
        .route("/api/plants/:id", get(get_plant))
        .route("/api/plants/:id/water", post(water_plant))
        .route("/api/plants/:id/fertilize", post(fertilize_plant))
        .route("/api/plants/:id/growth", get(get_growth).post(add_growth))

        // Stateless evaluation
        .route("/api/evaluate", post(evaluate_observation))

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Request types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// Evaluation date; defaults to the server's local date
    pub today: Option<NaiveDate>,
    #[serde(default)]
    pub polish: bool,
}

#[derive(Debug, Deserialize)]
pub struct NewGrowthRequest {
    pub height_cm: f64,
    #[serde(default)]
    pub notes: String,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub observation: PlantObservation,
    pub today: Option<NaiveDate>,
    #[serde(default)]
    pub polish: bool,
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn list_species() -> impl IntoResponse {
    Json(serde_json::json!({
        "species": species::all(),
        "default": &species::DEFAULT_PROFILE,
    }))
}

async fn get_species(Path(name): Path<String>) -> impl IntoResponse {
    let (profile, matched) = species::resolve(&name);
    Json(serde_json::json!({
        "name": name,
        "matched": matched,
        "profile": profile,
    }))
}

async fn list_plants(
    State(state): State<AppState>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Query(query) = query?;
    let today = query.today.unwrap_or_else(local_today);

    let plants = state.plants.clone();
    let records = run_blocking(move || plants.list_all()).await?;

    let start = std::time::Instant::now();
    let mut reports = evaluate_all(records, today);
    tracing::debug!("Evaluated {} plants in {:?}", reports.len(), start.elapsed());

    if query.polish {
        polish_reports(&state, &mut reports).await;
    }

    Ok(Json(serde_json::json!({
        "today": today,
        "count": reports.len(),
        "plants": reports,
    })))
}

async fn add_plant(
    State(state): State<AppState>,
    plant: Result<Json<NewPlant>, JsonRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let Json(plant) = plant?;
    let plants = state.plants.clone();
    let today = local_today();
    let record = run_blocking(move || plants.insert(plant, today)).await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!(record))))
}

async fn get_plant(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (Path(id), Query(query)) = (id?, query?);
    let today = query.today.unwrap_or_else(local_today);

    let plants = state.plants.clone();
    let record = run_blocking(move || plants.get(id)).await?;

    let mut report = PlantReport::build(record, today);
    if query.polish {
        report.polished = Some(polish_cached(&state, report.evaluation.to_text()).await);
    }

    Ok(Json(serde_json::json!(report)))
}

async fn water_plant(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Path(id) = id?;
    let plants = state.plants.clone();
    let today = local_today();
    let record = run_blocking(move || plants.mark_watered(id, today)).await?;
    Ok(Json(serde_json::json!(record)))
}

async fn fertilize_plant(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Path(id) = id?;
    let plants = state.plants.clone();
    let today = local_today();
    let record = run_blocking(move || plants.mark_fertilized(id, today)).await?;
    Ok(Json(serde_json::json!(record)))
}

async fn get_growth(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Path(id) = id?;
    let plants = state.plants.clone();
    let growth = state.growth.clone();
    let entries = run_blocking(move || {
        plants.get(id)?;
        growth.for_plant(id)
    })
    .await?;

    Ok(Json(serde_json::json!({
        "plant_id": id,
        "count": entries.len(),
        "entries": entries,
    })))
}

async fn add_growth(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    req: Result<Json<NewGrowthRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let (Path(id), Json(req)) = (id?, req?);
    let entry = GrowthEntry::new(id, req.date.unwrap_or_else(local_today), req.height_cm, req.notes)?;

    let plants = state.plants.clone();
    let growth = state.growth.clone();
    let saved = entry.clone();
    run_blocking(move || {
        plants.get(id)?;
        growth.append(entry)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!(saved))))
}

async fn evaluate_observation(
    State(state): State<AppState>,
    req: Result<Json<EvaluateRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Json(req) = req?;
    let today = req.today.unwrap_or_else(local_today);
    let (profile, matched) = species::resolve(&req.observation.species);
    let evaluation = evaluate(&req.observation, profile, today);

    let polished = if req.polish {
        Some(polish_cached(&state, evaluation.to_text()).await)
    } else {
        None
    };

    Ok(Json(serde_json::json!({
        "today": today,
        "species_matched": matched,
        "profile": profile,
        "evaluation": evaluation,
        "polished": polished,
    })))
}

// ============================================================================
// Helpers
// ============================================================================

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Store calls touch the filesystem; keep them off the async workers
async fn run_blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("Store task failed: {}", e)))?
        .map_err(AppError::from)
}

/// Only successful rewrites are cached, so a failing collaborator is retried
async fn polish_cached(state: &AppState, text: String) -> String {
    if let Some(cached) = state.polish_cache.get(&text).await {
        tracing::debug!("Cache hit for polished text");
        return cached;
    }

    let polished = polish_or_original(state.polisher.as_ref(), &text).await;
    if polished != text {
        state.polish_cache.insert(text, polished.clone()).await;
    }
    polished
}

/// Polish every report concurrently; a failed task keeps its plain text
async fn polish_reports(state: &AppState, reports: &mut [PlantReport]) {
    let mut tasks = tokio::task::JoinSet::new();
    for (idx, report) in reports.iter().enumerate() {
        let state = state.clone();
        let text = report.evaluation.to_text();
        tasks.spawn(async move { (idx, polish_cached(&state, text).await) });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((idx, polished)) => reports[idx].polished = Some(polished),
            Err(e) => tracing::warn!("Polishing task failed: {}", e),
        }
    }

    for report in reports.iter_mut().filter(|r| r.polished.is_none()) {
        report.polished = Some(report.evaluation.to_text());
    }
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::NotFound(format!("Plant {} not found", id)),
            StoreError::Validation(msg) => AppError::BadRequest(msg),
            other => {
                tracing::error!("Store error: {}", other);
                AppError::Internal(other.to_string())
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
