use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::engine::month::month_name;
use crate::engine::progress::{self, Progress};
use crate::engine::season::{classify_season, Season};
use crate::engine::{suitability, Crop, CropStatus, FarmTelemetry, PlantedCrop};
use crate::forecast_fetcher::{ForecastDay, WeatherCondition};
use crate::services::dashboard_service::{CatalogEntryView, DashboardView, PlantedCropView};
use crate::services::planting_service::{CancelOutcome, PlantOutcome};
use crate::services::{CatalogService, DashboardService, PlantingService, ServiceError};

#[derive(Clone)]
pub struct AppState {
    pub catalog_service: CatalogService,
    pub dashboard_service: DashboardService,
    pub planting_service: PlantingService,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize, ToSchema)]
pub struct SeasonResponse {
    #[schema(value_type = String, example = "Rabi")]
    pub season: Season,
    pub label_bn: String,
    /// 0-based calendar month the season was derived from
    pub month0: u32,
    pub month: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Case-insensitive substring of the crop name
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct CatalogResponse {
    #[schema(value_type = String, example = "Rabi")]
    pub season: Season,
    pub fetched_at: DateTime<Utc>,
    pub crops: Vec<Crop>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SuitabilityRequest {
    pub telemetry: FarmTelemetry,
    /// Defaults to the current season
    #[schema(value_type = Option<String>, example = "Rabi")]
    pub season: Option<Season>,
}

#[derive(Serialize, ToSchema)]
pub struct SuitabilityResponse {
    #[schema(value_type = String, example = "Rabi")]
    pub season: Season,
    pub known: bool,
    pub suitable_crops: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProgressRequest {
    pub plan_month: Option<String>,
    pub harvest_month: Option<String>,
    /// Defaults to `now`
    pub planted_date: Option<DateTime<Utc>>,
    /// Defaults to the server clock
    pub now: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlantRequest {
    #[serde(rename = "cropName")]
    pub crop_name: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        get_season,
        get_catalog,
        evaluate_suitability,
        estimate_progress,
        get_dashboard,
        plant_crop,
        cancel_crop
    ),
    components(schemas(
        HealthResponse,
        SeasonResponse,
        CatalogResponse,
        SuitabilityRequest,
        SuitabilityResponse,
        ProgressRequest,
        PlantRequest,
        Crop,
        CropStatus,
        FarmTelemetry,
        PlantedCrop,
        Progress,
        ForecastDay,
        WeatherCondition,
        CatalogEntryView,
        PlantedCropView,
        DashboardView,
        PlantOutcome
    )),
    tags((name = "crop-clock", description = "Crop suitability and planting progress"))
)]
pub struct ApiDoc;

pub fn generate_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/season", get(get_season))
        .route("/catalog", get(get_catalog))
        .route("/suitability", post(evaluate_suitability))
        .route("/progress", post(estimate_progress))
        .route("/farmers/{farmer_id}/dashboard", get(get_dashboard))
        .route("/farmers/{farmer_id}/crops", post(plant_crop))
        .route("/farmers/{farmer_id}/crops/{crop_name}", delete(cancel_crop))
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}

fn status_for(e: &ServiceError) -> StatusCode {
    match e {
        ServiceError::CatalogUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        ServiceError::FarmerNotFound(_) | ServiceError::UnknownCrop(_) => StatusCode::NOT_FOUND,
        ServiceError::Upstream(_) => StatusCode::BAD_GATEWAY,
        ServiceError::NotPlantable { .. } => StatusCode::CONFLICT,
    }
}

fn log_service_error(context: &str, e: &ServiceError) -> StatusCode {
    let status = status_for(e);
    if status.is_server_error() {
        error!("{}: {}", context, e);
    } else {
        warn!("{}: {}", context, e);
    }
    status
}

#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "crop-clock",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
#[instrument(skip(_state))]
async fn health(State(_state): State<AppState>) -> impl IntoResponse {
    debug!("Health check requested");
    let response = HealthResponse {
        status: "healthy".to_string(),
    };
    (StatusCode::OK, Json(response))
}

#[utoipa::path(
    get,
    path = "/api/v1/season",
    tag = "crop-clock",
    responses((status = 200, description = "Season in effect today", body = SeasonResponse))
)]
async fn get_season() -> Json<SeasonResponse> {
    let now = Utc::now();
    let season = classify_season(now);
    Json(SeasonResponse {
        season,
        label_bn: season.bengali_label().to_string(),
        month0: now.month0(),
        month: month_name(now.month0()).to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/catalog",
    tag = "crop-clock",
    params(SearchParams),
    responses(
        (status = 200, description = "Catalog entries for the current season", body = CatalogResponse),
        (status = 503, description = "Crop catalog could not be loaded")
    )
)]
#[instrument(skip(state))]
async fn get_catalog(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<CatalogResponse>, StatusCode> {
    let snapshot = state
        .catalog_service
        .current()
        .await
        .map_err(|e| log_service_error("Failed to load catalog", &e))?;

    let season = classify_season(Utc::now());
    let crops: Vec<Crop> = suitability::search(&snapshot.crops, season, params.search.as_deref())
        .into_iter()
        .cloned()
        .collect();

    info!("Returning {} catalog entries for {}", crops.len(), season);
    Ok(Json(CatalogResponse {
        season,
        fetched_at: snapshot.fetched_at,
        crops,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/suitability",
    tag = "crop-clock",
    request_body = SuitabilityRequest,
    responses(
        (status = 200, description = "Crops suitable under the posted conditions", body = SuitabilityResponse),
        (status = 503, description = "Crop catalog could not be loaded")
    )
)]
#[instrument(skip(state, request))]
async fn evaluate_suitability(
    State(state): State<AppState>,
    Json(request): Json<SuitabilityRequest>,
) -> Result<Json<SuitabilityResponse>, StatusCode> {
    let snapshot = state
        .catalog_service
        .current()
        .await
        .map_err(|e| log_service_error("Failed to load catalog", &e))?;

    let season = request.season.unwrap_or_else(|| classify_season(Utc::now()));
    let result = suitability::evaluate(&snapshot.crops, season, &request.telemetry);

    debug!("Suitability for {}: known={}", season, result.is_known());
    Ok(Json(SuitabilityResponse {
        season,
        known: result.is_known(),
        suitable_crops: result.sorted_names(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/progress",
    tag = "crop-clock",
    request_body = ProgressRequest,
    responses((status = 200, description = "Planting progress estimate", body = Progress))
)]
async fn estimate_progress(Json(request): Json<ProgressRequest>) -> Json<Progress> {
    let now = request.now.unwrap_or_else(Utc::now);
    Json(progress::estimate(
        request.plan_month.as_deref(),
        request.harvest_month.as_deref(),
        request.planted_date.unwrap_or(now),
        now,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/farmers/{farmer_id}/dashboard",
    tag = "crop-clock",
    params(
        ("farmer_id" = String, Path, description = "Farmer record id"),
        SearchParams
    ),
    responses(
        (status = 200, description = "Farmer dashboard", body = DashboardView),
        (status = 404, description = "Farmer not found"),
        (status = 502, description = "Farmer record store failed"),
        (status = 503, description = "Crop catalog could not be loaded")
    )
)]
#[instrument(skip(state), fields(farmer_id = %farmer_id))]
async fn get_dashboard(
    State(state): State<AppState>,
    Path(farmer_id): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<Json<DashboardView>, StatusCode> {
    let view = state
        .dashboard_service
        .dashboard(&farmer_id, params.search.as_deref(), Utc::now())
        .await
        .map_err(|e| log_service_error(&format!("Failed to build dashboard for {farmer_id}"), &e))?;

    info!(
        "Dashboard for {}: {} crops listed, {} planted",
        farmer_id,
        view.crops.len(),
        view.planted.len()
    );
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/api/v1/farmers/{farmer_id}/crops",
    tag = "crop-clock",
    params(("farmer_id" = String, Path, description = "Farmer record id")),
    request_body = PlantRequest,
    responses(
        (status = 201, description = "Crop planted", body = PlantOutcome),
        (status = 200, description = "Crop was already planted", body = PlantOutcome),
        (status = 404, description = "Farmer or crop not found"),
        (status = 409, description = "Crop is not plantable now")
    )
)]
#[instrument(skip(state, request), fields(farmer_id = %farmer_id, crop = %request.crop_name))]
async fn plant_crop(
    State(state): State<AppState>,
    Path(farmer_id): Path<String>,
    Json(request): Json<PlantRequest>,
) -> Result<(StatusCode, Json<PlantOutcome>), StatusCode> {
    let outcome = state
        .planting_service
        .plant(&farmer_id, &request.crop_name, Utc::now())
        .await
        .map_err(|e| log_service_error(&format!("Failed to plant for {farmer_id}"), &e))?;

    let status = match outcome {
        PlantOutcome::Planted { .. } => StatusCode::CREATED,
        PlantOutcome::AlreadyPlanted { .. } => StatusCode::OK,
    };
    Ok((status, Json(outcome)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/farmers/{farmer_id}/crops/{crop_name}",
    tag = "crop-clock",
    params(
        ("farmer_id" = String, Path, description = "Farmer record id"),
        ("crop_name" = String, Path, description = "Planted crop name")
    ),
    responses(
        (status = 204, description = "Crop removed"),
        (status = 404, description = "Farmer not found or crop not planted")
    )
)]
#[instrument(skip(state), fields(farmer_id = %farmer_id, crop = %crop_name))]
async fn cancel_crop(
    State(state): State<AppState>,
    Path((farmer_id, crop_name)): Path<(String, String)>,
) -> Result<StatusCode, StatusCode> {
    let outcome = state
        .planting_service
        .cancel(&farmer_id, &crop_name, Utc::now())
        .await
        .map_err(|e| log_service_error(&format!("Failed to cancel for {farmer_id}"), &e))?;

    match outcome {
        CancelOutcome::Cancelled => Ok(StatusCode::NO_CONTENT),
        CancelOutcome::NotPlanted => {
            warn!("Crop {} is not planted for farmer {}", crop_name, farmer_id);
            Err(StatusCode::NOT_FOUND)
        }
    }
}
