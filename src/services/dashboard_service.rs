use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument, warn};
use utoipa::ToSchema;

use crate::engine::progress::Progress;
use crate::engine::season::{classify_season, Season};
use crate::engine::suitability::{self, Suitability};
use crate::engine::{Crop, CropStatus, FarmTelemetry, PlantedRegistry};
use crate::farmer_client::{FarmerClient, FarmerRecord};
use crate::fetch_error::FetchError;
use crate::forecast_fetcher::{todays_humidity, ForecastDay, ForecastFetcher};
use crate::services::{CatalogService, ServiceError};

/// Everything known about one farm at a point in time
#[derive(Debug, Clone)]
pub struct FarmConditions {
    pub record: FarmerRecord,
    pub telemetry: FarmTelemetry,
    pub forecast: Vec<ForecastDay>,
    pub planted: PlantedRegistry,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CatalogEntryView {
    pub product_name: String,
    pub crop_type: Option<String>,
    pub transplant_month: Option<String>,
    pub harvest_month: Option<String>,
    pub status: CropStatus,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlantedCropView {
    pub crop_name: String,
    pub plan_month: Option<String>,
    pub harvest_month: Option<String>,
    pub planted_date: DateTime<Utc>,
    pub planted_date_reconstructed: bool,
    pub progress: Progress,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardView {
    pub farmer_id: String,
    pub farmer_name: Option<String>,
    #[schema(value_type = String, example = "Rabi")]
    pub season: Season,
    pub season_label_bn: String,
    pub telemetry: FarmTelemetry,
    pub forecast: Vec<ForecastDay>,
    /// False while temperature or humidity is missing
    pub suitability_known: bool,
    pub suitable_crops: Vec<String>,
    pub crops: Vec<CatalogEntryView>,
    pub planted: Vec<PlantedCropView>,
    pub generated_at: DateTime<Utc>,
}

impl DashboardView {
    /// Crops the farmer could plant right now
    pub fn plantable(&self) -> Vec<String> {
        self.crops
            .iter()
            .filter(|entry| entry.status == CropStatus::Plantable)
            .map(|entry| entry.product_name.clone())
            .collect()
    }
}

#[derive(Clone)]
pub struct DashboardService {
    catalog_service: CatalogService,
    farmer_client: FarmerClient,
    forecast_fetcher: ForecastFetcher,
}

impl DashboardService {
    pub fn new(
        catalog_service: CatalogService,
        farmer_client: FarmerClient,
        forecast_fetcher: ForecastFetcher,
    ) -> Self {
        Self {
            catalog_service,
            farmer_client,
            forecast_fetcher,
        }
    }

    pub fn catalog_service(&self) -> &CatalogService {
        &self.catalog_service
    }

    pub fn farmer_client(&self) -> &FarmerClient {
        &self.farmer_client
    }

    /// Farmer record alone, without weather
    pub async fn farmer_record(&self, farmer_id: &str) -> Result<FarmerRecord, ServiceError> {
        self.farmer_client
            .fetch_farmer(farmer_id)
            .await
            .map_err(|e| match e {
                FetchError::NotFound(_) => ServiceError::FarmerNotFound(farmer_id.to_string()),
                other => ServiceError::Upstream(other),
            })
    }

    /// Load a farmer's record and today's weather
    ///
    /// The farmer record is required. The forecast is not: if it cannot
    /// be fetched, humidity stays unknown and suitability is not evaluated.
    #[instrument(skip(self, now))]
    pub async fn conditions(
        &self,
        farmer_id: &str,
        now: DateTime<Utc>,
    ) -> Result<FarmConditions, ServiceError> {
        let record = self.farmer_record(farmer_id).await?;

        let forecast = match record.coordinates() {
            Some((lat, lon)) => match self.forecast_fetcher.fetch_forecast(lat, lon).await {
                Ok(days) => days,
                Err(e) => {
                    warn!("Weather forecast unavailable for farmer {}: {}", farmer_id, e);
                    Vec::new()
                }
            },
            None => {
                debug!("Farmer {} has no coordinates, skipping forecast", farmer_id);
                Vec::new()
            }
        };

        let mut telemetry = record.telemetry();
        telemetry.relative_humidity = todays_humidity(&forecast);

        let planted = PlantedRegistry::from_records(record.crops.iter().cloned(), now);

        Ok(FarmConditions {
            record,
            telemetry,
            forecast,
            planted,
        })
    }

    #[instrument(skip(self, now))]
    pub async fn dashboard(
        &self,
        farmer_id: &str,
        search: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<DashboardView, ServiceError> {
        // No catalog, no dashboard
        let catalog = self.catalog_service.current().await?;
        let conditions = self.conditions(farmer_id, now).await?;

        let view = build_view(&catalog.crops, &conditions, search, now);
        debug!(
            "Dashboard for {}: {} catalog entries, {} planted, suitability known: {}",
            farmer_id,
            view.crops.len(),
            view.planted.len(),
            view.suitability_known
        );
        Ok(view)
    }
}

/// Assemble the dashboard from already-loaded data
pub fn build_view(
    catalog: &[Crop],
    conditions: &FarmConditions,
    search: Option<&str>,
    now: DateTime<Utc>,
) -> DashboardView {
    let season = classify_season(now);
    let suitability = suitability::evaluate(catalog, season, &conditions.telemetry);

    let crops = suitability::search(catalog, season, search)
        .into_iter()
        .map(|crop| CatalogEntryView {
            product_name: crop.product_name.clone(),
            crop_type: crop.crop_type.clone(),
            transplant_month: crop.transplant_month.clone(),
            harvest_month: crop.harvest_month.clone(),
            status: conditions.planted.status_of(crop, &suitability),
        })
        .collect();

    let planted = conditions
        .planted
        .iter()
        .map(|planted| PlantedCropView {
            crop_name: planted.crop_name.clone(),
            plan_month: planted.plan_month.clone(),
            harvest_month: planted.harvest_month.clone(),
            planted_date: planted.planted_date,
            planted_date_reconstructed: planted.planted_date_reconstructed,
            progress: planted.progress(now),
        })
        .collect();

    DashboardView {
        farmer_id: conditions.record.id.clone(),
        farmer_name: conditions.record.name.clone(),
        season,
        season_label_bn: season.bengali_label().to_string(),
        telemetry: conditions.telemetry.clone(),
        forecast: conditions.forecast.clone(),
        suitability_known: suitability.is_known(),
        suitable_crops: suitability.sorted_names(),
        crops,
        planted,
        generated_at: now,
    }
}

/// Suitability for an already-loaded farm, used when planting
pub fn evaluate_conditions(
    catalog: &[Crop],
    conditions: &FarmConditions,
    now: DateTime<Utc>,
) -> Suitability {
    suitability::evaluate(catalog, classify_season(now), &conditions.telemetry)
}
