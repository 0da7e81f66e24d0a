use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

use crate::engine::{PlantedCrop, PlantedRegistry};
use crate::services::dashboard_service::{evaluate_conditions, DashboardService};
use crate::services::ServiceError;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PlantOutcome {
    Planted { crop: PlantedCrop },
    AlreadyPlanted { crop: PlantedCrop },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    NotPlanted,
}

/// Adds and removes crops from a farmer's planted list
///
/// The store only accepts the whole list, so each change is a load,
/// modify and write. Changes for the same farmer run one at a time.
#[derive(Clone)]
pub struct PlantingService {
    dashboard_service: DashboardService,
    farmer_locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl PlantingService {
    pub fn new(dashboard_service: DashboardService) -> Self {
        Self {
            dashboard_service,
            farmer_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    async fn farmer_lock(&self, farmer_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.farmer_locks.lock().await;
        locks.entry(farmer_id.to_string()).or_default().clone()
    }

    /// Plant `crop_name` for a farmer at `now`
    ///
    /// Only crops that are suitable right now can be planted. Planting a
    /// crop that is already growing changes nothing and stores nothing.
    #[instrument(skip(self, now))]
    pub async fn plant(
        &self,
        farmer_id: &str,
        crop_name: &str,
        now: DateTime<Utc>,
    ) -> Result<PlantOutcome, ServiceError> {
        let catalog = self.dashboard_service.catalog_service().current().await?;
        let crop = catalog
            .crops
            .iter()
            .find(|crop| crop.product_name == crop_name)
            .ok_or_else(|| ServiceError::UnknownCrop(crop_name.to_string()))?;

        let lock = self.farmer_lock(farmer_id).await;
        let _guard = lock.lock().await;
        debug!("Holding planted-list lock for farmer {}", farmer_id);

        let mut conditions = self.dashboard_service.conditions(farmer_id, now).await?;

        if let Some(existing) = conditions.planted.get(crop_name) {
            info!("Crop {} already planted for farmer {}", crop_name, farmer_id);
            return Ok(PlantOutcome::AlreadyPlanted {
                crop: existing.clone(),
            });
        }

        let suitability = evaluate_conditions(&catalog.crops, &conditions, now);
        match suitability.contains(crop_name) {
            Some(true) => {}
            Some(false) => {
                return Err(ServiceError::NotPlantable {
                    crop: crop_name.to_string(),
                    reason: "not suitable for the current season and conditions".to_string(),
                })
            }
            None => {
                return Err(ServiceError::NotPlantable {
                    crop: crop_name.to_string(),
                    reason: "farm conditions are not available yet".to_string(),
                })
            }
        }

        conditions.planted.plant(crop, now);
        self.dashboard_service
            .farmer_client()
            .update_crops(farmer_id, &conditions.planted.to_records())
            .await?;

        let planted = conditions
            .planted
            .get(crop_name)
            .cloned()
            .unwrap_or_else(|| PlantedCrop::from_catalog(crop, now));
        info!("Farmer {} planted {}", farmer_id, crop_name);
        Ok(PlantOutcome::Planted { crop: planted })
    }

    /// Remove `crop_name` from a farmer's planted list
    #[instrument(skip(self, now))]
    pub async fn cancel(
        &self,
        farmer_id: &str,
        crop_name: &str,
        now: DateTime<Utc>,
    ) -> Result<CancelOutcome, ServiceError> {
        let lock = self.farmer_lock(farmer_id).await;
        let _guard = lock.lock().await;

        let record = self.dashboard_service.farmer_record(farmer_id).await?;
        let mut planted = PlantedRegistry::from_records(record.crops, now);

        if !planted.remove(crop_name) {
            return Ok(CancelOutcome::NotPlanted);
        }

        self.dashboard_service
            .farmer_client()
            .update_crops(farmer_id, &planted.to_records())
            .await?;

        info!("Farmer {} cancelled {}", farmer_id, crop_name);
        Ok(CancelOutcome::Cancelled)
    }
}
