use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::engine::models::{FarmTelemetry, PlantedCropRecord};
use crate::fetch_error::FetchError;

/// Farmer record as served by the sensor-data API
///
/// Only the fields this service reads are declared; everything else the
/// record store keeps (credentials, notifications, rentals) is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FarmerRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Soil temperature from the farm sensor, in °C
    #[serde(default)]
    pub temp1: Option<f64>,
    #[serde(rename = "soilHumidity", default)]
    pub soil_humidity: Option<f64>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub crops: Vec<PlantedCropRecord>,
}

impl FarmerRecord {
    /// Sensor half of the telemetry; relative humidity is filled in from
    /// the weather forecast by the caller
    pub fn telemetry(&self) -> FarmTelemetry {
        FarmTelemetry {
            soil_temperature: self.temp1,
            relative_humidity: None,
            soil_moisture: self.soil_humidity,
            latitude: self.lat,
            longitude: self.lon,
        }
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.lat?, self.lon?))
    }
}

#[derive(Debug, Serialize)]
struct UpdateCropsRequest<'a> {
    crops: &'a [PlantedCropRecord],
}

#[derive(Clone)]
pub struct FarmerClient {
    client: reqwest::Client,
    base_url: String,
}

impl FarmerClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn farmer_url(&self, farmer_id: &str) -> String {
        format!("{}/{}", self.base_url, farmer_id)
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn fetch_farmer(&self, farmer_id: &str) -> Result<FarmerRecord, FetchError> {
        let url = self.farmer_url(farmer_id);
        debug!("Fetching farmer record from {}", url);

        let response = self.client.get(&url).send().await?;
        debug!("Received HTTP response with status: {}", response.status());

        if !response.status().is_success() {
            return Err(FetchError::from_status(response.status(), &url));
        }

        let body = response.text().await?;
        let record: FarmerRecord = serde_json::from_str(&body)?;
        debug!(
            "Farmer {} has {} planted crops on record",
            record.id,
            record.crops.len()
        );
        Ok(record)
    }

    /// Replace the farmer's stored planted-crop list
    #[instrument(skip(self, crops), fields(base_url = %self.base_url, count = crops.len()))]
    pub async fn update_crops(
        &self,
        farmer_id: &str,
        crops: &[PlantedCropRecord],
    ) -> Result<(), FetchError> {
        let url = self.farmer_url(farmer_id);
        let response = self
            .client
            .put(&url)
            .json(&UpdateCropsRequest { crops })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::from_status(response.status(), &url));
        }

        info!("Stored {} planted crops for farmer {}", crops.len(), farmer_id);
        Ok(())
    }
}
