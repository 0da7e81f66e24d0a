use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::engine::progress::{self, Progress};
use crate::engine::season::Season;

/// Raw crop catalog row as served by the catalog API
///
/// Every field is optional and numbers may arrive as JSON strings or
/// numbers. Use `Crop::from_record` to get a validated entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CropRecord {
    #[serde(rename = "Products name", default)]
    pub product_name: Option<String>,
    #[serde(rename = "Season", default)]
    pub season: Option<String>,
    #[serde(rename = "Crops Type", default)]
    pub crop_type: Option<String>,
    #[serde(rename = "Transplant", default)]
    pub transplant: Option<String>,
    #[serde(rename = "Growth", default)]
    pub growth: Option<String>,
    #[serde(rename = "Harvest", default)]
    pub harvest: Option<String>,
    #[serde(rename = "Min Temp", default)]
    pub min_temp: Option<Value>,
    #[serde(rename = "Max Temp", default)]
    pub max_temp: Option<Value>,
    #[serde(rename = "Min Relative Humidity", default)]
    pub min_relative_humidity: Option<Value>,
    #[serde(rename = "Max Relative Humidity", default)]
    pub max_relative_humidity: Option<Value>,
    #[serde(rename = "Country", default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogRowError {
    #[error("Catalog row has no product name")]
    MissingName,
    #[error("Catalog row '{name}' has unrecognized season {season:?}")]
    UnknownSeason { name: String, season: Option<String> },
}

/// Validated crop catalog entry
///
/// Numeric bounds that could not be parsed are stored as `NaN`, which
/// makes every range check against them fail.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Crop {
    pub product_name: String,
    #[schema(value_type = String, example = "Rabi")]
    pub season: Season,
    pub crop_type: Option<String>,
    pub transplant_month: Option<String>,
    pub growth: Option<String>,
    pub harvest_month: Option<String>,
    pub min_temp: f64,
    pub max_temp: f64,
    /// Humidity bound labeled "min" upstream. May actually be the maximum.
    pub labeled_min_humidity: f64,
    /// Humidity bound labeled "max" upstream. May actually be the minimum.
    pub labeled_max_humidity: f64,
    pub country: Option<String>,
}

impl Crop {
    pub fn from_record(record: CropRecord) -> Result<Self, CatalogRowError> {
        let product_name = record
            .product_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(CatalogRowError::MissingName)?
            .to_string();

        let season = record
            .season
            .as_deref()
            .and_then(Season::parse)
            .ok_or_else(|| CatalogRowError::UnknownSeason {
                name: product_name.clone(),
                season: record.season.clone(),
            })?;

        Ok(Crop {
            product_name,
            season,
            crop_type: record.crop_type,
            transplant_month: record.transplant,
            growth: record.growth,
            harvest_month: record.harvest,
            min_temp: loose_number(record.min_temp.as_ref()),
            max_temp: loose_number(record.max_temp.as_ref()),
            labeled_min_humidity: loose_number(record.min_relative_humidity.as_ref()),
            labeled_max_humidity: loose_number(record.max_relative_humidity.as_ref()),
            country: record.country,
        })
    }

    /// Viable humidity range with the labeled bounds put in order
    ///
    /// The catalog is known to store some rows as min=85, max=60.
    pub fn humidity_range(&self) -> (f64, f64) {
        let (a, b) = (self.labeled_min_humidity, self.labeled_max_humidity);
        if a.is_nan() || b.is_nan() {
            return (f64::NAN, f64::NAN);
        }
        (a.min(b), a.max(b))
    }
}

/// Interpret a catalog value as a float the way the dashboard always has:
/// numbers pass through, strings use their leading numeric prefix
/// ("25°C" -> 25.0), anything else is `NaN`.
fn loose_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => parse_float_prefix(s),
        _ => f64::NAN,
    }
}

fn parse_float_prefix(text: &str) -> f64 {
    let trimmed = text.trim_start();
    let candidate: String = trimmed
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        .collect();

    // Shrink from the right until something parses, e.g. "12.5e" -> "12.5"
    let mut end = candidate.len();
    while end > 0 {
        if let Ok(n) = candidate[..end].parse::<f64>() {
            return n;
        }
        end -= 1;
    }
    f64::NAN
}

/// Planted crop as persisted by the farmer record store
///
/// Current upstream schema: `{cropName, planMonth, Harvest}`. Older
/// records may also carry `plantedDate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PlantedCropRecord {
    #[serde(rename = "cropName")]
    pub crop_name: String,
    #[serde(rename = "planMonth", default)]
    pub plan_month: Option<String>,
    #[serde(rename = "Harvest", default)]
    pub harvest: Option<String>,
    #[serde(rename = "plantedDate", default, skip_serializing_if = "Option::is_none")]
    pub planted_date: Option<String>,
}

/// A crop a farmer has committed to growing
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PlantedCrop {
    pub crop_name: String,
    pub plan_month: Option<String>,
    pub harvest_month: Option<String>,
    pub planted_date: DateTime<Utc>,
    /// The store had no planting date, so `planted_date` is the load time
    /// and progress restarts from zero on every load
    pub planted_date_reconstructed: bool,
}

impl PlantedCrop {
    /// Commit to growing `crop`, copying its months from the catalog
    pub fn from_catalog(crop: &Crop, planted_date: DateTime<Utc>) -> Self {
        Self {
            crop_name: crop.product_name.clone(),
            plan_month: crop.transplant_month.clone(),
            harvest_month: crop.harvest_month.clone(),
            planted_date,
            planted_date_reconstructed: false,
        }
    }

    /// Rebuild from a stored record; a missing or unreadable planting date
    /// becomes `loaded_at`.
    pub fn from_record(record: PlantedCropRecord, loaded_at: DateTime<Utc>) -> Self {
        let stored_date = record
            .planted_date
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Self {
            crop_name: record.crop_name,
            plan_month: record.plan_month,
            harvest_month: record.harvest,
            planted_date: stored_date.unwrap_or(loaded_at),
            planted_date_reconstructed: stored_date.is_none(),
        }
    }

    /// Stored shape; a reconstructed date is not written back
    pub fn to_record(&self) -> PlantedCropRecord {
        PlantedCropRecord {
            crop_name: self.crop_name.clone(),
            plan_month: self.plan_month.clone(),
            harvest: self.harvest_month.clone(),
            planted_date: (!self.planted_date_reconstructed).then(|| self.planted_date.to_rfc3339()),
        }
    }

    pub fn progress(&self, now: DateTime<Utc>) -> Progress {
        progress::estimate(
            self.plan_month.as_deref(),
            self.harvest_month.as_deref(),
            self.planted_date,
            now,
        )
    }
}

/// Snapshot of a farm's current conditions
///
/// `relative_humidity` is read from today's weather forecast, not the
/// farm sensor. `None` means the source has not loaded or failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FarmTelemetry {
    pub soil_temperature: Option<f64>,
    pub relative_humidity: Option<f64>,
    #[serde(default)]
    pub soil_moisture: Option<f64>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn tomato_record() -> CropRecord {
        serde_json::from_value(json!({
            "Season": "Rabi",
            "Transplant": "November",
            "Growth": "December",
            "Harvest": "February",
            "Products name": "Tomato",
            "Crops Type": "Vegetable",
            "Max Temp": "25",
            "Min Temp": "15",
            "Max Relative Humidity": "60",
            "Min Relative Humidity": "85",
            "Country": "Bangladesh"
        }))
        .unwrap()
    }

    #[test]
    fn test_from_record_parses_string_numbers() {
        let crop = Crop::from_record(tomato_record()).unwrap();
        assert_eq!(crop.product_name, "Tomato");
        assert_eq!(crop.season, Season::Rabi);
        assert_eq!(crop.min_temp, 15.0);
        assert_eq!(crop.max_temp, 25.0);
        assert_eq!(crop.transplant_month.as_deref(), Some("November"));
        assert_eq!(crop.harvest_month.as_deref(), Some("February"));
    }

    #[test]
    fn test_humidity_range_is_normalized_when_swapped() {
        let crop = Crop::from_record(tomato_record()).unwrap();
        assert_eq!(crop.labeled_min_humidity, 85.0);
        assert_eq!(crop.labeled_max_humidity, 60.0);
        assert_eq!(crop.humidity_range(), (60.0, 85.0));
    }

    #[test]
    fn test_unparseable_numbers_become_nan() {
        let mut record = tomato_record();
        record.min_temp = Some(json!("n/a"));
        record.max_relative_humidity = None;

        let crop = Crop::from_record(record).unwrap();
        assert!(crop.min_temp.is_nan());
        let (lo, hi) = crop.humidity_range();
        assert!(lo.is_nan() && hi.is_nan());
    }

    #[test]
    fn test_numbers_accept_json_numbers_and_units() {
        let mut record = tomato_record();
        record.min_temp = Some(json!(12.5));
        record.max_temp = Some(json!("30°C"));

        let crop = Crop::from_record(record).unwrap();
        assert_eq!(crop.min_temp, 12.5);
        assert_eq!(crop.max_temp, 30.0);
    }

    #[test]
    fn test_from_record_rejects_missing_name() {
        let mut record = tomato_record();
        record.product_name = Some("   ".to_string());
        assert_eq!(
            Crop::from_record(record).unwrap_err(),
            CatalogRowError::MissingName
        );
    }

    #[test]
    fn test_from_record_rejects_unknown_season() {
        let mut record = tomato_record();
        record.season = Some("Monsoon".to_string());
        assert!(matches!(
            Crop::from_record(record),
            Err(CatalogRowError::UnknownSeason { .. })
        ));
    }

    #[test]
    fn test_planted_record_without_date_uses_load_time() {
        let loaded_at = Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap();
        let record: PlantedCropRecord = serde_json::from_value(json!({
            "_id": "abc123",
            "cropName": "Tomato",
            "planMonth": "Nov",
            "Harvest": "Feb"
        }))
        .unwrap();

        let planted = PlantedCrop::from_record(record, loaded_at);
        assert_eq!(planted.planted_date, loaded_at);
        assert!(planted.planted_date_reconstructed);
        assert_eq!(planted.plan_month.as_deref(), Some("Nov"));
        assert_eq!(planted.harvest_month.as_deref(), Some("Feb"));

        // The made-up date never reaches the store
        assert_eq!(planted.to_record().planted_date, None);
    }

    #[test]
    fn test_planted_record_keeps_stored_date() {
        let loaded_at = Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap();
        let record = PlantedCropRecord {
            crop_name: "Tomato".to_string(),
            plan_month: Some("Nov".to_string()),
            harvest: Some("Feb".to_string()),
            planted_date: Some("2024-11-20T06:00:00Z".to_string()),
        };

        let planted = PlantedCrop::from_record(record, loaded_at);
        assert!(!planted.planted_date_reconstructed);
        assert_eq!(
            planted.planted_date,
            Utc.with_ymd_and_hms(2024, 11, 20, 6, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_record_wire_names() {
        let planted = PlantedCrop {
            crop_name: "Potato".to_string(),
            plan_month: Some("Nov".to_string()),
            harvest_month: Some("Feb".to_string()),
            planted_date: Utc.with_ymd_and_hms(2024, 11, 20, 6, 0, 0).unwrap(),
            planted_date_reconstructed: false,
        };

        let value = serde_json::to_value(planted.to_record()).unwrap();
        assert_eq!(value["cropName"], "Potato");
        assert_eq!(value["planMonth"], "Nov");
        assert_eq!(value["Harvest"], "Feb");
        assert!(value["plantedDate"].is_string());
    }
}
