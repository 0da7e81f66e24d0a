use std::collections::HashSet;

use crate::engine::models::{Crop, FarmTelemetry};
use crate::engine::season::Season;

/// Which catalog crops can be planted under the current conditions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suitability {
    /// Telemetry is incomplete, so nothing was evaluated
    Unknown,
    /// Product names of every crop that passed
    Known(HashSet<String>),
}

impl Suitability {
    /// `None` when suitability has not been evaluated
    pub fn contains(&self, product_name: &str) -> Option<bool> {
        match self {
            Suitability::Unknown => None,
            Suitability::Known(names) => Some(names.contains(product_name)),
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Suitability::Known(_))
    }

    /// Suitable names in sorted order, empty when unknown
    pub fn sorted_names(&self) -> Vec<String> {
        match self {
            Suitability::Unknown => Vec::new(),
            Suitability::Known(names) => {
                let mut sorted: Vec<String> = names.iter().cloned().collect();
                sorted.sort();
                sorted
            }
        }
    }
}

/// Evaluate every crop in `catalog` against the current season and telemetry
///
/// Missing temperature or humidity means the filter does not run at all.
pub fn evaluate(catalog: &[Crop], season: Season, telemetry: &FarmTelemetry) -> Suitability {
    let (Some(temperature), Some(humidity)) =
        (telemetry.soil_temperature, telemetry.relative_humidity)
    else {
        return Suitability::Unknown;
    };

    Suitability::Known(
        catalog
            .iter()
            .filter(|crop| is_suitable(crop, season, temperature, humidity))
            .map(|crop| crop.product_name.clone())
            .collect(),
    )
}

/// Season must match and both readings must fall inside the crop's
/// inclusive ranges. `NaN` bounds always fail.
pub fn is_suitable(crop: &Crop, season: Season, temperature: f64, humidity: f64) -> bool {
    let (min_humidity, max_humidity) = crop.humidity_range();

    let season_match = crop.season == season;
    let temp_match = temperature >= crop.min_temp && temperature <= crop.max_temp;
    let humidity_match = humidity >= min_humidity && humidity <= max_humidity;

    season_match && temp_match && humidity_match
}

/// Catalog entries plantable in `season`, in catalog order
pub fn seasonal_catalog(catalog: &[Crop], season: Season) -> Vec<&Crop> {
    catalog.iter().filter(|crop| crop.season == season).collect()
}

/// Seasonal catalog narrowed to names containing `query` (case-insensitive)
pub fn search<'a>(catalog: &'a [Crop], season: Season, query: Option<&str>) -> Vec<&'a Crop> {
    let query = query.map(str::trim).filter(|q| !q.is_empty());
    let Some(query) = query else {
        return seasonal_catalog(catalog, season);
    };

    let needle = query.to_lowercase();
    seasonal_catalog(catalog, season)
        .into_iter()
        .filter(|crop| crop.product_name.to_lowercase().contains(&needle))
        .collect()
}
