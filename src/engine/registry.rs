use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use utoipa::ToSchema;

use crate::engine::models::{Crop, PlantedCrop, PlantedCropRecord};
use crate::engine::suitability::Suitability;

/// How a catalog entry should be presented to a farmer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CropStatus {
    AlreadyGrowing,
    Plantable,
    Unsuitable,
    /// Telemetry has not loaded, so suitability was not evaluated
    Unknown,
}

/// A farmer's planted crops, indexed by crop name
///
/// A name appears at most once; planting it again is a no-op.
#[derive(Debug, Clone, Default)]
pub struct PlantedRegistry {
    crops: Vec<PlantedCrop>,
    names: HashSet<String>,
}

impl PlantedRegistry {
    /// Build from loaded crops, keeping the first occurrence of each name
    pub fn from_crops(crops: impl IntoIterator<Item = PlantedCrop>) -> Self {
        let mut registry = Self::default();
        for crop in crops {
            registry.insert(crop);
        }
        registry
    }

    pub fn from_records(
        records: impl IntoIterator<Item = PlantedCropRecord>,
        loaded_at: DateTime<Utc>,
    ) -> Self {
        Self::from_crops(
            records
                .into_iter()
                .map(|record| PlantedCrop::from_record(record, loaded_at)),
        )
    }

    pub fn is_planted(&self, crop_name: &str) -> bool {
        self.names.contains(crop_name)
    }

    /// Record that `crop` was planted at `now`. Returns false and leaves
    /// the registry untouched if it is already growing.
    pub fn plant(&mut self, crop: &Crop, now: DateTime<Utc>) -> bool {
        self.insert(PlantedCrop::from_catalog(crop, now))
    }

    /// Cancel a planted crop. Returns false if it was not planted.
    pub fn remove(&mut self, crop_name: &str) -> bool {
        if !self.names.remove(crop_name) {
            return false;
        }
        self.crops.retain(|planted| planted.crop_name != crop_name);
        true
    }

    pub fn get(&self, crop_name: &str) -> Option<&PlantedCrop> {
        if !self.is_planted(crop_name) {
            return None;
        }
        self.crops.iter().find(|planted| planted.crop_name == crop_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlantedCrop> {
        self.crops.iter()
    }

    pub fn len(&self) -> usize {
        self.crops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crops.is_empty()
    }

    pub fn to_records(&self) -> Vec<PlantedCropRecord> {
        self.crops.iter().map(PlantedCrop::to_record).collect()
    }

    pub fn status_of(&self, crop: &Crop, suitability: &Suitability) -> CropStatus {
        if self.is_planted(&crop.product_name) {
            return CropStatus::AlreadyGrowing;
        }
        match suitability.contains(&crop.product_name) {
            Some(true) => CropStatus::Plantable,
            Some(false) => CropStatus::Unsuitable,
            None => CropStatus::Unknown,
        }
    }

    fn insert(&mut self, crop: PlantedCrop) -> bool {
        if !self.names.insert(crop.crop_name.clone()) {
            return false;
        }
        self.crops.push(crop);
        true
    }
}
