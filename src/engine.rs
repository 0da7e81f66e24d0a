//! Crop suitability and planting-progress engine
//!
//! Everything in here is a pure function over an in-memory snapshot:
//! no I/O, no clocks. Callers pass "now" explicitly.

pub mod models;
pub mod month;
pub mod progress;
pub mod registry;
pub mod season;
pub mod suitability;

pub use models::{Crop, CropRecord, FarmTelemetry, PlantedCrop, PlantedCropRecord};
pub use progress::Progress;
pub use registry::{CropStatus, PlantedRegistry};
pub use season::Season;
pub use suitability::Suitability;
