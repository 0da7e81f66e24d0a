pub mod catalog_service;
pub mod dashboard_service;
pub mod error;
pub mod planting_service;

pub use catalog_service::{CatalogService, CatalogSnapshot};
pub use dashboard_service::DashboardService;
pub use error::ServiceError;
pub use planting_service::PlantingService;
