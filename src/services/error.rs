use crate::fetch_error::FetchError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Crop catalog unavailable: {0}")]
    CatalogUnavailable(#[source] FetchError),
    #[error("Farmer {0} not found")]
    FarmerNotFound(String),
    #[error("Upstream request failed: {0}")]
    Upstream(#[from] FetchError),
    #[error("Crop '{0}' is not in the catalog")]
    UnknownCrop(String),
    #[error("Crop '{crop}' cannot be planted now: {reason}")]
    NotPlantable { crop: String, reason: String },
}
