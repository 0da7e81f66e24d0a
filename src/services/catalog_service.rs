use backon::{ExponentialBuilder, Retryable};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::catalog_fetcher::CatalogFetcher;
use crate::engine::Crop;
use crate::fetch_error::FetchError;
use crate::services::ServiceError;

/// Catalog as of one successful fetch
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub crops: Arc<Vec<Crop>>,
    pub fetched_at: DateTime<Utc>,
}

/// Holds the latest crop catalog
///
/// The catalog is reference data: it is fetched once and then only
/// replaced by an explicit refresh.
#[derive(Clone)]
pub struct CatalogService {
    fetcher: CatalogFetcher,
    snapshot: Arc<RwLock<Option<CatalogSnapshot>>>,
    fetch_attempts: usize,
    min_retry_delay: Duration,
}

impl CatalogService {
    pub fn new(fetcher: CatalogFetcher, fetch_attempts: usize) -> Self {
        Self {
            fetcher,
            snapshot: Arc::new(RwLock::new(None)),
            fetch_attempts: fetch_attempts.max(1),
            min_retry_delay: Duration::from_millis(500),
        }
    }

    /// Start with an already-loaded catalog
    pub fn preloaded(fetcher: CatalogFetcher, crops: Vec<Crop>, fetched_at: DateTime<Utc>) -> Self {
        let service = Self::new(fetcher, 1);
        let snapshot = CatalogSnapshot {
            crops: Arc::new(crops),
            fetched_at,
        };
        Self {
            snapshot: Arc::new(RwLock::new(Some(snapshot))),
            ..service
        }
    }

    pub fn with_min_retry_delay(mut self, delay: Duration) -> Self {
        self.min_retry_delay = delay;
        self
    }

    /// Cached catalog, fetching it first if nothing is cached yet
    pub async fn current(&self) -> Result<CatalogSnapshot, ServiceError> {
        if let Some(snapshot) = self.snapshot.read().await.as_ref() {
            debug!("Using cached catalog from {}", snapshot.fetched_at);
            return Ok(snapshot.clone());
        }
        self.refresh().await
    }

    /// Fetch the catalog and replace the cached copy
    ///
    /// On failure the previous snapshot, if any, stays in place.
    #[instrument(skip(self), fields(attempts = self.fetch_attempts))]
    pub async fn refresh(&self) -> Result<CatalogSnapshot, ServiceError> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.min_retry_delay)
            .with_max_delay(Duration::from_secs(30))
            .with_max_times(self.fetch_attempts - 1);

        let crops = (|| self.fetcher.fetch_catalog())
            .retry(backoff)
            // Bad JSON will be just as bad on the next attempt
            .when(|e| !matches!(e, FetchError::Json(_) | FetchError::NotFound(_)))
            .notify(|e, delay| {
                warn!("Catalog fetch failed, retrying in {:?}: {}", delay, e);
            })
            .await
            .map_err(ServiceError::CatalogUnavailable)?;

        let snapshot = CatalogSnapshot {
            crops: Arc::new(crops),
            fetched_at: Utc::now(),
        };
        info!("Loaded crop catalog with {} entries", snapshot.crops.len());

        *self.snapshot.write().await = Some(snapshot.clone());
        Ok(snapshot)
    }
}
