use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time;
use tracing::{debug, error, info, instrument, warn};

use crate::services::{CatalogService, DashboardService};

/// Periodically refresh the catalog and re-evaluate watched farms
///
/// Each tick re-runs the suitability filter on fresh data and logs crops
/// that became plantable or stopped being plantable since the last tick.
#[instrument(skip(catalog_service, dashboard_service, farmer_ids), fields(interval_minutes = %interval_minutes, farmers = farmer_ids.len()))]
pub async fn start_refresh_scheduler(
    catalog_service: CatalogService,
    dashboard_service: DashboardService,
    farmer_ids: Vec<String>,
    interval_minutes: u64,
    concurrency: usize,
) {
    let mut interval = time::interval(Duration::from_secs(interval_minutes * 60));
    let mut previous: HashMap<String, Vec<String>> = HashMap::new();

    info!(
        "Refresh scheduler started with {} minute interval for {} farmers",
        interval_minutes,
        farmer_ids.len()
    );

    loop {
        interval.tick().await;
        debug!("Scheduler tick - refreshing catalog and farm conditions");

        if let Err(e) = catalog_service.refresh().await {
            // Keep evaluating against the last good catalog, if there is one
            error!("Failed to refresh crop catalog: {}", e);
        }

        let evaluated =
            refresh_farms(&dashboard_service, &farmer_ids, concurrency, &mut previous).await;
        debug!("Evaluated {} of {} farms", evaluated, farmer_ids.len());
    }
}

/// Recompute plantable crops for every farmer, at most `concurrency` at a time
///
/// Returns how many farms were evaluated successfully.
pub async fn refresh_farms(
    dashboard_service: &DashboardService,
    farmer_ids: &[String],
    concurrency: usize,
    previous: &mut HashMap<String, Vec<String>>,
) -> usize {
    let now = Utc::now();
    let results: Vec<_> = stream::iter(farmer_ids.iter().cloned())
        .map(|farmer_id| async move {
            let result = dashboard_service.dashboard(&farmer_id, None, now).await;
            (farmer_id, result)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut evaluated = 0;
    for (farmer_id, result) in results {
        match result {
            Ok(view) => {
                evaluated += 1;
                if !view.suitability_known {
                    warn!("Conditions unknown for farmer {}, suitability not evaluated", farmer_id);
                }

                let current = view.plantable();
                let before = previous.get(&farmer_id).map(Vec::as_slice).unwrap_or(&[]);
                let (added, removed) = diff_plantable(before, &current);

                if !added.is_empty() {
                    info!("Farmer {}: newly plantable {:?}", farmer_id, added);
                }
                if !removed.is_empty() {
                    info!("Farmer {}: no longer plantable {:?}", farmer_id, removed);
                }
                previous.insert(farmer_id, current);
            }
            Err(e) => {
                error!("Failed to evaluate farmer {}: {}", farmer_id, e);
            }
        }
    }

    evaluated
}

/// Crops added to and removed from the plantable list between two cycles
pub fn diff_plantable(previous: &[String], current: &[String]) -> (Vec<String>, Vec<String>) {
    let added = current
        .iter()
        .filter(|name| !previous.contains(name))
        .cloned()
        .collect();
    let removed = previous
        .iter()
        .filter(|name| !current.contains(name))
        .cloned()
        .collect();
    (added, removed)
}
