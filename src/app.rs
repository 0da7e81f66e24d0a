use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::catalog_fetcher::CatalogFetcher;
use crate::config::Config;
use crate::farmer_client::FarmerClient;
use crate::forecast_fetcher::ForecastFetcher;
use crate::scheduler;
use crate::services::{CatalogService, DashboardService, PlantingService};

/// Application with its spawned server and refresh scheduler
pub struct Application {
    pub server_handle: JoinHandle<Result<(), std::io::Error>>,
    pub refresh_scheduler_handle: JoinHandle<()>,
}

impl Application {
    /// Build services, spawn the refresh scheduler and the HTTP server
    pub async fn build(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Initializing application components");

        // Collaborators
        let catalog_fetcher = CatalogFetcher::new(config.catalog_url.clone());
        let farmer_client = FarmerClient::new(config.sensor_api_url.clone());
        let forecast_fetcher =
            ForecastFetcher::new(config.forecast_url.clone(), config.forecast_days);

        // Services
        let catalog_service = CatalogService::new(catalog_fetcher, config.catalog_fetch_attempts);
        let dashboard_service =
            DashboardService::new(catalog_service.clone(), farmer_client, forecast_fetcher);
        let planting_service = PlantingService::new(dashboard_service.clone());

        let refresh_scheduler_handle = {
            let catalog_service_clone = catalog_service.clone();
            let dashboard_service_clone = dashboard_service.clone();
            let farmer_ids = config.watched_farmers.clone();
            let interval = config.refresh_interval_minutes;
            let concurrency = config.refresh_concurrency;

            tokio::spawn(async move {
                scheduler::start_refresh_scheduler(
                    catalog_service_clone,
                    dashboard_service_clone,
                    farmer_ids,
                    interval,
                    concurrency,
                )
                .await;
            })
        };

        let app_state = AppState {
            catalog_service,
            dashboard_service,
            planting_service,
        };
        let app = create_router(app_state).layer(TraceLayer::new_for_http());

        let addr = config.server_addr();
        info!("Starting HTTP server on {}", addr);

        let server_handle = tokio::spawn(async move {
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, app).await
        });

        info!("Application initialized successfully");

        Ok(Self {
            server_handle,
            refresh_scheduler_handle,
        })
    }

    /// Run until the server stops
    pub async fn run_until_stopped(self) -> Result<(), Box<dyn std::error::Error>> {
        self.server_handle.await??;
        Ok(())
    }
}
