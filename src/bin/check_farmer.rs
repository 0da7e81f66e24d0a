use chrono::Utc;
use clap::Parser;
use crop_clock_service::catalog_fetcher::CatalogFetcher;
use crop_clock_service::farmer_client::FarmerClient;
use crop_clock_service::forecast_fetcher::{ForecastFetcher, DEFAULT_FORECAST_URL};
use crop_clock_service::services::{CatalogService, DashboardService};

#[derive(Parser)]
#[command(name = "check-farmer")]
#[command(about = "Evaluate one farm against the current crop catalog", long_about = None)]
struct Cli {
    /// Farmer record id
    farmer_id: String,

    /// Base URL of the farmer record store
    #[arg(long, env)]
    sensor_api_url: String,

    /// URL of the crop catalog document
    #[arg(long, env)]
    catalog_url: String,

    /// Weather forecast endpoint
    #[arg(long, env, default_value = DEFAULT_FORECAST_URL)]
    forecast_url: String,

    /// Only list catalog crops whose name contains this text
    #[arg(long)]
    search: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let catalog_service = CatalogService::new(CatalogFetcher::new(cli.catalog_url), 1);
    let dashboard_service = DashboardService::new(
        catalog_service,
        FarmerClient::new(cli.sensor_api_url),
        ForecastFetcher::new(cli.forecast_url, 3),
    );

    println!("Checking farmer {}...\n", cli.farmer_id);
    let view = dashboard_service
        .dashboard(&cli.farmer_id, cli.search.as_deref(), Utc::now())
        .await?;

    println!(
        "Farmer: {}",
        view.farmer_name.as_deref().unwrap_or("(unnamed)")
    );
    println!("Season: {} ({})", view.season, view.season_label_bn);
    println!(
        "Soil temperature: {}",
        format_reading(view.telemetry.soil_temperature)
    );
    println!(
        "Relative humidity: {}",
        format_reading(view.telemetry.relative_humidity)
    );

    if !view.forecast.is_empty() {
        println!("\nForecast:");
        for day in &view.forecast {
            println!(
                "  {}: {:?} ({} / {})",
                day.date,
                day.condition,
                format_reading(day.temperature_min),
                format_reading(day.temperature_max)
            );
        }
    }

    if view.suitability_known {
        let plantable = view.plantable();
        println!("\nPlantable now ({}):", plantable.len());
        for name in &plantable {
            println!("  {}", name);
        }
    } else {
        println!("\nConditions unknown, suitability not evaluated");
    }

    println!("\nCatalog ({} entries):", view.crops.len());
    for entry in &view.crops {
        println!(
            "  {:<30} {:?}  {} -> {}",
            entry.product_name,
            entry.status,
            entry.transplant_month.as_deref().unwrap_or("?"),
            entry.harvest_month.as_deref().unwrap_or("?")
        );
    }

    println!("\nPlanted ({}):", view.planted.len());
    for planted in &view.planted {
        let marker = if planted.planted_date_reconstructed {
            " (date unknown)"
        } else {
            ""
        };
        println!(
            "  {:<30} {:>3}%  day {} of {}{}",
            planted.crop_name,
            planted.progress.percent,
            planted.progress.days_since_planting,
            planted.progress.total_duration_days,
            marker
        );
    }

    Ok(())
}

fn format_reading(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.1}"))
}
