// Shared fixtures for the HTTP-level tests
#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use crop_clock_service::catalog_fetcher::{parse_catalog, CatalogFetcher};
use crop_clock_service::engine::Crop;
use crop_clock_service::farmer_client::FarmerClient;
use crop_clock_service::forecast_fetcher::ForecastFetcher;
use crop_clock_service::services::{CatalogService, DashboardService};

pub const FARMER_ID: &str = "farmer-001";
pub const FARMER_PATH: &str = "/api/sensordata/farmer-001";

/// Catalog as served upstream, including the stray `:Z` typo and a row
/// with its humidity bounds swapped
pub const CATALOG_JSON: &str = r#"[
    {
        "Season": "Rabi",
        "Transplant": "Nov",
        "Growth": "Dec",
        "Harvest": "Feb",
        "Products name": "Tomato",
        "Crops Type":Z "Vegetable",
        "Min Temp": "15",
        "Max Temp": "25",
        "Min Relative Humidity": "85",
        "Max Relative Humidity": "60",
        "Country": "Bangladesh"
    },
    {
        "Season": "Rabi",
        "Transplant": "Nov",
        "Harvest": "Mar",
        "Products name": "Potato",
        "Crops Type": "Tuber",
        "Min Temp": "10",
        "Max Temp": "22",
        "Min Relative Humidity": "60",
        "Max Relative Humidity": "80"
    },
    {
        "Season": "Rabi",
        "Transplant": "Dec",
        "Harvest": "Mar",
        "Products name": "Chili",
        "Crops Type": "Spice",
        "Min Temp": "28",
        "Max Temp": "35",
        "Min Relative Humidity": "50",
        "Max Relative Humidity": "80"
    },
    {
        "Season": "Kharif 1",
        "Transplant": "Apr",
        "Harvest": "Jul",
        "Products name": "Aus Rice",
        "Crops Type": "Cereal",
        "Min Temp": "20",
        "Max Temp": "35",
        "Min Relative Humidity": "70",
        "Max Relative Humidity": "90"
    }
]"#;

/// 2025-12-10, inside Rabi
pub fn rabi_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 12, 10, 9, 0, 0).unwrap()
}

pub fn sample_catalog() -> Vec<Crop> {
    parse_catalog(CATALOG_JSON).expect("fixture catalog parses")
}

/// Farmer record with a 20°C soil sensor and the given planted crops
pub fn farmer_json(crops: serde_json::Value) -> String {
    serde_json::json!({
        "_id": FARMER_ID,
        "name": "Rahim",
        "phone": "01700000000",
        "temp1": 20.0,
        "soilHumidity": 45.0,
        "lat": 23.8,
        "lon": 90.4,
        "crops": crops
    })
    .to_string()
}

/// open-meteo daily response whose first day has the given mean humidity
pub fn forecast_json(humidity: f64) -> String {
    serde_json::json!({
        "latitude": 23.8,
        "longitude": 90.4,
        "daily": {
            "time": ["2025-12-10", "2025-12-11", "2025-12-12"],
            "weathercode": [0, 2, 61],
            "temperature_2m_max": [25.0, 24.5, 23.0],
            "temperature_2m_min": [14.0, 13.5, 15.0],
            "relative_humidity_2m_mean": [humidity, 75.0, 80.0]
        }
    })
    .to_string()
}

/// Dashboard service wired to a mock server with a preloaded catalog
pub fn dashboard_service(server_url: &str) -> DashboardService {
    let catalog_service = CatalogService::preloaded(
        CatalogFetcher::new(format!("{server_url}/catalog.json")),
        sample_catalog(),
        rabi_now(),
    );
    DashboardService::new(
        catalog_service,
        FarmerClient::new(format!("{server_url}/api/sensordata")),
        ForecastFetcher::new(format!("{server_url}/v1/forecast"), 3),
    )
}
