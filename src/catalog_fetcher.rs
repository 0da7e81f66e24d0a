use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, instrument, warn};

use crate::engine::models::{Crop, CropRecord};
use crate::fetch_error::FetchError;

#[derive(Clone)]
pub struct CatalogFetcher {
    client: reqwest::Client,
    url: String,
}

impl CatalogFetcher {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn fetch_catalog(&self) -> Result<Vec<Crop>, FetchError> {
        debug!("Sending HTTP request to crop catalog");
        let response = self.client.get(&self.url).send().await?;
        debug!("Received HTTP response with status: {}", response.status());

        if !response.status().is_success() {
            return Err(FetchError::from_status(response.status(), &self.url));
        }

        // Fetched as text: the upstream JSON is not always valid as served
        let text = response.text().await?;
        debug!("Retrieved catalog text, size: {} bytes", text.len());

        parse_catalog(&text)
    }
}

fn stray_prefix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#":Z\s*""#).expect("static regex is valid"))
}

/// Repair the known catalog typo `"Crops Type":Z "Vegetable"` so the text
/// parses as JSON
pub fn clean_catalog_text(raw: &str) -> String {
    stray_prefix_pattern().replace_all(raw, r#": ""#).into_owned()
}

/// Parse catalog text into crops, skipping rows that cannot be used
///
/// Fails only when the text as a whole is not a JSON array of objects.
#[instrument(skip(raw), fields(text_size = raw.len()))]
pub fn parse_catalog(raw: &str) -> Result<Vec<Crop>, FetchError> {
    let cleaned = clean_catalog_text(raw);
    let records: Vec<CropRecord> = serde_json::from_str(&cleaned)?;
    let row_count = records.len();

    let mut crops = Vec::with_capacity(row_count);
    let mut skipped_rows = 0;

    for (index, record) in records.into_iter().enumerate() {
        match Crop::from_record(record) {
            Ok(crop) => crops.push(crop),
            Err(e) => {
                warn!("Skipping catalog row {}: {}", index, e);
                skipped_rows += 1;
            }
        }
    }

    if skipped_rows > 0 {
        warn!("Skipped {} unusable rows out of {}", skipped_rows, row_count);
    }
    debug!("Parsed {} crops from {} rows", crops.len(), row_count);

    Ok(crops)
}
