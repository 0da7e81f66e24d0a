use std::env;

use crate::forecast_fetcher::DEFAULT_FORECAST_URL;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub sensor_api_url: String,
    pub catalog_url: String,
    pub forecast_url: String,
    pub forecast_days: u32,
    pub refresh_interval_minutes: u64,
    pub refresh_concurrency: usize,
    pub catalog_fetch_attempts: usize,
    /// Farms re-evaluated on every scheduler tick
    pub watched_farmers: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            sensor_api_url: env::var("SENSOR_API_URL")?,
            catalog_url: env::var("CATALOG_URL")?,
            forecast_url: env::var("FORECAST_URL")
                .unwrap_or_else(|_| DEFAULT_FORECAST_URL.to_string()),
            forecast_days: env::var("FORECAST_DAYS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .unwrap_or(3),
            // tokio intervals must be non-zero
            refresh_interval_minutes: env::var("REFRESH_INTERVAL_MINUTES")
                .unwrap_or_else(|_| "15".to_string())
                .parse::<u64>()
                .unwrap_or(15)
                .max(1),
            refresh_concurrency: env::var("REFRESH_CONCURRENCY")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .unwrap_or(4),
            catalog_fetch_attempts: env::var("CATALOG_FETCH_ATTEMPTS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .unwrap_or(3),
            watched_farmers: parse_list(&env::var("WATCHED_FARMERS").unwrap_or_default()),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("a, b,,c "), vec!["a", "b", "c"]);
        assert!(parse_list("").is_empty());
    }
}
