pub mod api;
pub mod app;
pub mod catalog_fetcher;
pub mod config;
pub mod engine;
pub mod farmer_client;
pub mod fetch_error;
pub mod forecast_fetcher;
pub mod scheduler;
pub mod services;
