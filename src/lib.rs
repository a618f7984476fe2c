pub mod auth;
pub mod configuration;
pub mod error;
pub mod extractors;
pub mod metrics;
pub mod routes;
pub mod startup;
pub mod store;
pub mod telemetry;
