pub mod auth;
pub mod configuration;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod moderation;
pub mod routes;
pub mod startup;
pub mod telemetry;
pub mod validators;
