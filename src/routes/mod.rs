//! HTTP API handlers

pub mod analytics;
pub mod export;
pub mod health;
pub mod jobs;
pub mod metrics;
