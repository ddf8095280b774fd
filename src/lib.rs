//! Swift Node library exports

pub mod analytics;
pub mod error;
pub mod export;
pub mod filter;
pub mod models;
pub mod query;
pub mod routes;
pub mod services;
pub mod state;
