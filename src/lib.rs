//! Event photo gallery: events, photos uploaded against them, and comments on
//! photos, served over HTTP with push-based subscriptions. The [`client`]
//! module holds the caller-side orchestration.

pub mod app;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod extract;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod routes;
pub mod services;
