//! HTTP handlers for all web routes.

pub mod api;
pub mod health;
pub mod metrics;
pub mod pages;
