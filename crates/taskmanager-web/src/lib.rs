//! taskmanager-web — HTTP front end for the task manager.
//!
//! Serves the server-rendered task list, a small JSON API, the health,
//! readiness and liveness endpoints, and the Prometheus scrape endpoint.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod service;
pub mod state;
pub mod templates;
