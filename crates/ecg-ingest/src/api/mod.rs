//! HTTP upload endpoint for ECG recorders.
//!
//! Recorders push each study as the raw body of a `POST` or `PUT`. Every
//! upload is classified, stored under its detected extension, and XML
//! exports also get their embedded PDF written next to them.
//!
//! # Endpoints
//!
//! - `POST /{*path}`, `PUT /{*path}` - Upload a file (HTTP Basic auth when configured)
//! - `OPTIONS /{*path}` - CORS preflight
//! - `GET /{*path}` - Status page
//! - `GET /health` - Health check endpoint
//! - `GET /info` - Server information
//!
//! # cURL Examples
//!
//! ```bash
//! # Upload an XML export
//! curl -u admin:secret --data-binary @study.xml http://localhost:8080/study.xml
//!
//! # Upload with an explicit name
//! curl -u admin:secret -H 'Content-Disposition: attachment; filename="ecg42.pdf"' \
//!      --data-binary @report.pdf http://localhost:8080/
//!
//! # Health check
//! curl http://localhost:8080/health
//! ```

mod error;
mod handlers;
mod server;
mod types;

pub use error::ApiError;
pub use server::{create_router, serve};
pub use types::{ApiState, HealthResponse, InfoResponse};
