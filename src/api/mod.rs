//! API Module
//!
//! HTTP surface for monitoring collaborators. The cache itself never pushes
//! metrics; these endpoints expose pull-style snapshots.
//!
//! # Endpoints
//! - `GET /health` - Cache round-trip health check
//! - `GET /stats` - Performance stats for both tiers
//! - `DELETE /patterns/:name` - Invalidate one cache pattern

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
