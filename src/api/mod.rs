//! Web API module for Anfitrion
//!
//! Provides:
//! - Health check for load balancers
//! - Twilio WhatsApp inbound webhook
//! - QR dispatch trigger for operators

pub mod health;
pub mod qr;
pub mod webhooks;

use axum::Router;

pub use health::health_routes;
pub use qr::qr_routes;
pub use webhooks::webhooks_routes;

/// Create the API router with all endpoints
pub fn api_router() -> Router {
    Router::new()
        .merge(health_routes())
        .merge(webhooks_routes())
        .merge(qr_routes())
}
