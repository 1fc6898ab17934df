//! QR dispatch trigger for operators

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::post;
use axum::Router;
use anfitrion_core::QrDispatcher;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Dispatch request body
#[derive(Debug, Default, Deserialize)]
pub struct DispatchRequest {
    /// Phone number to notify with per-event results
    #[serde(default)]
    pub notify_phone: Option<String>,
    /// Only process the named event
    #[serde(default)]
    pub event: Option<String>,
    /// Report pending guests without triggering the portal
    #[serde(default)]
    pub dry_run: bool,
}

/// Dispatch acknowledgement
#[derive(Debug, Serialize)]
pub struct DispatchAck {
    pub status: &'static str,
}

/// Start a QR dispatch run in the background (POST)
///
/// Runs take minutes; the request returns as soon as the run is queued.
async fn dispatch_qr(
    Extension(dispatcher): Extension<Arc<QrDispatcher>>,
    Json(request): Json<DispatchRequest>,
) -> (StatusCode, Json<DispatchAck>) {
    info!(
        event = request.event.as_deref().unwrap_or("all"),
        dry_run = request.dry_run,
        "qr dispatch requested"
    );

    dispatcher.spawn(request.notify_phone, request.event, request.dry_run);
    (StatusCode::ACCEPTED, Json(DispatchAck { status: "queued" }))
}

/// Create QR dispatch routes
pub fn qr_routes() -> Router {
    Router::new().route("/api/v1/qr/dispatch", post(dispatch_qr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request: DispatchRequest = serde_json::from_str("{}").unwrap();
        assert!(request.notify_phone.is_none());
        assert!(request.event.is_none());
        assert!(!request.dry_run);
    }

    #[test]
    fn test_request_full() {
        let request: DispatchRequest =
            serde_json::from_str(r#"{"notify_phone":"5215512345678","event":"Boda","dry_run":true}"#)
                .unwrap();
        assert_eq!(request.event.as_deref(), Some("Boda"));
        assert!(request.dry_run);
    }
}
