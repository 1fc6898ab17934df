//! Webhook handlers for external messaging services

use axum::extract::{Extension, Form};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use anfitrion_channels::twiml;
use anfitrion_core::ConversationMachine;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Fields Twilio posts for an inbound WhatsApp message
///
/// Twilio sends many more form fields; only these two matter here.
#[derive(Debug, Deserialize)]
pub struct TwilioInbound {
    /// Sender address, e.g. `whatsapp:+5215512345678`
    #[serde(rename = "From")]
    pub from: String,
    /// Message text
    #[serde(rename = "Body", default)]
    pub body: String,
}

/// Handle an inbound Twilio WhatsApp message (POST)
///
/// The reply goes back in the response body as TwiML; Twilio relays it
/// to the sender. Always 200: the machine answers errors in-band.
async fn whatsapp_webhook(
    Extension(machine): Extension<Arc<ConversationMachine>>,
    Form(inbound): Form<TwilioInbound>,
) -> impl IntoResponse {
    info!(from = %inbound.from, chars = inbound.body.len(), "inbound whatsapp message");

    let reply = machine.handle_message(&inbound.from, &inbound.body).await;
    let body = if reply.is_empty() {
        twiml::empty_response()
    } else {
        twiml::message_response(&reply)
    };

    ([(header::CONTENT_TYPE, "text/xml")], body)
}

/// Create webhook routes
pub fn webhooks_routes() -> Router {
    Router::new().route("/webhook/whatsapp", post(whatsapp_webhook))
}
