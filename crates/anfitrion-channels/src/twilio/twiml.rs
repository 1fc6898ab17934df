//! TwiML rendering for synchronous webhook replies
//!
//! Twilio delivers inbound WhatsApp messages over a form-encoded webhook
//! and accepts the reply as a TwiML document in the HTTP response body.

/// Render a single-message TwiML response
#[must_use]
pub fn message_response(body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
        escape(body)
    )
}

/// Render an empty TwiML response (no reply to the sender)
#[must_use]
pub fn empty_response() -> String {
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response></Response>".to_string()
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
