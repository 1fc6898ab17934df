//! User-facing reply catalog (Spanish)
//!
//! Every reply the bot sends lives here so wording stays in one place and
//! the machine code reads as control flow.

use crate::error::{AccessError, ParseError};
use crate::model::{GuestCategory, GuestRecord, GuestType};

/// Rejection for a phone outside the authorization list
#[must_use]
pub fn not_authorized() -> String {
    "⛔ Este número no está autorizado para registrar invitados.".to_string()
}

/// Rejection once an event's QR dispatch has closed registration
#[must_use]
pub fn registration_closed(event: &str) -> String {
    format!(
        "⛔ El registro para {event} está cerrado: los códigos QR ya fueron enviados. \
         Contacta al organizador si necesitas agregar invitados."
    )
}

/// Rejection for a QR command without special privilege
#[must_use]
pub fn qr_denied() -> String {
    "⛔ No tienes permiso para enviar códigos QR.".to_string()
}

/// Turn a parse error into corrective guidance
#[must_use]
pub fn parse_error(error: &ParseError) -> String {
    match error {
        ParseError::UnbalancedData { line } => format!(
            "⚠️ Falta el nombre o el correo en la línea: \"{line}\".\n\
             Cada invitado va en su propia línea: Nombre - correo@ejemplo.com.\n\
             No se registró ningún invitado; corrige la lista y envíala de nuevo."
        ),
        ParseError::InvalidEmailFormat { line } => format!(
            "⚠️ El correo no es válido en la línea: \"{line}\".\n\
             Cada línea necesita exactamente un correo (ejemplo: ana@ejemplo.com)."
        ),
        ParseError::UnrecognizedCategory { header } => format!(
            "⚠️ Categoría no reconocida: \"{header}\".\n\
             Las categorías válidas son Hombres:, Mujeres: y General:."
        ),
        ParseError::EmptyInput => "⚠️ No encontré invitados en tu mensaje.\n\
             Envía una línea por invitado: Nombre - correo@ejemplo.com."
            .to_string(),
    }
}

/// Turn an access error into its rejection message
#[must_use]
pub fn access_error(error: &AccessError) -> String {
    match error {
        AccessError::NotAuthorized => not_authorized(),
        AccessError::RegistrationClosed { event } => registration_closed(event),
        AccessError::QrCommandDenied => qr_denied(),
    }
}

/// Generic apology for collaborator failures
#[must_use]
pub fn apology() -> String {
    "Lo siento, hubo un error en el sistema. Inténtalo más tarde.".to_string()
}

/// Numbered open-event list
#[must_use]
pub fn choose_event(events: &[String]) -> String {
    let mut text = String::from("📅 Eventos abiertos:\n");
    for (i, event) in events.iter().enumerate() {
        text.push_str(&format!("{}. {}\n", i + 1, event));
    }
    text.push_str("\nResponde con el número o el nombre del evento.");
    text
}

/// Re-prompt after an invalid event selection
#[must_use]
pub fn invalid_selection(events: &[String]) -> String {
    format!(
        "No reconocí esa opción. Elige un evento de la lista:\n{}",
        events
            .iter()
            .enumerate()
            .map(|(i, e)| format!("{}. {}", i + 1, e))
            .collect::<Vec<_>>()
            .join("\n")
    )
}

/// No events are currently open
#[must_use]
pub fn no_open_events() -> String {
    "📅 No hay eventos abiertos en este momento.".to_string()
}

/// Ask for the guest type of the selected event
#[must_use]
pub fn choose_guest_type(event: &str) -> String {
    format!(
        "Evento: {event}.\n¿Qué tipo de invitados vas a registrar? Responde VIP o General.\n\
         También puedes enviar la lista por categorías (Hombres:, Mujeres:, General:)."
    )
}

/// Ask for the guest list
#[must_use]
pub fn prompt_guest_data(event: &str, guest_type: GuestType) -> String {
    format!(
        "Perfecto, invitados {guest_type} para {event}.\n\
         Envía una línea por invitado:\nNombre - correo@ejemplo.com"
    )
}

/// Registration success
#[must_use]
pub fn registration_success(guests: &[GuestRecord], guest_type: GuestType, event: &str) -> String {
    let categorized = guests.iter().any(|g| g.category.is_some());
    if categorized {
        let mut counts: Vec<(GuestCategory, u32)> = Vec::new();
        for guest in guests {
            if let Some(category) = guest.category {
                match counts.iter_mut().find(|(c, _)| *c == category) {
                    Some((_, n)) => *n += 1,
                    None => counts.push((category, 1)),
                }
            }
        }
        let detail = counts
            .iter()
            .map(|(c, n)| format!("{c}: {n}"))
            .collect::<Vec<_>>()
            .join(", ");
        return format!(
            "✅ Se registraron {} invitados para {event} ({detail}).",
            guests.len()
        );
    }
    if guests.len() == 1 {
        format!("✅ Se registró 1 invitado {guest_type} para {event}.")
    } else {
        format!(
            "✅ Se registraron {} invitados {guest_type} para {event}.",
            guests.len()
        )
    }
}

/// Conversation canceled
#[must_use]
pub fn canceled() -> String {
    "Operación cancelada. Escríbeme cuando quieras registrar invitados.".to_string()
}

/// QR dispatch acknowledged; completion arrives later
#[must_use]
pub fn qr_ack() -> String {
    "🎫 Recibido: estoy procesando el envío de códigos QR. Te aviso cuando termine.".to_string()
}

/// QR dispatch finished for one event
#[must_use]
pub fn qr_done(event: &str, processed: u32) -> String {
    format!("🎫 Códigos QR enviados para {event}: {processed} invitados procesados.")
}

/// QR dispatch would run for one event (dry run)
#[must_use]
pub fn qr_dry_run(event: &str, pending: usize) -> String {
    format!("🎫 (Prueba) {event}: se enviarían códigos QR a {pending} invitados.")
}

/// QR dispatch failed for one event
#[must_use]
pub fn qr_failed(event: &str) -> String {
    format!("⚠️ No se pudieron enviar los códigos QR para {event}. Inténtalo más tarde.")
}

/// Per-category guest count summary
#[must_use]
pub fn count_summary(event: &str, counts: &[(String, u32)]) -> String {
    if counts.is_empty() {
        return format!("📋 Aún no hay invitados registrados para {event}.");
    }
    let total: u32 = counts.iter().map(|(_, n)| n).sum();
    let mut text = format!("📋 Resumen de invitados para {event}:\n\n");
    for (category, count) in counts {
        text.push_str(&format!("- {category}: {count}\n"));
    }
    text.push_str(&format!("\nTotal: {total} invitados"));
    text
}

/// Ask which event a count refers to when none is in progress
#[must_use]
pub fn count_needs_event() -> String {
    "Hay varios eventos abiertos. Empieza un registro y elige el evento para ver su resumen."
        .to_string()
}

/// Usage help
#[must_use]
pub fn help() -> String {
    "📱 *Ayuda del sistema de invitados*\n\n\
     Para registrar invitados escribe cualquier mensaje y sigue los pasos:\n\
     elige el evento, el tipo (VIP o General) y envía la lista:\n\
     ```\nJuan Pérez - juan@ejemplo.com\nAna García - ana@ejemplo.com\n```\n\
     O envía la lista por categorías:\n\
     ```\nHombres:\nJuan Pérez - juan@ejemplo.com\nMujeres:\nAna García - ana@ejemplo.com\n```\n\n\
     Otros comandos:\n\
     - \"cuántos invitados\" para ver el resumen\n\
     - \"cancelar\" para empezar de nuevo"
        .to_string()
}
