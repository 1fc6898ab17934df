//! Integration tests for Anfitrion
//!
//! Drives the conversation engine end to end across crates with in-memory
//! collaborators: webhook-shaped input through the state machine down to
//! the TwiML the webhook handler would return.

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

use anfitrion_channels::twiml;
use anfitrion_core::{
    AccessControl, AuthorizationStore, ChainParser, ConversationMachine, GuestRecord, GuestType,
    MemoryConversationStore, MessagingGateway, QrAutomation, QrDispatchReport, QrDispatcher,
    Result, SheetStore,
};

const PHONE: &str = "whatsapp:+5215512345678";

#[derive(Default)]
struct FakeSheets {
    events: Vec<String>,
    appended: Mutex<Vec<(String, GuestType, Vec<GuestRecord>)>>,
    pending: Vec<GuestRecord>,
}

#[async_trait::async_trait]
impl SheetStore for FakeSheets {
    async fn open_events(&self) -> Result<Vec<String>> {
        Ok(self.events.clone())
    }

    async fn append_guests(
        &self,
        event: &str,
        guest_type: GuestType,
        guests: &[GuestRecord],
    ) -> Result<()> {
        self.appended
            .lock()
            .await
            .push((event.to_string(), guest_type, guests.to_vec()));
        Ok(())
    }

    async fn qr_pending(&self, _event: &str) -> Result<Vec<GuestRecord>> {
        Ok(self.pending.clone())
    }

    async fn mark_qr_sent(&self, _event: &str, _guests: &[GuestRecord]) -> Result<()> {
        Ok(())
    }

    async fn guest_counts(&self, _event: &str) -> Result<Vec<(String, u32)>> {
        Ok(vec![("General".to_string(), 2)])
    }
}

#[derive(Default)]
struct FakeAuth {
    authorized: HashSet<String>,
    special: HashSet<String>,
    qr_sent: HashSet<String>,
}

#[async_trait::async_trait]
impl AuthorizationStore for FakeAuth {
    async fn is_authorized(&self, phone: &str) -> bool {
        self.authorized.contains(phone)
    }

    async fn is_special(&self, phone: &str) -> bool {
        self.special.contains(phone)
    }

    async fn is_qr_sent(&self, event: &str) -> bool {
        self.qr_sent.contains(event)
    }

    async fn mark_qr_sent(&self, _event: &str) -> Result<()> {
        Ok(())
    }
}

struct FakeAutomation;

#[async_trait::async_trait]
impl QrAutomation for FakeAutomation {
    async fn trigger(&self, _event: &str, guests: &[GuestRecord]) -> Result<QrDispatchReport> {
        Ok(QrDispatchReport {
            processed_count: guests.len() as u32,
            completed_at: chrono::Utc::now(),
        })
    }
}

#[derive(Default)]
struct FakeGateway {
    sent: Mutex<Vec<(String, String)>>,
}

#[async_trait::async_trait]
impl MessagingGateway for FakeGateway {
    async fn send_message(&self, phone: &str, text: &str) -> Result<()> {
        self.sent
            .lock()
            .await
            .push((phone.to_string(), text.to_string()));
        Ok(())
    }
}

fn machine_with(sheets: Arc<FakeSheets>, auth: Arc<FakeAuth>) -> ConversationMachine {
    let gateway = Arc::new(FakeGateway::default());
    let dispatcher = Arc::new(QrDispatcher::new(
        sheets.clone(),
        auth.clone(),
        Arc::new(FakeAutomation),
        gateway,
    ));
    ConversationMachine::new(
        Arc::new(MemoryConversationStore::new()),
        sheets,
        AccessControl::new(auth),
        Arc::new(ChainParser::deterministic()),
        dispatcher,
    )
}

fn authorized_auth() -> Arc<FakeAuth> {
    Arc::new(FakeAuth {
        authorized: HashSet::from(["5215512345678".to_string()]),
        ..FakeAuth::default()
    })
}

fn two_event_sheets() -> Arc<FakeSheets> {
    Arc::new(FakeSheets {
        events: vec!["Boda".to_string(), "Gala".to_string()],
        ..FakeSheets::default()
    })
}

#[tokio::test]
async fn test_full_registration_flow() {
    let sheets = two_event_sheets();
    let machine = machine_with(sheets.clone(), authorized_auth());

    let reply = machine.handle_message(PHONE, "hola").await;
    assert!(reply.contains("1. Boda"));
    assert!(reply.contains("2. Gala"));

    let reply = machine.handle_message(PHONE, "1").await;
    assert!(reply.contains("Boda"));
    assert!(reply.contains("VIP o General"));

    let reply = machine.handle_message(PHONE, "general").await;
    assert!(reply.contains("invitados General"));

    let reply = machine
        .handle_message(PHONE, "Juan Pérez - juan@ejemplo.com")
        .await;
    assert!(reply.contains("✅ Se registró 1 invitado General para Boda."));

    let appended = sheets.appended.lock().await;
    assert_eq!(appended.len(), 1);
    let (event, guest_type, guests) = &appended[0];
    assert_eq!(event, "Boda");
    assert_eq!(*guest_type, GuestType::General);
    assert_eq!(guests[0].name, "Juan Pérez");
    assert_eq!(guests[0].email, "juan@ejemplo.com");
}

#[tokio::test]
async fn test_unauthorized_phone_is_rejected() {
    let machine = machine_with(two_event_sheets(), Arc::new(FakeAuth::default()));

    let reply = machine.handle_message(PHONE, "hola").await;
    assert!(reply.contains("no está autorizado"));
}

#[tokio::test]
async fn test_closed_event_blocks_regular_sender() {
    let sheets = two_event_sheets();
    let auth = Arc::new(FakeAuth {
        authorized: HashSet::from(["5215512345678".to_string()]),
        qr_sent: HashSet::from(["Boda".to_string()]),
        ..FakeAuth::default()
    });
    let machine = machine_with(sheets.clone(), auth);

    machine.handle_message(PHONE, "hola").await;
    let reply = machine.handle_message(PHONE, "Boda").await;
    assert!(reply.contains("cerrado"));
    assert!(sheets.appended.lock().await.is_empty());
}

#[tokio::test]
async fn test_categorized_list_skips_type_question() {
    let sheets = two_event_sheets();
    let machine = machine_with(sheets.clone(), authorized_auth());

    machine.handle_message(PHONE, "hola").await;
    machine.handle_message(PHONE, "Gala").await;
    let reply = machine
        .handle_message(
            PHONE,
            "Hombres:\nJuan - juan@ejemplo.com\nMujeres:\nAna - ana@ejemplo.com",
        )
        .await;
    assert!(reply.contains("2 invitados"));
    assert!(reply.contains("Hombres: 1"));
    assert!(reply.contains("Mujeres: 1"));

    let appended = sheets.appended.lock().await;
    assert_eq!(appended[0].0, "Gala");
    assert_eq!(appended[0].2.len(), 2);
}

#[tokio::test]
async fn test_parse_error_reply_renders_as_twiml() {
    let machine = machine_with(two_event_sheets(), authorized_auth());

    machine.handle_message(PHONE, "hola").await;
    machine.handle_message(PHONE, "1").await;
    machine.handle_message(PHONE, "vip").await;
    let reply = machine.handle_message(PHONE, "Juan Pérez").await;
    assert!(reply.contains("⚠️"));

    // What the webhook handler hands back to Twilio
    let xml = twiml::message_response(&reply);
    assert!(xml.starts_with("<?xml"));
    assert!(xml.contains("<Message>"));
    assert!(xml.contains("&quot;Juan Pérez&quot;"));
}

#[tokio::test]
async fn test_count_command_reports_summary() {
    let sheets = Arc::new(FakeSheets {
        events: vec!["Boda".to_string()],
        ..FakeSheets::default()
    });
    let machine = machine_with(sheets, authorized_auth());

    let reply = machine.handle_message(PHONE, "cuántos invitados").await;
    assert!(reply.contains("General: 2"));
}
