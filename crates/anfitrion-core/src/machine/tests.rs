use super::*;
use crate::collaborators::{
    MockAuthorizationStore, MockMessagingGateway, MockQrAutomation, MockSheetStore,
};
use crate::model::QrDispatchReport;
use crate::parser::ChainParser;
use crate::store::MemoryConversationStore;
use chrono::Utc;

const PHONE: &str = "5215512345678";

fn auth_mock(authorized: bool, special: bool, qr_sent: bool) -> MockAuthorizationStore {
    let mut auth = MockAuthorizationStore::new();
    auth.expect_is_authorized().return_const(authorized);
    auth.expect_is_special().return_const(special);
    auth.expect_is_qr_sent().return_const(qr_sent);
    auth.expect_mark_qr_sent().returning(|_| Ok(()));
    auth
}

fn build(
    sheets: MockSheetStore,
    auth: MockAuthorizationStore,
) -> (ConversationMachine, Arc<MemoryConversationStore>) {
    let mut automation = MockQrAutomation::new();
    automation.expect_trigger().returning(|_, guests| {
        Ok(QrDispatchReport {
            processed_count: guests.len() as u32,
            completed_at: Utc::now(),
        })
    });
    let mut gateway = MockMessagingGateway::new();
    gateway.expect_send_message().returning(|_, _| Ok(()));

    let sheets: Arc<MockSheetStore> = Arc::new(sheets);
    let auth: Arc<MockAuthorizationStore> = Arc::new(auth);
    let store = Arc::new(MemoryConversationStore::new());
    let dispatcher = Arc::new(QrDispatcher::new(
        sheets.clone(),
        auth.clone(),
        Arc::new(automation),
        Arc::new(gateway),
    ));
    let machine = ConversationMachine::new(
        store.clone(),
        sheets,
        AccessControl::new(auth),
        Arc::new(ChainParser::deterministic()),
        dispatcher,
    );
    (machine, store)
}

async fn seed(store: &MemoryConversationStore, stage: Stage, event: Option<&str>, guest_type: Option<GuestType>) {
    let mut state = ConversationState::new(PHONE);
    state.stage = stage;
    state.selected_event = event.map(str::to_string);
    state.guest_type = guest_type;
    store.set(state).await;
}

#[tokio::test]
async fn test_unauthorized_phone_gets_rejection_and_no_state() {
    let (machine, store) = build(MockSheetStore::new(), auth_mock(false, false, false));

    let reply = machine
        .handle_message("whatsapp:+5215512345678", "hola")
        .await;

    assert!(reply.contains("no está autorizado"));
    assert!(store.get(PHONE).await.is_none());
}

#[tokio::test]
async fn test_initial_with_multiple_events_lists_choices() {
    let mut sheets = MockSheetStore::new();
    sheets
        .expect_open_events()
        .returning(|| Ok(vec!["Boda".to_string(), "Gala".to_string()]));
    let (machine, store) = build(sheets, auth_mock(true, false, false));

    let reply = machine.handle_message(PHONE, "hola").await;

    assert!(reply.contains("1. Boda"));
    assert!(reply.contains("2. Gala"));
    let state = store.get(PHONE).await.unwrap();
    assert_eq!(state.stage, Stage::AwaitingEventSelection);
    assert_eq!(state.pending_events, vec!["Boda", "Gala"]);
}

#[tokio::test]
async fn test_initial_with_single_event_skips_selection() {
    let mut sheets = MockSheetStore::new();
    sheets
        .expect_open_events()
        .returning(|| Ok(vec!["Boda".to_string()]));
    let (machine, store) = build(sheets, auth_mock(true, false, false));

    let reply = machine.handle_message(PHONE, "hola").await;

    assert!(reply.contains("Boda"));
    assert!(reply.contains("VIP o General"));
    let state = store.get(PHONE).await.unwrap();
    assert_eq!(state.stage, Stage::AwaitingGuestType);
    assert_eq!(state.selected_event.as_deref(), Some("Boda"));
}

#[tokio::test]
async fn test_initial_with_no_open_events() {
    let mut sheets = MockSheetStore::new();
    sheets.expect_open_events().returning(|| Ok(Vec::new()));
    let (machine, store) = build(sheets, auth_mock(true, false, false));

    let reply = machine.handle_message(PHONE, "hola").await;

    assert!(reply.contains("No hay eventos abiertos"));
    assert_eq!(store.get(PHONE).await.unwrap().stage, Stage::Initial);
}

#[tokio::test]
async fn test_selection_by_index_and_by_name() {
    let (machine, store) = build(MockSheetStore::new(), auth_mock(true, false, false));
    let mut state = ConversationState::new(PHONE);
    state.stage = Stage::AwaitingEventSelection;
    state.pending_events = vec!["Boda".to_string(), "Gala".to_string()];
    store.set(state.clone()).await;

    let reply = machine.handle_message(PHONE, "2").await;
    assert!(reply.contains("Gala"));
    assert_eq!(
        store.get(PHONE).await.unwrap().selected_event.as_deref(),
        Some("Gala")
    );

    store.set(state).await;
    machine.handle_message(PHONE, "boda").await;
    assert_eq!(
        store.get(PHONE).await.unwrap().selected_event.as_deref(),
        Some("Boda")
    );
}

#[tokio::test]
async fn test_invalid_selection_reprompts_without_state_change() {
    let (machine, store) = build(MockSheetStore::new(), auth_mock(true, false, false));
    let mut state = ConversationState::new(PHONE);
    state.stage = Stage::AwaitingEventSelection;
    state.pending_events = vec!["Boda".to_string(), "Gala".to_string()];
    store.set(state).await;

    let reply = machine.handle_message(PHONE, "7").await;

    assert!(reply.contains("No reconocí esa opción"));
    let state = store.get(PHONE).await.unwrap();
    assert_eq!(state.stage, Stage::AwaitingEventSelection);
    assert!(state.selected_event.is_none());
}

#[tokio::test]
async fn test_guest_type_selection_moves_to_guest_data() {
    let (machine, store) = build(MockSheetStore::new(), auth_mock(true, false, false));
    seed(&store, Stage::AwaitingGuestType, Some("Boda"), None).await;

    let reply = machine.handle_message(PHONE, "VIP").await;

    assert!(reply.contains("VIP"));
    let state = store.get(PHONE).await.unwrap();
    assert_eq!(state.stage, Stage::AwaitingGuestData);
    assert_eq!(state.guest_type, Some(GuestType::Vip));
}

#[tokio::test]
async fn test_registration_success_resets_to_initial() {
    let mut sheets = MockSheetStore::new();
    sheets
        .expect_append_guests()
        .withf(|event, guest_type, guests| {
            event == "Boda"
                && *guest_type == GuestType::General
                && guests.len() == 1
                && guests[0].name == "Juan Pérez"
                && guests[0].email == "juan@ejemplo.com"
        })
        .times(1)
        .returning(|_, _, _| Ok(()));
    let (machine, store) = build(sheets, auth_mock(true, false, false));
    seed(
        &store,
        Stage::AwaitingGuestData,
        Some("Boda"),
        Some(GuestType::General),
    )
    .await;

    let reply = machine
        .handle_message(PHONE, "Juan Pérez - juan@ejemplo.com")
        .await;

    assert!(reply.contains("1 invitado General"));
    assert!(reply.contains("Boda"));
    let state = store.get(PHONE).await.unwrap();
    assert_eq!(state.stage, Stage::Initial);
    assert!(state.selected_event.is_none());
    assert!(state.guest_type.is_none());
}

#[tokio::test]
async fn test_parse_error_leaves_state_unchanged() {
    let mut sheets = MockSheetStore::new();
    sheets.expect_append_guests().times(0);
    let (machine, store) = build(sheets, auth_mock(true, false, false));
    seed(
        &store,
        Stage::AwaitingGuestData,
        Some("Boda"),
        Some(GuestType::General),
    )
    .await;

    let reply = machine
        .handle_message(PHONE, "Juan Pérez - juan@ejemplo.com\nPedro Gómez")
        .await;

    assert!(reply.contains("Pedro Gómez"));
    let state = store.get(PHONE).await.unwrap();
    assert_eq!(state.stage, Stage::AwaitingGuestData);
    assert_eq!(state.selected_event.as_deref(), Some("Boda"));
}

#[tokio::test]
async fn test_cancel_resets_from_any_non_initial_stage() {
    let (machine, store) = build(MockSheetStore::new(), auth_mock(true, false, false));
    for stage in [
        Stage::AwaitingEventSelection,
        Stage::AwaitingGuestType,
        Stage::AwaitingGuestData,
    ] {
        seed(&store, stage, Some("Boda"), Some(GuestType::Vip)).await;

        let reply = machine.handle_message(PHONE, "Cancelar").await;

        assert!(reply.contains("cancelada"));
        let state = store.get(PHONE).await.unwrap();
        assert_eq!(state.stage, Stage::Initial);
        assert!(state.selected_event.is_none());
        assert!(state.guest_type.is_none());
    }
}

#[tokio::test]
async fn test_registration_closed_after_qr_dispatch_for_regular_phone() {
    let mut sheets = MockSheetStore::new();
    sheets.expect_append_guests().times(0);
    let (machine, store) = build(sheets, auth_mock(true, false, true));
    seed(
        &store,
        Stage::AwaitingGuestData,
        Some("Boda"),
        Some(GuestType::General),
    )
    .await;

    let reply = machine
        .handle_message(PHONE, "Juan Pérez - juan@ejemplo.com")
        .await;

    assert!(reply.contains("cerrado"));
    assert_eq!(
        store.get(PHONE).await.unwrap().stage,
        Stage::AwaitingGuestData
    );
}

#[tokio::test]
async fn test_special_phone_registers_after_qr_dispatch() {
    let mut sheets = MockSheetStore::new();
    sheets
        .expect_append_guests()
        .times(1)
        .returning(|_, _, _| Ok(()));
    let (machine, store) = build(sheets, auth_mock(true, true, true));
    seed(
        &store,
        Stage::AwaitingGuestData,
        Some("Boda"),
        Some(GuestType::General),
    )
    .await;

    let reply = machine
        .handle_message(PHONE, "Juan Pérez - juan@ejemplo.com")
        .await;

    assert!(reply.contains("1 invitado General"));
}

#[tokio::test]
async fn test_categorized_input_skips_guest_type_question() {
    let mut sheets = MockSheetStore::new();
    sheets
        .expect_append_guests()
        .withf(|event, _, guests| {
            event == "Boda" && guests.iter().all(|g| g.category.is_some())
        })
        .times(1)
        .returning(|_, _, _| Ok(()));
    let (machine, store) = build(sheets, auth_mock(true, false, false));
    seed(&store, Stage::AwaitingGuestType, Some("Boda"), None).await;

    let reply = machine
        .handle_message(
            PHONE,
            "Hombres:\nJuan - juan@ejemplo.com\nMujeres:\nAna - ana@ejemplo.com",
        )
        .await;

    assert!(reply.contains("2 invitados"));
    assert_eq!(store.get(PHONE).await.unwrap().stage, Stage::Initial);
}

#[tokio::test]
async fn test_sheet_failure_apologizes_and_keeps_state() {
    let mut sheets = MockSheetStore::new();
    sheets
        .expect_append_guests()
        .returning(|_, _, _| Err(Error::Sheet("quota exceeded".to_string())));
    let (machine, store) = build(sheets, auth_mock(true, false, false));
    seed(
        &store,
        Stage::AwaitingGuestData,
        Some("Boda"),
        Some(GuestType::General),
    )
    .await;

    let reply = machine
        .handle_message(PHONE, "Juan Pérez - juan@ejemplo.com")
        .await;

    assert!(reply.contains("Lo siento"));
    assert_eq!(
        store.get(PHONE).await.unwrap().stage,
        Stage::AwaitingGuestData
    );
}

#[tokio::test]
async fn test_qr_command_denied_for_regular_phone() {
    let (machine, _store) = build(MockSheetStore::new(), auth_mock(true, false, false));

    let reply = machine.handle_message(PHONE, "enviar qr").await;

    assert!(reply.contains("permiso"));
}

#[tokio::test]
async fn test_qr_command_acknowledged_for_special_phone() {
    let mut sheets = MockSheetStore::new();
    // The background run may or may not land before the test ends
    sheets.expect_open_events().returning(|| Ok(Vec::new()));
    let (machine, _store) = build(sheets, auth_mock(true, true, false));

    let reply = machine.handle_message(PHONE, "Procesar QR").await;

    assert!(reply.contains("procesando el envío"));
}

#[tokio::test]
async fn test_qr_command_alongside_registration_does_both() {
    let mut sheets = MockSheetStore::new();
    sheets.expect_open_events().returning(|| Ok(Vec::new()));
    sheets.expect_qr_pending().returning(|_| Ok(Vec::new()));
    sheets
        .expect_append_guests()
        .times(1)
        .returning(|_, _, _| Ok(()));
    let (machine, store) = build(sheets, auth_mock(true, true, false));
    seed(
        &store,
        Stage::AwaitingGuestData,
        Some("Boda"),
        Some(GuestType::General),
    )
    .await;

    let reply = machine
        .handle_message(PHONE, "enviar qr\nJuan Pérez - juan@ejemplo.com")
        .await;

    assert!(reply.contains("procesando el envío"));
    assert!(reply.contains("1 invitado General"));
    assert_eq!(store.get(PHONE).await.unwrap().stage, Stage::Initial);
}

#[tokio::test]
async fn test_count_command_with_selected_event() {
    let mut sheets = MockSheetStore::new();
    sheets
        .expect_guest_counts()
        .withf(|event| event == "Boda")
        .returning(|_| Ok(vec![("Hombres".to_string(), 2), ("Mujeres".to_string(), 1)]));
    let (machine, store) = build(sheets, auth_mock(true, false, false));
    seed(&store, Stage::AwaitingGuestData, Some("Boda"), None).await;

    let reply = machine.handle_message(PHONE, "cuántos invitados").await;

    assert!(reply.contains("Hombres: 2"));
    assert!(reply.contains("Total: 3 invitados"));
    // Count never advances the conversation
    assert_eq!(
        store.get(PHONE).await.unwrap().stage,
        Stage::AwaitingGuestData
    );
}

#[tokio::test]
async fn test_help_command_in_any_stage() {
    let (machine, store) = build(MockSheetStore::new(), auth_mock(true, false, false));
    seed(&store, Stage::AwaitingGuestType, Some("Boda"), None).await;

    let reply = machine.handle_message(PHONE, "ayuda").await;

    assert!(reply.contains("Ayuda del sistema"));
    assert_eq!(
        store.get(PHONE).await.unwrap().stage,
        Stage::AwaitingGuestType
    );
}
