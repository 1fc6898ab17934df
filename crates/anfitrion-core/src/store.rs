//! Conversation state store
//!
//! Keyed by normalized phone number. The trait is injected into the state
//! machine so tests can use the in-memory implementation directly and hosts
//! could swap in a persistent one.

use crate::model::ConversationState;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Concurrency-safe conversation state store
#[async_trait::async_trait]
pub trait ConversationStore: Send + Sync {
    /// Get the state for a phone, if any
    async fn get(&self, phone: &str) -> Option<ConversationState>;

    /// Store the state for its phone
    async fn set(&self, state: ConversationState);

    /// Drop the state for a phone
    async fn delete(&self, phone: &str);
}

/// In-memory store over a lock-protected map
///
/// Safe for concurrent handlers of different phones; the webhook layer
/// processes one message per phone at a time.
#[derive(Default)]
pub struct MemoryConversationStore {
    states: RwLock<HashMap<String, ConversationState>>,
}

impl MemoryConversationStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn get(&self, phone: &str) -> Option<ConversationState> {
        self.states.read().await.get(phone).cloned()
    }

    async fn set(&self, state: ConversationState) {
        self.states
            .write()
            .await
            .insert(state.phone.clone(), state);
    }

    async fn delete(&self, phone: &str) {
        self.states.write().await.remove(phone);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Stage;

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = MemoryConversationStore::new();
        assert!(store.get("5215512345678").await.is_none());

        let mut state = ConversationState::new("5215512345678");
        state.stage = Stage::AwaitingGuestType;
        store.set(state.clone()).await;

        let loaded = store.get("5215512345678").await.unwrap();
        assert_eq!(loaded, state);

        store.delete("5215512345678").await;
        assert!(store.get("5215512345678").await.is_none());
    }

    #[tokio::test]
    async fn test_states_are_isolated_per_phone() {
        let store = MemoryConversationStore::new();
        let mut a = ConversationState::new("111");
        a.stage = Stage::AwaitingGuestData;
        let b = ConversationState::new("222");

        store.set(a).await;
        store.set(b).await;

        assert_eq!(
            store.get("111").await.unwrap().stage,
            Stage::AwaitingGuestData
        );
        assert_eq!(store.get("222").await.unwrap().stage, Stage::Initial);
    }
}
