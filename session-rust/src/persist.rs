use std::sync::Arc;

use datachat_sdk::{ChatStore, SaveTurn, TurnRole};

/// The authenticated identity persistence writes on behalf of.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: String,
    pub credential: String,
}

/// Append-only write path to the chat store.
///
/// Persistence is best-effort by contract: a missing identity skips the
/// write silently, a failed write is logged and swallowed, and the
/// visible conversation never waits on either. The chat id returned by
/// the first successful save is reused for the rest of the session.
pub struct PersistenceBridge {
    store: Arc<dyn ChatStore>,
    auth: Option<AuthContext>,
    chat_id: Option<String>,
}

impl PersistenceBridge {
    #[must_use]
    pub fn new(store: Arc<dyn ChatStore>, auth: Option<AuthContext>) -> Self {
        Self {
            store,
            auth,
            chat_id: None,
        }
    }

    /// Continue an existing conversation instead of starting a new one.
    #[must_use]
    pub fn with_chat_id(mut self, chat_id: Option<String>) -> Self {
        self.chat_id = chat_id;
        self
    }

    /// The sticky chat id, once one is known.
    #[must_use]
    pub fn chat_id(&self) -> Option<&str> {
        self.chat_id.as_deref()
    }

    pub async fn save_user(&mut self, content: &str) {
        self.save(TurnRole::User, content).await;
    }

    pub async fn save_assistant(&mut self, content: &str) {
        self.save(TurnRole::Assistant, content).await;
    }

    async fn save(&mut self, role: TurnRole, content: &str) {
        let Some(auth) = &self.auth else {
            return;
        };
        let turn = SaveTurn {
            user_id: auth.user_id.clone(),
            chat_id: self.chat_id.clone(),
            role,
            content: content.to_string(),
        };
        match self.store.save(&turn, &auth.credential).await {
            Ok(saved) => {
                if self.chat_id.is_none() {
                    self.chat_id = saved.chat_id;
                }
            }
            Err(error) => {
                tracing::warn!(%error, "failed to save chat turn");
            }
        }
    }
}
