use crate::{
    client_utils::{bearer_headers, get_json, send_json},
    errors::ApiResult,
    types::{HistoryMessage, TurnRole},
};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// One turn to persist to the chat store.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct SaveTurn {
    pub user_id: String,
    /// Absent for the first turn of a fresh conversation; the store
    /// responds with the chat id to use from then on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    pub role: TurnRole,
    pub content: String,
}

/// Response of a successful save.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct SavedTurn {
    #[serde(default)]
    pub chat_id: Option<String>,
}

/// One conversation in the history list, most recent first.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct ChatSummary {
    pub chat_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// A stored conversation, oldest turn first.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct ChatRecord {
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
}

/// The chat persistence store. Writes are append-only; the visible
/// conversation never waits on them.
#[async_trait::async_trait]
pub trait ChatStore: Send + Sync {
    async fn save(&self, turn: &SaveTurn, credential: &str) -> ApiResult<SavedTurn>;
    async fn list(&self, user_id: &str, credential: &str) -> ApiResult<Vec<ChatSummary>>;
    async fn get_by_id(
        &self,
        user_id: &str,
        chat_id: &str,
        credential: &str,
    ) -> ApiResult<ChatRecord>;
}

pub struct HttpChatStore {
    pub base_url: String,
    pub client: Client,
}

impl HttpChatStore {
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl ChatStore for HttpChatStore {
    async fn save(&self, turn: &SaveTurn, credential: &str) -> ApiResult<SavedTurn> {
        let url = format!("{}/chat/messages", self.base_url);
        send_json(&self.client, &url, turn, bearer_headers(credential)?).await
    }

    async fn list(&self, user_id: &str, credential: &str) -> ApiResult<Vec<ChatSummary>> {
        let url = format!("{}/users/{user_id}/chats", self.base_url);
        get_json(&self.client, &url, bearer_headers(credential)?).await
    }

    async fn get_by_id(
        &self,
        user_id: &str,
        chat_id: &str,
        credential: &str,
    ) -> ApiResult<ChatRecord> {
        let url = format!("{}/users/{user_id}/chats/{chat_id}", self.base_url);
        get_json(&self.client, &url, bearer_headers(credential)?).await
    }
}
