use std::sync::Arc;

use datachat_sdk::{
    AssistantEndpoint, AssistantStreamInput, ChatRecord, ChatStore, DataSource,
    DataSourceRegistry, GraphClassifier, HistoryMessage, StreamItem, StreamStatus, StreamedPart,
    TurnAccumulator, TurnRole, DEFAULT_LOADING_LABEL,
};
use futures::StreamExt;

use crate::{
    errors::SessionError,
    extractor::extract_turn,
    persist::{AuthContext, PersistenceBridge},
    types::{ArtifactSet, Turn, TurnContent},
};

/// Greeting turn of a fresh conversation.
pub const GREETING_TEXT: &str =
    "Hello! I am your data assistant. I can help you query and analyze your database. What would you like to know?";

/// Fallback assistant turn when a completed stream cannot be processed.
pub const SENTINEL_TURN_TEXT: &str =
    "Sorry, I could not understand it. Can you please rephrase it?";

/// How a `send` concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input: nothing was appended and no call was issued.
    Ignored,
    /// The stream failed before completing; no assistant turn appended.
    StreamFailed,
    /// Extraction failed; the sentinel turn was appended.
    Failed,
    /// An assistant turn was appended and the artifacts committed.
    Completed,
}

/// How data-source loading concluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSourceSelection {
    /// A source is selected: the already-chosen one, else the first
    /// listed.
    Selected(String),
    /// No connected sources; the caller should route to source setup.
    SetupRequired,
}

/// Owns the live conversation: the append-only turn log, the streaming
/// flag, and the most recent completed turn's artifact set. Turns are
/// appended strictly in send-then-respond order.
pub struct ChatSession {
    assistant: Arc<dyn AssistantEndpoint>,
    classifier: Arc<dyn GraphClassifier>,
    auth: Option<AuthContext>,
    persistence: PersistenceBridge,
    turns: Vec<Turn>,
    artifacts: ArtifactSet,
    is_streaming: bool,
    status: Option<StreamStatus>,
    data_source_id: Option<String>,
    data_sources: Vec<DataSource>,
}

impl ChatSession {
    #[must_use]
    pub fn new(params: ChatSessionParams) -> Self {
        let persistence = PersistenceBridge::new(params.store, params.auth.clone())
            .with_chat_id(params.chat_id);
        let turns = if params.initial_turns.is_empty() {
            vec![Turn::assistant_text(GREETING_TEXT)]
        } else {
            params.initial_turns
        };
        Self {
            assistant: params.assistant,
            classifier: params.classifier,
            auth: params.auth,
            persistence,
            turns,
            artifacts: ArtifactSet::default(),
            is_streaming: false,
            status: None,
            data_source_id: params.data_source_id,
            data_sources: Vec::new(),
        }
    }

    pub fn builder(
        assistant: Arc<dyn AssistantEndpoint>,
        classifier: Arc<dyn GraphClassifier>,
        store: Arc<dyn ChatStore>,
    ) -> ChatSessionParams {
        ChatSessionParams::new(assistant, classifier, store)
    }

    /// Turns restored from a stored conversation, for seeding a session
    /// that continues an existing chat.
    #[must_use]
    pub fn turns_from_record(record: &ChatRecord) -> Vec<Turn> {
        record.messages.iter().map(Turn::from_history).collect()
    }

    /// Sends one user message and drives the turn to completion: the
    /// user turn is appended optimistically and persisted best-effort,
    /// the assistant stream is consumed, and the extracted assistant
    /// turn (or the sentinel) is appended. Blank input is a no-op.
    pub async fn send(&mut self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Ignored;
        }

        self.turns.push(Turn::user(text));
        self.persistence.save_user(text).await;

        self.is_streaming = true;
        self.status = None;
        let outcome = self.run_turn(text).await;
        // Cleared on success and on both failure paths.
        self.is_streaming = false;
        self.status = None;
        outcome
    }

    async fn run_turn(&mut self, query: &str) -> SendOutcome {
        let parts = match self.collect_parts().await {
            Ok(parts) => parts,
            Err(error) => {
                tracing::warn!(%error, "assistant stream failed");
                return SendOutcome::StreamFailed;
            }
        };

        let classifier = self.classifier.clone();
        match extract_turn(&parts, query, classifier.as_ref(), &mut self.persistence).await {
            Ok(extracted) => {
                let has_artifacts = extracted.artifacts.has_any();
                self.artifacts = extracted.artifacts;
                let content = if has_artifacts {
                    TurnContent::Artifacts
                } else {
                    TurnContent::Text(extracted.narrative.clone().unwrap_or_default())
                };
                self.turns.push(Turn {
                    role: TurnRole::Assistant,
                    content,
                    has_artifacts,
                    narrative: extracted.narrative,
                    insights: extracted.insights,
                });
                SendOutcome::Completed
            }
            Err(error) => {
                tracing::warn!(%error, "failed to process assistant turn");
                self.turns.push(Turn::assistant_text(SENTINEL_TURN_TEXT));
                SendOutcome::Failed
            }
        }
    }

    async fn collect_parts(&mut self) -> Result<Vec<StreamedPart>, SessionError> {
        let input = AssistantStreamInput {
            messages: self.history(),
            data_source_id: self.data_source_id.clone(),
        };
        let mut stream = self.assistant.stream(input).await?;

        let mut accumulator = TurnAccumulator::new();
        while let Some(item) = stream.next().await {
            let item = item?;
            if let StreamItem::Status(status) = &item {
                self.status = Some(*status);
            }
            accumulator.add_item(item);
        }
        Ok(accumulator.finish())
    }

    fn history(&self) -> Vec<HistoryMessage> {
        self.turns
            .iter()
            .map(|turn| HistoryMessage::new(turn.role, turn.display_text()))
            .collect()
    }

    /// Lists the connected data sources and selects the first as the
    /// default when none is chosen yet. A failed or empty listing asks
    /// the caller to route to source setup.
    pub async fn load_data_sources(
        &mut self,
        registry: &dyn DataSourceRegistry,
    ) -> DataSourceSelection {
        let Some(auth) = &self.auth else {
            return DataSourceSelection::SetupRequired;
        };
        self.data_sources = match registry.list(&auth.credential).await {
            Ok(sources) => sources,
            Err(error) => {
                tracing::warn!(%error, "failed to load data sources");
                Vec::new()
            }
        };

        match self.data_sources.first() {
            Some(first) => {
                let selected = self
                    .data_source_id
                    .get_or_insert_with(|| first.id.clone())
                    .clone();
                DataSourceSelection::Selected(selected)
            }
            None => DataSourceSelection::SetupRequired,
        }
    }

    pub fn select_data_source(&mut self, id: impl Into<String>) {
        self.data_source_id = Some(id.into());
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub fn artifacts(&self) -> &ArtifactSet {
        &self.artifacts
    }

    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.is_streaming
    }

    /// The loading label for the current stream state.
    #[must_use]
    pub fn loading_label(&self) -> &'static str {
        self.status
            .map_or(DEFAULT_LOADING_LABEL, StreamStatus::loading_label)
    }

    #[must_use]
    pub fn chat_id(&self) -> Option<&str> {
        self.persistence.chat_id()
    }

    #[must_use]
    pub fn data_sources(&self) -> &[DataSource] {
        &self.data_sources
    }

    #[must_use]
    pub fn selected_data_source(&self) -> Option<&str> {
        self.data_source_id.as_deref()
    }
}

/// Parameters required to create a new chat session.
/// # Default Values
/// - `auth`: `None` (persistence is skipped silently)
/// - `chat_id`: `None` (adopted from the first persisted turn)
/// - `initial_turns`: the greeting turn
/// - `data_source_id`: `None` (defaulted by `load_data_sources`)
pub struct ChatSessionParams {
    pub assistant: Arc<dyn AssistantEndpoint>,
    pub classifier: Arc<dyn GraphClassifier>,
    pub store: Arc<dyn ChatStore>,
    pub auth: Option<AuthContext>,
    pub chat_id: Option<String>,
    pub initial_turns: Vec<Turn>,
    pub data_source_id: Option<String>,
}

impl ChatSessionParams {
    pub fn new(
        assistant: Arc<dyn AssistantEndpoint>,
        classifier: Arc<dyn GraphClassifier>,
        store: Arc<dyn ChatStore>,
    ) -> Self {
        Self {
            assistant,
            classifier,
            store,
            auth: None,
            chat_id: None,
            initial_turns: Vec::new(),
            data_source_id: None,
        }
    }

    /// Set the identity persistence writes on behalf of.
    #[must_use]
    pub fn auth(mut self, auth: AuthContext) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Continue an existing conversation.
    #[must_use]
    pub fn chat_id(mut self, chat_id: impl Into<String>) -> Self {
        self.chat_id = Some(chat_id.into());
        self
    }

    /// Seed the turn log, e.g. from a stored conversation.
    #[must_use]
    pub fn initial_turns(mut self, turns: Vec<Turn>) -> Self {
        self.initial_turns = turns;
        self
    }

    /// Pre-select a data source.
    #[must_use]
    pub fn data_source_id(mut self, id: impl Into<String>) -> Self {
        self.data_source_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn build(self) -> ChatSession {
        ChatSession::new(self)
    }
}
