//! Mock collaborators for testing the pipeline without a backend.
//! Each mock tracks the inputs it received and yields predefined,
//! queued outputs.

use std::{collections::VecDeque, sync::Mutex};

use futures::stream;
use serde_json::{Map, Value};

use crate::{
    assistant::{AssistantEndpoint, AssistantStream},
    classifier::GraphClassifier,
    errors::{ApiError, ApiResult},
    sources::{DataSource, DataSourceRegistry},
    store::{ChatRecord, ChatStore, ChatSummary, SaveTurn, SavedTurn},
    types::{AssistantStreamInput, ChartAdvice, StreamItem},
};

/// Result for a mocked `stream` call: either the items the stream should
/// yield or an error returned when opening it.
pub enum MockStreamResult {
    Items(Vec<StreamItem>),
    Error(ApiError),
}

impl From<Vec<StreamItem>> for MockStreamResult {
    fn from(items: Vec<StreamItem>) -> Self {
        Self::Items(items)
    }
}

impl From<ApiError> for MockStreamResult {
    fn from(error: ApiError) -> Self {
        Self::Error(error)
    }
}

#[derive(Default)]
struct MockAssistantState {
    mocked_stream_results: VecDeque<MockStreamResult>,
    tracked_inputs: Vec<AssistantStreamInput>,
}

/// A mock assistant endpoint that tracks inputs and yields predefined
/// streams.
#[derive(Default)]
pub struct MockAssistantEndpoint {
    state: Mutex<MockAssistantState>,
}

impl MockAssistantEndpoint {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a mocked stream result.
    pub fn enqueue_stream<R>(&self, result: R) -> &Self
    where
        R: Into<MockStreamResult>,
    {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.mocked_stream_results.push_back(result.into());
        drop(state);
        self
    }

    /// Retrieve the tracked stream inputs accumulated so far.
    pub fn tracked_inputs(&self) -> Vec<AssistantStreamInput> {
        let state = self.state.lock().expect("mock state poisoned");
        state.tracked_inputs.clone()
    }
}

#[async_trait::async_trait]
impl AssistantEndpoint for MockAssistantEndpoint {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn stream(&self, input: AssistantStreamInput) -> ApiResult<AssistantStream> {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.tracked_inputs.push(input);

        let result = state.mocked_stream_results.pop_front().ok_or_else(|| {
            ApiError::Invariant("mock", "no mocked stream results available".into())
        })?;

        match result {
            MockStreamResult::Error(error) => Err(error),
            MockStreamResult::Items(items) => Ok(AssistantStream::from_stream(stream::iter(
                items.into_iter().map(Ok),
            ))),
        }
    }
}

#[derive(Default)]
struct MockClassifierState {
    mocked_results: VecDeque<ApiResult<ChartAdvice>>,
    tracked_queries: Vec<(String, Vec<Map<String, Value>>)>,
}

/// A mock graph-type classifier.
#[derive(Default)]
pub struct MockGraphClassifier {
    state: Mutex<MockClassifierState>,
}

impl MockGraphClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a mocked classification result.
    pub fn enqueue(&self, result: ApiResult<ChartAdvice>) -> &Self {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.mocked_results.push_back(result);
        drop(state);
        self
    }

    /// Retrieve the tracked `(query, rows)` pairs accumulated so far.
    pub fn tracked_queries(&self) -> Vec<(String, Vec<Map<String, Value>>)> {
        let state = self.state.lock().expect("mock state poisoned");
        state.tracked_queries.clone()
    }
}

#[async_trait::async_trait]
impl GraphClassifier for MockGraphClassifier {
    async fn classify(&self, query: &str, rows: &[Map<String, Value>]) -> ApiResult<ChartAdvice> {
        let mut state = self.state.lock().expect("mock state poisoned");
        state
            .tracked_queries
            .push((query.to_string(), rows.to_vec()));

        state
            .mocked_results
            .pop_front()
            .ok_or_else(|| ApiError::Invariant("mock", "no mocked chart advice available".into()))?
    }
}

#[derive(Default)]
struct MockChatStoreState {
    mocked_save_results: VecDeque<ApiResult<SavedTurn>>,
    mocked_records: VecDeque<ApiResult<ChatRecord>>,
    mocked_summaries: VecDeque<ApiResult<Vec<ChatSummary>>>,
    tracked_saves: Vec<SaveTurn>,
}

/// A mock chat store.
#[derive(Default)]
pub struct MockChatStore {
    state: Mutex<MockChatStoreState>,
}

impl MockChatStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a mocked save result.
    pub fn enqueue_save(&self, result: ApiResult<SavedTurn>) -> &Self {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.mocked_save_results.push_back(result);
        drop(state);
        self
    }

    /// Enqueue a mocked `get_by_id` result.
    pub fn enqueue_record(&self, result: ApiResult<ChatRecord>) -> &Self {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.mocked_records.push_back(result);
        drop(state);
        self
    }

    /// Enqueue a mocked `list` result.
    pub fn enqueue_summaries(&self, result: ApiResult<Vec<ChatSummary>>) -> &Self {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.mocked_summaries.push_back(result);
        drop(state);
        self
    }

    /// Retrieve the tracked save requests accumulated so far.
    pub fn tracked_saves(&self) -> Vec<SaveTurn> {
        let state = self.state.lock().expect("mock state poisoned");
        state.tracked_saves.clone()
    }
}

#[async_trait::async_trait]
impl ChatStore for MockChatStore {
    async fn save(&self, turn: &SaveTurn, _credential: &str) -> ApiResult<SavedTurn> {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.tracked_saves.push(turn.clone());

        state
            .mocked_save_results
            .pop_front()
            .unwrap_or_else(|| Ok(SavedTurn::default()))
    }

    async fn list(&self, _user_id: &str, _credential: &str) -> ApiResult<Vec<ChatSummary>> {
        let mut state = self.state.lock().expect("mock state poisoned");
        state
            .mocked_summaries
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn get_by_id(
        &self,
        _user_id: &str,
        _chat_id: &str,
        _credential: &str,
    ) -> ApiResult<ChatRecord> {
        let mut state = self.state.lock().expect("mock state poisoned");
        state
            .mocked_records
            .pop_front()
            .unwrap_or_else(|| Ok(ChatRecord::default()))
    }
}

#[derive(Default)]
struct MockRegistryState {
    mocked_results: VecDeque<ApiResult<Vec<DataSource>>>,
    list_calls: usize,
}

/// A mock data-source registry.
#[derive(Default)]
pub struct MockDataSourceRegistry {
    state: Mutex<MockRegistryState>,
}

impl MockDataSourceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a mocked listing result.
    pub fn enqueue(&self, result: ApiResult<Vec<DataSource>>) -> &Self {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.mocked_results.push_back(result);
        drop(state);
        self
    }

    /// Number of `list` calls made against the mock.
    pub fn list_calls(&self) -> usize {
        let state = self.state.lock().expect("mock state poisoned");
        state.list_calls
    }
}

#[async_trait::async_trait]
impl DataSourceRegistry for MockDataSourceRegistry {
    async fn list(&self, _credential: &str) -> ApiResult<Vec<DataSource>> {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.list_calls += 1;
        state
            .mocked_results
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
