use std::sync::Arc;

use datachat_sdk::{
    testing::{MockAssistantEndpoint, MockChatStore, MockDataSourceRegistry, MockGraphClassifier},
    ApiError, ChartAdvice, ChatRecord, DataSource, ExecuteSqlInvocation, ExecuteSqlResult,
    GenerateSqlInvocation, GenerateSqlResult, HistoryMessage, SavedTurn, StreamItem, StreamStatus,
    StreamedPart, TextPart, ToolInvocation, TurnRole, DEFAULT_LOADING_LABEL,
};
use datachat_session::{
    AuthContext, ChatSession, DataSourceSelection, SendOutcome, TurnContent, ANALYZED_NARRATIVE,
    GREETING_TEXT, SENTINEL_TURN_TEXT,
};
use serde_json::{json, Map, Value};

fn rows(value: Value) -> Vec<Map<String, Value>> {
    serde_json::from_value(value).expect("rows fixture")
}

fn text_item(text: &str) -> StreamItem {
    StreamItem::Part(StreamedPart::Text(TextPart::new(text)))
}

fn execute_item(value: Value) -> StreamItem {
    StreamItem::Part(
        ToolInvocation::ExecuteSqlQuery(ExecuteSqlInvocation {
            result: Some(ExecuteSqlResult {
                query_results: rows(value),
            }),
        })
        .into(),
    )
}

fn generate_item(sql: &str) -> StreamItem {
    StreamItem::Part(
        ToolInvocation::GenerateSqlQuery(GenerateSqlInvocation {
            result: Some(GenerateSqlResult {
                sql: Some(sql.to_string()),
            }),
        })
        .into(),
    )
}

struct Harness {
    assistant: Arc<MockAssistantEndpoint>,
    classifier: Arc<MockGraphClassifier>,
    store: Arc<MockChatStore>,
}

impl Harness {
    fn new() -> Self {
        Self {
            assistant: Arc::new(MockAssistantEndpoint::new()),
            classifier: Arc::new(MockGraphClassifier::new()),
            store: Arc::new(MockChatStore::new()),
        }
    }

    fn session(&self) -> ChatSession {
        ChatSession::builder(
            self.assistant.clone(),
            self.classifier.clone(),
            self.store.clone(),
        )
        .auth(AuthContext {
            user_id: "user-1".to_string(),
            credential: "token".to_string(),
        })
        .data_source_id("db-1")
        .build()
    }
}

#[tokio::test]
async fn fresh_session_starts_with_greeting() {
    let harness = Harness::new();
    let session = harness.session();

    let turns = session.turns();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].role, TurnRole::Assistant);
    assert_eq!(turns[0].display_text(), GREETING_TEXT);
}

#[tokio::test]
async fn text_only_turn_has_no_artifacts() {
    let harness = Harness::new();
    harness
        .assistant
        .enqueue_stream(vec![text_item("Just an answer.")]);
    let mut session = harness.session();

    let outcome = session.send("what is revenue?").await;

    assert_eq!(outcome, SendOutcome::Completed);
    let turns = session.turns();
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[1].role, TurnRole::User);
    assert_eq!(turns[2].role, TurnRole::Assistant);
    assert!(!turns[2].has_artifacts);
    assert_eq!(turns[2].display_text(), "Just an answer.");
    assert!(!session.artifacts().has_any());
    assert!(!session.is_streaming());
}

#[tokio::test]
async fn blank_send_is_a_no_op() {
    let harness = Harness::new();
    let mut session = harness.session();

    let outcome = session.send("   ").await;

    assert_eq!(outcome, SendOutcome::Ignored);
    assert_eq!(session.turns().len(), 1);
    assert!(harness.assistant.tracked_inputs().is_empty());
    assert!(harness.store.tracked_saves().is_empty());
}

#[tokio::test]
async fn stream_failure_appends_no_assistant_turn() {
    let harness = Harness::new();
    harness
        .assistant
        .enqueue_stream(ApiError::Invariant("mock", "connection reset".into()));
    let mut session = harness.session();

    let outcome = session.send("show data").await;

    assert_eq!(outcome, SendOutcome::StreamFailed);
    let turns = session.turns();
    assert_eq!(turns.last().unwrap().role, TurnRole::User);
    assert!(!session.is_streaming());
}

#[tokio::test]
async fn extraction_failure_appends_sentinel_turn() {
    let harness = Harness::new();
    harness
        .assistant
        .enqueue_stream(vec![execute_item(json!([]))]);
    let mut session = harness.session();

    let outcome = session.send("show data").await;

    assert_eq!(outcome, SendOutcome::Failed);
    let last = session.turns().last().unwrap();
    assert_eq!(last.role, TurnRole::Assistant);
    assert_eq!(last.display_text(), SENTINEL_TURN_TEXT);
    assert!(!last.has_artifacts);
    assert!(!session.is_streaming());
}

#[tokio::test]
async fn completed_tool_turn_commits_all_artifacts() {
    let harness = Harness::new();
    harness.classifier.enqueue(Ok(ChartAdvice::default()));
    harness.assistant.enqueue_stream(vec![
        StreamItem::Status(StreamStatus::FetchingSql),
        generate_item("SELECT region, total FROM sales"),
        StreamItem::Status(StreamStatus::ExecutingSql),
        execute_item(json!([
            { "region": "EMEA", "total": 5 },
            { "region": "APAC", "total": 7 }
        ])),
        text_item("EMEA trails APAC."),
    ]);
    let mut session = harness.session();

    let outcome = session.send("totals by region").await;

    assert_eq!(outcome, SendOutcome::Completed);
    let last = session.turns().last().unwrap();
    assert!(last.has_artifacts);
    assert_eq!(last.content, TurnContent::Artifacts);
    assert_eq!(last.narrative.as_deref(), Some(ANALYZED_NARRATIVE));
    assert_eq!(last.insights.as_deref(), Some("EMEA trails APAC."));

    let artifacts = session.artifacts();
    assert!(artifacts.table.is_some());
    assert!(artifacts.graph.is_some());
    assert_eq!(artifacts.sql_text(), "SELECT region, total FROM sales");
}

#[tokio::test]
async fn only_the_latest_turn_artifacts_stay_live() {
    let harness = Harness::new();
    harness.classifier.enqueue(Ok(ChartAdvice::default()));
    harness
        .assistant
        .enqueue_stream(vec![execute_item(json!([{ "a": 1 }]))]);
    harness
        .assistant
        .enqueue_stream(vec![text_item("No data this time.")]);
    let mut session = harness.session();

    session.send("first").await;
    assert!(session.artifacts().has_any());

    session.send("second").await;
    assert!(!session.artifacts().has_any());
    assert!(session.turns()[2].has_artifacts);
}

#[tokio::test]
async fn chat_id_from_first_save_is_sticky() {
    let harness = Harness::new();
    harness.store.enqueue_save(Ok(SavedTurn {
        chat_id: Some("chat-9".to_string()),
    }));
    harness.assistant.enqueue_stream(vec![text_item("One.")]);
    harness.assistant.enqueue_stream(vec![text_item("Two.")]);
    let mut session = harness.session();

    session.send("first").await;
    assert_eq!(session.chat_id(), Some("chat-9"));

    session.send("second").await;
    let saves = harness.store.tracked_saves();
    assert_eq!(saves[0].chat_id, None);
    assert!(saves[1..].iter().all(|save| save.chat_id.as_deref() == Some("chat-9")));
}

#[tokio::test]
async fn save_failure_never_blocks_the_turn() {
    let harness = Harness::new();
    harness
        .store
        .enqueue_save(Err(ApiError::Invariant("mock", "store down".into())));
    harness.assistant.enqueue_stream(vec![text_item("Fine.")]);
    let mut session = harness.session();

    let outcome = session.send("hello").await;

    assert_eq!(outcome, SendOutcome::Completed);
    assert_eq!(session.turns().len(), 3);
}

#[tokio::test]
async fn history_and_data_source_are_forwarded() {
    let harness = Harness::new();
    harness.assistant.enqueue_stream(vec![text_item("Sure.")]);
    let mut session = harness.session();

    session.send("show revenue").await;

    let inputs = harness.assistant.tracked_inputs();
    assert_eq!(inputs.len(), 1);
    assert_eq!(inputs[0].data_source_id.as_deref(), Some("db-1"));
    assert_eq!(
        inputs[0].messages,
        vec![
            HistoryMessage::new(TurnRole::Assistant, GREETING_TEXT),
            HistoryMessage::new(TurnRole::User, "show revenue"),
        ]
    );
}

#[tokio::test]
async fn loading_label_defaults_between_turns() {
    let harness = Harness::new();
    harness.assistant.enqueue_stream(vec![
        StreamItem::Status(StreamStatus::GeneratingInsights),
        text_item("Done."),
    ]);
    let mut session = harness.session();
    assert_eq!(session.loading_label(), DEFAULT_LOADING_LABEL);

    session.send("question").await;

    // Status is cleared once the turn settles.
    assert_eq!(session.loading_label(), DEFAULT_LOADING_LABEL);
}

#[tokio::test]
async fn first_data_source_is_the_default_selection() {
    let harness = Harness::new();
    let registry = MockDataSourceRegistry::new();
    registry.enqueue(Ok(vec![
        DataSource {
            id: "db-a".to_string(),
            name: Some("warehouse".to_string()),
        },
        DataSource {
            id: "db-b".to_string(),
            name: None,
        },
    ]));
    let mut session = ChatSession::builder(
        harness.assistant.clone(),
        harness.classifier.clone(),
        harness.store.clone(),
    )
    .auth(AuthContext {
        user_id: "user-1".to_string(),
        credential: "token".to_string(),
    })
    .build();

    let selection = session.load_data_sources(&registry).await;

    assert_eq!(selection, DataSourceSelection::Selected("db-a".to_string()));
    assert_eq!(session.selected_data_source(), Some("db-a"));
    assert_eq!(session.data_sources().len(), 2);
}

#[tokio::test]
async fn chosen_data_source_is_kept_over_the_default() {
    let harness = Harness::new();
    let registry = MockDataSourceRegistry::new();
    registry.enqueue(Ok(vec![DataSource {
        id: "db-a".to_string(),
        name: None,
    }]));
    let mut session = harness.session();

    let selection = session.load_data_sources(&registry).await;

    assert_eq!(selection, DataSourceSelection::Selected("db-1".to_string()));
}

#[tokio::test]
async fn empty_or_failed_listing_requires_setup() {
    let harness = Harness::new();
    let registry = MockDataSourceRegistry::new();
    registry.enqueue(Ok(Vec::new()));
    registry.enqueue(Err(ApiError::Invariant("mock", "registry down".into())));
    let mut session = harness.session();

    assert_eq!(
        session.load_data_sources(&registry).await,
        DataSourceSelection::SetupRequired
    );
    assert_eq!(
        session.load_data_sources(&registry).await,
        DataSourceSelection::SetupRequired
    );
    assert!(session.data_sources().is_empty());
}

#[tokio::test]
async fn seeded_session_resumes_a_stored_chat() {
    let harness = Harness::new();
    let record = ChatRecord {
        messages: vec![
            HistoryMessage::new(TurnRole::User, "old question"),
            HistoryMessage::new(TurnRole::Assistant, "old answer"),
        ],
    };
    let session = ChatSession::builder(
        harness.assistant.clone(),
        harness.classifier.clone(),
        harness.store.clone(),
    )
    .chat_id("chat-7")
    .initial_turns(ChatSession::turns_from_record(&record))
    .build();

    let turns = session.turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, TurnRole::User);
    assert_eq!(turns[0].display_text(), "old question");
    assert_eq!(session.chat_id(), Some("chat-7"));
}
