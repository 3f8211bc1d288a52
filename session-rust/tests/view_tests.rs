use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use datachat_sdk::{
    testing::{MockAssistantEndpoint, MockChatStore, MockGraphClassifier},
    ChartAdvice, ExecuteSqlInvocation, ExecuteSqlResult, StreamItem, StreamedPart, TextPart,
    ToolInvocation,
};
use datachat_session::{
    ArtifactTab, ChatSession, ChatView, PresentationMode, Subscription, MIN_PANEL_WIDTH,
};
use serde_json::json;

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

    fn view(&self, viewport_width: u32) -> ChatView {
        let session = ChatSession::builder(
            self.assistant.clone(),
            self.classifier.clone(),
            self.store.clone(),
        )
        .build();
        ChatView::new(session, viewport_width)
    }

    fn enqueue_artifact_turn(&self) {
        self.classifier.enqueue(Ok(ChartAdvice::default()));
        self.assistant.enqueue_stream(vec![StreamItem::Part(
            ToolInvocation::ExecuteSqlQuery(ExecuteSqlInvocation {
                result: Some(ExecuteSqlResult {
                    query_results: serde_json::from_value(json!([{ "a": 1 }])).unwrap(),
                }),
            })
            .into(),
        )]);
    }

    fn enqueue_text_turn(&self) {
        self.assistant
            .enqueue_stream(vec![StreamItem::Part(StreamedPart::Text(TextPart::new(
                "Plain answer.",
            )))]);
    }
}

#[tokio::test]
async fn panel_stays_closed_through_a_plain_turn() {
    let harness = Harness::new();
    harness.enqueue_text_turn();
    let mut view = harness.view(1280);

    view.send("question").await;

    assert!(!view.panel().is_open());
    assert!(!view.turns().last().unwrap().has_artifacts);
}

#[tokio::test]
async fn toggle_opens_to_the_table_tab() {
    let harness = Harness::new();
    harness.enqueue_artifact_turn();
    let mut view = harness.view(1280);

    view.send("show data").await;
    view.toggle_panel();

    assert!(view.panel().is_open());
    assert_eq!(view.panel().active_tab(), ArtifactTab::Table);
    assert_eq!(
        view.panel().presentation_mode(),
        PresentationMode::Docked
    );
}

#[tokio::test]
async fn selecting_a_missing_artifact_tab_is_disabled() {
    let harness = Harness::new();
    harness.enqueue_text_turn();
    let mut view = harness.view(1280);

    view.send("question").await;
    view.toggle_panel();
    view.select_tab(ArtifactTab::Graph);

    assert_eq!(view.panel().active_tab(), ArtifactTab::Table);
}

#[tokio::test]
async fn drag_resize_is_clamped() {
    let harness = Harness::new();
    harness.enqueue_artifact_turn();
    let mut view = harness.view(1000);

    view.send("show data").await;
    view.toggle_panel();

    view.resize_panel(i32::MAX);
    assert_eq!(view.panel().width_px(), 700);

    view.resize_panel(i32::MIN);
    assert_eq!(view.panel().width_px(), MIN_PANEL_WIDTH);
}

#[tokio::test]
async fn viewport_crossing_keeps_the_panel_open() {
    let harness = Harness::new();
    harness.enqueue_artifact_turn();
    let mut view = harness.view(1280);

    view.send("show data").await;
    view.toggle_panel();
    view.select_tab(ArtifactTab::Graph);

    view.viewport_resized(600);

    assert!(view.panel().is_open());
    assert_eq!(view.panel().presentation_mode(), PresentationMode::Modal);
    assert_eq!(view.panel().active_tab(), ArtifactTab::Graph);
}

#[tokio::test]
async fn new_artifacts_rearm_the_default_tab() {
    let harness = Harness::new();
    harness.enqueue_artifact_turn();
    harness.enqueue_artifact_turn();
    let mut view = harness.view(1280);

    view.send("first").await;
    view.toggle_panel();
    view.select_tab(ArtifactTab::Graph);
    view.toggle_panel();

    view.send("second").await;
    view.toggle_panel();

    assert_eq!(view.panel().active_tab(), ArtifactTab::Table);
}

#[tokio::test]
async fn deactivation_releases_every_subscription() {
    let harness = Harness::new();
    let mut view = harness.view(1280);

    let released = Arc::new(AtomicUsize::new(0));
    for _ in 0..2 {
        let counter = released.clone();
        view.attach_subscription(Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
    }

    view.deactivate();
    assert_eq!(released.load(Ordering::SeqCst), 2);

    // Deactivation is idempotent; nothing is released twice.
    view.deactivate();
    assert_eq!(released.load(Ordering::SeqCst), 2);
}
