use datachat_sdk::{DataSource, DataSourceRegistry};

use crate::{
    panel::{ArtifactTab, PanelState},
    session::{ChatSession, DataSourceSelection, SendOutcome},
    subscription::Subscription,
    types::{ArtifactSet, Turn},
};

/// Composes the session controller and the panel state machine into the
/// surface the rendered chat view consumes: snapshot reads of both, and
/// the user intents. The session owns the turn log and artifacts, the
/// panel owns presentation state; this type holds both and never lets
/// one write into the other.
pub struct ChatView {
    session: ChatSession,
    panel: PanelState,
    subscriptions: Vec<Subscription>,
}

impl ChatView {
    #[must_use]
    pub fn new(session: ChatSession, viewport_width: u32) -> Self {
        Self {
            session,
            panel: PanelState::new(viewport_width),
            subscriptions: Vec::new(),
        }
    }

    /// Sends a user message. When the turn completes, the new artifact
    /// presence is forwarded to the panel so its default-tab rule
    /// re-arms for the new turn.
    pub async fn send(&mut self, text: &str) -> SendOutcome {
        let outcome = self.session.send(text).await;
        if outcome == SendOutcome::Completed {
            self.panel
                .artifacts_replaced(self.session.artifacts().presence());
        }
        outcome
    }

    pub fn toggle_panel(&mut self) {
        self.panel.toggle(self.session.artifacts().presence());
    }

    pub fn select_tab(&mut self, tab: ArtifactTab) {
        self.panel
            .select_tab(tab, self.session.artifacts().presence());
    }

    pub fn resize_panel(&mut self, delta_px: i32) {
        self.panel.resize(delta_px);
    }

    pub fn viewport_resized(&mut self, viewport_width: u32) {
        self.panel.viewport_changed(viewport_width);
    }

    /// Registers a scoped listener handle (viewport resize, pointer
    /// drag) to release when the view deactivates.
    pub fn attach_subscription(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    /// Releases every listener the view acquired.
    pub fn deactivate(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            subscription.release();
        }
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        self.session.turns()
    }

    #[must_use]
    pub fn panel(&self) -> &PanelState {
        &self.panel
    }

    #[must_use]
    pub fn artifacts(&self) -> &ArtifactSet {
        self.session.artifacts()
    }

    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.session.is_streaming()
    }

    #[must_use]
    pub fn loading_label(&self) -> &'static str {
        self.session.loading_label()
    }

    /// The SQL text for the code tab, sentinel included.
    #[must_use]
    pub fn sql_text(&self) -> &str {
        self.session.artifacts().sql_text()
    }

    #[must_use]
    pub fn data_sources(&self) -> &[DataSource] {
        self.session.data_sources()
    }

    /// Lists the connected data sources, defaulting the selection to the
    /// first entry. `SetupRequired` asks the caller to route to the
    /// source-setup view.
    pub async fn load_data_sources(
        &mut self,
        registry: &dyn DataSourceRegistry,
    ) -> DataSourceSelection {
        self.session.load_data_sources(registry).await
    }

    pub fn select_data_source(&mut self, id: impl Into<String>) {
        self.session.select_data_source(id);
    }
}
