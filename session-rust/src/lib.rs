mod errors;
mod extractor;
mod panel;
mod persist;
mod session;
mod subscription;
mod types;
mod view;

pub use errors::SessionError;
pub use extractor::{
    extract_turn, ExtractedTurn, ANALYZED_NARRATIVE, NO_INSIGHTS_TEXT, NO_RESPONSE_TEXT,
};
pub use panel::{
    ArtifactTab, PanelState, PresentationMode, DEFAULT_PANEL_WIDTH, MAX_WIDTH_FRACTION,
    MIN_PANEL_WIDTH, MODAL_BREAKPOINT,
};
pub use persist::{AuthContext, PersistenceBridge};
pub use session::{
    ChatSession, ChatSessionParams, DataSourceSelection, SendOutcome, GREETING_TEXT,
    SENTINEL_TURN_TEXT,
};
pub use subscription::Subscription;
pub use types::{
    ArtifactPresence, ArtifactSet, CodeArtifact, GraphArtifact, TableArtifact, Turn, TurnContent,
    DEFAULT_CHART_TYPE, NO_SQL_SENTINEL,
};
pub use view::ChatView;
