use datachat_sdk::{HistoryMessage, TurnRole};
use serde::Serialize;
use serde_json::{Map, Value};

/// Displayed SQL text when no query was generated for the current turn.
pub const NO_SQL_SENTINEL: &str = "No SQL query generated.";

/// Chart type used when the classifier recommends none.
pub const DEFAULT_CHART_TYPE: &str = "bar";

/// A tabular artifact derived from executed query results.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TableArtifact {
    pub columns: Vec<String>,
    /// Every row has exactly `columns.len()` values, in column order.
    pub rows: Vec<Vec<Value>>,
}

impl TableArtifact {
    /// Derives the table from result rows. The key order of the first
    /// row is the column order; each row contributes its values in that
    /// order, with `null` filling any key a row is missing.
    ///
    /// Returns `None` when there are no rows to derive columns from.
    #[must_use]
    pub fn from_rows(rows: &[Map<String, Value>]) -> Option<Self> {
        let first = rows.first()?;
        let columns: Vec<String> = first.keys().cloned().collect();
        let rows = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|column| row.get(column).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        Some(Self { columns, rows })
    }
}

/// A chart artifact: data opaque to the pipeline plus the chart type to
/// render it with.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GraphArtifact {
    pub data: Value,
    pub chart_type: String,
}

/// The SQL text behind the current turn's results.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CodeArtifact {
    pub sql: String,
}

/// The artifacts of the most recent completed assistant turn. Presence
/// of each kind is its `Option`; earlier turns' artifacts are not kept.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct ArtifactSet {
    pub table: Option<TableArtifact>,
    pub graph: Option<GraphArtifact>,
    pub code: Option<CodeArtifact>,
}

impl ArtifactSet {
    /// Whether at least one artifact kind is present.
    #[must_use]
    pub fn has_any(&self) -> bool {
        self.table.is_some() || self.graph.is_some() || self.code.is_some()
    }

    /// The SQL text to display: the code artifact when present, the
    /// sentinel otherwise.
    #[must_use]
    pub fn sql_text(&self) -> &str {
        self.code
            .as_ref()
            .map_or(NO_SQL_SENTINEL, |code| code.sql.as_str())
    }

    /// A presence snapshot for the panel state machine.
    #[must_use]
    pub fn presence(&self) -> ArtifactPresence {
        ArtifactPresence {
            table: self.table.is_some(),
            graph: self.graph.is_some(),
            code: self.code.is_some(),
        }
    }
}

/// Which artifact kinds the current turn produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArtifactPresence {
    pub table: bool,
    pub graph: bool,
    pub code: bool,
}

/// The body of a turn: plain text, or a reference to the live artifact
/// set for turns that produced artifacts.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub enum TurnContent {
    Text(String),
    Artifacts,
}

/// One user or assistant message in the conversation log. Appended in
/// display order and never mutated afterwards.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Turn {
    pub role: TurnRole,
    pub content: TurnContent,
    pub has_artifacts: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<String>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: TurnContent::Text(text.into()),
            has_artifacts: false,
            narrative: None,
            insights: None,
        }
    }

    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: TurnContent::Text(text.into()),
            has_artifacts: false,
            narrative: None,
            insights: None,
        }
    }

    /// A turn restored from the chat store.
    #[must_use]
    pub fn from_history(message: &HistoryMessage) -> Self {
        Self {
            role: message.role,
            content: TurnContent::Text(message.content.clone()),
            has_artifacts: false,
            narrative: None,
            insights: None,
        }
    }

    /// The text this turn contributes to the assistant history.
    #[must_use]
    pub fn display_text(&self) -> &str {
        if let Some(narrative) = &self.narrative {
            return narrative;
        }
        match &self.content {
            TurnContent::Text(text) => text,
            TurnContent::Artifacts => "",
        }
    }
}
