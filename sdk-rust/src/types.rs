use serde::{de, Deserialize, Serialize};
use serde_json::{Map, Value};

/// The role of one turn in the conversation log.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// A part of a streamed assistant message.
///
/// Parts arrive in increasing sequence order; order is significant for
/// narrative selection. Part types this client does not understand
/// deserialize into [`StreamedPart::Ignored`] so unknown input stays
/// visible instead of silently matching nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamedPart {
    Text(TextPart),
    ToolInvocation(ToolInvocationPart),
    Ignored(IgnoredPart),
}

/// A part of the message that contains text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct TextPart {
    pub text: String,
}

/// A part of the message that carries a named tool invocation and, once
/// the tool has run, its result.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvocationPart {
    pub tool_invocation: ToolInvocation,
}

/// A part whose `type` tag is not recognized.
#[derive(Debug, Clone, PartialEq)]
pub struct IgnoredPart {
    pub part_type: String,
}

/// A tool invocation embedded in a streamed message, dispatched on
/// `toolName`. The set of known tools is closed; anything else falls into
/// [`ToolInvocation::Other`].
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInvocation {
    GenerateSqlQuery(GenerateSqlInvocation),
    ExecuteSqlQuery(ExecuteSqlInvocation),
    Other(OtherInvocation),
}

/// The `generateSQLQuery` tool: produces the SQL text for the user query.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct GenerateSqlInvocation {
    /// Absent while the invocation is still running.
    pub result: Option<GenerateSqlResult>,
}

/// The `executeSQLQuery` tool: runs the generated SQL and returns rows.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct ExecuteSqlInvocation {
    /// Absent while the invocation is still running.
    pub result: Option<ExecuteSqlResult>,
}

/// An invocation of a tool this client does not know.
#[derive(Debug, Clone, PartialEq)]
pub struct OtherInvocation {
    pub tool_name: String,
}

/// Result of `generateSQLQuery`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct GenerateSqlResult {
    /// The generated SQL text. May be absent when generation produced
    /// nothing usable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
}

/// Result of `executeSQLQuery`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteSqlResult {
    /// Result rows in execution order. Keys are uniform across rows; the
    /// key order of the first row is authoritative for column order.
    pub query_results: Vec<Map<String, Value>>,
}

/// Interim status token emitted by the assistant stream. Consumed only
/// for the loading-label lookup.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub enum StreamStatus {
    #[serde(rename = "fetchingSQL")]
    FetchingSql,
    #[serde(rename = "executingSQL")]
    ExecutingSql,
    #[serde(rename = "fetchingGraphs")]
    FetchingGraphs,
    #[serde(rename = "generatingInsights")]
    GeneratingInsights,
    #[serde(rename = "completed")]
    Completed,
    #[serde(other)]
    Unknown,
}

/// Loading label shown when no status token has arrived yet.
pub const DEFAULT_LOADING_LABEL: &str = "Assistant is thinking...";

impl StreamStatus {
    /// The display string for this status.
    #[must_use]
    pub fn loading_label(self) -> &'static str {
        match self {
            Self::FetchingSql => "Generating SQL Query...",
            Self::ExecutingSql => "Executing SQL Query...",
            Self::FetchingGraphs => "Creating Visualizations...",
            Self::GeneratingInsights => "Analyzing Data for Meaningful Insights...",
            Self::Completed => "Processing Complete! Preparing Results...",
            Self::Unknown => DEFAULT_LOADING_LABEL,
        }
    }
}

/// One chunk of the assistant stream: a message part or a status token.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamItem {
    Part(StreamedPart),
    Status(StreamStatus),
}

/// One prior turn sent back to the assistant as context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct HistoryMessage {
    pub role: TurnRole,
    pub content: String,
}

impl HistoryMessage {
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Input for one streamed assistant exchange.
#[derive(Debug, Clone, Serialize, Default)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct AssistantStreamInput {
    /// The conversation so far, oldest turn first.
    pub messages: Vec<HistoryMessage>,
    /// The data source the backend runs generated queries against.
    #[serde(rename = "db_connection_id", skip_serializing_if = "Option::is_none")]
    pub data_source_id: Option<String>,
}

/// Response of the graph-type classifier.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct ChartAdvice {
    /// Recommended chart types, best match first.
    #[serde(rename = "recommendedGraphs", default)]
    pub recommended_chart_types: Vec<String>,
    /// Rows reshaped by the classifier for charting, when it supplies any.
    #[serde(rename = "formattedData", default)]
    pub formatted_data: Option<Value>,
}

impl TextPart {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl From<&str> for TextPart {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<TextPart> for StreamedPart {
    fn from(value: TextPart) -> Self {
        Self::Text(value)
    }
}

impl From<ToolInvocation> for StreamedPart {
    fn from(value: ToolInvocation) -> Self {
        Self::ToolInvocation(ToolInvocationPart {
            tool_invocation: value,
        })
    }
}

impl StreamedPart {
    /// The text content of this part, if it is a text part.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(part) => Some(&part.text),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for StreamedPart {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let type_str = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| de::Error::missing_field("type"))?;
        match type_str {
            "text" => {
                let part: TextPart = serde_json::from_value(value).map_err(de::Error::custom)?;
                Ok(Self::Text(part))
            }
            "tool-invocation" => {
                let part: ToolInvocationPart =
                    serde_json::from_value(value).map_err(de::Error::custom)?;
                Ok(Self::ToolInvocation(part))
            }
            other => Ok(Self::Ignored(IgnoredPart {
                part_type: other.to_string(),
            })),
        }
    }
}

impl<'de> Deserialize<'de> for ToolInvocation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let tool_name = value
            .get("toolName")
            .and_then(Value::as_str)
            .ok_or_else(|| de::Error::missing_field("toolName"))?;
        match tool_name {
            "generateSQLQuery" => {
                let invocation: GenerateSqlInvocation =
                    serde_json::from_value(value).map_err(de::Error::custom)?;
                Ok(Self::GenerateSqlQuery(invocation))
            }
            "executeSQLQuery" => {
                let invocation: ExecuteSqlInvocation =
                    serde_json::from_value(value).map_err(de::Error::custom)?;
                Ok(Self::ExecuteSqlQuery(invocation))
            }
            other => Ok(Self::Other(OtherInvocation {
                tool_name: other.to_string(),
            })),
        }
    }
}

impl<'de> Deserialize<'de> for StreamItem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        if value.get("type").and_then(Value::as_str) == Some("status") {
            let token: StatusToken = serde_json::from_value(value).map_err(de::Error::custom)?;
            Ok(Self::Status(token.state))
        } else {
            let part: StreamedPart = serde_json::from_value(value).map_err(de::Error::custom)?;
            Ok(Self::Part(part))
        }
    }
}

#[derive(Deserialize)]
struct StatusToken {
    state: StreamStatus,
}
