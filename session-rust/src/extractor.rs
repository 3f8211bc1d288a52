use datachat_sdk::{GraphClassifier, StreamedPart, ToolInvocation};
use serde_json::Value;

use crate::{
    errors::SessionError,
    persist::PersistenceBridge,
    types::{ArtifactSet, CodeArtifact, GraphArtifact, TableArtifact, DEFAULT_CHART_TYPE},
};

/// Narrative shown once executed results are ready to view.
pub const ANALYZED_NARRATIVE: &str = "I've analyzed your data. You can view the results as a table, visualization, or see the SQL query used.";

/// Insights text when the turn carried no text content.
pub const NO_INSIGHTS_TEXT: &str = "No Insights generated!";

/// Narrative when the turn's text part was empty.
pub const NO_RESPONSE_TEXT: &str = "No response generated.";

/// The presentable outcome of one completed assistant turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedTurn {
    pub narrative: Option<String>,
    pub insights: Option<String>,
    pub artifacts: ArtifactSet,
}

/// Derives the artifacts and narrative of one completed assistant turn
/// from its ordered part sequence.
///
/// Parts are processed in sequence order. A `generateSQLQuery` result
/// yields the code artifact; an `executeSQLQuery` result yields the
/// table artifact and triggers the graph-type classification, whose
/// failure is tolerated (the turn keeps its table and narrative). A text
/// part at position 0 or 1 supplies the narrative unless a tool-derived
/// narrative was already set. Persisting the assistant narrative is a
/// deliberate side effect of extraction: "results became available" is
/// the moment worth recording.
///
/// # Errors
/// Returns an error when a tool result is malformed (an `executeSQLQuery`
/// result with no rows). Callers convert it to the sentinel turn at the
/// per-turn boundary.
pub async fn extract_turn(
    parts: &[StreamedPart],
    query: &str,
    classifier: &dyn GraphClassifier,
    persistence: &mut PersistenceBridge,
) -> Result<ExtractedTurn, SessionError> {
    let full_text: String = parts.iter().filter_map(StreamedPart::as_text).collect();

    let mut artifacts = ArtifactSet::default();
    let mut narrative: Option<String> = None;
    let mut insights: Option<String> = None;
    let mut tool_narrative_set = false;

    for (index, part) in parts.iter().enumerate() {
        match part {
            StreamedPart::ToolInvocation(part) => match &part.tool_invocation {
                ToolInvocation::GenerateSqlQuery(invocation) => {
                    artifacts.code = invocation
                        .result
                        .as_ref()
                        .and_then(|result| result.sql.clone())
                        .map(|sql| CodeArtifact { sql });
                }
                ToolInvocation::ExecuteSqlQuery(invocation) => {
                    let Some(result) = &invocation.result else {
                        continue;
                    };
                    let table =
                        TableArtifact::from_rows(&result.query_results).ok_or_else(|| {
                            SessionError::MalformedResult(
                                "executeSQLQuery returned no rows".to_string(),
                            )
                        })?;
                    artifacts.table = Some(table);

                    match classifier.classify(query, &result.query_results).await {
                        Ok(advice) => {
                            let chart_type = advice
                                .recommended_chart_types
                                .first()
                                .cloned()
                                .unwrap_or_else(|| DEFAULT_CHART_TYPE.to_string());
                            let data = advice.formatted_data.unwrap_or_else(|| {
                                Value::Array(
                                    result
                                        .query_results
                                        .iter()
                                        .cloned()
                                        .map(Value::Object)
                                        .collect(),
                                )
                            });
                            artifacts.graph = Some(GraphArtifact { data, chart_type });
                        }
                        Err(error) => {
                            tracing::warn!(%error, "graph-type classification failed, continuing without a chart");
                        }
                    }

                    narrative = Some(ANALYZED_NARRATIVE.to_string());
                    tool_narrative_set = true;
                    insights = Some(if full_text.is_empty() {
                        NO_INSIGHTS_TEXT.to_string()
                    } else {
                        full_text.clone()
                    });
                    persistence.save_assistant(ANALYZED_NARRATIVE).await;
                }
                ToolInvocation::Other(invocation) => {
                    tracing::debug!(tool_name = %invocation.tool_name, "ignoring unknown tool invocation");
                }
            },
            StreamedPart::Text(part) if index <= 1 && !tool_narrative_set => {
                let text = if part.text.is_empty() {
                    NO_RESPONSE_TEXT
                } else {
                    part.text.as_str()
                };
                narrative = Some(text.to_string());
                persistence.save_assistant(text).await;
            }
            StreamedPart::Text(_) | StreamedPart::Ignored(_) => {}
        }
    }

    Ok(ExtractedTurn {
        narrative,
        insights,
        artifacts,
    })
}
