use crate::types::{StreamItem, StreamStatus, StreamedPart, ToolInvocation};

/// Accumulates the chunks of one streamed assistant turn into the final
/// ordered part sequence.
///
/// Text chunks append to the text part they continue; a tool invocation
/// chunk replaces the pending invocation of the same tool once its
/// result arrives. Part positions are preserved, including parts this
/// client ignores, because narrative selection depends on them.
pub struct TurnAccumulator {
    parts: Vec<StreamedPart>,
    status: Option<StreamStatus>,
}

impl TurnAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            parts: Vec::new(),
            status: None,
        }
    }

    /// Adds one stream chunk to the accumulator.
    pub fn add_item(&mut self, item: StreamItem) {
        match item {
            StreamItem::Status(status) => {
                self.status = Some(status);
            }
            StreamItem::Part(part) => self.add_part(part),
        }
    }

    /// The most recent interim status token, for the loading label.
    #[must_use]
    pub fn status(&self) -> Option<StreamStatus> {
        self.status
    }

    /// Checks if the accumulator has any parts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Computes the final part sequence of the turn.
    #[must_use]
    pub fn finish(self) -> Vec<StreamedPart> {
        self.parts
    }

    fn add_part(&mut self, part: StreamedPart) {
        match part {
            StreamedPart::Text(chunk) => {
                if let Some(StreamedPart::Text(existing)) = self.parts.last_mut() {
                    existing.text.push_str(&chunk.text);
                } else {
                    self.parts.push(StreamedPart::Text(chunk));
                }
            }
            StreamedPart::ToolInvocation(incoming) => {
                let pending = self.parts.iter_mut().find(|existing| {
                    matches!(
                        existing,
                        StreamedPart::ToolInvocation(p)
                            if same_tool(&p.tool_invocation, &incoming.tool_invocation)
                                && !has_result(&p.tool_invocation)
                    )
                });
                if let Some(existing) = pending {
                    *existing = StreamedPart::ToolInvocation(incoming);
                } else {
                    self.parts.push(StreamedPart::ToolInvocation(incoming));
                }
            }
            StreamedPart::Ignored(part) => self.parts.push(StreamedPart::Ignored(part)),
        }
    }
}

impl Default for TurnAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

fn same_tool(a: &ToolInvocation, b: &ToolInvocation) -> bool {
    match (a, b) {
        (ToolInvocation::GenerateSqlQuery(_), ToolInvocation::GenerateSqlQuery(_))
        | (ToolInvocation::ExecuteSqlQuery(_), ToolInvocation::ExecuteSqlQuery(_)) => true,
        (ToolInvocation::Other(a), ToolInvocation::Other(b)) => a.tool_name == b.tool_name,
        _ => false,
    }
}

fn has_result(invocation: &ToolInvocation) -> bool {
    match invocation {
        ToolInvocation::GenerateSqlQuery(i) => i.result.is_some(),
        ToolInvocation::ExecuteSqlQuery(i) => i.result.is_some(),
        ToolInvocation::Other(_) => true,
    }
}
