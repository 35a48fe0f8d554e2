//! The agent runtime boundary: request in, raw response plus optional
//! structured payload out.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::error;

use cvscreen_shared::{Result, RunId, ScreenError, StructuredResult, ToolName};

use crate::tools::ToolSpec;

/// Everything a runtime is given for one run.
#[derive(Debug, Clone)]
pub struct AgentRequest {
    /// System instructions.
    pub instructions: String,
    /// Registered tools.
    pub tools: Vec<ToolSpec>,
    /// The single human message.
    pub user_message: String,
}

/// Something that can execute a screening request.
#[allow(async_fn_in_trait)]
pub trait AgentRuntime {
    async fn invoke(&self, request: &AgentRequest) -> Result<AgentResponse>;
}

/// Kind of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    System,
    User,
    ToolCall,
    ToolResult,
    Assistant,
}

/// One message in a run's transcript.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    pub timestamp: DateTime<Utc>,
    pub kind: EntryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<ToolName>,
    pub content: String,
}

impl TranscriptEntry {
    pub fn new(kind: EntryKind, tool: Option<ToolName>, content: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
            tool,
            content: content.into(),
        }
    }
}

/// Raw output of a run.
#[derive(Debug, Clone, Serialize)]
pub struct AgentResponse {
    pub run_id: RunId,
    pub transcript: Vec<TranscriptEntry>,
    pub final_message: String,
    /// Structured payload, expected to match [`StructuredResult`].
    pub structured: Option<serde_json::Value>,
}

impl AgentResponse {
    /// Parse the structured payload.
    pub fn structured_result(&self) -> Result<StructuredResult> {
        let value = self
            .structured
            .clone()
            .ok_or_else(|| ScreenError::parse("agent returned no structured response"))?;
        serde_json::from_value(value)
            .map_err(|e| ScreenError::parse(format!("structured response does not match: {e}")))
    }

    /// Names of the tools called during the run, in call order.
    pub fn tool_calls(&self) -> impl Iterator<Item = ToolName> + '_ {
        self.transcript
            .iter()
            .filter(|e| e.kind == EntryKind::ToolCall)
            .filter_map(|e| e.tool)
    }

    /// Pretty JSON rendering of the whole response.
    pub fn raw(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| format!("{self:?}"))
    }
}

/// Render the four structured fields for the terminal.
///
/// A missing or malformed payload never fails the caller: the parse error is
/// logged and returned in the text together with the raw response.
pub fn render_response(response: &AgentResponse) -> String {
    match response.structured_result() {
        Ok(result) => format!(
            "Topic: {}\nSources: {:?}\nTools used: {:?}\nSummary: {}",
            result.topic, result.sources, result.tools_used, result.summary
        ),
        Err(e) => {
            let raw = response.raw();
            error!(run_id = %response.run_id, error = %e, raw = %raw, "failed to parse agent response");
            format!("Error parsing response {e} Raw Response - {raw}")
        }
    }
}
