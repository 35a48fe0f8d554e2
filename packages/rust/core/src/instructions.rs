//! System instructions handed to a screening agent runtime.

use crate::screening::ScreeningPolicy;
use crate::tools::ToolSpec;
use cvscreen_shared::ToolName;

/// Build the system instructions listing the registered tools.
///
/// The web search tool stays registered; whether the instructions allow it
/// depends on `policy.search_fallback`.
pub fn build_instructions(tools: &[ToolSpec], policy: &ScreeningPolicy) -> String {
    let tool_descriptions = tools
        .iter()
        .map(|t| format!("- **{}**: {}", t.name, t.description))
        .collect::<Vec<_>>()
        .join("\n");

    let missing_link_rule = if policy.search_fallback {
        format!(
            "   - If NO link is found: call '{}' to search for \"<name> GitHub\", then call '{}' with the result.",
            ToolName::FindCandidateInfo,
            ToolName::FetchGithubStats,
        )
    } else {
        format!(
            "   - If NO link is found: do NOT search the web ('{}' is disabled). Reject the candidate.",
            ToolName::FindCandidateInfo,
        )
    };

    format!(
        r#"You are an expert technical recruiter. Your goal is to decide whether a CV is accepted or rejected.

## Tools

{tool_descriptions}

## Rules

1. READ the resume first with '{read}'.
2. Find the GitHub URL in the resume (e.g. "github.com/username").
   - If you see a link: call '{fetch}' with that link immediately.
{missing_link_rule}
3. Once the GitHub link is verified, call '{save}' with the candidate's name, GitHub URL, CV filename, and status "{status}".
4. Finally, respond with a summary of the candidate's profile, including GitHub stats and application status.

## Response Format

Respond with a single JSON object and no other text:
{{"topic": string, "summary": string, "sources": [string], "tools_used": [string]}}"#,
        read = ToolName::ReadResume,
        fetch = ToolName::FetchGithubStats,
        save = ToolName::SaveCandidateToDb,
        status = policy.accepted_status,
    )
}
