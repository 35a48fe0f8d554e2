//! Deterministic screening agent.
//!
//! Runs the fixed recruiter policy as an explicit state machine:
//!
//! 1. read the resume
//! 2. find a GitHub profile link (optionally via web search)
//! 3. verify the link against the GitHub API
//! 4. persist verified candidates
//! 5. summarize into a [`StructuredResult`]
//!
//! Read failures and failed lookups are reported in the transcript and end
//! the run with a rejection. A storage failure aborts the run.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, instrument, warn};

use cvscreen_github::{GithubProfile, ProfileLookup};
use cvscreen_shared::{
    AppConfig, ApplicationStatus, CandidateProfile, Result, RunId, StructuredResult, ToolName,
};

use crate::agent::{AgentRequest, AgentResponse, AgentRuntime, EntryKind, TranscriptEntry};
use crate::instructions::build_instructions;
use crate::tools::Toolbox;

/// Matches a GitHub profile link such as `github.com/octocat` or
/// `https://www.github.com/octocat`. Group 1 holds the link; a host inside a
/// longer domain (`gist.github.com`) or another URL's path is not matched.
static PROFILE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:^|[^\w./-])((?:https?://)?(?:www\.)?github\.com/[a-z0-9](?:[a-z0-9]|-[a-z0-9]){0,38})",
    )
    .expect("valid regex")
});

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Knobs of the screening policy.
#[derive(Debug, Clone)]
pub struct ScreeningPolicy {
    /// Status stored for a verified candidate.
    pub accepted_status: String,
    /// Whether a missing profile link may be searched for on the web.
    pub search_fallback: bool,
}

impl Default for ScreeningPolicy {
    fn default() -> Self {
        Self {
            accepted_status: ApplicationStatus::Accepted.to_string(),
            search_fallback: false,
        }
    }
}

impl From<&AppConfig> for ScreeningPolicy {
    fn from(config: &AppConfig) -> Self {
        Self {
            accepted_status: config.defaults.accepted_status.clone(),
            search_fallback: config.search.fallback_enabled,
        }
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Progress callback for reporting run status.
pub trait ScreeningProgress: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called right before a tool is invoked.
    fn tool_called(&self, tool: ToolName);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ScreeningProgress for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn tool_called(&self, _tool: ToolName) {}
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

enum Step {
    ReadResume,
    FindLink(String),
    SearchProfile,
    Verify(String),
    Persist { link: String, profile: GithubProfile },
    Summarize(Verdict),
    Done(StructuredResult),
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Self::ReadResume => "read_resume",
            Self::FindLink(_) => "find_link",
            Self::SearchProfile => "search_profile",
            Self::Verify(_) => "verify",
            Self::Persist { .. } => "persist",
            Self::Summarize(_) => "summarize",
            Self::Done(_) => "done",
        }
    }
}

/// How a run ended.
enum Verdict {
    Unreadable(String),
    NoLink,
    Unverified { link: String, report: String },
    Accepted { link: String, profile: GithubProfile },
}

/// Mutable state of one run.
struct Run {
    document: PathBuf,
    cv_filename: String,
    candidate_name: String,
    transcript: Vec<TranscriptEntry>,
    tools_used: Vec<ToolName>,
    sources: Vec<String>,
}

impl Run {
    fn new(document: PathBuf) -> Self {
        let cv_filename = document
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| document.display().to_string());
        Self {
            candidate_name: file_stem(&document),
            cv_filename,
            document,
            transcript: Vec::new(),
            tools_used: Vec::new(),
            sources: Vec::new(),
        }
    }

    fn record(&mut self, kind: EntryKind, tool: Option<ToolName>, content: impl Into<String>) {
        self.transcript.push(TranscriptEntry::new(kind, tool, content));
    }

    fn call(&mut self, progress: &dyn ScreeningProgress, tool: ToolName, args: impl Into<String>) {
        progress.tool_called(tool);
        if !self.tools_used.contains(&tool) {
            self.tools_used.push(tool);
        }
        self.record(EntryKind::ToolCall, Some(tool), args);
    }

    fn add_source(&mut self, source: impl Into<String>) {
        let source = source.into();
        if !self.sources.contains(&source) {
            self.sources.push(source);
        }
    }
}

/// The deterministic screening runtime.
pub struct ScreeningAgent {
    toolbox: Toolbox,
    policy: ScreeningPolicy,
    progress: Box<dyn ScreeningProgress>,
}

impl ScreeningAgent {
    pub fn new(toolbox: Toolbox, policy: ScreeningPolicy) -> Self {
        Self {
            toolbox,
            policy,
            progress: Box::new(SilentProgress),
        }
    }

    pub fn with_progress(mut self, progress: Box<dyn ScreeningProgress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn toolbox(&self) -> &Toolbox {
        &self.toolbox
    }

    /// Build the request for one human message, using this agent's tools and policy.
    pub fn request(&self, user_message: &str) -> AgentRequest {
        let tools = self.toolbox.specs();
        AgentRequest {
            instructions: build_instructions(&tools, &self.policy),
            tools,
            user_message: user_message.to_string(),
        }
    }

    async fn step(&self, run: &mut Run, step: Step) -> Result<Step> {
        let progress = self.progress.as_ref();
        let next = match step {
            Step::ReadResume => {
                progress.phase("Reading resume");
                let path = run.document.clone();
                run.call(progress, ToolName::ReadResume, path.display().to_string());
                match self.toolbox.read_resume(&path) {
                    Ok(text) => {
                        run.record(EntryKind::ToolResult, Some(ToolName::ReadResume), text.as_str());
                        run.add_source(path.display().to_string());
                        if let Some(name) = candidate_name(&text) {
                            run.candidate_name = name;
                        }
                        Step::FindLink(text)
                    }
                    Err(e) => {
                        let report = e.to_string();
                        warn!(error = %report, "resume could not be read");
                        run.record(EntryKind::ToolResult, Some(ToolName::ReadResume), report.as_str());
                        Step::Summarize(Verdict::Unreadable(report))
                    }
                }
            }
            Step::FindLink(text) => match find_profile_link(&text) {
                Some(link) => {
                    debug!(%link, "profile link found in resume");
                    Step::Verify(link)
                }
                None if self.policy.search_fallback => Step::SearchProfile,
                None => Step::Summarize(Verdict::NoLink),
            },
            Step::SearchProfile => {
                progress.phase("Searching the web for a profile");
                let query = format!("{} GitHub", run.candidate_name);
                run.call(progress, ToolName::FindCandidateInfo, query.as_str());
                let found = match self.toolbox.find_candidate_info(&query).await {
                    Ok(results) => {
                        let link = find_profile_link(&results);
                        run.record(EntryKind::ToolResult, Some(ToolName::FindCandidateInfo), results);
                        link
                    }
                    Err(e) => {
                        warn!(error = %e, "web search failed");
                        run.record(
                            EntryKind::ToolResult,
                            Some(ToolName::FindCandidateInfo),
                            format!("Error: {e}"),
                        );
                        None
                    }
                };
                match found {
                    Some(link) => Step::Verify(link),
                    None => Step::Summarize(Verdict::NoLink),
                }
            }
            Step::Verify(link) => {
                progress.phase("Verifying GitHub profile");
                run.call(progress, ToolName::FetchGithubStats, link.as_str());
                match self.toolbox.fetch_github_stats(&link).await {
                    Ok(lookup) => {
                        let report = lookup.render();
                        run.record(EntryKind::ToolResult, Some(ToolName::FetchGithubStats), report.as_str());
                        match lookup {
                            ProfileLookup::Verified(profile) => Step::Persist { link, profile },
                            ProfileLookup::NotFound { .. } => {
                                Step::Summarize(Verdict::Unverified { link, report })
                            }
                        }
                    }
                    Err(e) => {
                        let report = format!("Error: {e}");
                        warn!(error = %e, "profile lookup failed");
                        run.record(EntryKind::ToolResult, Some(ToolName::FetchGithubStats), report.as_str());
                        Step::Summarize(Verdict::Unverified { link, report })
                    }
                }
            }
            Step::Persist { link, profile } => {
                progress.phase("Saving candidate");
                let candidate = CandidateProfile {
                    name: run.candidate_name.clone(),
                    github: link.clone(),
                    cv_filename: run.cv_filename.clone(),
                    status: self.policy.accepted_status.clone(),
                };
                let args = serde_json::to_string(&candidate).unwrap_or_default();
                run.call(progress, ToolName::SaveCandidateToDb, args);
                let confirmation = self.toolbox.save_candidate_to_db(&candidate).await?;
                run.record(EntryKind::ToolResult, Some(ToolName::SaveCandidateToDb), confirmation);
                Step::Summarize(Verdict::Accepted { link, profile })
            }
            Step::Summarize(verdict) => {
                progress.phase("Summarizing");
                Step::Done(self.summarize(run, verdict))
            }
            Step::Done(result) => Step::Done(result),
        };
        Ok(next)
    }

    fn summarize(&self, run: &mut Run, verdict: Verdict) -> StructuredResult {
        let name = run.candidate_name.clone();
        let summary = match verdict {
            Verdict::Unreadable(report) => {
                format!("The resume could not be read ({report}). No candidate was screened.")
            }
            Verdict::NoLink => format!(
                "No GitHub profile link was found for {name} in {}. Application status: {}.",
                run.cv_filename,
                ApplicationStatus::Rejected,
            ),
            Verdict::Unverified { link, report } => {
                run.add_source(link.as_str());
                format!(
                    "{name}'s GitHub link {link} could not be verified ({report}). Application status: {}.",
                    ApplicationStatus::Rejected,
                )
            }
            Verdict::Accepted { link, profile } => {
                run.add_source(profile.html_url.clone().unwrap_or_else(|| link.clone()));
                format!(
                    "{name} has a verified GitHub profile '{}' with {} public repositories and {} followers. Bio: {}. Application status: {}. Saved to the candidate database.",
                    profile.login,
                    profile.public_repos,
                    profile.followers,
                    profile.bio_or_default(),
                    self.policy.accepted_status,
                )
            }
        };

        StructuredResult {
            topic: format!("Resume screening: {}", run.cv_filename),
            summary,
            sources: run.sources.clone(),
            tools_used: run.tools_used.iter().map(|t| t.as_str().to_string()).collect(),
        }
    }
}

impl AgentRuntime for ScreeningAgent {
    #[instrument(skip_all, fields(run_id))]
    async fn invoke(&self, request: &AgentRequest) -> Result<AgentResponse> {
        let run_id = RunId::new();
        tracing::Span::current().record("run_id", tracing::field::display(&run_id));

        let document = resolve_document(&request.user_message);
        info!(document = %document.display(), "screening resume");

        let mut run = Run::new(document);
        run.record(EntryKind::System, None, request.instructions.as_str());
        run.record(EntryKind::User, None, request.user_message.as_str());

        let mut step = Step::ReadResume;
        let result = loop {
            debug!(step = step.name(), "screening step");
            step = match self.step(&mut run, step).await? {
                Step::Done(result) => break result,
                next => next,
            };
        };

        let structured = serde_json::to_value(&result).ok();
        let final_message = serde_json::to_string(&result).unwrap_or_default();
        run.record(EntryKind::Assistant, None, final_message.as_str());

        info!(tools_used = ?result.tools_used, "screening complete");

        Ok(AgentResponse {
            run_id,
            transcript: run.transcript,
            final_message,
            structured,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// First GitHub profile link in `text`, as written.
pub fn find_profile_link(text: &str) -> Option<String> {
    PROFILE_LINK
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Candidate name guessed from the first non-empty line of the resume.
pub fn candidate_name(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

/// Resolve the document named by a free-text instruction.
///
/// An instruction that is itself an existing path wins. Otherwise, for each
/// word ending in `.pdf`, the runs of words ending there are tried longest
/// first, so `Process ~/cv/John Doe CV.pdf` finds the file with spaces in its
/// name. Failing that, the first `.pdf` word is used as-is, then the first
/// word naming an existing file, then the trimmed instruction.
pub fn resolve_document(query: &str) -> PathBuf {
    let trimmed = query.trim();
    if Path::new(trimmed).is_file() {
        return PathBuf::from(trimmed);
    }

    let words: Vec<&str> = trimmed
        .split_whitespace()
        .map(|w| {
            w.trim_end_matches('.')
                .trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | ',' | ';' | ':' | '!' | '?' | '(' | ')'))
                .trim_end_matches('.')
        })
        .filter(|w| !w.is_empty())
        .collect();

    let pdf_ends: Vec<usize> = words
        .iter()
        .enumerate()
        .filter(|(_, w)| w.to_ascii_lowercase().ends_with(".pdf"))
        .map(|(i, _)| i)
        .collect();

    for &end in &pdf_ends {
        for start in 0..=end {
            let candidate = PathBuf::from(words[start..=end].join(" "));
            if candidate.is_file() {
                return candidate;
            }
        }
    }

    pdf_ends
        .first()
        .map(|&end| words[end])
        .or_else(|| words.iter().copied().find(|w| Path::new(*w).is_file()))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(trimmed))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
