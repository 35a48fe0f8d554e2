//! Core domain types for resume screening.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one screening run (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// CandidateProfile
// ---------------------------------------------------------------------------

/// One row of the candidate table. No field is validated or unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    /// Full name.
    pub name: String,
    /// GitHub username or URL.
    pub github: String,
    /// Filename of the screened CV.
    pub cv_filename: String,
    /// Application status (e.g. `Accepted`, `Rejected`).
    pub status: String,
}

/// Screening outcome for a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// StructuredResult
// ---------------------------------------------------------------------------

/// The four-field payload a screening run produces as its final answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredResult {
    pub topic: String,
    pub summary: String,
    pub sources: Vec<String>,
    pub tools_used: Vec<String>,
}

// ---------------------------------------------------------------------------
// ToolName
// ---------------------------------------------------------------------------

/// Stable identifiers of the tools available to a screening agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    ReadResume,
    FetchGithubStats,
    SaveCandidateToDb,
    FindCandidateInfo,
}

impl ToolName {
    /// Identifier reported in `tools_used`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadResume => "read_resume",
            Self::FetchGithubStats => "fetch_github_stats",
            Self::SaveCandidateToDb => "save_candidate_to_db",
            Self::FindCandidateInfo => "find_candidate_info",
        }
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
