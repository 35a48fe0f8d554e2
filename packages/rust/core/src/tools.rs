//! The tool set available to a screening agent.
//!
//! [`Toolbox`] owns every external resource a run touches: the candidate
//! store and the two HTTP clients. Each tool returns a typed outcome; the
//! agent decides how to render it into its transcript.

use std::path::Path;

use cvscreen_github::{ProfileClient, ProfileLookup, ProfileOptions};
use cvscreen_search::SearchClient;
use cvscreen_shared::{AppConfig, CandidateProfile, Result, ToolName};
use cvscreen_storage::Storage;
use tracing::info;

/// Descriptor of a registered tool, as presented to an agent runtime.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ToolSpec {
    pub name: ToolName,
    pub description: &'static str,
}

/// All registered tools, in presentation order.
pub const TOOL_SPECS: [ToolSpec; 4] = [
    ToolSpec {
        name: ToolName::ReadResume,
        description: "Reads a PDF resume and returns the raw text.",
    },
    ToolSpec {
        name: ToolName::FetchGithubStats,
        description: "Fetches profile stats from the GitHub API. Use this immediately if you see a GitHub URL in the resume.",
    },
    ToolSpec {
        name: ToolName::SaveCandidateToDb,
        description: "Saves the fully verified candidate profile (name, github, cv_filename, status) to the database.",
    },
    ToolSpec {
        name: ToolName::FindCandidateInfo,
        description: "Searches the web for missing candidate info (email, phone, github).",
    },
];

/// Owner of the store and clients behind the screening tools.
pub struct Toolbox {
    storage: Storage,
    github: ProfileClient,
    search: SearchClient,
}

impl Toolbox {
    pub fn new(storage: Storage, github: ProfileClient, search: SearchClient) -> Self {
        Self {
            storage,
            github,
            search,
        }
    }

    /// Open the store at `db_path` and build the clients from `config`.
    pub async fn open(config: &AppConfig, db_path: &Path) -> Result<Self> {
        let storage = Storage::open(db_path).await?;
        let github = ProfileClient::new(&ProfileOptions::from(&config.github))?;
        let search = SearchClient::from_config(&config.search)?;
        Ok(Self::new(storage, github, search))
    }

    /// Descriptors of every registered tool.
    pub fn specs(&self) -> Vec<ToolSpec> {
        TOOL_SPECS.to_vec()
    }

    /// The candidate store.
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// `read_resume`: page text of the document joined by newlines.
    pub fn read_resume(&self, path: &Path) -> Result<String> {
        cvscreen_extract::read_resume(path)
    }

    /// `fetch_github_stats`: one lookup of a handle or profile URL.
    pub async fn fetch_github_stats(&self, username_or_url: &str) -> Result<ProfileLookup> {
        self.github.fetch(username_or_url).await
    }

    /// `save_candidate_to_db`: append one row and return a confirmation.
    pub async fn save_candidate_to_db(&self, candidate: &CandidateProfile) -> Result<String> {
        self.storage.save_candidate(candidate).await?;
        info!(name = %candidate.name, "saved candidate to database");
        Ok(format!("SUCCESS: Saved {} to database.", candidate.name))
    }

    /// `find_candidate_info`: raw web search passthrough.
    pub async fn find_candidate_info(&self, query: &str) -> Result<String> {
        self.search.search(query).await
    }
}
