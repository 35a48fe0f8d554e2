//! Application configuration for cvscreen.
//!
//! User config lives at `~/.cvscreen/cvscreen.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScreenError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "cvscreen.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".cvscreen";

// ---------------------------------------------------------------------------
// Config structs (matching cvscreen.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// GitHub profile lookup settings.
    #[serde(default)]
    pub github: GithubConfig,

    /// Web search passthrough settings.
    #[serde(default)]
    pub search: SearchConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Path of the candidate database file.
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Status text written for candidates with a verified profile.
    #[serde(default = "default_accepted_status")]
    pub accepted_status: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            accepted_status: default_accepted_status(),
        }
    }
}

fn default_db_path() -> String {
    "cv_table.db".into()
}
fn default_accepted_status() -> String {
    "Accepted".into()
}

/// `[github]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Base URL of the GitHub REST API.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Name of the env var holding an optional API token (never store the token itself).
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// User-Agent header sent with every lookup.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            token_env: default_token_env(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.github.com".into()
}
fn default_token_env() -> String {
    "GITHUB_TOKEN".into()
}
fn default_user_agent() -> String {
    concat!("cvscreen/", env!("CARGO_PKG_VERSION")).into()
}

impl GithubConfig {
    /// Read the API token from the configured env var, if set and non-empty.
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|val| !val.is_empty())
    }
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// DuckDuckGo HTML search endpoint.
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// Whether the agent may search the web when a resume has no profile link.
    #[serde(default)]
    pub fallback_enabled: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            fallback_enabled: false,
        }
    }
}

fn default_search_endpoint() -> String {
    "https://html.duckduckgo.com/html/".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.cvscreen/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| ScreenError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.cvscreen/cvscreen.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ScreenError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| ScreenError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ScreenError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ScreenError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ScreenError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("db_path"));
        assert!(toml_str.contains("GITHUB_TOKEN"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[github]
api_base = "http://localhost:9999"

[search]
fallback_enabled = true
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.github.api_base, "http://localhost:9999");
        assert_eq!(config.github.token_env, "GITHUB_TOKEN");
        assert!(config.search.fallback_enabled);
        assert_eq!(config.defaults.db_path, "cv_table.db");
        assert_eq!(config.defaults.accepted_status, "Accepted");
    }

    #[test]
    fn search_fallback_is_off_by_default() {
        let config = AppConfig::default();
        assert!(!config.search.fallback_enabled);
        assert!(config.search.endpoint.contains("duckduckgo"));
    }

    #[test]
    fn load_config_from_file() {
        let path = std::env::temp_dir().join(format!("cvscreen_cfg_{}.toml", uuid::Uuid::now_v7()));
        std::fs::write(&path, "[defaults]\ndb_path = \"/tmp/screening.db\"\n").unwrap();
        let config = load_config_from(&path).expect("load");
        assert_eq!(config.defaults.db_path, "/tmp/screening.db");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn malformed_config_is_a_config_error() {
        let path = std::env::temp_dir().join(format!("cvscreen_cfg_{}.toml", uuid::Uuid::now_v7()));
        std::fs::write(&path, "[defaults\n").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, ScreenError::Config { .. }));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn token_is_read_from_configured_env_var() {
        let mut config = GithubConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.token_env = "CVSCREEN_TEST_NONEXISTENT_TOKEN_12345".into();
        assert!(config.token().is_none());
    }
}
