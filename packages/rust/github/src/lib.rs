//! GitHub profile lookup used to verify a candidate's link.
//!
//! A lookup is a single GET against `/users/{handle}`. There is no retry,
//! no timeout override, and no rate-limit handling: one call, one outcome.

use cvscreen_shared::{GithubConfig, Result, ScreenError};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// Placeholder rendered when a profile has no biography.
pub const NO_BIO: &str = "No bio";

// ---------------------------------------------------------------------------
// Profile types
// ---------------------------------------------------------------------------

/// The subset of the GitHub users API response used for screening.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GithubProfile {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub html_url: Option<String>,
}

impl GithubProfile {
    /// Biography text, or [`NO_BIO`] when absent.
    pub fn bio_or_default(&self) -> &str {
        self.bio.as_deref().unwrap_or(NO_BIO)
    }
}

/// Outcome of a profile lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileLookup {
    /// The API answered with a 2xx status.
    Verified(GithubProfile),
    /// Any non-2xx status. Reported uniformly as "not found".
    NotFound { handle: String, status: u16 },
}

impl ProfileLookup {
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified(_))
    }

    /// Fixed-format text handed back to the screening agent.
    pub fn render(&self) -> String {
        match self {
            Self::Verified(profile) => format!(
                "GITHUB VERIFIED:\nUser: {}\nBio: {}\nPublic Repos: {}\nFollowers: {}",
                profile.login,
                profile.bio_or_default(),
                profile.public_repos,
                profile.followers,
            ),
            Self::NotFound { handle, status } => {
                format!("GitHub User '{handle}' not found (Status: {status})")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Handle normalization
// ---------------------------------------------------------------------------

/// Reduce a bare handle or profile URL to the handle.
///
/// Trailing `/` are stripped and the last path segment is taken. Inputs
/// with extra segments or a query string (`github.com/alice/repos`) yield
/// that trailing segment rather than the username.
pub fn normalize_handle(username_or_url: &str) -> String {
    username_or_url
        .trim()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Settings for [`ProfileClient`].
#[derive(Debug, Clone)]
pub struct ProfileOptions {
    /// Base URL of the REST API, without trailing slash.
    pub api_base: String,
    /// User-Agent header (the GitHub API rejects requests without one).
    pub user_agent: String,
    /// Optional bearer token.
    pub token: Option<String>,
}

impl From<&GithubConfig> for ProfileOptions {
    fn from(config: &GithubConfig) -> Self {
        Self {
            api_base: config.api_base.clone(),
            user_agent: config.user_agent.clone(),
            token: config.token(),
        }
    }
}

/// HTTP client for GitHub profile lookups.
pub struct ProfileClient {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl ProfileClient {
    pub fn new(opts: &ProfileOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(opts.user_agent.as_str())
            .build()
            .map_err(|e| ScreenError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: opts.api_base.trim_end_matches('/').to_string(),
            token: opts.token.clone(),
        })
    }

    /// Look up the profile named by `username_or_url`.
    ///
    /// Non-2xx statuses are an `Ok(ProfileLookup::NotFound)`; only transport
    /// or body decoding failures are errors.
    #[instrument(skip(self))]
    pub async fn fetch(&self, username_or_url: &str) -> Result<ProfileLookup> {
        let handle = normalize_handle(username_or_url);
        let url = format!("{}/users/{handle}", self.api_base);

        info!(%handle, "looking up GitHub profile");

        let mut request = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ScreenError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            debug!(%handle, status = status.as_u16(), "profile lookup failed");
            return Ok(ProfileLookup::NotFound {
                handle,
                status: status.as_u16(),
            });
        }

        let profile: GithubProfile = response
            .json()
            .await
            .map_err(|e| ScreenError::Network(format!("{url}: invalid profile body: {e}")))?;

        info!(login = %profile.login, "GitHub profile verified");
        Ok(ProfileLookup::Verified(profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ProfileClient {
        ProfileClient::new(&ProfileOptions {
            api_base: server.uri(),
            user_agent: "cvscreen-test".into(),
            token: None,
        })
        .unwrap()
    }

    #[test]
    fn normalize_strips_trailing_slash_and_takes_last_segment() {
        assert_eq!(normalize_handle("https://example.com/alice/"), "alice");
        assert_eq!(normalize_handle("https://github.com/octocat"), "octocat");
        assert_eq!(normalize_handle("github.com/octocat///"), "octocat");
    }

    #[test]
    fn normalize_is_idempotent_on_bare_handles() {
        assert_eq!(normalize_handle("alice"), "alice");
        assert_eq!(normalize_handle(&normalize_handle("alice")), "alice");
    }

    #[test]
    fn normalize_takes_trailing_segment_of_deeper_paths() {
        // Known limitation: extra segments are not recognized.
        assert_eq!(normalize_handle("github.com/alice/repos"), "repos");
        assert_eq!(normalize_handle("github.com/alice?tab=repos"), "alice?tab=repos");
    }

    #[test]
    fn render_uses_placeholder_for_null_bio() {
        let profile: GithubProfile = serde_json::from_str(
            r#"{"login": "alice", "public_repos": 10, "followers": 5, "bio": null}"#,
        )
        .unwrap();
        let text = ProfileLookup::Verified(profile).render();
        assert_eq!(
            text,
            "GITHUB VERIFIED:\nUser: alice\nBio: No bio\nPublic Repos: 10\nFollowers: 5"
        );
    }

    #[test]
    fn render_not_found_embeds_handle_and_status() {
        let text = ProfileLookup::NotFound {
            handle: "ghost".into(),
            status: 404,
        }
        .render();
        assert_eq!(text, "GitHub User 'ghost' not found (Status: 404)");
    }

    #[tokio::test]
    async fn fetch_verified_profile() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/alice"))
            .and(header("user-agent", "cvscreen-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "login": "alice",
                "bio": null,
                "public_repos": 10,
                "followers": 5,
                "html_url": "https://github.com/alice"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let lookup = client_for(&server)
            .fetch("https://github.com/alice/")
            .await
            .unwrap();

        match &lookup {
            ProfileLookup::Verified(profile) => {
                assert_eq!(profile.login, "alice");
                assert_eq!(profile.bio_or_default(), NO_BIO);
                assert_eq!(profile.public_repos, 10);
                assert_eq!(profile.html_url.as_deref(), Some("https://github.com/alice"));
            }
            ProfileLookup::NotFound { .. } => panic!("expected Verified"),
        }
        assert!(lookup.render().contains("Bio: No bio"));
    }

    #[tokio::test]
    async fn fetch_not_found_reports_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/ghost"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let lookup = client_for(&server).fetch("ghost").await.unwrap();
        assert_eq!(
            lookup,
            ProfileLookup::NotFound {
                handle: "ghost".into(),
                status: 404
            }
        );
        let text = lookup.render();
        assert!(text.contains("ghost"));
        assert!(text.contains("404"));
    }

    #[tokio::test]
    async fn server_errors_are_reported_as_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/alice"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let lookup = client_for(&server).fetch("alice").await.unwrap();
        assert!(!lookup.is_verified());
        assert!(lookup.render().contains("503"));
    }

    #[tokio::test]
    async fn token_is_sent_as_bearer() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/alice"))
            .and(header("authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "login": "alice",
                "bio": "Rustacean",
                "public_repos": 1,
                "followers": 2
            })))
            .mount(&server)
            .await;

        let client = ProfileClient::new(&ProfileOptions {
            api_base: format!("{}/", server.uri()),
            user_agent: "cvscreen-test".into(),
            token: Some("secret-token".into()),
        })
        .unwrap();

        let lookup = client.fetch("alice").await.unwrap();
        assert!(lookup.render().contains("Bio: Rustacean"));
    }

    #[tokio::test]
    async fn unreachable_api_is_a_network_error() {
        let client = ProfileClient::new(&ProfileOptions {
            api_base: "http://127.0.0.1:1".into(),
            user_agent: "cvscreen-test".into(),
            token: None,
        })
        .unwrap();

        let err = client.fetch("alice").await.unwrap_err();
        assert!(matches!(err, ScreenError::Network(_)));
    }
}
