//! Web search passthrough backed by DuckDuckGo's HTML endpoint.
//!
//! The result is handed back as-is: the text of every result snippet,
//! joined by spaces. Callers decide what to make of it.

use cvscreen_shared::{Result, ScreenError, SearchConfig};
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, instrument};
use url::Url;

/// Returned when the page contains no result snippets.
pub const NO_RESULTS: &str = "No good DuckDuckGo Search Result was found";

/// User-Agent string for search requests.
const USER_AGENT: &str = concat!("cvscreen/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the search passthrough.
pub struct SearchClient {
    client: Client,
    endpoint: Url,
}

impl SearchClient {
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| ScreenError::config(format!("invalid search endpoint '{endpoint}': {e}")))?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ScreenError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }

    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        Self::new(&config.endpoint)
    }

    /// Run `query` and return the result snippets.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<String> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("q", query);

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| ScreenError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScreenError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ScreenError::Network(format!("{url}: failed to read body: {e}")))?;

        let snippets = extract_snippets(&body);
        debug!(results = snippets.len(), "search completed");

        if snippets.is_empty() {
            Ok(NO_RESULTS.to_string())
        } else {
            Ok(snippets.join(" "))
        }
    }
}

/// Collect the text of each `.result__snippet` element, in page order.
fn extract_snippets(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let snippet_sel = Selector::parse(".result__snippet").unwrap();

    doc.select(&snippet_sel)
        .map(|el| {
            el.text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RESULTS_PAGE: &str = r#"<html><body>
        <div class="result__body">
            <a class="result__a" href="https://github.com/janedoe">janedoe (Jane Doe)</a>
            <a class="result__snippet">Jane Doe <b>janedoe</b> · github.com/janedoe</a>
        </div>
        <div class="result__body">
            <a class="result__snippet">Jane Doe is a software engineer.</a>
        </div>
    </body></html>"#;

    #[test]
    fn snippets_are_flattened_in_order() {
        let snippets = extract_snippets(RESULTS_PAGE);
        assert_eq!(
            snippets,
            vec![
                "Jane Doe janedoe · github.com/janedoe".to_string(),
                "Jane Doe is a software engineer.".to_string(),
            ]
        );
    }

    #[test]
    fn invalid_endpoint_is_a_config_error() {
        let err = SearchClient::new("not a url").err().unwrap();
        assert!(matches!(err, ScreenError::Config { .. }));
    }

    #[tokio::test]
    async fn search_passes_query_and_returns_snippets() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/html/"))
            .and(query_param("q", "Jane Doe GitHub"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_PAGE))
            .expect(1)
            .mount(&server)
            .await;

        let client = SearchClient::new(&format!("{}/html/", server.uri())).unwrap();
        let result = client.search("Jane Doe GitHub").await.unwrap();
        assert!(result.starts_with("Jane Doe janedoe"));
        assert!(result.contains("software engineer"));
    }

    #[tokio::test]
    async fn empty_results_page() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
            .mount(&server)
            .await;

        let client = SearchClient::new(&server.uri()).unwrap();
        assert_eq!(client.search("nobody").await.unwrap(), NO_RESULTS);
    }

    #[tokio::test]
    async fn http_error_is_propagated() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = SearchClient::new(&server.uri()).unwrap();
        let err = client.search("anyone").await.unwrap_err();
        assert!(err.to_string().contains("429"));
    }
}
