//! Page operations for Confluence API.

use cfmd_export::{ChildPage, ContentSource, PageNode, SourceError};
use tracing::{debug, info};

use super::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::{ChildPagesResponse, ChildSummary, Page};

/// Fields expanded on every page fetch.
const PAGE_EXPAND: &str = "body.storage,history,version,space,ancestors";

/// Batch size for child listings.
const CHILDREN_LIMIT: usize = 100;

impl ConfluenceClient {
    /// Get page by ID with body, history, version, space and ancestors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError`] on transport failure or an error status
    /// that survives retries.
    pub fn fetch_page(&self, page_id: &str) -> Result<Page, ConfluenceError> {
        let url = format!(
            "{}/content/{}?expand={}",
            self.api_url(),
            page_id,
            PAGE_EXPAND
        );

        info!("Getting page {}", page_id);
        self.get_json(&url)
    }

    /// List all direct child pages, following pagination.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError`] if any batch fails.
    pub fn fetch_child_pages(&self, page_id: &str) -> Result<Vec<ChildSummary>, ConfluenceError> {
        let mut children = Vec::new();
        let mut start = 0;

        loop {
            let url = format!(
                "{}/content/{}/child/page?start={}&limit={}",
                self.api_url(),
                page_id,
                start,
                CHILDREN_LIMIT
            );
            let batch: ChildPagesResponse = self.get_json(&url)?;
            let count = batch.results.len();
            let has_next = batch.has_next();
            children.extend(batch.results);

            if !has_next || count == 0 {
                break;
            }
            start += count;
            debug!("Fetching next batch of children for page {page_id} from {start}");
        }

        info!("Found {} child pages for page {}", children.len(), page_id);
        Ok(children)
    }

    /// Web URL for a page, falling back to `viewpage.action`.
    fn page_url(&self, page: &Page) -> String {
        if let Some(links) = &page.links
            && let Some(webui) = &links.webui
        {
            return format!("{}{}", self.base_url, webui);
        }

        format!(
            "{}/pages/viewpage.action?pageId={}",
            self.base_url, page.id
        )
    }

    fn page_node(&self, page: Page) -> PageNode {
        let url = self.page_url(&page);
        let parent_id = page.parent_id().map(str::to_owned);
        let history = page.history.as_ref();

        PageNode {
            parent_id,
            space_key: page.space.as_ref().map(|s| s.key.clone()),
            author: history
                .and_then(|h| h.created_by.as_ref())
                .and_then(|u| u.display_name.clone()),
            created_at: history.and_then(|h| h.created_date.clone()),
            modified_at: page.version.as_ref().and_then(|v| v.when.clone()),
            url: Some(url),
            body_html: page.body_html().to_owned(),
            id: page.id,
            title: page.title,
        }
    }
}

impl ContentSource for ConfluenceClient {
    fn get_page(&self, page_id: &str) -> Result<PageNode, SourceError> {
        self.fetch_page(page_id)
            .map(|page| self.page_node(page))
            .map_err(|e| e.into_source_error(page_id))
    }

    fn get_children(&self, page_id: &str) -> Result<Vec<ChildPage>, SourceError> {
        self.fetch_child_pages(page_id)
            .map(|children| {
                children
                    .into_iter()
                    .map(|c| ChildPage::new(c.id, c.title))
                    .collect()
            })
            .map_err(|e| e.into_source_error(page_id))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use cfmd_config::Credentials;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const CHILDREN_PATH: &str = "/rest/api/content/1/child/page";
    const PAGE_PATH: &str = "/rest/api/content/7";

    /// Client against a local server with instant retries.
    fn server_client(server: &MockServer, user: Option<&str>) -> ConfluenceClient {
        let credentials = Credentials {
            url: server.uri(),
            user: user.map(str::to_owned),
            token: "t".to_owned(),
        };
        ConfluenceClient::new(&credentials, Duration::from_secs(5))
            .with_retry_delays(vec![Duration::ZERO; 3])
    }

    /// Run a blocking client call off the async test runtime.
    async fn blocking<T, F>(call: F) -> T
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        tokio::task::spawn_blocking(call).await.unwrap()
    }

    fn page_json(id: &str, title: &str) -> serde_json::Value {
        json!({
            "id": id,
            "title": title,
            "space": {"key": "ENG"},
            "body": {"storage": {"value": "<p>hello</p>"}},
            "_links": {"webui": format!("/pages/{id}")}
        })
    }

    fn client() -> ConfluenceClient {
        let credentials = Credentials {
            url: "https://example.atlassian.net/wiki".to_owned(),
            user: Some("me@example.com".to_owned()),
            token: "t".to_owned(),
        };
        ConfluenceClient::new(&credentials, Duration::from_secs(5))
    }

    #[test]
    fn test_page_node_maps_metadata() {
        let page: Page = serde_json::from_str(
            r#"{
                "id": "200",
                "title": "Setup",
                "space": {"key": "ENG"},
                "history": {
                    "createdBy": {"displayName": "Sam Lee"},
                    "createdDate": "2023-05-01T12:00:00.000Z"
                },
                "version": {"number": 3, "when": "2023-06-01T12:00:00.000Z"},
                "body": {"storage": {"value": "<p>body</p>"}},
                "ancestors": [{"id": "1"}, {"id": "100"}],
                "_links": {"webui": "/spaces/ENG/pages/200/Setup"}
            }"#,
        )
        .unwrap();

        let node = client().page_node(page);

        assert_eq!(
            node,
            PageNode {
                id: "200".to_owned(),
                title: "Setup".to_owned(),
                parent_id: Some("100".to_owned()),
                space_key: Some("ENG".to_owned()),
                author: Some("Sam Lee".to_owned()),
                created_at: Some("2023-05-01T12:00:00.000Z".to_owned()),
                modified_at: Some("2023-06-01T12:00:00.000Z".to_owned()),
                url: Some(
                    "https://example.atlassian.net/wiki/spaces/ENG/pages/200/Setup".to_owned()
                ),
                body_html: "<p>body</p>".to_owned(),
            }
        );
    }

    #[test]
    fn test_page_node_without_optional_fields() {
        let page: Page = serde_json::from_str(r#"{"id": "9", "title": "Bare"}"#).unwrap();

        let node = client().page_node(page);

        assert_eq!(node.parent_id, None);
        assert_eq!(node.author, None);
        assert_eq!(node.body_html, "");
        assert_eq!(
            node.url.as_deref(),
            Some("https://example.atlassian.net/wiki/pages/viewpage.action?pageId=9")
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_children_follow_next_links() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(CHILDREN_PATH))
            .and(query_param("start", "0"))
            .and(query_param("limit", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"id": "2", "title": "A"}, {"id": "3", "title": "B"}],
                "_links": {"next": "/rest/api/content/1/child/page?start=2&limit=100"}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(CHILDREN_PATH))
            .and(query_param("start", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"id": "4", "title": "C"}],
                "_links": {}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = server_client(&server, None);
        let children = blocking(move || client.get_children("1")).await.unwrap();

        assert_eq!(
            children,
            vec![
                ChildPage::new("2", "A"),
                ChildPage::new("3", "B"),
                ChildPage::new("4", "C"),
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_rate_limited_request_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PAGE_PATH))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(PAGE_PATH))
            .and(query_param("expand", PAGE_EXPAND))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json("7", "Retried")))
            .expect(1)
            .mount(&server)
            .await;

        let client = server_client(&server, None);
        let page = blocking(move || client.get_page("7")).await.unwrap();

        assert_eq!(page.title, "Retried");
        assert_eq!(page.space_key.as_deref(), Some("ENG"));
        assert_eq!(page.url, Some(format!("{}/pages/7", server.uri())));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_unavailable_gives_up_after_four_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PAGE_PATH))
            .respond_with(ResponseTemplate::new(503))
            .expect(4)
            .mount(&server)
            .await;

        let client = server_client(&server, None);
        let err = blocking(move || client.get_page("7")).await.unwrap_err();

        assert!(matches!(err, SourceError::Transport(_)), "{err:?}");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_unauthorized_is_auth_failure_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PAGE_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .expect(1)
            .mount(&server)
            .await;

        let client = server_client(&server, Some("me@example.com"));
        let err = blocking(move || client.get_page("7")).await.unwrap_err();

        assert!(matches!(err, SourceError::AuthFailure(_)), "{err:?}");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_missing_page_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PAGE_PATH))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = server_client(&server, None);
        let err = blocking(move || client.get_page("7")).await.unwrap_err();

        assert_eq!(err, SourceError::PageNotFound("7".to_owned()));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_malformed_body_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PAGE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let client = server_client(&server, None);
        let err = blocking(move || client.get_page("7")).await.unwrap_err();

        assert!(matches!(err, SourceError::Transport(_)), "{err:?}");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PAGE_PATH))
            .and(header("Authorization", "Bearer t"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json("7", "Auth")))
            .expect(1)
            .mount(&server)
            .await;

        let client = server_client(&server, None);
        let page = blocking(move || client.get_page("7")).await.unwrap();

        assert_eq!(page.title, "Auth");
    }
}
