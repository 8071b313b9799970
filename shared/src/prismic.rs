//! HTTP client for a Prismic REST v2 repository.
//!
//! Every query resolves the repository's master ref first, so readers always
//! see the currently published content.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use url::Url;

use crate::{
    provider::{ContentProvider, SummaryPage},
    rich_text::RichTextBlock,
    Article, ArticleSection, ArticleSummary, ContentError, Result,
};

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Connection settings for a Prismic repository.
#[derive(Debug, Clone)]
pub struct PrismicConfig {
    /// API endpoint, e.g. `https://my-repo.cdn.prismic.io/api/v2`.
    pub endpoint: String,
    /// Access token for private repositories.
    pub access_token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl PrismicConfig {
    /// Settings for a public repository with the default timeout.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            access_token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// [`ContentProvider`] backed by a Prismic repository.
#[derive(Debug, Clone)]
pub struct PrismicClient {
    http: Client,
    endpoint: Url,
    access_token: Option<String>,
}

impl PrismicClient {
    /// Builds a client; fails if the endpoint is not an absolute HTTP(S) URL.
    pub fn new(config: &PrismicConfig) -> Result<Self> {
        let endpoint = parse_http_url(&config.endpoint)?;
        let http = Client::builder().timeout(config.timeout).build()?;
        let access_token = config
            .access_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(ToOwned::to_owned);

        Ok(Self {
            http,
            endpoint,
            access_token,
        })
    }

    async fn master_ref(&self) -> Result<String> {
        let mut url = self.endpoint.clone();
        self.authorize(&mut url);
        let info: RawApiInfo = self.get_json(url).await?;
        info.refs
            .into_iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference)
            .ok_or_else(|| ContentError::Malformed("repository has no master ref".to_string()))
    }

    async fn search<D: DeserializeOwned>(
        &self,
        predicate: &str,
        page_size: Option<u32>,
    ) -> Result<RawSearchResponse<D>> {
        let reference = self.master_ref().await?;

        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ContentError::Malformed(format!("endpoint cannot be a base: {}", self.endpoint))
            })?
            .pop_if_empty()
            .extend(["documents", "search"]);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("ref", &reference);
            query.append_pair("q", &format!("[{predicate}]"));
            if let Some(size) = page_size {
                query.append_pair("pageSize", &size.to_string());
            }
        }
        self.authorize(&mut url);

        self.get_json(url).await
    }

    fn authorize(&self, url: &mut Url) {
        let Some(token) = self.access_token.as_deref() else {
            return;
        };
        if url.query_pairs().any(|(key, _)| key == ACCESS_TOKEN_PARAM) {
            return;
        }
        url.query_pairs_mut().append_pair(ACCESS_TOKEN_PARAM, token);
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let shown = display_url(&url);
        tracing::debug!(url = %shown, "content provider request");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| ContentError::Transport(err.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::Status {
                status: status.as_u16(),
                url: shown,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| ContentError::Transport(err.without_url()))?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl ContentProvider for PrismicClient {
    async fn query_by_type(&self, document_type: &str, page_size: u32) -> Result<SummaryPage> {
        let predicate = format!("[at(document.type,{})]", quote(document_type));
        let response: RawSearchResponse<RawSummaryData> =
            self.search(&predicate, Some(page_size)).await?;
        response.into_page()
    }

    async fn get_by_uid(&self, document_type: &str, uid: &str) -> Result<Article> {
        let predicate = format!("[at(my.{document_type}.uid,{})]", quote(uid));
        let response: RawSearchResponse<RawArticleData> = self.search(&predicate, Some(1)).await?;
        match response.results.into_iter().next() {
            Some(document) => document.into_article(),
            None => Err(ContentError::NotFound {
                uid: uid.to_string(),
            }),
        }
    }

    async fn fetch_page(&self, locator: &str) -> Result<SummaryPage> {
        let mut url = parse_http_url(locator)?;
        self.authorize(&mut url);
        let response: RawSearchResponse<RawSummaryData> = self.get_json(url).await?;
        response.into_page()
    }
}

fn parse_http_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|err| ContentError::Malformed(format!("invalid URL `{raw}`: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ContentError::Malformed(format!("unsupported URL scheme `{scheme}`"))),
    }
}

/// URL without its query string, which may carry the access token.
fn display_url(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}

fn quote(literal: &str) -> String {
    format!("\"{}\"", literal.replace('\\', "\\\\").replace('"', "\\\""))
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawApiInfo {
    refs: Vec<RawRef>,
}

#[derive(Debug, Deserialize)]
struct RawRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(rename = "isMasterRef", default)]
    is_master_ref: bool,
}

#[derive(Debug, Deserialize)]
struct RawSearchResponse<D> {
    results: Vec<RawDocument<D>>,
    #[serde(default)]
    next_page: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDocument<D> {
    #[serde(default)]
    uid: Option<String>,
    #[serde(default)]
    first_publication_date: Option<String>,
    data: D,
}

#[derive(Debug, Deserialize)]
struct RawSummaryData {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    subtitle: Option<String>,
    #[serde(default)]
    author: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawArticleData {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    banner: Option<RawImage>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    content: Option<Vec<RawSection>>,
}

#[derive(Debug, Deserialize)]
struct RawImage {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSection {
    #[serde(default)]
    heading: Option<String>,
    #[serde(default)]
    body: Option<Vec<RichTextBlock>>,
}

fn require_uid(uid: Option<String>) -> Result<String> {
    uid.filter(|uid| !uid.trim().is_empty())
        .ok_or_else(|| ContentError::Malformed("document without uid".to_string()))
}

impl RawSearchResponse<RawSummaryData> {
    fn into_page(self) -> Result<SummaryPage> {
        let results = self
            .results
            .into_iter()
            .map(RawDocument::into_summary)
            .collect::<Result<Vec<_>>>()?;
        Ok(SummaryPage {
            results,
            next_page: self.next_page.filter(|locator| !locator.trim().is_empty()),
        })
    }
}

impl RawDocument<RawSummaryData> {
    fn into_summary(self) -> Result<ArticleSummary> {
        Ok(ArticleSummary {
            uid: require_uid(self.uid)?,
            first_publication_date: self.first_publication_date,
            title: self.data.title.unwrap_or_default(),
            subtitle: self.data.subtitle.unwrap_or_default(),
            author: self.data.author.unwrap_or_default(),
        })
    }
}

impl RawDocument<RawArticleData> {
    fn into_article(self) -> Result<Article> {
        let sections = self
            .data
            .content
            .unwrap_or_default()
            .into_iter()
            .map(|section| ArticleSection {
                heading: section.heading.unwrap_or_default(),
                body: section.body.unwrap_or_default(),
            })
            .collect();

        Ok(Article {
            uid: require_uid(self.uid)?,
            first_publication_date: self.first_publication_date,
            title: self.data.title.unwrap_or_default(),
            banner: self
                .data
                .banner
                .and_then(|image| image.url)
                .filter(|url| !url.is_empty()),
            author: self.data.author.unwrap_or_default(),
            sections,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    use super::{PrismicClient, PrismicConfig};
    use crate::{rich_text::BlockKind, ContentError, ContentProvider, PUBLICATION_TYPE};

    const MASTER_REF: &str = "YGVQrxIAACMAhvkQ";

    async fn mount_master_ref(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/v2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "refs": [
                    {"id": "preview", "ref": "preview-ref", "label": "Preview"},
                    {"id": "master", "ref": MASTER_REF, "label": "Master", "isMasterRef": true}
                ]
            })))
            .mount(server)
            .await;
    }

    fn client_for(server: &MockServer, token: Option<&str>) -> PrismicClient {
        let mut config = PrismicConfig::new(format!("{}/api/v2", server.uri()));
        config.access_token = token.map(ToOwned::to_owned);
        PrismicClient::new(&config).expect("build client")
    }

    fn summary_doc(uid: &str) -> serde_json::Value {
        json!({
            "id": format!("id-{uid}"),
            "uid": uid,
            "type": "publication",
            "first_publication_date": "2021-03-15T19:25:28+0000",
            "data": {"title": format!("Title {uid}"), "subtitle": "Sub", "author": "Ada"}
        })
    }

    #[tokio::test]
    async fn query_by_type_returns_first_page_and_locator() {
        let server = MockServer::start().await;
        mount_master_ref(&server).await;
        let next = format!("{}/api/v2/documents/search?ref={MASTER_REF}&page=2", server.uri());
        Mock::given(method("GET"))
            .and(path("/api/v2/documents/search"))
            .and(query_param("ref", MASTER_REF))
            .and(query_param("q", r#"[[at(document.type,"publication")]]"#))
            .and(query_param("pageSize", "4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "page": 1,
                "results_per_page": 4,
                "next_page": next,
                "results": [summary_doc("a"), summary_doc("b")]
            })))
            .mount(&server)
            .await;

        let page = client_for(&server, None)
            .query_by_type(PUBLICATION_TYPE, 4)
            .await
            .expect("first page");

        let uids: Vec<_> = page.results.iter().map(|s| s.uid.as_str()).collect();
        assert_eq!(uids, ["a", "b"]);
        assert_eq!(page.results[0].title, "Title a");
        assert_eq!(page.results[0].author, "Ada");
        assert_eq!(
            page.results[0].first_publication_date.as_deref(),
            Some("2021-03-15T19:25:28+0000")
        );
        assert_eq!(page.next_page, Some(next));
    }

    #[tokio::test]
    async fn access_token_is_sent_on_every_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2"))
            .and(query_param("access_token", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "refs": [{"ref": MASTER_REF, "isMasterRef": true}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/documents/search"))
            .and(query_param("access_token", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [summary_doc("a")],
                "next_page": null
            })))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("secret"));
        let page = client.query_by_type(PUBLICATION_TYPE, 4).await.expect("first page");
        assert_eq!(page.next_page, None);

        let locator = format!("{}/api/v2/documents/search?page=2", server.uri());
        client.fetch_page(&locator).await.expect("locator page");
    }

    #[tokio::test]
    async fn get_by_uid_decodes_full_article() {
        let server = MockServer::start().await;
        mount_master_ref(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/v2/documents/search"))
            .and(query_param("q", r#"[[at(my.publication.uid,"como-utilizar-hooks")]]"#))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{
                    "uid": "como-utilizar-hooks",
                    "first_publication_date": "2021-03-15T19:25:28+0000",
                    "data": {
                        "title": "Como utilizar Hooks",
                        "banner": {"url": "https://images.prismic.io/banner.png"},
                        "author": "Joseph Oliveira",
                        "content": [
                            {"heading": "Proin et varius", "body": [
                                {"type": "paragraph", "text": "hello world", "spans": []}
                            ]},
                            {"heading": "Cras laoreet", "body": [
                                {"type": "list-item", "text": "one", "spans": []},
                                {"type": "list-item", "text": "two", "spans": []}
                            ]}
                        ]
                    }
                }]
            })))
            .mount(&server)
            .await;

        let article = client_for(&server, None)
            .get_by_uid(PUBLICATION_TYPE, "como-utilizar-hooks")
            .await
            .expect("article");

        assert_eq!(article.title, "Como utilizar Hooks");
        assert_eq!(article.banner.as_deref(), Some("https://images.prismic.io/banner.png"));
        assert_eq!(article.sections.len(), 2);
        assert_eq!(article.sections[0].heading, "Proin et varius");
        assert_eq!(article.sections[1].body[0].kind, BlockKind::ListItem);
        assert_eq!(article.reading_time_minutes(), 1);
    }

    #[tokio::test]
    async fn get_by_uid_without_results_is_not_found() {
        let server = MockServer::start().await;
        mount_master_ref(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/v2/documents/search"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"results": [], "next_page": null})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server, None)
            .get_by_uid(PUBLICATION_TYPE, "missing")
            .await
            .expect_err("no such article");
        assert!(matches!(err, ContentError::NotFound { ref uid } if uid == "missing"));
    }

    #[tokio::test]
    async fn non_success_status_hides_query_string() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server, Some("secret"))
            .query_by_type(PUBLICATION_TYPE, 4)
            .await
            .expect_err("provider down");
        match err {
            ContentError::Status { status, url } => {
                assert_eq!(status, 503);
                assert!(!url.contains("secret"));
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn page_with_document_without_uid_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/documents/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [summary_doc("a"), {"data": {"title": "orphan"}}],
                "next_page": null
            })))
            .mount(&server)
            .await;

        let locator = format!("{}/api/v2/documents/search?page=2", server.uri());
        let err = client_for(&server, None)
            .fetch_page(&locator)
            .await
            .expect_err("uid is required");
        assert!(matches!(err, ContentError::Malformed(_)));
    }

    #[tokio::test]
    async fn page_without_results_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/documents/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"next_page": null})))
            .mount(&server)
            .await;

        let locator = format!("{}/api/v2/documents/search?page=2", server.uri());
        let err = client_for(&server, None).fetch_page(&locator).await.expect_err("bad shape");
        assert!(matches!(err, ContentError::Malformed(_)));
    }

    #[tokio::test]
    async fn relative_locator_is_rejected_before_any_request() {
        let server = MockServer::start().await;
        let err = client_for(&server, None)
            .fetch_page("/page2")
            .await
            .expect_err("relative locator");
        assert!(matches!(err, ContentError::Malformed(_)));
        let received = server.received_requests().await.unwrap_or_default();
        assert!(received.is_empty());
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let err = PrismicClient::new(&PrismicConfig::new("ftp://repo.example/api/v2"))
            .expect_err("ftp endpoint");
        assert!(matches!(err, ContentError::Malformed(_)));
    }
}
