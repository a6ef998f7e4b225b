//! HTTP session against the portal.
//!
//! One [`SessionClient`] lives for one pipeline run. Every request shares the
//! same cookie jar, so the login cookies set during authentication are sent
//! with every later page, export and statement download.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use scraper::Html;
use tracing::debug;
use url::Url;

use crate::errors::{PortalError, Result};

/// Default timeout for a single request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// A fetched HTML page.
///
/// The body is kept as text: the parsed tree is not `Send`, so it is built
/// on demand inside synchronous extractors and never held across `.await`.
#[derive(Debug, Clone)]
pub struct Page {
    /// Final URL, after redirects.
    pub url: Url,
    pub body: String,
}

impl Page {
    pub fn html(&self) -> Html {
        Html::parse_document(&self.body)
    }
}

/// Cookie-keeping HTTP client.
#[derive(Clone)]
pub struct SessionClient {
    client: reqwest::Client,
}

impl SessionClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let jar = Arc::new(Jar::default());

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("fr-FR,fr;q=0.9"));

        let client = reqwest::Client::builder()
            .cookie_provider(jar)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }

    /// GET a page as text.
    pub async fn get_page(&self, url: &str) -> Result<Page> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        Self::into_page(response).await
    }

    /// POST an url-encoded form and return the resulting page.
    pub async fn post_form(&self, url: &str, form: &[(&str, String)]) -> Result<Page> {
        debug!("POST {} ({} fields)", url, form.len());
        let response = self.client.post(url).form(form).send().await?;
        Self::into_page(response).await
    }

    /// GET raw bytes: spreadsheet exports and statement PDFs.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET {} (binary)", url);
        let response = Self::check_status(self.client.get(url).send().await?)?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn into_page(response: reqwest::Response) -> Result<Page> {
        let response = Self::check_status(response)?;
        let url = response.url().clone();
        let body = response.text().await?;
        Ok(Page { url, body })
    }

    fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            return Err(PortalError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }
        Ok(response)
    }
}
