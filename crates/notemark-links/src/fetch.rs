use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::error::FetchError;
use crate::{LinkMetadata, html};

/// A fetched resource, already bounded in size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Final URL after redirects.
    pub url: Url,
    pub content_type: Option<String>,
    pub body: String,
}

impl FetchedPage {
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|t| t.trim_start().to_ascii_lowercase().starts_with("image/"))
    }

    /// Images describe themselves; anything else is scanned as HTML.
    pub fn metadata(&self) -> LinkMetadata {
        if self.is_image() {
            LinkMetadata {
                url: self.url.to_string(),
                title: None,
                description: None,
                image_url: Some(self.url.to_string()),
            }
        } else {
            html::scan(&self.body, &self.url)
        }
    }
}

/// Retrieves remote resources for the resolver.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// Limits applied to every outbound HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub max_body_bytes: usize,
    pub max_redirects: usize,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            max_body_bytes: 1024 * 1024,
            max_redirects: 5,
            user_agent: concat!("notemark/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// [`Fetcher`] backed by a shared `reqwest` client.
pub struct HttpFetcher {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl HttpFetcher {
    pub fn new(settings: &HttpSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.max_redirects))
            .user_agent(settings.user_agent.as_str())
            .build()?;
        Ok(Self::with_client(client, settings.max_body_bytes))
    }

    /// Wraps an existing client, keeping its own timeout and redirect policy.
    pub fn with_client(client: reqwest::Client, max_body_bytes: usize) -> Self {
        Self {
            client,
            max_body_bytes,
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        log::debug!("fetching {url}");
        let mut response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut page = FetchedPage {
            url: final_url,
            content_type,
            body: String::new(),
        };
        if page.is_image() {
            return Ok(page);
        }

        let limit = self.max_body_bytes;
        if response.content_length().is_some_and(|len| len > limit as u64) {
            return Err(FetchError::TooLarge { limit });
        }
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > limit {
                return Err(FetchError::TooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }
        page.body = String::from_utf8_lossy(&body).into_owned();
        log::debug!("fetched {} bytes from {}", body.len(), page.url);
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one canned HTTP response on a local port.
    async fn serve_once(response: String) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.ends_with(b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap_or(0);
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            // The client may hang up early on rejected responses.
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });
        Url::parse(&format!("http://{addr}/page")).unwrap()
    }

    fn http_response(status: &str, content_type: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    fn fetcher(max_body_bytes: usize) -> HttpFetcher {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        HttpFetcher::with_client(client, max_body_bytes)
    }

    #[test]
    fn builds_from_default_settings() {
        assert!(HttpFetcher::new(&HttpSettings::default()).is_ok());
    }

    #[tokio::test]
    async fn fetches_html_page() {
        let url = serve_once(http_response(
            "200 OK",
            "text/html; charset=utf-8",
            "<title>Example</title>",
        ))
        .await;
        let page = fetcher(1024).fetch(&url).await.unwrap();
        assert_eq!(page.metadata().title.as_deref(), Some("Example"));
    }

    #[tokio::test]
    async fn image_content_type_describes_itself() {
        let url = serve_once(http_response("200 OK", "image/png", "\u{1}PNG")).await;
        let page = fetcher(1024).fetch(&url).await.unwrap();
        assert_eq!(page.metadata().image_url, Some(url.to_string()));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let url = serve_once(http_response("404 Not Found", "text/html", "gone")).await;
        assert_eq!(fetcher(1024).fetch(&url).await, Err(FetchError::Status(404)));
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let url = serve_once(http_response("200 OK", "text/html", &"x".repeat(64))).await;
        assert_eq!(
            fetcher(16).fetch(&url).await,
            Err(FetchError::TooLarge { limit: 16 })
        );
    }
}
