use std::{fmt, sync::Arc, time::Duration};

use governor::{
    clock::{QuantaClock, QuantaInstant},
    middleware::NoOpMiddleware,
    state::{InMemoryState, NotKeyed},
    Jitter, Quota, RateLimiter,
};
use reqwest::{Client, Error as RequestError};
use scraper::Html;
use tracing::{instrument, Level};
use url::Url;

use crate::{config::Config, menu::principal_url, static_selector};

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                              (KHTML, like Gecko) Chrome/72.0.3626.121 Safari/537.36";

// the blog index answers with this once there are no more pages
const BLOG_END: &str = "¡Esto es un blog!";
static DELAY_JITTER: u64 = 2;

static_selector!(BLOG_LINK <- "div.j-blog-meta a[href]");

type Limiter = RateLimiter<NotKeyed, InMemoryState, QuantaClock, NoOpMiddleware<QuantaInstant>>;

pub fn make_client() -> Result<Client, RequestError> {
    Client::builder().user_agent(USER_AGENT).gzip(true).build()
}

/// HTTP access to the residence's site. Cheap to clone; clones share the
/// rate limiter.
#[derive(Clone)]
pub struct Downloader {
    client: Client,
    retries: u32,
    limiter: Arc<Limiter>,
}

impl fmt::Debug for Downloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Downloader")
            .field("retries", &self.retries)
            .finish_non_exhaustive()
    }
}

impl Downloader {
    pub fn new(config: &Config) -> crate::Result<Self> {
        Ok(Self {
            client: make_client()?,
            retries: config.retries.max(1),
            limiter: Arc::new(RateLimiter::direct(Quota::per_second(config.rate_limit))),
        })
    }

    /// Body of `url`, trying up to the configured number of times.
    #[instrument(skip(self, url), fields(url = %url), level = Level::TRACE)]
    pub async fn fetch(&self, url: &Url) -> Result<String, RequestError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let retry_jitter = Jitter::new(Duration::ZERO, Duration::from_secs(DELAY_JITTER));
            self.limiter.until_ready_with_jitter(retry_jitter).await;
            match self.try_fetch(url).await {
                Ok(text) => return Ok(text),
                Err(e) if attempt < self.retries => {
                    log::debug!("Attempt {attempt} of {} for {url} failed: {e}", self.retries);
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_fetch(&self, url: &Url) -> Result<String, RequestError> {
        let start = std::time::Instant::now();
        let res = self.client.get(url.clone()).send().await?.error_for_status()?;
        let text = res.text().await?;
        log::trace!("Got text of {url} in \t {:?}", start.elapsed());
        Ok(text)
    }

    /// Urls of the menus posts, newest first. Only the first blog page is
    /// read unless `request_all`. Discovery stops at the first page that
    /// cannot be fetched, keeping what was found before it.
    pub async fn menus_urls(&self, request_all: bool) -> Vec<Url> {
        let mut urls = Vec::new();
        for page in 1_u32.. {
            let page_url = blog_page(page);
            let text = match self.fetch(&page_url).await {
                Ok(text) => text,
                Err(e) => {
                    log::warn!("Stopping discovery at {page_url}: {e}");
                    break;
                }
            };
            if text.contains(BLOG_END) {
                break;
            }
            urls.extend(blog_links(&text));
            if !request_all {
                break;
            }
        }
        log::info!("Found {} menus pages", urls.len());
        urls
    }
}

/// `n`-th page of the blog index.
pub fn blog_page(n: u32) -> Url {
    let mut url = principal_url();
    url.set_path("/app/blogpage");
    url.query_pairs_mut()
        .append_pair("page", &n.to_string())
        .append_pair("withinCms", "")
        .append_pair("layout", "0");
    url
}

/// Post links of one blog index page, resolved against the site.
pub fn blog_links(html: &str) -> Vec<Url> {
    let base = principal_url();
    let document = Html::parse_document(html);
    document
        .select(&BLOG_LINK)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| match base.join(href) {
            Ok(url) => Some(url),
            Err(e) => {
                log::warn!("Ignoring blog link {href:?}: {e}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_blog_page() {
        assert_eq!(
            blog_page(3).as_str(),
            "https://www.residenciasantiago.es/app/blogpage?page=3&withinCms=&layout=0"
        );
    }

    #[test]
    fn test_blog_links() {
        let html = fs::read_to_string("./src/parse/html_examples/blog_index.html").unwrap();
        let links = blog_links(&html);
        assert_eq!(links.len(), 3);
        assert!(links
            .iter()
            .all(|url| url.host_str() == Some("www.residenciasantiago.es")));
        assert!(links[0].path().starts_with("/2019/03/18/"));
        assert!(links[1].path().starts_with("/2019/03/11/"));
    }

    #[test]
    fn test_blog_end_has_no_links() {
        let html = fs::read_to_string("./src/parse/html_examples/blog_end.html").unwrap();
        assert!(html.contains(BLOG_END));
        assert!(blog_links(&html).is_empty());
    }

    #[test]
    fn test_downloader_from_config() {
        let config = Config {
            retries: 0,
            ..Config::default()
        };
        let downloader = Downloader::new(&config).unwrap();
        assert_eq!(downloader.retries, 1);
        assert!(format!("{downloader:?}").contains("retries: 1"));
    }
}
