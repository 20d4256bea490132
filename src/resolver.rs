//! Per-request decision flow for a post page
//!
//! Given a post path and the request context, the resolver decides between
//! redirecting the visitor to the public site, reporting that the post does
//! not exist, or handing a payload to the page template.

use std::sync::Arc;

use crate::cache::PostCache;
use crate::content::ContentSource;
use crate::error::ResolveError;
use crate::model::{PostPath, RenderPayload};

/// Referrer substring that sends visitors to the public site instead.
pub const AD_REFERRER: &str = "facebook.com";

/// Inputs taken from one incoming request
#[derive(Debug, Clone)]
pub struct PostRequest {
    pub path: PostPath,
    pub referrer: Option<String>,
    pub tracking_marker: Option<String>,
    pub host: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Temporary redirect to the given absolute URL
    Redirect(String),
    NotFound,
    Render(RenderPayload),
}

pub struct Resolver {
    source: Arc<dyn ContentSource>,
    cache: Arc<dyn PostCache>,
    site_base: String,
}

impl Resolver {
    pub fn new(
        source: Arc<dyn ContentSource>,
        cache: Arc<dyn PostCache>,
        site_base: impl Into<String>,
    ) -> Self {
        Self {
            source,
            cache,
            site_base: site_base.into(),
        }
    }

    /// Resolves one request.
    ///
    /// The checks run in a fixed order: empty path, ad-referrer redirect,
    /// cache, then the content service. A redirect never touches the cache
    /// or the service.
    pub async fn resolve(&self, request: PostRequest) -> Result<Outcome, ResolveError> {
        let PostRequest {
            path,
            referrer,
            tracking_marker,
            host,
        } = request;

        tracing::info!(path = %path, "resolving post");

        if path.is_empty() {
            return Ok(Outcome::NotFound);
        }

        if is_ad_traffic(referrer.as_deref(), tracking_marker.as_deref()) {
            let destination = format!("{}{}", self.site_base, path.encoded());
            tracing::debug!(path = %path, %destination, "ad traffic, redirecting");
            return Ok(Outcome::Redirect(destination));
        }

        let post = match self.cache.get(&path).await {
            Some(post) => {
                tracing::debug!(path = %path, "cache hit");
                post
            }
            None => {
                let Some(post) = self.source.fetch_post(&path).await? else {
                    tracing::debug!(path = %path, "post not found");
                    return Ok(Outcome::NotFound);
                };
                self.cache.insert(path.clone(), post.clone()).await;
                post
            }
        };

        // host comes from the current request, never from the cache
        Ok(Outcome::Render(RenderPayload { path, post, host }))
    }
}

/// True when the request came from the ad platform or an ad click.
pub fn is_ad_traffic(referrer: Option<&str>, tracking_marker: Option<&str>) -> bool {
    referrer.is_some_and(|r| r.contains(AD_REFERRER))
        || tracking_marker.is_some_and(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::cache::{MemoryCache, NoCache};
    use crate::content::ContentError;
    use crate::model::PostRecord;

    /// In-memory content source that counts how often it is queried
    #[derive(Default)]
    struct StubSource {
        posts: HashMap<String, PostRecord>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn with_post(uri: &str, id: &str) -> Self {
            let mut posts = HashMap::new();
            posts.insert(uri.to_string(), record(id));
            Self {
                posts,
                ..Default::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ContentSource for StubSource {
        async fn fetch_post(&self, path: &PostPath) -> Result<Option<PostRecord>, ContentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ContentError::Unavailable("connection refused".to_string()));
            }
            Ok(self.posts.get(&path.uri_id()).cloned())
        }
    }

    fn record(id: &str) -> PostRecord {
        PostRecord {
            id: id.to_string(),
            excerpt: Some("<p>Excerpt</p>".to_string()),
            title: Some("A post".to_string()),
            link: None,
            date_gmt: None,
            modified_gmt: None,
            content: Some("<p>Body</p>".to_string()),
            author: None,
            featured_image: None,
        }
    }

    fn request(path: &str) -> PostRequest {
        PostRequest {
            path: PostPath::from_route(path),
            referrer: None,
            tracking_marker: None,
            host: "blog.example.com".to_string(),
        }
    }

    fn resolver(source: Arc<StubSource>, cache: Arc<dyn PostCache>) -> Resolver {
        Resolver::new(source, cache, "https://cms.example.com/")
    }

    #[tokio::test]
    async fn renders_found_post() {
        let source = Arc::new(StubSource::with_post("/2024/hello/", "cG9zdDo3"));
        let resolver = resolver(source.clone(), Arc::new(NoCache));

        let outcome = resolver.resolve(request("2024/hello")).await.unwrap();
        let Outcome::Render(payload) = outcome else {
            panic!("expected a payload, got {outcome:?}");
        };
        assert_eq!(payload.post.id, "cG9zdDo3");
        assert_eq!(payload.path.as_str(), "2024/hello");
        assert_eq!(payload.host, "blog.example.com");
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn missing_post_is_not_found() {
        let source = Arc::new(StubSource::default());
        let resolver = resolver(source.clone(), Arc::new(NoCache));

        let outcome = resolver.resolve(request("nope")).await.unwrap();
        assert_eq!(outcome, Outcome::NotFound);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn empty_path_is_not_found_without_query() {
        let source = Arc::new(StubSource::default());
        let resolver = resolver(source.clone(), Arc::new(NoCache));

        let mut req = request("/");
        req.tracking_marker = Some("IwAR".to_string());
        assert_eq!(resolver.resolve(req).await.unwrap(), Outcome::NotFound);
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn ad_referrer_redirects_without_query() {
        let source = Arc::new(StubSource::with_post("/hello/", "1"));
        let resolver = resolver(source.clone(), Arc::new(NoCache));

        let mut req = request("news/café");
        req.referrer = Some("https://m.facebook.com/".to_string());
        let outcome = resolver.resolve(req).await.unwrap();

        assert_eq!(
            outcome,
            Outcome::Redirect("https://cms.example.com/news/caf%C3%A9".to_string())
        );
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn tracking_marker_redirects_even_when_cached() {
        let source = Arc::new(StubSource::with_post("/hello/", "1"));
        let cache = Arc::new(MemoryCache::new(10, Duration::from_secs(60)));
        let resolver = resolver(source.clone(), cache);

        assert!(matches!(
            resolver.resolve(request("hello")).await.unwrap(),
            Outcome::Render(_)
        ));

        let mut req = request("hello");
        req.tracking_marker = Some("IwAR0abc".to_string());
        assert_eq!(
            resolver.resolve(req).await.unwrap(),
            Outcome::Redirect("https://cms.example.com/hello".to_string())
        );
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn cache_hit_skips_content_service() {
        let source = Arc::new(StubSource::with_post("/hello/", "1"));
        let cache = Arc::new(MemoryCache::new(10, Duration::from_secs(60)));
        let resolver = resolver(source.clone(), cache);

        let first = resolver.resolve(request("hello")).await.unwrap();
        let second = resolver.resolve(request("hello")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn cache_hit_uses_current_request_host() {
        let source = Arc::new(StubSource::with_post("/hello/", "1"));
        let cache = Arc::new(MemoryCache::new(10, Duration::from_secs(60)));
        let resolver = resolver(source.clone(), cache);

        let mut first = request("hello");
        first.host = "evil.example".to_string();
        resolver.resolve(first).await.unwrap();

        let Outcome::Render(payload) = resolver.resolve(request("hello")).await.unwrap() else {
            panic!("expected a payload");
        };
        assert_eq!(payload.host, "blog.example.com");
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn not_found_is_not_cached() {
        let source = Arc::new(StubSource::default());
        let cache = Arc::new(MemoryCache::new(10, Duration::from_secs(60)));
        let resolver = resolver(source.clone(), cache);

        resolver.resolve(request("ghost")).await.unwrap();
        resolver.resolve(request("ghost")).await.unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn uncached_resolution_is_repeatable() {
        let source = Arc::new(StubSource::with_post("/hello/", "1"));
        let resolver = resolver(source.clone(), Arc::new(NoCache));

        let first = resolver.resolve(request("hello")).await.unwrap();
        let second = resolver.resolve(request("hello")).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn service_failure_is_an_error() {
        let source = Arc::new(StubSource {
            fail: true,
            ..Default::default()
        });
        let resolver = resolver(source, Arc::new(NoCache));

        let err = resolver.resolve(request("hello")).await.unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Content(ContentError::Unavailable(_))
        ));
    }

    #[test]
    fn ad_traffic_detection() {
        assert!(is_ad_traffic(Some("https://l.facebook.com/l.php"), None));
        assert!(is_ad_traffic(None, Some("IwAR")));
        assert!(!is_ad_traffic(Some("https://twitter.com/"), None));
        assert!(!is_ad_traffic(None, Some("")));
        assert!(!is_ad_traffic(None, None));
    }
}
