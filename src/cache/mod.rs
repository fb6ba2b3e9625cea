//! Static page cache module
//!
//! Holds the statically generated pages of the cached namespace:
//! - Warmed at startup from the home page, the lists and every enumerated
//!   detail path
//! - Misses rendered once on first request (blocking fallback) and kept
//! - Not-found pages and backend failures are never stored

use chrono::{DateTime, Local};
use hyper::body::Bytes;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::EntityKind;
use crate::http::cache::generate_etag;
use crate::loader::{Fallback, LoadError, PageLoader};
use crate::logger;
use crate::render::render_page;
use crate::routing::{match_page, page_path, Page};

/// One generated page
#[derive(Debug)]
pub struct CachedPage {
    pub html: Bytes,
    pub etag: String,
    pub generated_at: DateTime<Local>,
}

impl CachedPage {
    fn new(html: String) -> Self {
        let html = Bytes::from(html);
        Self {
            etag: generate_etag(&html),
            html,
            generated_at: Local::now(),
        }
    }
}

/// Generated pages keyed by canonical cached-namespace path
pub struct PageCache {
    pages: RwLock<HashMap<String, Arc<CachedPage>>>,
    /// Policy for detail paths that are not stored yet
    fallback: Fallback,
}

impl Default for PageCache {
    fn default() -> Self {
        Self::new(Fallback::Blocking)
    }
}

impl PageCache {
    pub fn new(fallback: Fallback) -> Self {
        Self {
            pages: RwLock::new(HashMap::new()),
            fallback,
        }
    }

    pub async fn get(&self, path: &str) -> Option<Arc<CachedPage>> {
        self.pages.read().await.get(path).cloned()
    }

    pub async fn insert(&self, path: String, html: String) -> Arc<CachedPage> {
        let page = Arc::new(CachedPage::new(html));
        self.pages.write().await.insert(path, Arc::clone(&page));
        page
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.pages.read().await.len()
    }

    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.pages.read().await.is_empty()
    }

    pub const fn fallback(&self) -> Fallback {
        self.fallback
    }

    /// Return the stored page at `path`, or run `render` and store its output
    ///
    /// Concurrent misses on the same path may both render; the last write
    /// wins and both copies are equivalent.
    pub async fn get_or_render<F>(&self, path: &str, render: F) -> Result<Arc<CachedPage>, LoadError>
    where
        F: Future<Output = Result<String, LoadError>>,
    {
        if let Some(page) = self.get(path).await {
            return Ok(page);
        }
        let html = render.await?;
        Ok(self.insert(path.to_string(), html).await)
    }

    /// Serve a page of the cached namespace, honoring the fallback policy
    ///
    /// With a disabled fallback only stored detail pages exist; any other
    /// detail path is not found, whether or not warming ran.
    pub async fn serve(
        &self,
        loader: &PageLoader,
        page: &Page,
        prefix: &str,
        site_title: &str,
    ) -> Result<Arc<CachedPage>, LoadError> {
        let path = page_path(page, prefix);
        if let Some(stored) = self.get(&path).await {
            return Ok(stored);
        }
        if page.detail_kind().is_some() && self.fallback == Fallback::Disabled {
            return Err(LoadError::NotFound);
        }
        logger::log_page_generated(&path);
        self.get_or_render(&path, render_page(loader, page, true, site_title))
            .await
    }
}

/// Summary of one warm-up run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WarmReport {
    pub generated: usize,
    pub failed: usize,
}

/// Generate every known page of the cached namespace
///
/// Failures are logged and counted; warming never aborts on one bad page.
pub async fn warm(
    cache: &PageCache,
    loader: &PageLoader,
    prefix: &str,
    site_title: &str,
) -> WarmReport {
    let mut pages = vec![
        Page::Home,
        Page::AlbumList,
        Page::ArtistList,
        Page::PlaylistList,
    ];
    let mut report = WarmReport::default();

    for kind in EntityKind::ALL {
        match loader.static_paths(kind, prefix).await {
            Ok(paths) => {
                logger::log_static_paths(
                    kind.segment(),
                    paths.paths.len(),
                    paths.fallback == Fallback::Blocking,
                );
                pages.extend(
                    paths
                        .paths
                        .iter()
                        .filter_map(|path| match_page(path, prefix))
                        .map(|route| route.page),
                );
            }
            Err(err) => {
                report.failed += 1;
                logger::log_warning(&format!(
                    "Failed to enumerate {} pages: {err}",
                    kind.segment()
                ));
            }
        }
    }

    for page in pages {
        let path = page_path(&page, prefix);
        match render_page(loader, &page, true, site_title).await {
            Ok(html) => {
                cache.insert(path, html).await;
                report.generated += 1;
            }
            Err(err) => {
                report.failed += 1;
                logger::log_warning(&format!("Failed to generate {path}: {err}"));
            }
        }
    }

    logger::log_warm_complete(report.generated, report.failed);
    report
}
