//! Page rendering module
//!
//! Turns loader output into HTML documents.

mod html;

pub use html::render_document;

use crate::loader::{LoadError, PageLoader, PageProps};
use crate::routing::Page;

/// Load `page` and render it
///
/// `is_caching` is true when the result is stored in the static page cache.
pub async fn render_page(
    loader: &PageLoader,
    page: &Page,
    is_caching: bool,
    site_title: &str,
) -> Result<String, LoadError> {
    let data = loader.load(page).await?;
    let props = PageProps { data, is_caching };
    Ok(render_document(&props, site_title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PagesConfig;
    use crate::store::testing::seeded_sqlite;

    #[tokio::test]
    async fn test_render_seeded_pages() {
        let loader = PageLoader::new(seeded_sqlite(), PagesConfig::default());

        let html = render_page(&loader, &Page::Album(Some("al1".to_string())), false, "Catalog")
            .await
            .unwrap();
        assert!(html.contains("<title>Closures | Albums | Catalog</title>"));
        assert!(html.contains("3 songs, 7:00"));

        let html = render_page(&loader, &Page::Playlist(Some("p1".to_string())), true, "Catalog")
            .await
            .unwrap();
        assert!(html.contains("Created by Ada - 3 songs, 8:25"));
        assert!(html.contains("data-caching=\"true\""));
    }

    #[tokio::test]
    async fn test_render_missing_page() {
        let loader = PageLoader::new(seeded_sqlite(), PagesConfig::default());
        let err = render_page(&loader, &Page::Artist(Some("nope".to_string())), false, "Catalog")
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::NotFound));
    }
}
