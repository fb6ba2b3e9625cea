//! Static asset serving module
//!
//! Serves the files the edge rule leaves alone (icons, artwork) from the
//! configured directory.

use crate::handler::router::RequestContext;
use crate::http::{self, cache, cache::CachePolicy, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Serve the asset at `ctx.path` from `static_dir`
///
/// `None` when no such file exists, so the path can still name a page.
pub async fn serve_asset(
    ctx: &RequestContext<'_>,
    static_dir: &str,
) -> Option<Response<Full<Bytes>>> {
    let (content, content_type) = load_asset(static_dir, ctx.path).await?;
    Some(build_asset_response(
        content,
        content_type,
        ctx.if_none_match.as_deref(),
        ctx.is_head,
    ))
}

/// Resolve `path` inside `static_dir`, refusing anything that escapes it
fn resolve(static_dir: &Path, path: &str) -> Option<PathBuf> {
    let relative = path.trim_start_matches('/');
    if relative.is_empty() || relative.split('/').any(|seg| seg == "..") {
        return None;
    }
    Some(static_dir.join(relative))
}

/// Load an asset and its content type
pub async fn load_asset(static_dir: &str, path: &str) -> Option<(Vec<u8>, &'static str)> {
    let root = Path::new(static_dir);
    let file_path = resolve(root, path)?;

    let root_canonical = match fs::canonicalize(root).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static directory not found or inaccessible '{static_dir}': {e}"
            ));
            return None;
        }
    };

    // Missing files are plain 404s
    let file_canonical = fs::canonicalize(&file_path).await.ok()?;
    if !file_canonical.starts_with(&root_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            path,
            file_canonical.display()
        ));
        return None;
    }
    if !fs::metadata(&file_canonical).await.ok()?.is_file() {
        return None;
    }

    let content = match fs::read(&file_canonical).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                file_canonical.display()
            ));
            return None;
        }
    };

    let content_type = mime::content_type_for(file_path.extension().and_then(|e| e.to_str()));
    Some((content, content_type))
}

fn build_asset_response(
    data: Vec<u8>,
    content_type: &str,
    if_none_match: Option<&str>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(&data);
    let policy = CachePolicy::default();

    if cache::check_etag_match(if_none_match, &etag) {
        return http::build_304_response(&etag, policy);
    }

    http::build_cached_response(Bytes::from(data), content_type, &etag, policy, is_head)
}
