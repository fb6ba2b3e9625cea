//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, health
//! probes, the edge rule, then asset or page dispatch.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http::{self, cache, cache::CachePolicy};
use crate::loader::LoadError;
use crate::logger::{self, AccessLogEntry};
use crate::render::render_page;
use crate::routing::{self, EdgeDecision, PageRoute};
use chrono::Utc;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, COOKIE, LAST_MODIFIED, SERVER};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

const HTML: &str = "text/html; charset=utf-8";

/// Per-request information the dispatchers need
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<String>,
}

/// Main entry point for HTTP request handling
///
/// The body is never read, so any body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let (mut response, render_mode) = dispatch(&req, &method, &path, &state).await;

    if let Ok(value) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, value);
    }

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::new(peer_addr.ip().to_string(), method.to_string(), path);
        entry.query = req.uri().query().map(ToString::to_string);
        entry.http_version = version_label(req.version()).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        entry.referer = header_string(&req, "referer");
        entry.user_agent = header_string(&req, "user-agent");
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        entry.render_mode = render_mode;
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn dispatch<B>(
    req: &Request<B>,
    method: &Method,
    path: &str,
    state: &Arc<AppState>,
) -> (Response<Full<Bytes>>, &'static str) {
    // 1. Check HTTP method
    if let Some(resp) = check_http_method(method, state.config.http.enable_cors) {
        return (resp, "ssr");
    }

    // 2. Check body size
    if let Some(resp) = check_body_size(req, state.config.http.max_body_size) {
        return (resp, "ssr");
    }

    // 3. Health probes bypass the edge rule
    let health = &state.config.health;
    if health.enabled {
        if path == health.liveness_path {
            return (http::build_health_response(true, state.loader.backend_name()), "ssr");
        }
        if path == health.readiness_path {
            let ready = state.loader.ping().await;
            return (http::build_health_response(ready, state.loader.backend_name()), "ssr");
        }
    }

    let ctx = RequestContext {
        path,
        is_head: *method == Method::HEAD,
        if_none_match: header_string(req, "if-none-match"),
    };

    // 4. Edge rule
    let cookies = cookie_header(req);
    let decision = routing::decide(path, cookies.as_deref(), &state.config.edge);
    logger::log_edge_decision(path, &decision);

    // Asset paths without a file fall through to the pages unchanged
    if decision == EdgeDecision::Asset {
        let static_dir = &state.config.http.static_dir;
        if let Some(resp) = static_files::serve_asset(&ctx, static_dir).await {
            return (resp, "asset");
        }
    }

    // 5. Page dispatch on the (possibly rewritten) path
    let target = decision.target(path);
    let Some(route) = routing::match_page(target, &state.config.edge.cached_prefix) else {
        return (http::build_404_response(ctx.is_head), "ssr");
    };
    let mode = if route.cached { "ssg" } else { "ssr" };
    (serve_page(&ctx, &route, target, state).await, mode)
}

/// Render or fetch the page and build its response
async fn serve_page(
    ctx: &RequestContext<'_>,
    route: &PageRoute,
    target: &str,
    state: &Arc<AppState>,
) -> Response<Full<Bytes>> {
    let site_title = &state.config.http.site_title;
    let policy = CachePolicy::for_page(route.cached);

    let result = if route.cached {
        state
            .pages
            .serve(&state.loader, &route.page, &state.config.edge.cached_prefix, site_title)
            .await
            .map(|page| (page.html.clone(), page.etag.clone(), Some(page.generated_at)))
    } else {
        render_page(&state.loader, &route.page, false, site_title)
            .await
            .map(|html| {
                let html = Bytes::from(html);
                let etag = cache::generate_etag(&html);
                (html, etag, None)
            })
    };

    match result {
        Ok((html, etag, generated_at)) => {
            if cache::check_etag_match(ctx.if_none_match.as_deref(), &etag) {
                return http::build_304_response(&etag, policy);
            }
            let mut resp = http::build_cached_response(html, HTML, &etag, policy, ctx.is_head);
            if let Some(generated_at) = generated_at {
                let stamp = generated_at
                    .with_timezone(&Utc)
                    .format("%a, %d %b %Y %H:%M:%S GMT")
                    .to_string();
                if let Ok(value) = HeaderValue::from_str(&stamp) {
                    resp.headers_mut().insert(LAST_MODIFIED, value);
                }
            }
            resp
        }
        Err(LoadError::NotFound) => http::build_404_response(ctx.is_head),
        Err(LoadError::Backend(err)) => {
            logger::log_backend_error(target, &err);
            http::build_500_response(ctx.is_head)
        }
    }
}

/// All `Cookie` headers joined into one header value
fn cookie_header<B>(req: &Request<B>) -> Option<String> {
    let values: Vec<&str> = req
        .headers()
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    (!values.is_empty()).then(|| values.join("; "))
}

fn header_string<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn version_label(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        _ => "1.1",
    }
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_warning(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}
