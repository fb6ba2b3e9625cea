//! Logger module
//!
//! Provides logging utilities for the catalog server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Edge routing decisions and static page generation
//! - Error and warning logging, gated by the configured level

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::Level;

use crate::config::Config;
use crate::routing::EdgeDecision;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        Level::parse(&config.logging.level),
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Messages at `level` are written; before init everything but debug is
fn enabled(level: Level) -> bool {
    writer::get().map_or(level <= Level::Info, |w| level <= w.level())
}

fn write_info_at(level: Level, message: &str) {
    if !enabled(level) {
        return;
    }
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

fn write_info(message: &str) {
    write_info_at(Level::Info, message);
}

fn write_debug(message: &str) {
    write_info_at(Level::Debug, message);
}

fn write_error_at(level: Level, message: &str) {
    if !enabled(level) {
        return;
    }
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, backend: &str) {
    write_info("======================================");
    write_info("Catalog server started successfully");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Catalog backend: {backend}"));
    write_info(&format!(
        "Static pages under: {} (cookie {}=true)",
        config.edge.cached_prefix, config.edge.cookie_name
    ));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_shutdown() {
    write_info("[Shutdown] Signal received, no longer accepting connections");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error_at(Level::Error, &format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_connection_limit(max: usize) {
    log_warning(&format!("Connection limit of {max} reached, rejecting connection"));
}

pub fn log_error(message: &str) {
    write_error_at(Level::Error, &format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error_at(Level::Warn, &format!("[WARN] {message}"));
}

/// Edge rule outcome for a page request; assets are not logged
pub fn log_edge_decision(path: &str, decision: &EdgeDecision) {
    match decision {
        EdgeDecision::Asset => {}
        EdgeDecision::PassThrough => write_debug(&format!("[Edge] SSR mode {path}")),
        EdgeDecision::Rewrite(target) => write_debug(&format!("[Edge] SSG mode {target}")),
    }
}

pub fn log_backend_error(path: &str, err: &impl std::fmt::Display) {
    log_error(&format!("Loading {path} failed: {err}"));
}

pub fn log_page_generated(path: &str) {
    write_debug(&format!("[Pages] Generating {path} on first request"));
}

pub fn log_static_paths(kind: &str, count: usize, blocking: bool) {
    let fallback = if blocking { "blocking" } else { "disabled" };
    write_debug(&format!("[Pages] {count} {kind} paths, fallback {fallback}"));
}

pub fn log_warm_start(backend: &str) {
    write_info(&format!("[Pages] Generating static pages from {backend} backend"));
}

pub fn log_warm_complete(generated: usize, failed: usize) {
    if failed == 0 {
        write_info(&format!("[Pages] Generated {generated} static pages"));
    } else {
        log_warning(&format!(
            "Generated {generated} static pages, {failed} failed"
        ));
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    if !enabled(Level::Info) {
        return;
    }
    match writer::get() {
        Some(w) => w.write_access(&entry.format(format)),
        None => println!("{}", entry.format(format)),
    }
}
