// Server loop module
// Accepts connections until shutdown is signalled, then drains in-flight ones

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Interval between checks of the active connection count while draining
const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Run the accept loop on the current `LocalSet`
///
/// Returns once `shutdown` is notified and open connections have finished,
/// or the drain period (the configured write timeout) has elapsed.
#[allow(clippy::ignored_unit_patterns)]
pub async fn run_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
    shutdown: Arc<Notify>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            _ = shutdown.notified() => {
                logger::log_shutdown();
                break;
            }
        }
    }

    drop(listener);
    let grace = Duration::from_secs(state.config.performance.write_timeout);
    let drained = tokio::time::timeout(grace, async {
        while active_connections.load(Ordering::SeqCst) > 0 {
            tokio::time::sleep(DRAIN_POLL).await;
        }
    })
    .await;
    if drained.is_err() {
        logger::log_warning(&format!(
            "{} connections still open after {}s, closing",
            active_connections.load(Ordering::SeqCst),
            grace.as_secs()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::listener::create_listener;
    use crate::store::testing::{seeded_sqlite, test_client};

    #[tokio::test]
    async fn test_serves_pages_until_shutdown() {
        let mut config = Config::load_from("does-not-exist").unwrap();
        config.logging.access_log = false;
        let state = Arc::new(AppState::new(config, seeded_sqlite()));

        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let counter = Arc::new(AtomicUsize::new(0));

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let server = tokio::task::spawn_local(run_server_loop(
                    listener,
                    Arc::clone(&state),
                    Arc::clone(&counter),
                    Arc::clone(&shutdown),
                ));

                let client = test_client();
                let resp = client
                    .get(format!("http://{addr}/artist/ar2"))
                    .header("Cookie", "cacheable=true")
                    .send()
                    .await
                    .unwrap();
                assert_eq!(resp.status(), 200);
                assert_eq!(resp.headers()["server"], "catalog-server/0.1");
                assert!(resp.text().await.unwrap().contains("Borrow Checkers"));
                drop(client);

                shutdown.notify_one();
                server.await.unwrap().unwrap();
            })
            .await;

        assert!(state.pages.get("/ssg/artist/ar2").await.is_some());
    }
}
