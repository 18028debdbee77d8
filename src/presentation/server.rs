// HTTP server - Routing and graceful shutdown
use crate::application::session_runner::SessionHandle;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    fleet_stats, force_disconnect, health_check, list_alerts, list_machines, machine_alerts,
    select_machine, session_view, set_visibility, stream_session,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/machines", get(list_machines))
        .route("/machines/:id/alerts", get(machine_alerts))
        .route("/alerts", get(list_alerts))
        .route("/stats", get(fleet_stats))
        .route("/session", get(session_view))
        .route("/session/stream", get(stream_session))
        .route("/session/machine", post(select_machine))
        .route("/session/visibility", post(set_visibility))
        .route("/session/disconnect", post(force_disconnect))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves until `signal` resolves. The session is stopped as part of the
/// graceful shutdown: open `/session/stream` bodies only end once the runner
/// drops its view sender, and the server waits for them.
pub async fn serve<F>(
    listener: TcpListener,
    router: Router,
    session: SessionHandle,
    signal: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            signal.await;
            tracing::info!("Shutdown requested, stopping telemetry session");
            if session.shutdown().await.is_err() {
                tracing::debug!("Telemetry session already stopped");
            }
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fleet_service::FleetService;
    use crate::application::session_runner::SessionRunner;
    use crate::application::telemetry_session::{SessionSettings, TelemetrySession};
    use crate::infrastructure::static_catalog::StaticCatalog;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_shutdown_completes_with_open_event_stream() {
        let catalog = Arc::new(StaticCatalog::new());
        let session = TelemetrySession::new(
            catalog.clone(),
            SessionSettings::default(),
            "mix-001",
            StdRng::seed_from_u64(3),
            Utc::now(),
        );
        let (handle, session_task) =
            SessionRunner::spawn(session, None, Duration::from_millis(10));
        let state = Arc::new(AppState {
            fleet_service: FleetService::new(catalog),
            session: handle.clone(),
        });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(serve(listener, router(state), handle, async move {
            let _ = stop_rx.await;
        }));

        let mut client = TcpStream::connect(addr).await.unwrap();
        client
            .write_all(b"GET /session/stream HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        let mut received = Vec::new();
        let mut buf = [0u8; 1024];
        while !String::from_utf8_lossy(&received).contains("event: session") {
            let n = tokio::time::timeout(Duration::from_secs(5), client.read(&mut buf))
                .await
                .unwrap()
                .unwrap();
            assert!(n > 0, "stream closed before the first event");
            received.extend_from_slice(&buf[..n]);
        }
        assert!(String::from_utf8_lossy(&received).starts_with("HTTP/1.1 200 OK"));

        stop_tx.send(()).unwrap();
        let served = tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("server kept running with a stream client connected");
        served.unwrap().unwrap();
        tokio::time::timeout(Duration::from_secs(5), session_task)
            .await
            .unwrap()
            .unwrap();
    }
}
