use anyhow::Result;
use homestatus::aggregator::{NoticeLog, Notifier, TelemetryAggregator};
use homestatus::readers::Readers;
use homestatus::*;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

/// Upper bound on waiting for an in-flight cycle during shutdown.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    let notices = Arc::new(NoticeLog::new());
    let notifier = Arc::new(Notifier::new(notices.clone()));
    let aggregator = Arc::new(TelemetryAggregator::new(
        Readers::system(),
        notifier,
        app_config.aggregator_config(),
    ));
    aggregator.start(app_config.sample_interval());

    let app = routes::app(aggregator.clone(), notices);
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Received shutdown signal");
    if tokio::time::timeout(SHUTDOWN_TIMEOUT, aggregator.shutdown())
        .await
        .is_err()
    {
        tracing::warn!("telemetry cycle still running at shutdown; abandoning it");
    }
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
