// WebSocket snapshot stream

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::broadcast;
use tokio::time::{Duration, timeout};

use super::AppState;
use crate::models::{Snapshot, SnapshotDisplay};

pub(super) const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
pub(super) const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Decrements the connection count on drop (connect = +1, drop = -1).
struct WsConnectionGuard(Arc<AtomicUsize>);

impl Drop for WsConnectionGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

pub(super) async fn ws_snapshot(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        let mut rx = state.aggregator.subscribe();
        let latest = state.aggregator.latest();
        if let Err(e) = stream_snapshots(socket, &mut rx, latest, state.ws_connections).await {
            tracing::info!("Snapshot stream error: {}", e);
        }
    })
}

/// Sends `snapshot` as display JSON. `Ok(false)` means the client is gone.
async fn send_snapshot(socket: &mut WebSocket, snapshot: &Snapshot) -> anyhow::Result<bool> {
    let json = serde_json::to_string(&SnapshotDisplay::from(snapshot))?;
    let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Text(json.into()))).await;
    Ok(matches!(r, Ok(Ok(()))))
}

async fn stream_snapshots(
    mut socket: WebSocket,
    rx: &mut broadcast::Receiver<Arc<Snapshot>>,
    latest: Option<Arc<Snapshot>>,
    conn_count: Arc<AtomicUsize>,
) -> anyhow::Result<()> {
    let clients = conn_count.fetch_add(1, Ordering::Relaxed) + 1;
    let _guard = WsConnectionGuard(conn_count);
    tracing::info!(ws_clients = clients, "Client connected to snapshot stream");

    if let Some(snapshot) = latest
        && !send_snapshot(&mut socket, &snapshot).await?
    {
        return Ok(());
    }

    let mut ping_interval = tokio::time::interval(WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(snapshot) => {
                        if !send_snapshot(&mut socket, &snapshot).await? {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("WebSocket /ws/snapshot client lagged, skipped {} snapshots", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            _ = ping_interval.tick() => {
                let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Ping(Bytes::new()))).await;
                if !matches!(r, Ok(Ok(()))) {
                    break;
                }
            }
        }
    }
    Ok(())
}
