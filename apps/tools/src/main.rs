use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Result;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        ConnectInfo, State, WebSocketUpgrade,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use clap::{Parser, ValueEnum};
use futures::{SinkExt, StreamExt};
use shared::{
    domain::PermissionLevel,
    protocol::{client_frame_kind, DispatcherPermission, MessageKind},
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod script;

use script::{permission_frame, Script};

/// Replays a recorded dispatcher feed to any client that connects.
#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "127.0.0.1:15192")]
    bind: SocketAddr,
    /// JSON lines, one `{"action", "body"}` frame per line.
    #[arg(long, default_value = "feed.jsonl")]
    script: PathBuf,
    #[arg(long, default_value_t = 500)]
    interval_ms: u64,
    /// Permission announced right after the handshake.
    #[arg(long, value_enum, default_value_t = Permission::Granted)]
    permission: Permission,
    /// Close the connection once the script has been sent.
    #[arg(long)]
    close: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Permission {
    Granted,
    Rescinded,
    Observer,
}

impl From<Permission> for DispatcherPermission {
    fn from(value: Permission) -> Self {
        let permission = match value {
            Permission::Granted => PermissionLevel::Granted,
            Permission::Rescinded => PermissionLevel::Rescinded,
            Permission::Observer => PermissionLevel::Observer,
        };
        DispatcherPermission {
            ai_permission: false,
            permission,
        }
    }
}

struct Feed {
    greeting: String,
    script: Script,
    interval: Duration,
    close: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter("info"))
        .init();

    let cli = Cli::parse();
    let script = Script::load(&cli.script).await?;
    info!(
        frames = script.frames.len(),
        trains = script.count(MessageKind::UpdateTrainData),
        path = %cli.script.display(),
        "script loaded"
    );
    let feed = Feed {
        greeting: permission_frame(cli.permission.into())?,
        script,
        interval: Duration::from_millis(cli.interval_ms),
        close: cli.close,
    };

    let app = Router::new()
        .route("/Run8", get(ws_handler))
        .with_state(Arc::new(feed));
    info!(addr = %cli.bind, "feed server listening");
    let listener = tokio::net::TcpListener::bind(cli.bind).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

/// `RUST_LOG` when set, `default` otherwise.
fn log_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(feed): State<Arc<Feed>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| replay(feed, socket, peer))
}

async fn replay(feed: Arc<Feed>, socket: WebSocket, peer: SocketAddr) {
    let (mut sender, mut receiver) = socket.split();

    let handshake = match receiver.next().await {
        Some(Ok(Message::Text(text))) => client_frame_kind(&text).ok(),
        _ => None,
    };
    if handshake != Some(MessageKind::DispatcherConnected) {
        warn!(%peer, "client did not announce itself as a dispatcher");
        let _ = sender.close().await;
        return;
    }
    info!(%peer, "dispatcher connected");

    if sender.send(Message::Text(feed.greeting.clone())).await.is_err() {
        return;
    }

    let mut ticker = tokio::time::interval(feed.interval);
    for frame in &feed.script.frames {
        tokio::select! {
            _ = ticker.tick() => {}
            incoming = receiver.next() => {
                if !matches!(incoming, Some(Ok(_))) {
                    info!(%peer, "dispatcher left mid-script");
                    return;
                }
                ticker.tick().await;
            }
        }
        if sender.send(Message::Text(frame.clone())).await.is_err() {
            info!(%peer, "dispatcher left mid-script");
            return;
        }
    }
    debug!(%peer, frames = feed.script.frames.len(), "script finished");

    if feed.close {
        let _ = sender.close().await;
        return;
    }
    while let Some(Ok(_)) = receiver.next().await {}
    info!(%peer, "dispatcher disconnected");
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
