use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{sink::SinkExt, stream::StreamExt};
use plane_core::{Plane, PlaneConfig, PlaneEvent};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

mod session;

use session::{error_code, execute, Command};

/// Format an engine error as a JSON message for the frontend
fn format_error(code: &str, message: &str, severity: &str) -> String {
    format!("ERROR_UPDATE:{}", json!({
        "code": code,
        "message": message,
        "severity": severity
    }))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct ServerConfig {
    listen: SocketAddr,
    plane: PlaneConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 3000)),
            plane: PlaneConfig::default(),
        }
    }
}

fn load_config() -> Result<ServerConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)?;
            info!("loaded config from {}", path);
            Ok(serde_json::from_str(&text)?)
        }
        None => Ok(ServerConfig::default()),
    }
}

// Application State
struct AppState {
    plane_config: PlaneConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = load_config()?;
    let shared_state = Arc::new(AppState {
        plane_config: config.plane,
    });

    let app = Router::new()
        .route("/", get(root))
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state);

    info!("listening on {}", config.listen);
    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn root() -> &'static str {
    "Hello from the plane deduction backend!"
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

fn rows_update(plane: &Plane) -> String {
    let json = serde_json::to_string(&plane.rows()).unwrap_or("[]".into());
    format!("PLANE_UPDATE:{}", json)
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    info!("Client connected");
    let (mut sender, mut receiver) = socket.split();

    // Each connection edits its own plane; observer events are relayed after every command.
    let mut plane = Plane::new(state.plane_config.clone());
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<PlaneEvent>();
    plane.subscribe(Box::new(move |event: &PlaneEvent| {
        let _ = event_tx.send(event.clone());
    }));

    if sender.send(Message::Text(rows_update(&plane))).await.is_err() {
        return;
    }

    while let Some(msg) = receiver.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => continue,
        };
        info!("Received message: {}", text);

        let command: Command = match serde_json::from_str(&text) {
            Ok(command) => command,
            Err(e) => {
                warn!("Failed to parse command: {}", e);
                let error_msg = format_error("BAD_COMMAND", &e.to_string(), "warning");
                if sender.send(Message::Text(error_msg)).await.is_err() {
                    break;
                }
                continue;
            }
        };

        let mutates = command.mutates();
        let result = execute(&mut plane, command);
        let mut outgoing = Vec::new();
        while let Ok(event) = event_rx.try_recv() {
            let json = serde_json::to_string(&event).unwrap_or("{}".into());
            outgoing.push(format!("EVENT:{}", json));
        }
        match result {
            Ok(reply) => {
                let json = serde_json::to_string(&reply).unwrap_or("{}".into());
                outgoing.push(format!("RESULT:{}", json));
                if mutates {
                    outgoing.push(rows_update(&plane));
                }
            }
            Err(e) => {
                warn!("Command failed: {}", e);
                outgoing.push(format_error(error_code(&e), &e.to_string(), "error"));
            }
        }

        for message in outgoing {
            if sender.send(Message::Text(message)).await.is_err() {
                info!("Client disconnected");
                return;
            }
        }
    }
    info!("Client disconnected");
}
