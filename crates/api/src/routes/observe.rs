//! Observer route
//!
//! `GET /ws/{agent_id}` upgrades to a WebSocket that receives every record
//! persisted for the agent after the upgrade, one JSON text frame each.
//! Client frames are ignored apart from Close.

use axum::{
    Router,
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
    routing::get,
};
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, info};

use roadpulse_protocol::AgentId;
use roadpulse_tap::ObserverHandle;

use crate::state::AppState;

/// Observer routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/ws/{agent_id}", get(observe_handler))
}

async fn observe_handler(
    State(state): State<AppState>,
    Path(agent_id): Path<AgentId>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| observe(socket, state, agent_id))
}

/// Forward delivered records until either side goes away
async fn observe(socket: WebSocket, state: AppState, agent_id: AgentId) {
    let (handle, mut records) = ObserverHandle::channel(state.observer_queue);
    let subscription = state.registry.subscribe_guarded(agent_id, handle);
    info!(
        agent_id,
        observer_id = subscription.observer_id(),
        "observer connected"
    );

    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            payload = records.recv() => {
                let Some(payload) = payload else { break };
                let text = match String::from_utf8(payload.to_vec()) {
                    Ok(text) => text,
                    Err(e) => {
                        debug!(agent_id, error = %e, "dropping non-utf8 record");
                        continue;
                    }
                };
                if let Err(e) = sender.send(Message::Text(text.into())).await {
                    debug!(agent_id, error = %e, "observer send failed");
                    break;
                }
            }
            message = receiver.next() => {
                match message {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(agent_id, error = %e, "observer socket error");
                        break;
                    }
                }
            }
        }
    }

    info!(
        agent_id,
        observer_id = subscription.observer_id(),
        "observer disconnected"
    );
    drop(subscription);
}
