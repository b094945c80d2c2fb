//! The realtime transport (§4.H): one websocket per connected player, JSON
//! framed. Grounded in the teacher's `hand_shake`/room-broadcast shape —
//! split sink/stream, a `broadcast::Receiver` subscribed to the game's
//! room, and a `select!` loop forwarding both directions — but the wire
//! format is JSON text frames instead of postcard binary, and there is no
//! handshake negotiation: the session token (already issued by `POST
//! /api/games/:id/join`) is presented as the first message.
//!
//! Disconnection and the ~2 minute reconnect window are driven by the
//! manager's existing grace-timer machinery (`on_disconnect`/
//! `on_reconnect`), not reimplemented here: this module only notices the
//! socket close and the next socket open for the same session.

use crate::http::AppState;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures_util::sink::Sink;
use futures_util::{SinkExt, StreamExt};
use rules::{PieceId, PlayerId};
use serde::{Deserialize, Serialize};
use session::SessionData;
use uuid::Uuid;

pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum ClientMessage {
    #[serde(rename = "auth")]
    Auth { token: String },
    #[serde(rename = "startGame")]
    StartGame { id: Option<String> },
    #[serde(rename = "playTurn")]
    PlayTurn { id: Option<String>, piece_id: PieceId, destination: hex::Axial, client_turn_number: Option<u64> },
    #[serde(rename = "starvationChoice")]
    StarvationChoice { id: Option<String>, piece_id: PieceId },
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum ServerAck {
    #[serde(rename = "ack")]
    Ack { id: Option<String>, success: bool, error: Option<String> },
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();

    // First message on the socket must be `{"type":"auth","token":"..."}`;
    // anything else closes the connection (§4.H implicit precondition —
    // every other message is scoped to an already-known game/player).
    let session = loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Auth { token }) => match state.sessions.validate_session(&token) {
                    Some(data) => break data,
                    None => {
                        let _ = send_json(&mut sink, &ServerAck::Ack { id: None, success: false, error: Some("UNAUTHORIZED".into()) }).await;
                        return;
                    }
                },
                _ => continue,
            },
            Some(Ok(Message::Close(_))) | None => return,
            Some(Ok(_)) => continue,
            Some(Err(_)) => return,
        }
    };

    let SessionData { game_id, player_id, .. } = session;
    let mut notifications = state.manager.subscribe(game_id);
    let _ = state.manager.on_reconnect(game_id, player_id).await;

    loop {
        tokio::select! {
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(err) = handle_client_message(&state, game_id, player_id, &text, &mut sink).await {
                            tracing::warn!(game_id = %game_id, player_id = %player_id, error = %err, "rejected websocket message");
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        tracing::warn!(error = %err, "websocket read error");
                        break;
                    }
                }
            }
            notification = notifications.recv() => {
                match notification {
                    Ok(notification) => {
                        if send_json(&mut sink, &notification).await.is_err() {
                            break;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(game_id = %game_id, skipped, "websocket fell behind room broadcast");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    let _ = state.manager.on_disconnect(game_id, player_id).await;
}

async fn handle_client_message(
    state: &AppState,
    game_id: Uuid,
    player_id: PlayerId,
    text: &str,
    sink: &mut (impl Sink<Message, Error = axum::Error> + Unpin),
) -> anyhow::Result<()> {
    let message: ClientMessage = serde_json::from_str(text)?;
    let (id, result) = match message {
        ClientMessage::Auth { .. } => return Ok(()),
        ClientMessage::StartGame { id } => (id, state.manager.start(game_id, player_id).await.map(|_| ())),
        ClientMessage::PlayTurn { id, piece_id, destination, client_turn_number } => {
            (id, state.manager.make_move(game_id, player_id, piece_id, destination, client_turn_number).await.map(|_| ()))
        }
        ClientMessage::StarvationChoice { id, piece_id } => {
            (id, state.manager.submit_starvation_choice(game_id, player_id, piece_id).await.map(|_| ()))
        }
    };

    let ack = match result {
        Ok(()) => ServerAck::Ack { id, success: true, error: None },
        Err(err) => ServerAck::Ack { id, success: false, error: Some(err.to_string()) },
    };
    send_json(sink, &ack).await?;
    Ok(())
}

async fn send_json(sink: &mut (impl Sink<Message, Error = axum::Error> + Unpin), value: &impl Serialize) -> anyhow::Result<()> {
    let text = serde_json::to_string(value)?;
    sink.send(Message::Text(text)).await?;
    Ok(())
}
