use std::collections::HashMap;
use std::convert::Infallible;

use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, instrument, warn};
use uuid::Uuid;

use crate::auth::extractors::AuthUser;
use crate::coach::ollama::{parse_chunk, ChatMessage, LineBuffer, OllamaClient};
use crate::coach::prompts;
use crate::error::ApiError;
use crate::rounds::dto::RoundResponse;
use crate::rounds::repo::Round;
use crate::state::AppState;

/// Swing clips arrive as a handful of frames; cap the upload well above that.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;
const RECENT_ROUNDS: usize = 5;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat))
        .route(
            "/chat/vision",
            post(analyze_swing_upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/chat/vision/base64",
            post(analyze_swing_base64).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
}

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SwingFramesBody {
    /// Base64-encoded JPEG/PNG frames, in playback order.
    pub frames: Vec<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SwingAnalysis {
    pub analysis: String,
    pub frames_analyzed: usize,
}

/// Streaming chat with the coach. Plain-text chunks are flushed as the model
/// produces them; the full reply lands in the per-user session afterwards.
/// Sending "reset" clears the conversation.
#[instrument(skip(state, body))]
pub async fn chat(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<ChatBody>,
) -> Result<Response, ApiError> {
    let message = body.message.trim().to_string();
    if message.is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".into()));
    }
    if message.eq_ignore_ascii_case("reset") {
        state.chat_sessions.lock().await.remove(&user_id);
        return Ok(Json(json!({ "reply": "Conversation reset. Clean slate, fresh tee." }))
            .into_response());
    }

    let mut history = {
        let mut sessions = state.chat_sessions.lock().await;
        sessions
            .entry(user_id)
            .or_insert_with(|| vec![ChatMessage::system(prompts::COACH_SYSTEM_PROMPT)])
            .clone()
    };

    // First user message carries their recent scorecards so the coach can
    // talk about real numbers.
    let mut content = message;
    if history.len() == 1 {
        if let Some(digest) = recent_rounds_digest(&state, user_id).await? {
            content.push_str(&digest);
        }
    }
    history.push(ChatMessage::user(content));

    let client = OllamaClient::new(&state.http, &state.config.ollama);
    let upstream = client.chat_stream(&history).await.map_err(|err| {
        error!(error = %err, "chat model unavailable");
        ApiError::Upstream("coach is unavailable right now".into())
    })?;

    let (tx, rx) = tokio::sync::mpsc::channel::<String>(32);
    let sessions = state.chat_sessions.clone();
    tokio::spawn(async move {
        let mut stream = upstream.bytes_stream();
        let mut lines = LineBuffer::default();
        let mut reply = String::new();
        'outer: while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(bytes) => bytes,
                Err(err) => {
                    warn!(error = %err, "chat stream interrupted");
                    break;
                }
            };
            for line in lines.push(&chunk) {
                let Some(parsed) = parse_chunk(&line) else {
                    continue;
                };
                if let Some(message) = parsed.message {
                    if !message.content.is_empty() {
                        reply.push_str(&message.content);
                        if tx.send(message.content).await.is_err() {
                            // Client hung up; drop the partial exchange.
                            return;
                        }
                    }
                }
                if parsed.done {
                    break 'outer;
                }
            }
        }
        if !reply.is_empty() {
            history.push(ChatMessage::assistant(reply));
            sessions.lock().await.insert(user_id, history);
        }
    });

    let body = Body::from_stream(
        ReceiverStream::new(rx).map(|piece| Ok::<_, Infallible>(Bytes::from(piece))),
    );
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response())
}

/// Swing analysis from uploaded frame files (multipart field `files`).
#[instrument(skip(state, multipart))]
pub async fn analyze_swing_upload(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    mut multipart: Multipart,
) -> Result<Json<SwingAnalysis>, ApiError> {
    let mut frames = Vec::new();
    let mut note = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::BadRequest(format!("invalid multipart body: {err}")))?
    {
        match field.name() {
            Some("files") | Some("files[]") => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|err| ApiError::BadRequest(format!("failed to read upload: {err}")))?;
                if !data.is_empty() {
                    frames.push(BASE64.encode(&data));
                }
            }
            Some("note") => {
                note = field.text().await.ok().filter(|t| !t.trim().is_empty());
            }
            _ => {}
        }
    }
    run_swing_analysis(&state, frames, note).await
}

/// Swing analysis from pre-encoded frames, for clients that extract frames
/// themselves.
#[instrument(skip(state, body))]
pub async fn analyze_swing_base64(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Json(body): Json<SwingFramesBody>,
) -> Result<Json<SwingAnalysis>, ApiError> {
    for (idx, frame) in body.frames.iter().enumerate() {
        if BASE64.decode(frame).is_err() {
            return Err(ApiError::BadRequest(format!(
                "frame {idx} is not valid base64"
            )));
        }
    }
    run_swing_analysis(&state, body.frames, body.note).await
}

async fn run_swing_analysis(
    state: &AppState,
    frames: Vec<String>,
    note: Option<String>,
) -> Result<Json<SwingAnalysis>, ApiError> {
    if frames.is_empty() {
        return Err(ApiError::BadRequest(
            "at least one swing image is required".into(),
        ));
    }
    let mut prompt = prompts::SWING_ANALYSIS_PROMPT.to_string();
    if let Some(note) = note {
        prompt.push_str("\n\nPlayer's note: ");
        prompt.push_str(note.trim());
    }

    let frames_analyzed = frames.len();
    let messages = [ChatMessage::user_with_images(prompt, frames)];
    let client = OllamaClient::new(&state.http, &state.config.ollama);
    let analysis = client.analyze(&messages).await.map_err(|err| {
        error!(error = %err, "vision model unavailable");
        ApiError::Upstream("swing analysis is unavailable right now".into())
    })?;

    Ok(Json(SwingAnalysis {
        analysis,
        frames_analyzed,
    }))
}

async fn recent_rounds_digest(
    state: &AppState,
    user_id: Uuid,
) -> Result<Option<String>, ApiError> {
    let rounds = Round::list_for_player(&state.db, user_id).await?;
    let recent: Vec<_> = rounds.into_iter().take(RECENT_ROUNDS).collect();
    if recent.is_empty() {
        return Ok(None);
    }

    let ids: Vec<Uuid> = recent.iter().map(|r| r.id).collect();
    let mut by_round: HashMap<Uuid, Vec<_>> = HashMap::new();
    for score in Round::scores_for_rounds(&state.db, &ids).await? {
        by_round.entry(score.round_id).or_default().push(score);
    }

    let responses: Vec<RoundResponse> = recent
        .into_iter()
        .map(|round| {
            let scores = by_round.remove(&round.id).unwrap_or_default();
            RoundResponse::build(round, &scores)
        })
        .collect();
    Ok(prompts::rounds_digest(&responses))
}
