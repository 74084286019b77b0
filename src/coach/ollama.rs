use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::OllamaConfig;

/// Per-user chat history, keyed by user id. Held in process; a restart starts
/// every conversation fresh.
pub type ChatSessions = Arc<Mutex<HashMap<Uuid, Vec<ChatMessage>>>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    /// Base64-encoded images for multimodal requests.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
            images: Vec::new(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
            images: Vec::new(),
        }
    }

    pub fn user_with_images(content: impl Into<String>, images: Vec<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
            images,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".into(),
            content: content.into(),
            images: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: String,
}

/// One line of an NDJSON streaming response.
#[derive(Debug, Deserialize)]
pub struct ChatChunk {
    #[serde(default)]
    pub message: Option<ResponseMessage>,
    #[serde(default)]
    pub done: bool,
}

/// Parse a single NDJSON line; malformed lines are dropped.
pub fn parse_chunk(line: &str) -> Option<ChatChunk> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    serde_json::from_str(line).ok()
}

/// Accumulates byte chunks and yields complete newline-terminated lines.
/// Ollama streams NDJSON, and chunk boundaries land mid-line.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: String,
}

impl LineBuffer {
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.push_str(&String::from_utf8_lossy(chunk));
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.find('\n') {
            let line = self.pending[..pos].to_string();
            self.pending.drain(..=pos);
            if !line.trim().is_empty() {
                lines.push(line);
            }
        }
        lines
    }

    /// Whatever is left after the stream closes without a trailing newline.
    pub fn finish(self) -> Option<String> {
        let rest = self.pending.trim();
        if rest.is_empty() {
            None
        } else {
            Some(rest.to_string())
        }
    }
}

pub struct OllamaClient<'a> {
    http: &'a reqwest::Client,
    config: &'a OllamaConfig,
}

impl<'a> OllamaClient<'a> {
    pub fn new(http: &'a reqwest::Client, config: &'a OllamaConfig) -> Self {
        Self { http, config }
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.config.host.trim_end_matches('/'))
    }

    /// Start a streaming chat completion; the caller consumes the NDJSON body.
    pub async fn chat_stream(&self, messages: &[ChatMessage]) -> anyhow::Result<reqwest::Response> {
        let request = ChatRequest {
            model: &self.config.chat_model,
            messages,
            stream: true,
            options: ChatOptions {
                temperature: self.config.temperature,
            },
        };
        let response = self
            .http
            .post(self.chat_url())
            .json(&request)
            .send()
            .await
            .context("chat request to model host failed")?
            .error_for_status()
            .context("model host rejected chat request")?;
        Ok(response)
    }

    /// Single-shot completion against the vision model, used for swing
    /// analysis where streaming buys nothing.
    pub async fn analyze(&self, messages: &[ChatMessage]) -> anyhow::Result<String> {
        let request = ChatRequest {
            model: &self.config.vision_model,
            messages,
            stream: false,
            options: ChatOptions {
                temperature: self.config.temperature,
            },
        };
        let response: ChatResponse = self
            .http
            .post(self.chat_url())
            .json(&request)
            .send()
            .await
            .context("vision request to model host failed")?
            .error_for_status()
            .context("model host rejected vision request")?
            .json()
            .await
            .context("unexpected vision response body")?;
        Ok(response.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_buffer_reassembles_split_lines() {
        let mut buf = LineBuffer::default();
        assert!(buf.push(b"{\"message\":{\"conte").is_empty());
        let lines = buf.push(b"nt\":\"Hi\"},\"done\":false}\n{\"done\":tr");
        assert_eq!(lines.len(), 1);
        let chunk = parse_chunk(&lines[0]).unwrap();
        assert_eq!(chunk.message.unwrap().content, "Hi");
        assert!(!chunk.done);

        let lines = buf.push(b"ue}\n");
        assert_eq!(lines.len(), 1);
        assert!(parse_chunk(&lines[0]).unwrap().done);
        assert!(buf.finish().is_none());
    }

    #[test]
    fn line_buffer_keeps_trailing_fragment() {
        let mut buf = LineBuffer::default();
        assert!(buf.push(b"{\"done\":true}").is_empty());
        assert_eq!(buf.finish().as_deref(), Some("{\"done\":true}"));
    }

    #[test]
    fn malformed_lines_are_dropped() {
        assert!(parse_chunk("not json").is_none());
        assert!(parse_chunk("").is_none());
        assert!(parse_chunk("   ").is_none());
    }

    #[test]
    fn empty_images_are_omitted_from_wire_format() {
        let plain = serde_json::to_string(&ChatMessage::user("hello")).unwrap();
        assert!(!plain.contains("images"));

        let with = serde_json::to_string(&ChatMessage::user_with_images(
            "look",
            vec!["aGk=".into()],
        ))
        .unwrap();
        assert!(with.contains("\"images\":[\"aGk=\"]"));
    }
}
