//! Persistent chat over WebSocket: one LLM reply per incoming text frame.

use std::fmt::Display;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::llm_client::{LlmError, LlmGateway};
use crate::state::AppState;

/// Messages with this prefix are answered locally instead of going to the LLM.
pub const RESUME_PREFIX: &str = "resume:";
pub const UPLOAD_PROMPT: &str = "Please upload your resume.";

/// Close reasons are limited to 123 bytes by the WebSocket protocol.
const MAX_CLOSE_REASON_BYTES: usize = 123;

/// How a chat session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The peer closed the channel or the connection dropped.
    Disconnected,
    /// The LLM call failed; the channel was closed with an internal-error code.
    GatewayFailed,
}

/// GET /chat (WebSocket upgrade)
pub async fn handle_chat_socket(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        let (sender, receiver) = socket.split();
        run_session(sender, receiver, state.llm).await;
    })
}

/// Produces the reply for one incoming chat message.
pub async fn reply_to(message: &str, llm: &dyn LlmGateway) -> Result<String, LlmError> {
    if message.starts_with(RESUME_PREFIX) {
        return Ok(UPLOAD_PROMPT.to_string());
    }
    llm.generate(message).await
}

/// Drives a chat session until the peer goes away or the LLM fails.
pub async fn run_session<Tx, Rx, E>(mut sender: Tx, mut receiver: Rx, llm: Arc<dyn LlmGateway>) -> SessionEnd
where
    Tx: Sink<Message> + Unpin,
    Tx::Error: Display,
    Rx: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    let session_id = Uuid::new_v4();
    info!(%session_id, "Chat session opened");

    while let Some(frame) = receiver.next().await {
        let message = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(Message::Binary(bytes)) => {
                debug!(%session_id, "Ignoring {}-byte binary frame", bytes.len());
                continue;
            }
            Ok(_) => continue,
            Err(e) => {
                warn!(%session_id, "Chat receive failed: {e}");
                break;
            }
        };

        let reply = match reply_to(&message, llm.as_ref()).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(%session_id, "Chat LLM call failed: {e}");
                let close = CloseFrame {
                    code: close_code::ERROR,
                    reason: truncate_reason(&e.to_string()).into(),
                };
                if let Err(send_error) = sender.send(Message::Close(Some(close))).await {
                    debug!(%session_id, "Close frame not delivered: {send_error}");
                }
                return SessionEnd::GatewayFailed;
            }
        };

        if let Err(e) = sender.send(Message::Text(reply)).await {
            warn!(%session_id, "Chat send failed: {e}");
            break;
        }
    }

    info!(%session_id, "Client disconnected");
    SessionEnd::Disconnected
}

fn truncate_reason(reason: &str) -> String {
    if reason.len() <= MAX_CLOSE_REASON_BYTES {
        return reason.to_string();
    }
    let mut end = MAX_CLOSE_REASON_BYTES;
    while !reason.is_char_boundary(end) {
        end -= 1;
    }
    reason[..end].to_string()
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use futures::channel::mpsc;

    use super::*;
    use crate::llm_client::test_support::FakeGateway;

    fn text(s: &str) -> Result<Message, Infallible> {
        Ok(Message::Text(s.to_string()))
    }

    async fn run(frames: Vec<Result<Message, Infallible>>, llm: Arc<FakeGateway>) -> (SessionEnd, Vec<Message>) {
        let (tx, rx) = mpsc::unbounded();
        let end = run_session(tx, futures::stream::iter(frames), llm).await;
        (end, rx.collect().await)
    }

    fn texts(messages: &[Message]) -> Vec<String> {
        messages
            .iter()
            .filter_map(|m| match m {
                Message::Text(t) => Some(t.clone()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_resume_prefix_is_answered_without_gateway() {
        let llm = Arc::new(FakeGateway::replying("should not be used"));
        let (end, sent) = run(vec![text("resume: hello")], llm.clone()).await;

        assert_eq!(end, SessionEnd::Disconnected);
        assert_eq!(texts(&sent), vec!["Please upload your resume."]);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_other_text_is_forwarded_verbatim() {
        let llm = Arc::new(FakeGateway::replying("Try adding metrics."));
        let (_, sent) = run(
            vec![text("How do I improve my resume?"), text("Resume: capitalized prefix")],
            llm.clone(),
        )
        .await;

        assert_eq!(texts(&sent), vec!["Try adding metrics.", "Try adding metrics."]);
        assert_eq!(
            llm.prompts(),
            vec!["How do I improve my resume?", "Resume: capitalized prefix"]
        );
    }

    #[tokio::test]
    async fn test_close_frame_ends_session() {
        let llm = Arc::new(FakeGateway::replying("reply"));
        let (end, sent) = run(
            vec![text("first"), Ok(Message::Close(None)), text("after close")],
            llm.clone(),
        )
        .await;

        assert_eq!(end, SessionEnd::Disconnected);
        assert_eq!(texts(&sent), vec!["reply"]);
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_binary_and_ping_frames_are_ignored() {
        let llm = Arc::new(FakeGateway::replying("reply"));
        let (_, sent) = run(
            vec![
                Ok(Message::Binary(vec![1, 2, 3])),
                Ok(Message::Ping(vec![])),
                text("hi"),
            ],
            llm.clone(),
        )
        .await;

        assert_eq!(texts(&sent), vec!["reply"]);
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_gateway_failure_closes_with_internal_error() {
        let llm = Arc::new(FakeGateway::failing(503, "model overloaded"));
        let (end, sent) = run(vec![text("hi"), text("never processed")], llm.clone()).await;

        assert_eq!(end, SessionEnd::GatewayFailed);
        assert_eq!(llm.calls(), 1);
        match sent.as_slice() {
            [Message::Close(Some(frame))] => {
                assert_eq!(frame.code, close_code::ERROR);
                assert!(frame.reason.contains("model overloaded"));
            }
            other => panic!("expected a single close frame, got {other:?}"),
        }
    }

    #[test]
    fn test_truncate_reason_respects_char_boundaries() {
        let long = "é".repeat(100);
        let truncated = truncate_reason(&long);
        assert!(truncated.len() <= MAX_CLOSE_REASON_BYTES);
        assert!(long.starts_with(&truncated));
        assert_eq!(truncate_reason("short"), "short");
    }
}
