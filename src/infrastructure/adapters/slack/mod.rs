//! Slack RTM adapter

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::domain::entities::{ChannelKind, Message};
use crate::domain::traits::Connection;
use crate::application::errors::BotError;
use crate::application::messaging::Bot;
use crate::infrastructure::config::SlackConfig;
use crate::infrastructure::runtime::TokioSpawner;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Slack RTM frame, inbound and outbound
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RtmMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
struct HandshakeSelf {
    #[serde(default)]
    id: String,
}

#[derive(Debug, Deserialize)]
struct HandshakeResponse {
    ok: bool,
    #[serde(default)]
    error: String,
    #[serde(default)]
    url: String,
    #[serde(rename = "self", default)]
    identity: HandshakeSelf,
}

/// Result of a successful negotiation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    pub url: String,
    pub bot_id: String,
}

/// Interpret the negotiation response body
pub fn parse_handshake(body: &str) -> Result<Handshake, BotError> {
    let response: HandshakeResponse = serde_json::from_str(body)
        .map_err(|e| BotError::Transport(format!("Malformed negotiation response: {}", e)))?;

    if !response.ok {
        return Err(BotError::Auth(response.error));
    }
    if response.url.is_empty() {
        return Err(BotError::Transport("Negotiation response has no socket url".to_string()));
    }

    Ok(Handshake {
        url: response.url,
        bot_id: response.identity.id,
    })
}

/// Ask the API for a socket url and the bot's own identity
pub async fn negotiate(client: &Client, api_url: &str, token: &str) -> Result<Handshake, BotError> {
    let url = format!("{}/rtm.connect", api_url.trim_end_matches('/'));
    let response = client
        .get(&url)
        .bearer_auth(token)
        .send()
        .await
        .map_err(|e| BotError::Transport(format!("Failed to reach {}: {}", url, e)))?;

    if !response.status().is_success() {
        return Err(BotError::Transport(format!("Negotiation failed with HTTP {}", response.status())));
    }

    let body = response
        .text()
        .await
        .map_err(|e| BotError::Transport(format!("Failed to read negotiation body: {}", e)))?;

    parse_handshake(&body)
}

/// Message subtypes that are edits, deletions or bot echoes rather than new user text
const SKIPPED_SUBTYPES: &[&str] = &["message_changed", "message_deleted", "bot_message"];

/// Decode one text frame. Non-message events and skipped subtypes decode to `None`.
pub fn decode_frame(text: &str) -> Result<Option<Message>, BotError> {
    let raw: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| BotError::Parse(format!("Invalid frame: {}", e)))?;
    let frame: RtmMessage = serde_json::from_value(raw.clone())
        .map_err(|e| BotError::Parse(format!("Unexpected frame shape: {}", e)))?;

    if frame.kind != "message" {
        return Ok(None);
    }
    if let Some(subtype) = frame.subtype.as_deref() {
        if SKIPPED_SUBTYPES.contains(&subtype) {
            return Ok(None);
        }
    }

    let kind = if frame.channel.starts_with('D') {
        ChannelKind::Direct
    } else {
        ChannelKind::Channel
    };

    Ok(Some(
        Message::new(frame.channel, frame.user, frame.text)
            .with_channel_kind(kind)
            .with_raw(raw),
    ))
}

/// Encode an outbound message as an RTM frame
pub fn encode_frame(id: u64, message: &Message) -> Result<String, BotError> {
    let frame = RtmMessage {
        id: Some(id),
        kind: "message".to_string(),
        subtype: None,
        channel: message.channel_id.clone(),
        user: message.sender_id.clone(),
        text: message.text().to_string(),
    };
    serde_json::to_string(&frame).map_err(|e| BotError::Parse(e.to_string()))
}

/// Live RTM websocket
pub struct SlackConnection {
    reader: Mutex<SplitStream<WsStream>>,
    writer: Mutex<SplitSink<WsStream, WsMessage>>,
    next_id: AtomicU64,
}

impl SlackConnection {
    /// Open the websocket returned by negotiation
    pub async fn open(url: &str) -> Result<Self, BotError> {
        let (stream, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| BotError::Transport(format!("Failed to open websocket: {}", e)))?;
        let (writer, reader) = stream.split();

        Ok(Self {
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
            next_id: AtomicU64::new(1),
        })
    }

    /// Negotiate and open the websocket. Returns the connection and the bot's id.
    pub async fn connect(client: &Client, config: &SlackConfig, token: &str) -> Result<(Self, String), BotError> {
        let handshake = negotiate(client, &config.api_url, token).await?;
        tracing::debug!("Negotiated socket for bot {}", handshake.bot_id);
        let connection = Self::open(&handshake.url).await?;
        Ok((connection, handshake.bot_id))
    }
}

#[async_trait]
impl Connection for SlackConnection {
    async fn receive(&self) -> Option<Result<Message, BotError>> {
        let mut reader = self.reader.lock().await;
        loop {
            match reader.next().await {
                Some(Ok(WsMessage::Text(text))) => match decode_frame(&text) {
                    Ok(Some(message)) => return Some(Ok(message)),
                    Ok(None) => continue,
                    Err(e) => return Some(Err(e)),
                },
                Some(Ok(WsMessage::Close(_))) | None => return None,
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    tracing::warn!("Slack websocket error: {}", e);
                    return None;
                }
            }
        }
    }

    async fn send(&self, message: &Message) -> Result<(), BotError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let frame = encode_frame(id, message)?;

        let mut writer = self.writer.lock().await;
        writer
            .send(WsMessage::Text(frame.into()))
            .await
            .map_err(|e| BotError::Transport(format!("Failed to send frame: {}", e)))
    }
}

impl Bot {
    /// Connect to Slack with the given token and default settings
    pub async fn new(token: impl Into<String>) -> Result<Self, BotError> {
        let config = SlackConfig {
            token: Some(token.into()),
            ..SlackConfig::default()
        };
        Self::connect(&config).await
    }

    /// Negotiate, open the websocket and build a bot that spawns on tokio
    pub async fn connect(config: &SlackConfig) -> Result<Self, BotError> {
        let token = config.token()?;
        let client = Client::new();
        let (connection, bot_id) = SlackConnection::connect(&client, config, token).await?;

        tracing::info!("Connected to Slack as {}", bot_id);
        Ok(Bot::with_connection(bot_id, Arc::new(connection), Arc::new(TokioSpawner)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_handshake_ok() {
        let body = r#"{"ok":true,"url":"wss://example.test/ws","self":{"id":"U1","name":"bot"}}"#;
        let handshake = parse_handshake(body).unwrap();
        assert_eq!(handshake.url, "wss://example.test/ws");
        assert_eq!(handshake.bot_id, "U1");
    }

    #[test]
    fn test_parse_handshake_auth_failure() {
        let err = parse_handshake(r#"{"ok":false,"error":"invalid_auth"}"#).unwrap_err();
        assert_eq!(err.auth_reason(), Some("invalid_auth"));
    }

    #[test]
    fn test_parse_handshake_malformed() {
        assert!(matches!(parse_handshake("<html>"), Err(BotError::Transport(_))));
        assert!(matches!(parse_handshake(r#"{"ok":true}"#), Err(BotError::Transport(_))));
    }

    #[test]
    fn test_decode_message_frame() {
        let msg = decode_frame(r#"{"type":"message","channel":"C1","user":"U2","text":"!hello"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(msg.channel_id, "C1");
        assert_eq!(msg.sender_id, "U2");
        assert_eq!(msg.raw_text, "!hello");
        assert_eq!(msg.channel_kind, ChannelKind::Channel);
        assert!(msg.raw.is_some());
    }

    #[test]
    fn test_decode_direct_channel() {
        let msg = decode_frame(r#"{"type":"message","channel":"D1","user":"U2","text":"hi"}"#)
            .unwrap()
            .unwrap();
        assert!(msg.is_direct());
    }

    #[test]
    fn test_decode_skips_other_events() {
        assert!(decode_frame(r#"{"type":"hello"}"#).unwrap().is_none());
        for subtype in ["message_changed", "message_deleted", "bot_message"] {
            let frame = format!(r#"{{"type":"message","subtype":"{}","channel":"C1"}}"#, subtype);
            assert!(decode_frame(&frame).unwrap().is_none(), "{} should be skipped", subtype);
        }
    }

    #[test]
    fn test_decode_keeps_user_subtypes() {
        for subtype in ["me_message", "file_share", "thread_broadcast"] {
            let frame = format!(
                r#"{{"type":"message","subtype":"{}","channel":"C1","user":"U2","text":"!ping"}}"#,
                subtype
            );
            let msg = decode_frame(&frame).unwrap().unwrap();
            assert_eq!(msg.raw_text, "!ping");
            assert_eq!(msg.sender_id, "U2");
        }
    }

    #[test]
    fn test_decode_malformed() {
        assert!(matches!(decode_frame("not json"), Err(BotError::Parse(_))));
        assert!(matches!(decode_frame(r#"{"type":5}"#), Err(BotError::Parse(_))));
    }

    #[test]
    fn test_encode_frame() {
        let msg = Message::new("C1", "U2", "hi").reply_with("<@U2>: hello");
        let frame: serde_json::Value = serde_json::from_str(&encode_frame(7, &msg).unwrap()).unwrap();
        assert_eq!(frame["id"], 7);
        assert_eq!(frame["type"], "message");
        assert_eq!(frame["channel"], "C1");
        assert_eq!(frame["text"], "<@U2>: hello");
        assert!(frame.get("subtype").is_none());
    }
}
