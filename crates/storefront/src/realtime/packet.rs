//! Socket.IO v5 packets carried over Engine.IO v4 websocket frames.
//!
//! Only the subset a chat client needs: handshake, heartbeat, connect,
//! disconnect and plain (non-binary) events on the default namespace.

use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PacketError {
    #[error("empty frame")]
    Empty,
    #[error("unknown packet type '{0}'")]
    UnknownType(char),
    #[error("unsupported packet: {0}")]
    Unsupported(String),
    #[error("malformed packet: {0}")]
    Malformed(String),
}

/// Engine.IO handshake sent by the server right after the upgrade.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default)]
    pub ping_timeout: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Open(Handshake),
    Close,
    Ping,
    Pong,
    Noop,
    Connect,
    Disconnect,
    ConnectError(String),
    Event { name: String, data: Value },
}

impl Packet {
    pub fn event(name: &str, data: Value) -> Self {
        Packet::Event {
            name: name.to_string(),
            data,
        }
    }

    pub fn encode(&self) -> String {
        match self {
            Packet::Open(_) => "0".to_string(),
            Packet::Close => "1".to_string(),
            Packet::Ping => "2".to_string(),
            Packet::Pong => "3".to_string(),
            Packet::Noop => "6".to_string(),
            Packet::Connect => "40".to_string(),
            Packet::Disconnect => "41".to_string(),
            Packet::ConnectError(message) => format!("44{}", json!({ "message": message })),
            Packet::Event { name, data } => format!("42{}", json!([name, data])),
        }
    }

    pub fn decode(frame: &str) -> Result<Self, PacketError> {
        let mut chars = frame.chars();
        let kind = chars.next().ok_or(PacketError::Empty)?;
        let rest = chars.as_str();

        match kind {
            '0' => serde_json::from_str(rest)
                .map(Packet::Open)
                .map_err(|e| PacketError::Malformed(format!("handshake: {e}"))),
            '1' => Ok(Packet::Close),
            '2' => Ok(Packet::Ping),
            '3' => Ok(Packet::Pong),
            '6' => Ok(Packet::Noop),
            '4' => decode_socket(rest),
            other => Err(PacketError::UnknownType(other)),
        }
    }
}

fn decode_socket(body: &str) -> Result<Packet, PacketError> {
    let mut chars = body.chars();
    let kind = chars.next().ok_or(PacketError::Empty)?;
    let payload = skip_ack_id(skip_namespace(chars.as_str()));

    match kind {
        '0' => Ok(Packet::Connect),
        '1' => Ok(Packet::Disconnect),
        '2' => decode_event(payload),
        '4' => {
            let message = serde_json::from_str::<Value>(payload)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| payload.to_string());
            Ok(Packet::ConnectError(message))
        }
        '3' => Err(PacketError::Unsupported("ack".into())),
        '5' | '6' => Err(PacketError::Unsupported("binary payload".into())),
        other => Err(PacketError::UnknownType(other)),
    }
}

fn skip_namespace(body: &str) -> &str {
    if body.starts_with('/') {
        match body.find(',') {
            Some(idx) => &body[idx + 1..],
            None => "",
        }
    } else {
        body
    }
}

fn skip_ack_id(body: &str) -> &str {
    body.trim_start_matches(|c: char| c.is_ascii_digit())
}

fn decode_event(payload: &str) -> Result<Packet, PacketError> {
    let values: Vec<Value> = serde_json::from_str(payload)
        .map_err(|e| PacketError::Malformed(format!("event: {e}")))?;

    let mut values = values.into_iter();
    let name = match values.next() {
        Some(Value::String(name)) => name,
        _ => return Err(PacketError::Malformed("event without a name".into())),
    };

    Ok(Packet::Event {
        name,
        data: values.next().unwrap_or(Value::Null),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_handshake() {
        let packet = Packet::decode(
            r#"0{"sid":"lv_VI97HAXpY6yYWAAAC","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#,
        )
        .unwrap();
        assert_eq!(
            packet,
            Packet::Open(Handshake {
                sid: "lv_VI97HAXpY6yYWAAAC".into(),
                ping_interval: 25000,
                ping_timeout: 20000,
            })
        );
    }

    #[test]
    fn decodes_event_with_namespace_and_ack_id() {
        let packet = Packet::decode(r#"42/chat,17["receive_message",{"order_id":5}]"#).unwrap();
        assert_eq!(packet, Packet::event("receive_message", json!({"order_id": 5})));
    }

    #[test]
    fn connect_ack_carries_sid_we_ignore() {
        assert_eq!(Packet::decode(r#"40{"sid":"abc"}"#).unwrap(), Packet::Connect);
        assert_eq!(Packet::decode("41").unwrap(), Packet::Disconnect);
        assert_eq!(Packet::decode("2").unwrap(), Packet::Ping);
    }

    #[test]
    fn encodes_client_frames() {
        assert_eq!(Packet::Connect.encode(), "40");
        assert_eq!(Packet::Pong.encode(), "3");
        assert_eq!(
            Packet::event("join", json!({"order_id": 5})).encode(),
            r#"42["join",{"order_id":5}]"#
        );
    }

    #[test]
    fn connect_error_message() {
        assert_eq!(
            Packet::decode(r#"44{"message":"Not authorized"}"#).unwrap(),
            Packet::ConnectError("Not authorized".into())
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(Packet::decode(""), Err(PacketError::Empty));
        assert_eq!(Packet::decode("9"), Err(PacketError::UnknownType('9')));
        assert!(matches!(
            Packet::decode("42{}"),
            Err(PacketError::Malformed(_))
        ));
        assert!(matches!(
            Packet::decode(r#"451-["x",{"_placeholder":true,"num":0}]"#),
            Err(PacketError::Unsupported(_))
        ));
    }
}
