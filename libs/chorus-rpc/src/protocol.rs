use super::types::ChorusRpcResult;
use chorus_core::{Dispatch, Playback};
use serde::{Deserialize, Serialize};

/// Frames sent by an endpoint over its websocket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    Join,
}

/// Frames sent by the coordinator over an endpoint's websocket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    VoiceAssignment {
        voice: String,
    },
    Playback {
        phrase: String,
        /// Coordinator epoch milliseconds.
        time: i64,
        #[serde(rename = "isSimultaneous")]
        is_simultaneous: bool,
    },
}

impl ClientMessage {
    pub fn from_text(text: &str) -> ChorusRpcResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_text(&self) -> ChorusRpcResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl ServerMessage {
    pub fn from_text(text: &str) -> ChorusRpcResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_text(&self) -> ChorusRpcResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<Dispatch> for ServerMessage {
    fn from(value: Dispatch) -> Self {
        match value {
            Dispatch::VoiceAssignment(voice) => Self::VoiceAssignment { voice },
            Dispatch::Playback(Playback {
                text,
                time,
                simultaneous,
            }) => Self::Playback {
                phrase: text,
                time,
                is_simultaneous: simultaneous,
            },
        }
    }
}

/// Body of `POST /timesync`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimesyncRequest {
    pub id: u64,
    /// Endpoint clock when the request left, epoch milliseconds.
    pub time: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimesyncResponse {
    pub id: u64,
    /// Coordinator clock when the request was answered, epoch milliseconds.
    pub result: i64,
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ChorusRpcError;
    use assert_json_diff::assert_json_eq;
    use serde_json::json;

    #[test]
    fn join_wire_format() {
        assert_json_eq!(
            serde_json::to_value(ClientMessage::Join).unwrap(),
            json!({ "type": "join" })
        );
        assert_eq!(
            ClientMessage::from_text(r#"{"type":"join"}"#).unwrap(),
            ClientMessage::Join
        );
    }

    #[test]
    fn dispatch_wire_format() {
        let voice = ServerMessage::from(Dispatch::VoiceAssignment("Moira".into()));
        assert_json_eq!(
            serde_json::to_value(&voice).unwrap(),
            json!({ "type": "voice-assignment", "voice": "Moira" })
        );

        let playback = ServerMessage::from(Dispatch::Playback(Playback {
            text: "We are taking control.".into(),
            time: 1_700_000_001_000,
            simultaneous: true,
        }));
        assert_json_eq!(
            serde_json::to_value(&playback).unwrap(),
            json!({
                "type": "playback",
                "phrase": "We are taking control.",
                "time": 1_700_000_001_000_i64,
                "isSimultaneous": true
            })
        );
    }

    #[test]
    fn malformed_frames_are_errors() {
        for text in [
            "",
            "not json",
            r#"{"type":"leave"}"#,
            r#"{"voice":"Alex"}"#,
            r#"{"type":"playback","phrase":"x"}"#,
        ] {
            assert!(matches!(
                ServerMessage::from_text(text),
                Err(ChorusRpcError::Json(_))
            ));
        }
        assert!(ClientMessage::from_text(r#"{"type":"playback"}"#).is_err());
    }

    #[test]
    fn timesync_wire_format() {
        assert_json_eq!(
            serde_json::to_value(TimesyncRequest { id: 7, time: 42 }).unwrap(),
            json!({ "id": 7, "time": 42 })
        );
        let response: TimesyncResponse =
            serde_json::from_str(r#"{"id":7,"result":1700000000000}"#).unwrap();
        assert_eq!(
            response,
            TimesyncResponse {
                id: 7,
                result: 1_700_000_000_000
            }
        );
    }
}
