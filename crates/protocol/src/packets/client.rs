//! Client -> Server message parsing.

use crate::ProtocolError;
use serde::Deserialize;
use serde_json::Value;

/// Parsed client message.
///
/// Field values are validated one by one: a bad field is dropped to `None`
/// (or `false`) while the rest of the message still applies.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    /// Request a new controlled snake.
    Join { name: Option<String> },
    /// Steering input.
    Input {
        /// Desired heading in radians, `None` if missing or not a finite number.
        heading: Option<f32>,
        /// Boost held.
        boost: bool,
    },
    /// Replace the current snake with a new one.
    Respawn { name: Option<String> },
}

/// Wire shape before per-field validation.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RawClientMessage {
    Join {
        #[serde(default)]
        name: Option<Value>,
    },
    Input {
        #[serde(default)]
        a: Option<Value>,
        #[serde(default)]
        b: Option<Value>,
    },
    Respawn {
        #[serde(default)]
        name: Option<Value>,
    },
}

impl ClientMessage {
    /// Parse a client message from a text frame.
    ///
    /// Unknown `type` values and unparseable JSON are errors; callers drop them.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let raw: RawClientMessage = serde_json::from_str(text)?;
        Ok(raw.into())
    }

    /// Parse a client message from a binary frame holding UTF-8 JSON.
    pub fn parse_bytes(data: &[u8]) -> Result<Self, ProtocolError> {
        let text = std::str::from_utf8(data).map_err(|_| ProtocolError::InvalidUtf8)?;
        Self::parse(text)
    }
}

impl From<RawClientMessage> for ClientMessage {
    fn from(raw: RawClientMessage) -> Self {
        match raw {
            RawClientMessage::Join { name } => ClientMessage::Join {
                name: string_field(name),
            },
            RawClientMessage::Input { a, b } => ClientMessage::Input {
                heading: finite_field(a),
                boost: b.as_ref().is_some_and(truthy),
            },
            RawClientMessage::Respawn { name } => ClientMessage::Respawn {
                name: string_field(name),
            },
        }
    }
}

fn string_field(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

fn finite_field(value: Option<Value>) -> Option<f32> {
    let n = value?.as_f64()? as f32;
    n.is_finite().then_some(n)
}

/// Loose boolean coercion for flags sent by browser clients.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_join() {
        let msg = ClientMessage::parse(r#"{"type":"join","name":"Rex"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Join {
                name: Some("Rex".to_string())
            }
        );

        let msg = ClientMessage::parse(r#"{"type":"join"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Join { name: None });
    }

    #[test]
    fn test_parse_input() {
        let msg = ClientMessage::parse(r#"{"type":"input","a":1.5,"b":true}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Input {
                heading: Some(1.5),
                boost: true
            }
        );
    }

    #[test]
    fn test_bad_heading_keeps_boost() {
        let msg = ClientMessage::parse(r#"{"type":"input","a":"left","b":1}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Input {
                heading: None,
                boost: true
            }
        );

        // Too large for f32, becomes infinite after narrowing.
        let msg = ClientMessage::parse(r#"{"type":"input","a":1e300,"b":false}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Input {
                heading: None,
                boost: false
            }
        );
    }

    #[test]
    fn test_non_string_name_is_dropped() {
        let msg = ClientMessage::parse(r#"{"type":"respawn","name":42}"#).unwrap();
        assert_eq!(msg, ClientMessage::Respawn { name: None });
    }

    #[test]
    fn test_boost_truthiness() {
        assert!(!truthy(&Value::Null));
        assert!(!truthy(&serde_json::json!(0)));
        assert!(!truthy(&serde_json::json!("")));
        assert!(truthy(&serde_json::json!("yes")));
        assert!(truthy(&serde_json::json!([])));
        assert!(truthy(&serde_json::json!(2)));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(ClientMessage::parse("not json").is_err());
        assert!(ClientMessage::parse(r#"{"type":"chat","text":"hi"}"#).is_err());
        assert!(ClientMessage::parse(r#"{"name":"Rex"}"#).is_err());
        assert!(matches!(
            ClientMessage::parse_bytes(&[0xff, 0xfe]),
            Err(ProtocolError::InvalidUtf8)
        ));
    }

    #[test]
    fn test_parse_bytes() {
        let msg = ClientMessage::parse_bytes(br#"{"type":"respawn","name":"Ana"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Respawn {
                name: Some("Ana".to_string())
            }
        );
    }
}
