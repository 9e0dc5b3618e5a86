//! Inbound control messages sent after the initial request.

use serde_json::{Map, Value};

/// A client command such as `{"action": "cancel"}`.
///
/// Any fields besides `action` are kept as an opaque payload for handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionMessage {
    pub action: String,
    pub payload: Map<String, Value>,
}

/// Why an inbound frame could not be read as an action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionParseError {
    #[error("message is not a JSON object: {0}")]
    NotAnObject(String),

    #[error("message has no string `action` field")]
    MissingAction,
}

impl ActionMessage {
    pub fn parse(text: &str) -> Result<Self, ActionParseError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ActionParseError::NotAnObject(e.to_string()))?;
        let Value::Object(mut payload) = value else {
            return Err(ActionParseError::NotAnObject(
                "expected a JSON object".to_string(),
            ));
        };

        match payload.remove("action") {
            Some(Value::String(action)) => Ok(Self { action, payload }),
            _ => Err(ActionParseError::MissingAction),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_action_and_keeps_payload() {
        let msg = ActionMessage::parse(r#"{"action":"cancel","reason":"user"}"#).unwrap();
        assert_eq!(msg.action, "cancel");
        assert_eq!(msg.payload["reason"], "user");
        assert!(!msg.payload.contains_key("action"));
    }

    #[test]
    fn missing_or_non_string_action() {
        assert_eq!(
            ActionMessage::parse(r#"{"stock_ticker":"AAPL"}"#),
            Err(ActionParseError::MissingAction)
        );
        assert_eq!(
            ActionMessage::parse(r#"{"action":42}"#),
            Err(ActionParseError::MissingAction)
        );
    }

    #[test]
    fn non_object_frames() {
        assert!(matches!(
            ActionMessage::parse("cancel"),
            Err(ActionParseError::NotAnObject(_))
        ));
        assert!(matches!(
            ActionMessage::parse(r#""cancel""#),
            Err(ActionParseError::NotAnObject(_))
        ));
    }
}
