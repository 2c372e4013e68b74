//! W3C WebDriver wire types
//!
//! See: https://www.w3.org/TR/webdriver2/

use serde::Deserialize;
use serde_json::Value;

use super::ElementHandle;

/// Magic key identifying an element reference in WebDriver responses
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// `value` of a successful new-session response
#[derive(Debug, Clone, Deserialize)]
pub struct NewSessionValue {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(default)]
    pub capabilities: Value,
}

/// `value` of an error response
#[derive(Debug, Clone, Deserialize)]
pub struct WireError {
    pub error: String,
    #[serde(default)]
    pub message: String,
}

/// Wire error code for an element that does not exist (yet)
pub const NO_SUCH_ELEMENT: &str = "no such element";

/// Extract an element handle from a find-element response `value`
pub fn parse_element(value: &Value) -> Option<ElementHandle> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(|id| ElementHandle(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn element_reference_uses_the_magic_key() {
        let value = json!({ ELEMENT_KEY: "elem-42" });
        assert_eq!(parse_element(&value), Some(ElementHandle("elem-42".to_string())));
        assert_eq!(parse_element(&json!({ "element": "elem-42" })), None);
    }

    #[test]
    fn new_session_value_parses() {
        let value: NewSessionValue = serde_json::from_value(json!({
            "sessionId": "abc123",
            "capabilities": { "browserName": "chrome" }
        }))
        .unwrap();
        assert_eq!(value.session_id, "abc123");
    }

    #[test]
    fn wire_error_parses_without_message() {
        let err: WireError = serde_json::from_value(json!({ "error": NO_SUCH_ELEMENT })).unwrap();
        assert_eq!(err.error, NO_SUCH_ELEMENT);
        assert!(err.message.is_empty());
    }
}
