//! Content-type inference for plaintexts that carry no type tag.
//!
//! The envelope does not record whether the sealed text was JSON. Both the
//! encrypt and decrypt paths therefore classify text the same way: if it
//! parses as JSON it is [`Content::Structured`], otherwise [`Content::Text`].
//!
//! Structured values keep their object key order and have integral floats
//! collapsed to integers (`1.0` becomes `1`), so the sealed text matches what
//! `JSON.stringify(JSON.parse(..))` yields in the JavaScript runtimes.

use serde_json::Value;

use crate::error::CodecError;

/// Plaintext classified as a structured JSON value or raw text.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Structured(Value),
    Text(String),
}

/// Wire tag reported alongside encrypted/decrypted data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Object,
    Text,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Object => "object",
            ContentKind::Text => "text",
        }
    }
}

impl Content {
    /// Classify caller input for encryption.
    ///
    /// Non-string JSON is structured. A string is structured if it parses as
    /// JSON, and raw text otherwise.
    pub fn classify(input: Value) -> Self {
        match input {
            Value::String(s) => Self::from_text(s),
            other => Content::Structured(normalize_numbers(other)),
        }
    }

    /// Classify decrypted (or caller-supplied) text.
    pub fn from_text(text: String) -> Self {
        match serde_json::from_str::<Value>(&text) {
            Ok(v) => Content::Structured(normalize_numbers(v)),
            Err(_) => Content::Text(text),
        }
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            Content::Structured(_) => ContentKind::Object,
            Content::Text(_) => ContentKind::Text,
        }
    }

    /// The text that gets sealed: canonical JSON for structured values.
    pub fn to_plaintext(&self) -> Result<String, CodecError> {
        match self {
            Content::Structured(v) => serde_json::to_string(v)
                .map_err(|e| CodecError::format(format!("value cannot be serialised as JSON: {e}"))),
            Content::Text(s) => Ok(s.clone()),
        }
    }

    /// Convert into a JSON value for responses; text becomes a JSON string.
    pub fn into_value(self) -> Value {
        match self {
            Content::Structured(v) => v,
            Content::Text(s) => Value::String(s),
        }
    }
}

/// Largest magnitude at which every integer is exactly representable as f64.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn normalize_numbers(value: Value) -> Value {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => {
                Value::from(f as i64)
            }
            _ => Value::Number(n),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_numbers).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, normalize_numbers(v)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn objects_and_arrays_are_structured() {
        assert_eq!(Content::classify(json!({"a": 1})).kind(), ContentKind::Object);
        assert_eq!(Content::classify(json!([1, 2])).kind(), ContentKind::Object);
        assert_eq!(Content::classify(json!(true)).kind(), ContentKind::Object);
    }

    #[test]
    fn json_strings_are_parsed() {
        let c = Content::classify(json!(r#"{"user":"alice"}"#));
        assert_eq!(c, Content::Structured(json!({"user": "alice"})));
    }

    #[test]
    fn plain_strings_are_text() {
        let c = Content::classify(json!("hello world"));
        assert_eq!(c, Content::Text("hello world".into()));
        assert_eq!(c.kind().as_str(), "text");
    }

    #[test]
    fn structured_plaintext_is_compact_json() {
        let c = Content::Structured(json!({"a": 1, "b": [true, null, "x"]}));
        assert_eq!(c.to_plaintext().unwrap(), r#"{"a":1,"b":[true,null,"x"]}"#);
    }

    #[test]
    fn key_order_is_preserved() {
        let c = Content::classify(json!(r#"{"b":1,"a":{"z":0,"y":1}}"#));
        assert_eq!(c.to_plaintext().unwrap(), r#"{"b":1,"a":{"z":0,"y":1}}"#);
    }

    #[test]
    fn integral_floats_collapse_to_integers() {
        let c = Content::classify(json!("[1.0, -0.0, 2.5, 1e3]"));
        assert_eq!(c.to_plaintext().unwrap(), "[1,0,2.5,1000]");

        let c = Content::classify(json!({"n": 4.0}));
        assert_eq!(c.to_plaintext().unwrap(), r#"{"n":4}"#);

        assert_eq!(Content::classify(json!("1.0")).to_plaintext().unwrap(), "1");
    }

    #[test]
    fn into_value() {
        assert_eq!(Content::Text("x".into()).into_value(), json!("x"));
        assert_eq!(Content::Structured(json!([1])).into_value(), json!([1]));
    }
}
