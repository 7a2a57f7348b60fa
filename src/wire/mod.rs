//! # Wire Codec
//!
//! Every request and response body exchanged between the services is a single *flat* JSON
//! object: string keys mapped to strings, numbers, booleans or null. No nested objects, no
//! arrays, and no string that would need an escaped delimiter (`"` or `\`).
//!
//! [`decode`] tokenises with `serde_json` and rejects anything outside that subset with
//! [`WireError::MalformedBody`]. Values stay available as their literal text (`"3"`,
//! `"true"`, unquoted strings), and typed access goes through [`FlatObject::parse`], which
//! reports [`FieldError`] instead of panicking. [`encode`] writes keys in insertion order, so
//! the same object always produces the same bytes.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::{Number, Value};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Errors produced while decoding a body.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WireError {
    #[error("malformed body: {0}")]
    MalformedBody(String),
}

/// Errors produced by typed field access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("missing field `{0}`")]
    Missing(String),
    #[error("invalid value {value:?} for field `{key}`")]
    Invalid { key: String, value: String },
}

/// A single value in a flat object.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Text(String),
    Number(Number),
    Bool(bool),
    Null,
}

impl WireValue {
    /// The value's literal form: strings without quotes, everything else as written.
    pub fn literal(&self) -> Cow<'_, str> {
        match self {
            WireValue::Text(s) => Cow::Borrowed(s),
            WireValue::Number(n) => Cow::Owned(n.to_string()),
            WireValue::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            WireValue::Null => Cow::Borrowed("null"),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, WireValue::Text(_))
    }
}

impl fmt::Display for WireValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireValue::Text(s) => write!(f, "{}", Value::String(s.clone())),
            WireValue::Number(n) => write!(f, "{n}"),
            WireValue::Bool(b) => write!(f, "{b}"),
            WireValue::Null => f.write_str("null"),
        }
    }
}

/// An ordered, flat JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatObject {
    fields: Vec<(String, WireValue)>,
}

impl FlatObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field. A replaced field keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: WireValue) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn with_text(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, WireValue::Text(value.into()));
        self
    }

    pub fn with_int(mut self, key: impl Into<String>, value: i64) -> Self {
        self.insert(key, WireValue::Number(Number::from(value)));
        self
    }

    /// Adds a float field; non-finite values have no JSON form and are written as null.
    pub fn with_float(mut self, key: impl Into<String>, value: f64) -> Self {
        let value = Number::from_f64(value).map_or(WireValue::Null, WireValue::Number);
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&WireValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// The literal form of a field.
    pub fn get_str(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).map(WireValue::literal)
    }

    /// Parse a field's literal form into `T`.
    pub fn parse<T: FromStr>(&self, key: &str) -> Result<T, FieldError> {
        let raw = self
            .get_str(key)
            .ok_or_else(|| FieldError::Missing(key.to_string()))?;
        raw.trim().parse::<T>().map_err(|_| FieldError::Invalid {
            key: key.to_string(),
            value: raw.into_owned(),
        })
    }

    /// Like [`FlatObject::parse`], but an absent field is `Ok(None)`.
    pub fn parse_optional<T: FromStr>(&self, key: &str) -> Result<Option<T>, FieldError> {
        if self.contains_key(key) {
            self.parse(key).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &WireValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for FlatObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}:{}", Value::String(key.clone()), value)?;
        }
        f.write_str("}")
    }
}

fn has_escaped_delimiter(s: &str) -> bool {
    s.contains('"') || s.contains('\\')
}

struct FlatObjectVisitor;

impl<'de> Visitor<'de> for FlatObjectVisitor {
    type Value = FlatObject;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a flat JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<FlatObject, A::Error> {
        let mut object = FlatObject::new();
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            if has_escaped_delimiter(&key) {
                return Err(de::Error::custom(format!("escaped delimiter in key {key:?}")));
            }
            if object.contains_key(&key) {
                return Err(de::Error::custom(format!("duplicate key {key:?}")));
            }
            let value = match value {
                Value::String(s) if has_escaped_delimiter(&s) => {
                    return Err(de::Error::custom(format!("escaped delimiter in `{key}`")));
                }
                Value::String(s) => WireValue::Text(s),
                Value::Number(n) => WireValue::Number(n),
                Value::Bool(b) => WireValue::Bool(b),
                Value::Null => WireValue::Null,
                Value::Array(_) | Value::Object(_) => {
                    return Err(de::Error::custom(format!("nested value in `{key}`")));
                }
            };
            object.fields.push((key, value));
        }
        Ok(object)
    }
}

impl<'de> Deserialize<'de> for FlatObject {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(FlatObjectVisitor)
    }
}

/// Decode exactly one flat JSON object.
pub fn decode(bytes: &[u8]) -> Result<FlatObject, WireError> {
    serde_json::from_slice(bytes).map_err(|e| WireError::MalformedBody(e.to_string()))
}

/// Encode an object; keys appear in insertion order.
pub fn encode(object: &FlatObject) -> Vec<u8> {
    object.to_string().into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_literals_as_strings() {
        let body = br#"{"command":"place order","user_id":1,"quantity":3,"ok":true,"note":null}"#;
        let object = decode(body).unwrap();
        assert_eq!(object.get_str("command").as_deref(), Some("place order"));
        assert_eq!(object.get_str("user_id").as_deref(), Some("1"));
        assert_eq!(object.get_str("ok").as_deref(), Some("true"));
        assert_eq!(object.get_str("note").as_deref(), Some("null"));
        assert_eq!(object.parse::<i64>("quantity"), Ok(3));
    }

    #[test]
    fn rejects_non_flat_input() {
        for body in [
            &br#"{"a":{"b":1}}"#[..],
            br#"{"a":[1,2]}"#,
            br#"[1,2]"#,
            br#""text""#,
            br#"{"a":1}{"b":2}"#,
            br#"{"a":1"#,
            br#"{"a":"x\"y"}"#,
            br#"{"a":1,"a":2}"#,
            b"",
        ] {
            assert!(
                matches!(decode(body), Err(WireError::MalformedBody(_))),
                "accepted {:?}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn typed_access_reports_errors() {
        let object = decode(br#"{"quantity":"many","price":1.5}"#).unwrap();
        assert_eq!(
            object.parse::<i64>("quantity"),
            Err(FieldError::Invalid {
                key: "quantity".into(),
                value: "many".into()
            })
        );
        assert_eq!(
            object.parse::<i64>("user_id"),
            Err(FieldError::Missing("user_id".into()))
        );
        assert_eq!(object.parse::<f64>("price"), Ok(1.5));
        assert_eq!(object.parse_optional::<i64>("user_id"), Ok(None));
    }

    #[test]
    fn encodes_in_insertion_order() {
        let object = FlatObject::new()
            .with_int("product_id", 7)
            .with_int("user_id", 1)
            .with_int("quantity", 3)
            .with_text("status", "Success");
        assert_eq!(
            String::from_utf8(encode(&object)).unwrap(),
            r#"{"product_id":7,"user_id":1,"quantity":3,"status":"Success"}"#
        );
    }

    #[test]
    fn replacing_a_field_keeps_its_position() {
        let mut object = FlatObject::new().with_int("a", 1).with_int("b", 2);
        object.insert("a", WireValue::Bool(false));
        assert_eq!(object.to_string(), r#"{"a":false,"b":2}"#);
        assert_eq!(FlatObject::new().to_string(), "{}");
    }
}
