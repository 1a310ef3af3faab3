//! JSON document ingestion
//!
//! Turns JSON text into an ordered value tree. Object members keep their
//! source order and every duplicate name is retained, which
//! `serde_json::Value` cannot promise. Numbers keep the exact text they
//! were written with (serde_json's `arbitrary_precision`).

use crate::error::Result;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use std::fmt;

/// A parsed JSON value
#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    Null,
    Bool(bool),
    /// Number in its textual form
    Number(String),
    String(String),
    Array(Vec<JsonValue>),
    /// Members in source order, duplicates included
    Object(Vec<(String, JsonValue)>),
}

impl JsonValue {
    pub fn is_container(&self) -> bool {
        matches!(self, JsonValue::Array(_) | JsonValue::Object(_))
    }
}

/// Map key serde_json uses to hand over a number as its raw text
const NUMBER_TOKEN: &str = "$serde_json::private::Number";

struct JsonValueVisitor;

impl<'de> Visitor<'de> for JsonValueVisitor {
    type Value = JsonValue;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E>(self, v: bool) -> std::result::Result<JsonValue, E> {
        Ok(JsonValue::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> std::result::Result<JsonValue, E> {
        Ok(JsonValue::Number(v.to_string()))
    }

    fn visit_u64<E>(self, v: u64) -> std::result::Result<JsonValue, E> {
        Ok(JsonValue::Number(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<JsonValue, E> {
        // only reached from deserializers without raw number text
        serde_json::Number::from_f64(v)
            .map(|n| JsonValue::Number(n.to_string()))
            .ok_or_else(|| E::custom("non-finite number"))
    }

    fn visit_str<E>(self, v: &str) -> std::result::Result<JsonValue, E> {
        Ok(JsonValue::String(v.to_owned()))
    }

    fn visit_string<E>(self, v: String) -> std::result::Result<JsonValue, E> {
        Ok(JsonValue::String(v))
    }

    fn visit_unit<E>(self) -> std::result::Result<JsonValue, E> {
        Ok(JsonValue::Null)
    }

    fn visit_none<E>(self) -> std::result::Result<JsonValue, E> {
        Ok(JsonValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<JsonValue, D::Error> {
        JsonValue::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<JsonValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(JsonValue::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<JsonValue, A::Error> {
        let Some(first) = map.next_key::<String>()? else {
            return Ok(JsonValue::Object(Vec::new()));
        };
        if first == NUMBER_TOKEN {
            return Ok(JsonValue::Number(map.next_value::<String>()?));
        }

        let mut members = Vec::with_capacity(map.size_hint().unwrap_or(0) + 1);
        members.push((first, map.next_value()?));
        while let Some(name) = map.next_key::<String>()? {
            let value = map.next_value()?;
            members.push((name, value));
        }
        Ok(JsonValue::Object(members))
    }
}

impl<'de> Deserialize<'de> for JsonValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(JsonValueVisitor)
    }
}

/// Parse JSON text. Malformed input is reported as-is, with no recovery.
pub fn parse(text: &str) -> Result<JsonValue> {
    Ok(serde_json::from_str(text)?)
}
