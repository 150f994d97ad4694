//! # Record Payloads
//!
//! A payload is either structured JSON data or a raw string. Raw strings are
//! what a caller ends up with when an edit is not valid JSON: they are kept
//! verbatim instead of being rejected.
//!
//! ## Canonical encoding
//!
//! Digests are computed over [`Payload::canonical`]:
//!
//! - `Raw(s)` encodes as `s`, byte for byte.
//! - `Structured(v)` encodes as compact JSON. Object keys are sorted by
//!   their UTF-8 bytes at every depth, there is no insignificant whitespace,
//!   strings use serde_json's escaping, and numbers use serde_json's
//!   shortest round-trip formatting.
//!
//! The key sort is done here rather than relying on the map type inside
//! `serde_json::Value`, which changes if any crate in the build enables the
//! `preserve_order` feature.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{LedgerError, LedgerResult};

/// The caller-supplied content of a record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Payload {
    /// Structured data, digested through the canonical JSON encoding.
    Structured(Value),
    /// A raw string, digested verbatim.
    Raw(String),
}

impl Payload {
    /// Interpret user-entered text: valid JSON becomes `Structured`,
    /// anything else is kept as `Raw`.
    pub fn parse(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Payload::Structured(value),
            Err(_) => Payload::Raw(text.to_string()),
        }
    }

    /// Convert any serializable value into a structured payload.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Serialization`] when the value has no JSON
    /// representation, e.g. a map keyed by non-string values.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> LedgerResult<Self> {
        let value = serde_json::to_value(value)?;
        Ok(Payload::Structured(value))
    }

    /// Render the canonical text that feeds the digest.
    pub fn canonical(&self) -> LedgerResult<String> {
        match self {
            Payload::Raw(s) => Ok(s.clone()),
            Payload::Structured(value) => {
                let mut out = String::new();
                write_canonical(value, &mut out)?;
                Ok(out)
            }
        }
    }

    /// Returns true for raw string payloads.
    pub fn is_raw(&self) -> bool {
        matches!(self, Payload::Raw(_))
    }

    /// Text suitable for showing to a person: raw strings as-is, structured
    /// data in its canonical form.
    pub fn display_text(&self) -> String {
        match self {
            Payload::Raw(s) => s.clone(),
            Payload::Structured(v) => {
                let mut out = String::new();
                match write_canonical(v, &mut out) {
                    Ok(()) => out,
                    Err(_) => v.to_string(),
                }
            }
        }
    }
}

fn write_canonical(value: &Value, out: &mut String) -> LedgerResult<()> {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
            out.push('{');
            for (i, (key, val)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(key)?);
                out.push(':');
                write_canonical(val, out)?;
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out)?;
            }
            out.push(']');
        }
        scalar => out.push_str(&serde_json::to_string(scalar).map_err(LedgerError::from)?),
    }
    Ok(())
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Raw(s.to_string())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Raw(s)
    }
}

impl From<Value> for Payload {
    fn from(v: Value) -> Self {
        Payload::Structured(v)
    }
}
