//! Multi-valued property states built on the value-list codec.

use crate::{
    codec::{Payload, ValueListCodec},
    convert::Converter,
    error::Result,
};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Type tag for a property's declared value type. Array variants hold an
/// ordered sequence of scalars instead of exactly one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    String,
    Boolean,
    Long,
    Double,
    Date,
    /// An ordered sequence of strings.
    Strings,
}

impl Type {
    /// True if properties of this type hold a sequence of values.
    pub fn is_array(self) -> bool {
        matches!(self, Type::Strings)
    }
}

/// The contract every multi-valued property implementation exposes to the
/// wider property/type system.
pub trait PropertyState {
    /// The property's name, fixed at creation.
    fn name(&self) -> &str;

    /// The property's declared type tag.
    fn ptype(&self) -> Type;

    /// The decoded value sequence, in original order.
    fn values(&self) -> Result<&[String]>;

    /// A typed view over one already-decoded scalar value.
    fn converter<'a>(&self, raw: &'a str) -> Converter<'a>;
}

/// A named, immutable property holding an ordered sequence of strings as one
/// compressed payload.
///
/// The payload is computed exactly once at construction. Reads decode lazily
/// and publish the result through a single-assignment cell, so a constructed
/// property is safe to share across threads without further synchronization.
#[derive(Debug)]
pub struct MultiStringProperty {
    name: String,
    payload: Payload,
    codec: ValueListCodec,
    values: OnceLock<Vec<String>>,
}

impl MultiStringProperty {
    /// Create a property from a value sequence, encoding it immediately.
    /// Fails only if the codec's compression step fails.
    pub fn new<S: AsRef<str>>(
        name: impl Into<String>,
        values: &[S],
        codec: &ValueListCodec,
    ) -> Result<Self> {
        let payload = codec.encode(values)?;
        Ok(Self {
            name: name.into(),
            payload,
            codec: *codec,
            values: OnceLock::new(),
        })
    }

    /// Rehydrate a property from an already-encoded payload, e.g. one read
    /// back out of storage. The payload is not validated here; a corrupt one
    /// surfaces on the first [`values`][Self::values] call.
    pub fn from_payload(
        name: impl Into<String>,
        payload: Payload,
        codec: &ValueListCodec,
    ) -> Self {
        Self {
            name: name.into(),
            payload,
            codec: *codec,
            values: OnceLock::new(),
        }
    }

    /// The encoded payload this property owns.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

impl PropertyState for MultiStringProperty {
    fn name(&self) -> &str {
        &self.name
    }

    fn ptype(&self) -> Type {
        Type::Strings
    }

    fn values(&self) -> Result<&[String]> {
        if let Some(values) = self.values.get() {
            return Ok(values);
        }
        let decoded = self.codec.decode(&self.payload)?;
        // Two threads may race to decode; the cell keeps whichever published
        // first and both see the same sequence.
        Ok(self.values.get_or_init(|| decoded))
    }

    fn converter<'a>(&self, raw: &'a str) -> Converter<'a> {
        Converter::new(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn prop(values: &[&str]) -> MultiStringProperty {
        let codec = ValueListCodec::default();
        MultiStringProperty::new("test", values, &codec).unwrap()
    }

    #[test]
    fn type_tag() {
        let p = prop(&["hello"]);
        assert_eq!(p.ptype(), Type::Strings);
        assert!(p.ptype().is_array());
        assert!(!Type::String.is_array());
        assert_eq!(p.name(), "test");
    }

    #[test]
    fn idempotent_reads() {
        let p = prop(&["a", "b,c", ""]);
        let first = p.values().unwrap().to_vec();
        let second = p.values().unwrap();
        assert_eq!(first, second);
        assert_eq!(first, vec!["a", "b,c", ""]);
    }

    #[test]
    fn empty_property() {
        let p = prop(&[]);
        assert!(p.payload().is_empty());
        assert!(p.values().unwrap().is_empty());
    }

    #[test]
    fn converter_gets_raw_value_unchanged() {
        let p = prop(&["hello"]);
        let raw = &p.values().unwrap()[0];
        let conv = p.converter(raw);
        assert_eq!(conv.as_str(), "hello");
    }

    #[test]
    fn converter_coerces_decoded_scalars() {
        let p = prop(&["true", "17", "2024-06-01T12:00:00Z"]);
        let values = p.values().unwrap().to_vec();
        assert_eq!(p.converter(&values[0]).to_bool().unwrap(), true);
        assert_eq!(p.converter(&values[1]).to_i64().unwrap(), 17);
        assert!(p.converter(&values[2]).to_date().is_ok());
    }

    #[test]
    fn rehydrated_payload_matches() {
        let codec = ValueListCodec::default();
        let original = prop(&["x", "y"]);
        let restored =
            MultiStringProperty::from_payload("test", original.payload().clone(), &codec);
        assert_eq!(restored.values().unwrap(), original.values().unwrap());
    }

    #[test]
    fn payload_survives_serde() {
        let codec = ValueListCodec::default();
        let original = prop(&["a", "b"]);
        let json = serde_json::to_string(original.payload()).unwrap();
        let payload: Payload = serde_json::from_str(&json).unwrap();
        let restored = MultiStringProperty::from_payload("test", payload, &codec);
        assert_eq!(restored.values().unwrap(), ["a", "b"]);
    }

    #[test]
    fn concurrent_reads() {
        let p = Arc::new(prop(&["one", "two", "three"]));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let p = Arc::clone(&p);
                thread::spawn(move || p.values().unwrap().to_vec())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), ["one", "two", "three"]);
        }
    }
}
