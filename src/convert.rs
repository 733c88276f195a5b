use crate::error::{Error, Result};
use chrono::{DateTime, FixedOffset};

/// Typed view over one decoded scalar string.
///
/// A converter never re-reads the property it came from; it coerces exactly
/// the already-materialized value it was handed. Every coercion either
/// succeeds completely or fails with [`Error::FailConvert`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Converter<'a> {
    raw: &'a str,
}

impl<'a> Converter<'a> {
    /// Wrap a decoded scalar string for typed read-back.
    pub fn new(raw: &'a str) -> Self {
        Self { raw }
    }

    /// The scalar as it was stored, unchanged.
    pub fn as_str(&self) -> &'a str {
        self.raw
    }

    /// Coerce to a boolean. Only the literal strings `true` and `false` are
    /// accepted.
    pub fn to_bool(&self) -> Result<bool> {
        self.raw
            .parse()
            .map_err(|_| self.fail("a boolean"))
    }

    /// Coerce to a signed 64-bit integer.
    pub fn to_i64(&self) -> Result<i64> {
        self.raw.parse().map_err(|_| self.fail("an integer"))
    }

    /// Coerce to an unsigned 64-bit integer.
    pub fn to_u64(&self) -> Result<u64> {
        self.raw
            .parse()
            .map_err(|_| self.fail("an unsigned integer"))
    }

    /// Coerce to a 64-bit float.
    pub fn to_f64(&self) -> Result<f64> {
        self.raw.parse().map_err(|_| self.fail("a float"))
    }

    /// Coerce to a date, parsed from RFC 3339 form.
    pub fn to_date(&self) -> Result<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(self.raw).map_err(|_| self.fail("an RFC 3339 date"))
    }

    fn fail(&self, target: &str) -> Error {
        Error::FailConvert(format!("'{}' is not {}", self.raw, target))
    }
}
