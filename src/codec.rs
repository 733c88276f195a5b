//! Lossless encoding of an ordered string sequence into one compressed blob.
//!
//! A value list is framed before compression so that decoding can recover the
//! exact original boundaries, no matter what bytes the values themselves
//! contain. Joining with a fixed separator cannot do this: `["b,c"]` and
//! `["b", "c"]` would collapse into the same bytes. The framed layout is:
//!
//! 1. 4-byte little-endian count of values
//! 2. For each value: 4-byte little-endian byte length, then the UTF-8 bytes
//!
//! The framed buffer then goes through the zstd collaborator. An empty value
//! list never touches the compressor at all; it is stored as the
//! [`Payload::Empty`] sentinel. A list holding a single empty string still
//! frames to a non-empty buffer, so the two cases stay distinguishable.

use crate::{
    compress::Compress,
    error::{Error, Result},
    MAX_DECODED_SIZE,
};
use byteorder::{LittleEndian, ReadBytesExt};
use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;

/// The encoded form of a property's value list. Set exactly once when the
/// owning property is constructed and never mutated afterward.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    /// The empty value list. No compression was invoked to produce this.
    Empty,
    /// A framed, zstd-compressed value list.
    Compressed(ByteBuf),
}

impl Payload {
    /// True if this is the empty-list sentinel.
    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }

    /// The compressed bytes, if any.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Payload::Empty => None,
            Payload::Compressed(buf) => Some(buf.as_slice()),
        }
    }

    /// Stored size of the payload in bytes.
    pub fn size(&self) -> usize {
        self.as_bytes().map_or(0, <[u8]>::len)
    }
}

/// Stateless encoder/decoder pairing the value framing with a shared,
/// read-only compression configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ValueListCodec {
    compress: Compress,
}

impl ValueListCodec {
    /// Create a codec using the given compression settings.
    pub fn new(compress: Compress) -> Self {
        Self { compress }
    }

    /// Encode an ordered sequence of strings into a payload, such that
    /// [`decode`][Self::decode] recovers the exact sequence.
    pub fn encode<S: AsRef<str>>(&self, values: &[S]) -> Result<Payload> {
        if values.is_empty() {
            return Ok(Payload::Empty);
        }

        let total: usize = 4 + values
            .iter()
            .map(|v| 4 + v.as_ref().len())
            .sum::<usize>();
        if total > MAX_DECODED_SIZE || values.len() > u32::MAX as usize {
            return Err(Error::LengthTooLong {
                max: MAX_DECODED_SIZE,
                actual: total,
            });
        }

        let mut framed = Vec::with_capacity(total);
        framed.extend_from_slice(&(values.len() as u32).to_le_bytes());
        for value in values {
            let value = value.as_ref();
            framed.extend_from_slice(&(value.len() as u32).to_le_bytes());
            framed.extend_from_slice(value.as_bytes());
        }

        let compressed = self
            .compress
            .compress(&framed)
            .map_err(Error::FailCompress)?;
        Ok(Payload::Compressed(ByteBuf::from(compressed)))
    }

    /// Decode a payload back into the ordered sequence of strings it was
    /// encoded from. Never returns a partial sequence: any decompression or
    /// framing fault fails the whole call.
    pub fn decode(&self, payload: &Payload) -> Result<Vec<String>> {
        let bytes = match payload.as_bytes() {
            None => return Ok(Vec::new()),
            Some(bytes) => bytes,
        };
        let framed = self
            .compress
            .decompress(bytes, MAX_DECODED_SIZE)
            .map_err(Error::FailDecompress)?;

        let mut buf = &framed[..];
        if buf.len() < 4 {
            return Err(Error::LengthTooShort {
                step: "get value count",
                actual: buf.len(),
                expected: 4,
            });
        }
        let count = buf.read_u32::<LittleEndian>().unwrap() as usize; // Checked above
        if count == 0 {
            return Err(Error::BadFraming(
                "Zero-count frame; empty lists use the empty sentinel",
            ));
        }
        // Each frame takes at least its 4-byte length field. Checking up
        // front also bounds the allocation below by the buffer size.
        if count > buf.len() / 4 {
            return Err(Error::LengthTooShort {
                step: "get value frames",
                actual: buf.len(),
                expected: count.saturating_mul(4),
            });
        }

        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            if buf.len() < 4 {
                return Err(Error::LengthTooShort {
                    step: "get value length",
                    actual: buf.len(),
                    expected: 4,
                });
            }
            let len = buf.read_u32::<LittleEndian>().unwrap() as usize; // Checked above
            if buf.len() < len {
                return Err(Error::LengthTooShort {
                    step: "get value content",
                    actual: buf.len(),
                    expected: len,
                });
            }
            let (content, rest) = buf.split_at(len);
            buf = rest;
            let value = String::from_utf8(content.to_vec())
                .map_err(|e| Error::BadValue(format!("value is not UTF-8: {}", e)))?;
            values.push(value);
        }
        if !buf.is_empty() {
            return Err(Error::BadFraming("Trailing bytes after final value frame"));
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn round_trip(values: &[&str]) {
        let codec = ValueListCodec::default();
        let payload = codec.encode(values).unwrap();
        let decoded = codec.decode(&payload).unwrap();
        assert_eq!(decoded, values, "Encode->Decode should yield same values");
    }

    #[test]
    fn empty_list_is_sentinel() {
        let codec = ValueListCodec::default();
        let payload = codec.encode::<&str>(&[]).unwrap();
        assert!(payload.is_empty());
        assert_eq!(payload.size(), 0);
        assert_eq!(codec.decode(&payload).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn single_empty_string_is_not_empty_list() {
        let codec = ValueListCodec::default();
        let payload = codec.encode(&[""]).unwrap();
        assert!(!payload.is_empty());
        assert_eq!(codec.decode(&payload).unwrap(), vec![""]);
    }

    #[test]
    fn separator_like_content() {
        round_trip(&["a", "b,c", ""]);
    }

    #[test]
    fn values_holding_framing_bytes() {
        // Control characters, embedded length-field lookalikes, and newlines
        // inside values must all survive the trip.
        round_trip(&[
            "\u{0}\u{1}\u{2}\u{3}",
            "len\u{4}\u{0}\u{0}\u{0}field",
            "line\nbreaks\r\n",
            "unicode: \u{1F980} \u{FFFD}",
        ]);
    }

    #[test]
    fn repeated_and_ordered() {
        round_trip(&["dup", "dup", "dup", "", "dup"]);
    }

    #[test]
    fn random_lists() {
        let mut rng = rand::thread_rng();
        let codec = ValueListCodec::default();
        for _ in 0..50 {
            let count = rng.gen_range(0..20);
            let values: Vec<String> = (0..count)
                .map(|_| {
                    let len = rng.gen_range(0..200);
                    (0..len).map(|_| rng.gen::<char>()).collect()
                })
                .collect();
            let payload = codec.encode(&values).unwrap();
            let decoded = codec.decode(&payload).unwrap();
            assert_eq!(decoded, values);
        }
    }

    #[test]
    fn no_compression_ratio_assumed() {
        // Tiny incompressible input may grow when compressed; only the
        // round-trip matters.
        let codec = ValueListCodec::default();
        let values = ["x"];
        let payload = codec.encode(&values).unwrap();
        assert_eq!(codec.decode(&payload).unwrap(), vec!["x"]);
    }

    #[test]
    fn framing_fault_is_an_error() {
        // Compress a buffer that is valid zstd but not a valid frame
        // sequence: count says two values, content holds only one.
        let codec = ValueListCodec::default();
        let mut framed = Vec::new();
        framed.extend_from_slice(&2u32.to_le_bytes());
        framed.extend_from_slice(&1u32.to_le_bytes());
        framed.push(b'a');
        let bytes = Compress::default().compress(&framed).unwrap();
        let err = codec
            .decode(&Payload::Compressed(ByteBuf::from(bytes)))
            .unwrap_err();
        assert!(matches!(err, Error::LengthTooShort { .. }));
        assert!(!err.is_compression());
    }

    #[test]
    fn trailing_bytes_are_an_error() {
        let codec = ValueListCodec::default();
        let mut framed = Vec::new();
        framed.extend_from_slice(&1u32.to_le_bytes());
        framed.extend_from_slice(&1u32.to_le_bytes());
        framed.push(b'a');
        framed.push(b'!');
        let bytes = Compress::default().compress(&framed).unwrap();
        let err = codec
            .decode(&Payload::Compressed(ByteBuf::from(bytes)))
            .unwrap_err();
        assert!(matches!(err, Error::BadFraming(_)));
    }

    #[test]
    fn corrupt_compressed_bytes_are_a_decompression_error() {
        let codec = ValueListCodec::default();
        let payload = Payload::Compressed(ByteBuf::from(vec![0xAAu8; 32]));
        let err = codec.decode(&payload).unwrap_err();
        assert!(err.is_compression());
    }

    #[test]
    fn non_utf8_value_is_an_error() {
        let codec = ValueListCodec::default();
        let mut framed = Vec::new();
        framed.extend_from_slice(&1u32.to_le_bytes());
        framed.extend_from_slice(&2u32.to_le_bytes());
        framed.extend_from_slice(&[0xC0, 0x80]);
        let bytes = Compress::default().compress(&framed).unwrap();
        let err = codec
            .decode(&Payload::Compressed(ByteBuf::from(bytes)))
            .unwrap_err();
        assert!(matches!(err, Error::BadValue(_)));
    }
}
