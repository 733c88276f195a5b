//! prop-pack stores a multi-valued string property as a single compressed
//! byte blob, without ever losing the boundaries between values.
//!
//! A property's value list is framed with explicit per-value lengths, then
//! compressed with zstd. Because the framing is self-describing, decoding
//! needs nothing but the bytes themselves, and values are free to contain
//! commas, newlines, or any other delimiter-looking content. The empty list
//! skips compression entirely and is stored as a sentinel, which keeps it
//! distinguishable from a list holding one empty string.
//!
//! The main pieces:
//!
//! - [`ValueListCodec`]: the pure encode/decode pair over [`Payload`].
//! - [`MultiStringProperty`]: a named, immutable property owning one encoded
//!   payload, decoding lazily on first read.
//! - [`Converter`]: typed read-back of one decoded scalar (bool, integer,
//!   float, RFC 3339 date).
//! - [`Compress`]: the shared zstd configuration, chosen once per process.
//!
//! ```
//! use prop_pack::{MultiStringProperty, PropertyState, ValueListCodec};
//!
//! let codec = ValueListCodec::default();
//! let prop = MultiStringProperty::new("tags", &["a", "b,c", ""], &codec)?;
//! assert_eq!(prop.values()?, ["a", "b,c", ""]);
//! # Ok::<(), prop_pack::Error>(())
//! ```

mod codec;
mod compress;
mod convert;
mod error;
mod property;

pub use self::codec::{Payload, ValueListCodec};
pub use self::compress::{Compress, CompressionError, ALGORITHM_ZSTD};
pub use self::convert::Converter;
pub use self::error::{Error, Result};
pub use self::property::{MultiStringProperty, PropertyState, Type};

/// The maximum allowed size of a decoded (framed, uncompressed) value list is
/// 16 MiB. Decoding rejects any payload claiming to expand past this before
/// allocating for it.
pub const MAX_DECODED_SIZE: usize = 1usize << 24; // 16 MiB
