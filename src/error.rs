use crate::compress::CompressionError;
use std::fmt;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum Error {
    /// Occurs when the compression step of encoding a value list fails. This
    /// is an internal zstd fault; retrying with the same data cannot help.
    FailCompress(CompressionError),
    /// Occurs when a payload's bytes fail to decompress, due to truncation,
    /// corruption, or a bad frame header.
    FailDecompress(CompressionError),
    /// Decompressed bytes ended before the frame structure said they should.
    LengthTooShort {
        step: &'static str,
        actual: usize,
        expected: usize,
    },
    /// Decompressed bytes do not parse as a valid sequence of value frames.
    BadFraming(&'static str),
    /// A value frame decompressed cleanly but did not hold valid UTF-8.
    BadValue(String),
    /// Decoded payload was greater than the maximum allowed size.
    LengthTooLong { max: usize, actual: usize },
    /// A scalar string could not be coerced to the requested target type.
    FailConvert(String),
}

impl Error {
    /// True for faults raised inside the compression collaborator, false for
    /// framing-level faults on well-decompressed bytes.
    pub fn is_compression(&self) -> bool {
        matches!(self, Error::FailCompress(_) | Error::FailDecompress(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::FailCompress(ref err) => write!(f, "Failed compression step: {}", err),
            Error::FailDecompress(ref err) => write!(f, "Failed decompression step: {}", err),
            Error::LengthTooShort {
                step,
                actual,
                expected,
            } => write!(
                f,
                "Expected data length {}, but got {} on step [{}]",
                expected, actual, step
            ),
            Error::BadFraming(err) => write!(f, "Bad value framing: {}", err),
            Error::BadValue(ref err) => write!(f, "Bad value content: {}", err),
            Error::LengthTooLong { max, actual } => write!(
                f,
                "Data too long: was {} bytes, maximum allowed is {}",
                actual, max
            ),
            Error::FailConvert(ref err) => write!(f, "Failed conversion: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::FailCompress(ref err) | Error::FailDecompress(ref err) => Some(err),
            _ => None,
        }
    }
}
