use std::{cell::RefCell, fmt};

thread_local! {
    static ZSTD_CCTX: RefCell<zstd_safe::CCtx<'static>> = RefCell::new(zstd_safe::CCtx::create());
    static ZSTD_DCTX: RefCell<zstd_safe::DCtx<'static>> = RefCell::new(zstd_safe::DCtx::create());
}

#[derive(Debug, Clone)]
pub enum CompressionError {
    ExceededSize { max: usize, actual: usize },
    ZstdInner(usize),
    Parsing(&'static str),
}

impl fmt::Display for CompressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionError::ExceededSize { max, actual } => write!(
                f,
                "Decompressed size is {} bytes, larger than max of {} kiB",
                actual,
                (max + 1) >> 10
            ),
            CompressionError::ZstdInner(v) => {
                write!(f, "zstd failure, code {} ({})", v, zstd_safe::get_error_name(*v))
            }
            CompressionError::Parsing(s) => f.write_str(s),
        }
    }
}

impl std::error::Error for CompressionError {}

impl From<zstd_safe::ErrorCode> for CompressionError {
    fn from(value: zstd_safe::ErrorCode) -> Self {
        CompressionError::ZstdInner(value)
    }
}

/// The compression algorithm identifier for `zstandard`.
pub const ALGORITHM_ZSTD: u8 = 0;

/// Process-wide compression settings for encoded property payloads. Chosen
/// once and shared read-only by every codec instance; the only supported
/// algorithm today is zstd, identified by [`ALGORITHM_ZSTD`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Compress {
    algorithm: u8,
    level: u8,
}

impl Compress {
    /// Create a new zstd compression setting with the given level.
    pub fn new_zstd(level: u8) -> Self {
        Compress {
            algorithm: ALGORITHM_ZSTD,
            level,
        }
    }

    /// The configured algorithm identifier.
    pub fn algorithm(&self) -> u8 {
        self.algorithm
    }

    /// The configured compression level.
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Compress the source buffer into a fresh byte vector. Fails only on an
    /// internal zstd fault. The output frame records the content size, so
    /// [`decompress`][Self::decompress] needs no metadata besides the bytes.
    pub(crate) fn compress(&self, src: &[u8]) -> Result<Vec<u8>, CompressionError> {
        use zstd_safe::*;
        ZSTD_CCTX.with_borrow_mut(|ctx| {
            ctx.reset(ResetDirective::SessionAndParameters)?;
            ctx.set_parameter(CParameter::CompressionLevel(self.level as i32))?;
            ctx.set_parameter(CParameter::ChecksumFlag(false))?;
            ctx.set_parameter(CParameter::ContentSizeFlag(true))?;
            ctx.set_pledged_src_size(Some(src.len() as u64))?;

            let mut dst: Vec<u8> = Vec::with_capacity(compress_bound(src.len()));
            ctx.compress2(&mut dst, src)?;
            Ok(dst)
        })
    }

    /// Decompress the source buffer, failing if the recorded content size is
    /// missing, lies, or exceeds `max_size`.
    pub(crate) fn decompress(
        &self,
        src: &[u8],
        max_size: usize,
    ) -> Result<Vec<u8>, CompressionError> {
        use zstd_safe::*;

        let out_size = get_frame_content_size(src)
            .map_err(|_| CompressionError::Parsing("Bad zstd frame header"))?
            .ok_or(CompressionError::Parsing("Missing frame content size"))?
            as usize;
        if out_size > max_size {
            return Err(CompressionError::ExceededSize {
                max: max_size,
                actual: out_size,
            });
        }

        ZSTD_DCTX.with_borrow_mut(|dtx| {
            dtx.reset(ResetDirective::SessionAndParameters)?;
            dtx.set_parameter(DParameter::WindowLogMax(27))?;

            let mut dst: Vec<u8> = Vec::with_capacity(out_size);
            let used_len = dtx.decompress(&mut dst, src)?;
            if used_len != out_size {
                return Err(CompressionError::Parsing(
                    "Decompressed size doesn't match promised size",
                ));
            }
            Ok(dst)
        })
    }
}

impl std::default::Default for Compress {
    fn default() -> Self {
        Compress {
            algorithm: ALGORITHM_ZSTD,
            level: 3,
        }
    }
}
