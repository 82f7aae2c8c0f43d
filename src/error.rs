//! The codec's closed error set.
//!
//! Every fallible codec entry point returns [`Error`]; there is no
//! open-ended error hierarchy because the decoder is only ever expected to
//! tell the caller "this is not valid XPACK data" (`Corrupt`), "the stream
//! ended before I expected" (`ShortInput`), or "your output buffer is too
//! small for the declared length" (`ShortOutput`). `UnsupportedVersion` is
//! carried here too, even though neither `Compressor` nor `Decompressor`
//! ever construct it, so that `crate::container`'s own version check can
//! report through this same enum and let `ContainerError`'s `#[from]`
//! conversion pick it up like any other codec-level failure.

use thiserror::Error as ThisError;

/// Result alias used throughout the codec.
pub type Result<T> = std::result::Result<T, Error>;

/// The closed set of ways a codec call can fail.
#[derive(Debug, ThisError, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// A structural violation: a malformed table header, an out-of-range
    /// offset, a declared length that disagrees with the stream, and so on.
    /// The static string names which check failed, for diagnostics only —
    /// callers must not match on it.
    #[error("corrupt XPACK stream: {0}")]
    Corrupt(&'static str),

    /// The bit/byte stream ran out before the expected number of bits could
    /// be read.
    #[error("XPACK stream ended before expected")]
    ShortInput,

    /// The caller's output buffer (or the declared `expected_out_len`) is
    /// too small to hold the decompressed data.
    #[error("output buffer too small for decompressed data")]
    ShortOutput,

    /// A container file header named a format version this build doesn't
    /// know how to read. Container-level only; never raised by the codec
    /// proper.
    #[error("unsupported XPACK container version {0}")]
    UnsupportedVersion(u8),
}
