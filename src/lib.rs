//! # rbswap
//!
//! *Put the red back where the blue was.*
//!
//! Swaps the red and blue channels of a 4-channel image file in place,
//! turning RGBA into BGRA (and back again, since the swap is its own
//! inverse). Green and alpha are never touched, dimensions and sample depth
//! are preserved, and the file keeps its encoding format.
//!
//! ## Layers
//!
//! - [`bytes`] — row-level R↔B swaps on raw `&mut [u8]` 4bpp buffers,
//!   contiguous and strided. SIMD-accelerated on x86-64 AVX2 and ARM NEON
//!   with automatic fallback to scalar code. Always available, `no_std`.
//! - [`file`] — load, precheck, swap, and atomically rewrite an image file
//!   using the [`image`](https://docs.rs/image) codecs.
//!
//! ```no_run
//! # #[cfg(feature = "file")]
//! # fn main() -> Result<(), rbswap::file::SwapError> {
//! let report = rbswap::file::swap_file("textures/4x4x3.png")?;
//! println!("swapped {}x{} {:?}", report.width, report.height, report.color);
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "file"))]
//! # fn main() {}
//! ```
//!
//! ## Feature flags
//!
//! - **`std`** — runtime SIMD detection through archmage's std support.
//! - **`file`** — image file loading and rewriting. Implies `std`.
//! - **`cli`** — the `rbswap` binary. Implies `file`.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

use core::fmt;

pub mod bytes;

pub use bytes::*;

#[cfg(feature = "file")]
pub mod file;

/// A pixel buffer did not have the size the operation requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SizeError {
    /// Buffer is empty or its length is not a multiple of 4 bytes.
    NotPixelAligned,
    /// Destination holds fewer pixels than the source.
    PixelCountMismatch,
    /// Zero dimensions, a stride narrower than a row, or a buffer too short
    /// for `height` rows at `stride`.
    InvalidStride,
}

impl fmt::Display for SizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SizeError::NotPixelAligned => "buffer length is not a whole number of 4-byte pixels",
            SizeError::PixelCountMismatch => "destination is smaller than source",
            SizeError::InvalidStride => "invalid width, height, or stride for buffer",
        })
    }
}

impl core::error::Error for SizeError {}
