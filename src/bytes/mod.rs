// ---------------------------------------------------------------------------
// Row-level R↔B swaps for 4bpp pixels with SIMD dispatch.
//
// #[rite] row kernels hold the SIMD loops. #[arcane] wrappers are the
// incant! dispatch targets: contiguous buffers are one call, strided
// buffers loop over rows inside a single dispatch.
// ---------------------------------------------------------------------------

use crate::SizeError;
use archmage::incant;

mod scalar;
use scalar::*;

#[cfg(target_arch = "x86_64")]
mod avx2;
#[cfg(target_arch = "x86_64")]
use avx2::*;

#[cfg(target_arch = "aarch64")]
mod neon;
#[cfg(target_arch = "aarch64")]
use neon::*;


/// Bytes per pixel for every layout this module handles.
const BPP: usize = 4;

// ===========================================================================
// Validation
// ===========================================================================

#[inline]
fn check_inplace(len: usize) -> Result<(), SizeError> {
    if len == 0 || !len.is_multiple_of(BPP) {
        Err(SizeError::NotPixelAligned)
    } else {
        Ok(())
    }
}

#[inline]
fn check_copy(src_len: usize, dst_len: usize) -> Result<(), SizeError> {
    check_inplace(src_len)?;
    if dst_len < src_len {
        return Err(SizeError::PixelCountMismatch);
    }
    Ok(())
}

#[inline]
fn check_strided(len: usize, width: usize, height: usize, stride: usize) -> Result<(), SizeError> {
    if width == 0 || height == 0 {
        return Err(SizeError::InvalidStride);
    }
    let row_bytes = width.checked_mul(BPP).ok_or(SizeError::InvalidStride)?;
    if row_bytes > stride {
        return Err(SizeError::InvalidStride);
    }
    let needed = (height - 1)
        .checked_mul(stride)
        .and_then(|n| n.checked_add(row_bytes))
        .ok_or(SizeError::InvalidStride)?;
    if len < needed {
        return Err(SizeError::InvalidStride);
    }
    Ok(())
}

// ===========================================================================
// Shared tail handling
// ===========================================================================

/// Swap bytes 0 and 2 of a pixel packed into a native-endian `u32`.
#[cfg(target_endian = "little")]
#[inline(always)]
fn swap_rb_u32(v: u32) -> u32 {
    (v & 0xFF00_FF00) | (v.rotate_left(16) & 0x00FF_00FF)
}

#[cfg(target_endian = "big")]
#[inline(always)]
fn swap_rb_u32(v: u32) -> u32 {
    (v & 0x00FF_00FF) | (v.rotate_left(16) & 0xFF00_FF00)
}

/// Finish pixels the vector loop did not cover. Word-at-a-time when the
/// slice happens to be `u32`-aligned, byte swaps otherwise.
#[inline(always)]
fn swap_rb_tail(tail: &mut [u8]) {
    if let Ok(words) = bytemuck::try_cast_slice_mut::<u8, u32>(tail) {
        for v in words {
            *v = swap_rb_u32(*v);
        }
        return;
    }
    for px in tail.chunks_exact_mut(BPP) {
        px.swap(0, 2);
    }
}

#[inline(always)]
fn copy_swap_rb_tail(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(BPP).zip(dst.chunks_exact_mut(BPP)) {
        d.copy_from_slice(&[s[2], s[1], s[0], s[3]]);
    }
}

// ===========================================================================
// Public API
// ===========================================================================

/// Swap R↔B in-place for 4bpp pixels (RGBA↔BGRA).
///
/// Bytes 1 and 3 of every pixel are left as they are.
pub fn rgba_to_bgra_inplace(buf: &mut [u8]) -> Result<(), SizeError> {
    check_inplace(buf.len())?;
    incant!(swap_rb_impl(buf), [v3, arm_v2, scalar]);
    Ok(())
}

/// Copy 4bpp pixels from `src` into the front of `dst`, swapping R↔B.
///
/// `dst` may be longer than `src`; bytes past `src.len()` are not written.
pub fn rgba_to_bgra(src: &[u8], dst: &mut [u8]) -> Result<(), SizeError> {
    check_copy(src.len(), dst.len())?;
    let dst = &mut dst[..src.len()];
    incant!(copy_swap_rb_impl(src, dst), [v3, arm_v2, scalar]);
    Ok(())
}

/// Swap R↔B in-place for a strided 4bpp image.
///
/// `stride` is the distance in bytes between the start of consecutive rows
/// and must be ≥ `width × 4`. Padding bytes between rows are never read or
/// written. The buffer must hold at least `(height - 1) * stride + width * 4`
/// bytes.
pub fn rgba_to_bgra_inplace_strided(
    buf: &mut [u8],
    width: usize,
    height: usize,
    stride: usize,
) -> Result<(), SizeError> {
    check_strided(buf.len(), width, height, stride)?;
    incant!(
        swap_rb_strided(buf, width, height, stride),
        [v3, arm_v2, scalar]
    );
    Ok(())
}

// ===========================================================================
// Aliases — the swap is its own inverse
// ===========================================================================

/// Alias for [`rgba_to_bgra_inplace`].
#[inline(always)]
pub fn bgra_to_rgba_inplace(buf: &mut [u8]) -> Result<(), SizeError> {
    rgba_to_bgra_inplace(buf)
}

/// Alias for [`rgba_to_bgra`].
#[inline(always)]
pub fn bgra_to_rgba(src: &[u8], dst: &mut [u8]) -> Result<(), SizeError> {
    rgba_to_bgra(src, dst)
}

/// Alias for [`rgba_to_bgra_inplace_strided`].
#[inline(always)]
pub fn bgra_to_rgba_inplace_strided(
    buf: &mut [u8],
    width: usize,
    height: usize,
    stride: usize,
) -> Result<(), SizeError> {
    rgba_to_bgra_inplace_strided(buf, width, height, stride)
}
