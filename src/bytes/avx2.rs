use archmage::prelude::*;

use super::{BPP, copy_swap_rb_tail, swap_rb_tail};

// Byte shuffle exchanging 0↔2 inside every 4-byte pixel, both 128-bit lanes.
const RB_SHUF_MASK_AVX: [i8; 32] = [
    2, 1, 0, 3, 6, 5, 4, 7, 10, 9, 8, 11, 14, 13, 12, 15, 2, 1, 0, 3, 6, 5, 4, 7, 10, 9, 8, 11, 14,
    13, 12, 15,
];

// ===========================================================================
// x86-64 AVX2 — rite row kernels (8 pixels per iteration)
// ===========================================================================

#[rite]
pub(super) fn swap_rb_row_v3(_token: X64V3Token, row: &mut [u8]) {
    let mask = _mm256_loadu_si256(&RB_SHUF_MASK_AVX);
    let (blocks, tail) = row.as_chunks_mut::<32>();
    for block in blocks {
        let v = _mm256_loadu_si256(&*block);
        _mm256_storeu_si256(block, _mm256_shuffle_epi8(v, mask));
    }
    swap_rb_tail(tail);
}

#[rite]
pub(super) fn copy_swap_rb_row_v3(_token: X64V3Token, src: &[u8], dst: &mut [u8]) {
    let mask = _mm256_loadu_si256(&RB_SHUF_MASK_AVX);
    let (src_blocks, src_tail) = src.as_chunks::<32>();
    let (dst_blocks, dst_tail) = dst.as_chunks_mut::<32>();
    for (s, d) in src_blocks.iter().zip(dst_blocks.iter_mut()) {
        let v = _mm256_loadu_si256(s);
        _mm256_storeu_si256(d, _mm256_shuffle_epi8(v, mask));
    }
    copy_swap_rb_tail(src_tail, dst_tail);
}

// ===========================================================================
// x86-64 arcane dispatch targets
// ===========================================================================

#[arcane]
pub(super) fn swap_rb_impl_v3(t: X64V3Token, buf: &mut [u8]) {
    swap_rb_row_v3(t, buf);
}

#[arcane]
pub(super) fn copy_swap_rb_impl_v3(t: X64V3Token, src: &[u8], dst: &mut [u8]) {
    copy_swap_rb_row_v3(t, src, dst);
}

#[arcane]
pub(super) fn swap_rb_strided_v3(t: X64V3Token, buf: &mut [u8], w: usize, h: usize, stride: usize) {
    for row in buf.chunks_mut(stride).take(h) {
        swap_rb_row_v3(t, &mut row[..w * BPP]);
    }
}
