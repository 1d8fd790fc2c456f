use archmage::prelude::*;
use core::arch::aarch64::vqtbl1q_u8;

use super::{BPP, copy_swap_rb_tail, swap_rb_tail};

const RB_SHUF_MASK_NEON: [u8; 16] = [2, 1, 0, 3, 6, 5, 4, 7, 10, 9, 8, 11, 14, 13, 12, 15];

// ===========================================================================
// ARM NEON — rite row kernels (4 pixels per iteration)
// ===========================================================================

#[rite]
pub(super) fn swap_rb_row_arm_v2(_token: Arm64V2Token, row: &mut [u8]) {
    let mask = vld1q_u8(&RB_SHUF_MASK_NEON);
    let (blocks, tail) = row.as_chunks_mut::<16>();
    for block in blocks {
        let v = vld1q_u8(&*block);
        vst1q_u8(block, vqtbl1q_u8(v, mask));
    }
    swap_rb_tail(tail);
}

#[rite]
pub(super) fn copy_swap_rb_row_arm_v2(_token: Arm64V2Token, src: &[u8], dst: &mut [u8]) {
    let mask = vld1q_u8(&RB_SHUF_MASK_NEON);
    let (src_blocks, src_tail) = src.as_chunks::<16>();
    let (dst_blocks, dst_tail) = dst.as_chunks_mut::<16>();
    for (s, d) in src_blocks.iter().zip(dst_blocks.iter_mut()) {
        vst1q_u8(d, vqtbl1q_u8(vld1q_u8(s), mask));
    }
    copy_swap_rb_tail(src_tail, dst_tail);
}

// ===========================================================================
// ARM arcane dispatch targets
// ===========================================================================

#[arcane]
pub(super) fn swap_rb_impl_arm_v2(t: Arm64V2Token, buf: &mut [u8]) {
    swap_rb_row_arm_v2(t, buf);
}

#[arcane]
pub(super) fn copy_swap_rb_impl_arm_v2(t: Arm64V2Token, src: &[u8], dst: &mut [u8]) {
    copy_swap_rb_row_arm_v2(t, src, dst);
}

#[arcane]
pub(super) fn swap_rb_strided_arm_v2(
    t: Arm64V2Token,
    buf: &mut [u8],
    w: usize,
    h: usize,
    stride: usize,
) {
    for row in buf.chunks_mut(stride).take(h) {
        swap_rb_row_arm_v2(t, &mut row[..w * BPP]);
    }
}
