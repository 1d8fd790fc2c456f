use archmage::prelude::*;

use super::{BPP, copy_swap_rb_tail, swap_rb_tail};

// Scalar kernels double as the portable fallback and the reference the
// SIMD tiers are tested against.

pub(super) fn swap_rb_impl_scalar(_token: ScalarToken, buf: &mut [u8]) {
    swap_rb_tail(buf);
}

pub(super) fn copy_swap_rb_impl_scalar(_token: ScalarToken, src: &[u8], dst: &mut [u8]) {
    copy_swap_rb_tail(src, dst);
}

pub(super) fn swap_rb_strided_scalar(
    _token: ScalarToken,
    buf: &mut [u8],
    w: usize,
    h: usize,
    stride: usize,
) {
    for row in buf.chunks_mut(stride).take(h) {
        swap_rb_tail(&mut row[..w * BPP]);
    }
}
