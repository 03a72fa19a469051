//! SSE2 and AVX culling kernels.
//!
//! Both kernels load `W` boxes in their natural `[min.xyzw, max.xyzw]`
//! layout, transpose them in registers into one register per coordinate,
//! then run the plane test on all lanes at once. The arithmetic mirrors
//! `max_signed_distance` operation for operation so results match the
//! scalar path exactly.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::aabb::{Aabb, FLOATS_PER_AABB};
use super::capabilities::CpuCapabilities;
use super::frustum::{BroadcastFrustum, PLANE_COUNT, PLANE_COMPONENTS};
use super::kernel::{check_vector_batch, CullingKernel, KernelKind, CULLED};

// ===== SSE2 =====

/// 4-lane kernel. Only obtainable through `kernel_for` on CPUs with SSE2.
#[derive(Debug)]
pub struct Sse2Kernel {
    _detected: (),
}

static SSE2_KERNEL: Sse2Kernel = Sse2Kernel { _detected: () };

pub(super) fn sse2_kernel() -> Option<&'static dyn CullingKernel> {
    if CpuCapabilities::detect().has_sse2() {
        Some(&SSE2_KERNEL)
    } else {
        None
    }
}

impl CullingKernel for Sse2Kernel {
    fn kind(&self) -> KernelKind {
        KernelKind::Sse2
    }

    fn cull(&self, results: &mut [i32], aabbs: &[Aabb], frustum: &BroadcastFrustum) {
        check_vector_batch(KernelKind::Sse2, results, aabbs, frustum);
        // SAFETY: this type is only handed out after SSE2 was detected, and
        // the lengths were checked above.
        unsafe { cull_sse2(results, aabbs, frustum) }
    }
}

/// Transpose the xyz rows of four corners into one register per axis.
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn transpose_xyz_sse(r0: __m128, r1: __m128, r2: __m128, r3: __m128) -> (__m128, __m128, __m128) {
    let xy01 = _mm_unpacklo_ps(r0, r1); // x0 x1 y0 y1
    let xy23 = _mm_unpacklo_ps(r2, r3); // x2 x3 y2 y3
    let zw01 = _mm_unpackhi_ps(r0, r1); // z0 z1 w0 w1
    let zw23 = _mm_unpackhi_ps(r2, r3); // z2 z3 w2 w3
    (
        _mm_movelh_ps(xy01, xy23),
        _mm_movehl_ps(xy23, xy01),
        _mm_movelh_ps(zw01, zw23),
    )
}

#[target_feature(enable = "sse2")]
unsafe fn cull_sse2(results: &mut [i32], aabbs: &[Aabb], frustum: &BroadcastFrustum) {
    const W: usize = 4;

    let flat = Aabb::as_flat(aabbs);
    let planes = frustum.as_slice().as_ptr();
    let zero = _mm_setzero_ps();
    let culled = _mm_set1_epi32(CULLED);

    for (block, out) in flat.chunks_exact(W * FLOATS_PER_AABB).zip(results.chunks_exact_mut(W)) {
        let p = block.as_ptr();
        let (min_x, min_y, min_z) = transpose_xyz_sse(
            _mm_loadu_ps(p),
            _mm_loadu_ps(p.add(8)),
            _mm_loadu_ps(p.add(16)),
            _mm_loadu_ps(p.add(24)),
        );
        let (max_x, max_y, max_z) = transpose_xyz_sse(
            _mm_loadu_ps(p.add(4)),
            _mm_loadu_ps(p.add(12)),
            _mm_loadu_ps(p.add(20)),
            _mm_loadu_ps(p.add(28)),
        );

        let mut outside = _mm_setzero_ps();
        for plane in 0..PLANE_COUNT {
            let q = planes.add(plane * PLANE_COMPONENTS * W);
            let a = _mm_loadu_ps(q);
            let b = _mm_loadu_ps(q.add(W));
            let c = _mm_loadu_ps(q.add(2 * W));
            let d = _mm_loadu_ps(q.add(3 * W));

            let x = _mm_max_ps(_mm_mul_ps(min_x, a), _mm_mul_ps(max_x, a));
            let y = _mm_max_ps(_mm_mul_ps(min_y, b), _mm_mul_ps(max_y, b));
            let z = _mm_max_ps(_mm_mul_ps(min_z, c), _mm_mul_ps(max_z, c));
            let distance = _mm_add_ps(_mm_add_ps(_mm_add_ps(x, y), z), d);

            outside = _mm_or_ps(outside, _mm_cmple_ps(distance, zero));
        }

        let mask = _mm_and_si128(_mm_castps_si128(outside), culled);
        _mm_storeu_si128(out.as_mut_ptr() as *mut __m128i, mask);
    }
}

// ===== AVX =====

/// 8-lane kernel. Only obtainable through `kernel_for` on CPUs with AVX.
#[derive(Debug)]
pub struct AvxKernel {
    _detected: (),
}

static AVX_KERNEL: AvxKernel = AvxKernel { _detected: () };

pub(super) fn avx_kernel() -> Option<&'static dyn CullingKernel> {
    if CpuCapabilities::detect().has_avx() {
        Some(&AVX_KERNEL)
    } else {
        None
    }
}

impl CullingKernel for AvxKernel {
    fn kind(&self) -> KernelKind {
        KernelKind::Avx
    }

    fn cull(&self, results: &mut [i32], aabbs: &[Aabb], frustum: &BroadcastFrustum) {
        check_vector_batch(KernelKind::Avx, results, aabbs, frustum);
        // SAFETY: this type is only handed out after AVX was detected, and
        // the lengths were checked above.
        unsafe { cull_avx(results, aabbs, frustum) }
    }
}

/// Full 8x8 transpose: row `i` is box `i`, column `j` is float `j`.
#[inline]
#[target_feature(enable = "avx")]
unsafe fn transpose_8x8(r: [__m256; 8]) -> [__m256; 8] {
    let t0 = _mm256_unpacklo_ps(r[0], r[1]);
    let t1 = _mm256_unpackhi_ps(r[0], r[1]);
    let t2 = _mm256_unpacklo_ps(r[2], r[3]);
    let t3 = _mm256_unpackhi_ps(r[2], r[3]);
    let t4 = _mm256_unpacklo_ps(r[4], r[5]);
    let t5 = _mm256_unpackhi_ps(r[4], r[5]);
    let t6 = _mm256_unpacklo_ps(r[6], r[7]);
    let t7 = _mm256_unpackhi_ps(r[6], r[7]);

    let s0 = _mm256_shuffle_ps::<0x44>(t0, t2);
    let s1 = _mm256_shuffle_ps::<0xEE>(t0, t2);
    let s2 = _mm256_shuffle_ps::<0x44>(t1, t3);
    let s3 = _mm256_shuffle_ps::<0xEE>(t1, t3);
    let s4 = _mm256_shuffle_ps::<0x44>(t4, t6);
    let s5 = _mm256_shuffle_ps::<0xEE>(t4, t6);
    let s6 = _mm256_shuffle_ps::<0x44>(t5, t7);
    let s7 = _mm256_shuffle_ps::<0xEE>(t5, t7);

    [
        _mm256_permute2f128_ps::<0x20>(s0, s4),
        _mm256_permute2f128_ps::<0x20>(s1, s5),
        _mm256_permute2f128_ps::<0x20>(s2, s6),
        _mm256_permute2f128_ps::<0x20>(s3, s7),
        _mm256_permute2f128_ps::<0x31>(s0, s4),
        _mm256_permute2f128_ps::<0x31>(s1, s5),
        _mm256_permute2f128_ps::<0x31>(s2, s6),
        _mm256_permute2f128_ps::<0x31>(s3, s7),
    ]
}

#[target_feature(enable = "avx")]
unsafe fn cull_avx(results: &mut [i32], aabbs: &[Aabb], frustum: &BroadcastFrustum) {
    const W: usize = 8;

    let flat = Aabb::as_flat(aabbs);
    let planes = frustum.as_slice().as_ptr();
    let zero = _mm256_setzero_ps();
    let culled = _mm256_castsi256_ps(_mm256_set1_epi32(CULLED));

    for (block, out) in flat.chunks_exact(W * FLOATS_PER_AABB).zip(results.chunks_exact_mut(W)) {
        let p = block.as_ptr();
        let rows = [
            _mm256_loadu_ps(p),
            _mm256_loadu_ps(p.add(FLOATS_PER_AABB)),
            _mm256_loadu_ps(p.add(2 * FLOATS_PER_AABB)),
            _mm256_loadu_ps(p.add(3 * FLOATS_PER_AABB)),
            _mm256_loadu_ps(p.add(4 * FLOATS_PER_AABB)),
            _mm256_loadu_ps(p.add(5 * FLOATS_PER_AABB)),
            _mm256_loadu_ps(p.add(6 * FLOATS_PER_AABB)),
            _mm256_loadu_ps(p.add(7 * FLOATS_PER_AABB)),
        ];
        let [min_x, min_y, min_z, _, max_x, max_y, max_z, _] = transpose_8x8(rows);

        let mut outside = _mm256_setzero_ps();
        for plane in 0..PLANE_COUNT {
            let q = planes.add(plane * PLANE_COMPONENTS * W);
            let a = _mm256_loadu_ps(q);
            let b = _mm256_loadu_ps(q.add(W));
            let c = _mm256_loadu_ps(q.add(2 * W));
            let d = _mm256_loadu_ps(q.add(3 * W));

            let x = _mm256_max_ps(_mm256_mul_ps(min_x, a), _mm256_mul_ps(max_x, a));
            let y = _mm256_max_ps(_mm256_mul_ps(min_y, b), _mm256_mul_ps(max_y, b));
            let z = _mm256_max_ps(_mm256_mul_ps(min_z, c), _mm256_mul_ps(max_z, c));
            let distance = _mm256_add_ps(_mm256_add_ps(_mm256_add_ps(x, y), z), d);

            outside = _mm256_or_ps(outside, _mm256_cmp_ps::<_CMP_LE_OQ>(distance, zero));
        }

        let mask = _mm256_and_ps(outside, culled);
        _mm256_storeu_si256(out.as_mut_ptr() as *mut __m256i, _mm256_castps_si256(mask));
    }
}
