/// Batch culling kernels.
///
/// A kernel tests a contiguous run of AABBs against a broadcast frustum and
/// writes one `i32` per AABB: `VISIBLE` (0) or `CULLED` (1). Vector kernels
/// process `lane_width()` boxes per step and require the run length to be a
/// multiple of it; the scalar kernel accepts any length and any broadcast
/// width, which is what makes it usable as the remainder handler.
///
/// Every kernel must produce exactly the result of `Frustum::culls_aabb`.

use std::fmt;
use super::aabb::Aabb;
use super::capabilities::CpuCapabilities;
use super::frustum::{BroadcastFrustum, PLANE_COUNT, PLANE_COMPONENTS, max_signed_distance};

/// Result value for an AABB that may be visible
pub const VISIBLE: i32 = 0;

/// Result value for an AABB fully outside at least one plane
pub const CULLED: i32 = 1;

/// Available kernel implementations, widest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelKind {
    /// 8 lanes, 256-bit AVX
    Avx,
    /// 4 lanes, 128-bit SSE2
    Sse2,
    /// 1 lane, portable
    Scalar,
}

impl KernelKind {
    /// Number of AABBs processed per step
    pub fn lane_width(self) -> usize {
        match self {
            KernelKind::Avx => 8,
            KernelKind::Sse2 => 4,
            KernelKind::Scalar => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            KernelKind::Avx => "AVX",
            KernelKind::Sse2 => "SSE2",
            KernelKind::Scalar => "scalar",
        }
    }

    /// Whether the instruction set this kernel needs is in `caps`
    pub fn is_supported(self, caps: CpuCapabilities) -> bool {
        match self {
            KernelKind::Avx => caps.has_avx(),
            KernelKind::Sse2 => caps.has_sse2(),
            KernelKind::Scalar => true,
        }
    }

    /// Widest kernel `caps` supports
    pub fn select(caps: CpuCapabilities) -> Self {
        KernelKind::Avx.downgrade(caps)
    }

    /// Widest supported kernel that is no wider than `self`
    pub fn downgrade(self, caps: CpuCapabilities) -> Self {
        [KernelKind::Avx, KernelKind::Sse2, KernelKind::Scalar]
            .into_iter()
            .filter(|kind| kind.lane_width() <= self.lane_width())
            .find(|kind| kind.is_supported(caps))
            .unwrap_or(KernelKind::Scalar)
    }
}

impl fmt::Display for KernelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Strategy for testing a batch of AABBs against a frustum.
pub trait CullingKernel: Send + Sync {
    fn kind(&self) -> KernelKind;

    fn lane_width(&self) -> usize {
        self.kind().lane_width()
    }

    /// Write one result per AABB into `results`.
    ///
    /// # Panics
    ///
    /// Panics if `results` and `aabbs` differ in length, or (vector kernels)
    /// if the length is not a multiple of the lane width or the frustum was
    /// broadcast for a different width.
    fn cull(&self, results: &mut [i32], aabbs: &[Aabb], frustum: &BroadcastFrustum);
}

/// Portable one-box-at-a-time kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarKernel;

impl CullingKernel for ScalarKernel {
    fn kind(&self) -> KernelKind {
        KernelKind::Scalar
    }

    fn cull(&self, results: &mut [i32], aabbs: &[Aabb], frustum: &BroadcastFrustum) {
        assert_eq!(results.len(), aabbs.len(), "result and AABB counts differ");

        let planes: [[f32; PLANE_COMPONENTS]; PLANE_COUNT] = std::array::from_fn(|p| frustum.plane(p));

        for (result, aabb) in results.iter_mut().zip(aabbs) {
            let culled = planes
                .iter()
                .any(|&[a, b, c, d]| max_signed_distance(aabb, a, b, c, d) <= 0.0);
            *result = if culled { CULLED } else { VISIBLE };
        }
    }
}

/// Shared precondition check for the vector kernels
pub(crate) fn check_vector_batch(
    kind: KernelKind,
    results: &[i32],
    aabbs: &[Aabb],
    frustum: &BroadcastFrustum,
) {
    let width = kind.lane_width();
    assert_eq!(results.len(), aabbs.len(), "result and AABB counts differ");
    assert_eq!(
        frustum.lane_width(), width,
        "{} kernel needs a frustum broadcast {} wide, got {}",
        kind, width, frustum.lane_width()
    );
    assert!(
        aabbs.len() % width == 0,
        "{} kernel needs a multiple of {} AABBs, got {}",
        kind, width, aabbs.len()
    );
}

static SCALAR_KERNEL: ScalarKernel = ScalarKernel;

/// The kernel implementing `kind`, if the running CPU can execute it.
///
/// Availability is checked against the detected capabilities, never a
/// caller-supplied set, so a returned kernel is always safe to run.
pub fn kernel_for(kind: KernelKind) -> Option<&'static dyn CullingKernel> {
    match kind {
        KernelKind::Scalar => Some(&SCALAR_KERNEL),
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        KernelKind::Sse2 => super::kernel_x86::sse2_kernel(),
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        KernelKind::Avx => super::kernel_x86::avx_kernel(),
        #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
        KernelKind::Sse2 | KernelKind::Avx => None,
    }
}

/// Scalar reference: test every AABB on the calling thread.
pub fn cull_scalar_reference(results: &mut [i32], aabbs: &[Aabb], frustum: &super::frustum::Frustum) {
    ScalarKernel.cull(results, aabbs, &frustum.broadcast(1));
}

#[cfg(test)]
#[path = "kernel_tests.rs"]
mod tests;
