//! Batch frustum culling.
//!
//! - `AabbRegistry`: handle-based storage of boxes and their results
//! - `Frustum`: six planes, broadcast per lane width for the kernels
//! - `CullingKernel`: scalar, SSE2 and AVX implementations
//! - `VisibilityEngine`: runs a kernel over a registry on a worker pool
//! - `CullingEntry`: scoped slot that releases itself on drop

mod aabb;
mod capabilities;
mod culling_entry;
mod frustum;
mod kernel;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod kernel_x86;
mod registry;
mod visibility;

pub use aabb::{Aabb, FLOATS_PER_AABB};
pub use capabilities::CpuCapabilities;
pub use culling_entry::CullingEntry;
pub use frustum::{
    BroadcastFrustum, Frustum,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
    PLANE_COUNT, PLANE_COMPONENTS,
};
pub use kernel::{
    cull_scalar_reference, kernel_for, CullingKernel, KernelKind, ScalarKernel, CULLED, VISIBLE,
};
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub use kernel_x86::{AvxKernel, Sse2Kernel};
pub use registry::{AabbHandle, AabbRegistry, SharedAabbRegistry};
pub use visibility::{partition_chunk, CullingStats, VisibilityConfig, VisibilityEngine};
