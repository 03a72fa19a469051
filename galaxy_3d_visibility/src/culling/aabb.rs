/// Axis-aligned bounding boxes in the layout the culling kernels consume.

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

/// Number of `f32` values one AABB occupies in the flat view.
pub const FLOATS_PER_AABB: usize = 8;

/// Axis-Aligned Bounding Box
///
/// Two 4-component corners. Only `x`, `y`, `z` take part in culling;
/// `w` is padding that keeps each corner a full SIMD register.
///
/// Memory layout (32 bytes, no padding between fields):
///
/// ```text
/// [min.x, min.y, min.z, min.w, max.x, max.y, max.z, max.w]
/// ```
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Aabb {
    /// Minimum corner (x, y, z, padding)
    pub min: Vec4,
    /// Maximum corner (x, y, z, padding)
    pub max: Vec4,
}

const _: () = assert!(std::mem::size_of::<Aabb>() == FLOATS_PER_AABB * std::mem::size_of::<f32>());

impl Aabb {
    /// Degenerate box at the origin
    pub const ZERO: Aabb = Aabb { min: Vec4::ZERO, max: Vec4::ZERO };

    /// Build from 3D corners, padding `w` with zero
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min: min.extend(0.0), max: max.extend(0.0) }
    }

    /// Build from full 4-component corners (`w` is kept as-is)
    pub fn from_corners(min: Vec4, max: Vec4) -> Self {
        Self { min, max }
    }

    /// Build from a center point and half extents along each axis
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self::new(center - half, center + half)
    }

    /// Minimum corner without padding
    pub fn min3(&self) -> Vec3 {
        self.min.truncate()
    }

    /// Maximum corner without padding
    pub fn max3(&self) -> Vec3 {
        self.max.truncate()
    }

    /// Center of the box
    pub fn center(&self) -> Vec3 {
        (self.min3() + self.max3()) * 0.5
    }

    /// Test if a point lies inside or on the boundary of the box
    pub fn contains_point(&self, point: Vec3) -> bool {
        let (min, max) = (self.min3(), self.max3());
        min.x <= point.x && point.x <= max.x
            && min.y <= point.y && point.y <= max.y
            && min.z <= point.z && point.z <= max.z
    }

    /// Reinterpret a slice of AABBs as its flat float view
    /// (`FLOATS_PER_AABB` floats per box, in declaration order).
    pub fn as_flat(aabbs: &[Aabb]) -> &[f32] {
        bytemuck::cast_slice(aabbs)
    }
}
