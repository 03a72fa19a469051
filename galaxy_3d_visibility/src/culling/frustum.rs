/// Frustum: six clipping planes for visibility culling.
///
/// Each plane is a Vec4 (A, B, C, D) where:
/// - (A, B, C) is the inward-pointing normal
/// - D is the signed distance
/// - A point P is inside the frustum if dot(plane, P_homogeneous) >= 0 for all planes
///
/// The caller computes the planes (usually from its camera) and passes a
/// fresh frustum on every culling call.

use glam::Vec4;
use super::aabb::Aabb;

/// Frustum plane indices
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

/// Number of planes in a frustum
pub const PLANE_COUNT: usize = 6;

/// Number of coefficients per plane (A, B, C, D)
pub const PLANE_COMPONENTS: usize = 4;

/// Six frustum planes for culling.
///
/// Plane order is conventional (left, right, bottom, top, near, far) but
/// the culling test does not depend on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub planes: [Vec4; PLANE_COUNT],
}

impl Frustum {
    pub fn new(planes: [Vec4; PLANE_COUNT]) -> Self {
        Self { planes }
    }

    /// Build from raw `[A, B, C, D]` rows
    pub fn from_coefficients(coefficients: [[f32; PLANE_COMPONENTS]; PLANE_COUNT]) -> Self {
        Self { planes: coefficients.map(Vec4::from_array) }
    }

    pub fn plane(&self, index: usize) -> Vec4 {
        self.planes[index]
    }

    /// Test whether the AABB lies entirely on the excluded side of at least
    /// one plane.
    ///
    /// For each plane, the largest signed distance any corner of the box can
    /// reach is `max(min.x*A, max.x*A) + max(min.y*B, max.y*B) + max(min.z*C, max.z*C) + D`.
    /// A maximum of `<= 0` means the whole box is outside that plane. Exactly
    /// zero counts as outside.
    ///
    /// This is the single-threaded reference every kernel must agree with
    /// bit for bit.
    pub fn culls_aabb(&self, aabb: &Aabb) -> bool {
        self.planes.iter().any(|plane| {
            max_signed_distance(aabb, plane.x, plane.y, plane.z, plane.w) <= 0.0
        })
    }

    /// Lay the planes out for a `lane_width`-wide kernel.
    pub fn broadcast(&self, lane_width: usize) -> BroadcastFrustum {
        BroadcastFrustum::new(self, lane_width)
    }
}

/// `a > b ? a : b`, matching the packed max instructions so the scalar
/// path agrees with the vector kernels on every input.
#[inline(always)]
pub(crate) fn lane_max(a: f32, b: f32) -> f32 {
    if a > b { a } else { b }
}

/// Largest signed distance from the plane reached by any corner of the box.
///
/// Evaluation order is fixed as `((x + y) + z) + d`; the vector kernels
/// accumulate in the same order.
#[inline(always)]
pub(crate) fn max_signed_distance(aabb: &Aabb, a: f32, b: f32, c: f32, d: f32) -> f32 {
    let x = lane_max(aabb.min.x * a, aabb.max.x * a);
    let y = lane_max(aabb.min.y * b, aabb.max.y * b);
    let z = lane_max(aabb.min.z * c, aabb.max.z * c);
    ((x + y) + z) + d
}

/// Frustum planes with every coefficient replicated `lane_width` times.
///
/// Layout is `[plane][component][lane]`, so the `W` copies of one plane
/// coefficient are contiguous and load as a single register:
///
/// ```text
/// A0 A0 .. A0 | B0 B0 .. B0 | C0 .. | D0 .. | A1 A1 .. | ... | D5 .. D5
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BroadcastFrustum {
    lane_width: usize,
    data: Vec<f32>,
}

impl BroadcastFrustum {
    pub fn new(frustum: &Frustum, lane_width: usize) -> Self {
        assert!(lane_width > 0, "lane width must be at least 1");

        let mut data = Vec::with_capacity(PLANE_COUNT * PLANE_COMPONENTS * lane_width);
        for plane in &frustum.planes {
            for component in plane.to_array() {
                data.extend(std::iter::repeat(component).take(lane_width));
            }
        }

        Self { lane_width, data }
    }

    pub fn lane_width(&self) -> usize {
        self.lane_width
    }

    /// The `lane_width` copies of one plane coefficient
    pub fn lanes(&self, plane: usize, component: usize) -> &[f32] {
        let start = (plane * PLANE_COMPONENTS + component) * self.lane_width;
        &self.data[start..start + self.lane_width]
    }

    /// One plane coefficient (lane 0)
    #[inline]
    pub fn coefficient(&self, plane: usize, component: usize) -> f32 {
        self.data[(plane * PLANE_COMPONENTS + component) * self.lane_width]
    }

    /// Plane `index` as `(A, B, C, D)`
    #[inline]
    pub fn plane(&self, index: usize) -> [f32; PLANE_COMPONENTS] {
        [
            self.coefficient(index, 0),
            self.coefficient(index, 1),
            self.coefficient(index, 2),
            self.coefficient(index, 3),
        ]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
