//! Static Terrain
//!
//! Line-segment surfaces and the downward ray queries used for the
//! grounded test and landing. There is no general collision response.

use serde::{Serialize, Deserialize};

use crate::core::fixed::{Fixed, FIXED_ONE, FIXED_SCALE, fixed_div, fixed_mul};
use crate::core::vec2::FixedVec2;

// =============================================================================
// AXIS-ALIGNED BOX
// =============================================================================

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aabb {
    /// Box center
    pub center: FixedVec2,
    /// Half width and half height
    pub half_extents: FixedVec2,
}

impl Aabb {
    /// Create a box from center and half extents.
    pub const fn new(center: FixedVec2, half_extents: FixedVec2) -> Self {
        Self { center, half_extents }
    }

    /// Minimum corner.
    #[inline]
    pub fn min(&self) -> FixedVec2 {
        self.center - self.half_extents
    }

    /// Maximum corner.
    #[inline]
    pub fn max(&self) -> FixedVec2 {
        self.center + self.half_extents
    }

    /// Check if two boxes overlap (touching edges count).
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x <= b_max.x && b_min.x <= a_max.x && a_min.y <= b_max.y && b_min.y <= a_max.y
    }

    /// Closest point inside the box to `point`.
    pub fn closest_point(&self, point: FixedVec2) -> FixedVec2 {
        let (min, max) = (self.min(), self.max());
        FixedVec2::new(point.x.clamp(min.x, max.x), point.y.clamp(min.y, max.y))
    }

    /// Check if a circle overlaps the box.
    pub fn overlaps_circle(&self, center: FixedVec2, radius: Fixed) -> bool {
        let delta = center - self.closest_point(center);
        within_radius(delta, radius)
    }
}

// =============================================================================
// SURFACES
// =============================================================================

/// A static line-segment surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surface {
    /// First endpoint
    pub start: FixedVec2,
    /// Second endpoint
    pub end: FixedVec2,
}

/// Result of a ray query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RayHit {
    /// Index of the surface that was hit
    pub surface: usize,
    /// Hit point
    pub point: FixedVec2,
    /// Unit surface normal facing the ray origin
    pub normal: FixedVec2,
    /// Distance from the ray origin
    pub distance: Fixed,
}

impl Surface {
    /// Create a surface between two points.
    pub const fn new(start: FixedVec2, end: FixedVec2) -> Self {
        Self { start, end }
    }

    /// Unit normal, oriented upward (or to the left for vertical walls).
    pub fn upward_normal(&self) -> FixedVec2 {
        let normal = (self.end - self.start).perpendicular().normalize();
        if normal.y < 0 || (normal.y == 0 && normal.x > 0) {
            -normal
        } else {
            normal
        }
    }

    /// Cast a ray straight down from `origin`.
    ///
    /// Hits at distance zero are ignored, so a ray starting on the surface
    /// does not report it. Vertical surfaces are never hit.
    pub fn raycast_down(&self, origin: FixedVec2, max_distance: Fixed) -> Option<(FixedVec2, Fixed)> {
        let span_x = self.end.x - self.start.x;
        if span_x == 0 {
            return None;
        }

        let (lo, hi) = if span_x > 0 {
            (self.start.x, self.end.x)
        } else {
            (self.end.x, self.start.x)
        };
        if origin.x < lo || origin.x > hi {
            return None;
        }

        let t = fixed_div(origin.x - self.start.x, span_x);
        let y = self.start.y + fixed_mul(self.end.y - self.start.y, t);
        let distance = origin.y - y;

        if distance > 0 && distance <= max_distance {
            Some((FixedVec2::new(origin.x, y), distance))
        } else {
            None
        }
    }

    /// Check if a circle touches the segment.
    pub fn overlaps_circle(&self, center: FixedVec2, radius: Fixed) -> bool {
        let seg = self.end - self.start;
        let len_sq = seg.length_squared_wide();
        let closest = if len_sq == 0 {
            self.start
        } else {
            // Projection parameter in Q16.16, from Q32.32 operands
            let t = (i128::from((center - self.start).dot_wide(seg)) << FIXED_SCALE) / i128::from(len_sq);
            self.start + seg.scale(t.clamp(0, i128::from(FIXED_ONE)) as Fixed)
        };
        within_radius(center - closest, radius)
    }
}

fn within_radius(delta: FixedVec2, radius: Fixed) -> bool {
    let radius = u64::from(radius.max(0).unsigned_abs());
    delta.length_squared_wide() <= radius * radius
}

/// All static surfaces in the arena.
#[derive(Clone, Debug, Default)]
pub struct Terrain {
    surfaces: Vec<Surface>,
}

impl Terrain {
    /// Create terrain from surfaces.
    pub fn new(surfaces: Vec<Surface>) -> Self {
        Self { surfaces }
    }

    /// A single flat floor from `x0` to `x1` at height `y`.
    pub fn flat(x0: Fixed, x1: Fixed, y: Fixed) -> Self {
        Self::new(vec![Surface::new(FixedVec2::new(x0, y), FixedVec2::new(x1, y))])
    }

    /// All surfaces.
    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    /// Nearest surface hit by a downward ray, if any.
    pub fn raycast_down(&self, origin: FixedVec2, max_distance: Fixed) -> Option<RayHit> {
        self.surfaces
            .iter()
            .enumerate()
            .filter_map(|(index, surface)| {
                surface.raycast_down(origin, max_distance).map(|(point, distance)| RayHit {
                    surface: index,
                    point,
                    normal: surface.upward_normal(),
                    distance,
                })
            })
            .min_by_key(|hit| (hit.distance, hit.surface))
    }

    /// First surface (by index) touched by a circle.
    pub fn circle_contact(&self, center: FixedVec2, radius: Fixed) -> Option<usize> {
        self.surfaces
            .iter()
            .position(|surface| surface.overlaps_circle(center, radius))
    }
}

// =============================================================================
// TESTS
// =============================================================================
