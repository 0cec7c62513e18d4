use crate::vec2::Vec2;

/// Axis-aligned bounds, top-left anchored, matching what the presentation
/// layer reports for a sprite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Bounds {
    /// Bounds of a square sprite centered at `center` with half-extent
    /// `radius`.
    pub fn around(center: Vec2, radius: f32) -> Self {
        Bounds {
            x: center.x - radius,
            y: center.y - radius,
            w: radius * 2.0,
            h: radius * 2.0,
        }
    }
}

/// The overlap test used for player/predator and predator/pulse hits.
///
/// Each comparison adds only one operand's *half*-extent, so this is narrower
/// than true AABB overlap and behaves like "mostly contained". Gameplay was
/// tuned against the shrunken version, so it is kept literally rather than
/// widened to the geometric test. Candidate fix if collision feel is ever
/// revisited; do not change silently.
#[inline]
pub fn sprites_overlap(r1: Bounds, r2: Bounds) -> bool {
    r1.x < r2.x + r2.w / 2.0
        && r1.x + r1.w / 2.0 > r2.x
        && r1.y < r2.y + r2.h / 2.0
        && r1.y + r1.h / 2.0 > r2.y
}

/// Circle proximity test used for player/fish capture.
#[inline]
pub fn within_radius(a: Vec2, b: Vec2, combined_radii: f32) -> bool {
    a.distance_to(b) < combined_radii
}
