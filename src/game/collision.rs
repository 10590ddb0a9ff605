//! Overlap tests shared by every entity pairing
//!
//! All tests are strict: touching shapes do not collide.

use super::entity::{Obstacle, ObstacleKind};

/// Check overlap between two circles
pub fn circles_overlap(ax: f32, ay: f32, ar: f32, bx: f32, by: f32, br: f32) -> bool {
    let dx = bx - ax;
    let dy = by - ay;
    (dx * dx + dy * dy).sqrt() < ar + br
}

/// Check whether an entity of half-size `r` centred at `(x, y)` overlaps an obstacle
///
/// Circular obstacles are tested against the entity's circle; rectangles
/// against the entity's bounding square.
pub fn overlaps_obstacle(x: f32, y: f32, r: f32, obstacle: &Obstacle) -> bool {
    match obstacle.kind {
        ObstacleKind::Circle => circles_overlap(x, y, r, obstacle.x, obstacle.y, obstacle.radius()),
        ObstacleKind::Rect => {
            let (hw, hh) = obstacle.half_extents();
            x - r < obstacle.x + hw
                && x + r > obstacle.x - hw
                && y - r < obstacle.y + hh
                && y + r > obstacle.y - hh
        }
    }
}

/// Check against a whole obstacle set
pub fn overlaps_any(x: f32, y: f32, r: f32, obstacles: &[Obstacle]) -> bool {
    obstacles.iter().any(|o| overlaps_obstacle(x, y, r, o))
}

/// Unit vector along `(dx, dy)`, `None` for a zero-length vector
pub fn normalize(dx: f32, dy: f32) -> Option<(f32, f32)> {
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 || !len.is_finite() {
        return None;
    }
    Some((dx / len, dy / len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tangent_circles_do_not_collide() {
        assert!(!circles_overlap(0.0, 0.0, 5.0, 10.0, 0.0, 5.0));
        assert!(circles_overlap(0.0, 0.0, 5.0, 9.99, 0.0, 5.0));
    }

    #[test]
    fn circle_obstacle_uses_half_width_as_radius() {
        let obstacle = Obstacle::circle(100.0, 100.0, 40.0);
        // radius 20 + entity 4 = 24
        assert!(overlaps_obstacle(123.0, 100.0, 4.0, &obstacle));
        assert!(!overlaps_obstacle(124.0, 100.0, 4.0, &obstacle));
    }

    #[test]
    fn rect_obstacle_uses_half_extents() {
        let obstacle = Obstacle::rect(100.0, 100.0, 40.0, 60.0);
        // x edge at 120, y edge at 130
        assert!(overlaps_obstacle(132.0, 100.0, 12.5, &obstacle));
        assert!(!overlaps_obstacle(132.5, 100.0, 12.5, &obstacle));
        assert!(overlaps_obstacle(100.0, 142.0, 12.5, &obstacle));
        assert!(!overlaps_obstacle(100.0, 142.5, 12.5, &obstacle));
    }

    #[test]
    fn rect_corner_uses_bounding_square() {
        let obstacle = Obstacle::rect(0.0, 0.0, 20.0, 20.0);
        // Circle would miss the corner, the bounding square does not
        assert!(overlaps_obstacle(14.0, 14.0, 5.0, &obstacle));
    }

    #[test]
    fn overlaps_any_scans_every_obstacle() {
        let obstacles = vec![
            Obstacle::rect(0.0, 0.0, 10.0, 10.0),
            Obstacle::circle(200.0, 200.0, 10.0),
        ];
        assert!(overlaps_any(200.0, 206.0, 4.0, &obstacles));
        assert!(!overlaps_any(100.0, 100.0, 4.0, &obstacles));
        assert!(!overlaps_any(100.0, 100.0, 4.0, &[]));
    }

    #[test]
    fn normalize_rejects_zero_vector() {
        assert_eq!(normalize(0.0, 0.0), None);
        let (x, y) = normalize(3.0, 4.0).unwrap();
        assert!((x - 0.6).abs() < 1e-6);
        assert!((y - 0.8).abs() < 1e-6);
    }
}
