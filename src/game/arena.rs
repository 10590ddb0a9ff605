//! Obstacle layout generation

use rand::Rng;

use crate::config::{GameConfig, Point};

use super::entity::Obstacle;

/// Inset from the arena edge for obstacle centres
const EDGE_MARGIN: f32 = 50.0;
/// Placement retries per obstacle before accepting a crowded spot
const MAX_PLACEMENT_ATTEMPTS: u32 = 50;
const MIN_OBSTACLE_SIZE: f32 = 40.0;
const MAX_OBSTACLE_SIZE: f32 = 80.0;

/// Place `count` obstacles, keeping centres away from spawn points when possible
///
/// Best effort: after `MAX_PLACEMENT_ATTEMPTS` rejected candidates the last
/// one is kept anyway. Obstacles may overlap each other.
pub fn generate<R: Rng + ?Sized>(
    count: usize,
    arena_width: f32,
    arena_height: f32,
    spawn_points: &[Point],
    min_clearance: f32,
    rng: &mut R,
) -> Vec<Obstacle> {
    let x_range = EDGE_MARGIN..(arena_width - EDGE_MARGIN).max(EDGE_MARGIN + 1.0);
    let y_range = EDGE_MARGIN..(arena_height - EDGE_MARGIN).max(EDGE_MARGIN + 1.0);

    (0..count)
        .map(|_| {
            let mut x = 0.0;
            let mut y = 0.0;
            for _ in 0..MAX_PLACEMENT_ATTEMPTS {
                x = rng.gen_range(x_range.clone());
                y = rng.gen_range(y_range.clone());

                let clear = spawn_points.iter().all(|spawn| {
                    let dx = x - spawn.x;
                    let dy = y - spawn.y;
                    (dx * dx + dy * dy).sqrt() > min_clearance
                });
                if clear {
                    break;
                }
            }

            let width = rng.gen_range(MIN_OBSTACLE_SIZE..MAX_OBSTACLE_SIZE);
            let height = rng.gen_range(MIN_OBSTACLE_SIZE..MAX_OBSTACLE_SIZE);
            if rng.gen_bool(0.5) {
                Obstacle::rect(x, y, width, height)
            } else {
                Obstacle::circle(x, y, width)
            }
        })
        .collect()
}

/// Generate a layout from the game constants
pub fn generate_for<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Vec<Obstacle> {
    generate(
        config.obstacle_count,
        config.arena_width,
        config.arena_height,
        &config.spawn_points,
        config.obstacle_clearance,
        rng,
    )
}
