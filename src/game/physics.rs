//! Player and bullet movement against obstacles and arena walls

use crate::config::GameConfig;

use super::collision::overlaps_any;
use super::entity::{Bullet, Obstacle, Player};

/// Outcome of advancing one bullet by a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletStep {
    /// Still in flight
    Flying,
    /// Next position was inside an obstacle; bullet did not move
    Blocked,
    /// Bounce budget exhausted
    Spent,
}

/// Physics system for updating player and bullet positions
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Move a player one tick
    ///
    /// Axes are resolved independently so a player blocked on one axis can
    /// still slide along the other.
    pub fn move_player(player: &mut Player, obstacles: &[Obstacle], config: &GameConfig) {
        let r = config.player_radius();
        let new_x = player.x + player.vx;
        let new_y = player.y + player.vy;

        let can_move_x = !overlaps_any(new_x, player.y, r, obstacles);
        let can_move_y = !overlaps_any(player.x, new_y, r, obstacles);

        if can_move_x {
            player.x = new_x;
        }
        if can_move_y {
            player.y = new_y;
        }

        let damping = config.bounce_damping;
        Self::bounce_off_walls(&mut player.x, &mut player.vx, r, config.arena_width, damping);
        Self::bounce_off_walls(&mut player.y, &mut player.vy, r, config.arena_height, damping);

        player.vx *= config.friction;
        player.vy *= config.friction;
    }

    /// Move a bullet one tick, bouncing off the arena walls
    pub fn move_bullet(bullet: &mut Bullet, obstacles: &[Obstacle], config: &GameConfig) -> BulletStep {
        let r = config.bullet_radius();
        let new_x = bullet.x + bullet.vx;
        let new_y = bullet.y + bullet.vy;

        if overlaps_any(new_x, new_y, r, obstacles) {
            return BulletStep::Blocked;
        }

        bullet.x = new_x;
        bullet.y = new_y;

        let damping = config.bounce_damping;
        let bounced_x = Self::bounce_off_walls(&mut bullet.x, &mut bullet.vx, r, config.arena_width, damping);
        let bounced_y = Self::bounce_off_walls(&mut bullet.y, &mut bullet.vy, r, config.arena_height, damping);

        // One bounce per tick, even in a corner
        if bounced_x || bounced_y {
            bullet.bounces += 1;
            if bullet.bounces > config.max_bullet_bounces {
                return BulletStep::Spent;
            }
        }

        BulletStep::Flying
    }

    /// Clamp one axis into `[r, extent - r]`, reflecting and damping velocity
    /// when the position is at or past a wall. Returns true on a bounce.
    fn bounce_off_walls(pos: &mut f32, vel: &mut f32, r: f32, extent: f32, damping: f32) -> bool {
        let min = r;
        let max = extent - r;
        if *pos <= min {
            *pos = min;
            *vel *= -damping;
            true
        } else if *pos >= max {
            *pos = max;
            *vel *= -damping;
            true
        } else {
            false
        }
    }
}
