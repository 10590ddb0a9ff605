//! Combat system - firing, hit detection, knockback

use crate::config::GameConfig;

use super::collision::{circles_overlap, normalize};
use super::entity::{Bullet, Player};

/// Combat system for managing shots and hits
pub struct CombatSystem;

impl CombatSystem {
    /// Check if a player can fire at simulation time `now_ms`
    pub fn can_fire(last_shot_ms: Option<u64>, now_ms: u64, cooldown_ms: u64) -> bool {
        match last_shot_ms {
            Some(last) => now_ms.saturating_sub(last) >= cooldown_ms,
            None => true,
        }
    }

    /// Spawn a bullet from `shooter` towards an aim point
    ///
    /// Returns `None` when the aim point coincides with the shooter. The
    /// bullet starts two ticks of travel ahead of the shooter's centre.
    pub fn spawn_bullet(
        shooter: &Player,
        aim_x: f32,
        aim_y: f32,
        tick: u64,
        config: &GameConfig,
    ) -> Option<Bullet> {
        let (dx, dy) = normalize(aim_x - shooter.x, aim_y - shooter.y)?;
        let vx = dx * config.bullet_speed;
        let vy = dy * config.bullet_speed;
        Some(Bullet::new(
            shooter.id,
            tick,
            shooter.x + vx * 2.0,
            shooter.y + vy * 2.0,
            vx,
            vy,
        ))
    }

    /// Whether `bullet` strikes `target` (never its own shooter)
    pub fn check_hit(bullet: &Bullet, target: &Player, config: &GameConfig) -> bool {
        bullet.owner != target.id
            && circles_overlap(
                bullet.x,
                bullet.y,
                config.bullet_radius(),
                target.x,
                target.y,
                config.player_radius(),
            )
    }

    /// Apply one hit to the victim: lose a health point and get shoved along
    /// the bullet's direction of travel
    pub fn apply_hit(victim: &mut Player, bullet: &Bullet, config: &GameConfig) {
        victim.health = victim.health.saturating_sub(1);
        if let Some((dx, dy)) = normalize(bullet.vx, bullet.vy) {
            victim.vx += dx * config.knockback;
            victim.vy += dy * config.knockback;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entity::Slot;
    use uuid::Uuid;

    #[test]
    fn cooldown_window() {
        assert!(CombatSystem::can_fire(None, 0, 300));
        assert!(!CombatSystem::can_fire(Some(1000), 1299, 300));
        assert!(CombatSystem::can_fire(Some(1000), 1300, 300));
    }

    #[test]
    fn bullet_spawns_ahead_along_aim() {
        let config = GameConfig::default();
        let shooter = Player::new(Uuid::new_v4(), Slot::One, &config);
        let bullet = CombatSystem::spawn_bullet(&shooter, 700.0, 300.0, 3, &config).unwrap();
        assert_eq!((bullet.vx, bullet.vy), (8.0, 0.0));
        assert_eq!((bullet.x, bullet.y), (116.0, 300.0));
        assert_eq!(bullet.owner, shooter.id);
    }

    #[test]
    fn zero_aim_vector_is_ignored() {
        let config = GameConfig::default();
        let shooter = Player::new(Uuid::new_v4(), Slot::One, &config);
        assert!(CombatSystem::spawn_bullet(&shooter, 100.0, 300.0, 0, &config).is_none());
    }

    #[test]
    fn owner_is_never_hit() {
        let config = GameConfig::default();
        let shooter = Player::new(Uuid::new_v4(), Slot::One, &config);
        let bullet = Bullet::new(shooter.id, 0, shooter.x, shooter.y, 8.0, 0.0);
        assert!(!CombatSystem::check_hit(&bullet, &shooter, &config));
    }

    #[test]
    fn knockback_follows_bullet_velocity() {
        let config = GameConfig::default();
        let mut victim = Player::new(Uuid::new_v4(), Slot::Two, &config);
        // Bullet grazing from above-left but travelling straight down
        let bullet = Bullet::new(Uuid::new_v4(), 0, victim.x - 5.0, victim.y - 5.0, 0.0, 6.4);
        assert!(CombatSystem::check_hit(&bullet, &victim, &config));

        CombatSystem::apply_hit(&mut victim, &bullet, &config);
        assert_eq!(victim.health, config.max_health - 1);
        assert_eq!((victim.vx, victim.vy), (0.0, 10.0));
    }

    #[test]
    fn health_never_underflows() {
        let config = GameConfig::default();
        let mut victim = Player::new(Uuid::new_v4(), Slot::Two, &config);
        victim.health = 0;
        let bullet = Bullet::new(Uuid::new_v4(), 0, victim.x, victim.y, 8.0, 0.0);
        CombatSystem::apply_hit(&mut victim, &bullet, &config);
        assert_eq!(victim.health, 0);
    }
}
