//! Configuration module - environment variable parsing and game constants

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use serde::Serialize;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Allowed client origins for CORS (comma-separated, `*` for any)
    pub client_origin: String,
    /// Fixed seed for obstacle generation, random when unset
    pub arena_seed: Option<u64>,
    /// Simulation constants
    pub game: GameConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Render-style hosts provide PORT, fall back to SERVER_ADDR or default
        let server_addr = if let Ok(port) = env::var("PORT") {
            format!("0.0.0.0:{}", port)
        } else {
            env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        };

        let arena_seed = match env::var("ARENA_SEED") {
            Ok(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::Invalid("ARENA_SEED"))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            client_origin: env::var("CLIENT_ORIGIN").unwrap_or_else(|_| "*".to_string()),
            arena_seed,
            game: GameConfig::default(),
        })
    }
}

/// A point in arena coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Simulation constants, fixed for the lifetime of the process
#[derive(Debug, Clone, Serialize)]
pub struct GameConfig {
    pub arena_width: f32,
    pub arena_height: f32,

    /// Player bounding diameter
    pub player_size: f32,
    /// Bullet bounding diameter
    pub bullet_size: f32,

    /// Velocity a held direction key produces (units per tick)
    pub player_speed: f32,
    /// Bullet muzzle speed (units per tick)
    pub bullet_speed: f32,

    /// Factor applied to an inverted velocity component on a wall bounce
    pub bounce_damping: f32,
    /// Per-tick player velocity decay
    pub friction: f32,
    /// Velocity impulse applied to a hit player
    pub knockback: f32,

    pub obstacle_count: usize,
    /// Minimum distance between an obstacle centre and a spawn point
    pub obstacle_clearance: f32,

    pub max_health: u32,
    pub win_score: u32,
    pub shoot_cooldown_ms: u64,
    pub max_bullet_bounces: u32,

    /// Fixed period of one simulation tick
    #[serde(serialize_with = "serialize_millis")]
    pub tick_period: Duration,

    pub spawn_points: [Point; 2],
    pub player_colors: [&'static str; 2],
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arena_width: 800.0,
            arena_height: 600.0,
            player_size: 25.0,
            bullet_size: 8.0,
            player_speed: 5.0,
            bullet_speed: 8.0,
            bounce_damping: 0.8,
            friction: 0.95,
            knockback: 10.0,
            obstacle_count: 8,
            obstacle_clearance: 80.0,
            max_health: 3,
            win_score: 6,
            shoot_cooldown_ms: 300,
            max_bullet_bounces: 5,
            tick_period: Duration::from_millis(16),
            spawn_points: [Point { x: 100.0, y: 300.0 }, Point { x: 700.0, y: 300.0 }],
            player_colors: ["#ff6b6b", "#4ecdc4"],
        }
    }
}

impl GameConfig {
    pub fn player_radius(&self) -> f32 {
        self.player_size / 2.0
    }

    pub fn bullet_radius(&self) -> f32 {
        self.bullet_size / 2.0
    }

    /// Ticks per second implied by the tick period
    pub fn tick_rate(&self) -> u32 {
        let millis = self.tick_period.as_millis().max(1) as u32;
        1000 / millis
    }
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,
}
