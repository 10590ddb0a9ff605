//! Plain entity records owned by the simulation

use serde::Serialize;
use uuid::Uuid;

use crate::config::{GameConfig, Point};

/// Opaque identity of a transport connection
pub type ConnectionId = Uuid;

/// Fixed player role; decides spawn point, colour and score bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u8")]
pub enum Slot {
    One,
    Two,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::One, Slot::Two];

    pub fn index(self) -> usize {
        match self {
            Slot::One => 0,
            Slot::Two => 1,
        }
    }

    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    pub fn spawn(self, config: &GameConfig) -> Point {
        config.spawn_points[self.index()]
    }
}

impl From<Slot> for u8 {
    fn from(slot: Slot) -> Self {
        slot.number()
    }
}

/// A connected combatant (authoritative)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    pub id: ConnectionId,
    #[serde(rename = "number")]
    pub slot: Slot,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub color: &'static str,
    pub health: u32,
    /// Simulation time of the last accepted shot
    pub last_shot_ms: Option<u64>,
}

impl Player {
    pub fn new(id: ConnectionId, slot: Slot, config: &GameConfig) -> Self {
        let spawn = slot.spawn(config);
        Self {
            id,
            slot,
            x: spawn.x,
            y: spawn.y,
            vx: 0.0,
            vy: 0.0,
            color: config.player_colors[slot.index()],
            health: config.max_health,
            last_shot_ms: None,
        }
    }

    /// Full health at the slot's spawn point, standing still
    pub fn respawn(&mut self, config: &GameConfig) {
        let spawn = self.slot.spawn(config);
        self.x = spawn.x;
        self.y = spawn.y;
        self.vx = 0.0;
        self.vy = 0.0;
        self.health = config.max_health;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bullet {
    /// `{owner}_{spawn_tick}`
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub owner: ConnectionId,
    pub bounces: u32,
}

impl Bullet {
    pub fn new(owner: ConnectionId, tick: u64, x: f32, y: f32, vx: f32, vy: f32) -> Self {
        Self {
            id: format!("{}_{}", owner, tick),
            x,
            y,
            vx,
            vy,
            owner,
            bounces: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    Rect,
    Circle,
}

/// Static arena blocker, immutable for the round
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Obstacle {
    #[serde(rename = "type")]
    pub kind: ObstacleKind,
    /// Centre
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Obstacle {
    pub fn rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            kind: ObstacleKind::Rect,
            x,
            y,
            width,
            height,
        }
    }

    pub fn circle(x: f32, y: f32, diameter: f32) -> Self {
        Self {
            kind: ObstacleKind::Circle,
            x,
            y,
            width: diameter,
            height: diameter,
        }
    }

    pub fn half_extents(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }

    /// Circle radius; only meaningful for `ObstacleKind::Circle`
    pub fn radius(&self) -> f32 {
        self.width / 2.0
    }
}

/// Cumulative hits per slot for the current round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Scores {
    pub player1: u32,
    pub player2: u32,
}

impl Scores {
    pub fn credit(&mut self, slot: Slot) {
        match slot {
            Slot::One => self.player1 += 1,
            Slot::Two => self.player2 += 1,
        }
    }

    pub fn get(&self, slot: Slot) -> u32 {
        match slot {
            Slot::One => self.player1,
            Slot::Two => self.player2,
        }
    }

    /// First slot (in slot order) at or over the threshold
    pub fn winner(&self, win_score: u32) -> Option<Slot> {
        Slot::ALL.into_iter().find(|slot| self.get(*slot) >= win_score)
    }
}

/// Two-entry free list handing out the lowest free slot
#[derive(Debug, Clone, Default)]
pub struct SlotAllocator {
    taken: [bool; 2],
}

impl SlotAllocator {
    pub fn acquire(&mut self) -> Option<Slot> {
        let slot = Slot::ALL.into_iter().find(|s| !self.taken[s.index()])?;
        self.taken[slot.index()] = true;
        Some(slot)
    }

    pub fn release(&mut self, slot: Slot) {
        self.taken[slot.index()] = false;
    }
}
