//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::entity::{Bullet, Obstacle, Player, Scores, Slot};
use crate::game::RoundPhase;

/// Movement key reported by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Movement key pressed or released
    Move {
        direction: Direction,
        pressing: bool,
    },

    /// Fire towards a point in arena coordinates
    Shoot { aim_x: f32, aim_y: f32 },

    /// Consent to a rematch after a round has ended
    Ready,

    /// Ping for latency measurement
    Ping {
        /// Client timestamp
        t: u64,
    },
}

/// Parse a text frame into a client message
pub fn parse_client_msg(text: &str) -> Result<ClientMsg, ProtocolError> {
    if text.len() > MAX_FRAME_LEN {
        return Err(ProtocolError::TooLarge(text.len()));
    }
    Ok(serde_json::from_str(text)?)
}

/// Largest text frame accepted from a client
pub const MAX_FRAME_LEN: usize = 1024;

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Message too large ({0} bytes)")]
    TooLarge(usize),
}

impl ProtocolError {
    pub fn code(&self) -> &'static str {
        match self {
            ProtocolError::Malformed(_) => "malformed",
            ProtocolError::TooLarge(_) => "too_large",
        }
    }
}

/// State-change notifications emitted by the simulation, in discovery order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum GameEvent {
    PlayerJoined {
        player: Player,
        total_players: usize,
    },

    PlayerLeft {
        total_players: usize,
    },

    GameStart {},

    BulletFired {
        bullet: Bullet,
    },

    PlayerHit {
        victim: Uuid,
        shooter: Uuid,
        scores: Scores,
    },

    GameOver {
        winner: Slot,
        scores: Scores,
    },

    ObstaclesUpdated {
        obstacles: Vec<Obstacle>,
    },

    GameReset {
        scores: Scores,
    },

    PlayerReadyStatus {
        player_id: Uuid,
        ready_players: Vec<Uuid>,
        total_players: usize,
    },
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Welcome message after connection
    Welcome {
        connection_id: Uuid,
        server_time: u64,
    },

    /// Full arena layout and roster, sent whenever someone connects
    Sync {
        obstacles: Vec<Obstacle>,
        players: Vec<Player>,
        scores: Scores,
        phase: RoundPhase,
    },

    /// Simulation event
    Event {
        #[serde(flatten)]
        event: GameEvent,
    },

    /// Positional state (sent at regular intervals)
    Snapshot {
        /// Server tick number
        tick: u64,
        players: Vec<PlayerSnapshot>,
        bullets: Vec<BulletSnapshot>,
        scores: Scores,
        phase: RoundPhase,
    },

    /// Error message
    Error {
        code: String,
        message: String,
    },

    /// Pong response
    Pong {
        /// Echo back client timestamp
        t: u64,
    },
}

/// Player state in a snapshot
#[derive(Debug, Clone, Serialize)]
pub struct PlayerSnapshot {
    pub id: Uuid,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub health: u32,
}

/// Bullet state in a snapshot
#[derive(Debug, Clone, Serialize)]
pub struct BulletSnapshot {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub bounces: u32,
}
