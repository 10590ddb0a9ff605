//! Game simulation modules

pub mod arena;
pub mod collision;
pub mod combat;
pub mod entity;
pub mod gateway;
pub mod physics;
pub mod session;
pub mod simulation;
pub mod snapshot;

pub use gateway::Signal;
pub use session::{ArenaHandle, ArenaSession};
pub use simulation::RoundPhase;

use crate::util::time::unix_millis;
use entity::ConnectionId;

/// Signal received from a connection, queued for the session task
#[derive(Debug, Clone)]
pub struct PlayerInput {
    pub connection_id: ConnectionId,
    pub signal: Signal,
    pub received_at: u64,
}

impl PlayerInput {
    pub fn new(connection_id: ConnectionId, signal: Signal) -> Self {
        Self {
            connection_id,
            signal,
            received_at: unix_millis(),
        }
    }
}
