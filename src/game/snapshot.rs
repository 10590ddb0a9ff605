//! Periodic positional snapshots for observers

use crate::ws::protocol::{BulletSnapshot, PlayerSnapshot, ServerMsg};

use super::simulation::SimulationState;

/// Builds snapshots for network transmission
pub struct SnapshotBuilder {
    /// Tick counter since last snapshot
    ticks_since_snapshot: u32,
    /// Snapshot interval in ticks
    snapshot_interval: u32,
}

impl SnapshotBuilder {
    pub fn new(snapshot_interval: u32) -> Self {
        Self {
            ticks_since_snapshot: 0,
            snapshot_interval: snapshot_interval.max(1),
        }
    }

    /// Check if it's time to send a snapshot
    pub fn should_send(&mut self) -> bool {
        self.ticks_since_snapshot += 1;
        if self.ticks_since_snapshot >= self.snapshot_interval {
            self.ticks_since_snapshot = 0;
            true
        } else {
            false
        }
    }

    /// Force snapshot on next check (used for important events)
    pub fn force_next(&mut self) {
        self.ticks_since_snapshot = self.snapshot_interval;
    }

    /// Build a snapshot message
    pub fn build(&self, state: &SimulationState) -> ServerMsg {
        let players = state
            .players
            .iter()
            .map(|p| PlayerSnapshot {
                id: p.id,
                x: p.x,
                y: p.y,
                vx: p.vx,
                vy: p.vy,
                health: p.health,
            })
            .collect();

        let bullets = state
            .bullets
            .iter()
            .map(|b| BulletSnapshot {
                id: b.id.clone(),
                x: b.x,
                y: b.y,
                bounces: b.bounces,
            })
            .collect();

        ServerMsg::Snapshot {
            tick: state.tick,
            players,
            bullets,
            scores: state.scores,
            phase: state.phase(),
        }
    }
}
