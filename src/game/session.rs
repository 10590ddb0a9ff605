//! Arena session task: the fixed-period driver around the simulation

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::util::time::unix_millis;
use crate::ws::protocol::{GameEvent, ServerMsg};

use super::entity::ConnectionId;
use super::gateway::{self, Signal};
use super::simulation::SimulationState;
use super::snapshot::SnapshotBuilder;
use super::PlayerInput;

/// Snapshots go out every this many ticks
pub const SNAPSHOT_EVERY_TICKS: u32 = 3;

const INPUT_QUEUE_CAPACITY: usize = 256;
const BROADCAST_CAPACITY: usize = 256;

/// Handle to a running arena session
#[derive(Clone)]
pub struct ArenaHandle {
    input_tx: mpsc::Sender<PlayerInput>,
    events_tx: broadcast::Sender<ServerMsg>,
    player_count: Arc<AtomicUsize>,
    tick: Arc<AtomicU64>,
}

impl ArenaHandle {
    /// Queue a signal for the next tick
    pub async fn send(&self, connection_id: ConnectionId, signal: Signal) -> Result<(), SessionClosed> {
        self.input_tx
            .send(PlayerInput::new(connection_id, signal))
            .await
            .map_err(|_| SessionClosed)
    }

    /// Receive every outbound message from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ServerMsg> {
        self.events_tx.subscribe()
    }

    pub fn player_count(&self) -> usize {
        self.player_count.load(Ordering::Relaxed)
    }

    pub fn tick(&self) -> u64 {
        self.tick.load(Ordering::Relaxed)
    }
}

/// The session task has stopped accepting input
#[derive(Debug, thiserror::Error)]
#[error("Arena session is no longer running")]
pub struct SessionClosed;

/// The authoritative arena session
pub struct ArenaSession {
    state: SimulationState,
    input_rx: mpsc::Receiver<PlayerInput>,
    events_tx: broadcast::Sender<ServerMsg>,
    snapshot_builder: SnapshotBuilder,
    player_count: Arc<AtomicUsize>,
    tick: Arc<AtomicU64>,
    /// Every handle has been dropped
    inputs_closed: bool,
}

impl ArenaSession {
    /// Create a new session
    pub fn new(config: GameConfig, seed: u64) -> (Self, ArenaHandle) {
        let (input_tx, input_rx) = mpsc::channel(INPUT_QUEUE_CAPACITY);
        let (events_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        let player_count = Arc::new(AtomicUsize::new(0));
        let tick = Arc::new(AtomicU64::new(0));

        let handle = ArenaHandle {
            input_tx,
            events_tx: events_tx.clone(),
            player_count: player_count.clone(),
            tick: tick.clone(),
        };

        let session = Self {
            state: SimulationState::new(config, seed),
            input_rx,
            events_tx,
            snapshot_builder: SnapshotBuilder::new(SNAPSHOT_EVERY_TICKS),
            player_count,
            tick,
            inputs_closed: false,
        };

        (session, handle)
    }

    /// Run the fixed-period tick loop until every handle is dropped
    pub async fn run(mut self) {
        info!(
            obstacles = self.state.obstacles.len(),
            tick_ms = self.state.config.tick_period.as_millis() as u64,
            "Arena session started"
        );

        let mut tick_interval = interval(self.state.config.tick_period);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tick_interval.tick().await;

            for msg in self.step() {
                // No subscribers is fine
                let _ = self.events_tx.send(msg);
            }

            if self.inputs_closed {
                break;
            }
        }

        info!(tick = self.state.tick, "Arena session stopped");
    }

    /// One driver step: apply queued signals in arrival order, then advance
    pub fn step(&mut self) -> Vec<ServerMsg> {
        let mut out = self.process_inputs();

        let events = self.state.advance(self.state.config.tick_period);
        if !events.is_empty() {
            self.snapshot_builder.force_next();
        }
        out.extend(events.into_iter().map(|event| ServerMsg::Event { event }));

        if self.snapshot_builder.should_send() {
            out.push(self.snapshot_builder.build(&self.state));
        }

        self.player_count.store(self.state.players.len(), Ordering::Relaxed);
        self.tick.store(self.state.tick, Ordering::Relaxed);
        out
    }

    /// Drain the input queue
    fn process_inputs(&mut self) -> Vec<ServerMsg> {
        let mut out = Vec::new();
        loop {
            let input = match self.input_rx.try_recv() {
                Ok(input) => input,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.inputs_closed = true;
                    break;
                }
            };

            let lag_ms = unix_millis().saturating_sub(input.received_at);
            if lag_ms > 1_000 {
                warn!(connection_id = %input.connection_id, lag_ms, "Stale input applied");
            }

            let events = gateway::apply(&mut self.state, input.connection_id, input.signal);
            let round_changed = events.iter().any(|e| {
                matches!(
                    e,
                    GameEvent::GameStart {} | GameEvent::GameReset { .. } | GameEvent::PlayerLeft { .. }
                )
            });
            if round_changed {
                self.snapshot_builder.force_next();
            }
            out.extend(events.into_iter().map(|event| ServerMsg::Event { event }));

            if input.signal == Signal::Join {
                debug!(connection_id = %input.connection_id, "Sending arena sync");
                out.push(self.sync_message());
            }
        }
        out
    }

    fn sync_message(&self) -> ServerMsg {
        ServerMsg::Sync {
            obstacles: self.state.obstacles.clone(),
            players: self.state.players.clone(),
            scores: self.state.scores,
            phase: self.state.phase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::RoundPhase;
    use std::time::Duration;
    use tokio::time::timeout;
    use tokio_test::assert_ok;
    use uuid::Uuid;

    fn event_names(msgs: &[ServerMsg]) -> Vec<&'static str> {
        msgs.iter()
            .filter_map(|m| match m {
                ServerMsg::Event { event } => Some(match event {
                    GameEvent::PlayerJoined { .. } => "player-joined",
                    GameEvent::PlayerLeft { .. } => "player-left",
                    GameEvent::GameStart {} => "game-start",
                    GameEvent::BulletFired { .. } => "bullet-fired",
                    GameEvent::PlayerHit { .. } => "player-hit",
                    GameEvent::GameOver { .. } => "game-over",
                    GameEvent::ObstaclesUpdated { .. } => "obstacles-updated",
                    GameEvent::GameReset { .. } => "game-reset",
                    GameEvent::PlayerReadyStatus { .. } => "player-ready-status",
                }),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn step_applies_queued_signals_in_order() {
        let (mut session, handle) = ArenaSession::new(GameConfig::default(), 5);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_ok!(handle.send(a, Signal::Join).await);
        assert_ok!(handle.send(b, Signal::Join).await);
        assert_ok!(handle.send(a, Signal::Shoot { aim_x: 700.0, aim_y: 300.0 }).await);

        let out = session.step();
        assert_eq!(
            event_names(&out),
            vec!["player-joined", "game-start", "player-joined", "bullet-fired"]
        );
        // Sync after each join, snapshot forced by the round start
        assert_eq!(out.iter().filter(|m| matches!(m, ServerMsg::Sync { .. })).count(), 2);
        assert!(matches!(out.last(), Some(ServerMsg::Snapshot { phase: RoundPhase::Active, .. })));
        assert_eq!(handle.player_count(), 2);
        assert_eq!(handle.tick(), 1);
    }

    #[tokio::test]
    async fn running_session_broadcasts_round_start() {
        let (session, handle) = ArenaSession::new(GameConfig::default(), 5);
        let mut rx = handle.subscribe();
        let task = tokio::spawn(session.run());

        assert_ok!(handle.send(Uuid::new_v4(), Signal::Join).await);
        assert_ok!(handle.send(Uuid::new_v4(), Signal::Join).await);

        let started = timeout(Duration::from_secs(2), async {
            loop {
                match rx.recv().await {
                    Ok(ServerMsg::Event { event: GameEvent::GameStart {} }) => break true,
                    Ok(_) => continue,
                    Err(_) => break false,
                }
            }
        })
        .await;
        assert!(assert_ok!(started));

        drop(rx);
        drop(handle);
        assert_ok!(assert_ok!(timeout(Duration::from_secs(2), task).await));
    }
}
