//! Authoritative round state and the per-tick update pipeline

use std::collections::HashSet;
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::ws::protocol::GameEvent;

use super::arena;
use super::combat::CombatSystem;
use super::entity::{Bullet, ConnectionId, Obstacle, Player, Scores, SlotAllocator};
use super::physics::{BulletStep, PhysicsSystem};

/// Round phase, derived from the `active` / `ended` flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    /// Waiting for a second player
    Lobby,
    /// Simulation advancing
    Active,
    /// Win condition met, waiting for rematch consent
    Ended,
}

/// Everything the simulation owns (single writer)
pub struct SimulationState {
    pub config: GameConfig,
    /// Join order
    pub players: Vec<Player>,
    /// Spawn order
    pub bullets: Vec<Bullet>,
    pub obstacles: Vec<Obstacle>,
    pub scores: Scores,
    pub active: bool,
    pub ended: bool,
    pub ready: HashSet<ConnectionId>,
    pub slots: SlotAllocator,
    pub tick: u64,
    /// Simulation clock, advanced by every `advance` call
    pub now_ms: u64,
    pub rng: ChaCha8Rng,
}

impl SimulationState {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let obstacles = arena::generate_for(&config, &mut rng);
        Self::with_obstacles(config, obstacles, rng)
    }

    /// Start from a fixed obstacle layout
    pub fn with_obstacles(config: GameConfig, obstacles: Vec<Obstacle>, rng: ChaCha8Rng) -> Self {
        Self {
            config,
            players: Vec::with_capacity(2),
            bullets: Vec::new(),
            obstacles,
            scores: Scores::default(),
            active: false,
            ended: false,
            ready: HashSet::new(),
            slots: SlotAllocator::default(),
            tick: 0,
            now_ms: 0,
            rng,
        }
    }

    pub fn phase(&self) -> RoundPhase {
        if self.active {
            RoundPhase::Active
        } else if self.ended {
            RoundPhase::Ended
        } else {
            RoundPhase::Lobby
        }
    }

    pub fn player(&self, id: ConnectionId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: ConnectionId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Ready-set in join order
    pub fn ready_players(&self) -> Vec<ConnectionId> {
        self.players
            .iter()
            .map(|p| p.id)
            .filter(|id| self.ready.contains(id))
            .collect()
    }

    /// Advance the simulation by one tick of length `dt`
    ///
    /// The clock always moves; the pipeline only runs while the round is
    /// active. Events are returned in the order they were discovered.
    pub fn advance(&mut self, dt: Duration) -> Vec<GameEvent> {
        self.tick += 1;
        self.now_ms += dt.as_millis() as u64;

        if !self.active {
            return Vec::new();
        }

        self.update_players();
        self.update_bullets();
        self.resolve_combat()
    }

    fn update_players(&mut self) {
        for player in &mut self.players {
            PhysicsSystem::move_player(player, &self.obstacles, &self.config);
        }
    }

    fn update_bullets(&mut self) {
        let mut removed: Vec<usize> = Vec::new();
        for (idx, bullet) in self.bullets.iter_mut().enumerate() {
            match PhysicsSystem::move_bullet(bullet, &self.obstacles, &self.config) {
                BulletStep::Flying => {}
                BulletStep::Blocked | BulletStep::Spent => removed.push(idx),
            }
        }

        for idx in removed.into_iter().rev() {
            self.bullets.remove(idx);
        }
    }

    /// Check every bullet against every opponent; one hit per bullet
    fn resolve_combat(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let mut idx = 0;

        'bullets: while idx < self.bullets.len() {
            for victim_idx in 0..self.players.len() {
                if !CombatSystem::check_hit(&self.bullets[idx], &self.players[victim_idx], &self.config) {
                    continue;
                }

                let bullet = self.bullets.remove(idx);
                let victim = &mut self.players[victim_idx];
                CombatSystem::apply_hit(victim, &bullet, &self.config);
                let victim_id = victim.id;
                let victim_down = victim.health == 0;

                // Shooter may have disconnected with the bullet still in flight
                if let Some(slot) = self.player(bullet.owner).map(|p| p.slot) {
                    self.scores.credit(slot);
                }

                debug!(
                    tick = self.tick,
                    victim = %victim_id,
                    shooter = %bullet.owner,
                    "Player hit"
                );
                events.push(GameEvent::PlayerHit {
                    victim: victim_id,
                    shooter: bullet.owner,
                    scores: self.scores,
                });

                if let Some(winner) = self.scores.winner(self.config.win_score) {
                    self.ended = true;
                    self.active = false;
                    self.ready.clear();
                    info!(
                        tick = self.tick,
                        winner = winner.number(),
                        player1 = self.scores.player1,
                        player2 = self.scores.player2,
                        "Round over"
                    );
                    events.push(GameEvent::GameOver {
                        winner,
                        scores: self.scores,
                    });
                    break 'bullets;
                }

                if victim_down {
                    let config = &self.config;
                    self.players[victim_idx].respawn(config);
                }

                continue 'bullets;
            }
            idx += 1;
        }

        events
    }

    /// Start a fresh round with the current players
    pub fn reset(&mut self) -> Vec<GameEvent> {
        self.bullets.clear();
        self.scores = Scores::default();
        self.ended = false;
        self.active = self.players.len() == 2;
        self.ready.clear();

        self.obstacles = arena::generate_for(&self.config, &mut self.rng);
        for player in &mut self.players {
            player.respawn(&self.config);
        }

        info!(tick = self.tick, players = self.players.len(), "Round reset");

        vec![
            GameEvent::ObstaclesUpdated {
                obstacles: self.obstacles.clone(),
            },
            GameEvent::GameReset {
                scores: self.scores,
            },
        ]
    }
}
