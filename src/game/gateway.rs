//! Translates connection signals into simulation mutations
//!
//! Every rejected signal (third join, input outside an active round, shot
//! during cooldown, zero-length aim) is a silent no-op and yields no events.

use tracing::{debug, info};

use crate::ws::protocol::{Direction, GameEvent};

use super::combat::CombatSystem;
use super::entity::{ConnectionId, Player};
use super::simulation::{RoundPhase, SimulationState};

/// Inbound signal from one connection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Signal {
    Join,
    Leave,
    Move { direction: Direction, pressing: bool },
    Shoot { aim_x: f32, aim_y: f32 },
    Ready,
}

/// Apply a signal on behalf of `connection`
pub fn apply(state: &mut SimulationState, connection: ConnectionId, signal: Signal) -> Vec<GameEvent> {
    match signal {
        Signal::Join => join(state, connection),
        Signal::Leave => leave(state, connection),
        Signal::Move { direction, pressing } => {
            steer(state, connection, direction, pressing);
            Vec::new()
        }
        Signal::Shoot { aim_x, aim_y } => shoot(state, connection, aim_x, aim_y),
        Signal::Ready => ready(state, connection),
    }
}

fn join(state: &mut SimulationState, connection: ConnectionId) -> Vec<GameEvent> {
    if state.player(connection).is_some() {
        debug!(connection_id = %connection, "Already joined");
        return Vec::new();
    }

    let Some(slot) = state.slots.acquire() else {
        debug!(connection_id = %connection, "Arena full, join ignored");
        return Vec::new();
    };

    let player = Player::new(connection, slot, &state.config);
    state.players.push(player.clone());

    info!(
        connection_id = %connection,
        slot = slot.number(),
        player_count = state.players.len(),
        "Player joined arena"
    );

    let mut events = Vec::new();
    if state.players.len() == 2 && !state.ended {
        state.active = true;
        info!(tick = state.tick, "Round started");
        events.push(GameEvent::GameStart {});
    }
    events.push(GameEvent::PlayerJoined {
        player,
        total_players: state.players.len(),
    });
    events
}

fn leave(state: &mut SimulationState, connection: ConnectionId) -> Vec<GameEvent> {
    let Some(idx) = state.players.iter().position(|p| p.id == connection) else {
        return Vec::new();
    };

    let player = state.players.remove(idx);
    state.slots.release(player.slot);
    state.ready.remove(&connection);

    if state.players.len() < 2 {
        state.active = false;
    }

    info!(
        connection_id = %connection,
        slot = player.slot.number(),
        player_count = state.players.len(),
        "Player left arena"
    );

    vec![GameEvent::PlayerLeft {
        total_players: state.players.len(),
    }]
}

fn steer(state: &mut SimulationState, connection: ConnectionId, direction: Direction, pressing: bool) {
    if state.phase() != RoundPhase::Active {
        return;
    }
    let speed = state.config.player_speed;
    let Some(player) = state.player_mut(connection) else {
        return;
    };

    let magnitude = if pressing { speed } else { 0.0 };
    match direction {
        Direction::Up => player.vy = -magnitude,
        Direction::Down => player.vy = magnitude,
        Direction::Left => player.vx = -magnitude,
        Direction::Right => player.vx = magnitude,
    }
}

fn shoot(state: &mut SimulationState, connection: ConnectionId, aim_x: f32, aim_y: f32) -> Vec<GameEvent> {
    if state.phase() != RoundPhase::Active || !aim_x.is_finite() || !aim_y.is_finite() {
        return Vec::new();
    }

    let now = state.now_ms;
    let tick = state.tick;
    let cooldown = state.config.shoot_cooldown_ms;
    let Some(player) = state.players.iter_mut().find(|p| p.id == connection) else {
        return Vec::new();
    };

    if !CombatSystem::can_fire(player.last_shot_ms, now, cooldown) {
        return Vec::new();
    }
    // Cooldown starts even if the aim turns out to be degenerate
    player.last_shot_ms = Some(now);

    let Some(bullet) = CombatSystem::spawn_bullet(player, aim_x, aim_y, tick, &state.config) else {
        return Vec::new();
    };

    state.bullets.push(bullet.clone());
    vec![GameEvent::BulletFired { bullet }]
}

fn ready(state: &mut SimulationState, connection: ConnectionId) -> Vec<GameEvent> {
    if state.player(connection).is_none() {
        return Vec::new();
    }

    state.ready.insert(connection);
    let mut events = vec![GameEvent::PlayerReadyStatus {
        player_id: connection,
        ready_players: state.ready_players(),
        total_players: state.players.len(),
    }];

    let everyone_ready = state.players.iter().all(|p| state.ready.contains(&p.id));
    if state.ended && everyone_ready {
        events.extend(state.reset());
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::entity::Slot;
    use crate::game::simulation::tests::{open_arena, DT};
    use uuid::Uuid;

    #[test]
    fn two_joins_start_round_once() {
        let mut state = SimulationState::new(GameConfig::default(), 1);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let first = apply(&mut state, a, Signal::Join);
        assert!(matches!(&first[..], [GameEvent::PlayerJoined { player, total_players: 1 }] if player.slot == Slot::One));
        assert_eq!(state.phase(), RoundPhase::Lobby);

        let second = apply(&mut state, b, Signal::Join);
        assert!(matches!(second[0], GameEvent::GameStart {}));
        assert!(matches!(&second[1], GameEvent::PlayerJoined { player, total_players: 2 } if player.slot == Slot::Two));
        assert_eq!(state.phase(), RoundPhase::Active);

        // Duplicate join changes nothing
        assert!(apply(&mut state, b, Signal::Join).is_empty());
    }

    #[test]
    fn third_connection_is_rejected_silently() {
        let (mut state, _, _) = open_arena();
        let c = Uuid::new_v4();
        assert!(apply(&mut state, c, Signal::Join).is_empty());
        assert_eq!(state.players.len(), 2);
        assert!(state.player(c).is_none());
    }

    #[test]
    fn rejoin_takes_freed_slot() {
        let (mut state, a, b) = open_arena();
        let left = apply(&mut state, a, Signal::Leave);
        assert_eq!(left, vec![GameEvent::PlayerLeft { total_players: 1 }]);
        assert_eq!(state.phase(), RoundPhase::Lobby);

        let c = Uuid::new_v4();
        let events = apply(&mut state, c, Signal::Join);
        assert!(matches!(events[0], GameEvent::GameStart {}));
        assert_eq!(state.player(c).unwrap().slot, Slot::One);
        assert_eq!(state.player(b).unwrap().slot, Slot::Two);
        // Join order is kept: b first, then c
        assert_eq!(state.players[0].id, b);
    }

    #[test]
    fn move_sets_axis_velocity_only_while_active() {
        let mut state = SimulationState::new(GameConfig::default(), 1);
        let a = Uuid::new_v4();
        apply(&mut state, a, Signal::Join);
        apply(&mut state, a, Signal::Move { direction: Direction::Right, pressing: true });
        assert_eq!(state.player(a).unwrap().vx, 0.0);

        let (mut state, a, _) = open_arena();
        apply(&mut state, a, Signal::Move { direction: Direction::Up, pressing: true });
        apply(&mut state, a, Signal::Move { direction: Direction::Left, pressing: true });
        let p = state.player(a).unwrap();
        assert_eq!((p.vx, p.vy), (-5.0, -5.0));

        apply(&mut state, a, Signal::Move { direction: Direction::Up, pressing: false });
        assert_eq!(state.player(a).unwrap().vy, 0.0);

        // Unknown connection is a no-op
        assert!(apply(&mut state, Uuid::new_v4(), Signal::Move { direction: Direction::Down, pressing: true }).is_empty());
    }

    #[test]
    fn shooting_twice_within_cooldown_fires_once() {
        let (mut state, a, _) = open_arena();
        let shot = Signal::Shoot { aim_x: 400.0, aim_y: 100.0 };

        let first = apply(&mut state, a, shot);
        state.advance(DT);
        let second = apply(&mut state, a, shot);
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert_eq!(state.bullets.len(), 1);

        // 300ms later the gun is ready again
        for _ in 0..19 {
            state.advance(DT);
        }
        assert_eq!(apply(&mut state, a, shot).len(), 1);
    }

    #[test]
    fn degenerate_aim_is_ignored_but_starts_cooldown() {
        let (mut state, a, _) = open_arena();
        let p = state.player(a).unwrap().clone();
        assert!(apply(&mut state, a, Signal::Shoot { aim_x: p.x, aim_y: p.y }).is_empty());
        assert!(state.bullets.is_empty());
        assert!(apply(&mut state, a, Signal::Shoot { aim_x: 700.0, aim_y: 300.0 }).is_empty());
    }

    #[test]
    fn shooting_in_lobby_is_ignored() {
        let mut state = SimulationState::new(GameConfig::default(), 1);
        let a = Uuid::new_v4();
        apply(&mut state, a, Signal::Join);
        assert!(apply(&mut state, a, Signal::Shoot { aim_x: 700.0, aim_y: 300.0 }).is_empty());
    }

    #[test]
    fn game_over_then_ready_from_both_resets() {
        let (mut state, a, b) = open_arena();
        state.scores.player1 = state.config.win_score - 1;
        let p2 = state.player(b).unwrap().clone();
        state
            .bullets
            .push(crate::game::entity::Bullet::new(a, 0, p2.x - 2.0, p2.y, 8.0, 0.0));

        let events = state.advance(DT);
        let overs: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { winner: Slot::One, .. }))
            .collect();
        assert_eq!(overs.len(), 1);
        assert!(!state.active);

        // Input is frozen
        apply(&mut state, a, Signal::Move { direction: Direction::Down, pressing: true });
        assert_eq!(state.player(a).unwrap().vy, 0.0);
        assert!(apply(&mut state, b, Signal::Shoot { aim_x: 100.0, aim_y: 300.0 }).is_empty());

        let first = apply(&mut state, a, Signal::Ready);
        assert_eq!(
            first,
            vec![GameEvent::PlayerReadyStatus {
                player_id: a,
                ready_players: vec![a],
                total_players: 2,
            }]
        );
        assert_eq!(state.phase(), RoundPhase::Ended);

        let second = apply(&mut state, b, Signal::Ready);
        assert_eq!(second.len(), 3);
        assert!(matches!(&second[0], GameEvent::PlayerReadyStatus { ready_players, .. } if ready_players.len() == 2));
        assert!(matches!(second[1], GameEvent::ObstaclesUpdated { .. }));
        assert!(matches!(second[2], GameEvent::GameReset { .. }));
        assert_eq!(state.phase(), RoundPhase::Active);
        assert!(state.ready.is_empty());
    }

    #[test]
    fn ready_outside_ended_round_only_reports() {
        let (mut state, a, _) = open_arena();
        let events = apply(&mut state, a, Signal::Ready);
        assert_eq!(events.len(), 1);
        assert_eq!(state.phase(), RoundPhase::Active);
        assert!(apply(&mut state, Uuid::new_v4(), Signal::Ready).is_empty());
    }

    #[test]
    fn leaving_ended_round_and_rejoining_keeps_it_ended() {
        let (mut state, a, b) = open_arena();
        state.active = false;
        state.ended = true;
        apply(&mut state, a, Signal::Ready);

        apply(&mut state, b, Signal::Leave);
        assert_eq!(state.phase(), RoundPhase::Ended);
        assert_eq!(state.ready_players(), vec![a]);

        let c = Uuid::new_v4();
        let events = apply(&mut state, c, Signal::Join);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::GameStart {})));
        assert_eq!(state.phase(), RoundPhase::Ended);

        // Newcomer consents, everyone connected is ready
        let events = apply(&mut state, c, Signal::Ready);
        assert!(events.iter().any(|e| matches!(e, GameEvent::GameReset { .. })));
        assert_eq!(state.phase(), RoundPhase::Active);
    }
}
