//! Game session: score, restart, and wiring between player and stairs
//!
//! The session owns the stair ring, the player, and every in-flight landing
//! monitor. Hosts read its state for rendering and drain `GameEvent`s for
//! audio, UI and leaderboard hooks.

use serde::{Deserialize, Serialize};

use super::bounds::{Body, ContactGeometry};
use super::landing::{LandingMonitor, LandingStatus};
use super::player::{DeathCause, MoveOutcome, PlayerStateMachine, TimerEvents};
use super::stairs::{SlotVisual, StairKind, StairRing, Turn};
use crate::error::{ConfigError, Result};
use crate::tuning::Tuning;

/// Name reported at game over when the host never set one
pub const DEFAULT_PLAYER_NAME: &str = "Player";

/// What the host receives when a run ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOverReport {
    pub player_name: String,
    pub score: u64,
    pub cause: DeathCause,
    pub best_score: u64,
    pub new_best: bool,
}

/// Notable things that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Player stepped onto a stair
    Moved { slot: usize, score: u64 },
    StairRespawned { slot: usize, kind: StairKind },
    ConfuseStarted { duration: f32 },
    ConfuseEnded,
    AfterimageStarted,
    AfterimageEnded,
    GameOver(GameOverReport),
    Restarted { retry_count: u32 },
}

/// How the ring is laid out on start and restart
#[derive(Debug, Clone)]
enum Layout {
    Generated,
    Scripted(Vec<Turn>),
}

/// A single-player run of the game
#[derive(Debug, Clone)]
pub struct GameSession {
    tuning: Tuning,
    seed: u64,
    layout: Layout,
    /// Session clock in seconds
    time: f64,
    score: u64,
    best_score: u64,
    retry_count: u32,
    player_name: String,
    ring: StairRing,
    player: PlayerStateMachine,
    /// One monitor per stair currently being watched
    landings: Vec<LandingMonitor>,
    events: Vec<GameEvent>,
}

impl GameSession {
    /// Start a session with a generated staircase
    pub fn new(tuning: Tuning, seed: u64) -> Result<Self> {
        tuning.validate()?;
        let ring = StairRing::new(tuning.ring_size, &tuning, seed);
        Ok(Self::build(tuning, seed, Layout::Generated, ring))
    }

    /// Start a session on a fixed turn sequence (all stairs normal).
    ///
    /// The first turn must be `Turn::Right`: the player always starts one
    /// right step below the first stair.
    pub fn scripted(tuning: Tuning, turns: &[Turn], seed: u64) -> Result<Self> {
        let tuning = Tuning {
            ring_size: turns.len(),
            ..tuning
        };
        tuning.validate()?;
        if turns.first() != Some(&Turn::Right) {
            return Err(ConfigError::ScriptedStartsLeft);
        }
        let ring = StairRing::from_turns(turns, &tuning, seed);
        Ok(Self::build(tuning, seed, Layout::Scripted(turns.to_vec()), ring))
    }

    fn build(tuning: Tuning, seed: u64, layout: Layout, ring: StairRing) -> Self {
        if tuning.ring_size <= tuning.respawn_after_moves as usize + 1 {
            log::warn!(
                "Ring of {} stairs is too small to recycle after {} moves; stairs ahead will be overwritten",
                tuning.ring_size,
                tuning.respawn_after_moves
            );
        }
        log::info!("Session started with seed {} ({} stairs)", seed, ring.len());

        let player = PlayerStateMachine::new(&tuning);
        Self {
            tuning,
            seed,
            layout,
            time: 0.0,
            score: 0,
            best_score: 0,
            retry_count: 0,
            player_name: DEFAULT_PLAYER_NAME.to_string(),
            ring,
            player,
            landings: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Advance the clock and run player timers (confuse expiry, afterimage
    /// decay, move deadline)
    pub fn advance(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.time += f64::from(dt);
        let timers = self.player.advance(dt, self.time);
        self.apply_timer_events(timers);
    }

    /// Advance memory stair fade cycles
    pub fn advance_stairs(&mut self, dt: f32) {
        self.ring.advance(dt.max(0.0));
    }

    /// Judge a left/right input at the current session time
    pub fn resolve_move(&mut self, requested: Turn) -> MoveOutcome {
        let outcome = self.player.resolve_move(requested, self.time, &mut self.ring);
        match outcome {
            MoveOutcome::Ignored => {}
            MoveOutcome::Advanced {
                slot,
                respawned,
                afterimage_started,
            } => {
                self.score += 1;
                if afterimage_started {
                    self.events.push(GameEvent::AfterimageStarted);
                }
                self.events.push(GameEvent::Moved {
                    slot,
                    score: self.score,
                });
                if let Some(index) = respawned {
                    // A recycled stair is a different stair now
                    self.landings.retain(|m| m.slot() != index);
                    self.events.push(GameEvent::StairRespawned {
                        slot: index,
                        kind: self.ring.slot(index).kind,
                    });
                }
            }
            MoveOutcome::Died(cause) => self.game_over(cause),
        }
        outcome
    }

    /// Host collision callback: the player's box started touching stair `slot`.
    ///
    /// Only confuse stairs are watched, and a stair already being watched is
    /// not restarted. Unknown slots are ignored.
    pub fn on_contact_begin(&mut self, slot: usize, player: &Body) {
        if !self.player.is_alive() {
            return;
        }
        let Some(stair) = self.ring.get(slot) else {
            return;
        };
        if stair.kind != StairKind::ConfuseControl {
            return;
        }
        if self.landings.iter().any(|m| m.slot() == slot) {
            return;
        }
        log::debug!("Watching landing on confuse stair {}", slot);
        self.landings
            .push(LandingMonitor::new(slot, player.position(), self.tuning.landing));
    }

    /// Step every landing monitor against the host's current geometry
    pub fn update_landings(&mut self, dt: f32, geometry: &dyn ContactGeometry) {
        if self.landings.is_empty() {
            return;
        }

        let player = geometry.player_body();
        let mut triggered = false;
        for monitor in &mut self.landings {
            let stair = geometry.stair_bounds(monitor.slot());
            let status = match (player.as_ref(), stair) {
                (Some(player), Some(stair)) => monitor.step(dt, player, &stair),
                // Geometry gone: the contact is over
                _ => {
                    monitor.cancel();
                    LandingStatus::Left
                }
            };
            if status == LandingStatus::Triggered {
                triggered = true;
            }
        }
        self.landings.retain(|m| !m.status().is_finished());

        if !triggered {
            return;
        }
        // Zero asks the player for its default duration
        if let Some(duration) = self.player.activate_confuse(0.0, self.time) {
            log::info!("Controls confused for {:.1}s", duration);
            self.events.push(GameEvent::ConfuseStarted { duration });
        }
    }

    /// Reinitialize stairs, player and score for a new run
    pub fn restart(&mut self) {
        self.retry_count += 1;
        match &self.layout {
            Layout::Generated => {
                self.ring.reseed(self.seed.wrapping_add(u64::from(self.retry_count)));
                self.ring.initialize(self.tuning.ring_size);
            }
            Layout::Scripted(turns) => {
                self.ring = StairRing::from_turns(turns, &self.tuning, self.seed);
            }
        }
        self.player.reset();
        self.landings.clear();
        self.score = 0;
        log::info!("Restarted (retry #{})", self.retry_count);
        self.events.push(GameEvent::Restarted {
            retry_count: self.retry_count,
        });
    }

    fn apply_timer_events(&mut self, timers: TimerEvents) {
        if timers.confuse_ended {
            log::debug!("Confuse effect ended");
            self.events.push(GameEvent::ConfuseEnded);
        }
        if timers.afterimage_ended {
            self.events.push(GameEvent::AfterimageEnded);
        }
        if let Some(cause) = timers.died {
            self.game_over(cause);
        }
    }

    fn game_over(&mut self, cause: DeathCause) {
        self.landings.clear();

        let new_best = self.score > self.best_score;
        if new_best {
            self.best_score = self.score;
        }
        log::info!(
            "Game over ({}): {} scored {} (best {})",
            cause.as_str(),
            self.player_name,
            self.score,
            self.best_score
        );
        self.events.push(GameEvent::GameOver(GameOverReport {
            player_name: self.player_name.clone(),
            score: self.score,
            cause,
            best_score: self.best_score,
            new_best,
        }));
    }

    /// Take all events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn set_player_name(&mut self, name: impl Into<String>) {
        self.player_name = name.into();
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Highest score reached in this session
    pub fn best_score(&self) -> u64 {
        self.best_score
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn is_alive(&self) -> bool {
        self.player.is_alive()
    }

    pub fn death_cause(&self) -> Option<DeathCause> {
        self.player.death_cause()
    }

    pub fn player(&self) -> &PlayerStateMachine {
        &self.player
    }

    pub fn ring(&self) -> &StairRing {
        &self.ring
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn stair_visuals(&self) -> Vec<SlotVisual> {
        self.ring.visuals()
    }

    pub fn is_confused(&self) -> bool {
        self.player.confuse().is_active()
    }

    /// Seconds of reversed controls left
    pub fn confuse_remaining(&self) -> f32 {
        self.player.confuse().remaining(self.time)
    }

    /// Confuse gauge fill in [0, 1]
    pub fn confuse_gauge(&self) -> f32 {
        self.player.confuse().gauge_ratio(self.time)
    }

    pub fn afterimage_active(&self) -> bool {
        self.player.afterimage().is_active()
    }

    /// Move deadline bar fill in [0, 1]
    pub fn timer_fill(&self) -> f32 {
        self.player.death_timer().fill()
    }

    /// Stairs with a landing monitor running
    pub fn watched_stairs(&self) -> Vec<usize> {
        self.landings.iter().map(|m| m.slot()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::bounds::{Aabb, NoGeometry};
    use glam::Vec2;

    const RLR: [Turn; 3] = [Turn::Right, Turn::Left, Turn::Right];

    /// Player standing still on top of stair 0 only
    struct StandingOnFirst;

    impl ContactGeometry for StandingOnFirst {
        fn player_body(&self) -> Option<Body> {
            Some(standing_body())
        }

        fn stair_bounds(&self, slot: usize) -> Option<Aabb> {
            (slot == 0).then(|| Aabb::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.2)))
        }
    }

    fn standing_body() -> Body {
        Body::new(
            Aabb::new(Vec2::new(0.25, 0.2), Vec2::new(0.75, 0.8)),
            Vec2::ZERO,
        )
    }

    /// Session whose every stair is a confuse stair
    fn confuse_session() -> GameSession {
        let tuning = Tuning {
            confuse_chance: 1.0,
            memory_chance: 0.0,
            ring_size: 10,
            ..Default::default()
        };
        GameSession::new(tuning, 5).unwrap()
    }

    #[test]
    fn test_scripted_run_scores_each_move() {
        let mut session = GameSession::scripted(Tuning::default(), &RLR, 0).unwrap();
        for turn in RLR {
            assert!(matches!(session.resolve_move(turn), MoveOutcome::Advanced { .. }));
            session.advance(0.2);
        }
        assert!(session.is_alive());
        assert_eq!(session.score(), 3);
    }

    #[test]
    fn test_wrong_first_move_ends_game() {
        let mut session = GameSession::scripted(Tuning::default(), &RLR, 0).unwrap();
        session.set_player_name("mina");
        assert_eq!(
            session.resolve_move(Turn::Left),
            MoveOutcome::Died(DeathCause::WrongTurn)
        );
        assert_eq!(session.score(), 0);
        assert_eq!(session.death_cause(), Some(DeathCause::WrongTurn));

        let events = session.drain_events();
        assert_eq!(
            events,
            vec![GameEvent::GameOver(GameOverReport {
                player_name: "mina".to_string(),
                score: 0,
                cause: DeathCause::WrongTurn,
                best_score: 0,
                new_best: false,
            })]
        );
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_invalid_tuning_rejected() {
        let tuning = Tuning {
            ring_size: 0,
            ..Default::default()
        };
        assert!(GameSession::new(tuning, 1).is_err());
        assert!(GameSession::scripted(Tuning::default(), &[], 1).is_err());
    }

    #[test]
    fn test_scripted_must_start_right() {
        let result = GameSession::scripted(Tuning::default(), &[Turn::Left, Turn::Right], 0);
        assert!(matches!(result, Err(ConfigError::ScriptedStartsLeft)));

        // A correct first move puts the player exactly on the first stair
        let mut session = GameSession::scripted(Tuning::default(), &RLR, 0).unwrap();
        session.resolve_move(Turn::Right);
        let stair = session.ring().slot(0).position;
        assert!(session.player().position().distance(stair) < 1e-5);
    }

    #[test]
    fn test_timeout_reports_game_over() {
        let mut session = GameSession::scripted(Tuning::default(), &RLR, 0).unwrap();
        session.advance(5.0);
        assert!(session.is_alive());

        session.resolve_move(Turn::Right);
        session.advance(0.6);
        assert!(session.is_alive());
        assert!((session.timer_fill() - 0.4).abs() < 1e-5);
        session.advance(0.4);
        assert_eq!(session.death_cause(), Some(DeathCause::Timeout));

        let events = session.drain_events();
        assert!(matches!(
            events.last(),
            Some(GameEvent::GameOver(GameOverReport { score: 1, new_best: true, .. }))
        ));
        assert_eq!(session.best_score(), 1);
    }

    #[test]
    fn test_restart_resets_run_and_keeps_best() {
        let mut session = GameSession::new(Tuning::default(), 9).unwrap();
        for _ in 0..4 {
            let turn = session.player().winning_input(session.ring()).unwrap();
            session.resolve_move(turn);
        }
        let wrong = session.player().winning_input(session.ring()).unwrap().opposite();
        session.resolve_move(wrong);
        assert!(!session.is_alive());
        assert_eq!(session.best_score(), 4);

        session.restart();
        assert!(session.is_alive());
        assert_eq!(session.score(), 0);
        assert_eq!(session.best_score(), 4);
        assert_eq!(session.retry_count(), 1);
        assert_eq!(session.player().turn_cursor(), 0);
        assert_eq!(session.ring().len(), 20);
        assert!(session.watched_stairs().is_empty());
        assert!(matches!(
            session.drain_events().last(),
            Some(GameEvent::Restarted { retry_count: 1 })
        ));
    }

    #[test]
    fn test_settled_landing_confuses_once() {
        let mut session = confuse_session();
        session.resolve_move(Turn::Right);
        session.on_contact_begin(0, &standing_body());
        // Re-entry while watching does not start a second monitor
        session.on_contact_begin(0, &standing_body());
        assert_eq!(session.watched_stairs(), vec![0]);

        let dt = 1.0 / 60.0;
        for _ in 0..10 {
            session.advance(dt);
            session.update_landings(dt, &StandingOnFirst);
        }
        assert!(session.is_confused());
        assert!(session.watched_stairs().is_empty());

        let started = session
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::ConfuseStarted { .. }))
            .count();
        assert_eq!(started, 1);
        assert!((session.confuse_remaining() - 15.0).abs() < 0.5);
    }

    #[test]
    fn test_lost_contact_does_not_confuse() {
        let mut session = confuse_session();
        session.resolve_move(Turn::Right);
        session.on_contact_begin(0, &standing_body());
        session.advance(0.01);
        session.update_landings(0.01, &NoGeometry);
        assert!(session.watched_stairs().is_empty());
        assert!(!session.is_confused());
    }

    #[test]
    fn test_normal_stairs_are_not_watched() {
        let mut session = GameSession::scripted(Tuning::default(), &RLR, 0).unwrap();
        session.on_contact_begin(0, &standing_body());
        session.on_contact_begin(99, &standing_body());
        assert!(session.watched_stairs().is_empty());
    }

    #[test]
    fn test_death_cancels_landing_watch() {
        let mut session = confuse_session();
        session.resolve_move(Turn::Right);
        session.on_contact_begin(0, &standing_body());
        session.advance(1.0);
        assert!(!session.is_alive());
        assert!(session.watched_stairs().is_empty());
    }

    #[test]
    fn test_wrong_turn_cancels_landing_watch() {
        let mut session = confuse_session();
        session.resolve_move(Turn::Right);
        session.on_contact_begin(0, &standing_body());
        let wrong = session.player().winning_input(session.ring()).unwrap().opposite();
        assert_eq!(
            session.resolve_move(wrong),
            MoveOutcome::Died(DeathCause::WrongTurn)
        );
        assert!(session.watched_stairs().is_empty());
    }

    #[test]
    fn test_restart_cancels_landing_watch() {
        let mut session = confuse_session();
        session.resolve_move(Turn::Right);
        session.on_contact_begin(0, &standing_body());
        assert_eq!(session.watched_stairs(), vec![0]);

        session.restart();
        assert!(session.watched_stairs().is_empty());
        session.update_landings(1.0 / 60.0, &StandingOnFirst);
        assert!(!session.is_confused());
    }

    #[test]
    fn test_respawned_stair_drops_its_watch() {
        let mut session = confuse_session();
        session.resolve_move(Turn::Right);
        session.on_contact_begin(0, &standing_body());

        // Stair 0 is recycled on the sixth move
        for _ in 0..4 {
            let turn = session.player().winning_input(session.ring()).unwrap();
            session.resolve_move(turn);
        }
        assert_eq!(session.watched_stairs(), vec![0]);
        session.drain_events();

        let turn = session.player().winning_input(session.ring()).unwrap();
        assert!(matches!(
            session.resolve_move(turn),
            MoveOutcome::Advanced { respawned: Some(0), .. }
        ));
        assert!(session.watched_stairs().is_empty());
        assert!(
            session
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::StairRespawned { slot: 0, .. }))
        );
    }

    /// Player standing on stair 1, with stair 0 far away
    struct StandingOnSecond;

    impl ContactGeometry for StandingOnSecond {
        fn player_body(&self) -> Option<Body> {
            Some(standing_body())
        }

        fn stair_bounds(&self, slot: usize) -> Option<Aabb> {
            match slot {
                0 => Some(Aabb::new(Vec2::new(5.0, 5.0), Vec2::new(6.0, 5.2))),
                1 => Some(Aabb::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.2))),
                _ => None,
            }
        }
    }

    #[test]
    fn test_contacts_on_two_stairs_are_independent() {
        let mut session = confuse_session();
        for _ in 0..2 {
            let turn = session.player().winning_input(session.ring()).unwrap();
            session.resolve_move(turn);
        }
        session.on_contact_begin(0, &standing_body());
        session.on_contact_begin(1, &standing_body());
        assert_eq!(session.watched_stairs(), vec![0, 1]);

        let dt = 1.0 / 60.0;
        session.advance(dt);
        session.update_landings(dt, &StandingOnSecond);
        // Left stair 0, still settling on stair 1
        assert_eq!(session.watched_stairs(), vec![1]);
        assert!(!session.is_confused());

        for _ in 0..9 {
            session.advance(dt);
            session.update_landings(dt, &StandingOnSecond);
        }
        assert!(session.is_confused());
        assert!(session.watched_stairs().is_empty());
    }

    #[test]
    fn test_confuse_expires_with_event() {
        let mut session = confuse_session();
        session.resolve_move(Turn::Right);
        session.on_contact_begin(0, &standing_body());
        let dt = 1.0 / 60.0;
        for _ in 0..10 {
            session.update_landings(dt, &StandingOnFirst);
        }
        assert!(session.is_confused());

        // Keep the player alive with correct (inverted) inputs until it wears off
        while session.is_confused() {
            session.advance(0.5);
            if let Some(turn) = session.player().winning_input(session.ring()) {
                session.resolve_move(turn);
            }
        }
        assert!(session.is_alive());
        assert!(session.drain_events().contains(&GameEvent::ConfuseEnded));
    }
}
