//! The runner loop: one fixed-size simulation step per `tick()`.
//!
//! [`RunnerLoop`] owns the player, the obstacle list and the run state. A host
//! calls [`RunnerLoop::tick`] at a regular cadence and forwards jump triggers
//! to [`RunnerLoop::jump`]. Nothing here blocks or performs I/O, so a test can
//! drive the loop synchronously and inspect every field between ticks.

use dash_common::{ConfigError, ObstacleId, ObstacleIdAllocator, SchemaVersion};
use tracing::{debug, info};

use crate::collision::ThresholdBox;
use crate::config::RunnerConfig;
use crate::events::{EventBus, RunEvent};
use crate::obstacle::{Obstacle, ObstacleKind};
use crate::player::{Motion, PlayerBody};
use crate::rng::{RandomSource, SpawnRng};
use crate::snapshot::{ObstacleView, PlayerPose, RenderSnapshot};
use crate::state::{RunPhase, RunState};

/// What a `jump()` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpOutcome {
    /// The run was waiting and has now started; the player did not move
    Started,
    /// The player left the floor
    Jumped,
    /// Airborne or crashed; nothing happened and nothing was queued
    Ignored,
}

/// Summary of one `tick()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    /// The simulation advanced (phase was `Running`)
    pub advanced: bool,
    /// Obstacle spawned this tick
    pub spawned: Option<ObstacleId>,
    /// Obstacles retired (and scored) this tick
    pub retired: u32,
    /// The run crashed this tick
    pub crashed: bool,
}

/// Side-scrolling jump game simulation.
#[derive(Debug)]
pub struct RunnerLoop<R = SpawnRng> {
    config: RunnerConfig,
    collision: ThresholdBox,
    player: PlayerBody,
    /// Oldest first; the last entry is the most recent spawn
    obstacles: Vec<Obstacle>,
    state: RunState,
    rng: R,
    ids: ObstacleIdAllocator,
    events: EventBus,
    ticks: u64,
}

impl<R: RandomSource> RunnerLoop<R> {
    /// Creates a runner after validating `config`.
    pub fn new(config: RunnerConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, rng))
    }

    /// Creates a runner with the stock tuning.
    #[must_use]
    pub fn with_defaults(rng: R) -> Self {
        Self::build(RunnerConfig::default(), rng)
    }

    fn build(config: RunnerConfig, rng: R) -> Self {
        Self {
            collision: ThresholdBox::new(config.collision_threshold_x, config.collision_threshold_y),
            player: PlayerBody::at_rest(&config),
            obstacles: Vec::new(),
            state: RunState::new(config.base_speed),
            rng,
            ids: ObstacleIdAllocator::new(),
            events: EventBus::default(),
            ticks: 0,
            config,
        }
    }

    /// Returns the tuning constants.
    #[must_use]
    pub const fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Returns the player body.
    #[must_use]
    pub const fn player(&self) -> &PlayerBody {
        &self.player
    }

    /// Returns score, speed and phase.
    #[must_use]
    pub const fn state(&self) -> &RunState {
        &self.state
    }

    /// Returns the lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> RunPhase {
        self.state.phase()
    }

    /// Returns active obstacles, oldest first.
    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Returns the number of ticks simulated since the last reset.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Returns the event bus the runner publishes to.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Spawn probability at the current score.
    #[must_use]
    pub fn spawn_chance(&self) -> f32 {
        self.config.spawn_chance(self.state.score())
    }

    /// Leaves `NotStarted` without touching the player. No-op in other phases.
    pub fn start(&mut self) -> bool {
        let started = self.state.start();
        if started {
            info!("run started");
            self.events.publish(RunEvent::RunStarted);
        }
        started
    }

    /// Jump trigger.
    ///
    /// The first trigger of a fresh runner only starts the run. While running,
    /// a grounded player is launched with `jump_force`; presses in the air or
    /// after a crash are dropped.
    pub fn jump(&mut self) -> JumpOutcome {
        match self.state.phase() {
            RunPhase::NotStarted => {
                self.start();
                JumpOutcome::Started
            },
            RunPhase::Running => {
                if self.player.jump(self.config.jump_force) {
                    self.events.publish(RunEvent::Jumped);
                    JumpOutcome::Jumped
                } else {
                    JumpOutcome::Ignored
                }
            },
            RunPhase::Crashed => JumpOutcome::Ignored,
        }
    }

    /// Advances the simulation by one step. Does nothing unless `Running`.
    pub fn tick(&mut self) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if !self.state.phase().is_running() {
            return outcome;
        }
        outcome.advanced = true;
        self.ticks += 1;

        if self.player.integrate(&self.config) == Motion::Landed {
            self.events.publish(RunEvent::Landed);
        }

        outcome.spawned = self.try_spawn();
        self.advance_obstacles(&mut outcome);
        outcome
    }

    /// Reinitialises everything and enters `Running`. Valid in any phase.
    pub fn reset(&mut self) {
        self.player.reset(&self.config);
        self.obstacles.clear();
        self.state.restart(self.config.base_speed);
        self.ticks = 0;
        info!("run reset");
        self.events.publish(RunEvent::Reset);
    }

    /// Places an obstacle at the spawn point regardless of the spawn gate.
    pub fn spawn_obstacle(&mut self, kind: ObstacleKind) -> ObstacleId {
        self.spawn_obstacle_at(kind, self.config.spawn_x)
    }

    /// Places an obstacle on the floor at `x`.
    pub fn spawn_obstacle_at(&mut self, kind: ObstacleKind, x: f32) -> ObstacleId {
        let id = self.ids.next_id();
        self.obstacles
            .push(Obstacle::new(id, kind, x, self.config.rest_y()));
        debug!(%id, ?kind, x, "obstacle spawned");
        self.events.publish(RunEvent::ObstacleSpawned { id, kind });
        id
    }

    /// Builds the render view of the current state.
    #[must_use]
    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            version: SchemaVersion::SNAPSHOT,
            tick: self.ticks,
            phase: self.state.phase(),
            score: self.state.score(),
            speed: self.state.speed(),
            player: PlayerPose {
                position: self.player.position(),
                rotation: self.player.rotation(),
                grounded: self.player.is_grounded(),
            },
            obstacles: self
                .obstacles
                .iter()
                .map(|obs| ObstacleView {
                    id: obs.id(),
                    kind: obs.kind(),
                    position: obs.position(),
                })
                .collect(),
        }
    }

    /// Whether the newest obstacle has moved far enough from the spawn point.
    fn spawn_gate_open(&self) -> bool {
        self.obstacles.last().map_or(true, |last| {
            self.config.spawn_x - last.position().x > self.config.min_spawn_gap
        })
    }

    fn try_spawn(&mut self) -> Option<ObstacleId> {
        if !self.spawn_gate_open() {
            return None;
        }
        let chance = self.spawn_chance();
        if self.rng.next_f32() >= chance {
            return None;
        }
        let kind = ObstacleKind::from_draw(self.rng.next_f32(), self.config.block_chance);
        Some(self.spawn_obstacle(kind))
    }

    /// Moves, collides and retires obstacles. Iterates from the end so removal
    /// does not disturb indices still to be visited.
    ///
    /// `Crashed` is published after the pass so it carries the score including
    /// obstacles retired later in the same pass.
    fn advance_obstacles(&mut self, outcome: &mut TickOutcome) {
        let player_pos = self.player.position();
        let mut hit = None;

        for i in (0..self.obstacles.len()).rev() {
            let obstacle = &mut self.obstacles[i];
            obstacle.advance(self.state.speed());
            let id = obstacle.id();

            if self.collision.overlaps(player_pos, obstacle.position()) && self.state.crash() {
                outcome.crashed = true;
                hit = Some(id);
            }

            if obstacle.is_off_screen(self.config.despawn_x) {
                self.obstacles.remove(i);
                self.state
                    .record_clear(self.config.speed_increment, self.config.max_speed);
                outcome.retired += 1;
                self.events.publish(RunEvent::ObstacleRetired { id });
                self.events.publish(RunEvent::ScoreChanged {
                    score: self.state.score(),
                    speed: self.state.speed(),
                });
            }
        }

        if let Some(obstacle) = hit {
            let score = self.state.score();
            info!(%obstacle, score, "crashed");
            self.events.publish(RunEvent::Crashed { obstacle, score });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SequenceRng;
    use proptest::prelude::*;

    /// Draws that never pass the spawn roll.
    fn quiet() -> SequenceRng {
        SequenceRng::constant(0.99)
    }

    fn running(config: RunnerConfig) -> RunnerLoop<SequenceRng> {
        let mut runner = RunnerLoop::new(config, quiet()).expect("valid config");
        runner.start();
        runner
    }

    fn ghost_config() -> RunnerConfig {
        RunnerConfig {
            collision_threshold_x: 0.0,
            collision_threshold_y: 0.0,
            ..RunnerConfig::default()
        }
    }

    #[test]
    fn test_first_jump_only_starts() {
        let mut runner = RunnerLoop::with_defaults(quiet());
        assert_eq!(runner.phase(), RunPhase::NotStarted);
        let before = runner.player().clone();

        assert_eq!(runner.jump(), JumpOutcome::Started);
        assert_eq!(runner.phase(), RunPhase::Running);
        assert_eq!(runner.player(), &before);
        assert_eq!(runner.events().drain(), vec![RunEvent::RunStarted]);
    }

    #[test]
    fn test_tick_before_start_is_noop() {
        let mut runner = RunnerLoop::with_defaults(SequenceRng::constant(0.0));
        let outcome = runner.tick();
        assert!(!outcome.advanced);
        assert!(runner.obstacles().is_empty());
        assert_eq!(runner.ticks(), 0);
    }

    #[test]
    fn test_grounded_player_stays_on_floor() {
        let mut runner = running(RunnerConfig::default());
        let rest_y = runner.config().rest_y();
        for _ in 0..50 {
            runner.tick();
            assert!(runner.player().is_grounded());
            assert_eq!(runner.player().velocity_y(), 0.0);
            assert_eq!(runner.player().position().y, rest_y);
        }
    }

    #[test]
    fn test_jump_arc_returns_to_floor() {
        let mut runner = running(RunnerConfig::default());
        let config = runner.config().clone();

        assert_eq!(runner.jump(), JumpOutcome::Jumped);
        assert_eq!(runner.player().velocity_y(), config.jump_force);
        assert!(!runner.player().is_grounded());

        // Airborne: velocity drops by exactly gravity each tick
        let mut last_v = runner.player().velocity_y();
        let mut ticks = 0;
        loop {
            runner.tick();
            ticks += 1;
            if runner.player().is_grounded() {
                break;
            }
            let v = runner.player().velocity_y();
            assert!((last_v + config.gravity - v).abs() < 1e-6);
            assert!(runner.player().position().y > config.rest_y());
            last_v = v;
            assert!(ticks < 200, "player never landed");
        }

        assert_eq!(runner.player().velocity_y(), 0.0);
        assert_eq!(runner.player().position().y, config.rest_y());
        assert!(runner.events().drain().contains(&RunEvent::Landed));
    }

    #[test]
    fn test_jump_is_not_buffered() {
        let mut runner = running(RunnerConfig::default());
        runner.jump();
        runner.tick();
        assert_eq!(runner.jump(), JumpOutcome::Ignored);

        while !runner.player().is_grounded() {
            runner.tick();
        }
        // The mid-air press must not fire on landing
        runner.tick();
        assert!(runner.player().is_grounded());
        assert_eq!(runner.player().velocity_y(), 0.0);
    }

    #[test]
    fn test_forced_obstacle_retires_once() {
        let mut runner = running(ghost_config());
        let id = runner.spawn_obstacle(ObstacleKind::Spike);
        assert_eq!(runner.obstacles()[0].position().x, 25.0);

        // 25 - 0.2 * n < -15 once n > 200
        let mut retired = 0;
        for _ in 0..205 {
            retired += runner.tick().retired;
        }

        assert_eq!(retired, 1);
        assert_eq!(runner.state().score(), 1);
        assert!(runner.obstacles().is_empty());
        assert!((runner.state().speed() - 0.201).abs() < 1e-6);
        assert!(runner
            .events()
            .drain()
            .contains(&RunEvent::ObstacleRetired { id }));
    }

    #[test]
    fn test_overlapping_obstacle_crashes_in_one_tick() {
        let mut runner = running(RunnerConfig::default());
        let speed = runner.state().speed();
        let player_x = runner.config().player_x;
        let id = runner.spawn_obstacle_at(ObstacleKind::Block, player_x + speed + 0.1);

        let outcome = runner.tick();
        assert!(outcome.crashed);
        assert_eq!(runner.phase(), RunPhase::Crashed);
        assert!(runner
            .events()
            .drain()
            .contains(&RunEvent::Crashed { obstacle: id, score: 0 }));
    }

    #[test]
    fn test_airborne_player_clears_obstacle() {
        let mut runner = running(RunnerConfig::default());
        runner.jump();
        for _ in 0..10 {
            runner.tick();
        }
        let player_x = runner.config().player_x;
        runner.spawn_obstacle_at(ObstacleKind::Spike, player_x + runner.state().speed());
        let outcome = runner.tick();
        assert!(!outcome.crashed);
        assert_eq!(runner.phase(), RunPhase::Running);
    }

    #[test]
    fn test_crash_pass_still_cleans_up() {
        let mut runner = running(RunnerConfig::default());
        let config = runner.config().clone();
        runner.spawn_obstacle_at(ObstacleKind::Spike, config.despawn_x + 0.1);
        runner.spawn_obstacle_at(ObstacleKind::Block, config.player_x + config.base_speed);

        let outcome = runner.tick();
        assert!(outcome.crashed);
        assert_eq!(outcome.retired, 1);
        assert_eq!(runner.obstacles().len(), 1);
        assert_eq!(runner.state().score(), 1);
    }

    #[test]
    fn test_crash_event_reports_final_score() {
        let mut runner = running(RunnerConfig::default());
        let config = runner.config().clone();
        runner.spawn_obstacle_at(ObstacleKind::Spike, config.despawn_x + 0.1);
        let block =
            runner.spawn_obstacle_at(ObstacleKind::Block, config.player_x + config.base_speed);
        runner.events().drain();

        runner.tick();

        let crash = runner.events().drain().into_iter().find_map(|event| match event {
            RunEvent::Crashed { obstacle, score } => Some((obstacle, score)),
            _ => None,
        });
        assert_eq!(crash, Some((block, runner.state().score())));
        assert_eq!(runner.state().score(), 1);
    }

    #[test]
    fn test_double_overlap_crashes_once() {
        let mut runner = running(RunnerConfig::default());
        let config = runner.config().clone();
        let near = config.player_x + config.base_speed;
        runner.spawn_obstacle_at(ObstacleKind::Spike, near + 0.3);
        runner.spawn_obstacle_at(ObstacleKind::Block, near - 0.3);
        runner.events().drain();

        let outcome = runner.tick();

        assert!(outcome.crashed);
        assert_eq!(runner.phase(), RunPhase::Crashed);
        let crashes = runner
            .events()
            .drain()
            .into_iter()
            .filter(|event| matches!(event, RunEvent::Crashed { .. }))
            .count();
        assert_eq!(crashes, 1);
    }

    #[test]
    fn test_crashed_ticks_mutate_nothing() {
        let mut runner = running(RunnerConfig::default());
        let player_x = runner.config().player_x;
        runner.spawn_obstacle_at(ObstacleKind::Spike, player_x);
        runner.tick();
        assert_eq!(runner.phase(), RunPhase::Crashed);

        let before = runner.snapshot();
        for _ in 0..20 {
            assert!(!runner.tick().advanced);
        }
        assert_eq!(runner.snapshot(), before);
        assert_eq!(runner.jump(), JumpOutcome::Ignored);
    }

    #[test]
    fn test_reset_reinitialises() {
        let mut runner = running(ghost_config());
        runner.spawn_obstacle_at(ObstacleKind::Block, -14.95);
        runner.tick();
        runner.jump();
        runner.tick();
        assert_eq!(runner.state().score(), 1);

        runner.reset();
        assert_eq!(runner.phase(), RunPhase::Running);
        assert_eq!(runner.state().score(), 0);
        assert_eq!(runner.state().speed(), runner.config().base_speed);
        assert!(runner.obstacles().is_empty());
        assert!(runner.player().is_grounded());
        assert_eq!(runner.player().velocity_y(), 0.0);
        assert_eq!(runner.player().rotation(), 0.0);
        assert_eq!(runner.player().position().y, runner.config().rest_y());
        assert_eq!(runner.ticks(), 0);
    }

    #[test]
    fn test_reset_from_not_started_enters_running() {
        let mut runner = RunnerLoop::with_defaults(quiet());
        runner.reset();
        assert_eq!(runner.phase(), RunPhase::Running);
    }

    #[test]
    fn test_spawn_roll_and_kind() {
        // Roll passes (0.0 < 0.02), kind draw 0.1 < 0.3 picks a block
        let rng = SequenceRng::new(vec![0.0, 0.1]);
        let mut runner = RunnerLoop::with_defaults(rng);
        runner.start();
        let outcome = runner.tick();

        let id = outcome.spawned.expect("spawned");
        let obstacle = &runner.obstacles()[0];
        assert_eq!(obstacle.id(), id);
        assert_eq!(obstacle.kind(), ObstacleKind::Block);
        assert_eq!(obstacle.position().y, runner.config().rest_y());
        assert_eq!(obstacle.position().z, 0.0);
    }

    #[test]
    fn test_spawn_gate_blocks_close_obstacles() {
        let rng = SequenceRng::constant(0.0);
        let mut runner = RunnerLoop::new(ghost_config(), rng).expect("valid config");
        runner.start();

        runner.tick();
        assert_eq!(runner.obstacles().len(), 1);

        // The newest obstacle must travel more than 15 units before the next spawn
        let mut spawned_at = None;
        for n in 1..=100 {
            if runner.tick().spawned.is_some() {
                spawned_at = Some(n);
                break;
            }
        }
        let n = spawned_at.expect("second spawn");
        assert!(n >= 75, "second spawn after only {n} ticks");
        assert_eq!(runner.obstacles().len(), 2);
    }

    #[test]
    fn test_gate_closed_right_after_spawn() {
        // Every roll would pass; only the gate keeps the second obstacle out
        let mut runner = RunnerLoop::with_defaults(SequenceRng::constant(0.0));
        runner.start();
        runner.spawn_obstacle(ObstacleKind::Spike);
        let outcome = runner.tick();
        assert!(outcome.spawned.is_none());
        assert_eq!(runner.snapshot().obstacles.len(), 1);
    }

    #[test]
    fn test_speed_clamped_at_max() {
        let config = RunnerConfig {
            speed_increment: 0.2,
            ..ghost_config()
        };
        let mut runner = running(config);
        for _ in 0..3 {
            runner.spawn_obstacle_at(ObstacleKind::Spike, -14.99);
            runner.tick();
        }
        assert_eq!(runner.state().score(), 3);
        assert_eq!(runner.state().speed(), 0.5);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut runner = running(ghost_config());
        runner.spawn_obstacle(ObstacleKind::Block);
        runner.tick();
        let snap = runner.snapshot();
        assert_eq!(snap.tick, 1);
        assert_eq!(snap.obstacles.len(), 1);
        assert!((snap.obstacles[0].position.x - 24.8).abs() < 1e-5);
        assert_eq!(snap.player.position, runner.player().position());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RunnerConfig {
            jump_force: 0.0,
            ..RunnerConfig::default()
        };
        assert!(RunnerLoop::new(config, quiet()).is_err());
    }

    proptest! {
        #[test]
        fn prop_score_and_speed_monotonic(seed: u64, jumps in proptest::collection::vec(any::<bool>(), 300)) {
            let mut runner = RunnerLoop::with_defaults(SpawnRng::new(seed));
            runner.start();
            let mut last_score = 0;
            let mut last_speed = runner.state().speed();

            for jump in jumps {
                if jump {
                    runner.jump();
                }
                let outcome = runner.tick();
                let state = runner.state();
                prop_assert!(state.score() >= last_score);
                prop_assert_eq!(state.score() - last_score, outcome.retired);
                prop_assert!(state.speed() >= last_speed);
                prop_assert!(state.speed() <= runner.config().max_speed);
                prop_assert!(runner.player().position().y >= runner.config().rest_y());
                prop_assert_eq!(runner.player().is_grounded(), runner.player().velocity_y() == 0.0);
                last_score = state.score();
                last_speed = state.speed();
            }
        }
    }
}
