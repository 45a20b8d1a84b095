//! Frame-driven game loop
//!
//! The host calls [`GameLoop::on_frame`] from its animation-frame callback.
//! Each call runs one simulation tick, forwards what happened to the host's
//! collaborators (score display, sounds, canvas) and asks for the next frame.
//! A frame request is identified by a [`TickToken`]; restarting or tearing
//! down the loop revokes the outstanding token, so a callback that was
//! already queued for an old epoch does nothing.

use crate::audio::{SoundEffect, SoundPlayer};
use crate::consts::STARTING_LIVES;
use crate::input::PointerSlot;
use crate::renderer::{Canvas, DrawCommand, board_commands, entity_commands};
use crate::sim::field::{Field, Side};
use crate::sim::state::{GameEvent, GameState};
use crate::sim::tick::{TickInput, TickOutcome, tick};
use crate::tuning::Tuning;

/// Score display
pub trait ScoreSink {
    fn set_score(&mut self, side: Side, score: u32);
}

/// Level display
pub trait LevelSink {
    fn set_level(&mut self, side: Side, level: u32);
}

/// Remaining-lives display
pub trait LivesSink {
    fn set_lives(&mut self, lives: u8);
}

/// Host frame scheduling (`requestAnimationFrame` on the web)
pub trait FrameScheduler {
    fn request_frame(&mut self, token: TickToken);
    fn cancel_frame(&mut self, token: TickToken);
}

/// Everything the loop talks to
pub trait Host: ScoreSink + LevelSink + LivesSink + SoundPlayer + Canvas + FrameScheduler {}

impl<T> Host for T where T: ScoreSink + LevelSink + LivesSink + SoundPlayer + Canvas + FrameScheduler {}

/// Identifies one requested frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickToken {
    pub epoch: u64,
    pub serial: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    NotStarted,
    Running,
    /// Terminal until restart
    GameOver,
}

/// Owns the per-epoch game state and drives it one frame at a time
#[derive(Debug)]
pub struct GameLoop {
    phase: LoopPhase,
    epoch: u64,
    serial: u64,
    pending: Option<TickToken>,
    state: Option<GameState>,
    tuning: Tuning,
    seed: u64,
    field: Field,
    pointer: PointerSlot,
}

impl GameLoop {
    pub fn new(field: Field, tuning: Tuning, seed: u64) -> Self {
        Self {
            phase: LoopPhase::NotStarted,
            epoch: 0,
            serial: 0,
            pending: None,
            state: None,
            tuning: tuning.validated(),
            seed,
            field,
            pointer: PointerSlot::new(),
        }
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    /// Outstanding frame request, if any
    pub fn pending(&self) -> Option<TickToken> {
        self.pending
    }

    /// Handle for input handlers to write pointer samples into
    pub fn pointer(&self) -> PointerSlot {
        self.pointer.clone()
    }

    /// Player score of the current epoch
    pub fn score(&self) -> u32 {
        self.state.as_ref().map_or(0, |s| s.player.score)
    }

    /// Leave the start screen. Does nothing once the game has started.
    pub fn start(&mut self, host: &mut impl Host) {
        if self.phase != LoopPhase::NotStarted {
            log::debug!("start ignored in phase {:?}", self.phase);
            return;
        }
        log::info!("Game started ({:?} play)", self.field.orientation);
        self.begin_epoch(host);
    }

    /// Throw the current epoch away and play a fresh one
    pub fn restart(&mut self, host: &mut impl Host) {
        log::info!("Restarting (epoch {} -> {})", self.epoch, self.epoch + 1);
        self.begin_epoch(host);
    }

    /// Stop scheduling and drop the game state
    pub fn teardown(&mut self, host: &mut impl Host) {
        self.revoke(host);
        self.state = None;
        self.phase = LoopPhase::NotStarted;
        self.pointer.clear();
    }

    /// Apply a new viewport; takes effect before the next tick
    pub fn resize(&mut self, field: Field) {
        self.field = field;
        if let Some(state) = &mut self.state {
            state.resize(field);
        }
    }

    /// Frame callback. Returns true if another frame was requested.
    pub fn on_frame(&mut self, token: TickToken, host: &mut impl Host) -> bool {
        if self.pending != Some(token) {
            log::debug!("Ignoring stale frame {:?}", token);
            return false;
        }
        self.pending = None;

        if self.phase != LoopPhase::Running {
            return false;
        }
        let Some(state) = &mut self.state else {
            return false;
        };

        for command in board_commands(&state.field) {
            host.draw(&command);
        }

        let input = TickInput {
            pointer: self.pointer.latest(),
        };
        let outcome = tick(state, &input);

        for event in state.drain_events() {
            dispatch(event, host);
        }

        match outcome {
            TickOutcome::GameOver => {
                self.phase = LoopPhase::GameOver;
                host.draw(&DrawCommand::Clear {
                    width: state.field.width,
                    height: state.field.height,
                });
                false
            }
            TickOutcome::Running => {
                for command in entity_commands(state) {
                    host.draw(&command);
                }
                self.schedule(host);
                true
            }
        }
    }

    fn begin_epoch(&mut self, host: &mut impl Host) {
        self.revoke(host);
        self.epoch += 1;
        self.state = Some(GameState::new(
            self.field,
            self.tuning,
            self.epoch,
            epoch_seed(self.seed, self.epoch),
        ));

        host.set_score(Side::Player, 0);
        host.set_level(Side::Player, 1);
        host.set_lives(STARTING_LIVES);

        self.phase = LoopPhase::Running;
        self.schedule(host);
    }

    fn schedule(&mut self, host: &mut impl Host) {
        self.serial += 1;
        let token = TickToken {
            epoch: self.epoch,
            serial: self.serial,
        };
        self.pending = Some(token);
        host.request_frame(token);
    }

    fn revoke(&mut self, host: &mut impl Host) {
        if let Some(token) = self.pending.take() {
            host.cancel_frame(token);
        }
    }
}

/// Each epoch gets its own RNG stream
fn epoch_seed(seed: u64, epoch: u64) -> u64 {
    seed ^ epoch.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

fn dispatch(event: GameEvent, host: &mut impl Host) {
    match event {
        GameEvent::WallHit => play(host, SoundEffect::WallHit),
        GameEvent::PaddleHit(_) => play(host, SoundEffect::PaddleHit),
        GameEvent::ScoreChanged { side, score } => host.set_score(side, score),
        GameEvent::LevelChanged { side, level } => host.set_level(side, level),
        GameEvent::LifeLost { lives } => host.set_lives(lives),
        GameEvent::RallyConceded(side) => log::debug!("Rally conceded by {:?}", side),
        GameEvent::GameOver { .. } => play(host, SoundEffect::GameOver),
    }
}

fn play(host: &mut impl Host, effect: SoundEffect) {
    host.play(effect, effect.cooldown_ms());
}
