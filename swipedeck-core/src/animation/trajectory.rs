//! Time-driven card trajectories after a drag is released.
//!
//! Nothing here reads a clock. Callers feed elapsed time through
//! `advance(dt, &mut offset)` once per frame, so the same state machine runs
//! under a real frame loop, a tokio interval, or a test.

use std::time::Duration;

use tracing::warn;

use super::easing::Easing;
use crate::config::TrajectoryConfig;
use crate::gesture::Outcome;
use crate::types::{Offset, SwipeDirection, Viewport};

/// Below this release distance there is no meaningful exit direction.
const DEGENERATE_RELEASE: f32 = 1e-3;

/// Result of advancing a trajectory by one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrajectoryStep {
    /// Still moving; call again next frame.
    Running,
    /// Back at rest at the origin.
    Settled,
    /// Far enough off-stage to be considered gone. `forced` is set when the
    /// tick cap ended the trajectory rather than geometry.
    Offscreen {
        /// Ended by the tick cap.
        forced: bool,
    },
}

/// Eased return to the origin.
#[derive(Debug, Clone)]
pub struct CancelTrajectory {
    from: Offset,
    elapsed: Duration,
    duration: Duration,
    easing: Easing,
}

impl CancelTrajectory {
    /// Return from `from` to the origin over `duration`.
    pub fn new(from: Offset, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            elapsed: Duration::ZERO,
            duration,
            easing,
        }
    }

    /// Move `offset` along the curve by `dt`.
    pub fn advance(&mut self, dt: Duration, offset: &mut Offset) -> TrajectoryStep {
        self.elapsed = self.elapsed.saturating_add(dt);
        if self.duration.is_zero() || self.elapsed >= self.duration {
            *offset = Offset::ZERO;
            return TrajectoryStep::Settled;
        }
        let t = self.elapsed.as_secs_f32() / self.duration.as_secs_f32();
        let remaining = 1.0 - self.easing.apply(t);
        *offset = self.from * remaining;
        TrajectoryStep::Running
    }
}

/// Exit path for a committed swipe: exponentially decaying release velocity
/// plus a fixed step along the release direction every tick.
#[derive(Debug, Clone)]
pub struct CommitTrajectory {
    velocity: Offset,
    unit: Offset,
    step_speed: f32,
    friction: f32,
    min_velocity: f32,
    tick: Duration,
    carry: Duration,
    ticks: u32,
    max_ticks: u32,
    limit_x: f32,
    limit_y: f32,
}

impl CommitTrajectory {
    /// Returns `None` when the release offset is too close to the origin to
    /// define a direction.
    pub fn new(
        release: Offset,
        cfg: &TrajectoryConfig,
        viewport: Viewport,
    ) -> Option<Self> {
        let magnitude = release.length();
        if !magnitude.is_finite() || magnitude < DEGENERATE_RELEASE {
            return None;
        }
        Some(Self {
            velocity: release * cfg.velocity_multiplier,
            unit: release * (1.0 / magnitude),
            step_speed: cfg.step_speed,
            friction: cfg.decay_friction.max(0.0),
            min_velocity: cfg.min_velocity.max(0.0),
            tick: cfg.tick_interval(),
            carry: Duration::ZERO,
            ticks: 0,
            max_ticks: cfg.max_commit_ticks,
            limit_x: viewport.width * cfg.offscreen_factor,
            limit_y: viewport.height * cfg.offscreen_factor,
        })
    }

    /// Number of fixed steps applied so far.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Whether `offset` is past the stage bounds.
    pub fn is_offscreen(&self, offset: Offset) -> bool {
        offset.x.abs() >= self.limit_x || offset.y.abs() >= self.limit_y
    }

    /// Apply decay for `dt`, then every fixed step that became due.
    pub fn advance(&mut self, dt: Duration, offset: &mut Offset) -> TrajectoryStep {
        if self.is_offscreen(*offset) {
            return TrajectoryStep::Offscreen { forced: false };
        }

        self.apply_decay(dt, offset);
        if self.is_offscreen(*offset) {
            return TrajectoryStep::Offscreen { forced: false };
        }

        self.carry = self.carry.saturating_add(dt);
        while self.carry >= self.tick {
            self.carry -= self.tick;
            *offset += self.unit * self.step_speed;
            self.ticks += 1;

            if self.is_offscreen(*offset) {
                return TrajectoryStep::Offscreen { forced: false };
            }
            if self.ticks >= self.max_ticks {
                warn!(
                    ticks = self.ticks,
                    x = offset.x,
                    y = offset.y,
                    "commit trajectory hit tick cap; forcing completion"
                );
                return TrajectoryStep::Offscreen { forced: true };
            }
        }

        TrajectoryStep::Running
    }

    fn apply_decay(&mut self, dt: Duration, offset: &mut Offset) {
        let dt_s = dt.as_secs_f32();
        if dt_s <= 0.0 || self.velocity == Offset::ZERO {
            return;
        }
        if self.friction > 0.0 {
            // Exact integral of v * e^(-k t) over the frame.
            let decay = (-self.friction * dt_s).exp();
            *offset += self.velocity * ((1.0 - decay) / self.friction);
            self.velocity = self.velocity * decay;
        } else {
            *offset += self.velocity * dt_s;
        }
        if self.velocity.length() < self.min_velocity {
            self.velocity = Offset::ZERO;
        }
    }
}

/// Motion planned for a released card.
#[derive(Debug, Clone)]
pub enum Trajectory {
    /// Bounce back to rest.
    Cancel(CancelTrajectory),
    /// Fly off-stage.
    Commit {
        /// Direction reported to `on_swipe`.
        direction: SwipeDirection,
        /// The exit path.
        path: CommitTrajectory,
    },
}

impl Trajectory {
    /// Advance whichever path this is by `dt`.
    pub fn advance(&mut self, dt: Duration, offset: &mut Offset) -> TrajectoryStep {
        match self {
            Trajectory::Cancel(path) => path.advance(dt, offset),
            Trajectory::Commit { path, .. } => path.advance(dt, offset),
        }
    }

    /// Direction of a commit, `None` for a cancel.
    pub fn committed_direction(&self) -> Option<SwipeDirection> {
        match self {
            Trajectory::Commit { direction, .. } => Some(*direction),
            Trajectory::Cancel(_) => None,
        }
    }
}

/// Turns a resolved [`Outcome`] into the trajectory that animates it.
#[derive(Debug, Clone)]
pub struct TrajectoryAnimator {
    cfg: TrajectoryConfig,
    viewport: Viewport,
}

impl TrajectoryAnimator {
    /// Animator using `cfg.viewport` until told otherwise.
    pub fn new(cfg: TrajectoryConfig) -> Self {
        let viewport = cfg.viewport;
        Self { cfg, viewport }
    }

    /// Stage size used for offscreen checks.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Takes effect for trajectories planned after the call.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Trajectory for `outcome`, starting from `release`.
    pub fn plan(&self, outcome: Outcome, release: Offset) -> Trajectory {
        match outcome {
            Outcome::Commit(direction) => {
                match CommitTrajectory::new(release, &self.cfg, self.viewport) {
                    Some(path) => Trajectory::Commit { direction, path },
                    None => {
                        warn!(
                            %direction,
                            "commit released at origin; bouncing back instead"
                        );
                        self.cancel(release)
                    }
                }
            }
            Outcome::Cancel => self.cancel(release),
        }
    }

    fn cancel(&self, release: Offset) -> Trajectory {
        Trajectory::Cancel(CancelTrajectory::new(
            release,
            self.cfg.cancel_duration(),
            self.cfg.cancel_easing,
        ))
    }
}
