//! Post-release card motion: eased bounce-back and inertial exit.

pub mod easing;
pub mod trajectory;

pub use easing::Easing;
pub use trajectory::{
    CancelTrajectory, CommitTrajectory, Trajectory, TrajectoryAnimator,
    TrajectoryStep,
};
