//! Goal navigation and keyboard teleoperation.

mod controller;
pub mod heading;
mod navigator;

pub use controller::VelocityController;
pub use navigator::{GoalView, MIN_PLAN_POSES, Navigator};
