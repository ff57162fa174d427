//! Simulation module
//!
//! All physics lives here, free of rendering and platform code:
//! - Static board layout (pegs, slots)
//! - Per-ball integration and collision response
//! - Frame clock driving fixed ticks

pub mod board;
pub mod collision;
pub mod frame;
pub mod state;
pub mod tick;

pub use board::{Board, Peg, Slot};
pub use collision::{CollisionResult, ball_peg_collision};
pub use frame::{FrameClock, FrameSteps, Simulation};
pub use state::{Ball, BallState, SimState};
pub use tick::{tick, update_ball};
