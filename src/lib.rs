//! Plinko Board - balls fall through a peg field into bottom slots
//!
//! Core modules:
//! - `sim`: Simulation (board layout, ball physics, frame loop)
//! - `renderer`: Render sink trait, shape batching, WebGPU pipeline
//! - `config`: Data-driven board layout and physics tuning
//! - `error`: Configuration errors

pub mod config;
pub mod error;
pub mod renderer;
pub mod sim;

pub use config::{BoardConfig, LayoutConfig, PhysicsConfig, TimingConfig};
pub use error::ConfigError;

/// Board configuration defaults
///
/// Screen space: origin at the top-left corner, y grows downward, pixels.
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta accepted by the frame clock (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Longest step a single ball update will integrate (seconds)
    pub const MAX_TICK_DT: f32 = 1.0 / 60.0;

    /// Peg grid
    pub const PEG_ROWS: u32 = 15;
    pub const PEG_COLS: u32 = 8;
    pub const PEG_RADIUS: f32 = 4.5;
    pub const PEG_SPACING_X: f32 = 45.0;
    pub const PEG_SPACING_Y: f32 = 48.0;

    /// Slot row along the bottom edge
    pub const SLOT_COUNT: u32 = 10;
    pub const SLOT_WIDTH: f32 = 31.5;
    pub const SLOT_HEIGHT: f32 = 50.0;

    /// Field dimensions (width fits the slot row exactly)
    pub const FIELD_WIDTH: f32 = SLOT_WIDTH * SLOT_COUNT as f32;
    pub const FIELD_HEIGHT: f32 = 800.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 7.0;
    /// Initial downward speed (px/s), one pixel per 60 Hz frame
    pub const BALL_START_SPEED: f32 = 60.0;

    /// Downward acceleration (px/s²), 0.35 px/frame² at 60 Hz
    pub const GRAVITY: f32 = 1260.0;
    /// Vertical damping applied to a peg deflection
    pub const FRICTION: f32 = 0.75;
    /// Velocity retained when bouncing off slot walls and floor
    pub const SLOT_BOUNCE_REDUCTION: f32 = 0.5;
    /// Extra contact distance around pegs
    pub const PEG_CONTACT_TOLERANCE: f32 = 0.5;
    /// Rotation of the outgoing direction away from the contact normal (radians)
    pub const PEG_DEFLECTION_ANGLE: f32 = std::f32::consts::FRAC_PI_4;

    /// Largest boards and substep counts a config may ask for
    pub const MAX_PEGS: u32 = 10_000;
    pub const MAX_SLOTS: u32 = 1_000;
    pub const MAX_SUBSTEPS_LIMIT: u32 = 64;
}

/// Random opaque color from three uniform channels
pub fn random_color<R: rand::Rng>(rng: &mut R) -> [f32; 4] {
    [rng.random::<f32>(), rng.random::<f32>(), rng.random::<f32>(), 1.0]
}
