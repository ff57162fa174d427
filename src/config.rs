//! Board configuration
//!
//! Every field defaults to the matching constant in [`crate::consts`], and
//! each section is `#[serde(default)]`, so a JSON document only needs the
//! values it wants to override:
//!
//! ```json
//! { "layout": { "peg_rows": 12 }, "physics": { "gravity": 900.0 } }
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

use crate::consts::*;
use crate::error::ConfigError;

/// Board geometry: field, peg grid and slot row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Play-field height (px). Width is derived from the slot row.
    pub field_height: f32,
    pub peg_rows: u32,
    pub peg_cols: u32,
    pub peg_radius: f32,
    pub peg_spacing_x: f32,
    pub peg_spacing_y: f32,
    pub slot_count: u32,
    pub slot_width: f32,
    pub slot_height: f32,
    pub ball_radius: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            field_height: FIELD_HEIGHT,
            peg_rows: PEG_ROWS,
            peg_cols: PEG_COLS,
            peg_radius: PEG_RADIUS,
            peg_spacing_x: PEG_SPACING_X,
            peg_spacing_y: PEG_SPACING_Y,
            slot_count: SLOT_COUNT,
            slot_width: SLOT_WIDTH,
            slot_height: SLOT_HEIGHT,
            ball_radius: BALL_RADIUS,
        }
    }
}

impl LayoutConfig {
    /// Field width: the slot row spans the whole bottom edge
    pub fn field_width(&self) -> f32 {
        self.slot_width * self.slot_count as f32
    }
}

/// Ball physics tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration (px/s²)
    pub gravity: f32,
    /// Vertical damping after a peg deflection (0-1)
    pub friction: f32,
    /// Velocity retained on slot wall/floor bounces (0-1)
    pub slot_bounce_reduction: f32,
    /// Extra distance at which a peg counts as touched (px)
    pub peg_contact_tolerance: f32,
    /// Outgoing direction offset from the contact normal (radians)
    pub peg_deflection_angle: f32,
    /// Initial downward speed of spawned balls (px/s)
    pub ball_start_speed: f32,
    /// Largest dt a single ball update integrates (s)
    pub max_tick_dt: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            friction: FRICTION,
            slot_bounce_reduction: SLOT_BOUNCE_REDUCTION,
            peg_contact_tolerance: PEG_CONTACT_TOLERANCE,
            peg_deflection_angle: PEG_DEFLECTION_ANGLE,
            ball_start_speed: BALL_START_SPEED,
            max_tick_dt: MAX_TICK_DT,
        }
    }
}

/// Frame loop timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Run fixed `sim_dt` ticks from an accumulator (otherwise one tick per frame)
    pub fixed_timestep: bool,
    pub sim_dt: f32,
    pub max_substeps: u32,
    pub max_frame_dt: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: true,
            sim_dt: SIM_DT,
            max_substeps: MAX_SUBSTEPS,
            max_frame_dt: MAX_FRAME_DT,
        }
    }
}

/// Complete board configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub layout: LayoutConfig,
    pub physics: PhysicsConfig,
    pub timing: TimingConfig,
}

impl BoardConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded board config from {}", path.display());
        Ok(config)
    }

    /// Check every value the physics relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let l = &self.layout;
        let p = &self.physics;
        let t = &self.timing;

        positive("layout.field_height", l.field_height)?;
        positive("layout.peg_radius", l.peg_radius)?;
        positive("layout.peg_spacing_x", l.peg_spacing_x)?;
        positive("layout.peg_spacing_y", l.peg_spacing_y)?;
        positive("layout.slot_width", l.slot_width)?;
        positive("layout.slot_height", l.slot_height)?;
        positive("layout.ball_radius", l.ball_radius)?;
        if l.slot_count == 0 || l.slot_count > MAX_SLOTS {
            return Err(ConfigError::Invalid {
                field: "layout.slot_count",
                value: l.slot_count as f32,
                reason: "must be between 1 and MAX_SLOTS",
            });
        }
        if l.peg_rows.checked_mul(l.peg_cols).is_none_or(|n| n > MAX_PEGS) {
            return Err(ConfigError::Invalid {
                field: "layout.peg_rows",
                value: l.peg_rows as f32,
                reason: "peg_rows * peg_cols must not exceed MAX_PEGS",
            });
        }
        // Peg coordinates and the field width must stay finite
        let grid_extent = Vec2::new(
            (l.peg_cols as f32 + 0.5) * l.peg_spacing_x,
            (l.peg_rows as f32 + 1.0) * l.peg_spacing_y,
        );
        if !grid_extent.is_finite() {
            let (field, value) = if grid_extent.x.is_finite() {
                ("layout.peg_spacing_y", l.peg_spacing_y)
            } else {
                ("layout.peg_spacing_x", l.peg_spacing_x)
            };
            return Err(ConfigError::Invalid {
                field,
                value,
                reason: "peg grid extent overflows",
            });
        }
        positive("layout.field_width", l.field_width())?;
        // A ball has to fit between the walls of a slot
        if !(l.slot_width >= l.ball_radius * 2.0) {
            return Err(ConfigError::Invalid {
                field: "layout.slot_width",
                value: l.slot_width,
                reason: "must be at least one ball diameter",
            });
        }
        if !(l.slot_height < l.field_height) {
            return Err(ConfigError::Invalid {
                field: "layout.slot_height",
                value: l.slot_height,
                reason: "must be smaller than the field height",
            });
        }

        unit_interval("physics.friction", p.friction)?;
        unit_interval("physics.slot_bounce_reduction", p.slot_bounce_reduction)?;
        non_negative("physics.gravity", p.gravity)?;
        non_negative("physics.peg_contact_tolerance", p.peg_contact_tolerance)?;
        non_negative("physics.ball_start_speed", p.ball_start_speed)?;
        positive("physics.max_tick_dt", p.max_tick_dt)?;
        // Past a right angle the deflection would point back into the peg
        if !(0.0..=FRAC_PI_2).contains(&p.peg_deflection_angle) {
            return Err(ConfigError::Invalid {
                field: "physics.peg_deflection_angle",
                value: p.peg_deflection_angle,
                reason: "must be within [0, pi/2]",
            });
        }

        positive("timing.sim_dt", t.sim_dt)?;
        positive("timing.max_frame_dt", t.max_frame_dt)?;
        if t.max_substeps == 0 || t.max_substeps > MAX_SUBSTEPS_LIMIT {
            return Err(ConfigError::Invalid {
                field: "timing.max_substeps",
                value: t.max_substeps as f32,
                reason: "must be between 1 and MAX_SUBSTEPS_LIMIT",
            });
        }

        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    // Written as a negated comparison so NaN is rejected too
    if !(value > 0.0) || !value.is_finite() {
        return Err(ConfigError::Invalid {
            field,
            value,
            reason: "must be a finite value > 0",
        });
    }
    Ok(())
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !(value >= 0.0) || !value.is_finite() {
        return Err(ConfigError::Invalid {
            field,
            value,
            reason: "must be a finite value >= 0",
        });
    }
    Ok(())
}

fn unit_interval(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::Invalid {
            field,
            value,
            reason: "must be within [0, 1]",
        });
    }
    Ok(())
}
