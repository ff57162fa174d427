//! Static board layout: pegs, slots and field bounds
//!
//! Nothing here changes after the board is built. Balls only read it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::consts::MAX_PEGS;

/// A fixed circular obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peg {
    pub pos: Vec2,
    pub radius: f32,
}

impl Peg {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            radius,
        }
    }

    /// Distance from a point to the peg center
    #[inline]
    pub fn distance_to(&self, point: Vec2) -> f32 {
        (point - self.pos).length()
    }
}

/// A three-sided receptacle standing on the bottom edge of the field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    /// Left wall
    pub x: f32,
    pub width: f32,
    pub height: f32,
}

impl Slot {
    pub fn new(x: f32, width: f32, height: f32) -> Self {
        Self { x, width, height }
    }

    /// Right wall
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top of the walls for a field of the given height
    #[inline]
    pub fn top(&self, field_height: f32) -> f32 {
        field_height - self.height
    }

    /// Whether `x` lies between the walls (inclusive)
    #[inline]
    pub fn contains_x(&self, x: f32) -> bool {
        x >= self.x && x <= self.right()
    }
}

/// The immutable board a simulation runs on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub width: f32,
    pub height: f32,
    /// Row-major; this order decides which peg wins a simultaneous contact
    pub pegs: Vec<Peg>,
    /// Left to right, slot `i` starts at `i * slot_width`
    pub slots: Vec<Slot>,
    pub slot_width: f32,
    pub slot_height: f32,
}

impl Board {
    /// Build the staggered peg grid and the slot row
    pub fn from_config(layout: &LayoutConfig) -> Self {
        let peg_count = (layout.peg_rows as usize).saturating_mul(layout.peg_cols as usize);
        let mut pegs = Vec::with_capacity(peg_count.min(MAX_PEGS as usize));
        for row in 0..layout.peg_rows {
            // Odd rows shift half a column to stagger the grid
            let stagger = if row % 2 == 0 {
                0.0
            } else {
                layout.peg_spacing_x / 2.0
            };
            let y = row as f32 * layout.peg_spacing_y + layout.peg_spacing_y;
            for col in 0..layout.peg_cols {
                let x = col as f32 * layout.peg_spacing_x + stagger;
                pegs.push(Peg::new(x, y, layout.peg_radius));
            }
        }

        let slots = (0..layout.slot_count)
            .map(|i| Slot::new(i as f32 * layout.slot_width, layout.slot_width, layout.slot_height))
            .collect();

        Self {
            width: layout.field_width(),
            height: layout.field_height,
            pegs,
            slots,
            slot_width: layout.slot_width,
            slot_height: layout.slot_height,
        }
    }

    /// Y coordinate where the slot band begins
    #[inline]
    pub fn slot_top(&self) -> f32 {
        self.height - self.slot_height
    }

    /// Slot under a horizontal position, `None` when outside the slot row
    pub fn slot_index(&self, x: f32) -> Option<usize> {
        let index = (x / self.slot_width).floor();
        if index >= 0.0 && (index as usize) < self.slots.len() {
            Some(index as usize)
        } else {
            None
        }
    }
}
