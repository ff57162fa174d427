//! Ball and simulation state
//!
//! [`SimState`] owns everything that changes during a session: the live balls,
//! the spawn RNG and the tick counter. The board itself is immutable.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::board::Board;
use crate::config::BoardConfig;
use crate::random_color;

/// Where a ball is in its life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallState {
    /// Moving under gravity
    Falling,
    /// Resting in a slot (terminal)
    Caught { slot: usize },
    /// Fell past the bottom edge outside the slot row (terminal)
    Lost,
}

/// A ball entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// RGBA, 0-1 per channel
    pub color: [f32; 4],
    pub state: BallState,
}

impl Ball {
    pub fn new(id: u32, pos: Vec2, vel: Vec2, radius: f32, color: [f32; 4]) -> Self {
        Self {
            id,
            pos,
            vel,
            radius,
            color,
            state: BallState::Falling,
        }
    }

    #[inline]
    pub fn is_caught(&self) -> bool {
        matches!(self.state, BallState::Caught { .. })
    }

    /// Slot index if caught
    pub fn slot(&self) -> Option<usize> {
        match self.state {
            BallState::Caught { slot } => Some(slot),
            _ => None,
        }
    }

    /// Still receiving physics updates
    #[inline]
    pub fn is_active(&self) -> bool {
        self.state == BallState::Falling
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct SimState {
    pub config: BoardConfig,
    pub board: Board,
    /// Live balls, replaced wholesale by each spawn
    pub balls: Vec<Ball>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// RNG seed, reported with results so a run can be repeated
    pub seed: u64,
    rng: Pcg32,
    next_id: u32,
}

impl SimState {
    /// Build the board and an empty ball collection
    pub fn new(config: BoardConfig, seed: u64) -> Self {
        let board = Board::from_config(&config.layout);
        log::info!(
            "Board ready: {} pegs, {} slots, {}x{} field",
            board.pegs.len(),
            board.slots.len(),
            board.width,
            board.height
        );
        Self {
            config,
            board,
            balls: Vec::new(),
            time_ticks: 0,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Replace the ball collection with `count` new balls at random x in `[0, field_width)`
    ///
    /// A width that is not a positive finite number drops every ball at x = 0.
    pub fn spawn_balls(&mut self, count: usize, field_width: f32) {
        self.balls.clear();
        self.balls.reserve(count);

        let radius = self.config.layout.ball_radius;
        let start_y = radius * 2.0;
        let start_vel = Vec2::new(0.0, self.config.physics.ball_start_speed);

        for _ in 0..count {
            let x = if field_width.is_finite() && field_width > 0.0 {
                self.rng.random_range(0.0..field_width)
            } else {
                0.0
            };
            let color = random_color(&mut self.rng);
            let id = self.next_entity_id();
            self.balls
                .push(Ball::new(id, Vec2::new(x, start_y), start_vel, radius, color));
        }

        log::info!("Dropped {} balls across {} px", count, field_width);
    }

    /// Balls resting in each slot
    pub fn slot_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.board.slots.len()];
        for slot in self.balls.iter().filter_map(Ball::slot) {
            counts[slot] += 1;
        }
        counts
    }

    /// True once no ball is still falling
    pub fn settled(&self) -> bool {
        self.balls.iter().all(|b| !b.is_active())
    }
}
