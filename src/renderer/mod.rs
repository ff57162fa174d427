//! Rendering
//!
//! The simulation never draws. Each frame it hands every peg, slot and ball
//! to a [`RenderSink`]; [`shapes::ShapeBatch`] turns them into triangles and
//! [`pipeline::RenderState`] puts those on a WebGPU surface.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use shapes::ShapeBatch;

use crate::sim::{Ball, Board, Peg, Slot, SimState};

/// Receives the objects of one frame
pub trait RenderSink {
    /// Called once before any object of the frame
    fn begin_frame(&mut self, _board: &Board) {}
    fn draw_peg(&mut self, peg: &Peg);
    /// `field_height` locates the slot's floor
    fn draw_slot(&mut self, slot: &Slot, field_height: f32);
    fn draw_ball(&mut self, ball: &Ball);
}

/// Sink that draws nothing (headless runs, tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl RenderSink for NullRenderer {
    fn draw_peg(&mut self, _peg: &Peg) {}
    fn draw_slot(&mut self, _slot: &Slot, _field_height: f32) {}
    fn draw_ball(&mut self, _ball: &Ball) {}
}

/// Hand every object of the current state to `sink`, pegs then slots then balls
pub fn draw_frame<S: RenderSink + ?Sized>(state: &SimState, sink: &mut S) {
    let board = &state.board;
    sink.begin_frame(board);
    for peg in &board.pegs {
        sink.draw_peg(peg);
    }
    for slot in &board.slots {
        sink.draw_slot(slot, board.height);
    }
    for ball in &state.balls {
        sink.draw_ball(ball);
    }
}
