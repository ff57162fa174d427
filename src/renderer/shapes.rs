//! Triangle geometry for pegs, slots and balls

use glam::Vec2;
use std::f32::consts::TAU;

use super::RenderSink;
use super::vertex::{Vertex, colors};
use crate::sim::{Ball, Board, Peg, Slot};

/// Segments used for peg and ball circles
const CIRCLE_SEGMENTS: u32 = 16;
/// Stroke width of slot walls (px)
const SLOT_LINE_WIDTH: f32 = 1.0;

/// Append a filled circle as a triangle fan
pub fn circle(out: &mut Vec<Vertex>, center: Vec2, radius: f32, color: [f32; 4], segments: u32) {
    out.reserve((segments * 3) as usize);
    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;

        out.push(Vertex::at(center, color));
        out.push(Vertex::at(center + Vec2::from_angle(theta1) * radius, color));
        out.push(Vertex::at(center + Vec2::from_angle(theta2) * radius, color));
    }
}

/// Append a line of the given width as a quad
pub fn line(out: &mut Vec<Vertex>, from: Vec2, to: Vec2, width: f32, color: [f32; 4]) {
    let dir = (to - from).normalize_or_zero();
    let perp = Vec2::new(-dir.y, dir.x) * (width / 2.0);
    if perp == Vec2::ZERO {
        return;
    }

    let a = from + perp;
    let b = from - perp;
    let c = to + perp;
    let d = to - perp;

    for corner in [a, b, c, c, b, d] {
        out.push(Vertex::at(corner, color));
    }
}

/// Append the left wall, floor and right wall of a slot
pub fn slot_outline(out: &mut Vec<Vertex>, slot: &Slot, field_height: f32, color: [f32; 4]) {
    let top = slot.top(field_height);
    let top_left = Vec2::new(slot.x, top);
    let bottom_left = Vec2::new(slot.x, field_height);
    let bottom_right = Vec2::new(slot.right(), field_height);
    let top_right = Vec2::new(slot.right(), top);

    line(out, top_left, bottom_left, SLOT_LINE_WIDTH, color);
    line(out, bottom_left, bottom_right, SLOT_LINE_WIDTH, color);
    line(out, bottom_right, top_right, SLOT_LINE_WIDTH, color);
}

/// Collects one frame of board geometry in field coordinates
#[derive(Debug, Default)]
pub struct ShapeBatch {
    pub vertices: Vec<Vertex>,
    /// Field size of the last frame, used for NDC mapping
    pub field_size: Vec2,
}

impl ShapeBatch {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderSink for ShapeBatch {
    fn begin_frame(&mut self, board: &Board) {
        self.vertices.clear();
        self.field_size = Vec2::new(board.width, board.height);
    }

    fn draw_peg(&mut self, peg: &Peg) {
        circle(&mut self.vertices, peg.pos, peg.radius, colors::PEG, CIRCLE_SEGMENTS);
    }

    fn draw_slot(&mut self, slot: &Slot, field_height: f32) {
        slot_outline(&mut self.vertices, slot, field_height, colors::SLOT_WALL);
    }

    fn draw_ball(&mut self, ball: &Ball) {
        circle(&mut self.vertices, ball.pos, ball.radius, ball.color, CIRCLE_SEGMENTS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use crate::renderer::draw_frame;
    use crate::sim::SimState;

    #[test]
    fn test_circle_stays_within_radius() {
        let mut out = Vec::new();
        let center = Vec2::new(10.0, 20.0);
        circle(&mut out, center, 5.0, [1.0; 4], 8);
        assert_eq!(out.len(), 24);
        for v in &out {
            assert!((v.pos() - center).length() <= 5.0 + 1e-4);
        }
    }

    #[test]
    fn test_degenerate_line_is_skipped() {
        let mut out = Vec::new();
        line(&mut out, Vec2::ONE, Vec2::ONE, 1.0, [1.0; 4]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_slot_outline_is_three_sided() {
        let mut out = Vec::new();
        let slot = Slot::new(0.0, 31.5, 50.0);
        slot_outline(&mut out, &slot, 800.0, [1.0; 4]);
        // Three quads, two triangles each
        assert_eq!(out.len(), 18);
        // Nothing drawn across the open top
        assert!(out.iter().all(|v| v.position[1] >= 750.0 - SLOT_LINE_WIDTH));
    }

    #[test]
    fn test_batch_collects_frame() {
        let mut state = SimState::new(BoardConfig::default(), 4);
        state.spawn_balls(3, state.board.width);

        let mut batch = ShapeBatch::new();
        draw_frame(&state, &mut batch);
        let per_circle = (CIRCLE_SEGMENTS * 3) as usize;
        let expected = per_circle * (state.board.pegs.len() + 3) + 18 * state.board.slots.len();
        assert_eq!(batch.vertices.len(), expected);
        assert_eq!(batch.field_size, Vec2::new(state.board.width, state.board.height));

        // Next frame starts from scratch
        state.spawn_balls(0, state.board.width);
        draw_frame(&state, &mut batch);
        assert_eq!(batch.vertices.len(), expected - 3 * per_circle);
    }
}
