//! Collision detection and response against the static board
//!
//! Screen space throughout: y grows downward, so a ball resting on top of a
//! peg has a contact normal pointing toward -y.

use glam::Vec2;

use super::board::{Board, Peg, Slot};

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Surface normal at collision (pointing toward ball center)
    pub normal: Vec2,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
        }
    }
}

/// Check a ball against one peg
///
/// Contact starts `tolerance` pixels before the two circles actually touch.
/// A ball centered exactly on the peg gets an upward normal.
pub fn ball_peg_collision(
    ball_pos: Vec2,
    ball_radius: f32,
    peg: &Peg,
    tolerance: f32,
) -> CollisionResult {
    let offset = ball_pos - peg.pos;
    let distance = offset.length();
    let reach = ball_radius + peg.radius + tolerance;

    if distance >= reach {
        return CollisionResult::miss();
    }

    let normal = if distance > f32::EPSILON {
        offset / distance
    } else {
        Vec2::NEG_Y
    };

    CollisionResult { hit: true, normal }
}

/// First peg in board order touched by the ball
pub fn first_peg_hit<'a>(
    ball_pos: Vec2,
    ball_radius: f32,
    pegs: &'a [Peg],
    tolerance: f32,
) -> Option<(&'a Peg, CollisionResult)> {
    pegs.iter().find_map(|peg| {
        let result = ball_peg_collision(ball_pos, ball_radius, peg, tolerance);
        result.hit.then_some((peg, result))
    })
}

/// Outgoing velocity after a peg hit
///
/// The contact normal is rotated by `deflection_angle` away from the vertical,
/// toward the side of the peg the ball is on (a dead-center ball goes toward
/// +x). The incoming speed is kept and the vertical component is scaled by
/// `friction`.
pub fn deflect_off_peg(velocity: Vec2, normal: Vec2, deflection_angle: f32, friction: f32) -> Vec2 {
    let contact_angle = normal.y.atan2(normal.x);
    let side = if normal.x >= 0.0 { 1.0 } else { -1.0 };
    // A positive rotation moves an upward normal toward +x but a downward one toward -x
    let hemisphere = if normal.y <= 0.0 { 1.0 } else { -1.0 };
    let out_angle = contact_angle + side * hemisphere * deflection_angle;
    let speed = velocity.length();
    let out = Vec2::new(out_angle.cos(), out_angle.sin()) * speed;
    Vec2::new(out.x, out.y * friction)
}

/// Ball position touching the peg along the contact normal
#[inline]
pub fn peg_contact_position(peg: &Peg, normal: Vec2, ball_radius: f32) -> Vec2 {
    peg.pos + normal * (peg.radius + ball_radius)
}

/// Keep the ball between the field's side walls
///
/// Walls are perfectly elastic. After contact the ball always heads back into
/// the field, even if a peg push already had it moving away from the wall.
pub fn resolve_side_walls(pos: &mut Vec2, vel: &mut Vec2, radius: f32, field_width: f32) {
    if pos.x - radius < 0.0 {
        pos.x = radius;
        vel.x = vel.x.abs();
    } else if pos.x + radius > field_width {
        pos.x = field_width - radius;
        vel.x = -vel.x.abs();
    }
}

/// Resolve contact with the slot under the ball
///
/// Side walls and floor rebound with `bounce_reduction`. The ball is captured
/// when its floor rebound can no longer lift it over the slot walls; the slot
/// index is returned in that case.
pub fn resolve_slot_contact(
    pos: &mut Vec2,
    vel: &mut Vec2,
    radius: f32,
    board: &Board,
    gravity: f32,
    bounce_reduction: f32,
) -> Option<usize> {
    if pos.y + radius <= board.slot_top() {
        return None;
    }
    let index = board.slot_index(pos.x)?;
    let slot: &Slot = &board.slots[index];
    if !slot.contains_x(pos.x) {
        return None;
    }

    if pos.x - radius < slot.x {
        pos.x = slot.x + radius;
        vel.x = vel.x.abs() * bounce_reduction;
    } else if pos.x + radius > slot.right() {
        pos.x = slot.right() - radius;
        vel.x = -vel.x.abs() * bounce_reduction;
    }

    if pos.y + radius >= board.height {
        pos.y = board.height - radius;
        vel.y = -vel.y.abs() * bounce_reduction;

        let rebound_height = if gravity > 0.0 {
            vel.y * vel.y / (2.0 * gravity)
        } else {
            0.0
        };
        if rebound_height < slot.height {
            *vel = Vec2::ZERO;
            return Some(index);
        }
    }

    None
}
