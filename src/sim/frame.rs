//! Frame loop: wall-clock frames in, simulation ticks out
//!
//! The browser calls [`Simulation::frame`] once per animation frame with the
//! `requestAnimationFrame` timestamp. The clock turns consecutive timestamps
//! into a `dt`, clamps it (a backgrounded tab can resume with a multi-second
//! gap) and splits it into ticks.

use super::state::SimState;
use super::tick::tick;
use crate::config::{BoardConfig, TimingConfig};
use crate::renderer::{RenderSink, draw_frame};

/// Frames averaged by the FPS counter
const FPS_WINDOW: usize = 60;

/// Ticks to run for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSteps {
    /// Number of ticks
    pub count: u32,
    /// Length of each tick (seconds)
    pub dt: f32,
}

/// Turns frame timestamps into simulation steps and tracks FPS
#[derive(Debug, Clone)]
pub struct FrameClock {
    timing: TimingConfig,
    /// Last frame timestamp (ms), `None` before the first frame
    last_time: Option<f64>,
    accumulator: f32,
    frame_times: [f64; FPS_WINDOW],
    frame_index: usize,
    fps: u32,
}

impl FrameClock {
    pub fn new(timing: TimingConfig) -> Self {
        Self {
            timing,
            last_time: None,
            accumulator: 0.0,
            frame_times: [0.0; FPS_WINDOW],
            frame_index: 0,
            fps: 0,
        }
    }

    /// Consume one frame timestamp (milliseconds)
    pub fn advance(&mut self, time_ms: f64) -> FrameSteps {
        // First frame runs a single fixed step
        let dt = match self.last_time {
            Some(last) => ((time_ms - last) / 1000.0) as f32,
            None => self.timing.sim_dt,
        };
        self.last_time = Some(time_ms);
        let dt = dt.clamp(0.0, self.timing.max_frame_dt);

        self.track_fps(time_ms);

        if !self.timing.fixed_timestep {
            return FrameSteps { count: 1, dt };
        }

        self.accumulator += dt;
        let mut count = 0;
        while self.accumulator >= self.timing.sim_dt && count < self.timing.max_substeps {
            self.accumulator -= self.timing.sim_dt;
            count += 1;
        }
        if count == self.timing.max_substeps && self.accumulator >= self.timing.sim_dt {
            log::debug!(
                "Dropping {:.3}s of backlog after {} substeps",
                self.accumulator,
                count
            );
            self.accumulator %= self.timing.sim_dt;
        }

        FrameSteps {
            count,
            dt: self.timing.sim_dt,
        }
    }

    /// Frames per second over the last 60 frames (0 until the window fills)
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Forget the last timestamp and any partial step
    pub fn reset(&mut self) {
        self.last_time = None;
        self.accumulator = 0.0;
    }

    fn track_fps(&mut self, time_ms: f64) {
        self.frame_times[self.frame_index] = time_ms;
        self.frame_index = (self.frame_index + 1) % FPS_WINDOW;

        // Slot after the newest one holds the oldest timestamp
        let oldest_time = self.frame_times[self.frame_index];
        if oldest_time > 0.0 {
            let elapsed = time_ms - oldest_time;
            if elapsed > 0.0 {
                self.fps = ((FPS_WINDOW - 1) as f64 * 1000.0 / elapsed).round() as u32;
            }
        }
    }
}

/// A running board: simulation state plus its frame clock
#[derive(Debug, Clone)]
pub struct Simulation {
    pub state: SimState,
    clock: FrameClock,
}

impl Simulation {
    pub fn new(config: BoardConfig, seed: u64) -> Self {
        let clock = FrameClock::new(config.timing.clone());
        Self {
            state: SimState::new(config, seed),
            clock,
        }
    }

    /// Spawn action: replace all balls with `count` new ones
    pub fn spawn(&mut self, count: usize, field_width: f32) {
        self.state.spawn_balls(count, field_width);
    }

    /// Run one animation frame: tick the physics, then hand every object to `sink`
    pub fn frame<S: RenderSink + ?Sized>(&mut self, time_ms: f64, sink: &mut S) -> FrameSteps {
        let steps = self.clock.advance(time_ms);
        for _ in 0..steps.count {
            tick(&mut self.state, steps.dt);
        }
        draw_frame(&self.state, sink);
        steps
    }

    pub fn fps(&self) -> u32 {
        self.clock.fps()
    }

    /// Restart timing after a pause so the gap is not simulated
    pub fn reset_clock(&mut self) {
        self.clock.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::NullRenderer;
    use crate::sim::state::BallState;

    const SIXTY_HZ_MS: f64 = 1000.0 / 60.0;

    #[test]
    fn test_first_frame_runs_one_step() {
        let mut clock = FrameClock::new(TimingConfig::default());
        let steps = clock.advance(5000.0);
        assert_eq!(steps.count, 1);
        assert_eq!(steps.dt, TimingConfig::default().sim_dt);
    }

    #[test]
    fn test_sixty_hz_frames_run_two_ticks() {
        let mut clock = FrameClock::new(TimingConfig::default());
        clock.advance(0.0);
        let mut total = 0;
        for frame in 1..=60 {
            total += clock.advance(frame as f64 * SIXTY_HZ_MS).count;
        }
        // One second at 120 Hz, give or take the partial step left in the accumulator
        assert!((119..=120).contains(&total), "ran {total} ticks");
    }

    #[test]
    fn test_long_gap_is_clamped_and_capped() {
        let timing = TimingConfig::default();
        let mut clock = FrameClock::new(timing.clone());
        clock.advance(0.0);
        // Tab resumed after ten seconds
        let steps = clock.advance(10_000.0);
        assert_eq!(steps.count, timing.max_substeps);
        // Backlog is dropped instead of carried into the next frame
        let next = clock.advance(10_000.0 + SIXTY_HZ_MS);
        assert!(next.count <= 3);
    }

    #[test]
    fn test_backwards_timestamp_is_zero_dt() {
        let mut clock = FrameClock::new(TimingConfig::default());
        clock.advance(1000.0);
        let steps = clock.advance(900.0);
        assert_eq!(steps.count, 0);
    }

    #[test]
    fn test_variable_timestep_mode() {
        let timing = TimingConfig {
            fixed_timestep: false,
            ..Default::default()
        };
        let mut clock = FrameClock::new(timing);
        clock.advance(0.0);
        let steps = clock.advance(20.0);
        assert_eq!(steps.count, 1);
        assert!((steps.dt - 0.02).abs() < 1e-6);

        let steps = clock.advance(5000.0);
        assert_eq!(steps.dt, 0.1);
    }

    #[test]
    fn test_fps_counter() {
        let mut clock = FrameClock::new(TimingConfig::default());
        assert_eq!(clock.fps(), 0);
        for frame in 1..=120 {
            clock.advance(frame as f64 * SIXTY_HZ_MS);
        }
        assert_eq!(clock.fps(), 60);
    }

    #[test]
    fn test_empty_simulation_frames() {
        let mut sim = Simulation::new(BoardConfig::default(), 11);
        sim.spawn(0, 315.0);
        for frame in 0..30 {
            sim.frame(frame as f64 * SIXTY_HZ_MS, &mut NullRenderer);
        }
        assert!(sim.state.balls.is_empty());
        assert!(sim.state.time_ticks > 0);
    }

    #[test]
    fn test_simulation_drops_and_settles() {
        let mut sim = Simulation::new(BoardConfig::default(), 77);
        let width = sim.state.board.width;
        sim.spawn(12, width);

        let mut frame = 0;
        while !sim.state.settled() && frame < 60 * 60 {
            sim.frame(frame as f64 * SIXTY_HZ_MS, &mut NullRenderer);
            frame += 1;
        }

        assert!(sim.state.settled());
        for ball in &sim.state.balls {
            assert!(matches!(ball.state, BallState::Caught { .. }));
        }
    }

    #[test]
    fn test_reset_clock_skips_gap() {
        let mut sim = Simulation::new(BoardConfig::default(), 1);
        sim.frame(0.0, &mut NullRenderer);
        let before = sim.state.time_ticks;
        sim.reset_clock();
        let steps = sim.frame(60_000.0, &mut NullRenderer);
        assert_eq!(steps.count, 1);
        assert_eq!(sim.state.time_ticks, before + 1);
    }
}
