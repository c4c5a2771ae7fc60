//! Simulation clock with pause support

use std::time::Instant;

/// Longest frame delta handed to the simulation, in seconds
pub const MAX_DELTA: f32 = 0.25;

/// Tracks simulation time for the feedback coordinator
pub struct SimClock {
    /// Total simulated time in seconds; frozen while paused
    pub total_time: f32,
    /// Time since last frame in seconds
    pub delta_time: f32,
    paused: bool,
    /// Last tick instant
    last_instant: Instant,
    /// Whether this is the first tick
    first_tick: bool,
}

impl Default for SimClock {
    fn default() -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            paused: false,
            last_instant: Instant::now(),
            first_tick: true,
        }
    }
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by wall time. Call once per frame.
    pub fn tick(&mut self) {
        let now = Instant::now();

        if self.first_tick {
            self.first_tick = false;
            self.last_instant = now;
            self.delta_time = 0.0;
            return;
        }

        let elapsed = now.duration_since(self.last_instant).as_secs_f32();
        self.last_instant = now;
        self.advance(elapsed);
    }

    /// Advance by a fixed step, for headless and deterministic runs
    pub fn advance(&mut self, dt: f32) {
        if self.paused {
            self.delta_time = 0.0;
            return;
        }
        // Clamp so a stalled window doesn't fling every particle at once
        self.delta_time = dt.clamp(0.0, MAX_DELTA);
        self.total_time += self.delta_time;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}
