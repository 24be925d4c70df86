//! Clock driven spin of the grass block.
//!
//! The angle is recomputed from the clock on every tick instead of being
//! accumulated from frame deltas, so a dropped or slow frame never skews it.

use std::f64::consts::TAU;

use cgmath::Rad;
use instant::Instant;

use crate::{clock::Clock, data_structures::transform::Transform};

/// Rotation after `elapsed_seconds` at `speed` radians per second, reduced to
/// `[0, 2π)`.
///
/// The product is formed and reduced in `f64` before narrowing, which keeps the
/// angle exact to f32 precision however long the scene has been running.
pub fn spin_angle(elapsed_seconds: f64, speed: f64) -> Rad<f32> {
    let angle = (elapsed_seconds * speed).rem_euclid(TAU) as f32;
    // Angles just below 2π round up to exactly 2π when narrowed
    if angle >= std::f32::consts::TAU {
        Rad(0.0)
    } else {
        Rad(angle)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
}

#[derive(Debug, Clone)]
pub struct AnimationDriver {
    clock: Clock,
    speed: f64,
    state: DriverState,
}

impl AnimationDriver {
    pub fn new(speed: f64) -> Self {
        Self {
            clock: Clock::new(false),
            speed,
            state: DriverState::Idle,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Idle -> Running. Later calls keep the clock running untouched.
    pub fn start_at(&mut self, now: Instant) {
        if self.state == DriverState::Running {
            return;
        }
        self.clock.start_at(now);
        self.state = DriverState::Running;
        log::info!("animation started");
    }

    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    /// Spin `transform` to where it belongs at `now` and return the angle.
    pub fn tick_at(&mut self, now: Instant, transform: &mut Transform) -> Rad<f32> {
        self.start_at(now);
        let elapsed = self.clock.elapsed_time_at(now);
        let angle = spin_angle(elapsed, self.speed);
        transform.rotation.y = angle;
        angle
    }

    pub fn tick(&mut self, transform: &mut Transform) -> Rad<f32> {
        self.tick_at(Instant::now(), transform)
    }
}
