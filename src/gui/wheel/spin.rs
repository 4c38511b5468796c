use super::geometry::winning_index;
use serde::{Deserialize, Serialize};
use strum::Display as StrumDisplay;
use thiserror::Error;

/// Tunables for the deceleration model. Velocities are radians per frame.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SpinTuning {
    pub velocity_min: f64,
    pub velocity_max: f64,
    pub decay: f64,
    pub stop_threshold: f64,
}

impl Default for SpinTuning {
    fn default() -> Self {
        Self {
            velocity_min: 0.3,
            velocity_max: 0.5,
            decay: 0.99,
            stop_threshold: 0.001,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TuningError {
    #[error("decay must be strictly between 0 and 1, got {0}")]
    Decay(f64),
    #[error("velocity range [{0}, {1}) must be positive and non-empty")]
    VelocityRange(f64, f64),
    #[error("stop threshold must be positive and below the minimum velocity, got {0}")]
    StopThreshold(f64),
}

impl SpinTuning {
    /// Rejects values that would never stop, never start, or stop on the first frame.
    pub fn validate(&self) -> Result<(), TuningError> {
        if !(self.decay > 0.0 && self.decay < 1.0) {
            return Err(TuningError::Decay(self.decay));
        }
        if !(self.velocity_min > 0.0 && self.velocity_min < self.velocity_max) {
            return Err(TuningError::VelocityRange(
                self.velocity_min,
                self.velocity_max,
            ));
        }
        if !(self.stop_threshold > 0.0 && self.stop_threshold < self.velocity_min) {
            return Err(TuningError::StopThreshold(self.stop_threshold));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, StrumDisplay)]
pub enum Phase {
    #[default]
    Idle,
    Spinning,
}

/// Emitted once, on the tick that brings the wheel to rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinStop {
    pub index: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct SpinController {
    rotation: f64,
    velocity: f64,
    phase: Phase,
    settled: bool,
    tuning: SpinTuning,
}

impl SpinController {
    pub fn new(tuning: SpinTuning) -> Self {
        Self {
            rotation: 0.0,
            velocity: 0.0,
            phase: Phase::Idle,
            settled: false,
            tuning,
        }
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_spinning(&self) -> bool {
        self.phase == Phase::Spinning
    }

    /// True from the end of a spin until the next one starts. Sector edits in between keep it.
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// A running spin keeps its current velocity but decays and stops by the new values.
    pub fn set_tuning(&mut self, tuning: SpinTuning) {
        self.tuning = tuning;
    }

    /// Seeds a fresh velocity and enters `Spinning`. Returns false when nothing happened: no
    /// sectors, or a spin already in progress.
    pub fn start(&mut self, sector_count: usize, rng: &mut fastrand::Rng) -> bool {
        if sector_count == 0 || self.is_spinning() {
            return false;
        }

        let SpinTuning {
            velocity_min,
            velocity_max,
            ..
        } = self.tuning;
        self.velocity = velocity_min + rng.f64() * (velocity_max - velocity_min);
        self.phase = Phase::Spinning;
        self.settled = false;
        true
    }

    /// Advances one frame. The rotation is left untouched on the frame that stops the wheel.
    pub fn tick(&mut self, sector_count: usize) -> Option<SpinStop> {
        if !self.is_spinning() {
            return None;
        }

        self.velocity *= self.tuning.decay;
        if self.velocity < self.tuning.stop_threshold {
            self.velocity = 0.0;
            self.phase = Phase::Idle;
            self.settled = true;
            return Some(SpinStop {
                index: winning_index(self.rotation, sector_count),
            });
        }

        self.rotation += self.velocity;
        None
    }
}

impl Default for SpinController {
    fn default() -> Self {
        Self::new(SpinTuning::default())
    }
}
