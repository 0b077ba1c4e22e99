//! Closed-form kinematics for a body starting at rest under a constant force.
//!
//! Everything here is evaluated from F = m·a and the constant-acceleration
//! equations `v = a·t` and `x = ½·a·t²`. There is no integration step and no
//! state carried between calls.

use serde::Serialize;
use thiserror::Error;

/// Default number of samples taken over `[0, duration]`.
pub const DEFAULT_SAMPLE_COUNT: usize = 100;

/// Rejected simulation input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidInputError {
    /// Mass must be strictly positive
    #[error("mass must be positive, got {0} kg")]
    Mass(f64),

    /// Force must be strictly positive
    #[error("force must be positive, got {0} N")]
    Force(f64),

    /// Duration must be strictly positive
    #[error("duration must be positive, got {0} s")]
    Duration(f64),

    /// At least two samples are needed to span the interval
    #[error("sample count must be at least 2, got {0}")]
    SampleCount(usize),

    /// Observation time must lie in `[0, duration]`
    #[error("observation time {time} s is outside [0, {duration}] s")]
    ObservationTime { time: f64, duration: f64 },
}

/// Validated inputs for one recompute pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationInput {
    mass: f64,
    force: f64,
    duration: f64,
}

impl SimulationInput {
    /// Build an input, rejecting non-positive or non-finite values before any
    /// division can happen.
    pub fn new(mass: f64, force: f64, duration: f64) -> Result<Self, InvalidInputError> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(InvalidInputError::Mass(mass));
        }
        if !(force.is_finite() && force > 0.0) {
            return Err(InvalidInputError::Force(force));
        }
        if !(duration.is_finite() && duration > 0.0) {
            return Err(InvalidInputError::Duration(duration));
        }
        Ok(Self {
            mass,
            force,
            duration,
        })
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn force(&self) -> f64 {
        self.force
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// a = F / m
    pub fn acceleration(&self) -> f64 {
        self.force / self.mass
    }
}

/// State of the body at a fixed observation time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observation {
    /// Observation time (s)
    pub time: f64,
    /// Distance covered since t = 0 (m)
    pub distance: f64,
    /// Velocity at the observation time (m/s)
    pub velocity: f64,
}

/// Sampled motion derived from a [`SimulationInput`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub input: SimulationInput,
    /// Constant acceleration (m/s²)
    pub acceleration: f64,
    pub time_samples: Vec<f64>,
    pub velocity_samples: Vec<f64>,
    pub position_samples: Vec<f64>,
    /// Present when an observation time was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation: Option<Observation>,
}

impl SimulationResult {
    /// Number of samples in each series.
    pub fn len(&self) -> usize {
        self.time_samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_samples.is_empty()
    }

    /// Velocity at the end of the simulated interval.
    pub fn final_velocity(&self) -> f64 {
        self.velocity_samples.last().copied().unwrap_or(0.0)
    }

    /// Position at the end of the simulated interval.
    pub fn final_position(&self) -> f64 {
        self.position_samples.last().copied().unwrap_or(0.0)
    }

    /// Iterate `(t, v, x)` rows in time order.
    pub fn rows(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.time_samples
            .iter()
            .zip(&self.velocity_samples)
            .zip(&self.position_samples)
            .map(|((&t, &v), &x)| (t, v, x))
    }
}

/// `count` evenly spaced values over `[start, end]`, both endpoints included.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| {
                    // Pin the last sample so rounding never overshoots the interval
                    if i == count - 1 {
                        end
                    } else {
                        start + step * i as f64
                    }
                })
                .collect()
        }
    }
}

/// Velocity at time `t` for a body starting at rest.
pub fn velocity_at(acceleration: f64, t: f64) -> f64 {
    acceleration * t
}

/// Position at time `t` for a body starting at rest at the origin.
pub fn position_at(acceleration: f64, t: f64) -> f64 {
    0.5 * acceleration * t * t
}

/// Sample velocity and position over `[0, duration]`.
pub fn compute(
    input: &SimulationInput,
    sample_count: usize,
) -> Result<SimulationResult, InvalidInputError> {
    if sample_count < 2 {
        return Err(InvalidInputError::SampleCount(sample_count));
    }

    let acceleration = input.acceleration();
    let time_samples = linspace(0.0, input.duration(), sample_count);
    let velocity_samples = time_samples
        .iter()
        .map(|&t| velocity_at(acceleration, t))
        .collect();
    let position_samples = time_samples
        .iter()
        .map(|&t| position_at(acceleration, t))
        .collect();

    Ok(SimulationResult {
        input: *input,
        acceleration,
        time_samples,
        velocity_samples,
        position_samples,
        observation: None,
    })
}

/// Like [`compute`], and also report where the body is at `observation_time`.
pub fn compute_with_observation(
    input: &SimulationInput,
    sample_count: usize,
    observation_time: f64,
) -> Result<SimulationResult, InvalidInputError> {
    if !(0.0..=input.duration()).contains(&observation_time) {
        return Err(InvalidInputError::ObservationTime {
            time: observation_time,
            duration: input.duration(),
        });
    }

    let mut result = compute(input, sample_count)?;
    result.observation = Some(Observation {
        time: observation_time,
        distance: position_at(result.acceleration, observation_time),
        velocity: velocity_at(result.acceleration, observation_time),
    });
    Ok(result)
}
