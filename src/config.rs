//! Run configuration loaded from YAML and overridden from the command line.
//!
//! Every field is optional. A minimal explore run is an empty file; a word
//! problem only needs its id:
//!
//! ```yaml
//! mode: word_problem
//! problem: sled
//! force: 80.0          # overrides the problem's default force
//! animation:
//!   fps: 20
//!   width: 600
//!   height: 180
//! ```
//!
//! [`RunConfig::resolve`] is the input boundary: it applies the widget limits
//! (mass and force at least 0.1, duration between 1 and 10 s), bounds the
//! sample count, frame rate and image sizes, and produces a validated
//! [`ResolvedRun`] for one recompute pass.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::animation::{DEFAULT_FPS, FrameSize};
use crate::charts::ChartSize;
use crate::kinematics::{DEFAULT_SAMPLE_COUNT, InvalidInputError, SimulationInput};
use crate::scenario::{self, Mode, WordProblem};

pub const MIN_MASS: f64 = 0.1;
pub const MIN_FORCE: f64 = 0.1;
pub const MIN_DURATION: f64 = 1.0;
pub const MAX_DURATION: f64 = 10.0;

pub const MAX_SAMPLE_COUNT: usize = 10_000;
pub const MIN_FPS: u32 = 1;
pub const MAX_FPS: u32 = 60;
pub const MIN_FRAME_SIDE: u32 = 16;
pub const MAX_FRAME_SIDE: u32 = 1920;
pub const MIN_CHART_SIDE: u32 = 100;
pub const MAX_CHART_SIDE: u32 = 4096;

pub const DEFAULT_MASS: f64 = 1.0;
pub const DEFAULT_FORCE: f64 = 1.0;
pub const DEFAULT_DURATION: f64 = 5.0;

/// Errors raised while loading or validating a run configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),

    /// The configuration file is not valid YAML for this schema
    #[error("invalid config: {0}")]
    Parse(String),

    /// No word problem with this id exists
    #[error("unknown word problem: {0}")]
    UnknownProblem(String),

    /// Word-problem mode without a problem id
    #[error("word-problem mode requires a problem id")]
    MissingProblem,

    /// A problem id was given in explore mode
    #[error("problem '{0}' given but mode is explore")]
    ProblemInExploreMode(String),

    /// The observation time of a word problem cannot be changed
    #[error("duration is fixed by word problem '{0}'")]
    DurationFixedByProblem(String),

    /// A value is below the minimum accepted at the input boundary
    #[error("{field} must be at least {min}, got {value}")]
    BelowMinimum {
        field: &'static str,
        value: f64,
        min: f64,
    },

    /// A value is outside the range accepted at the input boundary
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A count or pixel size is outside its accepted range
    #[error("{field} must be between {min} and {max}, got {value}")]
    CountOutOfRange {
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    /// The kinematics model rejected the input
    #[error(transparent)]
    Input(#[from] InvalidInputError),
}

/// Animation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationConfig {
    pub enabled: bool,
    /// Encoder format id
    pub format: String,
    pub fps: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        let size = FrameSize::default();
        Self {
            enabled: true,
            format: "gif".to_string(),
            fps: DEFAULT_FPS,
            width: size.width,
            height: size.height,
        }
    }
}

impl AnimationConfig {
    pub fn frame_size(&self) -> FrameSize {
        FrameSize {
            width: self.width,
            height: self.height,
        }
    }
}

/// Chart settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        let size = ChartSize::default();
        Self {
            width: size.width,
            height: size.height,
        }
    }
}

/// Top-level run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub mode: Mode,
    pub problem: Option<String>,
    pub mass: Option<f64>,
    pub force: Option<f64>,
    pub duration: Option<f64>,
    pub sample_count: usize,
    pub animation: AnimationConfig,
    pub chart: ChartConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Explore,
            problem: None,
            mass: None,
            force: None,
            duration: None,
            sample_count: DEFAULT_SAMPLE_COUNT,
            animation: AnimationConfig::default(),
            chart: ChartConfig::default(),
        }
    }
}

/// Values given on the command line, applied on top of the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub mass: Option<f64>,
    pub force: Option<f64>,
    pub duration: Option<f64>,
    pub problem: Option<String>,
    pub fps: Option<u32>,
    pub sample_count: Option<usize>,
    pub no_animation: bool,
}

/// A validated configuration for one recompute pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRun {
    pub mode: Mode,
    pub problem: Option<&'static WordProblem>,
    pub input: SimulationInput,
    pub sample_count: usize,
    /// Set in word-problem mode
    pub observation_time: Option<f64>,
    pub animation: AnimationConfig,
    pub chart: ChartSize,
}

fn check_min(field: &'static str, value: f64, min: f64) -> Result<f64, ConfigError> {
    // NaN fails the comparison and is rejected too
    if value >= min && value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::BelowMinimum { field, value, min })
    }
}

fn check_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<f64, ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

fn check_count<T>(field: &'static str, value: T, min: T, max: T) -> Result<T, ConfigError>
where
    T: Copy + PartialOrd + Into<u64>,
{
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::CountOutOfRange {
            field,
            value: value.into(),
            min: min.into(),
            max: max.into(),
        })
    }
}

impl RunConfig {
    /// Load a configuration file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a configuration from YAML text. An empty document is the default
    /// configuration.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply command-line values. Naming a problem switches to word-problem mode.
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(problem) = &overrides.problem {
            self.mode = Mode::WordProblem;
            self.problem = Some(problem.clone());
        }
        if overrides.mass.is_some() {
            self.mass = overrides.mass;
        }
        if overrides.force.is_some() {
            self.force = overrides.force;
        }
        if overrides.duration.is_some() {
            self.duration = overrides.duration;
        }
        if let Some(fps) = overrides.fps {
            self.animation.fps = fps;
        }
        if let Some(count) = overrides.sample_count {
            self.sample_count = count;
        }
        if overrides.no_animation {
            self.animation.enabled = false;
        }
    }

    /// Validate against the input boundary and build the pass inputs.
    pub fn resolve(&self) -> Result<ResolvedRun, ConfigError> {
        let problem = match (self.mode, &self.problem) {
            (Mode::Explore, None) => None,
            (Mode::Explore, Some(id)) => {
                return Err(ConfigError::ProblemInExploreMode(id.clone()));
            }
            (Mode::WordProblem, None) => return Err(ConfigError::MissingProblem),
            (Mode::WordProblem, Some(id)) => Some(
                scenario::find(id).ok_or_else(|| ConfigError::UnknownProblem(id.clone()))?,
            ),
        };

        let (default_mass, default_force) = problem
            .map(|p| (p.mass, p.force))
            .unwrap_or((DEFAULT_MASS, DEFAULT_FORCE));

        let duration = match problem {
            Some(p) if self.duration.is_some() => {
                return Err(ConfigError::DurationFixedByProblem(p.id.to_string()));
            }
            Some(p) => p.observation_time,
            None => self.duration.unwrap_or(DEFAULT_DURATION),
        };

        let mass = check_min("mass", self.mass.unwrap_or(default_mass), MIN_MASS)?;
        let force = check_min("force", self.force.unwrap_or(default_force), MIN_FORCE)?;
        let duration = check_range("duration", duration, MIN_DURATION, MAX_DURATION)?;

        if self.sample_count < 2 {
            return Err(InvalidInputError::SampleCount(self.sample_count).into());
        }
        let sample_count = check_count(
            "sample_count",
            self.sample_count as u64,
            2,
            MAX_SAMPLE_COUNT as u64,
        )? as usize;

        let chart = ChartSize {
            width: check_count("chart.width", self.chart.width, MIN_CHART_SIDE, MAX_CHART_SIDE)?,
            height: check_count(
                "chart.height",
                self.chart.height,
                MIN_CHART_SIDE,
                MAX_CHART_SIDE,
            )?,
        };

        let animation = &self.animation;
        check_count("animation.fps", animation.fps, MIN_FPS, MAX_FPS)?;
        check_count("animation.width", animation.width, MIN_FRAME_SIDE, MAX_FRAME_SIDE)?;
        check_count(
            "animation.height",
            animation.height,
            MIN_FRAME_SIDE,
            MAX_FRAME_SIDE,
        )?;

        Ok(ResolvedRun {
            mode: self.mode,
            problem,
            input: SimulationInput::new(mass, force, duration)?,
            sample_count,
            observation_time: problem.map(|p| p.observation_time),
            animation: animation.clone(),
            chart,
        })
    }
}
