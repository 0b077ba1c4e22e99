//! One recompute pass: kinematics, charts, animation.
//!
//! Invalid input and chart failures end the pass. Animation failures never do:
//! they are logged and turned into a warning for the page.

use thiserror::Error;
use tracing::{debug, warn};

use crate::animation::{
    AnimationEncoder, AnimationEncodingError, AnimationPlan, EncodedAnimation, FrameRasterizer,
    encoder_for_format, render_animation,
};
use crate::charts::{Chart, ChartError, render_charts};
use crate::config::ResolvedRun;
use crate::kinematics::{InvalidInputError, SimulationResult, compute, compute_with_observation};

/// Errors that abort a recompute pass
#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Input(#[from] InvalidInputError),

    #[error("chart rendering failed: {0}")]
    Chart(#[from] ChartError),
}

/// Everything the display layer needs for one pass.
#[derive(Debug, Clone)]
pub struct Report {
    pub run: ResolvedRun,
    pub result: SimulationResult,
    pub charts: Vec<Chart>,
    /// `None` when disabled or when encoding failed (see `warnings`)
    pub animation: Option<EncodedAnimation>,
    pub warnings: Vec<String>,
}

impl Report {
    /// Run the pass with the encoder configured for the run.
    pub fn build(run: &ResolvedRun) -> Result<Self, ReportError> {
        Self::build_inner(run, |plan, rasterizer| {
            let encoder = encoder_for_format(&run.animation.format)?;
            render_animation(plan, rasterizer, encoder.as_ref())
        })
    }

    /// Run the pass with an explicit animation encoder.
    pub fn build_with_encoder(
        run: &ResolvedRun,
        encoder: &dyn AnimationEncoder,
    ) -> Result<Self, ReportError> {
        Self::build_inner(run, |plan, rasterizer| render_animation(plan, rasterizer, encoder))
    }

    fn build_inner<F>(run: &ResolvedRun, encode: F) -> Result<Self, ReportError>
    where
        F: FnOnce(
            &AnimationPlan,
            &FrameRasterizer,
        ) -> Result<EncodedAnimation, AnimationEncodingError>,
    {
        let result = match run.observation_time {
            Some(time) => compute_with_observation(&run.input, run.sample_count, time)?,
            None => compute(&run.input, run.sample_count)?,
        };
        debug!(
            acceleration = result.acceleration,
            samples = result.len(),
            "kinematics computed"
        );

        let charts = render_charts(&result, run.mode, run.chart)?;

        let mut warnings = Vec::new();
        let animation = if run.animation.enabled {
            let rasterizer = FrameRasterizer::new(run.animation.frame_size());
            let encoded = AnimationPlan::new(
                result.acceleration,
                run.input.duration(),
                run.animation.fps,
            )
            .and_then(|plan| encode(&plan, &rasterizer));

            match encoded {
                Ok(animation) => Some(animation),
                Err(e) => {
                    warn!(error = %e, "animation unavailable, continuing without it");
                    warnings.push(format!("Could not generate the animation: {e}"));
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            run: run.clone(),
            result,
            charts,
            animation,
            warnings,
        })
    }

    /// Time, distance and velocity reported as the answer: the observation in
    /// word-problem mode, the end of the interval otherwise.
    pub fn answer(&self) -> (f64, f64, f64) {
        match self.result.observation {
            Some(obs) => (obs.time, obs.distance, obs.velocity),
            None => (
                self.run.input.duration(),
                self.result.final_position(),
                self.result.final_velocity(),
            ),
        }
    }

    /// Plain-text summary for the terminal.
    pub fn summary(&self) -> String {
        let mode = match self.run.problem {
            Some(problem) => format!("{} ({})", self.run.mode.label(), problem.id),
            None => self.run.mode.label().to_string(),
        };
        let (time, distance, velocity) = self.answer();

        let mut lines = vec![
            format!("Mode: {mode}"),
            format!("Mass: {} kg", self.run.input.mass()),
            format!("Force: {} N", self.run.input.force()),
            format!("Acceleration: {:.2} m/s²", self.result.acceleration),
            format!("Distance after {time} s: {distance:.2} m"),
            format!("Velocity after {time} s: {velocity:.2} m/s"),
        ];
        lines.extend(self.warnings.iter().map(|w| format!("Warning: {w}")));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::FrameStream;
    use crate::config::{Overrides, RunConfig};
    use std::io::Write;

    fn run_from(overrides: Overrides, fps: u32) -> ResolvedRun {
        let mut config = RunConfig::default();
        config.animation.width = 80;
        config.animation.height = 30;
        config.animation.fps = fps;
        config.apply(&overrides);
        config.resolve().unwrap()
    }

    struct UnavailableEncoder;

    impl AnimationEncoder for UnavailableEncoder {
        fn format_id(&self) -> &str {
            "gif"
        }

        fn encode(
            &self,
            _plan: &AnimationPlan,
            _frames: &mut FrameStream<'_>,
            _out: &mut dyn Write,
        ) -> Result<(), AnimationEncodingError> {
            Err(AnimationEncodingError::Unavailable("gif".to_string()))
        }
    }

    #[test]
    fn explore_pass_renders_velocity_chart_and_animation() {
        let run = run_from(
            Overrides {
                duration: Some(1.0),
                ..Default::default()
            },
            10,
        );
        let report = Report::build(&run).unwrap();

        assert_eq!(report.charts.len(), 1);
        let animation = report.animation.expect("animation should be encoded");
        assert_eq!(animation.frame_count, 10);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn word_problem_pass_reports_distance() {
        let run = run_from(
            Overrides {
                problem: Some("sled".to_string()),
                no_animation: true,
                ..Default::default()
            },
            20,
        );
        let report = Report::build(&run).unwrap();

        assert_eq!(report.charts.len(), 2);
        assert!(report.animation.is_none());
        assert!(report.warnings.is_empty());
        assert_eq!(report.answer(), (5.0, 62.5, 25.0));
    }

    #[test]
    fn encoder_failure_downgrades_to_warning() {
        let run = run_from(
            Overrides {
                duration: Some(1.0),
                ..Default::default()
            },
            10,
        );
        let report = Report::build_with_encoder(&run, &UnavailableEncoder).unwrap();

        assert!(report.animation.is_none());
        assert_eq!(report.charts.len(), 1, "charts still render");
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("Could not generate the animation"));
    }

    #[test]
    fn unknown_animation_format_downgrades_to_warning() {
        let mut run = run_from(Overrides::default(), 20);
        run.animation.format = "apng".to_string();
        let report = Report::build(&run).unwrap();

        assert!(report.animation.is_none());
        assert_eq!(
            report.warnings,
            vec!["Could not generate the animation: no animation encoder available for format: apng"]
        );
    }

    #[test]
    fn oversized_frames_downgrade_to_warning() {
        // A library caller can build a run without going through the config bounds
        let mut run = run_from(Overrides::default(), 2);
        run.animation.width = u32::MAX;
        run.animation.height = u32::MAX;
        let report = Report::build(&run).unwrap();

        assert!(report.animation.is_none());
        assert_eq!(report.charts.len(), 1, "charts still render");
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("unusable frame size"));
    }

    #[test]
    fn summary_for_word_problem() {
        let run = run_from(
            Overrides {
                problem: Some("sled".to_string()),
                no_animation: true,
                ..Default::default()
            },
            20,
        );
        let report = Report::build(&run).unwrap();

        insta::assert_snapshot!(report.summary(), @r"
        Mode: Word problem (sled)
        Mass: 10 kg
        Force: 50 N
        Acceleration: 5.00 m/s²
        Distance after 5 s: 62.50 m
        Velocity after 5 s: 25.00 m/s
        ");
    }

    #[test]
    fn summary_for_unit_explore_run() {
        let run = run_from(
            Overrides {
                duration: Some(1.0),
                no_animation: true,
                ..Default::default()
            },
            20,
        );
        let report = Report::build(&run).unwrap();

        insta::assert_snapshot!(report.summary(), @r"
        Mode: Explore
        Mass: 1 kg
        Force: 1 N
        Acceleration: 1.00 m/s²
        Distance after 1 s: 0.50 m
        Velocity after 1 s: 1.00 m/s
        ");
    }
}
