//! Static line charts of the sampled motion.
//!
//! Charts are rendered to SVG strings with plotters so they can be inlined in
//! the page or written next to it.

use plotters::prelude::*;
use thiserror::Error;

use crate::kinematics::SimulationResult;
use crate::scenario::Mode;

/// Errors while drawing a chart
#[derive(Error, Debug)]
pub enum ChartError {
    /// There is nothing to plot
    #[error("cannot plot an empty series")]
    Empty,

    /// The x and y series differ in length
    #[error("series length mismatch: {x} time samples, {y} values")]
    LengthMismatch { x: usize, y: usize },

    /// The plotting backend failed
    #[error("drawing failed: {0}")]
    Draw(String),
}

/// Pixel size of a rendered chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartSize {
    fn default() -> Self {
        Self {
            width: 800,
            height: 320,
        }
    }
}

/// Which quantity a chart plots against time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Velocity,
    Position,
}

impl ChartKind {
    pub const ALL: [ChartKind; 2] = [ChartKind::Velocity, ChartKind::Position];

    /// Stable identifier used for anchors in the page
    pub fn id(&self) -> &'static str {
        match self {
            ChartKind::Velocity => "velocity",
            ChartKind::Position => "position",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::Velocity => "Velocity of the object over time",
            ChartKind::Position => "Position of the object over time",
        }
    }

    pub fn y_label(&self) -> &'static str {
        match self {
            ChartKind::Velocity => "Velocity (m/s)",
            ChartKind::Position => "Position (m)",
        }
    }

    /// File name used when the chart is written to disk
    pub fn file_name(&self) -> &'static str {
        match self {
            ChartKind::Velocity => "velocity.svg",
            ChartKind::Position => "position.svg",
        }
    }

    fn color(&self) -> RGBColor {
        match self {
            ChartKind::Velocity => RGBColor(31, 119, 180),
            ChartKind::Position => RGBColor(214, 39, 40),
        }
    }
}

/// A rendered chart artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub kind: ChartKind,
    pub svg: String,
}

fn draw_err<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Draw(e.to_string())
}

/// Draw `ys` against `xs` as a single line with labeled axes and a grid.
pub fn render_line_chart(
    kind: ChartKind,
    xs: &[f64],
    ys: &[f64],
    size: ChartSize,
) -> Result<Chart, ChartError> {
    if xs.is_empty() {
        return Err(ChartError::Empty);
    }
    if xs.len() != ys.len() {
        return Err(ChartError::LengthMismatch {
            x: xs.len(),
            y: ys.len(),
        });
    }

    let x_max = xs.iter().copied().fold(0.0_f64, f64::max);
    let y_max = ys.iter().copied().fold(0.0_f64, f64::max);
    // Degenerate ranges collapse the axis
    let x_max = if x_max > 0.0 { x_max } else { 1.0 };
    let y_max = if y_max > 0.0 { y_max * 1.05 } else { 1.0 };

    let mut svg = String::new();
    {
        let root =
            SVGBackend::with_string(&mut svg, (size.width, size.height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(16)
            .caption(kind.title(), ("sans-serif", 22))
            .x_label_area_size(48)
            .y_label_area_size(64)
            .build_cartesian_2d(0.0..x_max, 0.0..y_max)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_desc("Time (s)")
            .y_desc(kind.y_label())
            .bold_line_style(RGBColor(190, 190, 190).stroke_width(1))
            .light_line_style(RGBColor(235, 235, 235).stroke_width(1))
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(LineSeries::new(
                xs.iter().copied().zip(ys.iter().copied()),
                kind.color().stroke_width(2),
            ))
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
    }

    Ok(Chart { kind, svg })
}

/// Velocity chart always; position chart only in word-problem mode.
pub fn render_charts(
    result: &SimulationResult,
    mode: Mode,
    size: ChartSize,
) -> Result<Vec<Chart>, ChartError> {
    let mut charts = vec![render_line_chart(
        ChartKind::Velocity,
        &result.time_samples,
        &result.velocity_samples,
        size,
    )?];

    if mode.shows_position_chart() {
        charts.push(render_line_chart(
            ChartKind::Position,
            &result.time_samples,
            &result.position_samples,
            size,
        )?);
    }

    Ok(charts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::{DEFAULT_SAMPLE_COUNT, SimulationInput, compute};

    fn sample_result() -> SimulationResult {
        let input = SimulationInput::new(10.0, 50.0, 5.0).unwrap();
        compute(&input, DEFAULT_SAMPLE_COUNT).unwrap()
    }

    #[test]
    fn explore_mode_renders_velocity_only() {
        let charts = render_charts(&sample_result(), Mode::Explore, ChartSize::default()).unwrap();
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].kind, ChartKind::Velocity);
    }

    #[test]
    fn word_problem_mode_adds_position_chart() {
        let charts =
            render_charts(&sample_result(), Mode::WordProblem, ChartSize::default()).unwrap();
        let kinds: Vec<_> = charts.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ChartKind::Velocity, ChartKind::Position]);
    }

    #[test]
    fn velocity_chart_is_labeled_svg() {
        let chart = render_line_chart(
            ChartKind::Velocity,
            &[0.0, 1.0, 2.0],
            &[0.0, 2.0, 4.0],
            ChartSize {
                width: 400,
                height: 200,
            },
        )
        .unwrap();

        assert!(chart.svg.contains("<svg"), "should be an SVG document");
        assert!(chart.svg.contains("Time (s)"), "x axis should be labeled");
        assert!(chart.svg.contains("Velocity (m/s)"), "y axis should be labeled");
    }

    #[test]
    fn rejects_empty_series() {
        let err = render_line_chart(ChartKind::Position, &[], &[], ChartSize::default());
        assert!(matches!(err, Err(ChartError::Empty)));
    }

    #[test]
    fn rejects_mismatched_series() {
        let err = render_line_chart(
            ChartKind::Position,
            &[0.0, 1.0],
            &[0.0],
            ChartSize::default(),
        );
        assert!(matches!(
            err,
            Err(ChartError::LengthMismatch { x: 2, y: 1 })
        ));
    }

    #[test]
    fn all_kinds_have_distinct_files() {
        let files: Vec<_> = ChartKind::ALL.iter().map(|k| k.file_name()).collect();
        assert_eq!(files, vec!["velocity.svg", "position.svg"]);
    }

    #[test]
    fn chart_files_are_named_by_kind() {
        assert_eq!(ChartKind::Velocity.file_name(), "velocity.svg");
        assert_eq!(ChartKind::Position.file_name(), "position.svg");
    }
}
