//! HTML Writer
//!
//! Writes a report as a single page (`index.html`) next to its artifacts: the
//! chart SVGs and, when encoding succeeded, the looping animation.

use std::fs;
use std::path::Path;

use askama::Template;
use tracing::info;

use crate::charts::ChartKind;
use crate::io::{IoError, IoResult, Writer};
use crate::report::Report;

/// A headline number shown in the metrics row.
#[derive(Debug, Clone)]
pub struct Metric {
    pub label: &'static str,
    pub value: String,
}

/// Chart data for rendering chart cards.
#[derive(Debug, Clone)]
pub struct ChartCard<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub file_name: &'a str,
    pub svg: &'a str,
}

/// Word problem data for the problem card.
#[derive(Debug, Clone)]
pub struct ProblemCard<'a> {
    pub title: &'a str,
    pub statement: &'a str,
    pub answer: String,
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate<'a> {
    title: &'a str,
    mode_label: &'a str,
    metrics: &'a [Metric],
    problem: Option<&'a ProblemCard<'a>>,
    charts: &'a [ChartCard<'a>],
    /// Animation file name (None = no animation)
    animation_file: Option<&'a str>,
    /// Horizontal extent of the animation, e.g. "0 to 36.0 m"
    animation_range: Option<&'a str>,
    warnings: &'a [String],
}

/// Writer for the HTML page
pub struct HtmlWriter {
    /// Whether to inline the chart SVGs into the page (default: true)
    pub inline_charts: bool,
}

impl HtmlWriter {
    /// Create a new HTML writer with default options (charts inlined)
    pub fn new() -> Self {
        Self {
            inline_charts: true,
        }
    }

    /// Create a new HTML writer with custom options
    pub fn with_options(inline_charts: bool) -> Self {
        Self { inline_charts }
    }

    fn metrics(report: &Report) -> Vec<Metric> {
        vec![
            Metric {
                label: "Mass",
                value: format!("{} kg", report.run.input.mass()),
            },
            Metric {
                label: "Force",
                value: format!("{} N", report.run.input.force()),
            },
            Metric {
                label: "Acceleration",
                value: format!("{:.2} m/s²", report.result.acceleration),
            },
        ]
    }

    fn problem_card(report: &Report) -> Option<ProblemCard<'static>> {
        let problem = report.run.problem?;
        let (time, distance, velocity) = report.answer();
        Some(ProblemCard {
            title: problem.title,
            statement: problem.statement,
            answer: format!(
                "After {time} s the object has covered {distance:.2} m and moves at {velocity:.2} m/s."
            ),
        })
    }

    /// Render the page without touching the filesystem
    pub fn render_page(&self, report: &Report) -> IoResult<String> {
        let metrics = Self::metrics(report);
        let problem = Self::problem_card(report);
        let charts: Vec<ChartCard<'_>> = report
            .charts
            .iter()
            .map(|chart| ChartCard {
                id: chart.kind.id(),
                title: chart.kind.title(),
                file_name: chart.kind.file_name(),
                svg: if self.inline_charts { chart.svg.as_str() } else { "" },
            })
            .collect();
        let animation_file = report.animation.as_ref().map(|a| a.file_name());
        let animation_range = report
            .animation
            .as_ref()
            .map(|a| format!("{} to {:.1} m", a.viewport.x_min, a.viewport.x_max));

        let template = IndexTemplate {
            title: "Newton's Second Law: Force = Mass × Acceleration",
            mode_label: report.run.mode.label(),
            metrics: &metrics,
            problem: problem.as_ref(),
            charts: &charts,
            animation_file: animation_file.as_deref(),
            animation_range: animation_range.as_deref(),
            warnings: &report.warnings,
        };

        template.render().map_err(|e| IoError::Write(e.to_string()))
    }
}

impl Default for HtmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer for HtmlWriter {
    fn write(&self, report: &Report, output: &Path) -> IoResult<()> {
        // Create output directory if it doesn't exist
        fs::create_dir_all(output)?;

        for kind in ChartKind::ALL {
            let path = output.join(kind.file_name());
            match report.charts.iter().find(|chart| chart.kind == kind) {
                Some(chart) => fs::write(&path, &chart.svg)?,
                // Left over from a word-problem pass
                None if path.exists() => fs::remove_file(&path)?,
                None => {}
            }
        }

        // Drop an animation left over from an earlier pass so the page never
        // shows a stale loop next to a warning
        let stale = output.join("animation.gif");
        if report.animation.is_none() && stale.exists() {
            fs::remove_file(&stale)?;
        }
        if let Some(animation) = &report.animation {
            fs::write(output.join(animation.file_name()), &animation.bytes)?;
        }

        let html = self.render_page(report)?;
        fs::write(output.join("index.html"), html)?;

        info!(output = %output.display(), "wrote page");
        Ok(())
    }

    fn format_id(&self) -> &str {
        "html"
    }
}
