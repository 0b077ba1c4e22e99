//! Machine-readable outputs: `summary.json` and `samples.csv`.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::io::{IoError, IoResult, Writer};
use crate::kinematics::{Observation, SimulationInput};
use crate::report::Report;
use crate::scenario::Mode;

/// Animation metadata included in the JSON summary.
#[derive(Debug, Clone, Serialize)]
pub struct AnimationSummary<'a> {
    pub file: String,
    pub format: &'a str,
    pub frames: usize,
    pub fps: u32,
}

/// Serialized view of a report (samples are in the CSV output).
#[derive(Debug, Clone, Serialize)]
pub struct Summary<'a> {
    pub mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<&'a str>,
    pub input: SimulationInput,
    pub acceleration: f64,
    pub final_velocity: f64,
    pub final_position: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation: Option<Observation>,
    pub animation: Option<AnimationSummary<'a>>,
    pub warnings: &'a [String],
}

impl<'a> Summary<'a> {
    pub fn from_report(report: &'a Report) -> Self {
        Self {
            mode: report.run.mode,
            problem: report.run.problem.map(|p| p.id),
            input: report.run.input,
            acceleration: report.result.acceleration,
            final_velocity: report.result.final_velocity(),
            final_position: report.result.final_position(),
            observation: report.result.observation,
            animation: report.animation.as_ref().map(|a| AnimationSummary {
                file: a.file_name(),
                format: &a.format,
                frames: a.frame_count,
                fps: a.fps,
            }),
            warnings: &report.warnings,
        }
    }
}

/// Writes `summary.json`
pub struct JsonWriter;

impl JsonWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer for JsonWriter {
    fn write(&self, report: &Report, output: &Path) -> IoResult<()> {
        fs::create_dir_all(output)?;
        let json = serde_json::to_string_pretty(&Summary::from_report(report))
            .map_err(|e| IoError::Write(e.to_string()))?;
        fs::write(output.join("summary.json"), json)?;
        Ok(())
    }

    fn format_id(&self) -> &str {
        "json"
    }
}

/// Writes `samples.csv` with one row per time sample
pub struct CsvWriter;

impl CsvWriter {
    pub fn new() -> Self {
        Self
    }

    fn to_csv(report: &Report) -> String {
        let rows: String = report
            .result
            .rows()
            .map(|(t, v, x)| format!("{t},{v},{x}\n"))
            .collect();
        format!("time_s,velocity_m_s,position_m\n{rows}")
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer for CsvWriter {
    fn write(&self, report: &Report, output: &Path) -> IoResult<()> {
        fs::create_dir_all(output)?;
        fs::write(output.join("samples.csv"), Self::to_csv(report))?;
        Ok(())
    }

    fn format_id(&self) -> &str {
        "csv"
    }
}
