//! newtonsim - Newton's second law (F = m·a) as a small kinematics model with
//! velocity/position charts and a looping animation of the motion.
//!
//! A recompute pass turns a validated [`config::ResolvedRun`] into a
//! [`report::Report`]; writers from [`io::FormatRegistry`] materialize it as an
//! HTML page, a JSON summary or a CSV sample table.

pub mod animation;
pub mod charts;
pub mod config;
pub mod data_writer;
pub mod html_writer;
pub mod io;
pub mod kinematics;
pub mod report;
pub mod scenario;
pub mod server;

pub use config::{Overrides, RunConfig};
pub use kinematics::{SimulationInput, SimulationResult, compute};
pub use report::Report;
