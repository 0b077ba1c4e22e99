//! Writer trait and output format dispatch
//!
//! A writer takes a finished [`Report`] and materializes it in an output
//! directory. The registry maps format ids (`html`, `json`, `csv`) to writers.

use std::path::Path;

use thiserror::Error;

use crate::data_writer::{CsvWriter, JsonWriter};
use crate::html_writer::HtmlWriter;
use crate::report::Report;

/// Errors that can occur while writing outputs
#[derive(Error, Debug)]
pub enum IoError {
    /// No writer is registered for this format
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// An I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A rendering/serialization error occurred
    #[error("write error: {0}")]
    Write(String),
}

/// Result type for writer operations
pub type IoResult<T> = Result<T, IoError>;

/// A writer outputs a report in a specific format
pub trait Writer {
    /// Write the report into the output directory
    fn write(&self, report: &Report, output: &Path) -> IoResult<()>;

    /// Identifier for this output format (e.g., "html", "json")
    fn format_id(&self) -> &str;
}

/// Registry of available writers
pub struct FormatRegistry {
    writers: Vec<Box<dyn Writer>>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            writers: Vec::new(),
        }
    }

    /// Create a registry with all default writers registered
    ///
    /// Currently registers `HtmlWriter` (html), `JsonWriter` (json) and
    /// `CsvWriter` (csv).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_writer(Box::new(HtmlWriter::new()));
        registry.register_writer(Box::new(JsonWriter::new()));
        registry.register_writer(Box::new(CsvWriter::new()));
        registry
    }

    /// Register a writer
    pub fn register_writer(&mut self, writer: Box<dyn Writer>) {
        self.writers.push(writer);
    }

    /// Find a writer by format ID
    pub fn writer_for_format(&self, format_id: &str) -> Option<&dyn Writer> {
        self.writers
            .iter()
            .find(|w| w.format_id().eq_ignore_ascii_case(format_id))
            .map(|w| w.as_ref())
    }

    /// Like [`writer_for_format`](Self::writer_for_format), as an error
    pub fn require_writer(&self, format_id: &str) -> IoResult<&dyn Writer> {
        self.writer_for_format(format_id)
            .ok_or_else(|| IoError::UnsupportedFormat(format_id.to_string()))
    }

    /// Format ids of all registered writers
    pub fn format_ids(&self) -> Vec<&str> {
        self.writers.iter().map(|w| w.format_id()).collect()
    }
}
