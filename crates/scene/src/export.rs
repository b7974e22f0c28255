//! JSON export of a placement result.
//!
//! The document carries the field name, the trace configuration, run
//! statistics, one drawable `[x, y]` path per streamline (backward end,
//! seed, forward end) and, when recorded, the candidate seeds with their
//! construction segments.

use evenflow_core::{FlowError, Point2, TraceConfig};
use evenflow_trace::{CandidateTrace, PlacementOutput, PlacementStats, TracedStreamline};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct Document<'a> {
    field: &'a str,
    config: &'a TraceConfig,
    stats: &'a PlacementStats,
    total_length: f64,
    streamlines: Vec<Vec<Point2>>,
    candidates: &'a [CandidateTrace],
}

/// A placement result ready to be written out.
#[derive(Debug, Clone, Copy)]
pub struct Export<'a> {
    pub field: &'a str,
    pub config: &'a TraceConfig,
    pub output: &'a PlacementOutput,
}

impl<'a> Export<'a> {
    /// Borrows everything the document needs.
    pub fn new(field: &'a str, config: &'a TraceConfig, output: &'a PlacementOutput) -> Self {
        Self {
            field,
            config,
            output,
        }
    }

    fn document(&self) -> Document<'a> {
        Document {
            field: self.field,
            config: self.config,
            stats: &self.output.stats,
            total_length: self.output.total_length(),
            streamlines: self
                .output
                .streamlines
                .iter()
                .map(TracedStreamline::path)
                .collect(),
            candidates: &self.output.candidates,
        }
    }

    /// The document as a JSON value.
    ///
    /// Returns `FlowError::Io` if serialization fails.
    pub fn to_value(&self) -> Result<serde_json::Value, FlowError> {
        serde_json::to_value(self.document()).map_err(|e| FlowError::Io(e.to_string()))
    }

    /// Writes the document as pretty-printed JSON.
    ///
    /// Returns `FlowError::Io` on serialization or write failure.
    pub fn write_json(&self, path: &Path) -> Result<(), FlowError> {
        let text = serde_json::to_string_pretty(&self.document())
            .map_err(|e| FlowError::Io(e.to_string()))?;
        std::fs::write(path, text).map_err(|e| FlowError::Io(e.to_string()))?;
        tracing::info!(path = %path.display(), "wrote placement");
        Ok(())
    }
}
