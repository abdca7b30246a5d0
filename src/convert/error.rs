//! Batch-level conversion errors.
//!
//! Per-document failures never surface here; they are recorded on the
//! owning WIP record and the batch continues. This error covers only
//! defects in the pipeline itself.

use thiserror::Error;

use crate::pipeline::MapError;

#[derive(Debug, Error)]
pub enum ConversionError {
    /// The bounded mapper misbehaved (truncation, task panic). Always a
    /// bug, never a property of the input project.
    #[error("conversion pipeline defect: {0}")]
    Pipeline(#[from] MapError),
}
