//! TomTom batch grid search for EV charging stations.
//!
//! Covers a bounding box with overlapping radius sub-queries, submits them as
//! one asynchronous batch job, polls the job under a bounded wait budget, and
//! merges the per-cell results into a deduplicated station set.

mod client;
mod error;
pub mod grid;
mod merge;
mod poll;
pub mod types;

pub use client::{SubmitOutcome, TomTomClient};
pub use error::TomTomError;
pub use grid::{BoundingBox, GridCell, SearchTier};
pub use merge::merge_batch;
pub use poll::{BatchJob, JobHandle, JobStatus, PollConfig};
pub use types::StationRecord;
