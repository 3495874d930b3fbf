//! Training metrics ingestion
//!
//! The training run exports a results table (one row per epoch). It is
//! fetched from the asset host, typed, and projected into chart-ready
//! series sharing one epoch axis.

pub mod series;
pub mod table;

use thiserror::Error;

use crate::net::FetchError;

pub use series::{load, MetricsSeries};

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("failed to fetch training metrics: {0}")]
    Fetch(#[from] FetchError),

    #[error("training metrics table has no header row")]
    MissingHeader,
}
