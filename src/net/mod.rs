//! Network collaborators
//!
//! The dashboard talks to two remote parties:
//! - the inference service (liveness probe and prediction)
//! - the static asset host (bundled samples and the training metrics table)
//!
//! Both are expressed as traits so the pipeline, the health monitor and the
//! loaders can be driven by a scripted fake in tests.

pub mod client;
pub mod error;

#[cfg(test)]
pub mod fake;

use std::future::Future;

pub use client::HttpClient;
pub use error::{FetchError, PredictionError};

use crate::state::data::{DiagnosticResult, ImageBlob};

/// A fetched static asset
#[derive(Debug, Clone)]
pub struct Fetched {
    pub body: Vec<u8>,
    /// Value of the Content-Type header, if the server sent one
    pub content_type: Option<String>,
}

/// The remote inference service
pub trait InferenceService: Send + Sync + 'static {
    /// `GET /health`: `Ok` for any 2xx answer
    fn health(&self) -> impl Future<Output = Result<(), FetchError>> + Send;

    /// `POST /predict/` with the image as the multipart field `file`
    fn predict(
        &self,
        image: &ImageBlob,
    ) -> impl Future<Output = Result<DiagnosticResult, PredictionError>> + Send;
}

/// Host of the bundled samples and the metrics artifact
pub trait AssetSource: Send + Sync + 'static {
    /// `GET {path}` relative to the asset host
    fn fetch(&self, path: &str) -> impl Future<Output = Result<Fetched, FetchError>> + Send;
}
