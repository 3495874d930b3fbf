//! Scripted stand-in for the remote collaborators, for tests

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use super::{AssetSource, FetchError, Fetched, InferenceService, PredictionError};
use crate::state::data::{DiagnosticResult, ImageBlob};

/// What the fake answers to `predict`
#[derive(Debug, Clone)]
pub enum PredictScript {
    Answer(DiagnosticResult),
    Status(u16),
    /// An out-of-range confidence, rejected like a malformed body
    BadConfidence(f64),
}

#[derive(Debug)]
pub struct FakeService {
    pub predict: PredictScript,
    /// How long `predict` takes before answering
    pub predict_delay: Duration,
    pub online: bool,
    pub assets: HashMap<String, Fetched>,
    /// Times at which `predict` was entered
    pub predict_calls: Mutex<Vec<Instant>>,
    /// Times at which `health` was entered
    pub health_calls: Mutex<Vec<Instant>>,
}

impl FakeService {
    pub fn answering(predicted_class: &str, confidence: f64) -> Self {
        Self::with_script(PredictScript::Answer(DiagnosticResult {
            predicted_class: predicted_class.to_string(),
            confidence,
        }))
    }

    pub fn with_script(predict: PredictScript) -> Self {
        Self {
            predict,
            predict_delay: Duration::ZERO,
            online: true,
            assets: HashMap::new(),
            predict_calls: Mutex::new(Vec::new()),
            health_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_asset(mut self, path: &str, body: &[u8], content_type: Option<&str>) -> Self {
        self.assets.insert(
            path.to_string(),
            Fetched {
                body: body.to_vec(),
                content_type: content_type.map(str::to_string),
            },
        );
        self
    }

    pub fn predict_count(&self) -> usize {
        self.predict_calls.lock().unwrap().len()
    }
}

impl InferenceService for FakeService {
    async fn health(&self) -> Result<(), FetchError> {
        self.health_calls.lock().unwrap().push(Instant::now());
        if self.online {
            Ok(())
        } else {
            Err(FetchError::Status {
                url: "fake://health".to_string(),
                status: 503,
            })
        }
    }

    async fn predict(&self, _image: &ImageBlob) -> Result<DiagnosticResult, PredictionError> {
        self.predict_calls.lock().unwrap().push(Instant::now());
        tokio::time::sleep(self.predict_delay).await;
        match &self.predict {
            PredictScript::Answer(result) => Ok(result.clone()),
            PredictScript::Status(status) => Err(PredictionError::Fetch(FetchError::Status {
                url: "fake://predict/".to_string(),
                status: *status,
            })),
            PredictScript::BadConfidence(confidence) => Err(PredictionError::Confidence(*confidence)),
        }
    }
}

impl AssetSource for FakeService {
    async fn fetch(&self, path: &str) -> Result<Fetched, FetchError> {
        self.assets.get(path).cloned().ok_or_else(|| FetchError::Status {
            url: format!("fake://{path}"),
            status: 404,
        })
    }
}
