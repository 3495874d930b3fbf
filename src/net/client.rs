//! reqwest-backed implementation of the network collaborators

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::debug;

use super::{AssetSource, FetchError, Fetched, InferenceService, PredictionError};
use crate::config::AppConfig;
use crate::state::data::{DiagnosticResult, ImageBlob};

/// Multipart field the inference service reads the image from
const FILE_FIELD: &str = "file";

/// Body returned by `POST /predict/`
///
/// The service also sends `class_id`, which the dashboard has no use for.
#[derive(Debug, Deserialize)]
struct PredictionBody {
    predicted_class: String,
    confidence: f64,
}

/// Shared HTTP client for the inference service and the asset host
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: Client,
    inference_url: String,
    asset_url: String,
    probe_timeout: Duration,
}

impl HttpClient {
    pub fn new(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            inference_url: config.inference_url.clone(),
            asset_url: config.asset_url.clone(),
            probe_timeout: config.probe_timeout(),
        })
    }

    fn inference_endpoint(&self, path: &str) -> String {
        format!("{}{}", self.inference_url, path)
    }

    fn asset_endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.asset_url, path)
        } else {
            format!("{}/{}", self.asset_url, path)
        }
    }
}

/// Turn transport errors and non-2xx answers into a [`FetchError`]
async fn checked(
    url: &str,
    request: impl std::future::Future<Output = Result<Response, reqwest::Error>>,
) -> Result<Response, FetchError> {
    let response = request.await.map_err(|source| FetchError::Transport {
        url: url.to_string(),
        source,
    })?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response)
}

async fn read_body(url: &str, response: Response) -> Result<Vec<u8>, FetchError> {
    response
        .bytes()
        .await
        .map(|bytes| bytes.to_vec())
        .map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })
}

/// Extract a [`DiagnosticResult`] from a prediction response body
pub(crate) fn decode_prediction(body: &[u8]) -> Result<DiagnosticResult, PredictionError> {
    let parsed: PredictionBody = serde_json::from_slice(body)?;
    if !DiagnosticResult::is_valid_confidence(parsed.confidence) {
        return Err(PredictionError::Confidence(parsed.confidence));
    }
    Ok(DiagnosticResult {
        predicted_class: parsed.predicted_class,
        confidence: parsed.confidence,
    })
}

impl InferenceService for HttpClient {
    async fn health(&self) -> Result<(), FetchError> {
        let url = self.inference_endpoint("/health");
        let request = self.http.get(&url).timeout(self.probe_timeout).send();
        checked(&url, request).await?;
        Ok(())
    }

    async fn predict(&self, image: &ImageBlob) -> Result<DiagnosticResult, PredictionError> {
        let url = self.inference_endpoint("/predict/");

        let mut part = Part::bytes(image.data.as_ref().clone()).file_name(image.name.clone());
        if let Some(media_type) = &image.media_type {
            // An unparseable declared type is sent without a Content-Type
            part = match part.mime_str(media_type) {
                Ok(typed) => typed,
                Err(_) => Part::bytes(image.data.as_ref().clone()).file_name(image.name.clone()),
            };
        }
        let form = Form::new().part(FILE_FIELD, part);

        debug!("Submitting {} ({} bytes) to {}", image.name, image.len(), url);
        let response = checked(&url, self.http.post(&url).multipart(form).send()).await?;
        let body = read_body(&url, response).await?;
        decode_prediction(&body)
    }
}

impl AssetSource for HttpClient {
    async fn fetch(&self, path: &str) -> Result<Fetched, FetchError> {
        let url = self.asset_endpoint(path);
        let response = checked(&url, self.http.get(&url).send()).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = read_body(&url, response).await?;
        Ok(Fetched { body, content_type })
    }
}
