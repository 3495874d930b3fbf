use thiserror::Error;

/// Failure to fetch a resource over HTTP
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection refused, timeout, body read failure...
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Failure to obtain a prediction for a submitted image
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The body was not the expected `{ predicted_class, confidence }` JSON
    #[error("unparseable prediction response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Confidence outside [0, 1] or not a number at all
    #[error("confidence {0} is outside [0, 1]")]
    Confidence(f64),
}
