//! Staged analysis of the active image
//!
//! A run plays three progress labels, one dwell each, then submits the
//! image for prediction. The labels are pacing only: the real work is the
//! single network call at the end.
//!
//! [`run`] produces the run as a stream of [`AnalysisEvent`]s; the
//! application folds them into its [`AnalysisState`] on the event loop.

use std::sync::Arc;
use std::time::Duration;

use iced::futures::stream::{self, Stream};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::data::{DiagnosticResult, ImageBlob, SelectedImage};
use crate::net::InferenceService;

/// Progress labels shown before the image is submitted, in order
pub const STAGE_LABELS: [&str; 3] = [
    "Analyzing radiograph...",
    "Detecting diseases...",
    "Performing deep learning...",
];

/// Why a run could not be started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("Please select an image")]
    NoImage,

    #[error("An analysis is already running")]
    AlreadyRunning,
}

/// Progress of the one analysis a session can have
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AnalysisState {
    #[default]
    Idle,
    Staging {
        step: usize,
        label: &'static str,
    },
    Completed(DiagnosticResult),
    Failed(String),
}

/// One step of a run, as emitted by [`run`]
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisEvent {
    Stage { step: usize, label: &'static str },
    Completed(DiagnosticResult),
    Failed(String),
}

impl AnalysisState {
    /// Enter staging for the active image
    ///
    /// Refuses to start while a run is staging, and when no image is
    /// selected (the state is left untouched in both cases). Any previous
    /// result is discarded.
    pub fn begin(&mut self, image: Option<&SelectedImage>) -> Result<ImageBlob, AnalysisError> {
        if self.is_staging() {
            return Err(AnalysisError::AlreadyRunning);
        }
        let image = image.ok_or(AnalysisError::NoImage)?;
        *self = AnalysisState::Staging {
            step: 0,
            label: STAGE_LABELS[0],
        };
        Ok(image.blob.clone())
    }

    /// Fold an event from the running pipeline into the state
    ///
    /// Returns `true` when the event ended staging. Events arriving while no
    /// run is staging are ignored.
    pub fn apply(&mut self, event: AnalysisEvent) -> bool {
        let AnalysisState::Staging { step: current, .. } = *self else {
            debug!("Ignoring analysis event outside a run: {:?}", event);
            return false;
        };

        match event {
            AnalysisEvent::Stage { step, label } => {
                if step >= current {
                    *self = AnalysisState::Staging { step, label };
                }
                false
            }
            AnalysisEvent::Completed(result) => {
                *self = AnalysisState::Completed(result);
                true
            }
            AnalysisEvent::Failed(reason) => {
                *self = AnalysisState::Failed(reason);
                true
            }
        }
    }

    /// Go back to idle once a run has finished
    pub fn reset(&mut self) {
        if !self.is_staging() {
            *self = AnalysisState::Idle;
        }
    }

    pub fn is_staging(&self) -> bool {
        matches!(self, AnalysisState::Staging { .. })
    }

    /// Label of the staging indicator, if it is shown
    pub fn staging_label(&self) -> Option<&'static str> {
        match self {
            AnalysisState::Staging { label, .. } => Some(*label),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&DiagnosticResult> {
        match self {
            AnalysisState::Completed(result) => Some(result),
            _ => None,
        }
    }
}

/// Where a run is between two events
enum Step {
    Stage(usize),
    Submit,
    Done,
}

/// Play the staging labels, then submit `image` to the inference service
///
/// Each label is held for `dwell` before the next one (or the submission)
/// follows. The stream always ends with exactly one `Completed` or `Failed`.
pub fn run<S: InferenceService>(
    service: Arc<S>,
    image: ImageBlob,
    dwell: Duration,
) -> impl Stream<Item = AnalysisEvent> + Send + 'static {
    stream::unfold(Step::Stage(0), move |step| {
        let service = Arc::clone(&service);
        let image = image.clone();
        async move {
            match step {
                Step::Stage(index) => {
                    if index > 0 {
                        tokio::time::sleep(dwell).await;
                    }
                    let label = STAGE_LABELS[index];
                    debug!("Stage {}: {}", index, label);
                    let next = if index + 1 < STAGE_LABELS.len() {
                        Step::Stage(index + 1)
                    } else {
                        Step::Submit
                    };
                    Some((AnalysisEvent::Stage { step: index, label }, next))
                }
                Step::Submit => {
                    tokio::time::sleep(dwell).await;
                    let event = match service.predict(&image).await {
                        Ok(result) => {
                            info!(
                                "🩺 {} classified as {} ({:.1}%)",
                                image.name,
                                result.predicted_class,
                                result.confidence * 100.0
                            );
                            AnalysisEvent::Completed(result)
                        }
                        Err(err) => {
                            warn!("Prediction for {} failed: {}", image.name, err);
                            AnalysisEvent::Failed(err.to_string())
                        }
                    };
                    Some((event, Step::Done))
                }
                Step::Done => None,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::fake::{FakeService, PredictScript};
    use crate::state::selection::ImageSlot;
    use iced::futures::StreamExt;
    use tokio::time::Instant;

    const DWELL: Duration = Duration::from_secs(1);

    fn slot_with_image() -> ImageSlot {
        let mut slot = ImageSlot::new();
        slot.select(ImageBlob::new("normal_1.jpg", Some("image/jpeg".to_string()), vec![1, 2, 3]));
        slot
    }

    /// Drive a full run, returning each event with its offset from the start
    async fn drive(
        service: Arc<FakeService>,
        state: &mut AnalysisState,
        slot: &ImageSlot,
    ) -> (Vec<(Duration, AnalysisEvent)>, usize) {
        let start = Instant::now();
        let image = state.begin(slot.active()).unwrap();
        let mut events = Vec::new();
        let mut cleared = 0;

        let mut pipeline = std::pin::pin!(run(service, image, DWELL));
        while let Some(event) = pipeline.next().await {
            events.push((start.elapsed(), event.clone()));
            if state.apply(event) {
                cleared += 1;
            }
        }
        (events, cleared)
    }

    #[test]
    fn test_begin_without_image_stays_idle() {
        let mut state = AnalysisState::Idle;
        assert_eq!(state.begin(None), Err(AnalysisError::NoImage));
        assert_eq!(state, AnalysisState::Idle);
    }

    #[test]
    fn test_begin_refuses_reentry() {
        let slot = slot_with_image();
        let mut state = AnalysisState::Idle;
        state.begin(slot.active()).unwrap();

        assert_eq!(state.begin(slot.active()), Err(AnalysisError::AlreadyRunning));
        assert_eq!(state.staging_label(), Some(STAGE_LABELS[0]));
    }

    #[test]
    fn test_begin_discards_previous_result() {
        let slot = slot_with_image();
        let mut state = AnalysisState::Completed(DiagnosticResult {
            predicted_class: "Normal".to_string(),
            confidence: 0.5,
        });

        state.begin(slot.active()).unwrap();
        assert!(state.result().is_none());
        assert!(state.is_staging());
    }

    #[test]
    fn test_events_outside_a_run_are_ignored() {
        let mut state = AnalysisState::Idle;
        assert!(!state.apply(AnalysisEvent::Failed("late".to_string())));
        assert_eq!(state, AnalysisState::Idle);
    }

    #[test]
    fn test_reset_only_after_finish() {
        let slot = slot_with_image();
        let mut state = AnalysisState::Idle;
        state.begin(slot.active()).unwrap();
        state.reset();
        assert!(state.is_staging());

        state.apply(AnalysisEvent::Failed("boom".to_string()));
        state.reset();
        assert_eq!(state, AnalysisState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_run_visits_every_stage_before_submitting() {
        let service = Arc::new(FakeService::answering("Normal", 0.97));
        let slot = slot_with_image();
        let mut state = AnalysisState::Idle;

        let (events, cleared) = drive(Arc::clone(&service), &mut state, &slot).await;

        let labels: Vec<_> = events
            .iter()
            .filter_map(|(_, event)| match event {
                AnalysisEvent::Stage { label, .. } => Some(*label),
                _ => None,
            })
            .collect();
        assert_eq!(labels, STAGE_LABELS.to_vec());

        let offsets: Vec<_> = events.iter().map(|(offset, _)| offset.as_secs()).collect();
        assert_eq!(offsets, vec![0, 1, 2, 3]);

        // The submission starts only after the last dwell
        let calls = service.predict_calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);

        assert_eq!(cleared, 1);
        assert_eq!(
            state.result(),
            Some(&DiagnosticResult {
                predicted_class: "Normal".to_string(),
                confidence: 0.97,
            })
        );
        assert!(state.staging_label().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_run_still_clears_staging_once() {
        let service = Arc::new(FakeService::with_script(PredictScript::Status(500)));
        let slot = slot_with_image();
        let mut state = AnalysisState::Idle;

        let (events, cleared) = drive(Arc::clone(&service), &mut state, &slot).await;

        assert_eq!(events.len(), 4);
        assert!(matches!(events[3].1, AnalysisEvent::Failed(ref reason) if reason.contains("500")));
        assert_eq!(cleared, 1);
        assert!(state.result().is_none());
        assert!(state.staging_label().is_none());
        assert!(matches!(state, AnalysisState::Failed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_range_confidence_fails_the_run() {
        let service = Arc::new(FakeService::with_script(PredictScript::BadConfidence(3.0)));
        let slot = slot_with_image();
        let mut state = AnalysisState::Idle;

        drive(service, &mut state, &slot).await;
        assert!(matches!(state, AnalysisState::Failed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_predict_not_called_during_staging() {
        let service = Arc::new(FakeService::answering("Normal", 0.97));
        let slot = slot_with_image();
        let mut state = AnalysisState::Idle;
        let image = state.begin(slot.active()).unwrap();

        let mut pipeline = std::pin::pin!(run(Arc::clone(&service), image, DWELL));
        for _ in 0..STAGE_LABELS.len() {
            pipeline.next().await.unwrap();
            assert_eq!(service.predict_count(), 0);
        }
        assert!(matches!(pipeline.next().await, Some(AnalysisEvent::Completed(_))));
        assert_eq!(service.predict_count(), 1);
        assert!(pipeline.next().await.is_none());
    }
}
