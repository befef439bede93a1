use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::{ConvertBackend, JobStatus, VideoMetadata};
use crate::error::ConvertError;
use crate::formats::{FormatSelection, Mode};
use crate::validator;

/// Poll cadence for job status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Position in the job lifecycle state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Validating,
    FetchingMetadata,
    AwaitingJobCreation,
    Polling,
    Completed,
    Failed,
}

/// Progress of the live job.
#[derive(Debug, Clone)]
pub struct JobProgress {
    pub id: String,
    /// 0-100
    pub percent: u8,
    pub status_message: String,
    pub error_message: Option<String>,
}

/// Read-only copy of the controller's current state.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub phase: Phase,
    pub metadata: Option<VideoMetadata>,
    pub job: Option<JobProgress>,
}

/// Events emitted to the view layer on every transition.
///
/// Callbacks fire while the controller holds its state lock, so they must
/// return promptly and must not call back into the controller.
pub trait ViewEvents: Send + Sync {
    fn on_preview(&self, _metadata: &VideoMetadata) {}
    fn on_progress(&self, _message: &str, _percent: u8) {}
    fn on_completed(&self) {}
    fn on_failed(&self, _message: &str) {}
    fn on_cleared(&self) {}
}

/// State shared with the polling task.
///
/// `generation` is bumped under the write lock whenever a poll is cancelled;
/// the polling task re-checks it under the same lock before every state
/// write or event emit, so an in-flight response from a cancelled poll can
/// never reach the subscriber after a new job starts.
struct State {
    generation: u64,
    phase: Phase,
    metadata: Option<VideoMetadata>,
    job: Option<JobProgress>,
    subscriber: Option<Arc<dyn ViewEvents>>,
}

struct Shared {
    state: RwLock<State>,
}

impl Shared {
    /// Advance the phase if the attempt is still current.
    async fn set_phase(&self, generation: u64, phase: Phase) {
        let mut state = self.state.write().await;
        if state.generation == generation {
            state.phase = phase;
        }
    }

    async fn preview(&self, generation: u64, metadata: VideoMetadata) {
        let mut state = self.state.write().await;
        if state.generation != generation {
            return;
        }
        let subscriber = state.subscriber.clone();
        if let Some(subscriber) = subscriber {
            subscriber.on_preview(&metadata);
        }
        state.metadata = Some(metadata);
    }

    /// Record and emit a progress update. Returns false if the attempt is
    /// stale and the polling task should stop.
    async fn progress(&self, generation: u64, message: &str, percent: u8) -> bool {
        let mut state = self.state.write().await;
        if state.generation != generation {
            return false;
        }
        if let Some(job) = state.job.as_mut() {
            job.percent = percent;
            job.status_message = message.to_string();
        }
        if let Some(subscriber) = state.subscriber.clone() {
            subscriber.on_progress(message, percent);
        }
        true
    }

    async fn complete(&self, generation: u64) {
        let mut state = self.state.write().await;
        if state.generation != generation {
            return;
        }
        state.phase = Phase::Completed;
        if let Some(subscriber) = state.subscriber.clone() {
            subscriber.on_completed();
        }
    }

    async fn fail(&self, generation: u64, error: &ConvertError) {
        let mut state = self.state.write().await;
        if state.generation != generation {
            return;
        }
        state.phase = Phase::Failed;
        let message = error.message().to_string();
        if let Some(job) = state.job.as_mut() {
            job.error_message = Some(message.clone());
        }
        if let Some(subscriber) = state.subscriber.clone() {
            subscriber.on_failed(&message);
        }
    }
}

/// Drives the conversion lifecycle: URL validation, metadata fetch, job
/// creation, and progress polling, with explicit reset semantics.
///
/// Owns the single mutable piece of client state. At most one job is live
/// at a time; submitting again or resetting cancels any active poll.
pub struct JobController {
    backend: Arc<dyn ConvertBackend>,
    poll_interval: Duration,
    selection: FormatSelection,
    shared: Arc<Shared>,
    poll_task: Option<JoinHandle<()>>,
}

impl JobController {
    /// Controller polling at the default 1000 ms cadence.
    pub fn new(backend: Arc<dyn ConvertBackend>) -> Self {
        Self::with_poll_interval(backend, DEFAULT_POLL_INTERVAL)
    }

    /// Controller with an explicit poll cadence.
    pub fn with_poll_interval(backend: Arc<dyn ConvertBackend>, poll_interval: Duration) -> Self {
        Self {
            backend,
            poll_interval,
            selection: FormatSelection::default(),
            shared: Arc::new(Shared {
                state: RwLock::new(State {
                    generation: 0,
                    phase: Phase::Idle,
                    metadata: None,
                    job: None,
                    subscriber: None,
                }),
            }),
            poll_task: None,
        }
    }

    /// Register the view-layer subscriber, replacing any previous one.
    pub async fn subscribe(&mut self, subscriber: Arc<dyn ViewEvents>) {
        self.shared.state.write().await.subscriber = Some(subscriber);
    }

    pub async fn snapshot(&self) -> Snapshot {
        let state = self.shared.state.read().await;
        Snapshot {
            phase: state.phase,
            metadata: state.metadata.clone(),
            job: state.job.clone(),
        }
    }

    pub fn selection(&self) -> &FormatSelection {
        &self.selection
    }

    /// Switch between audio and video presets; resets the selected format
    /// to the new mode's default.
    pub fn set_mode(&mut self, mode: Mode) {
        self.selection.set_mode(mode);
    }

    /// Select a format preset by id. Ids outside the current mode's catalog
    /// are ignored; the return value reports acceptance.
    pub fn select_format(&mut self, id: &str) -> bool {
        self.selection.select(id)
    }

    /// Start a conversion attempt for the given URL with the currently
    /// selected format.
    ///
    /// Any active poll is cancelled first. Lifecycle failures transition to
    /// `Failed`, fire `on_failed`, and are also returned as `Err` for
    /// programmatic callers.
    pub async fn submit(&mut self, url: &str) -> Result<(), ConvertError> {
        let generation = self.cancel_poll().await;
        let url = url.trim().to_string();

        {
            let mut state = self.shared.state.write().await;
            state.phase = Phase::Validating;
            state.metadata = None;
            state.job = None;
        }

        if url.is_empty() {
            let error = ConvertError::Validation("Please enter a YouTube URL".to_string());
            return self.fail_with(generation, error).await;
        }
        if !validator::is_acceptable_source(&url) {
            let error = ConvertError::Validation(
                "Invalid URL. Please enter a valid YouTube or Instagram URL.".to_string(),
            );
            return self.fail_with(generation, error).await;
        }
        if let Some(id) = validator::extract_identifier(&url) {
            debug!("Submitting source with identifier {}", id);
        }

        self.shared.set_phase(generation, Phase::FetchingMetadata).await;
        let metadata = match self.backend.video_info(&url).await {
            Ok(metadata) => metadata,
            Err(error) => return self.fail_with(generation, error).await,
        };
        info!(
            "🎬 Metadata received: {} ({})",
            metadata.title,
            metadata.formatted_duration()
        );
        self.shared.preview(generation, metadata).await;

        self.shared
            .set_phase(generation, Phase::AwaitingJobCreation)
            .await;
        let format_id = self.selection.selected_id().to_string();
        let job_id = match self.backend.create_job(&url, &format_id).await {
            Ok(job_id) => job_id,
            Err(error) => return self.fail_with(generation, error).await,
        };
        info!("🚀 Conversion job started: {} ({})", job_id, format_id);

        {
            let mut state = self.shared.state.write().await;
            state.phase = Phase::Polling;
            state.job = Some(JobProgress {
                id: job_id.clone(),
                percent: 0,
                status_message: "Starting conversion...".to_string(),
                error_message: None,
            });
            if let Some(subscriber) = state.subscriber.clone() {
                subscriber.on_progress("Starting conversion...", 0);
            }
        }

        self.spawn_poll(job_id, generation);
        Ok(())
    }

    /// Retrieve the finished file for the completed job.
    ///
    /// Returns `Ok(None)` when no completed job exists. Does not change
    /// the controller's phase.
    pub async fn request_download(&self) -> Result<Option<Vec<u8>>, ConvertError> {
        let job_id = {
            let state = self.shared.state.read().await;
            match (state.phase, state.job.as_ref()) {
                (Phase::Completed, Some(job)) => job.id.clone(),
                _ => return Ok(None),
            }
        };

        let bytes = self.backend.download(&job_id).await?;
        info!("💾 Downloaded {} bytes for job {}", bytes.len(), job_id);
        Ok(Some(bytes))
    }

    /// Cancel any active poll, clear stored job and metadata, and return
    /// to `Idle`.
    pub async fn reset(&mut self) {
        self.cancel_poll().await;
        {
            let mut state = self.shared.state.write().await;
            state.phase = Phase::Idle;
            state.metadata = None;
            state.job = None;
            if let Some(subscriber) = state.subscriber.clone() {
                subscriber.on_cleared();
            }
        }
        info!("🧹 Controller reset to idle");
    }

    /// Abort the polling task and invalidate its generation, so a response
    /// already in flight discards itself instead of touching state.
    async fn cancel_poll(&mut self) -> u64 {
        if let Some(task) = self.poll_task.take() {
            task.abort();
            debug!("Cancelled active polling task");
        }
        let mut state = self.shared.state.write().await;
        state.generation += 1;
        state.generation
    }

    async fn fail_with(
        &self,
        generation: u64,
        error: ConvertError,
    ) -> Result<(), ConvertError> {
        warn!("❌ Conversion attempt failed: {}", error.message());
        self.shared.fail(generation, &error).await;
        Err(error)
    }

    /// Start the recurring status check for a job.
    ///
    /// The task runs sleep, request, handle strictly in sequence, so checks
    /// never overlap; a slow response delays the next tick rather than
    /// racing it.
    fn spawn_poll(&mut self, job_id: String, generation: u64) {
        let backend = Arc::clone(&self.backend);
        let shared = Arc::clone(&self.shared);
        let interval = self.poll_interval;

        self.poll_task = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;

                match backend.job_status(&job_id).await {
                    Err(error) => {
                        shared.fail(generation, &error).await;
                        return;
                    }
                    Ok(report) => match report.status {
                        JobStatus::Completed => {
                            shared.complete(generation).await;
                            return;
                        }
                        JobStatus::Failed => {
                            let message = report.error.unwrap_or_else(|| {
                                "Conversion failed. Please try again.".to_string()
                            });
                            shared
                                .fail(generation, &ConvertError::JobFailed(message))
                                .await;
                            return;
                        }
                        JobStatus::Pending | JobStatus::Processing => {
                            let message = report
                                .message
                                .unwrap_or_else(|| "Processing...".to_string());
                            let percent = report.progress.unwrap_or(0).min(100);
                            if !shared.progress(generation, &message, percent).await {
                                return;
                            }
                        }
                    },
                }
            }
        }));
    }
}

impl Drop for JobController {
    fn drop(&mut self) {
        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::JobStatusReport;
    use async_trait::async_trait;

    struct UnusedBackend;

    #[async_trait]
    impl ConvertBackend for UnusedBackend {
        async fn video_info(&self, _url: &str) -> Result<VideoMetadata, ConvertError> {
            unreachable!("no network expected")
        }

        async fn create_job(&self, _url: &str, _format: &str) -> Result<String, ConvertError> {
            unreachable!("no network expected")
        }

        async fn job_status(&self, _job_id: &str) -> Result<JobStatusReport, ConvertError> {
            unreachable!("no network expected")
        }

        async fn download(&self, _job_id: &str) -> Result<Vec<u8>, ConvertError> {
            unreachable!("no network expected")
        }
    }

    #[test]
    fn new_controller_starts_idle_with_audio_default() {
        tokio_test::block_on(async {
            let controller = JobController::new(Arc::new(UnusedBackend));
            let snapshot = controller.snapshot().await;
            assert_eq!(snapshot.phase, Phase::Idle);
            assert!(snapshot.metadata.is_none());
            assert!(snapshot.job.is_none());
            assert_eq!(controller.selection().mode(), Mode::Audio);
            assert_eq!(controller.selection().selected_id(), "mp3-128");
        });
    }
}
