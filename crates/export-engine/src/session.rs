//! Export orchestration.
//!
//! [`ExportController`] owns the encoder backend and runs a whole
//! export: open an encoder session, spawn the animation script, drive
//! the sampling loop, finalize the artifact, and write it out. At most
//! one export runs at a time per controller.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chatreel_common::clock::RecordingClock;
use chatreel_common::config::ExportDefaults;
use chatreel_common::error::{ChatreelError, ChatreelResult};
use chatreel_frame_compose::canvas::OutputCanvas;
use chatreel_frame_compose::layout::validate_padding;
use chatreel_script_model::format::{ContainerFormat, ExportFormat};

use crate::ports::{EncodedArtifact, EncoderSession, EncoderSettings, FrameEncoder, RasterSource};
use crate::sampler::{run_sampler, SamplerConfig};

/// A boxed future that animates the surface for the duration of a clip.
pub type AnimationScript = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Where an export currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportState {
    Idle,
    Capturing,
    Finalizing,
    Done,
    Error,
}

/// Lifecycle notices emitted while an export runs.
///
/// Every run emits `Started` first and exactly one of `Completed` or
/// `Failed` last.
#[derive(Debug, Clone)]
pub enum ExportNotice {
    Started { format: String },
    Progress { frames: u64 },
    Completed { path: PathBuf, duration_secs: f64 },
    Failed { message: String },
}

/// Callback receiving lifecycle notices.
pub type NoticeCallback = Box<dyn Fn(&ExportNotice) + Send + Sync>;

/// Tunables for one export run.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Padding around the conversation, as a fraction of each output
    /// dimension per side. Must be below 0.5.
    pub padding_fraction: f64,
    /// Cadence of the capture loop.
    pub sample_period: Duration,
    /// Target video bitrate in kilobits per second.
    pub video_bitrate_kbps: u32,
    /// Directory the artifact is written into.
    pub output_dir: PathBuf,
    /// Artifact file name prefix.
    pub file_prefix: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        let defaults = ExportDefaults::default();
        Self {
            padding_fraction: defaults.padding_fraction,
            sample_period: Duration::from_millis(defaults.sample_period_ms),
            video_bitrate_kbps: defaults.video_bitrate_kbps,
            output_dir: PathBuf::from("."),
            file_prefix: "chatreel".to_string(),
        }
    }
}

/// What a finished export produced.
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub frames: u64,
    pub duration_secs: f64,
    pub bytes: u64,
}

/// Per-run recording state.
struct RecordingSession {
    state: ExportState,
    canvas: OutputCanvas,
    encoder: Box<dyn EncoderSession>,
}

impl RecordingSession {
    fn open(
        encoder: &dyn FrameEncoder,
        format: &ExportFormat,
        settings: &EncoderSettings,
    ) -> ChatreelResult<Self> {
        let session = encoder.open(format, settings)?;
        tracing::info!(
            codec = %session.codec(),
            backend = encoder.name(),
            "Encoder session opened"
        );
        Ok(Self {
            state: ExportState::Idle,
            canvas: OutputCanvas::new(format.width, format.height),
            encoder: session,
        })
    }

    fn transition(&mut self, next: ExportState) {
        tracing::debug!(from = ?self.state, to = ?next, "Export state change");
        self.state = next;
    }
}

/// Clears the in-flight flag however the export ends.
struct ExportingGuard(Arc<AtomicBool>);

impl Drop for ExportingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct ExportController {
    options: ExportOptions,
    encoder: Box<dyn FrameEncoder>,
    exporting: Arc<AtomicBool>,
    notices: Option<NoticeCallback>,
}

impl ExportController {
    pub fn new(encoder: Box<dyn FrameEncoder>, options: ExportOptions) -> Self {
        Self {
            options,
            encoder,
            exporting: Arc::new(AtomicBool::new(false)),
            notices: None,
        }
    }

    /// Attach a lifecycle notice callback.
    pub fn with_notices(mut self, notices: NoticeCallback) -> Self {
        self.notices = Some(notices);
        self
    }

    /// Whether an export is currently running.
    pub fn is_exporting(&self) -> bool {
        self.exporting.load(Ordering::SeqCst)
    }

    /// Run one export to completion.
    ///
    /// Rejects with [`ChatreelError::ExportInProgress`] while another
    /// export on this controller is still running; the in-flight run is
    /// left untouched.
    pub async fn start_export(
        &self,
        source: &mut dyn RasterSource,
        script: AnimationScript,
        format: &ExportFormat,
    ) -> ChatreelResult<ExportOutcome> {
        if self
            .exporting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!("Rejecting export start: one is already running");
            return Err(ChatreelError::ExportInProgress);
        }
        let _guard = ExportingGuard(self.exporting.clone());

        let result = self.run_export(source, script, format).await;
        match &result {
            Ok(outcome) => self.notify(&ExportNotice::Completed {
                path: outcome.path.clone(),
                duration_secs: outcome.duration_secs,
            }),
            Err(e) => self.notify(&ExportNotice::Failed {
                message: e.to_string(),
            }),
        }
        result
    }

    async fn run_export(
        &self,
        source: &mut dyn RasterSource,
        script: AnimationScript,
        format: &ExportFormat,
    ) -> ChatreelResult<ExportOutcome> {
        tracing::info!(
            format = %format.name,
            width = format.width,
            height = format.height,
            container = %format.container,
            "Starting export"
        );
        self.notify(&ExportNotice::Started {
            format: format.name.clone(),
        });

        validate_padding(self.options.padding_fraction)?;

        let settings = EncoderSettings {
            bitrate_bps: self.options.video_bitrate_kbps.saturating_mul(1000),
            fps_hint: fps_hint_from_period(self.options.sample_period),
        };
        let mut session = RecordingSession::open(self.encoder.as_ref(), format, &settings)?;

        match self.drive(&mut session, source, script).await {
            Ok(outcome) => {
                session.transition(ExportState::Done);
                Ok(outcome)
            }
            Err(e) => {
                session.transition(ExportState::Error);
                // Stop and discard whatever the encoder produced; a
                // partial clip is never delivered.
                if let Err(stop_err) = session.encoder.stop().await {
                    tracing::warn!(error = %stop_err, "Encoder stop during teardown failed");
                }
                Err(e)
            }
        }
    }

    async fn drive(
        &self,
        session: &mut RecordingSession,
        source: &mut dyn RasterSource,
        script: AnimationScript,
    ) -> ChatreelResult<ExportOutcome> {
        session.encoder.start()?;
        let clock = RecordingClock::start();
        tracing::debug!(epoch_wall = %clock.epoch_wall(), "Recording clock started");
        session.transition(ExportState::Capturing);

        let script_task = tokio::spawn(script);
        let sampler_config = SamplerConfig {
            period: self.options.sample_period,
            padding_fraction: self.options.padding_fraction,
        };
        let frames = run_sampler(
            source,
            session.encoder.as_mut(),
            &mut session.canvas,
            &clock,
            &sampler_config,
            script_task,
            |frames| self.notify(&ExportNotice::Progress { frames }),
        )
        .await?;

        session.transition(ExportState::Finalizing);
        let artifact = session.encoder.stop().await?;
        let duration_secs = clock.elapsed_secs();

        let (path, bytes) = self.write_artifact(artifact)?;
        tracing::info!(
            frames,
            bytes,
            duration_secs,
            path = %path.display(),
            "Export complete"
        );

        Ok(ExportOutcome {
            path,
            frames,
            duration_secs,
            bytes,
        })
    }

    fn write_artifact(&self, artifact: EncodedArtifact) -> ChatreelResult<(PathBuf, u64)> {
        std::fs::create_dir_all(&self.options.output_dir)?;

        let file_name = artifact_file_name(
            &self.options.file_prefix,
            chrono::Utc::now().timestamp_millis(),
            artifact.container(),
        );
        let path = self.options.output_dir.join(file_name);

        let bytes = artifact.into_bytes();
        let len = bytes.len() as u64;
        std::fs::write(&path, bytes)?;

        Ok((path, len))
    }

    fn notify(&self, notice: &ExportNotice) {
        if let Some(callback) = &self.notices {
            callback(notice);
        }
    }
}

/// `<prefix>-<unix millis>.<extension>`; the wall clock keeps names
/// unique across runs.
fn artifact_file_name(prefix: &str, timestamp_millis: i64, container: ContainerFormat) -> String {
    format!(
        "{prefix}-{timestamp_millis}.{}",
        container.file_extension()
    )
}

fn fps_hint_from_period(period: Duration) -> u32 {
    let millis = period.as_millis().max(1) as u64;
    (1000 / millis).max(1) as u32
}
