//! End-to-end export flows driven with in-memory fakes and paused time.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use image::RgbaImage;

use chatreel_common::error::{ChatreelError, ChatreelResult};
use chatreel_export_engine::{
    AnimationScript, Codec, EncodedArtifact, EncoderSession, EncoderSettings, ExportController,
    ExportNotice, ExportOptions, FrameEncoder, RasterSource,
};
use chatreel_frame_compose::canvas::OutputCanvas;
use chatreel_script_model::format::{ContainerFormat, ExportFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    CaptureStart,
    CaptureEnd,
    EncoderStart,
    Frame,
    EncoderStop,
    ScriptDone,
}

#[derive(Clone, Default)]
struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    fn count(&self, event: Event) -> usize {
        self.events().iter().filter(|e| **e == event).count()
    }
}

struct FakeSource {
    log: EventLog,
    capture_delay: Duration,
    size: (u32, u32),
    fail: bool,
}

impl FakeSource {
    fn new(log: EventLog) -> Self {
        Self {
            log,
            capture_delay: Duration::ZERO,
            size: (500, 1000),
            fail: false,
        }
    }
}

#[async_trait]
impl RasterSource for FakeSource {
    async fn capture(&mut self) -> ChatreelResult<RgbaImage> {
        self.log.push(Event::CaptureStart);
        if self.fail {
            return Err(ChatreelError::capture("surface detached"));
        }
        tokio::time::sleep(self.capture_delay).await;
        self.log.push(Event::CaptureEnd);
        Ok(RgbaImage::new(self.size.0, self.size.1))
    }
}

struct FakeEncoder {
    log: EventLog,
}

impl FrameEncoder for FakeEncoder {
    fn open(
        &self,
        format: &ExportFormat,
        _settings: &EncoderSettings,
    ) -> ChatreelResult<Box<dyn EncoderSession>> {
        if !format.is_valid() {
            return Err(ChatreelError::encoder_unavailable(format!(
                "Cannot encode {}x{} output",
                format.width, format.height
            )));
        }
        Ok(Box::new(FakeSession {
            log: self.log.clone(),
            container: format.container,
            chunks: Vec::new(),
            started: false,
        }))
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "fake"
    }
}

struct FakeSession {
    log: EventLog,
    container: ContainerFormat,
    chunks: Vec<Vec<u8>>,
    started: bool,
}

#[async_trait]
impl EncoderSession for FakeSession {
    fn codec(&self) -> Codec {
        Codec::Vp9
    }

    fn start(&mut self) -> ChatreelResult<()> {
        self.log.push(Event::EncoderStart);
        self.started = true;
        Ok(())
    }

    fn write_frame(&mut self, _canvas: &OutputCanvas, _pts_ns: u64) -> ChatreelResult<()> {
        self.log.push(Event::Frame);
        // one byte per frame, valued by arrival order, so the artifact
        // bytes prove ordered concatenation
        self.chunks.push(vec![self.chunks.len() as u8]);
        Ok(())
    }

    async fn stop(&mut self) -> ChatreelResult<EncodedArtifact> {
        self.log.push(Event::EncoderStop);
        let mut artifact = EncodedArtifact::new(self.container);
        if !self.started {
            return Ok(artifact);
        }
        self.started = false;
        for chunk in self.chunks.drain(..) {
            artifact.push_chunk(chunk);
        }
        Ok(artifact)
    }
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("chatreel_test_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn options_for(dir: &std::path::Path, prefix: &str) -> ExportOptions {
    ExportOptions {
        output_dir: dir.to_path_buf(),
        file_prefix: prefix.to_string(),
        ..ExportOptions::default()
    }
}

fn sleep_script(millis: u64) -> AnimationScript {
    Box::pin(async move {
        tokio::time::sleep(Duration::from_millis(millis)).await;
    })
}

fn notice_tag(notice: &ExportNotice) -> &'static str {
    match notice {
        ExportNotice::Started { .. } => "started",
        ExportNotice::Progress { .. } => "progress",
        ExportNotice::Completed { .. } => "completed",
        ExportNotice::Failed { .. } => "failed",
    }
}

fn assert_captures_never_overlap(events: &[Event]) {
    let mut in_capture = false;
    for event in events {
        match event {
            Event::CaptureStart => {
                assert!(!in_capture, "a capture started while one was still running");
                in_capture = true;
            }
            Event::CaptureEnd => {
                assert!(in_capture);
                in_capture = false;
            }
            _ => {}
        }
    }
    assert!(!in_capture, "a capture never finished");
}

#[tokio::test(start_paused = true)]
async fn test_export_writes_ordered_artifact_and_final_frame() {
    let dir = temp_dir("export_artifact");
    let log = EventLog::default();
    let controller = ExportController::new(
        Box::new(FakeEncoder { log: log.clone() }),
        options_for(&dir, "clip"),
    );

    let script_log = log.clone();
    let script: AnimationScript = Box::pin(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        script_log.push(Event::ScriptDone);
    });

    let mut source = FakeSource::new(log.clone());
    let format = ExportFormat::preset("instagram-story").unwrap();
    let outcome = controller
        .start_export(&mut source, script, &format)
        .await
        .unwrap();

    // ticks at 0/33/66/99 ms plus the final settled frame
    assert_eq!(outcome.frames, 5);
    assert_eq!(outcome.bytes, 5);
    assert!(!controller.is_exporting());

    let name = outcome.path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("clip-"), "unexpected artifact name {name}");
    assert!(name.ends_with(".webm"));
    assert_eq!(std::fs::read(&outcome.path).unwrap(), vec![0, 1, 2, 3, 4]);
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 1);

    let events = log.events();
    assert_eq!(events.first(), Some(&Event::EncoderStart));
    assert_eq!(events.last(), Some(&Event::EncoderStop));
    assert_eq!(log.count(Event::EncoderStop), 1);
    assert_eq!(log.count(Event::Frame), 5);

    // the last frame lands after the script has resolved
    let script_done = events.iter().position(|e| *e == Event::ScriptDone).unwrap();
    let last_frame = events.iter().rposition(|e| *e == Event::Frame).unwrap();
    assert!(script_done < last_frame);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test(start_paused = true)]
async fn test_slow_captures_delay_ticks_instead_of_overlapping() {
    let dir = temp_dir("slow_capture");
    let log = EventLog::default();
    let controller = ExportController::new(
        Box::new(FakeEncoder { log: log.clone() }),
        options_for(&dir, "clip"),
    );

    // each capture takes longer than the 33 ms period
    let mut source = FakeSource::new(log.clone());
    source.capture_delay = Duration::from_millis(50);

    let format = ExportFormat::preset("instagram-story").unwrap();
    let outcome = controller
        .start_export(&mut source, sleep_script(120), &format)
        .await
        .unwrap();

    // back-to-back 50 ms captures cover the 120 ms script in 3 ticks,
    // and at least the final frame follows
    assert!(outcome.frames >= 4, "expected >= 4 frames, got {}", outcome.frames);
    assert_captures_never_overlap(&log.events());
    assert_eq!(log.count(Event::EncoderStop), 1);
    assert_eq!(log.events().last(), Some(&Event::EncoderStop));

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test(start_paused = true)]
async fn test_second_export_rejected_while_first_runs() {
    let dir = temp_dir("single_flight");
    let log = EventLog::default();
    let controller = Arc::new(ExportController::new(
        Box::new(FakeEncoder { log: log.clone() }),
        options_for(&dir, "first"),
    ));

    let background = {
        let controller = controller.clone();
        let mut source = FakeSource::new(log.clone());
        tokio::spawn(async move {
            let format = ExportFormat::preset("instagram-story").unwrap();
            controller
                .start_export(&mut source, sleep_script(300), &format)
                .await
        })
    };

    // let the first export reach its sampling loop
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(controller.is_exporting());

    let mut source = FakeSource::new(EventLog::default());
    let format = ExportFormat::preset("instagram-story").unwrap();
    let err = controller
        .start_export(&mut source, sleep_script(10), &format)
        .await
        .unwrap_err();
    assert!(matches!(err, ChatreelError::ExportInProgress));

    // the in-flight export is untouched by the rejection
    let outcome = background.await.unwrap().unwrap();
    assert_eq!(outcome.frames, 11);
    assert!(!controller.is_exporting());
    assert_eq!(log.count(Event::EncoderStart), 1);
    assert_eq!(log.count(Event::EncoderStop), 1);
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 1);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test(start_paused = true)]
async fn test_capture_failure_tears_down_and_discards_output() {
    let dir = temp_dir("capture_failure");
    let log = EventLog::default();
    let notices = Arc::new(Mutex::new(Vec::new()));
    let notice_sink = notices.clone();
    let controller = ExportController::new(
        Box::new(FakeEncoder { log: log.clone() }),
        options_for(&dir, "clip"),
    )
    .with_notices(Box::new(move |notice| {
        notice_sink.lock().unwrap().push(notice_tag(notice));
    }));

    let mut source = FakeSource::new(log.clone());
    source.fail = true;

    let format = ExportFormat::preset("instagram-story").unwrap();
    let err = controller
        .start_export(&mut source, sleep_script(500), &format)
        .await
        .unwrap_err();
    assert!(matches!(err, ChatreelError::Capture { .. }));

    // encoder stopped, nothing encoded, nothing written
    assert_eq!(log.count(Event::Frame), 0);
    assert_eq!(log.count(Event::EncoderStop), 1);
    assert_eq!(log.events().last(), Some(&Event::EncoderStop));
    assert!(!dir.exists());
    assert!(!controller.is_exporting());

    assert_eq!(*notices.lock().unwrap(), vec!["started", "failed"]);
}

#[tokio::test(start_paused = true)]
async fn test_notices_arrive_in_lifecycle_order() {
    let dir = temp_dir("notice_order");
    let log = EventLog::default();
    let notices = Arc::new(Mutex::new(Vec::new()));
    let notice_sink = notices.clone();
    let controller = ExportController::new(
        Box::new(FakeEncoder { log: log.clone() }),
        options_for(&dir, "clip"),
    )
    .with_notices(Box::new(move |notice| {
        notice_sink.lock().unwrap().push(notice_tag(notice));
    }));

    let mut source = FakeSource::new(log.clone());
    let format = ExportFormat::preset("instagram-story").unwrap();

    // long enough for the 30-frame progress report to fire
    controller
        .start_export(&mut source, sleep_script(1200), &format)
        .await
        .unwrap();

    let seen = notices.lock().unwrap().clone();
    assert_eq!(seen.first(), Some(&"started"));
    assert_eq!(seen.last(), Some(&"completed"));
    assert!(seen.contains(&"progress"));
    assert!(!seen.contains(&"failed"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test(start_paused = true)]
async fn test_zero_dimension_format_rejected_before_capture() {
    let dir = temp_dir("zero_dims");
    let log = EventLog::default();
    let controller = ExportController::new(
        Box::new(FakeEncoder { log: log.clone() }),
        options_for(&dir, "clip"),
    );

    let mut source = FakeSource::new(log.clone());
    let format = ExportFormat::custom(0, 1080, ContainerFormat::Webm);
    let err = controller
        .start_export(&mut source, sleep_script(100), &format)
        .await
        .unwrap_err();

    assert!(matches!(err, ChatreelError::EncoderUnavailable { .. }));
    assert!(log.events().is_empty());
    assert!(!dir.exists());
    assert!(!controller.is_exporting());
}
