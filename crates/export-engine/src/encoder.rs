//! GStreamer-backed frame encoding.
//!
//! Frames are pushed into an `appsrc`, run through a codec negotiated
//! from the container's preference order, and collected muxed from an
//! `appsink`. The pipeline never touches the filesystem; the engine
//! owns artifact placement.

use std::sync::OnceLock;

use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;

use chatreel_common::error::{ChatreelError, ChatreelResult};
use chatreel_frame_compose::canvas::OutputCanvas;
use chatreel_script_model::format::{ContainerFormat, ExportFormat};

use crate::ports::{Codec, EncodedArtifact, EncoderSession, EncoderSettings, FrameEncoder};

/// Codecs tried for webm output, best first.
pub const WEBM_CODEC_PREFERENCE: &[Codec] = &[Codec::Vp9, Codec::Vp8];

/// Codecs tried for mp4 output.
pub const MP4_CODEC_PREFERENCE: &[Codec] = &[Codec::H264];

static GST_INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// Initialize GStreamer exactly once per process.
fn init_gstreamer() -> ChatreelResult<()> {
    let result = GST_INIT.get_or_init(|| gst::init().map_err(|e| e.to_string()));
    result
        .clone()
        .map_err(|e| ChatreelError::encoder_unavailable(format!("GStreamer init failed: {e}")))
}

/// The preference order for a container.
pub fn codec_preference(container: ContainerFormat) -> &'static [Codec] {
    match container {
        ContainerFormat::Webm => WEBM_CODEC_PREFERENCE,
        ContainerFormat::Mp4 => MP4_CODEC_PREFERENCE,
    }
}

/// Pick the first installed codec for `container`.
pub fn negotiate_codec(container: ContainerFormat) -> ChatreelResult<Codec> {
    init_gstreamer()?;

    let preference = codec_preference(container);
    for codec in preference {
        if gst::ElementFactory::find(codec.element_name()).is_some() {
            return Ok(*codec);
        }
    }

    let tried: Vec<&str> = preference.iter().map(|c| c.element_name()).collect();
    Err(ChatreelError::encoder_unavailable(format!(
        "No encoder available for {container}: none of [{}] are installed",
        tried.join(", ")
    )))
}

/// Report installed/missing state for every codec a container can use.
/// Used by diagnostics so callers need no GStreamer types of their own.
pub fn probe_codecs(container: ContainerFormat) -> ChatreelResult<Vec<(Codec, bool)>> {
    init_gstreamer()?;
    Ok(codec_preference(container)
        .iter()
        .map(|codec| {
            (
                *codec,
                gst::ElementFactory::find(codec.element_name()).is_some(),
            )
        })
        .collect())
}

fn encoder_fragment(codec: Codec, bitrate_bps: u32) -> String {
    match codec {
        // deadline=1 puts the vpx encoders in realtime mode so they
        // keep up with live capture
        Codec::Vp9 => format!("vp9enc target-bitrate={bitrate_bps} deadline=1 cpu-used=4"),
        Codec::Vp8 => format!("vp8enc target-bitrate={bitrate_bps} deadline=1 cpu-used=4"),
        // x264enc takes kilobits, not bits
        Codec::H264 => format!(
            "x264enc tune=zerolatency speed-preset=veryfast bitrate={} ! h264parse",
            (bitrate_bps / 1000).max(250)
        ),
    }
}

fn muxer_fragment(container: ContainerFormat) -> &'static str {
    match container {
        // streamable=true keeps webmmux from seeking back to rewrite
        // headers, which chunked appsink delivery cannot support
        ContainerFormat::Webm => "webmmux streamable=true",
        ContainerFormat::Mp4 => "mp4mux fragment-duration=500",
    }
}

fn build_encode_launch(codec: Codec, format: &ExportFormat, settings: &EncoderSettings) -> String {
    let fps = settings.fps_hint.max(1);
    format!(
        "appsrc name=src is-live=true format=time do-timestamp=false \
         caps=\"video/x-raw,format=RGBA,width={width},height={height},framerate={fps}/1\" ! \
         videoconvert ! {encoder} ! {muxer} ! \
         appsink name=sink sync=false",
        width = format.width,
        height = format.height,
        encoder = encoder_fragment(codec, settings.bitrate_bps),
        muxer = muxer_fragment(format.container),
    )
}

/// The production [`FrameEncoder`]: one GStreamer pipeline per session.
pub struct GstFrameEncoder;

impl GstFrameEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GstFrameEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameEncoder for GstFrameEncoder {
    fn open(
        &self,
        format: &ExportFormat,
        settings: &EncoderSettings,
    ) -> ChatreelResult<Box<dyn EncoderSession>> {
        if !format.is_valid() {
            return Err(ChatreelError::encoder_unavailable(format!(
                "Cannot encode {}x{} output",
                format.width, format.height
            )));
        }

        let codec = negotiate_codec(format.container)?;
        let launch = build_encode_launch(codec, format, settings);
        tracing::debug!(%codec, launch = %launch, "Building encode pipeline");

        let session = GstEncoderSession::from_launch(&launch, codec, format.container, settings)?;
        Ok(Box::new(session))
    }

    fn is_available(&self) -> bool {
        init_gstreamer().is_ok()
    }

    fn name(&self) -> &str {
        "gstreamer"
    }
}

/// A live encode pipeline.
pub struct GstEncoderSession {
    codec: Codec,
    container: ContainerFormat,
    pipeline: gst::Pipeline,
    appsrc: gst_app::AppSrc,
    appsink: gst_app::AppSink,
    frame_duration: gst::ClockTime,
    chunks: Vec<Vec<u8>>,
    started: bool,
}

impl GstEncoderSession {
    fn from_launch(
        launch: &str,
        codec: Codec,
        container: ContainerFormat,
        settings: &EncoderSettings,
    ) -> ChatreelResult<Self> {
        init_gstreamer()?;

        let element = gst::parse::launch(launch).map_err(|e| {
            ChatreelError::encoder_unavailable(format!("Failed to build encode pipeline: {e}"))
        })?;

        let pipeline = element.dynamic_cast::<gst::Pipeline>().map_err(|_| {
            ChatreelError::encoder_unavailable("Encode launch did not produce a pipeline")
        })?;

        let appsrc = pipeline
            .by_name("src")
            .and_then(|e| e.dynamic_cast::<gst_app::AppSrc>().ok())
            .ok_or_else(|| {
                ChatreelError::encoder_unavailable("Encode pipeline is missing its appsrc")
            })?;

        let appsink = pipeline
            .by_name("sink")
            .and_then(|e| e.dynamic_cast::<gst_app::AppSink>().ok())
            .ok_or_else(|| {
                ChatreelError::encoder_unavailable("Encode pipeline is missing its appsink")
            })?;

        let fps = settings.fps_hint.max(1) as u64;
        Ok(Self {
            codec,
            container,
            pipeline,
            appsrc,
            appsink,
            frame_duration: gst::ClockTime::from_mseconds(1000 / fps),
            chunks: Vec::new(),
            started: false,
        })
    }

    /// Collect whatever the muxer has finished without blocking.
    fn pull_ready_chunks(&mut self) -> ChatreelResult<()> {
        while let Some(sample) = self.appsink.try_pull_sample(gst::ClockTime::ZERO) {
            self.store_sample(&sample)?;
        }
        Ok(())
    }

    fn store_sample(&mut self, sample: &gst::Sample) -> ChatreelResult<()> {
        let buffer = sample
            .buffer()
            .ok_or_else(|| ChatreelError::encoder_unavailable("Muxed sample has no buffer"))?;
        let map = buffer.map_readable().map_err(|_| {
            ChatreelError::encoder_unavailable("Failed to map muxed buffer for reading")
        })?;
        self.chunks.push(map.as_slice().to_vec());
        Ok(())
    }
}

#[async_trait::async_trait]
impl EncoderSession for GstEncoderSession {
    fn codec(&self) -> Codec {
        self.codec
    }

    fn start(&mut self) -> ChatreelResult<()> {
        self.pipeline
            .set_state(gst::State::Playing)
            .map_err(|e| ChatreelError::encoder_unavailable(format!("Failed to start encode pipeline: {e}")))?;
        self.started = true;
        tracing::debug!(codec = %self.codec, "Encode pipeline playing");
        Ok(())
    }

    fn write_frame(&mut self, canvas: &OutputCanvas, pts_ns: u64) -> ChatreelResult<()> {
        let mut buffer = gst::Buffer::from_mut_slice(canvas.frame_bytes().to_vec());
        {
            let buffer = buffer.get_mut().ok_or_else(|| {
                ChatreelError::encoder_unavailable("Frame buffer is unexpectedly shared")
            })?;
            buffer.set_pts(gst::ClockTime::from_nseconds(pts_ns));
            buffer.set_duration(self.frame_duration);
        }

        self.appsrc.push_buffer(buffer).map_err(|e| {
            ChatreelError::encoder_unavailable(format!("Encoder rejected frame: {e:?}"))
        })?;

        self.pull_ready_chunks()
    }

    async fn stop(&mut self) -> ChatreelResult<EncodedArtifact> {
        if !self.started {
            return Ok(EncodedArtifact::new(self.container));
        }

        if let Err(e) = self.appsrc.end_of_stream() {
            tracing::warn!("Failed to signal end-of-stream: {e:?}");
        }

        // Drain until the muxer confirms EOS so trailing headers land
        // in the artifact.
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
        while !self.appsink.is_eos() {
            if std::time::Instant::now() > deadline {
                tracing::warn!("Timed out waiting for encoder to drain");
                break;
            }
            if let Some(sample) = self.appsink.try_pull_sample(gst::ClockTime::from_mseconds(100)) {
                self.store_sample(&sample)?;
            }
        }
        // is_eos can flip while a finished sample is still queued
        self.pull_ready_chunks()?;

        self.pipeline
            .set_state(gst::State::Null)
            .map_err(|e| ChatreelError::encoder_unavailable(format!("Failed to stop encode pipeline: {e}")))?;
        self.started = false;

        let mut artifact = EncodedArtifact::new(self.container);
        for chunk in self.chunks.drain(..) {
            artifact.push_chunk(chunk);
        }
        tracing::info!(
            codec = %self.codec,
            chunks = artifact.chunk_count(),
            bytes = artifact.byte_len(),
            "Encoder session stopped"
        );
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story_format() -> ExportFormat {
        ExportFormat::preset("instagram-story").unwrap()
    }

    #[test]
    fn test_webm_prefers_vp9_then_vp8() {
        assert_eq!(
            codec_preference(ContainerFormat::Webm),
            &[Codec::Vp9, Codec::Vp8]
        );
        assert_eq!(codec_preference(ContainerFormat::Mp4), &[Codec::H264]);
    }

    #[test]
    fn test_webm_launch_string() {
        let launch = build_encode_launch(Codec::Vp9, &story_format(), &EncoderSettings::default());
        assert!(launch.starts_with("appsrc name=src is-live=true format=time do-timestamp=false"));
        assert!(launch.contains("width=1080,height=1920,framerate=30/1"));
        assert!(launch.contains("videoconvert ! vp9enc target-bitrate=5000000 deadline=1 cpu-used=4"));
        assert!(launch.contains("webmmux streamable=true"));
        assert!(launch.ends_with("appsink name=sink sync=false"));
    }

    #[test]
    fn test_mp4_launch_string() {
        let format = ExportFormat::custom(1280, 720, ContainerFormat::Mp4);
        let settings = EncoderSettings {
            bitrate_bps: 2_500_000,
            fps_hint: 30,
        };
        let launch = build_encode_launch(Codec::H264, &format, &settings);
        assert!(launch.contains("width=1280,height=720"));
        assert!(launch.contains("x264enc tune=zerolatency speed-preset=veryfast bitrate=2500"));
        assert!(launch.contains("h264parse"));
        assert!(launch.contains("mp4mux fragment-duration=500"));
    }

    #[test]
    fn test_h264_bitrate_floor() {
        let fragment = encoder_fragment(Codec::H264, 1000);
        assert!(fragment.contains("bitrate=250"));
    }

    #[test]
    fn test_fps_hint_never_zero_in_launch() {
        let settings = EncoderSettings {
            bitrate_bps: 1_000_000,
            fps_hint: 0,
        };
        let launch = build_encode_launch(Codec::Vp8, &story_format(), &settings);
        assert!(launch.contains("framerate=1/1"));
    }
}
