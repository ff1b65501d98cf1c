//! The seams between the export engine and its surroundings.
//!
//! A [`RasterSource`] produces pixel snapshots of whatever is being
//! recorded, and a [`FrameEncoder`] turns composed frames into an
//! encoded byte stream. Both are trait objects so the engine can be
//! driven end to end with in-memory fakes.

use async_trait::async_trait;
use image::RgbaImage;

use chatreel_common::error::ChatreelResult;
use chatreel_frame_compose::canvas::OutputCanvas;
use chatreel_script_model::format::{ContainerFormat, ExportFormat};

/// Anything that can be sampled for pixels.
///
/// Implementations may mutate internal state while rendering (layout
/// caches and the like), hence `&mut self`. A snapshot's dimensions may
/// change between calls as the surface grows.
#[async_trait]
pub trait RasterSource: Send {
    /// Produce one RGBA snapshot of the current surface state.
    async fn capture(&mut self) -> ChatreelResult<RgbaImage>;
}

/// Video codecs the engine knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Vp9,
    Vp8,
    H264,
}

impl Codec {
    /// The GStreamer encoder element implementing this codec.
    pub fn element_name(&self) -> &'static str {
        match self {
            Codec::Vp9 => "vp9enc",
            Codec::Vp8 => "vp8enc",
            Codec::H264 => "x264enc",
        }
    }
}

impl std::fmt::Display for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Codec::Vp9 => write!(f, "vp9"),
            Codec::Vp8 => write!(f, "vp8"),
            Codec::H264 => write!(f, "h264"),
        }
    }
}

/// Knobs handed to the encoder when a session is opened.
#[derive(Debug, Clone, Copy)]
pub struct EncoderSettings {
    /// Target bitrate in bits per second.
    pub bitrate_bps: u32,
    /// Nominal frame rate advertised to the encoder. Frames carry
    /// explicit timestamps, so this is a hint, not a contract.
    pub fps_hint: u32,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            bitrate_bps: 5_000_000,
            fps_hint: 30,
        }
    }
}

/// The encoded output of one session: container bytes, in order.
#[derive(Debug, Clone)]
pub struct EncodedArtifact {
    container: ContainerFormat,
    chunks: Vec<Vec<u8>>,
}

impl EncodedArtifact {
    pub fn new(container: ContainerFormat) -> Self {
        Self {
            container,
            chunks: Vec::new(),
        }
    }

    /// Append a chunk. Order of calls is the order of bytes in the
    /// final artifact.
    pub fn push_chunk(&mut self, chunk: Vec<u8>) {
        self.chunks.push(chunk);
    }

    pub fn container(&self) -> ContainerFormat {
        self.container
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn byte_len(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.iter().all(Vec::is_empty)
    }

    /// Concatenate all chunks into the final artifact bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.chunks.iter().map(Vec::len).sum());
        for chunk in self.chunks {
            bytes.extend_from_slice(&chunk);
        }
        bytes
    }
}

/// Factory for encoder sessions.
pub trait FrameEncoder: Send + Sync {
    /// Open a session for one export run. Fails when no suitable codec
    /// is installed or the format dimensions are unusable.
    fn open(
        &self,
        format: &ExportFormat,
        settings: &EncoderSettings,
    ) -> ChatreelResult<Box<dyn EncoderSession>>;

    /// Whether the backend can encode at all on this machine.
    fn is_available(&self) -> bool;

    /// Backend name for logs and diagnostics.
    fn name(&self) -> &str;
}

/// One live encoding run.
///
/// Lifecycle: `start`, any number of `write_frame` calls with
/// monotonically increasing timestamps, then `stop`. Stopping a session
/// that never started yields an empty artifact and is not an error.
#[async_trait]
pub trait EncoderSession: Send {
    /// The codec this session negotiated.
    fn codec(&self) -> Codec;

    /// Begin accepting frames.
    fn start(&mut self) -> ChatreelResult<()>;

    /// Encode one composed frame stamped at `pts_ns` nanoseconds from
    /// the start of the recording.
    fn write_frame(&mut self, canvas: &OutputCanvas, pts_ns: u64) -> ChatreelResult<()>;

    /// Flush the encoder and collect the finished artifact.
    async fn stop(&mut self) -> ChatreelResult<EncodedArtifact>;
}
