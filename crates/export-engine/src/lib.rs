//! Chatreel Export Engine
//!
//! Records an animated chat surface into an encoded video clip. While
//! the animation script reveals messages on its own timeline, the
//! engine samples the surface at a fixed cadence, composes each
//! snapshot onto the output canvas, and streams the frames through an
//! encoder session. The finished artifact is written out as a single
//! timestamped file.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                   ExportController                     │
//! │                                                        │
//! │  ┌──────────────┐     tick      ┌──────────────────┐   │
//! │  │ RasterSource │──────────────▶│     Sampler      │   │
//! │  └──────────────┘   snapshot    └────────┬─────────┘   │
//! │  ┌──────────────┐                        │ composed    │
//! │  │  Animation   │  reveals run           ▼ frame       │
//! │  │   Script     │  concurrently  ┌──────────────────┐  │
//! │  └──────────────┘                │  EncoderSession  │  │
//! │                                  └────────┬─────────┘  │
//! │                                           ▼            │
//! │                                   timestamped file     │
//! └────────────────────────────────────────────────────────┘
//! ```

pub mod encoder;
pub mod ports;
mod sampler;
pub mod session;

pub use encoder::{codec_preference, negotiate_codec, probe_codecs, GstFrameEncoder};
pub use ports::*;
pub use session::*;
