//! Chatreel Chat Surface
//!
//! A self-contained renderer for scripted conversations. Instead of
//! rasterizing fonts it draws a blockout: bars sized from character
//! counts stand in for text, surrounded by the chrome a viewer expects
//! around a chat. Output depends only on the conversation, the playback
//! position, and the style, which keeps exports reproducible in tests
//! and headless environments.

mod draw;
pub mod style;
pub mod surface;

pub use style::SurfaceStyle;
pub use surface::ChatSurface;
