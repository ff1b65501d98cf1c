//! Chatreel Script Model
//!
//! The conversation being animated and everything derived from it:
//! - Message and participant data model with a portable JSON form
//! - Built-in conversation templates
//! - Export format presets for social platforms
//! - Shared playback state and the timed replay script

pub mod conversation;
pub mod format;
pub mod playback;
pub mod script;
pub mod templates;

pub use conversation::*;
pub use format::*;
pub use playback::*;
pub use script::*;
