//! Chatreel Frame Composition
//!
//! Pure pixel math for the export pipeline: computing where the
//! captured chat surface lands on the output canvas and drawing it
//! there. No I/O and no clocks; everything here is deterministic given
//! its inputs.

pub mod canvas;
pub mod layout;

pub use canvas::*;
pub use layout::*;
