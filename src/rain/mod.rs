//! Code rain backdrop
//!
//! One falling glyph stream per column. Drawing never clears the canvas;
//! a translucent fill each frame leaves fading trails behind the heads.
//! Randomness comes from a seeded PCG so frames are reproducible.

pub mod animation;
pub mod drops;
pub mod renderer;

pub use animation::{RainAnimation, request_frame};
pub use drops::DropState;
pub use renderer::{RainPhase, RainRenderer};
