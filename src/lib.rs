//! Matrix Form - code rain backdrop and recruitment form UX
//!
//! Core modules:
//! - `rain`: Falling-glyph canvas animation (seeded, frame-stepped)
//! - `form`: Form hydration, live counter, persistence, validation feedback
//! - `persistence`: Failure-tolerant JSON storage over LocalStorage
//! - `platform`: Browser/headless abstraction (surface, frames, DOM)
//! - `boot`: Page-ready bootstrap
//! - `settings`: Data-driven appearance and element ids

pub mod boot;
pub mod form;
pub mod persistence;
pub mod platform;
pub mod rain;
pub mod settings;

pub use boot::{BootReport, RainStatus, boot};
pub use settings::{FormSettings, RainSettings, Settings};

/// Fixed configuration constants
pub mod consts {
    /// Glyph cell edge in pixels (font size, column width, row height)
    pub const CELL_SIZE: f64 = 16.0;
    /// Per-frame chance that an off-screen drop restarts at the top
    pub const RESPAWN_PROBABILITY: f64 = 0.025;
    /// Mostly binary, with a sprinkling of half-width katakana
    pub const GLYPHS: &str = "0101010110ｱｶｻﾀﾅﾊﾏﾔﾗﾜ";
    /// LocalStorage key of the form snapshot
    pub const SNAPSHOT_KEY: &str = "matrix-form";
}
