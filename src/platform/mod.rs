//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - 2D drawing (canvas on web, recording surface headless)
//! - Frame scheduling (requestAnimationFrame on web, manual stepping headless)
//! - Form access and constraint validation (DOM on web, in-memory form headless)

pub mod headless;

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Minimal 2D drawing surface the rain paints on
pub trait Surface {
    /// Drawable size in pixels (width, height)
    fn size(&self) -> (f64, f64);
    fn set_fill_style(&mut self, style: &str);
    fn set_font(&mut self, font: &str);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn fill_text(&mut self, text: &str, x: f64, y: f64);
}

/// Callback run on the next display frame with a timestamp in milliseconds
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Source of recurring frame ticks
pub trait FrameScheduler {
    fn request_frame(&self, callback: FrameCallback);
}
