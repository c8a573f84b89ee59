//! Page-ready bootstrap
//!
//! Starts the rain, wires the form and stamps the footer year. Each step is
//! independent: a failure is logged and the remaining steps still run.

use crate::settings::{FormSettings, RainSettings, Settings};

/// Why a bootstrap step could not run
#[derive(Debug, thiserror::Error)]
pub enum BootError {
    #[error("element #{0} not found")]
    MissingElement(String),
    #[error("element #{id} is not a {expected}")]
    WrongElement { id: String, expected: &'static str },
    #[error("2D canvas context unavailable")]
    NoContext,
    #[error("browser call failed: {0}")]
    Js(String),
}

/// Host page capabilities the bootstrap drives
pub trait Page {
    /// `(prefers-reduced-motion: reduce)` currently matches
    fn prefers_reduced_motion(&self) -> bool;
    /// Start the rain loop; `Ok(None)` when motion is suppressed,
    /// otherwise the initial column count
    fn start_rain(
        &self,
        settings: &RainSettings,
        reduced_motion: bool,
    ) -> Result<Option<usize>, BootError>;
    /// Hydrate and wire the form; returns the number of restored fields
    fn setup_form(&self, settings: &FormSettings) -> Result<usize, BootError>;
    fn current_year(&self) -> i32;
    fn set_text(&self, element_id: &str, text: &str) -> Result<(), BootError>;
}

/// State of the rain after bootstrap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RainStatus {
    Running { columns: usize },
    /// Reduced motion: no canvas work at all
    Suppressed,
    Failed,
}

/// What the bootstrap managed to start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootReport {
    pub rain: RainStatus,
    /// Restored field count, None when the form could not be set up
    pub form: Option<usize>,
    /// Year written to the footer, None when there is no footer element
    pub year: Option<i32>,
}

/// Run every bootstrap step against `page`
pub fn boot<P: Page + ?Sized>(page: &P, settings: &Settings) -> BootReport {
    let reduced_motion = !settings.motion_allowed(page.prefers_reduced_motion());
    let rain = match page.start_rain(&settings.rain, reduced_motion) {
        Ok(Some(columns)) => RainStatus::Running { columns },
        Ok(None) => RainStatus::Suppressed,
        Err(e) => {
            log::warn!("Code rain not started: {}", e);
            RainStatus::Failed
        }
    };

    let form = match page.setup_form(&settings.form) {
        Ok(restored) => Some(restored),
        Err(e) => {
            log::warn!("Form not set up: {}", e);
            None
        }
    };

    let year = page.current_year();
    let year = match page.set_text(&settings.year_id, &year.to_string()) {
        Ok(()) => Some(year),
        Err(e) => {
            log::debug!("Footer year skipped: {}", e);
            None
        }
    };

    log::info!("Page ready (rain: {:?}, form: {:?})", rain, form.is_some());
    BootReport { rain, form, year }
}
