//! Page settings and preferences
//!
//! Persisted in LocalStorage under their own key, separate from the form
//! snapshot. Every field has a default, so partial JSON is accepted.

use serde::{Deserialize, Serialize};

use crate::consts;

/// Code rain appearance and timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RainSettings {
    /// Id of the backdrop canvas
    pub canvas_id: String,
    /// Glyph cell edge in pixels (column width and row height)
    pub cell_size: f64,
    /// Chance per frame that a drop below the bottom edge respawns at the top
    pub respawn_probability: f64,
    /// Alphabet glyphs are drawn from
    pub glyphs: String,
    /// Fill painted over the whole canvas each frame (fading trail)
    pub trail_color: String,
    /// Glyph colour
    pub glyph_color: String,
    /// CSS font family list, size is taken from `cell_size`
    pub font_family: String,
}

impl Default for RainSettings {
    fn default() -> Self {
        Self {
            canvas_id: "matrix-rain".to_string(),
            cell_size: consts::CELL_SIZE,
            respawn_probability: consts::RESPAWN_PROBABILITY,
            glyphs: consts::GLYPHS.to_string(),
            trail_color: "rgba(0, 0, 0, 0.08)".to_string(),
            glyph_color: "#00ff41".to_string(),
            font_family: "\"Share Tech Mono\", monospace".to_string(),
        }
    }
}

impl RainSettings {
    /// Smallest and largest glyph cell, in pixels
    pub const CELL_SIZE_RANGE: (f64, f64) = (4.0, 256.0);

    /// CSS font shorthand used for every glyph
    pub fn font(&self) -> String {
        format!("{}px {}", self.cell_size, self.font_family)
    }

    /// Replace values the renderer cannot work with
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let (min_cell, max_cell) = Self::CELL_SIZE_RANGE;
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            log::warn!("Invalid cell size {}, using default", self.cell_size);
            self.cell_size = defaults.cell_size;
        } else if !(min_cell..=max_cell).contains(&self.cell_size) {
            log::warn!("Cell size {} out of range, clamped", self.cell_size);
            self.cell_size = self.cell_size.clamp(min_cell, max_cell);
        }
        if !self.respawn_probability.is_finite() {
            self.respawn_probability = defaults.respawn_probability;
        }
        self.respawn_probability = self.respawn_probability.clamp(0.0, 1.0);
        if self.glyphs.is_empty() {
            self.glyphs = defaults.glyphs;
        }
        self
    }
}

/// Form element ids, field names and storage key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSettings {
    pub form_id: String,
    pub storage_key: String,
    /// Field whose first word greets the user on success
    pub name_field: String,
    /// Long-text field driving the character counter
    pub message_field: String,
    pub counter_id: String,
    pub feedback_id: String,
    /// Greeting used when the name field is empty
    pub default_name: String,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            form_id: "form-recrutamento".to_string(),
            storage_key: consts::SNAPSHOT_KEY.to_string(),
            name_field: "nome".to_string(),
            message_field: "mensagem".to_string(),
            counter_id: "count".to_string(),
            feedback_id: "feedback".to_string(),
            default_name: "Operador".to_string(),
        }
    }
}

/// All page settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub rain: RainSettings,
    pub form: FormSettings,
    /// Footer element that receives the current year
    pub year_id: String,

    // === Accessibility ===
    /// Disable the rain regardless of the system preference
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rain: RainSettings::default(),
            form: FormSettings::default(),
            year_id: "year".to_string(),
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "matrix_form_settings";

    /// Parse settings from JSON, falling back to defaults for missing fields
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Settings>(json).map(Settings::sanitized)
    }

    /// Replace values the renderer cannot work with
    pub fn sanitized(mut self) -> Self {
        self.rain = self.rain.sanitized();
        self
    }

    /// Whether the rain may animate (respects both system and user preference)
    pub fn motion_allowed(&self, prefers_reduced_motion: bool) -> bool {
        !self.reduced_motion && !prefers_reduced_motion
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
