//! Rain state machine and per-frame drawing

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::drops::DropState;
use crate::platform::Surface;
use crate::settings::RainSettings;

/// Lifecycle of the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RainPhase {
    /// Not started, or suppressed by reduced motion (permanent in that case)
    Uninitialized,
    /// Drops were just (re)built for a new surface size
    Resized,
    /// At least one frame drawn since the last resize
    Drawing,
}

/// Owns the drop state and paints one frame at a time
#[derive(Debug, Clone)]
pub struct RainRenderer {
    settings: RainSettings,
    glyphs: Vec<char>,
    font: String,
    phase: RainPhase,
    drops: DropState,
    width: f64,
    height: f64,
    rng: Pcg32,
}

impl RainRenderer {
    pub fn new(settings: RainSettings, seed: u64) -> Self {
        let settings = settings.sanitized();
        let glyphs = settings.glyphs.chars().collect();
        let font = settings.font();
        Self {
            settings,
            glyphs,
            font,
            phase: RainPhase::Uninitialized,
            drops: DropState::default(),
            width: 0.0,
            height: 0.0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Start animating on a surface of the given size. Returns false (and
    /// stays uninitialized for good) when reduced motion is requested.
    pub fn start(&mut self, reduced_motion: bool, width: f64, height: f64) -> bool {
        if reduced_motion {
            log::info!("Reduced motion requested, code rain disabled");
            return false;
        }
        if self.phase != RainPhase::Uninitialized {
            return true;
        }
        self.rebuild(width, height);
        log::info!("Code rain started with {} columns", self.drops.columns());
        true
    }

    /// Recompute columns for a new size and restart every drop.
    /// In-flight streams are discarded.
    pub fn resize(&mut self, width: f64, height: f64) {
        if self.phase == RainPhase::Uninitialized {
            return;
        }
        self.rebuild(width, height);
        log::debug!(
            "Code rain resized to {}x{} ({} columns)",
            width,
            height,
            self.drops.columns()
        );
    }

    /// Paint one frame: fade the previous frame, draw one glyph per column,
    /// advance every drop by one cell
    pub fn draw<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        if self.phase == RainPhase::Uninitialized {
            return;
        }

        let cell = self.settings.cell_size;
        surface.set_fill_style(&self.settings.trail_color);
        surface.fill_rect(0.0, 0.0, self.width, self.height);
        surface.set_fill_style(&self.settings.glyph_color);
        surface.set_font(&self.font);

        let mut buf = [0u8; 4];
        for (i, drop) in self.drops.positions_mut().iter_mut().enumerate() {
            let glyph = self.glyphs[self.rng.random_range(0..self.glyphs.len())];
            let x = i as f64 * cell;
            let y = *drop * cell;
            surface.fill_text(glyph.encode_utf8(&mut buf), x, y);

            // Staggered respawn once the head has left the screen
            if y > self.height && self.rng.random_bool(self.settings.respawn_probability) {
                *drop = 0.0;
            }
            *drop += 1.0;
        }

        self.phase = RainPhase::Drawing;
    }

    pub fn phase(&self) -> RainPhase {
        self.phase
    }

    pub fn drops(&self) -> &DropState {
        &self.drops
    }

    pub fn columns(&self) -> usize {
        self.drops.columns()
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn rebuild(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.drops = DropState::new(width, height, self.settings.cell_size, &mut self.rng);
        self.phase = RainPhase::Resized;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::{DrawOp, RecordingSurface};

    /// Surface that ignores everything (for long statistical runs)
    struct NullSurface;

    impl Surface for NullSurface {
        fn size(&self) -> (f64, f64) {
            (16.0, 16.0)
        }
        fn set_fill_style(&mut self, _style: &str) {}
        fn set_font(&mut self, _font: &str) {}
        fn fill_rect(&mut self, _x: f64, _y: f64, _w: f64, _h: f64) {}
        fn fill_text(&mut self, _text: &str, _x: f64, _y: f64) {}
    }

    fn renderer() -> RainRenderer {
        RainRenderer::new(RainSettings::default(), 42)
    }

    #[test]
    fn test_reduced_motion_stays_uninitialized() {
        let mut rain = renderer();
        assert!(!rain.start(true, 800.0, 600.0));
        assert_eq!(rain.phase(), RainPhase::Uninitialized);

        let mut surface = RecordingSurface::new(800.0, 600.0);
        rain.resize(1024.0, 768.0);
        rain.draw(&mut surface);
        assert!(surface.ops().is_empty());
        assert_eq!(rain.columns(), 0);
    }

    #[test]
    fn test_frame_draw_order() {
        let mut rain = renderer();
        assert!(rain.start(false, 64.0, 48.0));
        assert_eq!(rain.phase(), RainPhase::Resized);

        let mut surface = RecordingSurface::new(64.0, 48.0);
        rain.draw(&mut surface);
        assert_eq!(rain.phase(), RainPhase::Drawing);

        let ops = surface.ops();
        assert_eq!(ops[0], DrawOp::FillStyle("rgba(0, 0, 0, 0.08)".to_string()));
        assert_eq!(
            ops[1],
            DrawOp::Rect {
                x: 0.0,
                y: 0.0,
                width: 64.0,
                height: 48.0
            }
        );
        assert_eq!(ops[2], DrawOp::FillStyle("#00ff41".to_string()));
        assert_eq!(
            ops[3],
            DrawOp::Font("16px \"Share Tech Mono\", monospace".to_string())
        );

        let texts: Vec<_> = surface.texts().collect();
        assert_eq!(texts.len(), 4);
        for (i, (glyph, x, _)) in texts.iter().enumerate() {
            assert_eq!(*x, i as f64 * 16.0);
            assert!(crate::consts::GLYPHS.contains(glyph));
        }
    }

    #[test]
    fn test_glyph_drawn_at_drop_position_then_advanced() {
        let mut rain = renderer();
        rain.start(false, 160.0, 160.0);
        let before = rain.drops().positions().to_vec();

        let mut surface = RecordingSurface::new(160.0, 160.0);
        rain.draw(&mut surface);

        for ((_, _, y), start) in surface.texts().zip(&before) {
            assert_eq!(y, start * 16.0);
        }
        for (after, start) in rain.drops().positions().iter().zip(&before) {
            assert_eq!(*after, start + 1.0);
        }
    }

    #[test]
    fn test_respawn_rate_converges() {
        let mut rain = renderer();
        rain.start(false, 16.0, 16.0);
        assert_eq!(rain.columns(), 1);

        let frames = 200_000;
        let mut resets = 0;
        for _ in 0..frames {
            rain.drops.positions_mut()[0] = 100.0;
            rain.draw(&mut NullSurface);
            match rain.drops().positions()[0] {
                p if p == 1.0 => resets += 1,
                p => assert_eq!(p, 101.0),
            }
        }
        let rate = resets as f64 / frames as f64;
        assert!((rate - 0.025).abs() < 0.002, "respawn rate {}", rate);
    }

    #[test]
    fn test_on_screen_drops_never_respawn() {
        let mut rain = renderer();
        rain.start(false, 160.0, 10_000.0);
        rain.drops.positions_mut().fill(1.0);
        for frame in 0..100 {
            let before = rain.drops().positions().to_vec();
            rain.draw(&mut NullSurface);
            for (after, start) in rain.drops().positions().iter().zip(&before) {
                assert_eq!(*after, start + 1.0, "frame {}", frame);
            }
        }
    }

    #[test]
    fn test_resize_rebuilds_columns() {
        let mut rain = renderer();
        rain.start(false, 800.0, 600.0);
        rain.draw(&mut NullSurface);
        assert_eq!(rain.columns(), 50);

        rain.resize(333.0, 200.0);
        assert_eq!(rain.phase(), RainPhase::Resized);
        assert_eq!(rain.columns(), 20);
        assert_eq!(rain.size(), (333.0, 200.0));
        let rows = 200.0 / 16.0;
        for &p in rain.drops().positions() {
            assert!(p >= 1.0 && p < 1.0 + rows);
        }

        let mut surface = RecordingSurface::new(333.0, 200.0);
        rain.draw(&mut surface);
        assert_eq!(surface.texts().count(), 20);
    }

    #[test]
    fn test_empty_alphabet_falls_back() {
        let settings = RainSettings {
            glyphs: String::new(),
            respawn_probability: f64::NAN,
            ..RainSettings::default()
        };
        let mut rain = RainRenderer::new(settings, 1);
        rain.start(false, 32.0, 32.0);
        let mut surface = RecordingSurface::new(32.0, 32.0);
        rain.draw(&mut surface);
        assert_eq!(surface.texts().count(), 2);
    }

    #[test]
    fn test_tiny_cell_size_is_clamped() {
        let settings = RainSettings {
            cell_size: 1e-300,
            ..RainSettings::default()
        };
        let mut rain = RainRenderer::new(settings, 1);
        assert!(rain.start(false, 800.0, 600.0));
        assert_eq!(rain.columns(), 200);
        let mut surface = RecordingSurface::new(800.0, 600.0);
        rain.draw(&mut surface);
        assert_eq!(surface.texts().count(), 200);
    }

    #[test]
    fn test_same_seed_same_frames() {
        let mut a = renderer();
        let mut b = renderer();
        a.start(false, 320.0, 240.0);
        b.start(false, 320.0, 240.0);
        let mut sa = RecordingSurface::new(320.0, 240.0);
        let mut sb = RecordingSurface::new(320.0, 240.0);
        for _ in 0..30 {
            a.draw(&mut sa);
            b.draw(&mut sb);
        }
        assert_eq!(sa.ops(), sb.ops());
    }
}
