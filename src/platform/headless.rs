//! Headless platform: recording surface, manually stepped frames, in-memory form
//!
//! Used by the native binary and by tests; mirrors what the web platform does
//! against the DOM.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use super::{FrameCallback, FrameScheduler, Surface};
use crate::boot::{BootError, Page};
use crate::form::{Feedback, FormController, FormSnapshot, FormView, RuleValidator};
use crate::persistence::{MemoryStorage, PersistentStore};
use crate::rain::{RainAnimation, RainRenderer, request_frame};
use crate::settings::{FormSettings, RainSettings};

/// One recorded drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillStyle(String),
    Font(String),
    Rect { x: f64, y: f64, width: f64, height: f64 },
    Text { text: String, x: f64, y: f64 },
}

/// Surface that records every call instead of drawing
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    /// Simulate the window being resized
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Drain recorded calls
    pub fn take_ops(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }

    /// Recorded glyph draws as (glyph, x, y)
    pub fn texts(&self) -> impl Iterator<Item = (&str, f64, f64)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, x, y } => Some((text.as_str(), *x, *y)),
            _ => None,
        })
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn set_fill_style(&mut self, style: &str) {
        self.ops.push(DrawOp::FillStyle(style.to_string()));
    }

    fn set_font(&mut self, font: &str) {
        self.ops.push(DrawOp::Font(font.to_string()));
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
        });
    }
}

/// Scheduler whose frames only run when the caller steps them
#[derive(Default)]
pub struct ManualScheduler {
    pending: RefCell<Vec<FrameCallback>>,
    frames: Cell<u64>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callbacks waiting for the next frame
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Frames stepped so far
    pub fn frames(&self) -> u64 {
        self.frames.get()
    }

    /// Run every callback requested before this call; returns how many ran.
    /// Callbacks requested while running wait for the next frame.
    pub fn run_frame(&self, time: f64) -> usize {
        let due = std::mem::take(&mut *self.pending.borrow_mut());
        let count = due.len();
        for callback in due {
            callback(time);
        }
        self.frames.set(self.frames.get() + 1);
        count
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&self, callback: FrameCallback) {
        self.pending.borrow_mut().push(callback);
    }
}

/// In-memory stand-in for the recruitment form and its sibling elements
#[derive(Debug, Clone)]
pub struct HeadlessForm {
    /// Named fields in document order
    fields: Vec<(String, String)>,
    counter: Option<String>,
    feedback: Option<Feedback>,
}

impl HeadlessForm {
    /// Form with the given empty fields plus a counter ("0") and feedback area
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: names
                .into_iter()
                .map(|name| (name.into(), String::new()))
                .collect(),
            counter: Some("0".to_string()),
            feedback: Some(Feedback::none()),
        }
    }

    /// The recruitment form markup: name, e-mail, password, country, message
    pub fn recruitment() -> Self {
        Self::for_form(&FormSettings::default())
    }

    /// Recruitment markup using the name and message fields of `settings`
    pub fn for_form(settings: &FormSettings) -> Self {
        Self::new([
            settings.name_field.as_str(),
            "email",
            "senha",
            "pais",
            settings.message_field.as_str(),
        ])
    }

    pub fn without_counter(mut self) -> Self {
        self.counter = None;
        self
    }

    pub fn without_feedback(mut self) -> Self {
        self.feedback = None;
        self
    }

    /// Browser-side form reset: every field back to empty
    pub fn reset_fields(&mut self) {
        for (_, value) in &mut self.fields {
            value.clear();
        }
    }

    pub fn counter(&self) -> Option<&str> {
        self.counter.as_deref()
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }
}

impl FormView for HeadlessForm {
    fn snapshot(&self) -> FormSnapshot {
        self.fields.iter().cloned().collect()
    }

    fn field_value(&self, name: &str) -> Option<String> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    fn set_field(&mut self, name: &str, value: &str) -> bool {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => {
                *v = value.to_string();
                true
            }
            None => false,
        }
    }

    fn set_counter(&mut self, text: &str) -> bool {
        match self.counter.as_mut() {
            Some(counter) => {
                *counter = text.to_string();
                true
            }
            None => false,
        }
    }

    fn show_feedback(&mut self, feedback: &Feedback) -> bool {
        match self.feedback.as_mut() {
            Some(current) => {
                *current = feedback.clone();
                true
            }
            None => false,
        }
    }
}

/// Form controller as wired by [`HeadlessPage`]
pub type HeadlessController = FormController<HeadlessForm, Rc<MemoryStorage>, RuleValidator>;

/// Shared handle to the running rain
pub type HeadlessRain = Rc<RefCell<RainAnimation<RecordingSurface>>>;

/// Whole page without a browser: canvas, form, footer and storage
pub struct HeadlessPage {
    size: (f64, f64),
    reduced_motion: bool,
    year: i32,
    has_canvas: bool,
    has_form: bool,
    seed: u64,
    /// Text elements by id
    texts: RefCell<HashMap<String, String>>,
    storage: Rc<MemoryStorage>,
    scheduler: Rc<ManualScheduler>,
    rain: RefCell<Option<HeadlessRain>>,
    form: RefCell<Option<HeadlessController>>,
}

impl HeadlessPage {
    /// Page with every element present and a viewport of `width` x `height`
    pub fn new(width: f64, height: f64) -> Self {
        let mut texts = HashMap::new();
        texts.insert("year".to_string(), String::new());
        Self {
            size: (width, height),
            reduced_motion: false,
            year: current_year(),
            has_canvas: true,
            has_form: true,
            seed: 0x5eed,
            texts: RefCell::new(texts),
            storage: Rc::new(MemoryStorage::new()),
            scheduler: Rc::new(ManualScheduler::new()),
            rain: RefCell::new(None),
            form: RefCell::new(None),
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = year;
        self
    }

    pub fn with_reduced_motion(mut self, reduced: bool) -> Self {
        self.reduced_motion = reduced;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn without_canvas(mut self) -> Self {
        self.has_canvas = false;
        self
    }

    pub fn without_form(mut self) -> Self {
        self.has_form = false;
        self
    }

    pub fn without_element(self, id: &str) -> Self {
        self.texts.borrow_mut().remove(id);
        self
    }

    pub fn storage(&self) -> &Rc<MemoryStorage> {
        &self.storage
    }

    pub fn scheduler(&self) -> &Rc<ManualScheduler> {
        &self.scheduler
    }

    pub fn text(&self, id: &str) -> Option<String> {
        self.texts.borrow().get(id).cloned()
    }

    /// Running rain, if it was started
    pub fn rain(&self) -> Option<HeadlessRain> {
        self.rain.borrow().clone()
    }

    /// Window resize: new canvas size, drops rebuilt
    pub fn resize(&self, width: f64, height: f64) {
        if let Some(rain) = self.rain() {
            let mut rain = rain.borrow_mut();
            rain.surface.set_size(width, height);
            rain.sync_size();
        }
    }

    /// Run `f` against the wired form controller, if the form was set up
    pub fn with_form<R>(&self, f: impl FnOnce(&mut HeadlessController) -> R) -> Option<R> {
        self.form.borrow_mut().as_mut().map(f)
    }
}

impl Page for HeadlessPage {
    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn start_rain(
        &self,
        settings: &RainSettings,
        reduced_motion: bool,
    ) -> Result<Option<usize>, BootError> {
        if !self.has_canvas {
            return Err(BootError::MissingElement(settings.canvas_id.clone()));
        }
        let renderer = RainRenderer::new(settings.clone(), self.seed);
        let surface = RecordingSurface::new(self.size.0, self.size.1);
        let mut animation = RainAnimation::new(renderer, surface);
        if !animation.start(reduced_motion) {
            return Ok(None);
        }
        let columns = animation.renderer.columns();
        let animation = Rc::new(RefCell::new(animation));
        request_frame(Rc::clone(&animation), Rc::clone(&self.scheduler));
        *self.rain.borrow_mut() = Some(animation);
        Ok(Some(columns))
    }

    fn setup_form(&self, settings: &FormSettings) -> Result<usize, BootError> {
        if !self.has_form {
            return Err(BootError::MissingElement(settings.form_id.clone()));
        }
        let mut controller = FormController::new(
            HeadlessForm::for_form(settings),
            PersistentStore::new(Rc::clone(&self.storage)),
            RuleValidator::for_form(settings),
            settings.clone(),
        );
        let restored = controller.hydrate();
        *self.form.borrow_mut() = Some(controller);
        Ok(restored)
    }

    fn current_year(&self) -> i32 {
        self.year
    }

    fn set_text(&self, element_id: &str, text: &str) -> Result<(), BootError> {
        match self.texts.borrow_mut().get_mut(element_id) {
            Some(slot) => {
                *slot = text.to_string();
                Ok(())
            }
            None => Err(BootError::MissingElement(element_id.to_string())),
        }
    }
}

/// Calendar year (UTC) from the system clock
fn current_year() -> i32 {
    year_of(time::OffsetDateTime::now_utc())
}

fn year_of(moment: time::OffsetDateTime) -> i32 {
    moment.year()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_year_turns_over_at_midnight() {
        // 2024-12-31T23:59:59Z
        let last_second = time::OffsetDateTime::from_unix_timestamp(1_735_689_599).unwrap();
        assert_eq!(year_of(last_second), 2024);
        assert_eq!(year_of(last_second + time::Duration::SECOND), 2025);
        assert!(current_year() >= 2024);
    }

    #[test]
    fn test_manual_scheduler_defers_nested_requests() {
        let scheduler = Rc::new(ManualScheduler::new());
        let hits = Rc::new(Cell::new(0));
        {
            let scheduler2 = Rc::clone(&scheduler);
            let hits = Rc::clone(&hits);
            scheduler.request_frame(Box::new(move |_| {
                hits.set(hits.get() + 1);
                let hits = Rc::clone(&hits);
                scheduler2.request_frame(Box::new(move |_| hits.set(hits.get() + 10)));
            }));
        }
        assert_eq!(scheduler.run_frame(16.0), 1);
        assert_eq!(hits.get(), 1);
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.run_frame(32.0), 1);
        assert_eq!(hits.get(), 11);
        assert_eq!(scheduler.frames(), 2);
    }

    #[test]
    fn test_page_resize_rebuilds_rain() {
        let page = HeadlessPage::new(160.0, 160.0);
        let columns = page.start_rain(&RainSettings::default(), false).unwrap();
        assert_eq!(columns, Some(10));
        page.resize(64.0, 64.0);
        assert_eq!(page.rain().unwrap().borrow().renderer.columns(), 4);
    }

    #[test]
    fn test_headless_form_missing_elements() {
        let mut form = HeadlessForm::recruitment().without_counter().without_feedback();
        assert!(!form.set_counter("3"));
        assert!(!form.show_feedback(&Feedback::none()));
        assert!(!form.set_field("unknown", "x"));
        assert!(form.set_field("nome", "Ada"));
        assert_eq!(form.field_value("nome").as_deref(), Some("Ada"));
    }
}
