//! Browser platform: canvas, requestAnimationFrame, DOM form, native validation

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, HtmlElement, HtmlFormElement,
    HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement, ValidityState, Window,
};

use super::{FrameCallback, FrameScheduler, Surface};
use crate::boot::{BootError, Page, boot};
use crate::form::{
    Constraint, Feedback, FieldValidity, FormController, FormSnapshot, FormView, SubmitEvent,
    Validator, Validity,
};
use crate::persistence::{LocalStorage, PersistentStore};
use crate::rain::{RainAnimation, RainRenderer, request_frame};
use crate::settings::{FormSettings, RainSettings, Settings};

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

fn js_error(value: JsValue) -> BootError {
    BootError::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}

/// Viewport size in CSS pixels
fn viewport_size(window: &Window) -> (f64, f64) {
    let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (w, h)
}

// --- Rain -------------------------------------------------------------------

/// 2D canvas context as a [`Surface`]
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(document: &Document, id: &str) -> Result<Self, BootError> {
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(id)
            .ok_or_else(|| BootError::MissingElement(id.to_string()))?
            .dyn_into()
            .map_err(|_| BootError::WrongElement {
                id: id.to_string(),
                expected: "canvas",
            })?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(js_error)?
            .ok_or(BootError::NoContext)?
            .dyn_into()
            .map_err(|_| BootError::NoContext)?;
        Ok(Self { canvas, ctx })
    }

    /// Set the backing store size (clears the canvas)
    pub fn resize(&self, width: f64, height: f64) {
        self.canvas.set_width(width.max(0.0) as u32);
        self.canvas.set_height(height.max(0.0) as u32);
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> (f64, f64) {
        (self.canvas.width() as f64, self.canvas.height() as f64)
    }

    fn set_fill_style(&mut self, style: &str) {
        self.ctx.set_fill_style_str(style);
    }

    fn set_font(&mut self, font: &str) {
        self.ctx.set_font(font);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ctx.fill_rect(x, y, width, height);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        let _ = self.ctx.fill_text(text, x, y);
    }
}

/// `window.requestAnimationFrame`
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimationFrameScheduler;

impl FrameScheduler for AnimationFrameScheduler {
    fn request_frame(&self, callback: FrameCallback) {
        let Some(window) = web_sys::window() else {
            log::warn!("No window, animation frame dropped");
            return;
        };
        let closure = Closure::once(move |time: f64| callback(time));
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

type WebRain = Rc<RefCell<RainAnimation<CanvasSurface>>>;

fn setup_resize_handler(window: &Window, rain: WebRain) {
    let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
        let Some(window) = web_sys::window() else {
            return;
        };
        let (w, h) = viewport_size(&window);
        let mut rain = rain.borrow_mut();
        rain.surface.resize(w, h);
        rain.sync_size();
    });
    let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
    closure.forget();
}

// --- Form -------------------------------------------------------------------

/// One form control, whatever its element type
enum Control {
    Input(HtmlInputElement),
    Select(HtmlSelectElement),
    TextArea(HtmlTextAreaElement),
}

impl Control {
    fn from_element(element: Element) -> Option<Self> {
        element
            .dyn_into::<HtmlInputElement>()
            .map(Control::Input)
            .or_else(|el| el.dyn_into::<HtmlSelectElement>().map(Control::Select))
            .or_else(|el| el.dyn_into::<HtmlTextAreaElement>().map(Control::TextArea))
            .ok()
    }

    fn name(&self) -> String {
        match self {
            Control::Input(el) => el.name(),
            Control::Select(el) => el.name(),
            Control::TextArea(el) => el.name(),
        }
    }

    fn value(&self) -> String {
        match self {
            Control::Input(el) => el.value(),
            Control::Select(el) => el.value(),
            Control::TextArea(el) => el.value(),
        }
    }

    fn set_value(&self, value: &str) {
        match self {
            Control::Input(el) => el.set_value(value),
            Control::Select(el) => el.set_value(value),
            Control::TextArea(el) => el.set_value(value),
        }
    }

    fn validity(&self) -> ValidityState {
        match self {
            Control::Input(el) => el.validity(),
            Control::Select(el) => el.validity(),
            Control::TextArea(el) => el.validity(),
        }
    }

    /// Whether the control contributes to form data (FormData rules)
    fn is_submittable(&self) -> bool {
        let disabled = match self {
            Control::Input(el) => el.disabled(),
            Control::Select(el) => el.disabled(),
            Control::TextArea(el) => el.disabled(),
        };
        if disabled || self.name().is_empty() {
            return false;
        }
        match self {
            Control::Input(el) => match el.type_().as_str() {
                "submit" | "reset" | "button" | "image" | "file" => false,
                "checkbox" | "radio" => el.checked(),
                _ => true,
            },
            _ => true,
        }
    }
}

fn controls(form: &HtmlFormElement) -> impl Iterator<Item = Control> {
    let elements = form.elements();
    (0..elements.length())
        .filter_map(move |i| elements.item(i))
        .filter_map(Control::from_element)
}

/// The recruitment form plus its counter and feedback elements
pub struct DomForm {
    form: HtmlFormElement,
    counter: Option<Element>,
    feedback: Option<HtmlElement>,
}

impl DomForm {
    pub fn new(document: &Document, settings: &FormSettings) -> Result<Self, BootError> {
        let form: HtmlFormElement = document
            .get_element_by_id(&settings.form_id)
            .ok_or_else(|| BootError::MissingElement(settings.form_id.clone()))?
            .dyn_into()
            .map_err(|_| BootError::WrongElement {
                id: settings.form_id.clone(),
                expected: "form",
            })?;
        let counter = document.get_element_by_id(&settings.counter_id);
        let feedback = document
            .get_element_by_id(&settings.feedback_id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());
        if counter.is_none() {
            log::debug!("No #{} element, counter disabled", settings.counter_id);
        }
        if feedback.is_none() {
            log::debug!("No #{} element, feedback disabled", settings.feedback_id);
        }
        Ok(Self {
            form,
            counter,
            feedback,
        })
    }

    pub fn element(&self) -> &HtmlFormElement {
        &self.form
    }

    fn find(&self, name: &str) -> Option<Control> {
        controls(&self.form).find(|c| c.name() == name)
    }
}

impl FormView for DomForm {
    fn snapshot(&self) -> FormSnapshot {
        controls(&self.form)
            .filter(Control::is_submittable)
            .map(|c| (c.name(), c.value()))
            .collect()
    }

    fn field_value(&self, name: &str) -> Option<String> {
        self.find(name).map(|c| c.value())
    }

    fn set_field(&mut self, name: &str, value: &str) -> bool {
        match self.find(name) {
            Some(control) => {
                control.set_value(value);
                true
            }
            None => false,
        }
    }

    fn set_counter(&mut self, text: &str) -> bool {
        match &self.counter {
            Some(counter) => {
                counter.set_text_content(Some(text));
                true
            }
            None => false,
        }
    }

    fn show_feedback(&mut self, feedback: &Feedback) -> bool {
        let Some(el) = &self.feedback else {
            return false;
        };
        el.set_text_content(Some(&feedback.message));
        let style = el.style();
        let tints = [
            ("border-color", feedback.border_color()),
            ("background", feedback.background()),
        ];
        for (property, value) in tints {
            let _ = match value {
                Some(value) => style.set_property(property, value),
                None => style.remove_property(property).map(|_| ()),
            };
        }
        true
    }
}

/// Browser constraint validation (`required`, `type`, `minlength`, `pattern`...)
pub struct NativeValidator {
    form: HtmlFormElement,
}

impl NativeValidator {
    pub fn new(form: HtmlFormElement) -> Self {
        Self { form }
    }
}

fn failed_constraint(state: &ValidityState) -> Option<Constraint> {
    if state.valid() {
        None
    } else if state.value_missing() {
        Some(Constraint::ValueMissing)
    } else if state.type_mismatch() {
        Some(Constraint::TypeMismatch)
    } else if state.too_short() {
        Some(Constraint::TooShort)
    } else if state.too_long() {
        Some(Constraint::TooLong)
    } else if state.pattern_mismatch() {
        Some(Constraint::PatternMismatch)
    } else {
        Some(Constraint::Other)
    }
}

impl Validator for NativeValidator {
    fn validate(&self, _values: &FormSnapshot) -> Validity {
        let fields = controls(&self.form)
            .map(|c| FieldValidity {
                name: c.name(),
                failure: failed_constraint(&c.validity()),
            })
            .collect();
        Validity { fields }
    }

    fn report(&self, _validity: &Validity) {
        let _ = self.form.report_validity();
    }
}

impl SubmitEvent for web_sys::Event {
    fn prevent_default(&self) {
        web_sys::Event::prevent_default(self);
    }
}

type WebController = FormController<DomForm, LocalStorage, NativeValidator>;

/// Run the controller's deferred work after the browser finishes the reset
fn defer_to_next_tick(controller: Rc<RefCell<WebController>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let closure = Closure::once(move || controller.borrow_mut().run_deferred());
    if let Err(e) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        closure.as_ref().unchecked_ref(),
        0,
    ) {
        log::warn!("Could not schedule deferred reset work: {:?}", e);
    }
    closure.forget();
}

fn setup_form_handlers(form: &HtmlFormElement, controller: Rc<RefCell<WebController>>) {
    // Input anywhere in the form: counter (message field) + persistence
    {
        let controller = controller.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
            let target = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.get_attribute("name"));
            controller.borrow_mut().on_input(target.as_deref());
        });
        let _ = form.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Reset
    {
        let controller = controller.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            controller.borrow_mut().on_reset();
            defer_to_next_tick(controller.clone());
        });
        let _ = form.add_event_listener_with_callback("reset", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Submit
    {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
            let outcome = controller.borrow_mut().on_submit(&event);
            log::debug!("Submit outcome: {:?}", outcome);
        });
        let _ = form.add_event_listener_with_callback("submit", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

// --- Page -------------------------------------------------------------------

/// The live document
pub struct WebPage {
    window: Window,
    document: Document,
}

impl WebPage {
    pub fn new() -> Result<Self, BootError> {
        let window = web_sys::window().ok_or_else(|| BootError::Js("no window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| BootError::Js("no document".to_string()))?;
        Ok(Self { window, document })
    }
}

impl Page for WebPage {
    fn prefers_reduced_motion(&self) -> bool {
        self.window
            .match_media(REDUCED_MOTION_QUERY)
            .ok()
            .flatten()
            .map(|query| query.matches())
            .unwrap_or(false)
    }

    fn start_rain(
        &self,
        settings: &RainSettings,
        reduced_motion: bool,
    ) -> Result<Option<usize>, BootError> {
        let (width, height) = viewport_size(&self.window);
        let mut renderer = RainRenderer::new(settings.clone(), js_sys::Date::now() as u64);
        if !renderer.start(reduced_motion, width, height) {
            // Leave the canvas untouched
            return Ok(None);
        }

        let surface = CanvasSurface::new(&self.document, &settings.canvas_id)?;
        surface.resize(width, height);
        let columns = renderer.columns();

        let rain = Rc::new(RefCell::new(RainAnimation::new(renderer, surface)));
        setup_resize_handler(&self.window, rain.clone());
        request_frame(rain, Rc::new(AnimationFrameScheduler));
        Ok(Some(columns))
    }

    fn setup_form(&self, settings: &FormSettings) -> Result<usize, BootError> {
        let view = DomForm::new(&self.document, settings)?;
        let form = view.element().clone();
        let mut controller = FormController::new(
            view,
            PersistentStore::new(LocalStorage),
            NativeValidator::new(form.clone()),
            settings.clone(),
        );
        let restored = controller.hydrate();
        setup_form_handlers(&form, Rc::new(RefCell::new(controller)));
        Ok(restored)
    }

    fn current_year(&self) -> i32 {
        js_sys::Date::new_0().get_full_year() as i32
    }

    fn set_text(&self, element_id: &str, text: &str) -> Result<(), BootError> {
        let el = self
            .document
            .get_element_by_id(element_id)
            .ok_or_else(|| BootError::MissingElement(element_id.to_string()))?;
        el.set_text_content(Some(text));
        Ok(())
    }
}

fn boot_page() {
    let settings = Settings::load();
    match WebPage::new() {
        Ok(page) => {
            let report = boot(&page, &settings);
            log::debug!("Boot report: {:?}", report);
        }
        Err(e) => log::error!("Cannot boot page: {}", e),
    }
}

/// Browser entry: logging, then bootstrap once the DOM is parsed
pub fn run() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }

    log::info!("Matrix form starting...");

    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let loading = js_sys::Reflect::get(&document, &JsValue::from_str("readyState"))
        .ok()
        .and_then(|state| state.as_string())
        .is_some_and(|state| state == "loading");

    if loading {
        let closure = Closure::once(move |_event: web_sys::Event| boot_page());
        let _ = document
            .add_event_listener_with_callback("DOMContentLoaded", closure.as_ref().unchecked_ref());
        closure.forget();
    } else {
        boot_page();
    }
}
