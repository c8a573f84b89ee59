//! Form state machine: hydrate, count, persist, reset, submit

use super::feedback::Feedback;
use super::snapshot::FormSnapshot;
use super::validate::Validator;
use crate::persistence::{PersistentStore, StorageBackend};
use crate::settings::FormSettings;

/// The form and the elements around it, as the controller sees them.
///
/// Optional elements (counter, feedback) report whether they exist so a
/// page without them keeps working.
pub trait FormView {
    /// Current value of every named field
    fn snapshot(&self) -> FormSnapshot;
    fn field_value(&self, name: &str) -> Option<String>;
    /// Assign a field; false when the form has no field by that name
    fn set_field(&mut self, name: &str, value: &str) -> bool;
    /// Update the counter text; false when there is no counter element
    fn set_counter(&mut self, text: &str) -> bool;
    /// Render feedback; false when there is no feedback element
    fn show_feedback(&mut self, feedback: &Feedback) -> bool;
}

/// The submit event, so the default navigation can be suppressed
pub trait SubmitEvent {
    fn prevent_default(&self);
}

/// What a submit attempt ended in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Constraints failed; names of the failing fields
    Rejected { invalid: Vec<String> },
    Accepted { display_name: String },
}

/// Length as the browser reports it for a field value (UTF-16 code units)
pub fn text_length(value: &str) -> usize {
    value.encode_utf16().count()
}

/// First space-delimited word of `full_name`, or `fallback` when that is empty
pub fn display_name(full_name: &str, fallback: &str) -> String {
    full_name
        .split(' ')
        .next()
        .filter(|first| !first.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Bridges the form, the persistent store and the counter/feedback area
pub struct FormController<V, B, X> {
    view: V,
    store: PersistentStore<B>,
    validator: X,
    settings: FormSettings,
    /// Feedback clear waiting for the tick after a reset
    clear_pending: bool,
}

impl<V: FormView, B: StorageBackend, X: Validator> FormController<V, B, X> {
    pub fn new(view: V, store: PersistentStore<B>, validator: X, settings: FormSettings) -> Self {
        Self {
            view,
            store,
            validator,
            settings,
            clear_pending: false,
        }
    }

    /// Restore saved values into matching fields; returns how many were restored
    pub fn hydrate(&mut self) -> usize {
        let saved = self
            .store
            .get(&self.settings.storage_key, FormSnapshot::new());

        let mut restored = 0;
        for (name, value) in saved.iter() {
            if self.view.set_field(name, value) {
                restored += 1;
            } else {
                log::debug!("Saved field '{}' no longer in form, skipped", name);
            }
        }

        if let Some(message) = saved.get(&self.settings.message_field) {
            let has_field = self.view.field_value(&self.settings.message_field).is_some();
            if has_field && !message.is_empty() {
                self.view.set_counter(&text_length(message).to_string());
            }
        }

        if restored > 0 {
            log::info!("Restored {} saved field(s)", restored);
        }
        restored
    }

    /// Any input inside the form; `target` is the name of the edited field
    pub fn on_input(&mut self, target: Option<&str>) {
        if target == Some(self.settings.message_field.as_str()) {
            self.update_counter();
        }
        self.persist();
    }

    /// Write the full current snapshot
    pub fn persist(&mut self) {
        let snapshot = self.view.snapshot();
        self.store.set(&self.settings.storage_key, &snapshot);
    }

    /// Form reset: forget saved data, zero the counter, and queue the
    /// feedback clear for [`run_deferred`](Self::run_deferred)
    pub fn on_reset(&mut self) {
        self.store.del(&self.settings.storage_key);
        self.view.set_counter("0");
        self.clear_pending = true;
        log::info!("Form reset, saved data cleared");
    }

    pub fn has_deferred(&self) -> bool {
        self.clear_pending
    }

    /// Work queued for the tick after a reset, once the browser has reset the fields
    pub fn run_deferred(&mut self) {
        if std::mem::take(&mut self.clear_pending) {
            self.view.show_feedback(&Feedback::none());
        }
    }

    /// Validate and greet. Saved data is kept on success so repeated
    /// submissions in the same session start pre-filled.
    pub fn on_submit<E: SubmitEvent + ?Sized>(&mut self, event: &E) -> SubmitOutcome {
        event.prevent_default();
        self.view.show_feedback(&Feedback::none());

        let values = self.view.snapshot();
        let validity = self.validator.validate(&values);
        if !validity.is_valid() {
            self.validator.report(&validity);
            self.view.show_feedback(&Feedback::error());
            let invalid = validity.invalid_fields();
            log::debug!("Submit rejected: {:?}", invalid);
            return SubmitOutcome::Rejected { invalid };
        }

        let full_name = self
            .view
            .field_value(&self.settings.name_field)
            .unwrap_or_default();
        let display_name = display_name(&full_name, &self.settings.default_name);
        self.view.show_feedback(&Feedback::success(&display_name));
        log::info!("Submit accepted");
        SubmitOutcome::Accepted { display_name }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn store(&self) -> &PersistentStore<B> {
        &self.store
    }

    pub fn validator(&self) -> &X {
        &self.validator
    }

    fn update_counter(&mut self) {
        if let Some(message) = self.view.field_value(&self.settings.message_field) {
            self.view.set_counter(&text_length(&message).to_string());
        }
    }
}
