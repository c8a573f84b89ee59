//! Constraint validation seam
//!
//! The browser normally checks `required`, `type="email"`, `minlength` and
//! friends. [`Validator`] abstracts that so submit handling can be exercised
//! without a DOM; [`RuleValidator`] applies the same constraints in Rust.

use std::cell::Cell;

use super::controller::text_length;
use super::snapshot::FormSnapshot;
use crate::settings::FormSettings;

/// Constraint a field failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    ValueMissing,
    TypeMismatch,
    TooShort,
    TooLong,
    PatternMismatch,
    /// Any other browser-reported failure (range, step, custom error)
    Other,
}

/// Result for one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValidity {
    pub name: String,
    pub failure: Option<Constraint>,
}

impl FieldValidity {
    pub fn valid(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            failure: None,
        }
    }

    pub fn invalid(name: impl Into<String>, constraint: Constraint) -> Self {
        Self {
            name: name.into(),
            failure: Some(constraint),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.failure.is_none()
    }
}

/// Per-field outcome of one validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validity {
    pub fields: Vec<FieldValidity>,
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        self.fields.iter().all(FieldValidity::is_valid)
    }

    /// Names of failing fields, in form order
    pub fn invalid_fields(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| !f.is_valid())
            .map(|f| f.name.clone())
            .collect()
    }

    pub fn failure(&self, name: &str) -> Option<Constraint> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .and_then(|f| f.failure)
    }
}

/// Constraint checking plus a way to surface the failures to the user
pub trait Validator {
    fn validate(&self, values: &FormSnapshot) -> Validity;
    /// Show the failures (the browser highlights fields and pops a bubble)
    fn report(&self, validity: &Validity);
}

/// Value type a field accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
}

/// Constraints on one named field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

impl FieldRule {
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Text,
            required: false,
            min_length: None,
            max_length: None,
        }
    }

    pub fn email(name: impl Into<String>) -> Self {
        Self {
            kind: FieldKind::Email,
            ..Self::text(name)
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn min_length(mut self, len: usize) -> Self {
        self.min_length = Some(len);
        self
    }

    pub fn max_length(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }

    /// First failed constraint for `value`, browser order
    pub fn check(&self, value: &str) -> Option<Constraint> {
        if value.is_empty() {
            // Empty optional fields skip every other constraint
            return self.required.then_some(Constraint::ValueMissing);
        }
        if self.kind == FieldKind::Email && !is_valid_email(value) {
            return Some(Constraint::TypeMismatch);
        }
        let len = text_length(value);
        if self.min_length.is_some_and(|min| len < min) {
            return Some(Constraint::TooShort);
        }
        if self.max_length.is_some_and(|max| len > max) {
            return Some(Constraint::TooLong);
        }
        None
    }
}

/// Validator over a fixed rule list; counts how often it was asked to report
#[derive(Debug, Default)]
pub struct RuleValidator {
    rules: Vec<FieldRule>,
    reports: Cell<usize>,
}

impl RuleValidator {
    pub fn new(rules: Vec<FieldRule>) -> Self {
        Self {
            rules,
            reports: Cell::new(0),
        }
    }

    /// Constraints of the recruitment form markup, default field names
    pub fn recruitment() -> Self {
        Self::for_form(&FormSettings::default())
    }

    /// Recruitment constraints, with the name and message rules attached to
    /// the fields `settings` names
    pub fn for_form(settings: &FormSettings) -> Self {
        Self::new(vec![
            FieldRule::text(settings.name_field.as_str())
                .required()
                .min_length(2),
            FieldRule::email("email").required(),
            FieldRule::text("senha").required().min_length(8),
            FieldRule::text("pais").required(),
            FieldRule::text(settings.message_field.as_str()).max_length(500),
        ])
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn report_count(&self) -> usize {
        self.reports.get()
    }
}

impl Validator for RuleValidator {
    fn validate(&self, values: &FormSnapshot) -> Validity {
        let fields = self
            .rules
            .iter()
            .map(|rule| FieldValidity {
                name: rule.name.clone(),
                failure: rule.check(values.get(&rule.name).unwrap_or("")),
            })
            .collect();
        Validity { fields }
    }

    fn report(&self, validity: &Validity) {
        self.reports.set(self.reports.get() + 1);
        for field in validity.fields.iter().filter(|f| !f.is_valid()) {
            log::debug!("Field '{}' failed {:?}", field.name, field.failure);
        }
    }
}

/// E-mail shape check following the HTML `type="email"` rule:
/// `local@label(.label)*`, labels alphanumeric with inner hyphens
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || ".!#$%&'*+/=?^_`{|}~-".contains(c));
    let domain_ok = !domain.is_empty()
        && domain.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        });
    local_ok && domain_ok
}
