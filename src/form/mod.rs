//! Recruitment form UX
//!
//! Live character counting, snapshot persistence on every input, friendly
//! validation feedback on submit. The DOM and the browser's constraint
//! validation sit behind [`FormView`] and [`Validator`].

mod controller;
mod feedback;
mod snapshot;
mod validate;

pub use controller::{FormController, FormView, SubmitEvent, SubmitOutcome, text_length};
pub use feedback::{Feedback, FeedbackKind};
pub use snapshot::FormSnapshot;
pub use validate::{
    Constraint, FieldKind, FieldRule, FieldValidity, RuleValidator, Validator, Validity,
};
