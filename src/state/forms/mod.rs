//! Form domain layer
//!
//! Form values, the rule library and the validation controller that ties
//! them to blur/input/submit events.

mod catalog_forms;
mod field;
mod form_state;
mod reactive;
pub mod rules;

pub use catalog_forms::{
    book_create_form, book_edit_form, book_rules, login_rules, register_rules, FormKind,
};
pub use field::{FieldValue, FormData};
pub use form_state::{FieldErrors, FieldStatus, FormState, FormValidation, TouchedFields};
pub use reactive::{Computed, Observable, Subscription};
pub use rules::{FieldRules, Locale, RuleKind, RuleOutcome, ValidationRule};
