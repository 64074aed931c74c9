//! Edition forms - form state and validation for the Edition catalog client
//!
//! The core is [`FormValidation`]: per-form values, error slots and touched
//! flags, driven by blur/input/submit events and checked against ordered
//! rule sequences from the [`rules`] library.

pub mod api;
pub mod config;
pub mod error;
pub mod state;

pub use error::{ApiError, FormDataError, RuleError};
pub use state::forms::rules;
pub use state::{
    FieldRules, FieldStatus, FieldValue, FormData, FormKind, FormValidation, Locale,
    ValidationRule,
};
