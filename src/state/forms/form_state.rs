//! Form state and the validation controller

use super::field::{FieldValue, FormData};
use super::reactive::{Computed, Observable, Subscription};
use super::rules::FieldRules;
use std::collections::{BTreeMap, BTreeSet};

/// Field name to the message of its first failing rule
pub type FieldErrors = BTreeMap<String, String>;

/// Fields the user interacted with or that were force-validated
pub type TouchedFields = BTreeSet<String>;

/// Observable state of one form instance
#[derive(Debug, Clone)]
pub struct FormState {
    pub form_data: Observable<FormData>,
    pub errors: Observable<FieldErrors>,
    pub touched: Observable<TouchedFields>,
}

impl FormState {
    fn new(initial: FormData) -> Self {
        Self {
            form_data: Observable::new(initial),
            errors: Observable::new(FieldErrors::new()),
            touched: Observable::new(TouchedFields::new()),
        }
    }
}

/// Display state of a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus {
    Untouched,
    Valid,
    Invalid,
}

/// Validation controller for one form instance
///
/// Holds the form values, the error slots and the touched set, validates
/// fields against their registered rules and exposes the derived
/// `is_valid`/`is_dirty` flags. Entry points map to UI events: blur to
/// [`handle_blur`](Self::handle_blur), input to
/// [`handle_input`](Self::handle_input), submit to
/// [`validate_all`](Self::validate_all).
pub struct FormValidation {
    initial: FormData,
    rules: FieldRules,
    state: FormState,
    is_valid: Computed<bool>,
    is_dirty: Computed<bool>,
}

impl std::fmt::Debug for FormValidation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormValidation")
            .field("state", &self.state)
            .field("fields", &self.rules.fields().collect::<Vec<_>>())
            .finish()
    }
}

impl FormValidation {
    /// Create a form seeded from `initial`. The snapshot is kept for
    /// [`reset_form`](Self::reset_form) and never changes afterwards.
    pub fn new(initial: FormData, rules: FieldRules) -> Self {
        let state = FormState::new(initial.clone());
        let is_valid = Computed::map2(&state.errors, &state.touched, |errors, touched| {
            errors.is_empty() && !touched.is_empty()
        });
        let is_dirty = Computed::map(&state.touched, |touched| !touched.is_empty());
        Self {
            initial,
            rules,
            state,
            is_valid,
            is_dirty,
        }
    }

    /// No errors and at least one touched field. A pristine form is
    /// neither valid nor invalid, so this stays false until interaction.
    pub fn is_valid(&self) -> bool {
        self.is_valid.get()
    }

    /// At least one field was touched
    pub fn is_dirty(&self) -> bool {
        self.is_dirty.get()
    }

    /// Run the rules of `field` against its current value. Fields without
    /// rules are always valid. Stops at the first failing rule and stores
    /// its message; a pass clears any stored error. Never touches the field.
    pub fn validate_field(&self, field: &str) -> bool {
        let Some(rules) = self.rules.get(field) else {
            return true;
        };

        let value = self
            .state
            .form_data
            .with(|data| data.get(field).cloned().unwrap_or_default());

        for rule in rules {
            if let Err(message) = rule.validate(&value) {
                tracing::debug!(field, rule = %rule, %message, "Field failed validation");
                self.state.errors.update(|errors| {
                    errors.insert(field.to_string(), message);
                });
                return false;
            }
        }

        tracing::trace!(field, "Field passed validation");
        self.state.errors.update(|errors| {
            errors.remove(field);
        });
        true
    }

    /// Touch every registered field, then validate each in registration
    /// order. Used before submission.
    pub fn validate_all(&self) -> bool {
        self.state.touched.update(|touched| {
            touched.extend(self.rules.fields().map(str::to_string));
        });

        let valid = self
            .rules
            .fields()
            .fold(true, |valid, field| self.validate_field(field) && valid);
        tracing::debug!(valid, fields = self.rules.len(), "Validated whole form");
        valid
    }

    /// Field lost focus: touch it and validate it
    pub fn handle_blur(&self, field: &str) {
        self.touch(field);
        self.validate_field(field);
    }

    /// Field changed: re-validate only once it has been touched, so no
    /// error shows while the user is still typing a first value
    pub fn handle_input(&self, field: &str) {
        if self.is_touched(field) {
            self.validate_field(field);
        }
    }

    /// Restore every value from the initial snapshot and clear errors and
    /// touched flags. Keys added after construction become absent.
    pub fn reset_form(&self) {
        self.state.form_data.update(|data| {
            for (key, value) in data.iter_mut() {
                *value = self.initial.get(key).cloned().unwrap_or_default();
            }
            for (key, value) in &self.initial {
                data.entry(key.clone()).or_insert_with(|| value.clone());
            }
        });
        self.state.errors.update(BTreeMap::clear);
        self.state.touched.update(BTreeSet::clear);
        tracing::debug!("Form reset to initial values");
    }

    /// Shallow-merge values into the form. Does not validate.
    pub fn set_form_data<K, V>(&self, partial: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let partial: Vec<(String, FieldValue)> = partial
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.state.form_data.update(|data| data.extend(partial));
    }

    /// Set one value. Does not validate.
    pub fn set_value(&self, field: &str, value: impl Into<FieldValue>) {
        self.set_form_data([(field, value.into())]);
    }

    /// Error message to display for `field`: only once the field is touched
    pub fn get_error(&self, field: &str) -> Option<String> {
        if !self.is_touched(field) {
            return None;
        }
        self.state.errors.with(|errors| errors.get(field).cloned())
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.get_error(field).is_some()
    }

    /// Independent copy of the current values
    pub fn get_form_data(&self) -> FormData {
        self.state.form_data.get()
    }

    /// Current value of one field
    pub fn value(&self, field: &str) -> FieldValue {
        self.state
            .form_data
            .with(|data| data.get(field).cloned().unwrap_or_default())
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.state.touched.with(|touched| touched.contains(field))
    }

    pub fn status(&self, field: &str) -> FieldStatus {
        if !self.is_touched(field) {
            FieldStatus::Untouched
        } else if self.state.errors.with(|errors| errors.contains_key(field)) {
            FieldStatus::Invalid
        } else {
            FieldStatus::Valid
        }
    }

    /// Snapshot of all stored errors, touched or not
    pub fn errors(&self) -> FieldErrors {
        self.state.errors.get()
    }

    pub fn touched(&self) -> TouchedFields {
        self.state.touched.get()
    }

    pub fn rules(&self) -> &FieldRules {
        &self.rules
    }

    /// Observable state, for hosts binding views to it
    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Called after every change to the error map
    pub fn on_errors_change(&self, callback: impl Fn(&FieldErrors) + 'static) -> Subscription {
        self.state.errors.subscribe(callback)
    }

    /// Called after every change to the touched set
    pub fn on_touched_change(&self, callback: impl Fn(&TouchedFields) + 'static) -> Subscription {
        self.state.touched.subscribe(callback)
    }

    fn touch(&self, field: &str) {
        self.state.touched.update(|touched| {
            touched.insert(field.to_string());
        });
    }
}
