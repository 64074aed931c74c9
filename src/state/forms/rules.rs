//! Validation rules and the predefined rule library
//!
//! A [`ValidationRule`] is a small tagged value: the rule kind with its
//! parameters, an optional override message and the locale of its default
//! message. Every rule except [`required`] passes on empty input, so
//! optional rules compose on the same field without repeating a
//! "is this field set" check.
//!
//! Numeric rules treat unparseable input differently: [`positive_number`]
//! and [`year`] fail on it, while [`min`] and [`max`] skip it.

use super::field::FieldValue;
use crate::error::RuleError;
use chrono::Datelike;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, LazyLock};

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email regex"));
static ISBN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^978-[0-9]{10}$").expect("static isbn regex"));

/// Earliest accepted publication year (movable type)
pub const EARLIEST_YEAR: i32 = 1450;

/// `Ok(())` when the value passes, otherwise the user-facing message
pub type RuleOutcome = Result<(), String>;

type CustomCheck = Arc<dyn Fn(&FieldValue) -> RuleOutcome + Send + Sync>;

/// Language of the default messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Fr,
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "fr" => Ok(Locale::Fr),
            other => Err(format!("unknown locale `{other}` (expected en or fr)")),
        }
    }
}

/// Rule kind with its parameters
#[derive(Clone)]
pub enum RuleKind {
    Required,
    MinLength(usize),
    MaxLength(usize),
    Email,
    Isbn,
    PositiveNumber,
    Min(f64),
    Max(f64),
    Year,
    Pattern(Regex),
    Url,
    Custom { name: String, check: CustomCheck },
}

impl fmt::Debug for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Required => f.write_str("Required"),
            RuleKind::MinLength(n) => write!(f, "MinLength({n})"),
            RuleKind::MaxLength(n) => write!(f, "MaxLength({n})"),
            RuleKind::Email => f.write_str("Email"),
            RuleKind::Isbn => f.write_str("Isbn"),
            RuleKind::PositiveNumber => f.write_str("PositiveNumber"),
            RuleKind::Min(n) => write!(f, "Min({n})"),
            RuleKind::Max(n) => write!(f, "Max({n})"),
            RuleKind::Year => f.write_str("Year"),
            RuleKind::Pattern(re) => write!(f, "Pattern({})", re.as_str()),
            RuleKind::Url => f.write_str("Url"),
            RuleKind::Custom { name, .. } => write!(f, "Custom({name})"),
        }
    }
}

/// A single configured validator
#[derive(Debug, Clone)]
pub struct ValidationRule {
    kind: RuleKind,
    message: Option<String>,
    locale: Locale,
}

impl ValidationRule {
    fn new(kind: RuleKind) -> Self {
        Self {
            kind,
            message: None,
            locale: Locale::default(),
        }
    }

    /// Wrap an arbitrary check. The check must be pure.
    pub fn custom(
        name: impl Into<String>,
        check: impl Fn(&FieldValue) -> RuleOutcome + Send + Sync + 'static,
    ) -> Self {
        Self::new(RuleKind::Custom {
            name: name.into(),
            check: Arc::new(check),
        })
    }

    /// Replace the default failure message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Pick the language of the default failure message
    pub fn localized(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Evaluate the rule against a value
    pub fn validate(&self, value: &FieldValue) -> RuleOutcome {
        let passes = match &self.kind {
            RuleKind::Required => !value.is_missing(),
            RuleKind::MinLength(min) => value.is_blank() || value.length().is_none_or(|l| l >= *min),
            RuleKind::MaxLength(max) => value.is_blank() || value.length().is_none_or(|l| l <= *max),
            RuleKind::Email => value.is_blank() || EMAIL_REGEX.is_match(&value.to_text()),
            RuleKind::Isbn => value.is_blank() || ISBN_REGEX.is_match(&value.to_text()),
            RuleKind::Pattern(re) => value.is_blank() || re.is_match(&value.to_text()),
            RuleKind::Url => value.is_blank() || url::Url::parse(&value.to_text()).is_ok(),
            RuleKind::PositiveNumber => {
                value.is_missing() || value.to_number().is_some_and(|n| n >= 0.0)
            }
            RuleKind::Min(min) => value.is_missing() || value.to_number().is_none_or(|n| n >= *min),
            RuleKind::Max(max) => value.is_missing() || value.to_number().is_none_or(|n| n <= *max),
            RuleKind::Year => {
                let latest = chrono::Local::now().year() + 1;
                value.is_missing()
                    || value
                        .to_number()
                        .is_some_and(|y| y >= f64::from(EARLIEST_YEAR) && y <= f64::from(latest))
            }
            RuleKind::Custom { check, .. } => {
                return check(value).map_err(|msg| self.message.clone().unwrap_or(msg));
            }
        };

        if passes {
            Ok(())
        } else {
            Err(self.message())
        }
    }

    /// The message reported on failure
    pub fn message(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| default_message(&self.kind, self.locale))
    }
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            RuleKind::Required => f.write_str("required"),
            RuleKind::MinLength(n) => write!(f, "minLength({n})"),
            RuleKind::MaxLength(n) => write!(f, "maxLength({n})"),
            RuleKind::Email => f.write_str("email"),
            RuleKind::Isbn => f.write_str("isbn"),
            RuleKind::PositiveNumber => f.write_str("positiveNumber"),
            RuleKind::Min(n) => write!(f, "min({n})"),
            RuleKind::Max(n) => write!(f, "max({n})"),
            RuleKind::Year => f.write_str("year"),
            RuleKind::Pattern(re) => write!(f, "pattern(/{}/)", re.as_str()),
            RuleKind::Url => f.write_str("url"),
            RuleKind::Custom { name, .. } => f.write_str(name),
        }
    }
}

fn default_message(kind: &RuleKind, locale: Locale) -> String {
    match (kind, locale) {
        (RuleKind::Required, Locale::En) => "This field is required".to_string(),
        (RuleKind::Required, Locale::Fr) => "Ce champ est obligatoire".to_string(),
        (RuleKind::MinLength(n), Locale::En) => format!("Minimum {n} characters required"),
        (RuleKind::MinLength(n), Locale::Fr) => format!("Minimum {n} caractères requis"),
        (RuleKind::MaxLength(n), Locale::En) => format!("Maximum {n} characters allowed"),
        (RuleKind::MaxLength(n), Locale::Fr) => format!("Maximum {n} caractères autorisés"),
        (RuleKind::Email, Locale::En) => "Invalid email address".to_string(),
        (RuleKind::Email, Locale::Fr) => "Adresse email invalide".to_string(),
        (RuleKind::Isbn, Locale::En) => "Invalid ISBN format (e.g., 978-2070360024)".to_string(),
        (RuleKind::Isbn, Locale::Fr) => "Format ISBN invalide (ex: 978-2070360024)".to_string(),
        (RuleKind::PositiveNumber, Locale::En) => "Must be a positive number".to_string(),
        (RuleKind::PositiveNumber, Locale::Fr) => "Doit être un nombre positif".to_string(),
        (RuleKind::Min(n), Locale::En) => format!("Minimum value is {n}"),
        (RuleKind::Min(n), Locale::Fr) => format!("La valeur minimale est {n}"),
        (RuleKind::Max(n), Locale::En) => format!("Maximum value is {n}"),
        (RuleKind::Max(n), Locale::Fr) => format!("La valeur maximale est {n}"),
        (RuleKind::Year, Locale::En) => "Invalid year".to_string(),
        (RuleKind::Year, Locale::Fr) => "Année invalide".to_string(),
        (RuleKind::Url, Locale::En) => "Invalid URL".to_string(),
        (RuleKind::Url, Locale::Fr) => "URL invalide".to_string(),
        // pattern always carries its message, custom checks produce their own
        (RuleKind::Pattern(re), _) => format!("Must match {}", re.as_str()),
        (RuleKind::Custom { name, .. }, _) => format!("Failed {name}"),
    }
}

/// Rejects absent values, empty text and empty lists
pub fn required() -> ValidationRule {
    ValidationRule::new(RuleKind::Required)
}

/// Fails when the text (or list) is shorter than `min`
pub fn min_length(min: usize) -> ValidationRule {
    ValidationRule::new(RuleKind::MinLength(min))
}

/// Fails when the text (or list) is longer than `max`
pub fn max_length(max: usize) -> ValidationRule {
    ValidationRule::new(RuleKind::MaxLength(max))
}

pub fn email() -> ValidationRule {
    ValidationRule::new(RuleKind::Email)
}

/// `978-` followed by exactly ten digits
pub fn isbn() -> ValidationRule {
    ValidationRule::new(RuleKind::Isbn)
}

/// Fails on negative or non-numeric input
pub fn positive_number() -> ValidationRule {
    ValidationRule::new(RuleKind::PositiveNumber)
}

/// Fails on numbers below `min`; non-numeric input passes
pub fn min(min: f64) -> ValidationRule {
    ValidationRule::new(RuleKind::Min(min))
}

/// Fails on numbers above `max`; non-numeric input passes
pub fn max(max: f64) -> ValidationRule {
    ValidationRule::new(RuleKind::Max(max))
}

/// Accepts years from 1450 up to next calendar year
pub fn year() -> ValidationRule {
    ValidationRule::new(RuleKind::Year)
}

/// Fails when the value does not match `pattern` (unanchored search)
pub fn pattern(pattern: &str, message: impl Into<String>) -> Result<ValidationRule, RuleError> {
    let re = Regex::new(pattern).map_err(|source| RuleError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;
    Ok(ValidationRule::new(RuleKind::Pattern(re)).with_message(message))
}

/// Fails when the value is not an absolute URL
pub fn url() -> ValidationRule {
    ValidationRule::new(RuleKind::Url)
}

/// Rule registry: field name to ordered rule sequence, in declaration order
#[derive(Debug, Clone, Default)]
pub struct FieldRules {
    entries: Vec<(String, Vec<ValidationRule>)>,
}

impl FieldRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the rules for a field. Registering a field twice replaces
    /// its rules but keeps its original position.
    pub fn field(
        mut self,
        name: impl Into<String>,
        rules: impl IntoIterator<Item = ValidationRule>,
    ) -> Self {
        let name = name.into();
        let rules: Vec<ValidationRule> = rules.into_iter().collect();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = rules,
            None => self.entries.push((name, rules)),
        }
        self
    }

    /// Rules for a field, if any are registered
    pub fn get(&self, field: &str) -> Option<&[ValidationRule]> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, rules)| rules.as_slice())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Registered field names in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ValidationRule])> {
        self.entries
            .iter()
            .map(|(name, rules)| (name.as_str(), rules.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Switch every rule's default messages to `locale`
    pub fn localized(mut self, locale: Locale) -> Self {
        for (_, rules) in &mut self.entries {
            for rule in rules.iter_mut() {
                rule.locale = locale;
            }
        }
        self
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<ValidationRule>)> for FieldRules {
    fn from_iter<I: IntoIterator<Item = (S, Vec<ValidationRule>)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(FieldRules::new(), |rules, (name, seq)| rules.field(name, seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> FieldValue {
        FieldValue::text(s)
    }

    fn err(rule: &ValidationRule, value: FieldValue) -> String {
        rule.validate(&value).unwrap_err()
    }

    #[test]
    fn test_required() {
        let rule = required();
        assert_eq!(err(&rule, FieldValue::Absent), "This field is required");
        assert_eq!(err(&rule, text("")), "This field is required");
        assert!(rule.validate(&FieldValue::List(vec![])).is_err());
        assert!(rule.validate(&text(" ")).is_ok());
        assert!(rule.validate(&FieldValue::Number(0.0)).is_ok());
        assert!(rule.validate(&FieldValue::Bool(false)).is_ok());
    }

    #[test]
    fn test_length_bounds() {
        assert_eq!(
            err(&min_length(3), text("ab")),
            "Minimum 3 characters required"
        );
        assert!(min_length(3).validate(&text("abc")).is_ok());
        assert!(min_length(3).validate(&text("")).is_ok());
        assert!(min_length(3).validate(&FieldValue::Number(5.0)).is_ok());

        assert_eq!(
            err(&max_length(2), text("abc")),
            "Maximum 2 characters allowed"
        );
        assert!(max_length(2).validate(&text("ab")).is_ok());
        assert!(max_length(1)
            .validate(&FieldValue::List(vec!["a".into(), "b".into()]))
            .is_err());
    }

    #[test]
    fn test_email() {
        let rule = email();
        assert!(rule.validate(&text("reader@example.org")).is_ok());
        assert!(rule.validate(&text("")).is_ok());
        assert_eq!(err(&rule, text("reader@example")), "Invalid email address");
        assert!(rule.validate(&text("a b@example.org")).is_err());
        assert!(rule.validate(&text("a@@b.c")).is_err());
    }

    #[test]
    fn test_isbn() {
        let rule = isbn();
        assert!(rule.validate(&text("978-2070360024")).is_ok());
        assert_eq!(
            err(&rule, text("123-456")),
            "Invalid ISBN format (e.g., 978-2070360024)"
        );
        assert!(rule.validate(&text("978-207036002")).is_err());
        assert!(rule.validate(&text("978-20703600245")).is_err());
        assert!(rule.validate(&text("979-2070360024")).is_err());
    }

    #[test]
    fn test_positive_number() {
        let rule = positive_number();
        assert!(rule.validate(&text("12.5")).is_ok());
        assert!(rule.validate(&FieldValue::Number(0.0)).is_ok());
        assert!(rule.validate(&FieldValue::Absent).is_ok());
        assert!(rule.validate(&text("")).is_ok());
        assert_eq!(err(&rule, text("-1")), "Must be a positive number");
        assert_eq!(err(&rule, text("abc")), "Must be a positive number");
        assert_eq!(err(&rule, text("0x+1F")), "Must be a positive number");
        assert!(rule.validate(&text("0x1F")).is_ok());
    }

    #[test]
    fn test_min_max_skip_non_numeric() {
        assert!(min(0.0).validate(&text("abc")).is_ok());
        assert!(max(100.0).validate(&text("abc")).is_ok());
        assert_eq!(err(&min(0.0), text("-3")), "Minimum value is 0");
        assert_eq!(err(&max(100.0), FieldValue::Number(101.0)), "Maximum value is 100");
        assert_eq!(err(&min(2.5), FieldValue::Number(1.0)), "Minimum value is 2.5");
        assert!(max(100.0).validate(&FieldValue::Number(100.0)).is_ok());
    }

    #[test]
    fn test_year() {
        let rule = year();
        let current = chrono::Local::now().year();
        assert_eq!(err(&rule, FieldValue::Number(1400.0)), "Invalid year");
        assert!(rule.validate(&FieldValue::Number(1450.0)).is_ok());
        assert!(rule.validate(&FieldValue::Number(2024.0)).is_ok());
        assert!(rule.validate(&FieldValue::from(current + 1)).is_ok());
        assert!(rule.validate(&FieldValue::from(current + 2)).is_err());
        assert!(rule.validate(&text("abc")).is_err());
        assert!(rule.validate(&FieldValue::Absent).is_ok());
    }

    #[test]
    fn test_pattern() {
        let rule = pattern(r"^[A-Z]", "Must start with a capital").unwrap();
        assert!(rule.validate(&text("Hugo")).is_ok());
        assert!(rule.validate(&text("")).is_ok());
        assert_eq!(err(&rule, text("hugo")), "Must start with a capital");
    }

    #[test]
    fn test_pattern_rejects_bad_regex_at_construction() {
        let result = pattern("(unclosed", "never used");
        assert!(matches!(result, Err(RuleError::InvalidPattern { .. })));
    }

    #[test]
    fn test_url() {
        let rule = url();
        assert!(rule.validate(&text("https://example.org/cover.jpg")).is_ok());
        assert!(rule.validate(&text("")).is_ok());
        assert_eq!(err(&rule, text("not a url")), "Invalid URL");
        assert!(rule.validate(&text("/relative/path")).is_err());
    }

    #[test]
    fn test_message_override_and_locale() {
        assert_eq!(err(&required().with_message("Title?"), text("")), "Title?");
        assert_eq!(
            err(&required().localized(Locale::Fr), text("")),
            "Ce champ est obligatoire"
        );
        assert_eq!(
            err(&min_length(2).localized(Locale::Fr), text("a")),
            "Minimum 2 caractères requis"
        );
    }

    #[test]
    fn test_custom_rule() {
        let rule = ValidationRule::custom("even", |v| match v.to_number() {
            Some(n) if n % 2.0 == 0.0 => Ok(()),
            _ => Err("Must be even".to_string()),
        });
        assert!(rule.validate(&FieldValue::Number(4.0)).is_ok());
        assert_eq!(err(&rule, FieldValue::Number(3.0)), "Must be even");
        assert_eq!(
            err(&rule.clone().with_message("Odd!"), FieldValue::Number(3.0)),
            "Odd!"
        );
        assert_eq!(rule.to_string(), "even");
    }

    #[test]
    fn test_field_rules_keep_declaration_order() {
        let rules = FieldRules::new()
            .field("zeta", [required()])
            .field("alpha", [required(), email()])
            .field("zeta", [isbn()]);

        assert_eq!(rules.fields().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
        assert_eq!(rules.get("zeta").unwrap().len(), 1);
        assert_eq!(rules.get("alpha").unwrap().len(), 2);
        assert!(rules.get("missing").is_none());
    }

    #[test]
    fn test_locale_from_str() {
        assert_eq!("FR".parse::<Locale>(), Ok(Locale::Fr));
        assert!("de".parse::<Locale>().is_err());
    }
}
