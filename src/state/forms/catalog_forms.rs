//! Ready-made forms of the catalog client

use super::field::{FieldValue, FormData};
use super::form_state::FormValidation;
use super::rules::{self, FieldRules, Locale};
use crate::state::Book;

/// Forms the client knows how to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FormKind {
    Book,
    Login,
    Register,
}

impl FormKind {
    /// Empty initial data and rules for this form
    pub fn definition(self, locale: Locale) -> (FormData, FieldRules) {
        match self {
            FormKind::Book => (empty(BOOK_FIELDS), book_rules(locale)),
            FormKind::Login => (empty(&["username", "password"]), login_rules(locale)),
            FormKind::Register => (empty(&["username", "password"]), register_rules(locale)),
        }
    }

    /// Fresh form instance for this kind
    pub fn build(self, locale: Locale) -> FormValidation {
        let (initial, rules) = self.definition(locale);
        FormValidation::new(initial, rules)
    }
}

const BOOK_FIELDS: &[&str] = &[
    "title",
    "author",
    "isbn",
    "price",
    "description",
    "coverUrl",
    "publicationYear",
    "category",
];

fn empty(fields: &[&str]) -> FormData {
    fields
        .iter()
        .map(|f| (f.to_string(), FieldValue::text("")))
        .collect()
}

pub fn book_rules(locale: Locale) -> FieldRules {
    FieldRules::new()
        .field(
            "title",
            [rules::required(), rules::min_length(2), rules::max_length(200)],
        )
        .field(
            "author",
            [rules::required(), rules::min_length(2), rules::max_length(100)],
        )
        .field("isbn", [rules::required(), rules::isbn()])
        .field("price", [rules::required(), rules::positive_number()])
        .field("description", [rules::max_length(1000)])
        .field("coverUrl", [rules::url()])
        .field("publicationYear", [rules::year()])
        .field("category", [rules::required()])
        .localized(locale)
}

pub fn login_rules(locale: Locale) -> FieldRules {
    FieldRules::new()
        .field("username", [rules::required()])
        .field("password", [rules::required()])
        .localized(locale)
}

pub fn register_rules(locale: Locale) -> FieldRules {
    FieldRules::new()
        .field(
            "username",
            [rules::required(), rules::min_length(3), rules::max_length(50)],
        )
        .field("password", [rules::required(), rules::min_length(6)])
        .localized(locale)
}

/// Empty book form for creating a new book
pub fn book_create_form(locale: Locale) -> FormValidation {
    FormKind::Book.build(locale)
}

/// Book form seeded with an existing book, for editing
pub fn book_edit_form(book: &Book, locale: Locale) -> FormValidation {
    FormValidation::new(book.to_form_data(), book_rules(locale))
}
