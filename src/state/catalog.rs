//! Catalog records exchanged with the REST backend

use crate::error::FormDataError;
use crate::state::forms::{FieldValue, FormData};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Literary category of a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookCategory {
    Roman,
    Poesie,
    Theatre,
    Essai,
    Biographie,
    Jeunesse,
}

impl BookCategory {
    pub const ALL: [BookCategory; 6] = [
        Self::Roman,
        Self::Poesie,
        Self::Theatre,
        Self::Essai,
        Self::Biographie,
        Self::Jeunesse,
    ];

    /// Wire name, as the backend spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Roman => "ROMAN",
            Self::Poesie => "POESIE",
            Self::Theatre => "THEATRE",
            Self::Essai => "ESSAI",
            Self::Biographie => "BIOGRAPHIE",
            Self::Jeunesse => "JEUNESSE",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Roman => "Roman",
            Self::Poesie => "Poésie",
            Self::Theatre => "Théâtre",
            Self::Essai => "Essai",
            Self::Biographie => "Biographie",
            Self::Jeunesse => "Jeunesse",
        }
    }
}

impl FromStr for BookCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown category `{s}`"))
    }
}

/// Book record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<i32>,
    pub category: BookCategory,
}

impl Book {
    /// Build a request payload from a validated book form snapshot
    pub fn from_form_data(data: &FormData) -> Result<Self, FormDataError> {
        let category = required_text(data, "category")?;
        let category = category
            .parse::<BookCategory>()
            .map_err(|reason| FormDataError::Invalid {
                field: "category".to_string(),
                reason,
            })?;

        let price = data
            .get("price")
            .filter(|v| !v.is_missing())
            .ok_or_else(|| FormDataError::Missing("price".to_string()))?
            .to_number()
            .ok_or_else(|| FormDataError::Invalid {
                field: "price".to_string(),
                reason: "not a number".to_string(),
            })?;

        let publication_year = match data.get("publicationYear") {
            Some(v) if !v.is_missing() => {
                let year = v.to_number().ok_or_else(|| FormDataError::Invalid {
                    field: "publicationYear".to_string(),
                    reason: "not a number".to_string(),
                })?;
                Some(year as i32)
            }
            _ => None,
        };

        Ok(Self {
            id: None,
            title: required_text(data, "title")?,
            author: required_text(data, "author")?,
            isbn: required_text(data, "isbn")?,
            price,
            description: optional_text(data, "description"),
            cover_url: optional_text(data, "coverUrl"),
            publication_year,
            category,
        })
    }

    /// Form values for editing this book
    pub fn to_form_data(&self) -> FormData {
        FormData::from([
            ("title".to_string(), FieldValue::text(&self.title)),
            ("author".to_string(), FieldValue::text(&self.author)),
            ("isbn".to_string(), FieldValue::text(&self.isbn)),
            ("price".to_string(), FieldValue::Number(self.price)),
            (
                "description".to_string(),
                FieldValue::text(self.description.clone().unwrap_or_default()),
            ),
            (
                "coverUrl".to_string(),
                FieldValue::text(self.cover_url.clone().unwrap_or_default()),
            ),
            (
                "publicationYear".to_string(),
                FieldValue::from(self.publication_year),
            ),
            (
                "category".to_string(),
                FieldValue::text(self.category.as_str()),
            ),
        ])
    }
}

fn required_text(data: &FormData, field: &str) -> Result<String, FormDataError> {
    data.get(field)
        .filter(|v| !v.is_missing())
        .map(|v| v.to_text().trim().to_string())
        .ok_or_else(|| FormDataError::Missing(field.to_string()))
}

fn optional_text(data: &FormData, field: &str) -> Option<String> {
    data.get(field)
        .filter(|v| !v.is_missing())
        .map(|v| v.to_text().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Signed-in user as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub role: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.contains("ADMIN")
    }
}

/// Login and register payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn from_form_data(data: &FormData) -> Result<Self, FormDataError> {
        Ok(Self {
            username: required_text(data, "username")?,
            // passwords are sent verbatim
            password: data
                .get("password")
                .and_then(FieldValue::as_text)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .ok_or_else(|| FormDataError::Missing("password".to_string()))?,
        })
    }
}

/// Successful login response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub username: String,
    pub role: String,
}

impl AuthResponse {
    pub fn user(&self) -> User {
        User {
            username: self.username.clone(),
            role: self.role.clone(),
        }
    }
}

/// Error body returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn create_test_book() -> Book {
        Book {
            id: Some(7),
            title: "L'Étranger".to_string(),
            author: "Albert Camus".to_string(),
            isbn: "978-2070360024".to_string(),
            price: 7.5,
            description: None,
            cover_url: Some("https://example.org/etranger.jpg".to_string()),
            publication_year: Some(1942),
            category: BookCategory::Roman,
        }
    }

    #[test]
    fn test_book_serializes_camel_case() {
        let json = serde_json::to_value(create_test_book()).unwrap();
        assert_eq!(json["coverUrl"], "https://example.org/etranger.jpg");
        assert_eq!(json["publicationYear"], 1942);
        assert_eq!(json["category"], "ROMAN");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn test_form_data_round_trip_drops_id() {
        let book = create_test_book();
        let parsed = Book::from_form_data(&book.to_form_data()).unwrap();
        assert_eq!(parsed, Book { id: None, ..book });
    }

    #[test]
    fn test_from_form_data_coerces_text_numbers() {
        let mut data = create_test_book().to_form_data();
        data.insert("price".into(), FieldValue::text("12.90"));
        data.insert("publicationYear".into(), FieldValue::text(""));
        data.insert("category".into(), FieldValue::text("poesie"));

        let book = Book::from_form_data(&data).unwrap();
        assert_eq!(book.price, 12.9);
        assert_eq!(book.publication_year, None);
        assert_eq!(book.category, BookCategory::Poesie);
    }

    #[test]
    fn test_from_form_data_reports_missing_field() {
        let mut data = create_test_book().to_form_data();
        data.insert("title".into(), FieldValue::text(""));
        assert_eq!(
            Book::from_form_data(&data),
            Err(FormDataError::Missing("title".to_string()))
        );
    }

    #[test]
    fn test_unknown_category() {
        assert!("POLAR".parse::<BookCategory>().is_err());
        assert_eq!(BookCategory::Theatre.label(), "Théâtre");
    }

    #[test]
    fn test_credentials_keep_password_whitespace() {
        let data = FormData::from([
            ("username".to_string(), FieldValue::text(" admin ")),
            ("password".to_string(), FieldValue::text(" secret ")),
        ]);
        let creds = Credentials::from_form_data(&data).unwrap();
        assert_eq!(creds.username, "admin");
        assert_eq!(creds.password, " secret ");
    }

    #[test]
    fn test_user_role() {
        let auth = AuthResponse {
            token: "t".into(),
            username: "admin".into(),
            role: "ROLE_ADMIN".into(),
        };
        assert!(auth.user().is_admin());
    }
}
