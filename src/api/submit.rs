//! Submit orchestration: validate the whole form, then call the backend

use super::traits::{ApiResult, CatalogApi};
use crate::error::ApiError;
use crate::state::{AuthResponse, Book, Credentials, FormValidation};

/// What happened to a submission
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<T> {
    /// Client-side validation failed; the backend was not called
    Invalid,
    /// The backend accepted the request
    Accepted(T),
    /// The backend refused the request. Not written into the form errors.
    Rejected {
        message: String,
        field: Option<String>,
    },
}

impl<T> SubmitOutcome<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted(_))
    }
}

fn settle<T>(result: ApiResult<T>) -> ApiResult<SubmitOutcome<T>> {
    match result {
        Ok(value) => Ok(SubmitOutcome::Accepted(value)),
        Err(ApiError::Rejected {
            status,
            message,
            field,
        }) => {
            tracing::warn!(status, %message, ?field, "Backend rejected submission");
            Ok(SubmitOutcome::Rejected { message, field })
        }
        Err(err) => Err(err),
    }
}

/// Create the book (`id` is `None`) or update it
pub async fn submit_book<A>(
    form: &FormValidation,
    api: &mut A,
    id: Option<i64>,
) -> ApiResult<SubmitOutcome<Book>>
where
    A: CatalogApi + ?Sized,
{
    if !form.validate_all() {
        tracing::info!("Book form has errors, not submitting");
        return Ok(SubmitOutcome::Invalid);
    }

    let book = Book::from_form_data(&form.get_form_data())?;
    let result = match id {
        Some(id) => {
            tracing::info!(id, "Updating book");
            api.update_book(id, &book).await
        }
        None => {
            tracing::info!(isbn = %book.isbn, "Creating book");
            api.create_book(&book).await
        }
    };
    settle(result)
}

pub async fn submit_login<A>(
    form: &FormValidation,
    api: &mut A,
) -> ApiResult<SubmitOutcome<AuthResponse>>
where
    A: CatalogApi + ?Sized,
{
    if !form.validate_all() {
        return Ok(SubmitOutcome::Invalid);
    }
    let credentials = Credentials::from_form_data(&form.get_form_data())?;
    tracing::info!(username = %credentials.username, "Logging in");
    settle(api.login(&credentials).await)
}

pub async fn submit_register<A>(
    form: &FormValidation,
    api: &mut A,
) -> ApiResult<SubmitOutcome<()>>
where
    A: CatalogApi + ?Sized,
{
    if !form.validate_all() {
        return Ok(SubmitOutcome::Invalid);
    }
    let credentials = Credentials::from_form_data(&form.get_form_data())?;
    tracing::info!(username = %credentials.username, "Registering");
    settle(api.register(&credentials).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockCatalogApi;
    use crate::state::{book_create_form, book_edit_form, BookCategory, FormKind, Locale};
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;
    use tokio_test::{assert_err, assert_ok};

    fn create_test_book() -> Book {
        Book {
            id: Some(3),
            title: "Huis clos".to_string(),
            author: "Jean-Paul Sartre".to_string(),
            isbn: "978-2070368075".to_string(),
            price: 6.2,
            description: Some("Pièce en un acte".to_string()),
            cover_url: None,
            publication_year: Some(1944),
            category: BookCategory::Theatre,
        }
    }

    #[tokio::test]
    async fn test_invalid_form_never_calls_backend() {
        let form = book_create_form(Locale::En);
        let mut api = MockCatalogApi::new();
        api.expect_create_book().never();

        let outcome = assert_ok!(submit_book(&form, &mut api, None).await);
        assert_eq!(outcome, SubmitOutcome::Invalid);
        assert!(form.is_dirty());
    }

    #[tokio::test]
    async fn test_create_sends_payload_without_id() {
        let form = book_create_form(Locale::En);
        form.set_form_data(create_test_book().to_form_data());

        let mut api = MockCatalogApi::new();
        api.expect_create_book()
            .withf(|book| book.id.is_none() && book.title == "Huis clos")
            .times(1)
            .returning(|book| {
                Ok(Book {
                    id: Some(42),
                    ..book.clone()
                })
            });

        let outcome = assert_ok!(submit_book(&form, &mut api, None).await);
        match outcome {
            SubmitOutcome::Accepted(book) => assert_eq!(book.id, Some(42)),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_uses_id() {
        let book = create_test_book();
        let form = book_edit_form(&book, Locale::En);

        let mut api = MockCatalogApi::new();
        api.expect_update_book()
            .with(eq(3), mockall::predicate::always())
            .times(1)
            .returning(|id, book| {
                Ok(Book {
                    id: Some(id),
                    ..book.clone()
                })
            });

        let outcome = assert_ok!(submit_book(&form, &mut api, Some(3)).await);
        assert!(outcome.is_accepted());
    }

    #[tokio::test]
    async fn test_rejection_is_reported_not_stored() {
        let form = book_edit_form(&create_test_book(), Locale::En);

        let mut api = MockCatalogApi::new();
        api.expect_create_book().returning(|_| {
            Err(ApiError::Rejected {
                status: 409,
                message: "ISBN already exists".to_string(),
                field: Some("isbn".to_string()),
            })
        });

        let outcome = assert_ok!(submit_book(&form, &mut api, None).await);
        assert_eq!(
            outcome,
            SubmitOutcome::Rejected {
                message: "ISBN already exists".to_string(),
                field: Some("isbn".to_string()),
            }
        );
        assert!(form.errors().is_empty());
        assert!(form.is_valid());
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let form = FormKind::Login.build(Locale::En);
        form.set_form_data([("username", "admin"), ("password", "admin123")]);

        let mut api = MockCatalogApi::new();
        api.expect_login()
            .returning(|_| Err(ApiError::Transport("connection refused".to_string())));

        let err = assert_err!(submit_login(&form, &mut api).await);
        assert_eq!(err, ApiError::Transport("connection refused".to_string()));
    }

    #[tokio::test]
    async fn test_login_success() {
        let form = FormKind::Login.build(Locale::En);
        form.set_form_data([("username", "admin"), ("password", "admin123")]);

        let mut api = MockCatalogApi::new();
        api.expect_login()
            .withf(|c| c.username == "admin" && c.password == "admin123")
            .returning(|c| {
                Ok(AuthResponse {
                    token: "jwt".to_string(),
                    username: c.username.clone(),
                    role: "ROLE_USER".to_string(),
                })
            });

        let outcome = assert_ok!(submit_login(&form, &mut api).await);
        match outcome {
            SubmitOutcome::Accepted(auth) => assert!(!auth.user().is_admin()),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_register_short_password_is_invalid() {
        let form = FormKind::Register.build(Locale::En);
        form.set_form_data([("username", "reader"), ("password", "123")]);

        let mut api = MockCatalogApi::new();
        api.expect_register().never();

        let outcome = assert_ok!(submit_register(&form, &mut api).await);
        assert_eq!(outcome, SubmitOutcome::Invalid);
        assert_eq!(
            form.get_error("password").as_deref(),
            Some("Minimum 6 characters required")
        );
    }
}
