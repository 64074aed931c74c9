//! Call-contracts of the catalog REST backend
//!
//! The transport lives outside this crate; hosts implement [`CatalogApi`]
//! over their HTTP client of choice.

use crate::error::ApiError;
use crate::state::{AuthResponse, Book, Credentials};
use async_trait::async_trait;

/// Result type for backend calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Trait for catalog backend operations, enabling mocking in tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// `GET /books`
    async fn list_books(&mut self) -> ApiResult<Vec<Book>>;

    /// `GET /books/{id}`
    async fn get_book(&mut self, id: i64) -> ApiResult<Book>;

    /// `POST /books`
    async fn create_book(&mut self, book: &Book) -> ApiResult<Book>;

    /// `PUT /books/{id}`
    async fn update_book(&mut self, id: i64, book: &Book) -> ApiResult<Book>;

    /// `DELETE /books/{id}`
    async fn delete_book(&mut self, id: i64) -> ApiResult<()>;

    /// `POST /auth/login`
    async fn login(&mut self, credentials: &Credentials) -> ApiResult<AuthResponse>;

    /// `POST /auth/register`
    async fn register(&mut self, credentials: &Credentials) -> ApiResult<()>;
}
