//! Backend collaborator: call-contracts and form submission

mod submit;
mod traits;

pub use submit::{submit_book, submit_login, submit_register, SubmitOutcome};
pub use traits::{ApiResult, CatalogApi};

#[cfg(test)]
pub use traits::MockCatalogApi;
