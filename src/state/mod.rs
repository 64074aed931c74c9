//! Client state: catalog records and forms

mod catalog;
pub mod forms;

pub use catalog::*;
pub use forms::*;
