//! Clean Module
//!
//! Consistency validation and orphan reaping for a destination tree.

mod result;
mod use_case;
mod validator;

pub use result::CleanReport;
pub(crate) use use_case::{clean_destination, clean_tree};
pub use use_case::CleanUseCase;
pub use validator::{validate, ValidationIssue};
