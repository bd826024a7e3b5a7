//! The analysis schema: one declarative template, the typed result it
//! describes, and the validator that turns model output into that result.

mod template;
mod types;
mod validator;

#[cfg(test)]
pub(crate) mod fixtures;

pub use self::template::*;
pub use self::types::*;
pub use self::validator::{validate, IssueKind, PathIssue, Validated, ValidationFailure};
