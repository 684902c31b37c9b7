//! Composable boolean conditions read from tag-structured documents.
//!
//! A [`Condition`] tree combines leaf predicates with `allOf` (AND) and
//! `anyOf` (OR), evaluates with short-circuiting in document order, and
//! round-trips through any [`TagCursor`](document::TagCursor) /
//! [`TagWriter`](document::TagWriter) pair. Tags are resolved by a
//! [`StatementRegistry`], which also decides which tags may nest where.
//!
//! ```
//! use condflow::{Condition, StatementRegistry, text::TextMatcher};
//!
//! let registry = StatementRegistry::<TextMatcher>::new();
//! let condition = Condition::from_text(
//!     r#"
//!     anyOf {
//!         condition(method = "wildcard") { "*.pdf" }
//!         allOf {
//!             condition(partial = "true") { "report" }
//!             condition(partial = "true", ignoreCase = "true") { "DRAFT" }
//!         }
//!     }
//!     "#,
//!     &registry,
//! )
//! .unwrap();
//!
//! assert!(condition.evaluate("summary.pdf").unwrap());
//! assert!(condition.evaluate("report-draft.txt").unwrap());
//! assert!(!condition.evaluate("report.txt").unwrap());
//! ```

pub mod document;
mod error;
mod evaluate;
mod read;
#[cfg(feature = "binary-cache")]
pub mod serial;
pub mod text;
mod types;
mod write;

pub use error::CondflowError;
pub use read::{read_condition, ConditionReader, DEFAULT_MAX_DEPTH};
pub use types::{
    all_of, any_of, leaf, BoxError, Condition, EvaluationReport, Gate, GateKind, Junction,
    LeafCodec, LeafFactory, LeafOutcome, LeafReader, LeafWriter, Leaves, Predicate, ReadError,
    Statement, StatementRegistry, WriteError, ALL_OF, ANY_OF, BUILT_IN, CONDITION, GATE_CHILDREN,
    IF, IF_NOT,
};
pub use write::write_condition;

#[cfg(feature = "binary-cache")]
pub use serial::{DeserializeError, SerializeError};
