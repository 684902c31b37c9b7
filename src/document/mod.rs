//! Tag-structured documents: tokens, cursors, writers, and a compact text format.
//!
//! The text format nests elements with braces, carries attributes in
//! parentheses and text as quoted strings:
//!
//! ```text
//! anyOf {
//!     condition(method = "wildcard") { "*.pdf" }
//!     allOf {
//!         condition { "report" }
//!         condition(partial = "true") { "draft" }
//!     }
//! }
//! ```

mod cursor;
mod error;
mod grammar;
mod token;
mod writer;

pub use cursor::{TagCursor, TagWriter};
pub use error::DocumentError;
pub use grammar::MAX_NESTING;
pub use token::{Attribute, Token, TokenStream};
pub use writer::TextWriter;

/// Parse a text document into a [`TokenStream`].
///
/// # Errors
///
/// Returns [`DocumentError::Syntax`] if the input is not a single well-formed
/// element or nests elements deeper than [`MAX_NESTING`].
pub fn parse(input: &str) -> Result<TokenStream, DocumentError> {
    use winnow::Parser;
    grammar::parse_document
        .parse(input)
        .map(TokenStream::from)
        .map_err(|e| DocumentError::syntax(e.to_string()))
}
