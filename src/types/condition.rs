use std::fmt;

use crate::document::{TagWriter, TextWriter, TokenStream};

use super::error::WriteError;
use super::evaluation_report::EvaluationReport;
use super::leaf::{LeafCodec, Predicate};
use super::registry::{StatementRegistry, ALL_OF, ANY_OF};

/// How a composite combines its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Junction {
    /// Logical AND; an empty composite is `true`.
    All,
    /// Logical OR; an empty composite is `false`.
    Any,
}

impl Junction {
    /// Canonical tag the composite is written under.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Junction::All => ALL_OF,
            Junction::Any => ANY_OF,
        }
    }

    #[must_use]
    pub fn build<P>(self, children: Vec<Condition<P>>) -> Condition<P> {
        match self {
            Junction::All => Condition::AllOf(children),
            Junction::Any => Condition::AnyOf(children),
        }
    }
}

/// A node of a boolean condition tree.
///
/// Children are owned exclusively and kept in document order, which is also
/// the evaluation and serialization order. Equality is structural.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition<P> {
    Leaf(P),
    AllOf(Vec<Condition<P>>),
    AnyOf(Vec<Condition<P>>),
}

impl<P> Condition<P> {
    /// Evaluate against `context`, short-circuiting in document order.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a leaf predicate, unchanged.
    pub fn evaluate<T: ?Sized>(&self, context: &T) -> Result<bool, P::Error>
    where
        P: Predicate<T>,
    {
        crate::evaluate::evaluate(self, context)
    }

    /// Evaluate and record which leaves ran, their outcomes, and how many
    /// were skipped.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a leaf predicate, unchanged.
    pub fn evaluate_detailed<T: ?Sized>(&self, context: &T) -> Result<EvaluationReport, P::Error>
    where
        P: Predicate<T>,
    {
        crate::evaluate::evaluate_detailed(self, context)
    }

    /// Parse a text document and read its root condition.
    ///
    /// # Errors
    ///
    /// Returns [`CondflowError`](crate::CondflowError) if the text is malformed or
    /// violates the statement grammar.
    pub fn from_text(
        input: &str,
        registry: &StatementRegistry<P>,
    ) -> Result<Self, crate::CondflowError> {
        let mut stream = crate::document::parse(input)?;
        Ok(crate::read_condition(&mut stream, registry)?)
    }

    /// Read a text document from a file.
    ///
    /// # Errors
    ///
    /// Returns [`CondflowError`](crate::CondflowError) if the file cannot be read
    /// or its content is not a valid condition.
    pub fn from_file(
        path: impl AsRef<std::path::Path>,
        registry: &StatementRegistry<P>,
    ) -> Result<Self, crate::CondflowError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_text(&content, registry)
    }

    /// Direct children; empty for leaves.
    #[must_use]
    pub fn children(&self) -> &[Condition<P>] {
        match self {
            Condition::Leaf(_) => &[],
            Condition::AllOf(children) | Condition::AnyOf(children) => children,
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Condition::Leaf(_))
    }

    #[must_use]
    pub fn junction(&self) -> Option<Junction> {
        match self {
            Condition::Leaf(_) => None,
            Condition::AllOf(_) => Some(Junction::All),
            Condition::AnyOf(_) => Some(Junction::Any),
        }
    }

    /// Number of nesting levels; a leaf or an empty composite is 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(Condition::depth)
            .max()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Condition::Leaf(_) => 1,
            Condition::AllOf(children) | Condition::AnyOf(children) => {
                children.iter().map(Condition::leaf_count).sum()
            }
        }
    }

    /// Leaf predicates in document order.
    pub fn leaves(&self) -> Leaves<'_, P> {
        Leaves { stack: vec![self] }
    }
}

impl<P: LeafCodec> Condition<P> {
    /// Write this tree to `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError`] if a leaf cannot be written or the writer rejects a tag.
    pub fn write_to(&self, writer: &mut dyn TagWriter) -> Result<(), WriteError> {
        crate::write::write_condition(self, writer)
    }

    /// # Errors
    ///
    /// Returns [`WriteError`] if a leaf cannot be written.
    pub fn to_tokens(&self) -> Result<TokenStream, WriteError> {
        let mut stream = TokenStream::new();
        self.write_to(&mut stream)?;
        Ok(stream)
    }

    /// Render this tree in the text document format.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError`] if a leaf cannot be written.
    pub fn to_text(&self) -> Result<String, WriteError> {
        let mut writer = TextWriter::new();
        self.write_to(&mut writer)?;
        Ok(writer.finish()?)
    }
}

#[cfg(feature = "binary-cache")]
impl<P: LeafCodec> Condition<P> {
    /// Serialize this tree to a byte vector.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`](crate::serial::SerializeError) if a leaf
    /// cannot be written or encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, crate::serial::SerializeError> {
        crate::serial::encode(self.to_tokens()?)
    }

    /// Serialize this tree and write it to a file.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`](crate::serial::SerializeError) on
    /// encoding or I/O failure.
    pub fn to_binary_file(
        &self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<(), crate::serial::SerializeError> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

#[cfg(feature = "binary-cache")]
impl<P> Condition<P> {
    /// Deserialize a tree from bytes produced by [`to_bytes`](Self::to_bytes),
    /// reading it back through `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::serial::DeserializeError) on
    /// format, integrity, or validation failure, and when the stored tags are
    /// rejected by `registry`.
    pub fn from_bytes(
        bytes: &[u8],
        registry: &StatementRegistry<P>,
    ) -> Result<Self, crate::serial::DeserializeError> {
        let mut stream = crate::serial::decode(bytes)?;
        Ok(crate::read_condition(&mut stream, registry)?)
    }

    /// Read a file and deserialize the tree it contains.
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::serial::DeserializeError) on
    /// I/O, format, integrity, or validation failure.
    pub fn from_binary_file(
        path: impl AsRef<std::path::Path>,
        registry: &StatementRegistry<P>,
    ) -> Result<Self, crate::serial::DeserializeError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes, registry)
    }
}

/// Build a leaf node.
#[must_use]
pub fn leaf<P>(predicate: P) -> Condition<P> {
    Condition::Leaf(predicate)
}

/// Build an AND node from children in order.
#[must_use]
pub fn all_of<P>(children: impl IntoIterator<Item = Condition<P>>) -> Condition<P> {
    Condition::AllOf(children.into_iter().collect())
}

/// Build an OR node from children in order.
#[must_use]
pub fn any_of<P>(children: impl IntoIterator<Item = Condition<P>>) -> Condition<P> {
    Condition::AnyOf(children.into_iter().collect())
}

/// Iterator over the leaf predicates of a tree, in document order.
#[derive(Debug)]
pub struct Leaves<'a, P> {
    stack: Vec<&'a Condition<P>>,
}

impl<'a, P> Iterator for Leaves<'a, P> {
    type Item = &'a P;

    fn next(&mut self) -> Option<&'a P> {
        while let Some(node) = self.stack.pop() {
            match node {
                Condition::Leaf(predicate) => return Some(predicate),
                Condition::AllOf(children) | Condition::AnyOf(children) => {
                    self.stack.extend(children.iter().rev());
                }
            }
        }
        None
    }
}

impl<P: fmt::Display> fmt::Display for Condition<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Leaf(predicate) => write!(f, "{predicate}"),
            Condition::AllOf(children) | Condition::AnyOf(children) => {
                let tag = self.junction().map_or(ALL_OF, Junction::tag);
                write!(f, "{tag}(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{child}")?;
                }
                write!(f, ")")
            }
        }
    }
}
