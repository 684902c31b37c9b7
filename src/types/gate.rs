use crate::document::{DocumentError, TagCursor, TagWriter, Token};
use crate::read::ConditionReader;

use super::condition::Condition;
use super::error::{ReadError, WriteError};
use super::leaf::{LeafCodec, Predicate};
use super::registry::BUILT_IN;

/// Tag of a gate that passes when its condition holds.
pub const IF: &str = "if";
/// Tag of a gate that passes when its condition does not hold.
pub const IF_NOT: &str = "ifNot";

/// Statements permitted as the single direct child of a gate.
pub const GATE_CHILDREN: [&str; 3] = BUILT_IN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateKind {
    If,
    IfNot,
}

impl GateKind {
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            GateKind::If => IF,
            GateKind::IfNot => IF_NOT,
        }
    }

    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            IF => Some(GateKind::If),
            IF_NOT => Some(GateKind::IfNot),
            _ => None,
        }
    }
}

/// An `if` / `ifNot` branch guard holding exactly one condition subtree.
///
/// ```text
/// ifNot {
///     anyOf {
///         condition { "draft" }
///         condition { "obsolete" }
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Gate<P> {
    kind: GateKind,
    condition: Condition<P>,
}

impl<P> Gate<P> {
    #[must_use]
    pub fn new(kind: GateKind, condition: Condition<P>) -> Self {
        Self { kind, condition }
    }

    #[must_use]
    pub fn kind(&self) -> GateKind {
        self.kind
    }

    #[must_use]
    pub fn condition(&self) -> &Condition<P> {
        &self.condition
    }

    /// Whether the guarded branch should run for `context`.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a leaf predicate, unchanged.
    pub fn passes<T: ?Sized>(&self, context: &T) -> Result<bool, P::Error>
    where
        P: Predicate<T>,
    {
        let holds = self.condition.evaluate(context)?;
        Ok(match self.kind {
            GateKind::If => holds,
            GateKind::IfNot => !holds,
        })
    }

    /// Read a gate element from `cursor`.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::UnknownStatement`] if the next element is not a gate,
    /// [`ReadError::Structural`] for a child outside [`GATE_CHILDREN`], and
    /// [`ReadError::GateArity`] unless exactly one condition is present.
    pub fn read(
        cursor: &mut dyn TagCursor,
        reader: &ConditionReader<'_, P>,
    ) -> Result<Self, ReadError> {
        cursor.skip_blank_text()?;
        let (name, kind) = match cursor.next_token()? {
            Some(Token::Open { name, .. }) => {
                let kind = GateKind::from_tag(&name)
                    .ok_or_else(|| ReadError::UnknownStatement { tag: name.clone() })?;
                (name, kind)
            }
            Some(other) => {
                return Err(DocumentError::UnexpectedToken {
                    expected: format!("<{IF}> or <{IF_NOT}>"),
                    found: other.to_string(),
                }
                .into())
            }
            None => {
                return Err(DocumentError::UnexpectedEnd {
                    expected: format!("<{IF}> or <{IF_NOT}>"),
                }
                .into())
            }
        };

        let mut children = reader.read_within(cursor, &name, &GATE_CHILDREN)?;
        if children.len() != 1 {
            return Err(ReadError::GateArity {
                tag: name,
                found: children.len(),
            });
        }
        let condition = children.remove(0);
        Ok(Self { kind, condition })
    }
}

impl<P: LeafCodec> Gate<P> {
    /// # Errors
    ///
    /// Returns [`WriteError`] if the condition cannot be written.
    pub fn write_to(&self, writer: &mut dyn TagWriter) -> Result<(), WriteError> {
        writer.open(self.kind.tag(), &[])?;
        self.condition.write_to(writer)?;
        writer.close()?;
        Ok(())
    }
}
