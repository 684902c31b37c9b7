use tracing::trace;

use crate::document::{TagCursor, TagWriter};
use crate::types::{Condition, Junction, LeafCodec, LeafWriter, WriteError};

/// Write `condition` to `writer` in the nested tag form the reader accepts.
///
/// Composites are written under their canonical tags (`allOf`, `anyOf`), leaves
/// under [`LeafCodec::tag`]. Children keep their order.
///
/// # Errors
///
/// Returns [`WriteError::Leaf`] if a leaf cannot be written and
/// [`WriteError::Document`] if the writer rejects a tag.
pub fn write_condition<P: LeafCodec>(
    condition: &Condition<P>,
    writer: &mut dyn TagWriter,
) -> Result<(), WriteError> {
    match condition {
        Condition::Leaf(predicate) => write_leaf(predicate, writer),
        Condition::AllOf(children) => write_junction(Junction::All, children, writer),
        Condition::AnyOf(children) => write_junction(Junction::Any, children, writer),
    }
}

fn write_leaf<P: LeafCodec>(predicate: &P, writer: &mut dyn TagWriter) -> Result<(), WriteError> {
    let tag = predicate.tag();
    let mut leaf = LeafWriter::new();
    predicate
        .write_leaf(&mut leaf)
        .map_err(|source| WriteError::Leaf {
            tag: tag.to_owned(),
            source,
        })?;
    let (attributes, mut body) = leaf.into_parts()?;
    trace!(tag, attributes = attributes.len(), "write leaf");

    writer.open(tag, &attributes)?;
    while let Some(token) = body.next_token()? {
        writer.token(&token)?;
    }
    writer.close()?;
    Ok(())
}

fn write_junction<P: LeafCodec>(
    junction: Junction,
    children: &[Condition<P>],
    writer: &mut dyn TagWriter,
) -> Result<(), WriteError> {
    trace!(tag = junction.tag(), children = children.len(), "write");
    writer.open(junction.tag(), &[])?;
    for child in children {
        write_condition(child, writer)?;
    }
    writer.close()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentError, Token, TokenStream};
    use crate::types::{BoxError, LeafReader};
    use crate::{all_of, any_of, leaf, read_condition, StatementRegistry};

    #[derive(Debug, Clone, PartialEq)]
    struct Flag(bool);

    impl LeafCodec for Flag {
        fn read_leaf(leaf: &mut LeafReader<'_>) -> Result<Self, BoxError> {
            Ok(Flag(leaf.bool_attribute("value", false)?))
        }

        fn write_leaf(&self, leaf: &mut LeafWriter) -> Result<(), BoxError> {
            leaf.attribute("value", self.0.to_string());
            Ok(())
        }
    }

    /// Leaf that cannot be written.
    #[derive(Debug)]
    struct Opaque;

    impl LeafCodec for Opaque {
        fn tag(&self) -> &str {
            "opaque"
        }

        fn read_leaf(_: &mut LeafReader<'_>) -> Result<Self, BoxError> {
            Ok(Opaque)
        }

        fn write_leaf(&self, _: &mut LeafWriter) -> Result<(), BoxError> {
            Err("no serialized form".into())
        }
    }

    /// Leaf that leaves an element open in its body.
    #[derive(Debug)]
    struct Dangling;

    impl LeafCodec for Dangling {
        fn read_leaf(_: &mut LeafReader<'_>) -> Result<Self, BoxError> {
            Ok(Dangling)
        }

        fn write_leaf(&self, leaf: &mut LeafWriter) -> Result<(), BoxError> {
            leaf.open("part", &[])?;
            Ok(())
        }
    }

    fn flag(value: bool) -> Condition<Flag> {
        leaf(Flag(value))
    }

    #[test]
    fn writes_tokens_in_document_order() {
        let tree = any_of([flag(true), all_of([flag(false)])]);
        let tokens = tree.to_tokens().unwrap().into_tokens();
        let value = |v: &str| Token::Open {
            name: "condition".into(),
            attributes: vec![crate::document::Attribute::new("value", v)],
        };
        assert_eq!(
            tokens,
            vec![
                Token::open("anyOf"),
                value("true"),
                Token::Close,
                Token::open("allOf"),
                value("false"),
                Token::Close,
                Token::Close,
                Token::Close,
            ]
        );
    }

    #[test]
    fn empty_composites_written() {
        let tree: Condition<Flag> = all_of([any_of([])]);
        assert_eq!(tree.to_text().unwrap(), "allOf {\n    anyOf\n}\n");
    }

    #[test]
    fn round_trip_through_tokens() {
        let registry = StatementRegistry::<Flag>::new();
        let tree = any_of([
            flag(true),
            all_of([flag(false), flag(true), any_of([])]),
            all_of([]),
        ]);
        let mut stream = tree.to_tokens().unwrap();
        assert_eq!(read_condition(&mut stream, &registry).unwrap(), tree);
        assert!(stream.is_empty());
    }

    #[test]
    fn leaf_failure_names_tag() {
        let tree = all_of([leaf(Opaque)]);
        let mut stream = TokenStream::new();
        let err = write_condition(&tree, &mut stream).unwrap_err();
        assert!(matches!(err, WriteError::Leaf { ref tag, .. } if tag == "opaque"));
        assert_eq!(
            err.to_string(),
            "cannot write <opaque>: no serialized form"
        );
    }

    #[test]
    fn unbalanced_leaf_body_rejected() {
        let err = leaf(Dangling).to_tokens().unwrap_err();
        assert!(matches!(
            err,
            WriteError::Document(DocumentError::Unbalanced)
        ));
    }
}
