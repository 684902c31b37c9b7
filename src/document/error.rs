use thiserror::Error;

/// Errors produced by the token cursor, the text document parser, and tag writers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("syntax error: {message}")]
    Syntax { message: String },

    #[error("unexpected end of document, expected {expected}")]
    UnexpectedEnd { expected: String },

    #[error("unexpected {found}, expected {expected}")]
    UnexpectedToken { expected: String, found: String },

    #[error("<{tag}> is missing required attribute '{attribute}'")]
    MissingAttribute { tag: String, attribute: String },

    #[error("<{tag}> does not accept attribute '{attribute}'")]
    UnknownAttribute { tag: String, attribute: String },

    #[error("<{tag}> has invalid value '{value}' for attribute '{attribute}'")]
    InvalidAttribute {
        tag: String,
        attribute: String,
        value: String,
    },

    #[error("unbalanced tags: close without a matching open, or open tags left unclosed")]
    Unbalanced,
}

impl DocumentError {
    pub(crate) fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_message() {
        let err = DocumentError::syntax("bad input");
        assert_eq!(err.to_string(), "syntax error: bad input");
    }

    #[test]
    fn unexpected_token_message() {
        let err = DocumentError::UnexpectedToken {
            expected: "</condition>".into(),
            found: "<allOf>".into(),
        };
        assert_eq!(err.to_string(), "unexpected <allOf>, expected </condition>");
    }

    #[test]
    fn missing_attribute_message() {
        let err = DocumentError::MissingAttribute {
            tag: "condition".into(),
            attribute: "field".into(),
        };
        assert_eq!(
            err.to_string(),
            "<condition> is missing required attribute 'field'"
        );
    }

    #[test]
    fn unknown_attribute_message() {
        let err = DocumentError::UnknownAttribute {
            tag: "condition".into(),
            attribute: "replaceAll".into(),
        };
        assert_eq!(
            err.to_string(),
            "<condition> does not accept attribute 'replaceAll'"
        );
    }

    #[test]
    fn invalid_attribute_message() {
        let err = DocumentError::InvalidAttribute {
            tag: "condition".into(),
            attribute: "partial".into(),
            value: "maybe".into(),
        };
        assert_eq!(
            err.to_string(),
            "<condition> has invalid value 'maybe' for attribute 'partial'"
        );
    }
}
