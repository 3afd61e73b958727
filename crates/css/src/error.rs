use crate::source::SourcePosition;

/// Errors raised while tokenizing or parsing stylesheet and selector text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("{position}: unclosed comment")]
    UnclosedComment { position: SourcePosition },

    #[error("{position}: unclosed string")]
    UnclosedString { position: SourcePosition },

    #[error("{position}: unclosed block")]
    UnclosedBlock { position: SourcePosition },

    #[error("{position}: unexpected '}}'")]
    UnexpectedCloseBrace { position: SourcePosition },

    #[error("{position}: rule has no selector")]
    MissingSelector { position: SourcePosition },

    #[error("{position}: unknown word '{word}'")]
    UnknownWord { position: SourcePosition, word: String },

    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: &'static str },
}
