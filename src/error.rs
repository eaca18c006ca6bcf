use thiserror::Error;

/// Every failure the compilation pipeline or the automaton replay can produce.
///
/// Each stage fails whole: no partial token stream, tree or automaton is ever
/// handed back alongside an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The regex could not be split into alphabet symbols and operators, or a
    /// repetition quantifier is malformed.
    #[error("lexical error at position {position}: {message}")]
    Lexical { position: usize, message: String },

    /// The token stream does not match the grammar.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// An automaton was driven with input it has no transition for.
    #[error("usage error: {0}")]
    Usage(String),

    /// A serialized automaton references states it never defines.
    #[error("invalid automaton: {0}")]
    InvalidAutomaton(String),
}

impl Error {
    pub(crate) fn lexical<S: Into<String>>(position: usize, message: S) -> Self {
        Error::Lexical {
            position,
            message: message.into(),
        }
    }

    pub fn is_lexical(&self) -> bool {
        matches!(self, Error::Lexical { .. })
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, Error::Syntax(_))
    }

    pub fn is_usage(&self) -> bool {
        matches!(self, Error::Usage(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
