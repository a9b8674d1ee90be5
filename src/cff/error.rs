//! Error types for the CFF compiler.

use thiserror::Error;

/// An error that aborted a compile.
///
/// Lexical problems never stop the lexer; they surface here only once the
/// parser runs into the error token.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("[{line}:{col}] expected {expected} but found lexical error '{lexeme}'")]
    Lexical {
        line: usize,
        col: usize,
        lexeme: String,
        expected: String,
    },

    #[error("[{line}:{col}] expected {expected} but found {found}")]
    Syntax {
        line: usize,
        col: usize,
        expected: String,
        found: String,
    },

    #[error("internal compiler error: {message}")]
    Internal { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    Internal,
}

impl CompileError {
    pub fn lexical(
        lexeme: impl Into<String>,
        expected: impl Into<String>,
        line: usize,
        col: usize,
    ) -> Self {
        Self::Lexical {
            line,
            col,
            lexeme: lexeme.into(),
            expected: expected.into(),
        }
    }

    pub fn syntax(
        expected: impl Into<String>,
        found: impl Into<String>,
        line: usize,
        col: usize,
    ) -> Self {
        Self::Syntax {
            line,
            col,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Lexical { .. } => ErrorKind::Lexical,
            Self::Syntax { .. } => ErrorKind::Syntax,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Source position of the offending token, if the error has one.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            Self::Lexical { line, col, .. } | Self::Syntax { line, col, .. } => Some((*line, *col)),
            Self::Internal { .. } => None,
        }
    }
}
