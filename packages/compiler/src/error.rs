use std::path::PathBuf;
use swatch_common::CommonError;
use swatch_sourcemap::SourceMapError;
use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;
pub type EvalResult<T> = Result<T, EvalError>;
pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token at {pos}: expected {expected}, found {found}")]
    UnexpectedToken {
        pos: usize,
        expected: String,
        found: String,
    },

    #[error("Unexpected end of file at {pos}")]
    UnexpectedEof { pos: usize },

    #[error("Invalid syntax at {pos}: {message}")]
    InvalidSyntax { pos: usize, message: String },
}

impl ParseError {
    pub fn unexpected_token(pos: usize, expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::UnexpectedToken {
            pos,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn unexpected_eof(pos: usize) -> Self {
        Self::UnexpectedEof { pos }
    }

    pub fn invalid_syntax(pos: usize, message: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            pos,
            message: message.into(),
        }
    }

    /// Byte offset the error points at
    pub fn pos(&self) -> usize {
        match self {
            Self::UnexpectedToken { pos, .. }
            | Self::UnexpectedEof { pos }
            | Self::InvalidSyntax { pos, .. } => *pos,
        }
    }
}

/// Failure while computing the value of a literal expression
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Unknown identifier '{0}'")]
    UnknownIdentifier(String),

    #[error("Unsupported call: only `{0}.keyframes(...)` can be called")]
    UnsupportedCall(String),

    #[error("Unsupported expression: {0}")]
    Unsupported(String),

    #[error("Number is not finite: {0}")]
    InvalidNumber(f64),

    #[error("Spread of a non-object value")]
    InvalidSpread,

    #[error("Invalid style object: {0}")]
    InvalidStyles(String),
}

#[derive(Error, Debug)]
pub enum CompileError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("Parse error in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Cannot evaluate css call in {} at line {line}: {source}", path.display())]
    Eval {
        path: PathBuf,
        line: u32,
        #[source]
        source: EvalError,
    },

    #[error(transparent)]
    SourceMap(#[from] SourceMapError),

    #[error("Entry not found: {}", .0.display())]
    EntryNotFound(PathBuf),
}
