use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Malformed frontmatter: {message}")]
    Frontmatter { message: String },

    #[error("Invalid structure at line {line}: {message}")]
    InvalidStructure { line: usize, message: String },

    #[error("Document is not board-typed")]
    NotABoard,
}

impl ParseError {
    pub fn frontmatter(message: impl Into<String>) -> Self {
        Self::Frontmatter {
            message: message.into(),
        }
    }

    pub fn invalid_structure(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            line,
            message: message.into(),
        }
    }
}
