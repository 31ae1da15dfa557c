use std::fmt;

use thiserror::Error;

/// An error produced while tokenizing or parsing a Resolution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    // Lexical
    #[error("no closing quotation mark: \"{0}")]
    UnterminatedString(String),

    // Integer literals
    #[error("invalid integer")]
    InvalidInteger,
    #[error("invalid cardinal")]
    InvalidCardinal,
    #[error("invalid numeral")]
    InvalidNumeral,
    #[error("cardinal and numeral disagree")]
    Disagreement,

    // Resolution structure
    #[error("no title")]
    NoTitle,
    #[error("no Whereas clause before Resolved clause")]
    EarlyResolved,
    #[error("Whereas clause after Resolved clause")]
    LateWhereas,
    #[error("no Resolved clause")]
    NoResolved,
    #[error("no Whereas clause")]
    NoWhereas,
    #[error("unrecognized expression")]
    UnrecognizedExpression,
    #[error("conditional without relation")]
    NoRelation,
    #[error("conditional without consequence")]
    NoConsequence,

    // Identifier discipline
    #[error("identifier {0} redeclared")]
    Redeclared(String),
    #[error("identifier {0} undeclared")]
    Undeclared(String),
    #[error("identifier {0} declared and not used")]
    Unused(String),
}

/// An ordered list of parsing errors.
///
/// Structural failures abort parsing with a single entry; identifier
/// discipline diagnostics accumulate so that one pass reports them all.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ErrorList(Vec<ParseError>);

impl ErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, err: ParseError) {
        self.0.push(err);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.0.iter()
    }

    /// The most recently recorded error, if any.
    pub fn last(&self) -> Option<&ParseError> {
        self.0.last()
    }
}

impl From<ParseError> for ErrorList {
    fn from(err: ParseError) -> Self {
        ErrorList(vec![err])
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0.as_slice() {
            [] => write!(f, "no errors"),
            [only] => write!(f, "{}", only),
            [first, rest @ ..] => write!(f, "{} (and {} more errors)", first, rest.len()),
        }
    }
}

impl std::error::Error for ErrorList {}

#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] ErrorList),
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(ErrorList::from(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
