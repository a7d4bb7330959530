use std::error::Error as StdError;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Internal,
    Usage,
    Parse,
    Absent,
    TypeMismatch,
    Io,
}

/// Coarse classification of a parse failure, stable across parser versions.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseFailureCategory {
    Syntax,
    Eof,
    Utf8,
    DepthLimit,
    NumericRange,
    SizeLimit,
    Unknown,
}

impl ParseFailureCategory {
    pub fn label(self) -> &'static str {
        match self {
            ParseFailureCategory::Syntax => "syntax",
            ParseFailureCategory::Eof => "eof",
            ParseFailureCategory::Utf8 => "utf8",
            ParseFailureCategory::DepthLimit => "depth-limit",
            ParseFailureCategory::NumericRange => "numeric-range",
            ParseFailureCategory::SizeLimit => "size-limit",
            ParseFailureCategory::Unknown => "unknown",
        }
    }
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    hint: Option<String>,
    path: Option<PathBuf>,
    line: Option<usize>,
    column: Option<usize>,
    category: Option<ParseFailureCategory>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            hint: None,
            path: None,
            line: None,
            column: None,
            category: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn line(&self) -> Option<usize> {
        self.line
    }

    pub fn column(&self) -> Option<usize> {
        self.column
    }

    pub fn category(&self) -> Option<ParseFailureCategory> {
        self.category
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Records a 1-based line/column position in the input text.
    pub fn with_position(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    pub fn with_category(mut self, category: ParseFailureCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let (Some(line), Some(column)) = (self.line, self.column) {
            write!(f, " (line {line}, column {column})")?;
        }
        if let Some(category) = self.category {
            write!(f, " (category: {})", category.label())?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::Usage => 2,
        ErrorKind::Parse => 3,
        ErrorKind::Absent => 4,
        ErrorKind::TypeMismatch => 5,
        ErrorKind::Io => 6,
    }
}
