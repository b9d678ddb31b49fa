use std::fmt;

/// An error that can occur when decoding or encoding trigger data
#[derive(Debug)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Error {
        Error(Box::new(kind))
    }

    pub(crate) fn malformed(offset: Option<usize>, reason: Malformed) -> Error {
        Error::new(ErrorKind::MalformedStructure { offset, reason })
    }

    pub(crate) fn unrepresentable(version: i32, what: impl Into<String>) -> Error {
        Error::new(ErrorKind::UnrepresentableValue {
            version,
            what: what.into(),
        })
    }

    /// Return the specific type of error
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// Consume the error and return the specific type of error
    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// Returns the byte offset that the error occurs (if available)
    pub fn offset(&self) -> Option<usize> {
        self.0.offset()
    }
}

/// Specific type of error
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// The data does not start with the `WTG!` magic
    #[error("invalid header: expected `WTG!` but found {found:02x?}")]
    InvalidHeader { found: Vec<u8> },

    /// No layout is registered for the format version
    #[error("unsupported format version: {version}")]
    UnsupportedVersion { version: i32 },

    /// Fewer bytes remain than a record declares
    #[error(
        "truncated input at offset {offset}: needed {needed} bytes but only {remaining} remain"
    )]
    TruncatedInput {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// The data is structurally invalid
    #[error("malformed structure{}: {reason}", fmt_offset(.offset))]
    MalformedStructure {
        offset: Option<usize>,
        reason: Malformed,
    },

    /// The document holds a construct the target layout cannot express
    #[error("{what} is not representable in format version {version}")]
    UnrepresentableValue { version: i32, what: String },

    /// An error from the underlying reader or writer
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ErrorKind {
    pub fn offset(&self) -> Option<usize> {
        match *self {
            ErrorKind::InvalidHeader { .. } => Some(0),
            ErrorKind::TruncatedInput { offset, .. } => Some(offset),
            ErrorKind::MalformedStructure { offset, .. } => offset,
            _ => None,
        }
    }
}

fn fmt_offset(offset: &Option<usize>) -> String {
    match offset {
        Some(x) => format!(" at offset {}", x),
        None => String::new(),
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self.0 {
            ErrorKind::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::new(ErrorKind::Io(error))
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::new(kind)
    }
}

/// The reason data was rejected as malformed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Malformed {
    #[error("negative count: {0}")]
    NegativeCount(i32),

    #[error("nesting exceeds the depth limit of {0}")]
    DepthExceeded(usize),

    #[error("unrecognized parameter tag: {0}")]
    ParameterTag(i32),

    #[error("unrecognized function kind: {0}")]
    FunctionKind(i32),

    #[error("a call may only appear as a parameter, found `{0}` in a function list")]
    MisplacedCall(String),

    #[error("unknown function: `{0}`")]
    UnknownFunction(String),

    #[error("string is not valid utf-8")]
    InvalidString,

    #[error("function parameter `{0}` has no call")]
    MissingCall(String),

    #[error("parameter `{0}` carries a call but is not a function parameter")]
    UnexpectedCall(String),

    #[error("function parameter value `{value}` does not name its call `{call}`")]
    CallNameMismatch { value: String, call: String },

    #[error("parameter `{0}` carries an array index but is not a variable")]
    UnexpectedArrayIndex(String),

    #[error("duplicate variable: `{0}`")]
    DuplicateVariable(String),

    #[error("{0} trailing bytes after the trigger block")]
    TrailingBytes(usize),

    #[error("trigger `{trigger}` references missing category {category}")]
    DanglingCategory { trigger: String, category: i32 },

    #[error("trigger `{trigger}` references undefined variable `{variable}`")]
    DanglingVariable { trigger: String, variable: String },
}

/// An error that occurs when parsing a TriggerData.txt function table
#[derive(Debug, thiserror::Error)]
#[error("trigger data line {line}: {kind}")]
pub struct TriggerDataError {
    line: usize,
    kind: TriggerDataErrorKind,
}

impl TriggerDataError {
    pub(crate) fn new(line: usize, kind: TriggerDataErrorKind) -> Self {
        TriggerDataError { line, kind }
    }

    /// The 1-based line number where the error occurred
    pub fn line(&self) -> usize {
        self.line
    }

    /// Return the specific type of error
    pub fn kind(&self) -> &TriggerDataErrorKind {
        &self.kind
    }
}

/// Specific kind of trigger data error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TriggerDataErrorKind {
    #[error("expected `name=values`")]
    MissingSeparator,

    #[error("function `{0}` has an empty name")]
    EmptyName(String),

    #[error("function `{name}` is missing its {field}")]
    MissingField { name: String, field: &'static str },

    #[error("function `{name}` has a non-numeric {field}: `{value}`")]
    InvalidField {
        name: String,
        field: &'static str,
        value: String,
    },
}
