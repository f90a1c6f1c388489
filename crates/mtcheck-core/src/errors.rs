use thiserror::Error;

/// Result type alias using the canonical structured error
pub type Result<T> = std::result::Result<T, CheckError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every fatal condition of a checking run maps to one of these kinds. Each
/// kind has a stable error code usable for programmatic handling and tests.
/// Diagnostics (compatibility findings) are never errors of this type: they
/// are data produced by a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckErrorKind {
    // Snapshot parsing
    /// Snapshot bytes are not valid UTF-8 JSON or have the wrong shape
    InvalidSnapshot,
    /// A required structural key (e.g. `request`, `driver`) is absent
    MissingField,
    /// A record names a request kind other than `machine` / `device-type`
    UnknownRequestKind,

    // Snapshot sources
    /// The snapshot extractor could not be run or produced no output
    Extraction,

    // Configuration
    /// The checker configuration file is not valid
    InvalidConfig,
    /// A known-issue pattern is not a valid regular expression
    InvalidPattern,
    /// Command-line inputs are inconsistent
    InvalidInput,

    // Integration/IO
    Io,
    Serialization,
}

impl CheckErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            CheckErrorKind::InvalidSnapshot => "ERR_INVALID_SNAPSHOT",
            CheckErrorKind::MissingField => "ERR_MISSING_FIELD",
            CheckErrorKind::UnknownRequestKind => "ERR_UNKNOWN_REQUEST_KIND",
            CheckErrorKind::Extraction => "ERR_EXTRACTION",
            CheckErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            CheckErrorKind::InvalidPattern => "ERR_INVALID_PATTERN",
            CheckErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            CheckErrorKind::Io => "ERR_IO",
            CheckErrorKind::Serialization => "ERR_SERIALIZATION",
        }
    }
}

/// Canonical structured error type
///
/// Carries the classification plus the context needed to find the offending
/// input: which operation failed, which snapshot source, and which record.
#[derive(Debug, Clone)]
pub struct CheckError {
    kind: CheckErrorKind,
    op: Option<String>,
    source_label: Option<String>,
    record_index: Option<usize>,
    message: String,
    source: Option<Box<CheckError>>,
}

impl CheckError {
    /// Create a new error with the specified kind
    pub fn new(kind: CheckErrorKind) -> Self {
        Self {
            kind,
            op: None,
            source_label: None,
            record_index: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the label of the snapshot source being processed
    pub fn with_source_label(mut self, label: impl Into<String>) -> Self {
        self.source_label = Some(label.into());
        self
    }

    /// Add the index of the offending record within the snapshot
    pub fn with_record_index(mut self, index: usize) -> Self {
        self.record_index = Some(index);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: CheckError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> CheckErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the snapshot source label, if any
    pub fn source_label(&self) -> Option<&str> {
        self.source_label.as_deref()
    }

    /// Get the record index, if any
    pub fn record_index(&self) -> Option<usize> {
        self.record_index
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&CheckError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for CheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(label) = &self.source_label {
            write!(f, " (source: {})", label)?;
        }
        if let Some(index) = self.record_index {
            write!(f, " (record: {})", index)?;
        }
        if let Some(source) = &self.source {
            write!(f, ": caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for CheckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain failures raised while loading snapshots and configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapshotError {
    /// The snapshot root is not a JSON array of records
    #[error("snapshot root must be a JSON array of records")]
    NotAnArray,

    /// A record is not shaped like `{"request": [...], "result"|"exception": ...}`
    #[error("record {index} is malformed: {reason}")]
    MalformedRecord { index: usize, reason: String },

    /// A required key is absent from a record or list entry
    #[error("record {index} is missing required key `{key}`")]
    MissingKey { index: usize, key: String },

    /// A value has the wrong JSON type
    #[error("record {index}: `{key}` must be {expected}")]
    WrongType {
        index: usize,
        key: String,
        expected: String,
    },

    /// The request kind is neither `machine` nor `device-type`
    #[error("record {index} has unknown request kind `{kind}`")]
    UnknownRequestKind { index: usize, kind: String },

    /// The extractor could not be run or returned nothing usable
    #[error("extractor failed for {binary}: {reason}")]
    ExtractorFailed { binary: String, reason: String },

    /// A known-issue pattern failed to compile
    #[error("invalid known-issue pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// The configuration document could not be decoded
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

/// Conversion from SnapshotError to CheckError
impl From<SnapshotError> for CheckError {
    fn from(err: SnapshotError) -> Self {
        match err {
            SnapshotError::NotAnArray => CheckError::new(CheckErrorKind::InvalidSnapshot)
                .with_message("snapshot root must be a JSON array of records"),

            SnapshotError::MalformedRecord { index, reason } => {
                CheckError::new(CheckErrorKind::InvalidSnapshot)
                    .with_record_index(index)
                    .with_message(reason)
            }

            SnapshotError::MissingKey { index, key } => {
                CheckError::new(CheckErrorKind::MissingField)
                    .with_record_index(index)
                    .with_message(format!("required key `{}` is absent", key))
            }

            SnapshotError::WrongType {
                index,
                key,
                expected,
            } => CheckError::new(CheckErrorKind::InvalidSnapshot)
                .with_record_index(index)
                .with_message(format!("`{}` must be {}", key, expected)),

            SnapshotError::UnknownRequestKind { index, kind } => {
                CheckError::new(CheckErrorKind::UnknownRequestKind)
                    .with_record_index(index)
                    .with_message(format!("unknown request kind `{}`", kind))
            }

            SnapshotError::ExtractorFailed { binary, reason } => {
                CheckError::new(CheckErrorKind::Extraction)
                    .with_source_label(binary)
                    .with_message(reason)
            }

            SnapshotError::InvalidPattern { pattern, reason } => {
                CheckError::new(CheckErrorKind::InvalidPattern)
                    .with_message(format!("`{}`: {}", pattern, reason))
            }

            SnapshotError::InvalidConfig { reason } => {
                CheckError::new(CheckErrorKind::InvalidConfig).with_message(reason)
            }
        }
    }
}

/// Conversion from serde_json::Error to CheckError
impl From<serde_json::Error> for CheckError {
    fn from(err: serde_json::Error) -> Self {
        CheckError::new(CheckErrorKind::Serialization).with_message(err.to_string())
    }
}

/// Conversion from std::io::Error to CheckError
impl From<std::io::Error> for CheckError {
    fn from(err: std::io::Error) -> Self {
        CheckError::new(CheckErrorKind::Io).with_message(err.to_string())
    }
}

/// Conversion from toml::de::Error to CheckError
impl From<toml::de::Error> for CheckError {
    fn from(err: toml::de::Error) -> Self {
        SnapshotError::InvalidConfig {
            reason: err.to_string(),
        }
        .into()
    }
}
