use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("not implemented: {0}")]
    NotImplemented(String),

    #[error("initialization failure: {0}")]
    InitializationFailure(String),

    #[error("general failure: {0}")]
    GeneralFailure(String),

    #[error("op conversion failure at node '{node}': {message}")]
    OpConversionFailure { node: String, message: String },

    #[error("op validation failure at node '{node}': {message}")]
    OpValidationFailure { node: String, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse classification of an [`Error`], for callers that branch on the kind only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotImplemented,
    InitializationFailure,
    GeneralFailure,
    OpConversionFailure,
    OpValidationFailure,
    Config,
    Io,
    Serialization,
}

impl Error {
    pub fn not_implemented(operation: impl Into<String>) -> Self {
        Self::NotImplemented(operation.into())
    }

    pub fn initialization(message: impl Into<String>) -> Self {
        Self::InitializationFailure(message.into())
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self::GeneralFailure(message.into())
    }

    pub fn op_conversion(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self::OpConversionFailure {
            node: node.into(),
            message: message.into(),
        }
    }

    pub fn op_validation(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self::OpValidationFailure {
            node: node.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotImplemented(_) => ErrorKind::NotImplemented,
            Self::InitializationFailure(_) => ErrorKind::InitializationFailure,
            Self::GeneralFailure(_) => ErrorKind::GeneralFailure,
            Self::OpConversionFailure { .. } => ErrorKind::OpConversionFailure,
            Self::OpValidationFailure { .. } => ErrorKind::OpValidationFailure,
            Self::Config(_) => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
            Self::Serialization(_) => ErrorKind::Serialization,
        }
    }

    /// Returns the operation name when this is a `NotImplemented` error.
    pub fn not_implemented_operation(&self) -> Option<&str> {
        match self {
            Self::NotImplemented(op) => Some(op),
            _ => None,
        }
    }

    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented(_))
    }

    /// The offending node for node-granular conversion and validation failures.
    pub fn node(&self) -> Option<&str> {
        match self {
            Self::OpConversionFailure { node, .. } | Self::OpValidationFailure { node, .. } => {
                Some(node)
            }
            _ => None,
        }
    }
}
