use crate::client::ClientError;
use crate::model::FieldErrors;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrigidError {
    #[error("{0}")]
    NotFound(String),

    #[error("More than one {object} object matches \"{identifier}\" ({count} matches). Be more specific.")]
    AmbiguousIdentifier {
        object: String,
        identifier: String,
        count: usize,
    },

    #[error("{message}")]
    Validation { message: String, errors: FieldErrors },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{message}")]
    OperationFailed { message: String, errors: FieldErrors },

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Render error: {0}")]
    Render(String),
}

impl BrigidError {
    /// Translates a transport-level failure into a user-facing error for an operation on
    /// `object`. `identifier` is what the user typed, when the operation targeted one record.
    pub fn from_client(err: ClientError, object: &str, identifier: Option<&str>) -> Self {
        match err {
            ClientError::NotFound(detail) => match identifier {
                Some(identifier) => BrigidError::NotFound(format!(
                    "Could not find a {} object that matches \"{}\"",
                    object, identifier
                )),
                None => BrigidError::NotFound(detail),
            },
            ClientError::Invalid(errors) => BrigidError::Validation {
                message: format!("{} failed validation", object),
                errors,
            },
            ClientError::Failed {
                status,
                message,
                errors,
            } => BrigidError::OperationFailed {
                message: format!("{} request failed ({}): {}", object, status, message),
                errors,
            },
            ClientError::Transport(e) => BrigidError::Transport(e),
            ClientError::Decode(e) => BrigidError::Serialization(e),
            ClientError::UnexpectedResponse(detail) => BrigidError::OperationFailed {
                message: format!("Unexpected response for {}: {}", object, detail),
                errors: FieldErrors::new(),
            },
        }
    }

    /// Per-field messages carried by validation and remote failures.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            BrigidError::Validation { errors, .. } | BrigidError::OperationFailed { errors, .. } => {
                Some(errors)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BrigidError>;
