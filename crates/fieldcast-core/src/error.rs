//! Error types for the Fieldcast core library
//!
//! Every fatal condition aborts the whole mapping pass and surfaces here.
//! Conditions that are deliberately not errors (a source path running through
//! a null intermediate, a transformer returning null, inference finding no
//! default transformer) never produce a value of these types.
//!
//! Copyright (c) 2025 Fieldcast Team
//! Licensed under the Apache-2.0 license

use thiserror::Error;

/// Main error type for Fieldcast operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid rule declarations or transformer registrations
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// A path segment names a field the owning type does not declare
    #[error("Field {field} not found on class {type_name} (path '{path}')")]
    FieldNotFound {
        field: String,
        type_name: String,
        path: String,
    },

    /// An intermediate path segment holds something other than an entity
    #[error("Field {field} on class {type_name} does not hold an object and cannot be traversed (path '{path}')")]
    NotAnObject {
        field: String,
        type_name: String,
        path: String,
    },

    /// A rule references a transformer name nobody registered
    #[error("No transformer registered under reference '{reference}'")]
    TransformerNotFound { reference: String },

    /// A target type, or an intermediate object on a target path, could not be built
    #[error("Could not instantiate {type_name}: {reason}")]
    Construction {
        type_name: String,
        reason: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// The resolved target field rejected the value
    #[error("Could not map value {source_field} of class {source_type} to {target_field} of class {target_type}")]
    Write {
        source_field: String,
        source_type: String,
        target_field: String,
        target_type: String,
        #[source]
        source: anyhow::Error,
    },

    /// A transformer rejected its input
    #[error("Transformer {transformer} failed mapping {source_field} of class {source_type} to {target_field} of class {target_type}")]
    Transform {
        transformer: String,
        source_field: String,
        source_type: String,
        target_field: String,
        target_type: String,
        #[source]
        source: TransformError,
    },

    /// A post-mapping decorator failed
    #[error("Decorator {decorator} failed for <{source_type}, {target_type}>")]
    Decorator {
        decorator: String,
        source_type: String,
        target_type: String,
        #[source]
        source: anyhow::Error,
    },
}

impl Error {
    /// Shorthand for a configuration error without an underlying cause
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Whether this error stems from rule declarations or registrations
    /// rather than from the data being mapped
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration { .. })
    }
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by an entity's own field accessors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldAccessError {
    /// The entity has no field of that name
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// The value cannot be stored in the field
    #[error("field '{field}' expects {expected}, got {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },

    /// The field is read-only
    #[error("field '{0}' is read-only")]
    ReadOnly(String),
}

/// Errors raised by transformers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// The transformer received a value of a type it does not handle
    #[error("cannot convert {found} to {to}: expected {expected}")]
    UnsupportedInput {
        expected: String,
        found: String,
        to: String,
    },

    /// The input had the right type but could not be converted
    #[error("cannot convert '{value}' to {to}: {reason}")]
    Conversion {
        value: String,
        to: String,
        reason: String,
    },

    /// Free-form failure from a user transformer
    #[error("{0}")]
    Failed(String),
}
