// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Error types for schema operations.

use thiserror::Error;

/// Errors that can occur while parsing schemas or generating code.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Failed to parse YAML schema definition.
    #[error("failed to parse schema YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Schema file not found.
    #[error("schema file not found: {path}")]
    FileNotFound { path: String },

    /// Failed to read schema file.
    #[error("failed to read schema file: {0}")]
    IoError(#[from] std::io::Error),

    /// Structurally invalid receiver.
    #[error("invalid receiver '{name}': {reason}")]
    InvalidReceiver { name: String, reason: String },

    /// Structurally invalid message.
    #[error("invalid message '{receiver}::{message}': {reason}")]
    InvalidMessage {
        receiver: String,
        message: String,
        reason: String,
    },

    /// Missing required field in schema.
    #[error("missing required field '{field}' in schema")]
    MissingField { field: String },

    /// A parameter uses a template name absent from the class template table.
    #[error("no class template type is defined for '{type_name}'")]
    UnsupportedTemplate { type_name: String },
}

/// Result type alias for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
