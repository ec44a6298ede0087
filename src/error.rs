// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Error types for the engine's query, index, and storage operations.
//!
//! Provides structured error handling with detailed context for debugging.

use thiserror::Error;

/// Standard Result type for all engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Error types for engine operations.
///
/// One variant per failure mode named in the error handling design: schema
/// violations, unknown attributes, table mismatches, and I/O failures during
/// CSV load/append/rewrite. Coercion failures inside a WHERE leaf and
/// probe-type mismatches are not represented here — per the error design
/// those evaluate to `false`/full-scan rather than failing the statement.
#[derive(Debug, Error, Clone)]
pub enum EngineError {
    /// INSERT supplied the wrong number of values, or a required field was
    /// missing, empty, or over its bounded length.
    #[error("schema violation in field '{field}': {reason}")]
    SchemaViolation { field: String, reason: String },

    /// An index spec or DDL-level operation named an attribute the schema
    /// doesn't have. (A WHERE leaf naming an unknown attribute is *not* an
    /// error — it evaluates to `false` per §7.)
    #[error("unknown attribute: '{name}'")]
    UnknownAttribute { name: String },

    /// `ParsedQuery.table` did not match the table this store is bound to.
    #[error("table mismatch: expected '{expected}', found '{found}'")]
    TableMismatch { expected: String, found: String },

    /// I/O failure while opening, appending to, or rewriting the backing CSV.
    #[error("I/O error during '{operation}' on '{path}': {reason}")]
    Io {
        operation: String,
        path: String,
        reason: String,
    },

    /// RFC-4180 parse failure while loading a backing CSV file.
    #[error("CSV error in '{path}' at line {line}: {reason}")]
    Csv {
        path: String,
        line: usize,
        reason: String,
    },

    /// `ParsedQuery.command` was `NONE` or otherwise unrecognised.
    #[error("unsupported command: '{command}'")]
    UnsupportedCommand { command: String },

    /// An index already exists for the given attribute.
    #[error("index already exists on attribute '{name}'")]
    IndexAlreadyExists { name: String },
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Io {
            operation: "unknown".to_string(),
            path: String::new(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod error_test;
