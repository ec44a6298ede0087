// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! The fixed-width command-log record and its validation/extraction rules.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::key::Key;
use crate::schema::{self, FieldType};

/// One command-log record.
///
/// Field order here matches the CSV wire format (`crate::csv_io`) and the
/// schema table (`crate::schema::SCHEMA`): `command_id`, `raw_command`,
/// `base_command`, `shell_type`, `exit_code`, `timestamp`, `sudo_used`,
/// `working_directory`, `user_id`, `user_name`, `host_name`, `risk_level`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub command_id: u64,
    pub raw_command: String,
    pub base_command: String,
    pub shell_type: String,
    pub exit_code: i32,
    pub timestamp: String,
    pub sudo_used: bool,
    pub working_directory: String,
    pub user_id: i32,
    pub user_name: String,
    pub host_name: String,
    pub risk_level: i32,
}

impl Row {
    /// Validates the required-field rules from §3: `command_id` must be
    /// non-zero, and every bounded string must be non-empty and within its
    /// maximum length.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.command_id == 0 {
            return Err(EngineError::SchemaViolation {
                field: "command_id".to_string(),
                reason: "must be non-zero".to_string(),
            });
        }

        for (name, value) in self.string_fields() {
            if value.is_empty() {
                return Err(EngineError::SchemaViolation {
                    field: name.to_string(),
                    reason: "required field is empty".to_string(),
                });
            }
            if let Some(max) = schema::max_len(name) {
                if value.len() > max {
                    return Err(EngineError::SchemaViolation {
                        field: name.to_string(),
                        reason: format!("exceeds maximum length {max}"),
                    });
                }
            }
        }

        Ok(())
    }

    fn string_fields(&self) -> [(&'static str, &str); 7] {
        [
            ("raw_command", &self.raw_command),
            ("base_command", &self.base_command),
            ("shell_type", &self.shell_type),
            ("timestamp", &self.timestamp),
            ("working_directory", &self.working_directory),
            ("user_name", &self.user_name),
            ("host_name", &self.host_name),
        ]
    }

    /// Extracts the indexable `Key` for a named attribute, for index
    /// insertion/deletion and for computing probe ranges.
    ///
    /// Returns `None` for an attribute not present in the schema.
    pub fn extract_key(&self, attr: &str) -> Option<Key> {
        match attr {
            "command_id" => Some(Key::U64(self.command_id)),
            "exit_code" => Some(Key::I32(self.exit_code)),
            "user_id" => Some(Key::I32(self.user_id)),
            "risk_level" => Some(Key::I32(self.risk_level)),
            "sudo_used" => Some(Key::Bool(self.sudo_used)),
            "raw_command" => Some(Key::Str(self.raw_command.clone())),
            "base_command" => Some(Key::Str(self.base_command.clone())),
            "shell_type" => Some(Key::Str(self.shell_type.clone())),
            "timestamp" => Some(Key::Str(self.timestamp.clone())),
            "working_directory" => Some(Key::Str(self.working_directory.clone())),
            "user_name" => Some(Key::Str(self.user_name.clone())),
            "host_name" => Some(Key::Str(self.host_name.clone())),
            _ => None,
        }
    }

    /// Renders a named attribute's value in its canonical string form, for
    /// `ResultSet` projection. Booleans render as `0`/`1` to match the CSV
    /// serialization convention (§4.5).
    pub fn cell(&self, attr: &str) -> Option<String> {
        match attr {
            "command_id" => Some(self.command_id.to_string()),
            "exit_code" => Some(self.exit_code.to_string()),
            "user_id" => Some(self.user_id.to_string()),
            "risk_level" => Some(self.risk_level.to_string()),
            "sudo_used" => Some(if self.sudo_used { "1" } else { "0" }.to_string()),
            "raw_command" => Some(self.raw_command.clone()),
            "base_command" => Some(self.base_command.clone()),
            "shell_type" => Some(self.shell_type.clone()),
            "timestamp" => Some(self.timestamp.clone()),
            "working_directory" => Some(self.working_directory.clone()),
            "user_name" => Some(self.user_name.clone()),
            "host_name" => Some(self.host_name.clone()),
            _ => None,
        }
    }

    /// Returns the field type for a named attribute, for predicate
    /// compilation and probe eligibility checks.
    pub fn field_type(attr: &str) -> Option<FieldType> {
        schema::field_info(attr).map(|f| f.field_type)
    }
}

#[cfg(test)]
mod row_test;
