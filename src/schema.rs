// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Fixed record schema and key extraction for the command-log table.
//!
//! The schema is a process-wide, immutable mapping from attribute name to
//! field type. It is the single source of truth both the predicate compiler
//! (`crate::predicate`) and the index builder (`crate::store`) use to
//! resolve attribute names, so a renamed or mistyped column is caught in one
//! place.

use serde::{Deserialize, Serialize};

use crate::key::Key;

/// The type of a schema field, mirroring the four `Key` variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    U64,
    I32,
    Bool,
    Str,
}

/// Metadata about one named attribute of the row schema.
#[derive(Debug, Clone, Copy)]
pub struct FieldInfo {
    pub name: &'static str,
    pub field_type: FieldType,
}

/// Fixed field order, matching the CSV wire format in `crate::csv_io` and
/// the authoritative field layout from the original record struct: one
/// `u64` key, three `i32` fields, one `bool`, and seven bounded strings.
pub const SCHEMA: &[FieldInfo] = &[
    FieldInfo {
        name: "command_id",
        field_type: FieldType::U64,
    },
    FieldInfo {
        name: "raw_command",
        field_type: FieldType::Str,
    },
    FieldInfo {
        name: "base_command",
        field_type: FieldType::Str,
    },
    FieldInfo {
        name: "shell_type",
        field_type: FieldType::Str,
    },
    FieldInfo {
        name: "exit_code",
        field_type: FieldType::I32,
    },
    FieldInfo {
        name: "timestamp",
        field_type: FieldType::Str,
    },
    FieldInfo {
        name: "sudo_used",
        field_type: FieldType::Bool,
    },
    FieldInfo {
        name: "working_directory",
        field_type: FieldType::Str,
    },
    FieldInfo {
        name: "user_id",
        field_type: FieldType::I32,
    },
    FieldInfo {
        name: "user_name",
        field_type: FieldType::Str,
    },
    FieldInfo {
        name: "host_name",
        field_type: FieldType::Str,
    },
    FieldInfo {
        name: "risk_level",
        field_type: FieldType::I32,
    },
];

/// Maximum byte length for each bounded string field, indexed by attribute
/// name. Referenced only from `Row::validate` — the bound is a constraint on
/// insert, not part of the type itself.
pub fn max_len(attr: &str) -> Option<usize> {
    match attr {
        "raw_command" => Some(512),
        "base_command" => Some(100),
        "shell_type" => Some(20),
        "timestamp" => Some(30),
        "working_directory" => Some(200),
        "user_name" => Some(50),
        "host_name" => Some(100),
        _ => None,
    }
}

/// Looks up field metadata by attribute name.
pub fn field_info(name: &str) -> Option<&'static FieldInfo> {
    SCHEMA.iter().find(|f| f.name == name)
}

/// Coerces a literal's text form into a `Key` of the given field type.
///
/// ## Coercion rules
/// - `U64`/`I32`: standard decimal parse.
/// - `Bool`: case-insensitive `true`/`false`, or `0`/`1`.
/// - `Str`: the literal text, unchanged.
///
/// Returns `None` on failure; callers treat this as "coercion failed" per
/// §4.3/§7 (the leaf evaluates `false`, never a hard error).
pub fn coerce(field_type: FieldType, literal: &str) -> Option<Key> {
    match field_type {
        FieldType::U64 => literal.parse::<u64>().ok().map(Key::U64),
        FieldType::I32 => literal.parse::<i32>().ok().map(Key::I32),
        FieldType::Bool => coerce_bool(literal).map(Key::Bool),
        FieldType::Str => Some(Key::Str(literal.to_string())),
    }
}

pub(crate) fn coerce_bool(literal: &str) -> Option<bool> {
    match literal.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod schema_test;
