// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! External interface shapes between the core and its parser/driver
//! collaborators: the pre-parsed query the core consumes, and the
//! detached result snapshot it returns.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::predicate::Condition;
use crate::schema::FieldType;

/// The statement kind a [`ParsedQuery`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Select,
    Insert,
    Delete,
    /// No recognized statement — the driver reports this as unsupported
    /// and moves on to the next statement in the query file.
    None,
}

/// A pre-parsed statement, handed to the core by the tokenizer/parser
/// collaborator (out of scope for this crate — see §1).
#[derive(Debug, Clone)]
pub struct ParsedQuery {
    pub command: Command,
    pub table: String,
    /// Requested SELECT columns; ignored unless `command == Select`.
    pub columns: Vec<String>,
    /// `true` for `SELECT *`, or when `columns` is empty (§4.4 edge-case
    /// policy: zero requested columns expands to all columns).
    pub select_all: bool,
    /// Ordered textual values for INSERT, expected to have exactly as many
    /// entries as `crate::schema::SCHEMA`.
    pub insert_values: Vec<String>,
    /// Root of the WHERE-clause chain; `None` means "match every row"
    /// (§4.4 edge-case policy: an empty WHERE clause matches every row).
    pub condition: Option<Condition>,
    pub order_by: Option<String>,
    pub order_desc: bool,
}

impl ParsedQuery {
    pub fn select(table: impl Into<String>) -> Self {
        Self {
            command: Command::Select,
            table: table.into(),
            columns: Vec::new(),
            select_all: true,
            insert_values: Vec::new(),
            condition: None,
            order_by: None,
            order_desc: false,
        }
    }

    pub fn insert(table: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            command: Command::Insert,
            table: table.into(),
            columns: Vec::new(),
            select_all: false,
            insert_values: values,
            condition: None,
            order_by: None,
            order_desc: false,
        }
    }

    pub fn delete(table: impl Into<String>) -> Self {
        Self {
            command: Command::Delete,
            table: table.into(),
            columns: Vec::new(),
            select_all: false,
            insert_values: Vec::new(),
            condition: None,
            order_by: None,
            order_desc: false,
        }
    }
}

/// A detached snapshot of a query's output: row/column counts, column
/// metadata, and a textual cell matrix. Carries no reference back into the
/// store, so it outlives the statement that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSet {
    pub row_count: usize,
    pub column_count: usize,
    pub column_names: Vec<String>,
    pub column_types: Vec<FieldType>,
    pub rows: Vec<Vec<String>>,
    pub elapsed: Duration,
    pub success: bool,
}

impl ResultSet {
    pub fn empty_success() -> Self {
        Self {
            row_count: 0,
            column_count: 0,
            column_names: Vec::new(),
            column_types: Vec::new(),
            rows: Vec::new(),
            elapsed: Duration::ZERO,
            success: true,
        }
    }

    pub fn failure() -> Self {
        Self {
            success: false,
            ..Self::empty_success()
        }
    }
}

#[cfg(test)]
mod query_test;
