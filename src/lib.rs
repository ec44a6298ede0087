// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! cmdbase - in-memory, single-table query engine for command-log records.
//!
//! A lightweight, CSV-backed store for a fixed command-log schema, queried
//! through a small SQL-like dialect (`SELECT`/`INSERT`/`DELETE` with
//! parenthesized `AND`/`OR` WHERE clauses) and accelerated by B+-Tree
//! secondary indexes on any bound attribute.
//!
//! ## Quick start
//!
//! ```
//! use cmdbase::query::ParsedQuery;
//! use cmdbase::schema::FieldType;
//! use cmdbase::store::RecordStore;
//! use cmdbase::planner::{self, ExecResult};
//!
//! # fn main() -> Result<(), cmdbase::error::EngineError> {
//! let dir = tempfile::tempdir().unwrap();
//! let mut store = RecordStore::open("commands", dir.path().join("commands.csv"))?;
//! store.add_index("command_id", FieldType::U64)?;
//!
//! let values = vec![
//!     "1".into(), "ls -la".into(), "ls".into(), "bash".into(), "0".into(),
//!     "2026-01-01T00:00:00Z".into(), "0".into(), "/home/user".into(),
//!     "1000".into(), "alice".into(), "box1".into(), "1".into(),
//! ];
//! let query = ParsedQuery::insert("commands", values);
//! if let ExecResult::Insert(ok) = planner::execute(&mut store, &query)? {
//!     assert!(ok);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **key**: the tagged, totally-ordered `Key` type every index stores.
//! - **schema**: the fixed command-log field layout and literal coercion.
//! - **row**: the record type, its validation, and attribute extraction.
//! - **btree**: the order-*k* B+-Tree secondary index.
//! - **predicate**: the compiled WHERE-clause tree.
//! - **query**: the external `ParsedQuery`/`ResultSet` interface shapes.
//! - **store**: the row arena, its indexes, and CSV durability glue.
//! - **planner**: probe selection, candidate filtering, projection.
//! - **csv_io**: RFC-4180 load/append/rewrite of the backing file.
//! - **metrics**: store-owned query-latency statistics.
//! - **error**: the engine's structured error taxonomy.

/// Default B+-Tree fanout (*k*) used by [`store::RecordStore::open`] when no
/// explicit order is supplied. 128 keeps node splits rare for the row
/// volumes this engine targets while staying small enough that a handful
/// of test rows can still exercise split/merge paths at lower orders via
/// [`store::RecordStore::open_with_order`].
pub const DEFAULT_ORDER: u16 = 128;

pub mod btree;
pub mod csv_io;
pub mod error;
pub mod key;
pub mod metrics;
pub mod planner;
pub mod predicate;
pub mod query;
pub mod row;
pub mod schema;
pub mod store;
