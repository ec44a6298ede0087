// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! The in-memory record store: row arena, secondary indexes, and the CSV
//! file each table is bound to.
//!
//! A row lives at a stable `RowId` (its arena slot) for as long as it is
//! live; deleting it frees the slot for reuse and removes every index
//! entry that pointed at it, so the indexes and the row arena never drift
//! apart (I1/I2).

use std::path::{Path, PathBuf};

use crate::btree::{BPlusTree, Order};
use crate::csv_io;
use crate::error::{EngineError, EngineResult};
use crate::key::Key;
use crate::metrics::MetricsCollector;
use crate::row::Row;
use crate::schema::{self, FieldType};

/// Stable identity of a live row: its slot in the store's row arena.
pub type RowId = usize;

struct IndexEntry {
    attribute: String,
    field_type: FieldType,
    tree: BPlusTree<RowId>,
}

/// The single-table record store: row arena plus zero or more secondary
/// indexes, bound to one backing CSV file.
pub struct RecordStore {
    table: String,
    path: PathBuf,
    order: Order,
    rows: Vec<Option<Row>>,
    free_rows: Vec<RowId>,
    indexes: Vec<IndexEntry>,
    metrics: MetricsCollector,
}

impl RecordStore {
    /// Opens `table` backed by the CSV file at `path`, loading every
    /// surviving row into the arena. No secondary indexes exist yet;
    /// callers add them with [`add_index`](Self::add_index).
    pub fn open(table: impl Into<String>, path: impl AsRef<Path>) -> EngineResult<Self> {
        Self::open_with_order(table, path, Order::default())
    }

    /// Same as [`open`](Self::open), but with an explicit B+-Tree fanout
    /// instead of [`DEFAULT_ORDER`](crate::DEFAULT_ORDER) — tests use this
    /// to force splits/merges without needing a large fixture.
    pub fn open_with_order(
        table: impl Into<String>,
        path: impl AsRef<Path>,
        order: Order,
    ) -> EngineResult<Self> {
        let path = path.as_ref().to_path_buf();
        let loaded = csv_io::load(&path)?;

        let mut store = Self {
            table: table.into(),
            path,
            order,
            rows: Vec::new(),
            free_rows: Vec::new(),
            indexes: Vec::new(),
            metrics: MetricsCollector::new(),
        };
        for row in loaded {
            store.insert_row_arena(row);
        }
        Ok(store)
    }

    /// Flushes nothing further — every mutation is already durable on
    /// disk by the time it returns (append-on-insert, rewrite-on-delete).
    /// Kept as an explicit lifecycle step mirroring the component design's
    /// open/close symmetry.
    pub fn close(self) {}

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn order(&self) -> Order {
        self.order
    }

    pub fn len(&self) -> usize {
        self.rows.iter().filter(|r| r.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    pub fn metrics_mut(&mut self) -> &mut MetricsCollector {
        &mut self.metrics
    }

    pub fn get(&self, id: RowId) -> Option<&Row> {
        self.rows.get(id).and_then(|r| r.as_ref())
    }

    /// Iterates every live row in arena order, paired with its `RowId`.
    pub fn rows(&self) -> impl Iterator<Item = (RowId, &Row)> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.as_ref().map(|row| (id, row)))
    }

    /// Names of every currently-indexed attribute, in creation order.
    pub fn indexed_attributes(&self) -> impl Iterator<Item = &str> {
        self.indexes.iter().map(|e| e.attribute.as_str())
    }

    fn index_position(&self, attribute: &str) -> Option<usize> {
        self.indexes.iter().position(|e| e.attribute == attribute)
    }

    /// Builds a secondary index over `attribute`, back-filling it from
    /// every row already present. Errors if the attribute is unknown to
    /// the schema or already indexed.
    pub fn add_index(&mut self, attribute: &str, field_type: FieldType) -> EngineResult<()> {
        if schema::field_info(attribute).is_none() {
            return Err(EngineError::UnknownAttribute {
                name: attribute.to_string(),
            });
        }
        if self.index_position(attribute).is_some() {
            return Err(EngineError::IndexAlreadyExists {
                name: attribute.to_string(),
            });
        }
        let mut tree = BPlusTree::new(self.order);
        for (id, row) in self.rows() {
            if let Some(key) = row.extract_key(attribute) {
                tree.insert(key, id);
            }
        }
        self.indexes.push(IndexEntry {
            attribute: attribute.to_string(),
            field_type,
            tree,
        });
        Ok(())
    }

    /// Looks up the index on `attribute`, if one exists, along with its
    /// field type — used by the planner to decide probe eligibility.
    pub(crate) fn index_for(&self, attribute: &str) -> Option<(FieldType, &BPlusTree<RowId>)> {
        self.index_position(attribute)
            .map(|i| (self.indexes[i].field_type, &self.indexes[i].tree))
    }

    fn insert_row_arena(&mut self, row: Row) -> RowId {
        let id = if let Some(id) = self.free_rows.pop() {
            self.rows[id] = Some(row);
            id
        } else {
            self.rows.push(Some(row));
            self.rows.len() - 1
        };
        for entry in &mut self.indexes {
            if let Some(key) = self.rows[id].as_ref().and_then(|r| r.extract_key(&entry.attribute)) {
                entry.tree.insert(key, id);
            }
        }
        id
    }

    /// Validates and inserts one row: arena slot, every secondary index,
    /// and an append to the backing CSV file, in that order so a failed
    /// write never leaves the in-memory state ahead of disk.
    pub fn insert(&mut self, row: Row) -> EngineResult<RowId> {
        row.validate()?;
        csv_io::append(&self.path, &row)?;
        Ok(self.insert_row_arena(row))
    }

    /// Removes the rows named by `ids` from the arena and every index,
    /// then rewrites the backing CSV file from the surviving rows.
    /// Returns the number actually removed (ids already absent are
    /// silently ignored, per §4.2's idempotent-delete policy).
    pub fn remove_rows(&mut self, ids: &[RowId]) -> EngineResult<usize> {
        let mut removed = 0;
        for &id in ids {
            let Some(row) = self.rows.get(id).and_then(|r| r.clone()) else {
                continue;
            };
            for entry in &mut self.indexes {
                if let Some(key) = row.extract_key(&entry.attribute) {
                    entry.tree.delete(&key, &id);
                }
            }
            self.rows[id] = None;
            self.free_rows.push(id);
            removed += 1;
        }
        if removed > 0 {
            let survivors: Vec<&Row> = self.rows.iter().filter_map(|r| r.as_ref()).collect();
            csv_io::rewrite(&self.path, &survivors)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod store_test;
