// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! In-memory B+-Tree secondary index.
//!
//! Implements the heterogeneous-key, duplicate-tolerant B+-Tree described in
//! the component design: order-*k* tree, leaves threaded by a forward
//! sibling link for range scans, insertion by split, deletion by
//! coalesce/redistribute.

mod node;
mod tree;
pub mod types;

pub use tree::BPlusTree;
pub use types::Order;
