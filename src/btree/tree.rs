// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! The B+-Tree proper: descent, point/range lookup, insert-with-split, and
//! delete-with-redistribute/coalesce.
//!
//! Node linkage lives entirely in `NodeId`s resolved through the arena in
//! [`node`](super::node); nothing here holds a reference into another node
//! across a mutation. The split/merge shapes mirror the classic
//! order-*k* B+-Tree (first-greater descent, ⌈(k-1)/2⌉ leaf / ⌈k/2⌉-1
//! internal minimums, left-sibling-preferred redistribute/coalesce).

use super::node::{Arena, InternalNode, LeafNode, Node, NodeId};
use super::types::Order;
use crate::key::Key;

/// In-memory order-*k* B+-Tree, the backing structure for every secondary
/// index the record store maintains.
///
/// Duplicate keys are permitted: a single key may be associated with many
/// values, possibly spread across adjacent leaves.
pub struct BPlusTree<V> {
    arena: Arena<V>,
    root: Option<NodeId>,
    order: Order,
}

impl<V> BPlusTree<V> {
    pub fn new(order: Order) -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            order,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn order(&self) -> Order {
        self.order
    }

    /// Inserts `(key, value)`. Duplicate keys are always appended, never
    /// merged with an existing entry.
    pub fn insert(&mut self, key: Key, value: V) {
        if self.root.is_none() {
            let leaf = LeafNode {
                keys: vec![key],
                values: vec![value],
                next: None,
                parent: None,
            };
            self.root = Some(self.arena.alloc(Node::Leaf(leaf)));
            return;
        }

        let leaf_id = self.descend_to_leaf(&key);
        {
            let leaf = self.arena.get_mut(leaf_id).as_leaf_mut();
            let pos = leaf.keys.partition_point(|k| k < &key);
            leaf.keys.insert(pos, key);
            leaf.values.insert(pos, value);
        }
        if self.arena.get(leaf_id).num_keys() > self.order.max_keys() {
            self.split_leaf(leaf_id);
        }
    }

    /// Descends from the root to the leaf where `key` belongs, using the
    /// "first separator strictly greater than `key`" rule at every internal
    /// node. Panics if the tree is empty — callers must check `is_empty`.
    fn descend_to_leaf(&self, key: &Key) -> NodeId {
        let mut current = self.root.expect("descend called on an empty tree");
        loop {
            let child = match self.arena.get(current) {
                Node::Leaf(_) => return current,
                Node::Internal(n) => {
                    let idx = n.keys.partition_point(|k| k <= key);
                    n.children[idx]
                }
            };
            current = child;
        }
    }

    fn split_leaf(&mut self, leaf_id: NodeId) {
        let split = self.order.min_leaf_keys();
        let (new_keys, new_values, parent, old_next) = {
            let leaf = self.arena.get_mut(leaf_id).as_leaf_mut();
            let new_keys = leaf.keys.split_off(split);
            let new_values = leaf.values.split_off(split);
            (new_keys, new_values, leaf.parent, leaf.next)
        };
        let new_leaf = LeafNode {
            keys: new_keys,
            values: new_values,
            next: old_next,
            parent,
        };
        let new_id = self.arena.alloc(Node::Leaf(new_leaf));
        self.arena.get_mut(leaf_id).as_leaf_mut().next = Some(new_id);
        let promoted = self.arena.get(new_id).as_leaf().keys[0].clone();
        self.insert_into_parent(leaf_id, promoted, new_id);
    }

    fn split_internal(&mut self, node_id: NodeId) {
        let li = self.order.min_internal_keys();
        let (promoted, right_keys, right_children, parent) = {
            let node = self.arena.get_mut(node_id).as_internal_mut();
            let right_keys = node.keys.split_off(li + 1);
            let promoted = node.keys.pop().expect("split point key must exist");
            let right_children = node.children.split_off(li + 1);
            (promoted, right_keys, right_children, node.parent)
        };
        let right_id = self.arena.alloc(Node::Internal(InternalNode {
            keys: right_keys,
            children: right_children.clone(),
            parent,
        }));
        for child in right_children {
            self.arena.get_mut(child).set_parent(Some(right_id));
        }
        self.insert_into_parent(node_id, promoted, right_id);
    }

    fn insert_into_parent(&mut self, left_id: NodeId, key: Key, right_id: NodeId) {
        match self.arena.get(left_id).parent() {
            None => {
                let new_root = InternalNode {
                    keys: vec![key],
                    children: vec![left_id, right_id],
                    parent: None,
                };
                let new_root_id = self.arena.alloc(Node::Internal(new_root));
                self.arena.get_mut(left_id).set_parent(Some(new_root_id));
                self.arena.get_mut(right_id).set_parent(Some(new_root_id));
                self.root = Some(new_root_id);
            }
            Some(parent_id) => {
                self.arena.get_mut(right_id).set_parent(Some(parent_id));
                let pos = self.child_position(parent_id, left_id);
                {
                    let parent = self.arena.get_mut(parent_id).as_internal_mut();
                    parent.keys.insert(pos, key);
                    parent.children.insert(pos + 1, right_id);
                }
                if self.arena.get(parent_id).num_keys() > self.order.max_keys() {
                    self.split_internal(parent_id);
                }
            }
        }
    }

    fn child_position(&self, parent_id: NodeId, child_id: NodeId) -> usize {
        self.arena
            .get(parent_id)
            .as_internal()
            .children
            .iter()
            .position(|&c| c == child_id)
            .expect("node is not among its recorded parent's children")
    }
}

impl<V: Clone> BPlusTree<V> {
    /// Point lookup with duplicate tolerance: descends to the leftmost leaf
    /// where `key` could appear, then walks forward across sibling links
    /// collecting every equal-key entry.
    pub fn find_all(&self, key: &Key) -> Vec<V> {
        let mut out = Vec::new();
        if self.root.is_none() {
            return out;
        }
        let mut leaf_id = Some(self.descend_to_leaf(key));
        let mut start = self
            .arena
            .get(leaf_id.unwrap())
            .as_leaf()
            .keys
            .partition_point(|k| k < key);

        while let Some(id) = leaf_id {
            let leaf = self.arena.get(id).as_leaf();
            let mut i = start;
            while i < leaf.keys.len() && &leaf.keys[i] == key {
                out.push(leaf.values[i].clone());
                i += 1;
            }
            if i < leaf.keys.len() {
                break;
            }
            leaf_id = leaf.next;
            start = 0;
        }
        out
    }

    /// Closed-interval range scan `[lo, hi]`, following sibling links.
    pub fn range(&self, lo: &Key, hi: &Key) -> Vec<(Key, V)> {
        let mut out = Vec::new();
        if self.root.is_none() {
            return out;
        }
        let mut leaf_id = Some(self.descend_to_leaf(lo));
        let mut start = self
            .arena
            .get(leaf_id.unwrap())
            .as_leaf()
            .keys
            .partition_point(|k| k < lo);

        while let Some(id) = leaf_id {
            let leaf = self.arena.get(id).as_leaf();
            let mut i = start;
            let mut stopped = false;
            while i < leaf.keys.len() {
                if &leaf.keys[i] > hi {
                    stopped = true;
                    break;
                }
                out.push((leaf.keys[i].clone(), leaf.values[i].clone()));
                i += 1;
            }
            if stopped {
                break;
            }
            leaf_id = leaf.next;
            start = 0;
        }
        out
    }
}

impl<V: PartialEq> BPlusTree<V> {
    /// Deletes the specific `(key, value)` pair. A pair that does not exist
    /// leaves the tree unchanged — this is not reported as an error.
    pub fn delete(&mut self, key: &Key, value: &V) {
        if self.root.is_none() {
            return;
        }
        let Some((leaf_id, idx)) = self.locate(key, value) else {
            return;
        };
        {
            let leaf = self.arena.get_mut(leaf_id).as_leaf_mut();
            leaf.keys.remove(idx);
            leaf.values.remove(idx);
        }
        self.fixup(leaf_id);
    }

    fn locate(&self, key: &Key, value: &V) -> Option<(NodeId, usize)> {
        let mut leaf_id = self.descend_to_leaf(key);
        loop {
            let leaf = self.arena.get(leaf_id).as_leaf();
            let start = leaf.keys.partition_point(|k| k < key);
            let mut i = start;
            while i < leaf.keys.len() && &leaf.keys[i] == key {
                if &leaf.values[i] == value {
                    return Some((leaf_id, i));
                }
                i += 1;
            }
            let ran_off_end = i == leaf.keys.len();
            let last_was_equal = leaf.keys.last().is_some_and(|k| k == key);
            if ran_off_end && last_was_equal {
                match leaf.next {
                    Some(next_id) => {
                        leaf_id = next_id;
                        continue;
                    }
                    None => return None,
                }
            }
            return None;
        }
    }

    /// Restores the leaf/internal-node minimum-occupancy invariant after a
    /// single-entry removal from `node_id`, recursing upward through
    /// coalesce as needed.
    fn fixup(&mut self, node_id: NodeId) {
        if Some(node_id) == self.root {
            self.adjust_root();
            return;
        }

        let (is_leaf, num_keys) = {
            let n = self.arena.get(node_id);
            (n.is_leaf(), n.num_keys())
        };
        let min_keys = if is_leaf {
            self.order.min_leaf_keys()
        } else {
            self.order.min_internal_keys()
        };
        if num_keys >= min_keys {
            return;
        }

        let parent_id = self
            .arena
            .get(node_id)
            .parent()
            .expect("non-root node missing a parent");
        let pos = self.child_position(parent_id, node_id);
        let neighbor_index = if pos == 0 { None } else { Some(pos - 1) };
        let (k_prime_index, neighbor_id) = match neighbor_index {
            Some(li) => (li, self.arena.get(parent_id).as_internal().children[li]),
            None => (0usize, self.arena.get(parent_id).as_internal().children[1]),
        };
        let k_prime = self.arena.get(parent_id).as_internal().keys[k_prime_index].clone();

        let capacity = if is_leaf {
            self.order.value() as usize
        } else {
            self.order.max_keys()
        };
        let neighbor_keys = self.arena.get(neighbor_id).num_keys();

        if neighbor_keys + num_keys < capacity {
            self.coalesce(node_id, neighbor_id, neighbor_index, k_prime, parent_id);
        } else {
            self.redistribute(node_id, neighbor_id, neighbor_index, k_prime_index, k_prime);
        }
    }

    fn adjust_root(&mut self) {
        let root_id = self.root.expect("adjust_root called without a root");
        if self.arena.get(root_id).num_keys() > 0 {
            return;
        }
        if self.arena.get(root_id).is_leaf() {
            self.root = None;
        } else {
            let only_child = self.arena.get(root_id).as_internal().children[0];
            self.arena.get_mut(only_child).set_parent(None);
            self.root = Some(only_child);
        }
        self.arena.free(root_id);
    }

    /// Merges an underfull node into a sibling. `neighbor_index` is the
    /// underfull node's left sibling position in the parent, or `None` if
    /// the underfull node is itself the leftmost child (in which case its
    /// right sibling is absorbed into it instead).
    fn coalesce(
        &mut self,
        node_id: NodeId,
        neighbor_id: NodeId,
        neighbor_index: Option<usize>,
        k_prime: Key,
        parent_id: NodeId,
    ) {
        let (surviving_id, absorbed_id) = match neighbor_index {
            Some(_) => (neighbor_id, node_id),
            None => (node_id, neighbor_id),
        };

        let is_leaf = self.arena.get(absorbed_id).is_leaf();
        if is_leaf {
            let (absorbed_keys, absorbed_values, absorbed_next) = {
                let absorbed = self.arena.get_mut(absorbed_id).as_leaf_mut();
                (
                    std::mem::take(&mut absorbed.keys),
                    std::mem::take(&mut absorbed.values),
                    absorbed.next,
                )
            };
            let surviving = self.arena.get_mut(surviving_id).as_leaf_mut();
            surviving.keys.extend(absorbed_keys);
            surviving.values.extend(absorbed_values);
            surviving.next = absorbed_next;
        } else {
            let (absorbed_keys, absorbed_children) = {
                let absorbed = self.arena.get_mut(absorbed_id).as_internal_mut();
                (
                    std::mem::take(&mut absorbed.keys),
                    std::mem::take(&mut absorbed.children),
                )
            };
            {
                let surviving = self.arena.get_mut(surviving_id).as_internal_mut();
                surviving.keys.push(k_prime.clone());
                surviving.keys.extend(absorbed_keys);
                surviving.children.extend(absorbed_children.iter().copied());
            }
            for child in absorbed_children {
                self.arena.get_mut(child).set_parent(Some(surviving_id));
            }
        }

        self.arena.free(absorbed_id);
        self.remove_entry_from_internal(parent_id, &k_prime, absorbed_id);
        self.fixup(parent_id);
    }

    fn remove_entry_from_internal(&mut self, node_id: NodeId, key: &Key, child: NodeId) {
        let node = self.arena.get_mut(node_id).as_internal_mut();
        let ki = node
            .keys
            .iter()
            .position(|k| k == key)
            .expect("separator key missing from internal node during deletion");
        node.keys.remove(ki);
        let ci = node
            .children
            .iter()
            .position(|&c| c == child)
            .expect("child pointer missing from internal node during deletion");
        node.children.remove(ci);
    }

    /// Borrows a single entry from `neighbor_id` to bring `node_id` back to
    /// the minimum occupancy, updating the separator in `node_id`'s parent.
    fn redistribute(
        &mut self,
        node_id: NodeId,
        neighbor_id: NodeId,
        neighbor_index: Option<usize>,
        k_prime_index: usize,
        k_prime: Key,
    ) {
        let parent_id = self
            .arena
            .get(node_id)
            .parent()
            .expect("redistribute target must have a parent");
        let is_leaf = self.arena.get(node_id).is_leaf();

        match neighbor_index {
            Some(_) => {
                // `node_id` borrows the neighbor's last entry onto its front.
                if is_leaf {
                    let (borrowed_key, borrowed_value) = {
                        let neighbor = self.arena.get_mut(neighbor_id).as_leaf_mut();
                        (
                            neighbor.keys.pop().expect("neighbor has a spare entry"),
                            neighbor.values.pop().expect("neighbor has a spare entry"),
                        )
                    };
                    {
                        let node = self.arena.get_mut(node_id).as_leaf_mut();
                        node.keys.insert(0, borrowed_key.clone());
                        node.values.insert(0, borrowed_value);
                    }
                    self.arena.get_mut(parent_id).as_internal_mut().keys[k_prime_index] =
                        borrowed_key;
                } else {
                    let (borrowed_key, borrowed_child) = {
                        let neighbor = self.arena.get_mut(neighbor_id).as_internal_mut();
                        (
                            neighbor.keys.pop().expect("neighbor has a spare entry"),
                            neighbor
                                .children
                                .pop()
                                .expect("neighbor has a spare child"),
                        )
                    };
                    {
                        let node = self.arena.get_mut(node_id).as_internal_mut();
                        node.keys.insert(0, k_prime);
                        node.children.insert(0, borrowed_child);
                    }
                    self.arena.get_mut(borrowed_child).set_parent(Some(node_id));
                    self.arena.get_mut(parent_id).as_internal_mut().keys[k_prime_index] =
                        borrowed_key;
                }
            }
            None => {
                // `node_id` is the leftmost child; it borrows the neighbor's
                // first entry onto its end.
                if is_leaf {
                    let (borrowed_key, borrowed_value) = {
                        let neighbor = self.arena.get_mut(neighbor_id).as_leaf_mut();
                        (neighbor.keys.remove(0), neighbor.values.remove(0))
                    };
                    {
                        let node = self.arena.get_mut(node_id).as_leaf_mut();
                        node.keys.push(borrowed_key);
                        node.values.push(borrowed_value);
                    }
                    let new_separator = self.arena.get(neighbor_id).as_leaf().keys[0].clone();
                    self.arena.get_mut(parent_id).as_internal_mut().keys[k_prime_index] =
                        new_separator;
                } else {
                    let (borrowed_key, borrowed_child) = {
                        let neighbor = self.arena.get_mut(neighbor_id).as_internal_mut();
                        (neighbor.keys.remove(0), neighbor.children.remove(0))
                    };
                    {
                        let node = self.arena.get_mut(node_id).as_internal_mut();
                        node.keys.push(k_prime);
                        node.children.push(borrowed_child);
                    }
                    self.arena.get_mut(borrowed_child).set_parent(Some(node_id));
                    self.arena.get_mut(parent_id).as_internal_mut().keys[k_prime_index] =
                        borrowed_key;
                }
            }
        }
    }
}

#[cfg(test)]
mod tree_test;
