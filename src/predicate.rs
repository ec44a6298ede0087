// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Compiled WHERE-clause predicate tree.
//!
//! The parser collaborator hands the core a [`Condition`] chain built from
//! raw literal text (see §4.3 of the component design this mirrors).
//! [`compile`] resolves each leaf's attribute against the schema once,
//! coercing its literal into a [`Key`] a single time, rather than
//! re-parsing the literal on every candidate row — the per-field-per-operator
//! function matrix the original engine generated by macro collapses into
//! one `(field_type, operator)` dispatch over a cached value.

use crate::key::Key;
use crate::row::Row;
use crate::schema::{self, FieldType};

/// Comparison operator recognized in a WHERE leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// How two sibling expressions in a chain combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
    /// Terminates the chain — this node is the last one.
    None,
}

/// A single `attribute OP literal` leaf, as supplied by the parser.
///
/// `numeric_flag` is the parser's own hint about whether the literal looks
/// numeric; the core does not need it to coerce (the schema's field type is
/// authoritative) but keeps it to preserve the external shape the parser
/// collaborator produces.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub attribute: String,
    pub operator: Operator,
    pub literal: String,
    pub numeric_flag: bool,
}

/// One node's payload: either a comparison leaf or a parenthesized group
/// wrapping a nested chain.
#[derive(Debug, Clone)]
pub enum ExprKind {
    Comparison(Comparison),
    Group(Box<Condition>),
}

/// One link in the WHERE-clause sibling chain. `logic_op` says how this
/// node's result combines with `next`'s; when it is `LogicOp::None`, `next`
/// is expected to be `None` and the chain ends here.
#[derive(Debug, Clone)]
pub struct Condition {
    pub kind: ExprKind,
    pub logic_op: LogicOp,
    pub next: Option<Box<Condition>>,
}

/// A compiled leaf: the same comparison, plus its resolved field type and
/// a once-coerced `Key` (`None` if coercion failed or the attribute is
/// unknown to the schema — both cases evaluate to `false`, never an error).
#[derive(Debug, Clone)]
struct CompiledComparison {
    attribute: String,
    operator: Operator,
    field_type: Option<FieldType>,
    coerced: Option<Key>,
}

#[derive(Debug, Clone)]
enum CompiledKind {
    Comparison(CompiledComparison),
    Group(Box<CompiledCondition>),
}

/// A compiled WHERE-clause chain, ready for repeated evaluation against
/// many candidate rows without re-parsing any literal.
#[derive(Debug, Clone)]
pub struct CompiledCondition {
    kind: CompiledKind,
    logic_op: LogicOp,
    next: Option<Box<CompiledCondition>>,
}

/// Compiles a raw parser-supplied [`Condition`] chain into a
/// [`CompiledCondition`] chain.
pub fn compile(condition: &Condition) -> CompiledCondition {
    let kind = match &condition.kind {
        ExprKind::Comparison(c) => {
            let field_type = schema::field_info(&c.attribute).map(|f| f.field_type);
            let coerced = field_type.and_then(|ft| schema::coerce(ft, &c.literal));
            CompiledKind::Comparison(CompiledComparison {
                attribute: c.attribute.clone(),
                operator: c.operator,
                field_type,
                coerced,
            })
        }
        ExprKind::Group(child) => CompiledKind::Group(Box::new(compile(child))),
    };
    CompiledCondition {
        kind,
        logic_op: condition.logic_op,
        next: condition.next.as_ref().map(|n| Box::new(compile(n))),
    }
}

impl CompiledCondition {
    /// Evaluates this chain against `row`, short-circuiting `AND`/`OR` as
    /// required: `AND` with a false left side never evaluates the right,
    /// `OR` with a true left side never evaluates the right.
    pub fn eval(&self, row: &Row) -> bool {
        let here = self.eval_node(row);
        match self.logic_op {
            LogicOp::None => here,
            LogicOp::And => {
                if !here {
                    return false;
                }
                self.next
                    .as_ref()
                    .map(|n| n.eval(row))
                    .unwrap_or(here)
            }
            LogicOp::Or => {
                if here {
                    return true;
                }
                self.next
                    .as_ref()
                    .map(|n| n.eval(row))
                    .unwrap_or(here)
            }
        }
    }

    fn eval_node(&self, row: &Row) -> bool {
        match &self.kind {
            CompiledKind::Comparison(c) => eval_comparison(c, row),
            CompiledKind::Group(child) => child.eval(row),
        }
    }

    /// The attribute name of this node if it is a bare comparison leaf
    /// (not a group), for probe-leaf selection in the planner.
    pub(crate) fn as_leaf(&self) -> Option<(&str, Operator, &Option<Key>)> {
        match &self.kind {
            CompiledKind::Comparison(c) => Some((&c.attribute, c.operator, &c.coerced)),
            CompiledKind::Group(_) => None,
        }
    }

    pub(crate) fn next(&self) -> Option<&CompiledCondition> {
        self.next.as_deref()
    }

    /// How this node combines with `next`, for the planner's decision about
    /// whether a top-level chain is safe to narrow with an index probe
    /// (only an all-`AND` chain is — any `OR` means a probe on one leaf
    /// could exclude rows that match through a different disjunct).
    pub(crate) fn logic_op(&self) -> LogicOp {
        self.logic_op
    }

    pub(crate) fn group_child(&self) -> Option<&CompiledCondition> {
        match &self.kind {
            CompiledKind::Group(child) => Some(child),
            CompiledKind::Comparison(_) => None,
        }
    }
}

fn eval_comparison(c: &CompiledComparison, row: &Row) -> bool {
    let Some(field_type) = c.field_type else {
        return false;
    };
    let Some(target) = &c.coerced else {
        return false;
    };
    let Some(actual) = row.extract_key(&c.attribute) else {
        return false;
    };
    debug_assert_eq!(
        std::mem::discriminant(&actual),
        std::mem::discriminant(target),
        "row field {} does not match schema type {:?}",
        c.attribute,
        field_type
    );
    match c.operator {
        Operator::Eq => actual == *target,
        Operator::Ne => actual != *target,
        Operator::Lt => actual < *target,
        Operator::Le => actual <= *target,
        Operator::Gt => actual > *target,
        Operator::Ge => actual >= *target,
    }
}

#[cfg(test)]
mod predicate_test;
