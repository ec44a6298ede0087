// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Query planning and execution: turns a [`ParsedQuery`] into row ids via
//! an optional index probe, filters them through the compiled predicate,
//! then projects or removes the survivors.
//!
//! **Probe selection.** A probe narrows the full row set to a candidate
//! set before the predicate filter runs; the candidate set is allowed to
//! be a superset of the true answer (§4.4), since every row is still run
//! through the full predicate before being accepted. That safety margin
//! is what lets the planner skip a "next string after v" sentinel for
//! range probes on text columns — it simply declines to probe those.
//!
//! A probe is only sound when every node in the *top-level* WHERE chain is
//! `AND`-combined: if any top-level node is `OR`-combined, a row could
//! satisfy the whole predicate through a disjunct the probed leaf knows
//! nothing about, so narrowing by that leaf could wrongly drop it. When an
//! `OR` appears at the top level, the planner falls back to a full scan,
//! which is always correct (§8 boundary behavior for `!=`, generalized).

use crate::error::{EngineError, EngineResult};
use crate::key::Key;
use crate::predicate::{self, CompiledCondition, LogicOp, Operator};
use crate::query::{Command, ParsedQuery, ResultSet};
use crate::row::Row;
use crate::schema::{self, FieldType};
use crate::store::{RecordStore, RowId};

/// The outcome of executing one [`ParsedQuery`] against a [`RecordStore`].
#[derive(Debug)]
pub enum ExecResult {
    Select(ResultSet),
    Insert(bool),
    Delete(ResultSet),
}

/// Executes `query` against `store`. Table-name mismatches and unsupported
/// commands are reported as errors; every other failure mode degrades to a
/// `success=false` result per §7's error taxonomy rather than propagating.
pub fn execute(store: &mut RecordStore, query: &ParsedQuery) -> EngineResult<ExecResult> {
    if query.command != Command::None && query.table != store.table() {
        return Err(EngineError::TableMismatch {
            expected: store.table().to_string(),
            found: query.table.clone(),
        });
    }

    match query.command {
        Command::Select => Ok(ExecResult::Select(execute_select(store, query))),
        Command::Insert => Ok(ExecResult::Insert(execute_insert(store, query))),
        Command::Delete => Ok(ExecResult::Delete(execute_delete(store, query))),
        Command::None => Err(EngineError::UnsupportedCommand {
            command: "NONE".to_string(),
        }),
    }
}

fn execute_select(store: &mut RecordStore, query: &ParsedQuery) -> ResultSet {
    let start = std::time::Instant::now();
    let compiled = query.condition.as_ref().map(predicate::compile);

    let mut matched: Vec<RowId> = candidate_ids(store, compiled.as_ref())
        .into_iter()
        .filter(|&id| {
            let row = store.get(id).expect("candidate id came from a live row");
            compiled.as_ref().map(|c| c.eval(row)).unwrap_or(true)
        })
        .collect();

    if let Some(order_by) = &query.order_by {
        if schema::field_info(order_by).is_some() {
            matched.sort_by(|&a, &b| {
                let ka = store.get(a).and_then(|r| r.extract_key(order_by));
                let kb = store.get(b).and_then(|r| r.extract_key(order_by));
                ka.cmp(&kb)
            });
            if query.order_desc {
                matched.reverse();
            }
        }
    }

    let columns = resolve_columns(query);
    let rows: Vec<Vec<String>> = matched
        .iter()
        .map(|&id| {
            let row = store.get(id).expect("matched id came from a live row");
            project(row, &columns)
        })
        .collect();

    let column_types: Vec<FieldType> = columns
        .iter()
        .map(|c| Row::field_type(c).unwrap_or(FieldType::Str))
        .collect();

    store
        .metrics_mut()
        .record("select", start.elapsed().as_micros() as f64);

    ResultSet {
        row_count: rows.len(),
        column_count: columns.len(),
        column_names: columns,
        column_types,
        rows,
        elapsed: start.elapsed(),
        success: true,
    }
}

fn execute_insert(store: &mut RecordStore, query: &ParsedQuery) -> bool {
    let start = std::time::Instant::now();
    let result = row_from_values(&query.insert_values).and_then(|row| store.insert(row));
    store
        .metrics_mut()
        .record("insert", start.elapsed().as_micros() as f64);
    result.is_ok()
}

fn execute_delete(store: &mut RecordStore, query: &ParsedQuery) -> ResultSet {
    let start = std::time::Instant::now();
    let compiled = query.condition.as_ref().map(predicate::compile);

    let ids: Vec<RowId> = candidate_ids(store, compiled.as_ref())
        .into_iter()
        .filter(|&id| {
            let row = store.get(id).expect("candidate id came from a live row");
            compiled.as_ref().map(|c| c.eval(row)).unwrap_or(true)
        })
        .collect();

    let outcome = store.remove_rows(&ids);
    store
        .metrics_mut()
        .record("delete", start.elapsed().as_micros() as f64);

    match outcome {
        Ok(removed) => ResultSet {
            row_count: removed,
            success: true,
            elapsed: start.elapsed(),
            ..ResultSet::empty_success()
        },
        Err(_) => ResultSet {
            elapsed: start.elapsed(),
            ..ResultSet::failure()
        },
    }
}

/// Resolves the candidate row id set: every live row if there is no WHERE
/// clause or no usable probe leaf, otherwise the (possibly over-inclusive)
/// result of probing one index.
fn candidate_ids(store: &RecordStore, compiled: Option<&CompiledCondition>) -> Vec<RowId> {
    let Some(compiled) = compiled else {
        return store.rows().map(|(id, _)| id).collect();
    };

    if let Some(probe) = select_probe_leaf(store, compiled) {
        return run_probe(store, &probe);
    }

    store.rows().map(|(id, _)| id).collect()
}

struct Probe<'a> {
    attribute: &'a str,
    operator: Operator,
    coerced: &'a Key,
}

/// Walks the top-level chain looking for a comparison leaf whose attribute
/// is indexed and whose operator is probe-eligible. Returns `None` (full
/// scan) if an `OR` appears anywhere at the top level, or if no eligible
/// leaf is found. Equality leaves are preferred; the first eligible range
/// leaf is used otherwise.
fn select_probe_leaf<'a>(store: &RecordStore, chain: &'a CompiledCondition) -> Option<Probe<'a>> {
    let mut node = Some(chain);
    while let Some(n) = node {
        if n.logic_op() == LogicOp::Or {
            return None;
        }
        node = n.next();
    }

    let mut best_range: Option<Probe<'a>> = None;
    let mut node = Some(chain);
    while let Some(n) = node {
        if let Some((attribute, operator, coerced)) = n.as_leaf() {
            if let (Some((field_type, _)), Some(coerced)) =
                (store.index_for(attribute), coerced.as_ref())
            {
                let eligible = match operator {
                    Operator::Eq => true,
                    Operator::Ne => false,
                    Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge => {
                        field_type != FieldType::Str && coerced.variant_bounds().is_some()
                    }
                };
                if eligible {
                    if operator == Operator::Eq {
                        return Some(Probe {
                            attribute,
                            operator,
                            coerced,
                        });
                    }
                    if best_range.is_none() {
                        best_range = Some(Probe {
                            attribute,
                            operator,
                            coerced,
                        });
                    }
                }
            }
        }
        node = n.next();
    }
    best_range
}

fn run_probe(store: &RecordStore, probe: &Probe) -> Vec<RowId> {
    let Some((_, tree)) = store.index_for(probe.attribute) else {
        return store.rows().map(|(id, _)| id).collect();
    };
    match probe.operator {
        Operator::Eq => tree.find_all(probe.coerced),
        Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge => {
            let Some((lo, hi)) = probe.coerced.variant_bounds() else {
                return store.rows().map(|(id, _)| id).collect();
            };
            let (lo, hi) = match probe.operator {
                Operator::Lt | Operator::Le => (lo, probe.coerced.clone()),
                Operator::Gt | Operator::Ge => (probe.coerced.clone(), hi),
                _ => unreachable!(),
            };
            tree.range(&lo, &hi).into_iter().map(|(_, id)| id).collect()
        }
        Operator::Ne => store.rows().map(|(id, _)| id).collect(),
    }
}

/// Resolves the output column list: explicit names, or every schema
/// attribute when the query asked for `*` or supplied none (§4.4).
fn resolve_columns(query: &ParsedQuery) -> Vec<String> {
    if query.select_all || query.columns.is_empty() {
        schema::SCHEMA.iter().map(|f| f.name.to_string()).collect()
    } else {
        query.columns.clone()
    }
}

fn project(row: &Row, columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .map(|c| row.cell(c).unwrap_or_default())
        .collect()
}

/// Builds a `Row` from the ordered textual INSERT values, matching the
/// fixed schema field order. Errors if the arity is wrong or any field
/// fails validation.
fn row_from_values(values: &[String]) -> EngineResult<Row> {
    if values.len() != schema::SCHEMA.len() {
        return Err(EngineError::SchemaViolation {
            field: "*".to_string(),
            reason: format!(
                "expected {} values, got {}",
                schema::SCHEMA.len(),
                values.len()
            ),
        });
    }

    let parse_u64 = |s: &str, field: &str| -> EngineResult<u64> {
        s.parse().map_err(|_| EngineError::SchemaViolation {
            field: field.to_string(),
            reason: format!("not a valid u64: '{s}'"),
        })
    };
    let parse_i32 = |s: &str, field: &str| -> EngineResult<i32> {
        s.parse().map_err(|_| EngineError::SchemaViolation {
            field: field.to_string(),
            reason: format!("not a valid i32: '{s}'"),
        })
    };
    let parse_bool = |s: &str, field: &str| -> EngineResult<bool> {
        schema::coerce(FieldType::Bool, s)
            .and_then(|k| match k {
                Key::Bool(b) => Some(b),
                _ => None,
            })
            .ok_or_else(|| EngineError::SchemaViolation {
                field: field.to_string(),
                reason: format!("not a valid bool: '{s}'"),
            })
    };

    let row = Row {
        command_id: parse_u64(&values[0], "command_id")?,
        raw_command: values[1].clone(),
        base_command: values[2].clone(),
        shell_type: values[3].clone(),
        exit_code: parse_i32(&values[4], "exit_code")?,
        timestamp: values[5].clone(),
        sudo_used: parse_bool(&values[6], "sudo_used")?,
        working_directory: values[7].clone(),
        user_id: parse_i32(&values[8], "user_id")?,
        user_name: values[9].clone(),
        host_name: values[10].clone(),
        risk_level: parse_i32(&values[11], "risk_level")?,
    };
    row.validate()?;
    Ok(row)
}

#[cfg(test)]
mod planner_test;
