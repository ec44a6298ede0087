// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Integration coverage of spec.md §8's six literal scenarios, exercised
//! end-to-end through the public `RecordStore`/`planner` API rather than
//! any single module's internals.

use cmdbase::btree::Order;
use cmdbase::planner::{self, ExecResult};
use cmdbase::predicate::{Comparison, Condition, ExprKind, LogicOp, Operator};
use cmdbase::query::ParsedQuery;
use cmdbase::row::Row;
use cmdbase::schema::FieldType;
use cmdbase::store::RecordStore;

fn row(command_id: u64, user_id: i32, risk_level: i32) -> Row {
    Row {
        command_id,
        raw_command: "ls -la".to_string(),
        base_command: "ls".to_string(),
        shell_type: "bash".to_string(),
        exit_code: 0,
        timestamp: "2026-01-01T00:00:00Z".to_string(),
        sudo_used: false,
        working_directory: "/home/user".to_string(),
        user_id,
        user_name: "alice".to_string(),
        host_name: "box1".to_string(),
        risk_level,
    }
}

fn leaf(attribute: &str, operator: Operator, literal: &str) -> Condition {
    Condition {
        kind: ExprKind::Comparison(Comparison {
            attribute: attribute.to_string(),
            operator,
            literal: literal.to_string(),
            numeric_flag: true,
        }),
        logic_op: LogicOp::None,
        next: None,
    }
}

fn and(a: Condition, mut b: Condition) -> Condition {
    b.logic_op = LogicOp::None;
    Condition {
        kind: a.kind,
        logic_op: LogicOp::And,
        next: Some(Box::new(b)),
    }
}

fn or(a: Condition, mut b: Condition) -> Condition {
    b.logic_op = LogicOp::None;
    Condition {
        kind: a.kind,
        logic_op: LogicOp::Or,
        next: Some(Box::new(b)),
    }
}

#[test]
fn scenario_1_duplicate_key_point_lookup_returns_exactly_three() {
    let dir = tempfile::tempdir().unwrap();
    let mut store =
        RecordStore::open_with_order("commands", dir.path().join("store.csv"), Order::new(4).unwrap())
            .unwrap();
    store.add_index("risk_level", FieldType::I32).unwrap();
    for (id, risk) in [(1, 1), (2, 1), (3, 2), (4, 1)] {
        store.insert(row(id, 1000, risk)).unwrap();
    }

    let mut query = ParsedQuery::select("commands");
    query.condition = Some(leaf("risk_level", Operator::Eq, "1"));
    let ExecResult::Select(result) = planner::execute(&mut store, &query).unwrap() else {
        panic!("expected Select");
    };
    assert_eq!(result.row_count, 3);
}

#[test]
fn scenario_2_parenthesized_or_with_outer_and_returns_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = RecordStore::open("commands", dir.path().join("store.csv")).unwrap();
    for (id, u, r) in [(1, 1, 5), (2, 2, 2), (3, 3, 5), (4, 1, 1)] {
        store.insert(row(id, u, r)).unwrap();
    }

    let group = Condition {
        kind: ExprKind::Group(Box::new(or(
            leaf("user_id", Operator::Eq, "1"),
            leaf("user_id", Operator::Eq, "2"),
        ))),
        logic_op: LogicOp::None,
        next: None,
    };
    let top = and(group, leaf("risk_level", Operator::Gt, "3"));

    let mut query = ParsedQuery::select("commands");
    query.condition = Some(top);
    let ExecResult::Select(result) = planner::execute(&mut store, &query).unwrap() else {
        panic!("expected Select");
    };
    assert_eq!(result.row_count, 1);
}

#[test]
fn scenario_3_range_on_indexed_u64_returns_ascending_subset() {
    let dir = tempfile::tempdir().unwrap();
    let mut store =
        RecordStore::open_with_order("commands", dir.path().join("store.csv"), Order::new(4).unwrap())
            .unwrap();
    store.add_index("command_id", FieldType::U64).unwrap();
    for id in [5, 15, 25, 35, 45] {
        store.insert(row(id, 1000, 1)).unwrap();
    }

    let mut query = ParsedQuery::select("commands");
    query.condition = Some(and(
        leaf("command_id", Operator::Ge, "10"),
        leaf("command_id", Operator::Le, "30"),
    ));
    query.order_by = Some("command_id".to_string());
    let ExecResult::Select(result) = planner::execute(&mut store, &query).unwrap() else {
        panic!("expected Select");
    };
    let col = result.column_names.iter().position(|c| c == "command_id").unwrap();
    let ids: Vec<&str> = result.rows.iter().map(|r| r[col].as_str()).collect();
    assert_eq!(ids, vec!["15", "25"]);
}

#[test]
fn scenario_4_delete_then_persist_leaves_three_rows_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.csv");
    let mut store = RecordStore::open("commands", &path).unwrap();
    for id in [1, 2, 3, 4] {
        store.insert(row(id, 1000, 1)).unwrap();
    }

    let mut query = ParsedQuery::delete("commands");
    query.condition = Some(leaf("command_id", Operator::Eq, "2"));
    let ExecResult::Delete(result) = planner::execute(&mut store, &query).unwrap() else {
        panic!("expected Delete");
    };
    assert_eq!(result.row_count, 1);

    let reopened = RecordStore::open("commands", &path).unwrap();
    assert_eq!(reopened.len(), 3);
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(!content.lines().any(|line| line.starts_with("2,")));
}

#[test]
fn scenario_5_insert_fills_index_and_persists_one_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.csv");
    let mut store = RecordStore::open("commands", &path).unwrap();
    store.add_index("command_id", FieldType::U64).unwrap();

    let values = vec![
        "42".to_string(),
        "ls -la".to_string(),
        "ls".to_string(),
        "bash".to_string(),
        "0".to_string(),
        "2026-01-01T00:00:00Z".to_string(),
        "0".to_string(),
        "/home/user".to_string(),
        "1000".to_string(),
        "alice".to_string(),
        "box1".to_string(),
        "1".to_string(),
    ];
    let query = ParsedQuery::insert("commands", values);
    let ExecResult::Insert(ok) = planner::execute(&mut store, &query).unwrap() else {
        panic!("expected Insert");
    };
    assert!(ok);

    let mut lookup = ParsedQuery::select("commands");
    lookup.condition = Some(leaf("command_id", Operator::Eq, "42"));
    let ExecResult::Select(result) = planner::execute(&mut store, &lookup).unwrap() else {
        panic!("expected Select");
    };
    assert_eq!(result.row_count, 1);

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 1);
}

#[test]
fn scenario_6_predicate_short_circuit_never_evaluates_unknown_attribute() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = RecordStore::open("commands", dir.path().join("store.csv")).unwrap();
    store.insert(row(1, 1000, 1)).unwrap();

    let group = Condition {
        kind: ExprKind::Group(Box::new(leaf("unknown_attr", Operator::Eq, "5"))),
        logic_op: LogicOp::None,
        next: None,
    };
    let query_cond = or(leaf("command_id", Operator::Eq, "1"), group);

    let mut query = ParsedQuery::select("commands");
    query.condition = Some(query_cond);
    let ExecResult::Select(result) = planner::execute(&mut store, &query).unwrap() else {
        panic!("expected Select");
    };
    assert_eq!(result.row_count, 1);
}

#[test]
fn persist_round_trip_r3() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.csv");
    {
        let mut store = RecordStore::open("commands", &path).unwrap();
        store.insert(row(7, 1000, 1)).unwrap();
    }
    let reopened = RecordStore::open("commands", &path).unwrap();
    assert_eq!(reopened.len(), 1);
    assert_eq!(reopened.get(0).unwrap().command_id, 7);
}
