use super::*;
use crate::btree::Order;
use crate::predicate::{Comparison, Condition, ExprKind};
use crate::schema::FieldType;

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

fn values_for(r: &Row) -> Vec<String> {
    vec![
        r.command_id.to_string(),
        r.raw_command.clone(),
        r.base_command.clone(),
        r.shell_type.clone(),
        r.exit_code.to_string(),
        r.timestamp.clone(),
        if r.sudo_used { "1" } else { "0" }.to_string(),
        r.working_directory.clone(),
        r.user_id.to_string(),
        r.user_name.clone(),
        r.host_name.clone(),
        r.risk_level.to_string(),
    ]
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

fn chain(mut nodes: Vec<Condition>, ops: &[LogicOp]) -> Condition {
    for (node, op) in nodes.iter_mut().zip(ops) {
        node.logic_op = *op;
    }
    let mut iter = nodes.into_iter().rev();
    let mut acc = iter.next().unwrap();
    for mut node in iter {
        node.next = Some(Box::new(acc));
        acc = node;
    }
    acc
}

fn group(inner: Condition) -> ExprKind {
    ExprKind::Group(Box::new(inner))
}

fn open_store(dir: &tempfile::TempDir) -> RecordStore {
    let path = dir.path().join("store.csv");
    RecordStore::open_with_order("commands", path, Order::new(4).unwrap()).unwrap()
}

#[test]
fn scenario_1_duplicate_key_point_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(&dir);
    store.add_index("risk_level", FieldType::I32).unwrap();
    for (id, risk) in [(1, 1), (2, 1), (3, 2), (4, 1)] {
        store.insert(row(id, 1000, risk)).unwrap();
    }

    let mut query = ParsedQuery::select("commands");
    query.condition = Some(leaf("risk_level", Operator::Eq, "1"));

    let ExecResult::Select(result) = execute(&mut store, &query).unwrap() else {
        panic!("expected Select");
    };
    assert_eq!(result.row_count, 3);
}

#[test]
fn scenario_2_parenthesized_or_with_outer_and() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(&dir);
    store.add_index("user_id", FieldType::I32).unwrap();
    for (id, u, r) in [(1, 1, 5), (2, 2, 2), (3, 3, 5), (4, 1, 1)] {
        store.insert(row(id, u, r)).unwrap();
    }

    let or_group = chain(
        vec![
            leaf("user_id", Operator::Eq, "1"),
            leaf("user_id", Operator::Eq, "2"),
        ],
        &[LogicOp::Or, LogicOp::None],
    );
    let top = chain(
        vec![
            Condition {
                kind: group(or_group),
                logic_op: LogicOp::None,
                next: None,
            },
            leaf("risk_level", Operator::Gt, "3"),
        ],
        &[LogicOp::And, LogicOp::None],
    );

    let mut query = ParsedQuery::select("commands");
    query.condition = Some(top);

    let ExecResult::Select(result) = execute(&mut store, &query).unwrap() else {
        panic!("expected Select");
    };
    assert_eq!(result.row_count, 1);
    let command_id_col = result.column_names.iter().position(|c| c == "command_id").unwrap();
    assert_eq!(result.rows[0][command_id_col], "1");
}

#[test]
fn scenario_3_range_on_indexed_u64() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(&dir);
    store.add_index("command_id", FieldType::U64).unwrap();
    for id in [5, 15, 25, 35, 45] {
        store.insert(row(id, 1000, 1)).unwrap();
    }

    let query_cond = chain(
        vec![
            leaf("command_id", Operator::Ge, "10"),
            leaf("command_id", Operator::Le, "30"),
        ],
        &[LogicOp::And, LogicOp::None],
    );
    let mut query = ParsedQuery::select("commands");
    query.condition = Some(query_cond);
    query.order_by = Some("command_id".to_string());

    let ExecResult::Select(result) = execute(&mut store, &query).unwrap() else {
        panic!("expected Select");
    };
    assert_eq!(result.row_count, 2);
    let col = result.column_names.iter().position(|c| c == "command_id").unwrap();
    assert_eq!(result.rows[0][col], "15");
    assert_eq!(result.rows[1][col], "25");
}

#[test]
fn scenario_4_delete_then_persist() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.csv");
    let mut store = RecordStore::open_with_order("commands", &path, Order::new(4).unwrap()).unwrap();
    for id in [1, 2, 3, 4] {
        store.insert(row(id, 1000, 1)).unwrap();
    }

    let mut query = ParsedQuery::delete("commands");
    query.condition = Some(leaf("command_id", Operator::Eq, "2"));

    let ExecResult::Delete(result) = execute(&mut store, &query).unwrap() else {
        panic!("expected Delete");
    };
    assert_eq!(result.row_count, 1);
    assert!(result.success);

    let reopened = RecordStore::open("commands", &path).unwrap();
    assert_eq!(reopened.len(), 3);
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(!content.lines().any(|line| line.starts_with("2,")));
}

#[test]
fn scenario_5_insert_fills_index() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.csv");
    let mut store = RecordStore::open("commands", &path).unwrap();
    store.add_index("command_id", FieldType::U64).unwrap();

    let mut query = ParsedQuery::insert("commands", values_for(&row(42, 1000, 1)));
    query.table = "commands".to_string();
    let ExecResult::Insert(ok) = execute(&mut store, &query).unwrap() else {
        panic!("expected Insert");
    };
    assert!(ok);

    let (_, tree) = store.index_for("command_id").unwrap();
    assert_eq!(tree.find_all(&Key::U64(42)).len(), 1);

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.lines().last().unwrap().ends_with(",1"));
}

#[test]
fn scenario_6_predicate_short_circuit() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(&dir);
    store.insert(row(1, 1000, 1)).unwrap();

    let cond = chain(
        vec![
            leaf("command_id", Operator::Eq, "1"),
            Condition {
                kind: group(leaf("unknown_attr", Operator::Eq, "5")),
                logic_op: LogicOp::None,
                next: None,
            },
        ],
        &[LogicOp::Or, LogicOp::None],
    );
    let mut query = ParsedQuery::select("commands");
    query.condition = Some(cond);

    let ExecResult::Select(result) = execute(&mut store, &query).unwrap() else {
        panic!("expected Select");
    };
    assert_eq!(result.row_count, 1);
}

#[test]
fn empty_store_select_returns_zero_rows() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(&dir);
    let query = ParsedQuery::select("commands");
    let ExecResult::Select(result) = execute(&mut store, &query).unwrap() else {
        panic!("expected Select");
    };
    assert_eq!(result.row_count, 0);
    assert!(result.success);
}

#[test]
fn empty_store_delete_reports_zero() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(&dir);
    let query = ParsedQuery::delete("commands");
    let ExecResult::Delete(result) = execute(&mut store, &query).unwrap() else {
        panic!("expected Delete");
    };
    assert_eq!(result.row_count, 0);
    assert!(result.success);
}

#[test]
fn not_equal_on_indexed_key_falls_back_to_full_scan_and_still_filters() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(&dir);
    store.add_index("command_id", FieldType::U64).unwrap();
    for id in [1, 2, 3] {
        store.insert(row(id, 1000, 1)).unwrap();
    }

    let mut query = ParsedQuery::select("commands");
    query.condition = Some(leaf("command_id", Operator::Ne, "2"));
    let ExecResult::Select(result) = execute(&mut store, &query).unwrap() else {
        panic!("expected Select");
    };
    assert_eq!(result.row_count, 2);
}

#[test]
fn table_mismatch_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(&dir);
    let query = ParsedQuery::select("other_table");
    assert!(execute(&mut store, &query).is_err());
}

#[test]
fn insert_with_wrong_arity_fails_without_mutating_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(&dir);
    let query = ParsedQuery::insert("commands", vec!["1".to_string()]);
    let ExecResult::Insert(ok) = execute(&mut store, &query).unwrap() else {
        panic!("expected Insert");
    };
    assert!(!ok);
    assert!(store.is_empty());
}
