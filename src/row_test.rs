use super::*;

fn sample_row() -> Row {
    Row {
        command_id: 1,
        raw_command: "ls -la".to_string(),
        base_command: "ls".to_string(),
        shell_type: "bash".to_string(),
        exit_code: 0,
        timestamp: "2026-01-01T00:00:00Z".to_string(),
        sudo_used: false,
        working_directory: "/home/user".to_string(),
        user_id: 1000,
        user_name: "alice".to_string(),
        host_name: "box1".to_string(),
        risk_level: 1,
    }
}

#[test]
fn valid_row_passes() {
    assert!(sample_row().validate().is_ok());
}

#[test]
fn zero_command_id_is_invalid() {
    let mut row = sample_row();
    row.command_id = 0;
    assert!(row.validate().is_err());
}

#[test]
fn empty_required_string_is_invalid() {
    let mut row = sample_row();
    row.user_name = String::new();
    assert!(row.validate().is_err());
}

#[test]
fn oversized_string_is_invalid() {
    let mut row = sample_row();
    row.shell_type = "x".repeat(21);
    assert!(row.validate().is_err());
}

#[test]
fn extract_key_matches_field_type() {
    let row = sample_row();
    assert_eq!(row.extract_key("command_id"), Some(Key::U64(1)));
    assert_eq!(row.extract_key("risk_level"), Some(Key::I32(1)));
    assert_eq!(row.extract_key("sudo_used"), Some(Key::Bool(false)));
    assert_eq!(
        row.extract_key("user_name"),
        Some(Key::Str("alice".to_string()))
    );
    assert_eq!(row.extract_key("nonexistent"), None);
}

#[test]
fn cell_renders_bool_as_0_1() {
    let mut row = sample_row();
    row.sudo_used = true;
    assert_eq!(row.cell("sudo_used"), Some("1".to_string()));
    row.sudo_used = false;
    assert_eq!(row.cell("sudo_used"), Some("0".to_string()));
}

#[test]
fn field_type_lookup() {
    assert_eq!(Row::field_type("command_id"), Some(FieldType::U64));
    assert_eq!(Row::field_type("nope"), None);
}
