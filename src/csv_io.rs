// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Durability: loading, appending to, and rewriting the backing CSV file.
//!
//! Field order is the fixed wire format from §6: `command_id, raw_command,
//! base_command, shell_type, exit_code, timestamp, sudo_used,
//! working_directory, user_id, user_name, host_name, risk_level`. Quoting
//! follows RFC 4180, handled by the `csv` crate rather than hand-rolled
//! parsing — unlike pipe-delimited formats elsewhere in this codebase's
//! ancestry, comma-separated fields need real quote/escape handling.

use std::fs::OpenOptions;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::row::Row;
use crate::schema::{self, coerce_bool};

fn expected_header() -> String {
    schema::SCHEMA
        .iter()
        .map(|f| f.name)
        .collect::<Vec<_>>()
        .join(",")
}

fn io_err(operation: &str, path: &Path, reason: impl ToString) -> EngineError {
    EngineError::Io {
        operation: operation.to_string(),
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn csv_err(path: &Path, line: usize, reason: impl ToString) -> EngineError {
    EngineError::Csv {
        path: path.display().to_string(),
        line,
        reason: reason.to_string(),
    }
}

/// Loads every data row from `path` in file order.
///
/// Returns an empty vector if the file does not exist yet (a fresh store
/// with no backing history). Detects whether the file still carries its
/// header line: a rewrite triggered by a prior DELETE drops it (§9's open
/// question, carried forward rather than silently resolved), so a store
/// reopened after a delete must not mistake its first surviving data row
/// for a header.
pub fn load(path: &Path) -> EngineResult<Vec<Row>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path).map_err(|e| io_err("open", path, e))?;
    let has_header = content
        .lines()
        .next()
        .is_some_and(|first| first.trim() == expected_header());

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(has_header)
        .flexible(true)
        .from_reader(content.as_bytes());

    let line_offset = if has_header { 2 } else { 1 };
    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| csv_err(path, idx + line_offset, e))?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(record_to_row(&record, path, idx + line_offset)?);
    }
    Ok(rows)
}

/// Appends one CSV line for `row` and flushes before returning. No header
/// is written or rewritten.
pub fn append(path: &Path, row: &Row) -> EngineResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| io_err("append", path, e))?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    writer
        .write_record(row_to_record(row))
        .map_err(|e| io_err("append", path, e))?;
    writer.flush().map_err(|e| io_err("append", path, e))?;
    Ok(())
}

/// Truncates `path` and rewrites it from `rows`, in the given order. No
/// header is emitted, mirroring the original engine's rewrite behavior.
pub fn rewrite(path: &Path, rows: &[&Row]) -> EngineResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|e| io_err("rewrite", path, e))?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    for row in rows {
        writer
            .write_record(row_to_record(row))
            .map_err(|e| io_err("rewrite", path, e))?;
    }
    writer.flush().map_err(|e| io_err("rewrite", path, e))?;
    Ok(())
}

fn row_to_record(row: &Row) -> [String; 12] {
    [
        row.command_id.to_string(),
        row.raw_command.clone(),
        row.base_command.clone(),
        row.shell_type.clone(),
        row.exit_code.to_string(),
        row.timestamp.clone(),
        if row.sudo_used { "1" } else { "0" }.to_string(),
        row.working_directory.clone(),
        row.user_id.to_string(),
        row.user_name.clone(),
        row.host_name.clone(),
        row.risk_level.to_string(),
    ]
}

fn record_to_row(record: &csv::StringRecord, path: &Path, line: usize) -> EngineResult<Row> {
    let get = |i: usize, name: &str| -> EngineResult<&str> {
        record
            .get(i)
            .ok_or_else(|| csv_err(path, line, format!("missing field '{name}'")))
    };
    let parse_u64 = |s: &str, name: &str| -> EngineResult<u64> {
        s.parse()
            .map_err(|_| csv_err(path, line, format!("invalid u64 in '{name}': '{s}'")))
    };
    let parse_i32 = |s: &str, name: &str| -> EngineResult<i32> {
        s.parse()
            .map_err(|_| csv_err(path, line, format!("invalid i32 in '{name}': '{s}'")))
    };
    let parse_bool = |s: &str, name: &str| -> EngineResult<bool> {
        coerce_bool(s).ok_or_else(|| csv_err(path, line, format!("invalid bool in '{name}': '{s}'")))
    };

    Ok(Row {
        command_id: parse_u64(get(0, "command_id")?, "command_id")?,
        raw_command: get(1, "raw_command")?.to_string(),
        base_command: get(2, "base_command")?.to_string(),
        shell_type: get(3, "shell_type")?.to_string(),
        exit_code: parse_i32(get(4, "exit_code")?, "exit_code")?,
        timestamp: get(5, "timestamp")?.to_string(),
        sudo_used: parse_bool(get(6, "sudo_used")?, "sudo_used")?,
        working_directory: get(7, "working_directory")?.to_string(),
        user_id: parse_i32(get(8, "user_id")?, "user_id")?,
        user_name: get(9, "user_name")?.to_string(),
        host_name: get(10, "host_name")?.to_string(),
        risk_level: parse_i32(get(11, "risk_level")?, "risk_level")?,
    })
}

#[cfg(test)]
mod csv_io_test;
