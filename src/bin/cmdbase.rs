// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Thin CLI driver: reads a `;`-separated statement file, parses each
//! statement with a small hand-written recursive-descent parser, executes
//! it against the core, and prints a column-aligned table.
//!
//! Kept deliberately separate from the library crate (`src/bin/` rather
//! than `src/`): the core never depends on this parser, only on the
//! pre-parsed `ParsedQuery` shape it produces.

mod parser;
mod print;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as ClapParser;
use cmdbase::planner::{self, ExecResult};
use cmdbase::store::RecordStore;

/// Runs a `;`-separated statement file against a CSV-backed command-log
/// table.
#[derive(ClapParser)]
#[command(name = "cmdbase", about = "In-memory query engine for command-log records")]
struct Args {
    /// Path to the backing CSV data file (created if missing).
    #[arg(default_value = "commands.csv")]
    data_path: PathBuf,

    /// Path to a file holding one or more `;`-separated statements.
    query_file: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut store = match RecordStore::open("commands", &args.data_path) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("failed to open '{}': {err}", args.data_path.display());
            return ExitCode::FAILURE;
        }
    };

    let text = match std::fs::read_to_string(&args.query_file) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("failed to read '{}': {err}", args.query_file.display());
            return ExitCode::FAILURE;
        }
    };

    for statement in text.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let query = match parser::parse_statement(statement, "commands") {
            Ok(query) => query,
            Err(err) => {
                eprintln!("skipping statement '{statement}': {err}");
                continue;
            }
        };

        match planner::execute(&mut store, &query) {
            Ok(ExecResult::Select(result)) => print::print_result_set(&result),
            Ok(ExecResult::Insert(ok)) => println!("INSERT: {}", if ok { "ok" } else { "failed" }),
            Ok(ExecResult::Delete(result)) => {
                println!("DELETE: {} row(s) removed", result.row_count)
            }
            Err(err) => eprintln!("statement '{statement}' failed: {err}"),
        }
    }

    ExitCode::SUCCESS
}
