// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Column-aligned table printing for a [`ResultSet`] (§6's "result-set
//! printing" collaborator concern) — automatic column-width sizing, no
//! row limit beyond what the terminal itself scrolls.

use cmdbase::query::ResultSet;

pub fn print_result_set(result: &ResultSet) {
    if result.row_count == 0 {
        println!("(0 rows)");
        return;
    }

    let mut widths: Vec<usize> = result.column_names.iter().map(|c| c.len()).collect();
    for row in &result.rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }

    print_row(&result.column_names, &widths);
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    print_row(&separator, &widths);
    for row in &result.rows {
        print_row(row, &widths);
    }
    println!("({} row{})", result.row_count, if result.row_count == 1 { "" } else { "s" });
}

fn print_row(cells: &[String], widths: &[usize]) {
    let rendered: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:<w$}"))
        .collect();
    println!("{}", rendered.join(" | "));
}
