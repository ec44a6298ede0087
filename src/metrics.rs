// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Lightweight, store-owned query-latency metrics.
//!
//! The percentile/statistics math mirrors the teacher crate's metrics
//! aggregator. What does not carry over is its global singleton and CSV
//! persistence layer: this engine is single-threaded per §5 (no locking
//! needed) and a query engine's own latency numbers are an in-process
//! observability concern, not data the store itself persists.

use std::collections::HashMap;

/// Statistical summary of one named metric's recorded samples.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricStats {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
}

/// Calculates a percentile from a pre-sorted ascending slice, linearly
/// interpolating between the two nearest ranks.
pub fn percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }
    if sorted_values.len() == 1 {
        return sorted_values[0];
    }

    let index = (percentile / 100.0) * (sorted_values.len() - 1) as f64;
    let lower_index = index.floor() as usize;
    let upper_index = index.ceil() as usize;

    if lower_index == upper_index {
        sorted_values[lower_index]
    } else {
        let lower_value = sorted_values[lower_index];
        let upper_value = sorted_values[upper_index];
        let fraction = index - lower_index as f64;
        lower_value + (upper_value - lower_value) * fraction
    }
}

fn calculate_stats(values: &[f64]) -> Option<MetricStats> {
    if values.is_empty() {
        return None;
    }
    let count = values.len();
    let sum: f64 = values.iter().sum();
    let mean = sum / count as f64;

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

    Some(MetricStats {
        count,
        mean,
        min: sorted[0],
        max: sorted[count - 1],
        p50: percentile(&sorted, 50.0),
        p95: percentile(&sorted, 95.0),
        p99: percentile(&sorted, 99.0),
    })
}

/// Per-store collector of named latency samples (microseconds), keyed by
/// operation name (`"select"`, `"insert"`, `"delete"`).
#[derive(Debug, Default, Clone)]
pub struct MetricsCollector {
    samples: HashMap<String, Vec<f64>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: &str, micros: f64) {
        self.samples
            .entry(name.to_string())
            .or_default()
            .push(micros);
    }

    pub fn stats(&self, name: &str) -> Option<MetricStats> {
        self.samples.get(name).and_then(|v| calculate_stats(v))
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[cfg(test)]
mod metrics_test;
