//! Retrieval quality metrics. Every function is total: an empty denominator
//! yields 0 rather than NaN.

use crate::DocSet;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn harmonic(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Precision, recall and F1 of a retrieved list. Duplicates in `retrieved`
/// count once as hits but every entry counts toward the precision denominator.
pub fn precision_recall_f1<S: AsRef<str>>(retrieved: &[S], relevant: &DocSet) -> (f64, f64, f64) {
    let hits = retrieved
        .iter()
        .map(|d| d.as_ref())
        .filter(|&d| relevant.contains(d))
        .collect::<HashSet<&str>>()
        .len();
    let precision = ratio(hits, retrieved.len());
    let recall = ratio(hits, relevant.len());
    (precision, recall, harmonic(precision, recall))
}

/// Set precision and recall for boolean result sets.
pub fn precision_recall(retrieved: &DocSet, relevant: &DocSet) -> (f64, f64) {
    let tp = retrieved.intersection(relevant).count();
    (ratio(tp, retrieved.len()), ratio(tp, relevant.len()))
}

/// Fraction of an already truncated ranked list that is relevant.
pub fn precision_at_k<S: AsRef<str>>(ranked: &[S], relevant: &DocSet) -> f64 {
    let hits = ranked.iter().filter(|&d| relevant.contains(d.as_ref())).count();
    ratio(hits, ranked.len())
}

pub fn map_at_k<S: AsRef<str>>(ranked: &[S], relevant: &DocSet, k: usize) -> f64 {
    let mut hits = 0usize;
    let mut sum = 0.0;
    for (i, doc) in ranked.iter().take(k).enumerate() {
        if relevant.contains(doc.as_ref()) {
            hits += 1;
            sum += hits as f64 / (i + 1) as f64;
        }
    }
    let den = relevant.len().min(k);
    if den == 0 {
        0.0
    } else {
        sum / den as f64
    }
}

fn discount(rank: usize) -> f64 {
    1.0 / (rank as f64 + 2.0).log2()
}

/// Binary-gain nDCG over the first `k` ranks.
pub fn ndcg_at_k<S: AsRef<str>>(ranked: &[S], relevant: &DocSet, k: usize) -> f64 {
    let dcg: f64 = ranked
        .iter()
        .take(k)
        .enumerate()
        .filter(|&(_, d)| relevant.contains(d.as_ref()))
        .map(|(i, _)| discount(i))
        .sum();
    let ideal: f64 = (0..relevant.len().min(k)).map(discount).sum();
    if ideal > 0.0 {
        dcg / ideal
    } else {
        0.0
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// The per-model tuple reported by the comparison layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub map: f64,
    pub ndcg: f64,
}

impl MetricSummary {
    pub fn for_ranking<S: AsRef<str>>(ranked: &[S], relevant: &DocSet, k: usize) -> Self {
        let (precision, recall, f1) = precision_recall_f1(ranked, relevant);
        Self { precision, recall, f1, map: map_at_k(ranked, relevant, k), ndcg: ndcg_at_k(ranked, relevant, k) }
    }

    pub fn average(items: &[MetricSummary]) -> Self {
        let col = |f: fn(&MetricSummary) -> f64| mean(&items.iter().map(f).collect::<Vec<_>>());
        Self {
            precision: col(|m| m.precision),
            recall: col(|m| m.recall),
            f1: col(|m| m.f1),
            map: col(|m| m.map),
            ndcg: col(|m| m.ndcg),
        }
    }

    pub fn as_array(&self) -> [f64; 5] {
        [self.precision, self.recall, self.f1, self.map, self.ndcg]
    }
}
