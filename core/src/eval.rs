//! Runs gold queries through the models and summarises the metrics per model.

use crate::boolean::{evaluate, MatchMode};
use crate::index::InvertedIndex;
use crate::metrics::{mean, precision_recall, MetricSummary};
use crate::ranking::{Ranker, ScoredDoc};
use crate::{DocId, DocSet};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldQuery {
    pub query: String,
    pub gold: Vec<DocId>,
    /// Boolean form of the query, e.g. `pedang AND hutan`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean: Option<String>,
}

impl GoldQuery {
    pub fn new(query: &str, gold: &[&str]) -> Self {
        Self { query: query.to_string(), gold: gold.iter().map(|g| g.to_string()).collect(), boolean: None }
    }

    pub fn relevant(&self) -> DocSet {
        self.gold.iter().cloned().collect()
    }

    pub fn boolean_query(&self) -> &str {
        self.boolean.as_deref().unwrap_or(&self.query)
    }
}

pub fn load_gold_queries(path: &Path) -> Result<Vec<GoldQuery>> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading gold queries {}", path.display()))?;
    let queries: Vec<GoldQuery> =
        serde_json::from_str(&raw).with_context(|| format!("parsing gold queries {}", path.display()))?;
    Ok(queries)
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    pub query: String,
    pub retrieved: Vec<ScoredDoc>,
    pub metrics: MetricSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelReport {
    pub model: String,
    pub k: usize,
    pub queries: Vec<QueryReport>,
    pub summary: MetricSummary,
}

pub fn evaluate_ranker(ranker: &dyn Ranker, queries: &[GoldQuery], k: usize) -> ModelReport {
    let reports: Vec<QueryReport> = queries
        .iter()
        .map(|q| {
            let ranking = ranker.rank(&q.query, k);
            let metrics = MetricSummary::for_ranking(&ranking.doc_ids(), &q.relevant(), k);
            tracing::debug!(model = ranker.name(), query = %q.query, ?metrics, "evaluated query");
            QueryReport { query: q.query.clone(), retrieved: ranking.hits, metrics }
        })
        .collect();
    let summary = MetricSummary::average(&reports.iter().map(|r| r.metrics).collect::<Vec<_>>());
    tracing::info!(model = ranker.name(), queries = reports.len(), map = summary.map, ndcg = summary.ndcg, "evaluated model");
    ModelReport { model: ranker.name().to_string(), k, queries: reports, summary }
}

#[derive(Debug, Clone, Serialize)]
pub struct BooleanQueryReport {
    pub query: String,
    pub retrieved: DocSet,
    pub relevant: DocSet,
    pub precision: f64,
    pub recall: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BooleanReport {
    pub mode: MatchMode,
    pub queries: Vec<BooleanQueryReport>,
    pub precision: f64,
    pub recall: f64,
}

pub fn evaluate_boolean(index: &InvertedIndex, queries: &[GoldQuery], mode: MatchMode) -> BooleanReport {
    let universe = index.universe();
    let reports: Vec<BooleanQueryReport> = queries
        .iter()
        .map(|q| {
            let retrieved = evaluate(q.boolean_query(), index, &universe, mode);
            let relevant = q.relevant();
            let (precision, recall) = precision_recall(&retrieved, &relevant);
            BooleanQueryReport { query: q.boolean_query().to_string(), retrieved, relevant, precision, recall }
        })
        .collect();
    let precision = mean(&reports.iter().map(|r| r.precision).collect::<Vec<_>>());
    let recall = mean(&reports.iter().map(|r| r.recall).collect::<Vec<_>>());
    BooleanReport { mode, queries: reports, precision, recall }
}

/// Fixed-width comparison table, one row per model.
pub fn render_comparison(reports: &[ModelReport]) -> String {
    let k = reports.first().map(|r| r.k).unwrap_or(0);
    let width = reports.iter().map(|r| r.model.len()).max().unwrap_or(5).max(5);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<width$} | {:>9} | {:>9} | {:>9} | {:>9} | {:>9}",
        "Model",
        "Precision",
        "Recall",
        "F1",
        format!("MAP@{k}"),
        format!("nDCG@{k}"),
    );
    let _ = writeln!(out, "{}", "-".repeat(width + 5 * 12));
    for r in reports {
        let [p, rc, f1, map, ndcg] = r.summary.as_array();
        let _ = writeln!(out, "{:<width$} | {p:>9.2} | {rc:>9.2} | {f1:>9.2} | {map:>9.2} | {ndcg:>9.2}", r.model);
    }
    out
}
