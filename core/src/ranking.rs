use crate::DocId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDoc {
    pub doc_id: DocId,
    pub score: f64,
}

/// Non-fatal conditions a ranker reports alongside its (possibly empty) output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Warning {
    EmptyCollection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub hits: Vec<ScoredDoc>,
    pub warning: Option<Warning>,
}

impl Ranking {
    pub fn empty_collection() -> Self {
        Self { hits: Vec::new(), warning: Some(Warning::EmptyCollection) }
    }

    pub fn doc_ids(&self) -> Vec<DocId> {
        self.hits.iter().map(|h| h.doc_id.clone()).collect()
    }
}

/// A free-text ranking model over a fixed collection.
pub trait Ranker {
    /// Display name used in reports, e.g. `TF-IDF Sublinear`.
    fn name(&self) -> &str;
    fn rank(&self, query: &str, k: usize) -> Ranking;
}

/// Orders `scores` (parallel to `doc_ids`) descending and keeps the first `k`.
/// The sort is stable, so equal scores keep collection order.
pub(crate) fn top_k(doc_ids: &[DocId], scores: Vec<f64>, k: usize) -> Vec<ScoredDoc> {
    let mut scored: Vec<(usize, f64)> = scores.into_iter().enumerate().collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored
        .into_iter()
        .take(k)
        .map(|(i, score)| ScoredDoc { doc_id: doc_ids[i].clone(), score })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<DocId> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn ties_keep_input_order() {
        let docs = ids(&["x", "y", "z"]);
        let top = top_k(&docs, vec![0.5, 0.9, 0.5], 3);
        let order: Vec<&str> = top.iter().map(|h| h.doc_id.as_str()).collect();
        assert_eq!(order, vec!["y", "x", "z"]);
    }

    #[test]
    fn truncates_to_k() {
        let docs = ids(&["x", "y", "z"]);
        assert_eq!(top_k(&docs, vec![0.1, 0.2, 0.3], 2).len(), 2);
        assert!(top_k(&docs, vec![0.1, 0.2, 0.3], 0).is_empty());
    }
}
