use crate::corpus::DocumentSource;
use crate::ranking::{top_k, Ranker, Ranking};
use crate::tokenizer::simple_terms;
use crate::DocId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TfWeighting {
    /// Raw term count.
    #[default]
    Linear,
    /// `1 + ln(tf)`.
    Sublinear,
}

impl TfWeighting {
    fn apply(self, tf: u32) -> f64 {
        match self {
            TfWeighting::Linear => tf as f64,
            TfWeighting::Sublinear if tf > 0 => 1.0 + (tf as f64).ln(),
            TfWeighting::Sublinear => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VsmConfig {
    pub weighting: TfWeighting,
    /// `ln((1+N)/(1+df)) + 1` when set, `ln(N/df) + 1` otherwise.
    pub smooth_idf: bool,
}

impl Default for VsmConfig {
    fn default() -> Self {
        Self { weighting: TfWeighting::Linear, smooth_idf: true }
    }
}

impl VsmConfig {
    pub fn sublinear() -> Self {
        Self { weighting: TfWeighting::Sublinear, ..Self::default() }
    }
}

/// Sparse vector as (column, weight) pairs sorted by column.
type SparseVec = Vec<(usize, f64)>;

/// TF-IDF document matrix with L2-normalized rows, ranked by cosine similarity.
#[derive(Debug, Clone)]
pub struct VectorSpaceModel {
    config: VsmConfig,
    name: String,
    doc_ids: Vec<DocId>,
    vocabulary: Vec<String>,
    columns: HashMap<String, usize>,
    idf: Vec<f64>,
    rows: Vec<SparseVec>,
}

impl VectorSpaceModel {
    pub fn build<S: DocumentSource + ?Sized>(source: &S, config: VsmConfig) -> Self {
        let (doc_ids, docs): (Vec<DocId>, Vec<Vec<String>>) =
            source.documents().into_iter().map(|(id, c)| (id, c.terms().into_owned())).unzip();

        let vocabulary: Vec<String> = docs
            .iter()
            .flatten()
            .cloned()
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect();
        let columns: HashMap<String, usize> = vocabulary.iter().enumerate().map(|(i, t)| (t.clone(), i)).collect();

        let mut df = vec![0u32; vocabulary.len()];
        let counts: Vec<BTreeMap<usize, u32>> = docs
            .iter()
            .map(|terms| {
                let mut tf: BTreeMap<usize, u32> = BTreeMap::new();
                for term in terms {
                    *tf.entry(columns[term]).or_insert(0) += 1;
                }
                for col in tf.keys() {
                    df[*col] += 1;
                }
                tf
            })
            .collect();

        let n = docs.len() as f64;
        let idf = df
            .iter()
            .map(|&d| {
                let d = d as f64;
                if config.smooth_idf {
                    ((1.0 + n) / (1.0 + d)).ln() + 1.0
                } else {
                    (n / d).ln() + 1.0
                }
            })
            .collect();

        let name = match config.weighting {
            TfWeighting::Linear => "TF-IDF",
            TfWeighting::Sublinear => "TF-IDF Sublinear",
        }
        .to_string();

        let mut model = Self {
            config,
            name,
            doc_ids,
            vocabulary,
            columns,
            idf,
            rows: Vec::new(),
        };
        model.rows = counts.iter().map(|tf| model.weigh(tf)).collect();
        tracing::info!(model = %model.name, num_docs = model.doc_ids.len(), num_terms = model.vocabulary.len(), "built vector space model");
        model
    }

    fn weigh(&self, counts: &BTreeMap<usize, u32>) -> SparseVec {
        let mut vec: SparseVec = counts
            .iter()
            .map(|(&col, &tf)| (col, self.config.weighting.apply(tf) * self.idf[col]))
            .collect();
        let norm = vec.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in vec.iter_mut() {
                *w /= norm;
            }
        }
        vec
    }

    /// Query vector in the model's vocabulary space. Unknown terms are dropped.
    pub fn query_vector<S: AsRef<str>>(&self, terms: &[S]) -> Vec<(usize, f64)> {
        let mut counts: BTreeMap<usize, u32> = BTreeMap::new();
        for term in terms {
            if let Some(&col) = self.columns.get(term.as_ref()) {
                *counts.entry(col).or_insert(0) += 1;
            }
        }
        self.weigh(&counts)
    }

    /// Cosine similarity of the query against every document, in collection order.
    pub fn scores<S: AsRef<str>>(&self, terms: &[S]) -> Vec<f64> {
        let query = self.query_vector(terms);
        self.rows.iter().map(|row| cosine(&query, row)).collect()
    }

    pub fn rank_terms<S: AsRef<str>>(&self, terms: &[S], k: usize) -> Ranking {
        if self.doc_ids.is_empty() {
            tracing::warn!(model = %self.name, "ranking against an empty collection");
            return Ranking::empty_collection();
        }
        Ranking { hits: top_k(&self.doc_ids, self.scores(terms), k), warning: None }
    }

    /// Query terms (after splitting) that exist in the vocabulary.
    pub fn matched_terms(&self, query: &str) -> Vec<String> {
        let mut seen = BTreeSet::new();
        simple_terms(query)
            .into_iter()
            .filter(|t| self.columns.contains_key(t) && seen.insert(t.clone()))
            .collect()
    }

    /// Weight of `term` in `doc_id`'s row, 0 when either is unknown.
    pub fn weight(&self, doc_id: &str, term: &str) -> f64 {
        let (Some(row), Some(&col)) = (
            self.doc_ids.iter().position(|d| d == doc_id).map(|i| &self.rows[i]),
            self.columns.get(term),
        ) else {
            return 0.0;
        };
        row.binary_search_by_key(&col, |&(c, _)| c).map(|i| row[i].1).unwrap_or(0.0)
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn config(&self) -> &VsmConfig {
        &self.config
    }
}

impl Ranker for VectorSpaceModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn rank(&self, query: &str, k: usize) -> Ranking {
        self.rank_terms(&simple_terms(query), k)
    }
}

/// Dot product of two L2-normalized sparse vectors, clamped to [0, 1].
/// A zero vector on either side scores 0.
fn cosine(a: &[(usize, f64)], b: &[(usize, f64)]) -> f64 {
    let (mut i, mut j, mut dot) = (0, 0, 0.0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    dot.clamp(0.0, 1.0)
}
