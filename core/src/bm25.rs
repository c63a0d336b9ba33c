//! Okapi BM25, the probabilistic baseline the TF-IDF models are compared with.
//!
//! Idf follows the Okapi form `ln(N - df + 0.5) - ln(df + 0.5)`. Terms that
//! occur in more than half the collection get a negative idf; those are
//! floored to `epsilon * mean_idf` instead.

use crate::corpus::DocumentSource;
use crate::ranking::{top_k, Ranker, Ranking};
use crate::tokenizer::simple_terms;
use crate::DocId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Config {
    pub k1: f64,
    pub b: f64,
    pub epsilon: f64,
}

impl Default for Bm25Config {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75, epsilon: 0.25 }
    }
}

#[derive(Debug, Clone)]
pub struct Bm25 {
    config: Bm25Config,
    doc_ids: Vec<DocId>,
    term_freqs: Vec<HashMap<String, u32>>,
    doc_lens: Vec<usize>,
    avgdl: f64,
    idf: HashMap<String, f64>,
}

impl Bm25 {
    pub fn build<S: DocumentSource + ?Sized>(source: &S, config: Bm25Config) -> Self {
        let documents = source.documents();
        let mut term_freqs = Vec::with_capacity(documents.len());
        let mut doc_lens = Vec::with_capacity(documents.len());
        let mut df: HashMap<String, u32> = HashMap::new();

        for (_, content) in &documents {
            let terms = content.terms();
            let mut tf: HashMap<String, u32> = HashMap::new();
            for term in terms.iter() {
                *tf.entry(term.clone()).or_insert(0) += 1;
            }
            for term in tf.keys() {
                *df.entry(term.clone()).or_insert(0) += 1;
            }
            doc_lens.push(terms.len());
            term_freqs.push(tf);
        }

        let n = documents.len() as f64;
        let avgdl = if n > 0.0 { doc_lens.iter().sum::<usize>() as f64 / n } else { 0.0 };

        let mut idf: HashMap<String, f64> = df
            .into_iter()
            .map(|(term, d)| {
                let d = d as f64;
                (term, (n - d + 0.5).ln() - (d + 0.5).ln())
            })
            .collect();
        if !idf.is_empty() {
            let floor = config.epsilon * idf.values().sum::<f64>() / idf.len() as f64;
            for value in idf.values_mut().filter(|v| **v < 0.0) {
                *value = floor;
            }
        }

        tracing::info!(num_docs = documents.len(), num_terms = idf.len(), avgdl, "built bm25 model");
        let doc_ids = documents.into_iter().map(|(id, _)| id).collect();
        Self { config, doc_ids, term_freqs, doc_lens, avgdl, idf }
    }

    pub fn idf(&self, term: &str) -> f64 {
        self.idf.get(term).copied().unwrap_or(0.0)
    }

    /// BM25 score of every document for `terms`, in collection order.
    /// Repeated query terms count once per occurrence.
    pub fn scores<S: AsRef<str>>(&self, terms: &[S]) -> Vec<f64> {
        let Bm25Config { k1, b, .. } = self.config;
        self.term_freqs
            .iter()
            .zip(&self.doc_lens)
            .map(|(tf, &len)| {
                let len_ratio = if self.avgdl > 0.0 { len as f64 / self.avgdl } else { 0.0 };
                terms
                    .iter()
                    .map(|t| {
                        let f = tf.get(t.as_ref()).copied().unwrap_or(0) as f64;
                        self.idf(t.as_ref()) * (f * (k1 + 1.0)) / (f + k1 * (1.0 - b + b * len_ratio))
                    })
                    .sum()
            })
            .collect()
    }

    pub fn rank_terms<S: AsRef<str>>(&self, terms: &[S], k: usize) -> Ranking {
        if self.doc_ids.is_empty() {
            tracing::warn!(model = "BM25", "ranking against an empty collection");
            return Ranking::empty_collection();
        }
        Ranking { hits: top_k(&self.doc_ids, self.scores(terms), k), warning: None }
    }
}

impl Ranker for Bm25 {
    fn name(&self) -> &str {
        "BM25"
    }

    fn rank(&self, query: &str, k: usize) -> Ranking {
        self.rank_terms(&simple_terms(query), k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Collection;

    fn shelf() -> Collection {
        Collection::from_tokens([
            ("fantasi.txt", vec!["pedang", "hutan", "naga", "pedang"]),
            ("romansa.txt", vec!["cinta", "surat", "hujan"]),
            ("motivasi.txt", vec!["motivasi", "semangat", "cinta"]),
            ("sains.txt", vec!["ilmu", "sains", "pengetahuan"]),
            ("horor.txt", vec!["hantu", "hutan", "malam"]),
        ])
        .unwrap()
    }

    #[test]
    fn rare_terms_weigh_more() {
        let bm = Bm25::build(&shelf(), Bm25Config::default());
        assert!(bm.idf("naga") > bm.idf("hutan"));
        assert_eq!(bm.idf("unknown"), 0.0);
    }

    #[test]
    fn ranks_matching_document_first() {
        let bm = Bm25::build(&shelf(), Bm25Config::default());
        let ranked = bm.rank("pedang hutan", 3);
        assert_eq!(ranked.hits[0].doc_id, "fantasi.txt");
        assert_eq!(ranked.hits[1].doc_id, "horor.txt");
        assert_eq!(ranked.hits.len(), 3);
    }

    #[test]
    fn negative_idf_is_floored() {
        let c = Collection::from_tokens([("a.txt", vec!["x", "y"]), ("b.txt", vec!["x"]), ("c.txt", vec!["x", "z"])]).unwrap();
        let bm = Bm25::build(&c, Bm25Config::default());
        // df(x) = 3 of 3: raw idf ln(0.5) - ln(3.5) < 0
        let raw_x = (0.5f64).ln() - (3.5f64).ln();
        let raw_y = (2.5f64).ln() - (1.5f64).ln();
        let floor = 0.25 * (raw_x + 2.0 * raw_y) / 3.0;
        assert!((bm.idf("x") - floor).abs() < 1e-12);
        assert!((bm.idf("y") - raw_y).abs() < 1e-12);
    }

    #[test]
    fn empty_collection_warns() {
        let bm = Bm25::build(&Collection::new(), Bm25Config::default());
        assert_eq!(bm.rank("pedang", 3), Ranking::empty_collection());
    }
}
