use crate::corpus::DocumentSource;
use crate::{DocId, DocSet};
use std::collections::HashMap;

/// Term → posting set. Presence only; term frequencies live in the ranking models.
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    postings: HashMap<String, DocSet>,
    docs: Vec<DocId>, // collection order
}

pub fn build_index<S: DocumentSource + ?Sized>(source: &S) -> InvertedIndex {
    let documents = source.documents();
    let mut postings: HashMap<String, DocSet> = HashMap::new();
    for (doc_id, content) in &documents {
        for term in content.terms().iter() {
            if let Some(set) = postings.get_mut(term) {
                set.insert(doc_id.clone());
            } else {
                postings.insert(term.clone(), DocSet::from([doc_id.clone()]));
            }
        }
    }
    tracing::debug!(num_docs = documents.len(), num_terms = postings.len(), "built inverted index");
    InvertedIndex { postings, docs: documents.into_iter().map(|(id, _)| id).collect() }
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn postings(&self, term: &str) -> Option<&DocSet> {
        self.postings.get(term)
    }

    /// Union of the posting sets of every indexed term containing `fragment`.
    pub fn postings_containing(&self, fragment: &str) -> DocSet {
        let mut out = DocSet::new();
        for (term, docs) in &self.postings {
            if term.contains(fragment) {
                out.extend(docs.iter().cloned());
            }
        }
        out
    }

    /// Indexed terms, sorted.
    pub fn terms(&self) -> Vec<&str> {
        let mut terms: Vec<&str> = self.postings.keys().map(String::as_str).collect();
        terms.sort_unstable();
        terms
    }

    pub fn doc_ids(&self) -> &[DocId] {
        &self.docs
    }

    pub fn universe(&self) -> DocSet {
        self.docs.iter().cloned().collect()
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Term-document incidence rows for `terms`, columns in collection order.
    pub fn incidence_matrix<S: AsRef<str>>(&self, terms: &[S]) -> Vec<(String, Vec<u8>)> {
        terms
            .iter()
            .map(|term| {
                let term = term.as_ref();
                let row = match self.postings.get(term) {
                    Some(set) => self.docs.iter().map(|d| u8::from(set.contains(d))).collect(),
                    None => vec![0; self.docs.len()],
                };
                (term.to_string(), row)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Collection;

    fn sample() -> Collection {
        Collection::from_tokens([
            ("a.txt", vec!["pedang", "hutan"]),
            ("b.txt", vec!["cinta"]),
            ("c.txt", vec!["hutan", "pedang", "pedang"]),
        ])
        .unwrap()
    }

    #[test]
    fn posting_sets_dedupe_repeats() {
        let idx = build_index(&sample());
        let pedang: Vec<&str> = idx.postings("pedang").unwrap().iter().map(String::as_str).collect();
        assert_eq!(pedang, vec!["a.txt", "c.txt"]);
        assert_eq!(idx.len(), 3);
        assert!(idx.postings("naga").is_none());
    }

    #[test]
    fn empty_collection_gives_empty_index() {
        let idx = build_index(&Collection::new());
        assert!(idx.is_empty());
        assert!(idx.universe().is_empty());
    }

    #[test]
    fn substring_lookup_unions_matches() {
        let c = Collection::from_tokens([("a.txt", vec!["pedangnya"]), ("b.txt", vec!["pedang"]), ("c.txt", vec!["hutan"])]).unwrap();
        let idx = build_index(&c);
        let hits = idx.postings_containing("pedang");
        assert_eq!(hits, DocSet::from(["a.txt".to_string(), "b.txt".to_string()]));
    }

    #[test]
    fn incidence_rows_follow_collection_order() {
        let idx = build_index(&sample());
        let m = idx.incidence_matrix(&["hutan", "naga"]);
        assert_eq!(m[0], ("hutan".to_string(), vec![1, 0, 1]));
        assert_eq!(m[1], ("naga".to_string(), vec![0, 0, 0]));
    }
}
