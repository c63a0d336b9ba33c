//! Left-to-right boolean query evaluation over an [`InvertedIndex`].
//!
//! There is no precedence and no grouping: one accumulator and at most one
//! pending operator. Stray operators never fail the query; the last operator
//! read before a term is the one applied, and a trailing operator is dropped.

use crate::index::InvertedIndex;
use crate::tokenizer::words;
use crate::DocSet;
use serde::{Deserialize, Serialize};

/// How a bare query term is looked up in the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Postings of the identical term only.
    #[default]
    Exact,
    /// Union of postings of every indexed term containing the query term,
    /// so `pedang` also finds `pedangnya`.
    Substring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
    Not,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Term(String),
    Op(Operator),
}

/// Split a query into operators and lowercased terms. Terms follow the word
/// rule used for raw-text documents, so punctuation never reaches the index.
pub fn parse(query: &str) -> Vec<Token> {
    words(query)
        .into_iter()
        .map(|raw| match raw.to_ascii_uppercase().as_str() {
            "AND" => Token::Op(Operator::And),
            "OR" => Token::Op(Operator::Or),
            "NOT" => Token::Op(Operator::Not),
            _ => Token::Term(raw.to_lowercase()),
        })
        .collect()
}

fn resolve(term: &str, index: &InvertedIndex, mode: MatchMode) -> DocSet {
    match mode {
        MatchMode::Exact => index.postings(term).cloned().unwrap_or_default(),
        MatchMode::Substring => index.postings_containing(term),
    }
}

/// Evaluate `query` against `index`. `universe` is the complement base for a
/// leading `NOT`.
pub fn evaluate(query: &str, index: &InvertedIndex, universe: &DocSet, mode: MatchMode) -> DocSet {
    let mut acc: Option<DocSet> = None;
    let mut pending: Option<Operator> = None;

    for token in parse(query) {
        let term = match token {
            Token::Op(op) => {
                pending = Some(op);
                continue;
            }
            Token::Term(term) => term,
        };
        let docs = resolve(&term, index, mode);
        acc = Some(match (acc.take(), pending.take()) {
            (None, Some(Operator::Not)) => universe.difference(&docs).cloned().collect(),
            (None, _) | (Some(_), None) => docs,
            (Some(cur), Some(Operator::And)) => cur.intersection(&docs).cloned().collect(),
            (Some(cur), Some(Operator::Or)) => cur.union(&docs).cloned().collect(),
            (Some(cur), Some(Operator::Not)) => cur.difference(&docs).cloned().collect(),
        });
    }
    acc.unwrap_or_default()
}
