//! Retrieval, ranking and evaluation core for small static text collections.
//!
//! A [`Collection`] feeds the [`InvertedIndex`] (boolean model), the
//! [`VectorSpaceModel`] (TF-IDF + cosine) and [`Bm25`]; the [`metrics`] and
//! [`eval`] modules score what those models retrieve against gold sets.

pub mod bm25;
pub mod boolean;
pub mod config;
pub mod corpus;
pub mod eval;
pub mod index;
pub mod metrics;
pub mod ranking;
pub mod tokenizer;
pub mod vsm;

use std::collections::BTreeSet;

pub type DocId = String;
/// Unordered result of a boolean query. Ordered by id only for stable output.
pub type DocSet = BTreeSet<DocId>;

pub use bm25::{Bm25, Bm25Config};
pub use boolean::{evaluate, MatchMode};
pub use config::EngineConfig;
pub use corpus::{Collection, Content, DocumentSource, Representation};
pub use index::{build_index, InvertedIndex};
pub use ranking::{Ranker, Ranking, ScoredDoc, Warning};
pub use vsm::{TfWeighting, VectorSpaceModel, VsmConfig};
