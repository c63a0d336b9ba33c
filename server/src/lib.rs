use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stki_core::boolean::{parse, Token};
use stki_core::corpus::load_dir;
use stki_core::tokenizer::simple_terms;
use stki_core::{
    build_index, evaluate, Bm25, Collection, DocId, DocSet, EngineConfig, InvertedIndex, MatchMode, Ranker,
    Representation, TfWeighting, VectorSpaceModel, VsmConfig, Warning,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const SNIPPET_CONTEXT: usize = 60;
const SNIPPET_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchModel {
    #[default]
    Vsm,
    VsmSublinear,
    Bm25,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub k: Option<usize>,
    #[serde(default)]
    pub model: SearchModel,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub model: String,
    pub took_s: f64,
    pub total_hits: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<Warning>,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f64,
    pub snippet: Option<String>,
}

#[derive(Deserialize)]
pub struct BooleanParams {
    pub q: String,
    pub mode: Option<MatchMode>,
}

#[derive(Serialize)]
pub struct BooleanResponse {
    pub query: String,
    pub mode: MatchMode,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<BooleanHit>,
}

#[derive(Serialize)]
pub struct BooleanHit {
    pub doc_id: DocId,
    pub snippet: Option<String>,
}

/// Everything built from the collection at startup. Read-only afterwards.
pub struct Engine {
    collection: Collection,
    index: InvertedIndex,
    universe: DocSet,
    vsm: VectorSpaceModel,
    vsm_sublinear: VectorSpaceModel,
    bm25: Bm25,
    config: EngineConfig,
}

impl Engine {
    pub fn new(collection: Collection, config: EngineConfig) -> Self {
        let index = build_index(&collection);
        let universe = index.universe();
        let vsm = VectorSpaceModel::build(&collection, VsmConfig { weighting: TfWeighting::Linear, ..config.vsm });
        let vsm_sublinear =
            VectorSpaceModel::build(&collection, VsmConfig { weighting: TfWeighting::Sublinear, ..config.vsm });
        let bm25 = Bm25::build(&collection, config.bm25);
        tracing::info!(num_docs = collection.len(), vocabulary = index.len(), "engine ready");
        Self { collection, index, universe, vsm, vsm_sublinear, bm25, config }
    }

    fn ranker(&self, model: SearchModel) -> &dyn Ranker {
        match model {
            SearchModel::Vsm => &self.vsm,
            SearchModel::VsmSublinear => &self.vsm_sublinear,
            SearchModel::Bm25 => &self.bm25,
        }
    }

    fn snippet(&self, doc_id: &str, pattern: Option<&Regex>) -> Option<String> {
        let content = self.collection.get(doc_id)?;
        snippet(&content.display_text(), pattern)
    }
}

pub type AppState = Arc<Engine>;

pub fn build_app(data_dir: impl AsRef<std::path::Path>, representation: Representation, config: EngineConfig) -> Result<Router> {
    let collection = load_dir(data_dir.as_ref(), representation)?;
    if collection.is_empty() {
        tracing::warn!(dir = %data_dir.as_ref().display(), "serving an empty collection");
    }
    Ok(router(Engine::new(collection, config)))
}

pub fn router(engine: Engine) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/boolean", get(boolean_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .with_state(Arc::new(engine))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(State(engine): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let k = params.k.unwrap_or(engine.config.k).clamp(1, 100);
    let ranker = engine.ranker(params.model);
    let ranking = ranker.rank(&params.q, k);
    let pattern = term_pattern(&simple_terms(&params.q));

    let results: Vec<SearchHit> = ranking
        .hits
        .into_iter()
        .map(|hit| {
            let snippet = engine.snippet(&hit.doc_id, pattern.as_ref());
            SearchHit { doc_id: hit.doc_id, score: hit.score, snippet }
        })
        .collect();
    let elapsed = start.elapsed();
    tracing::debug!(query = %params.q, model = ranker.name(), hits = results.len(), "search");
    Json(SearchResponse {
        query: params.q,
        model: ranker.name().to_string(),
        took_s: elapsed.as_secs_f64(),
        total_hits: results.len(),
        warning: ranking.warning,
        results,
    })
}

pub async fn boolean_handler(State(engine): State<AppState>, Query(params): Query<BooleanParams>) -> Json<BooleanResponse> {
    let start = std::time::Instant::now();
    let mode = params.mode.unwrap_or(engine.config.boolean_mode);
    let hits = evaluate(&params.q, &engine.index, &engine.universe, mode);
    let terms: Vec<String> = parse(&params.q)
        .into_iter()
        .filter_map(|t| match t {
            Token::Term(term) => Some(term),
            Token::Op(_) => None,
        })
        .collect();
    let pattern = term_pattern(&terms);

    let results: Vec<BooleanHit> = hits
        .into_iter()
        .map(|doc_id| {
            let snippet = engine.snippet(&doc_id, pattern.as_ref());
            BooleanHit { doc_id, snippet }
        })
        .collect();
    let elapsed = start.elapsed();
    Json(BooleanResponse { query: params.q, mode, took_s: elapsed.as_secs_f64(), total_hits: results.len(), results })
}

pub async fn doc_handler(
    State(engine): State<AppState>,
    Path(doc_id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    match engine.collection.get(&doc_id) {
        Some(content) => Ok(Json(serde_json::json!({
            "doc_id": doc_id,
            "terms": content.terms().len(),
            "text": content.display_text(),
        }))),
        None => Err((StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "not found", "doc_id": doc_id })))),
    }
}

/// One case-insensitive alternation over the query terms, `None` when there is
/// nothing to highlight.
fn term_pattern(terms: &[String]) -> Option<Regex> {
    let alternatives: Vec<String> = terms.iter().filter(|t| !t.trim().is_empty()).map(|t| regex::escape(t)).collect();
    if alternatives.is_empty() {
        return None;
    }
    RegexBuilder::new(&alternatives.join("|")).case_insensitive(true).build().ok()
}

/// A window of the text around the first match, with every match wrapped in
/// `<em>`. Falls back to the opening of the text.
fn snippet(text: &str, pattern: Option<&Regex>) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let first = pattern.and_then(|p| p.find(text)).map(|m| text[..m.start()].chars().count()).unwrap_or(0);
    let window: String = text.chars().skip(first.saturating_sub(SNIPPET_CONTEXT)).take(SNIPPET_CHARS).collect();
    let window = window.replace('\n', " ");
    Some(match pattern {
        Some(p) => p.replace_all(&window, "<em>$0</em>").into_owned(),
        None => window,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_highlights_every_match() {
        let pattern = term_pattern(&["pedang".to_string()]);
        let s = snippet("Pedang tua dan pedang baru", pattern.as_ref()).unwrap();
        assert_eq!(s, "<em>Pedang</em> tua dan <em>pedang</em> baru");
    }

    #[test]
    fn snippet_centres_on_first_match() {
        let text = format!("{}naga", "x".repeat(300));
        let pattern = term_pattern(&["naga".to_string()]);
        let s = snippet(&text, pattern.as_ref()).unwrap();
        assert!(s.ends_with("<em>naga</em>"));
        assert_eq!(s.chars().filter(|c| *c == 'x').count(), SNIPPET_CONTEXT);
    }

    #[test]
    fn snippet_handles_multibyte_text() {
        let text = format!("{}café naga", "é".repeat(200));
        let s = snippet(&text, term_pattern(&["naga".to_string()]).as_ref()).unwrap();
        assert!(s.contains("<em>naga</em>"));
        assert_eq!(snippet("", None), None);
    }

    #[test]
    fn empty_terms_have_no_pattern() {
        assert!(term_pattern(&[]).is_none());
        assert!(term_pattern(&["  ".to_string()]).is_none());
    }
}
