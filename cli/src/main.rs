use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use serde::Serialize;
use stki_core::corpus::load_dir;
use stki_core::eval::{evaluate_boolean, evaluate_ranker, load_gold_queries, render_comparison, BooleanReport, ModelReport};
use stki_core::tokenizer::{top_terms, Analyzer, AnalyzerConfig, StopwordSet};
use stki_core::{
    build_index, evaluate, Bm25, Collection, EngineConfig, MatchMode, Ranker, Representation, ScoredDoc, TfWeighting,
    VectorSpaceModel, VsmConfig,
};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs;
use std::path::{Path, PathBuf};

const SNIPPET_CHARS: usize = 120;

#[derive(Parser)]
#[command(name = "stki")]
#[command(about = "Boolean, TF-IDF and BM25 retrieval over a folder of text documents", long_about = None)]
struct Cli {
    /// JSON engine config; flags given on the command line win
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DataArgs {
    /// Folder of .txt documents
    #[arg(long, default_value = "data/processed")]
    data: PathBuf,
    /// Treat files as raw text instead of preprocessed tokens
    #[arg(long, default_value_t = false)]
    raw: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Model {
    Boolean,
    Vsm,
    VsmSublinear,
    Bm25,
}

#[derive(Clone, Copy, ValueEnum)]
enum Match {
    Exact,
    Substring,
}

#[derive(Clone, Copy, ValueEnum)]
enum Stopwords {
    Id,
    En,
    None,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean, filter and stem every raw document into the processed folder
    Preprocess {
        #[arg(long, default_value = "data/raw")]
        input: PathBuf,
        #[arg(long, default_value = "data/processed")]
        output: PathBuf,
        #[arg(long, value_enum)]
        stopwords: Option<Stopwords>,
        #[arg(long, default_value_t = false)]
        no_stem: bool,
    },
    /// Print index statistics, sample postings and an incidence matrix
    Inspect {
        #[command(flatten)]
        data: DataArgs,
        /// Comma separated terms for the incidence matrix (default: first 5 terms)
        #[arg(long, value_delimiter = ',')]
        terms: Vec<String>,
    },
    /// Run one query against one model
    Search {
        #[command(flatten)]
        data: DataArgs,
        #[arg(long, value_enum)]
        model: Model,
        #[arg(long)]
        query: String,
        #[arg(long)]
        k: Option<usize>,
        #[arg(long = "match", value_enum)]
        match_mode: Option<Match>,
    },
    /// Compare the models on a gold query file
    Eval {
        #[command(flatten)]
        data: DataArgs,
        #[arg(long)]
        queries: PathBuf,
        #[arg(long)]
        k: Option<usize>,
        /// Write the full report as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Interactive search assistant over the vector space model
    Chat {
        #[command(flatten)]
        data: DataArgs,
        #[arg(long)]
        k: Option<usize>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let mut config = EngineConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Preprocess { input, output, stopwords, no_stem } => {
            if let Some(s) = stopwords {
                config.analyzer.stopwords = match s {
                    Stopwords::Id => StopwordSet::Indonesian,
                    Stopwords::En => StopwordSet::English,
                    Stopwords::None => StopwordSet::None,
                };
            }
            if no_stem {
                config.analyzer.stem = false;
            }
            preprocess_dir(&input, &output, config.analyzer)?;
            Ok(())
        }
        Commands::Inspect { data, terms } => inspect(&load(&data)?, &terms),
        Commands::Search { data, model, query, k, match_mode } => {
            if let Some(m) = match_mode {
                config.boolean_mode = match m {
                    Match::Exact => MatchMode::Exact,
                    Match::Substring => MatchMode::Substring,
                };
            }
            let k = k.unwrap_or(config.k);
            search(&load(&data)?, model, &query, k, &config)
        }
        Commands::Eval { data, queries, k, json } => {
            let k = k.unwrap_or(config.k);
            run_eval(&load(&data)?, &queries, k, &config, json.as_deref())
        }
        Commands::Chat { data, k } => chat(&load(&data)?, k.unwrap_or(config.k), config.vsm),
    }
}

fn load(args: &DataArgs) -> Result<Collection> {
    let representation = if args.raw { Representation::Text } else { Representation::Tokens };
    let collection = load_dir(&args.data, representation)?;
    if collection.is_empty() {
        tracing::warn!(dir = %args.data.display(), "no documents found; run `stki preprocess` first");
    }
    Ok(collection)
}

/// Analyze every `.txt` under `input` and write the space-joined tokens to the
/// same file name under `output`. Returns the number of documents written.
fn preprocess_dir(input: &Path, output: &Path, config: AnalyzerConfig) -> Result<usize> {
    fs::create_dir_all(output).with_context(|| format!("creating {}", output.display()))?;
    let analyzer = Analyzer::new(config);
    let mut written = 0;
    for entry in WalkDir::new(input).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("reading {}", input.display()))?;
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("txt") {
            continue;
        }
        let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let tokens = analyzer.analyze(&text);
        fs::write(output.join(entry.file_name()), tokens.join(" "))
            .with_context(|| format!("writing processed {}", path.display()))?;
        let top = top_terms(&tokens, 10);
        tracing::info!(file = %entry.file_name().to_string_lossy(), num_tokens = tokens.len(), ?top, "preprocessed");
        written += 1;
    }
    tracing::info!(written, output = %output.display(), "preprocessing complete");
    Ok(written)
}

fn inspect(collection: &Collection, terms: &[String]) -> Result<()> {
    let index = build_index(collection);
    println!("Documents: {}", collection.len());
    println!("Vocabulary: {} terms", index.len());

    println!("\n=== Sample inverted index ===");
    let all_terms = index.terms();
    for term in all_terms.iter().take(5) {
        let docs: Vec<&str> = index.postings(term).map(|s| s.iter().map(String::as_str).collect()).unwrap_or_default();
        println!("{term} -> {docs:?}");
    }

    let selected: Vec<String> = if terms.is_empty() {
        all_terms.iter().take(5).map(|t| t.to_string()).collect()
    } else {
        terms.iter().map(|t| t.to_lowercase()).collect()
    };
    println!("\n=== Incidence matrix ===");
    println!("{:<15} {}", "", collection.ids().join(" "));
    for (term, row) in index.incidence_matrix(&selected) {
        let cells: Vec<String> = row.iter().zip(collection.ids()).map(|(v, id)| format!("{v:^w$}", w = id.len())).collect();
        println!("{term:<15} {}", cells.join(" "));
    }
    Ok(())
}

fn snippet(collection: &Collection, doc_id: &str) -> String {
    collection
        .get(doc_id)
        .map(|c| c.display_text().chars().take(SNIPPET_CHARS).collect::<String>().replace('\n', " "))
        .unwrap_or_default()
}

fn search(collection: &Collection, model: Model, query: &str, k: usize, config: &EngineConfig) -> Result<()> {
    let title = match model {
        Model::Boolean => "BOOLEAN RETRIEVAL",
        Model::Vsm => "VECTOR SPACE MODEL",
        Model::VsmSublinear => "VECTOR SPACE MODEL (sublinear tf)",
        Model::Bm25 => "BM25",
    };
    println!("\nModel: {title}");
    println!("Query: {query}");
    println!("{}", "=".repeat(60));

    match model {
        Model::Boolean => {
            let index = build_index(collection);
            let hits = evaluate(query, &index, &index.universe(), config.boolean_mode);
            if hits.is_empty() {
                println!("No documents found.");
            }
            for (i, doc) in hits.iter().enumerate() {
                println!("{}. {doc:<25} | {}", i + 1, snippet(collection, doc));
            }
            println!("\nTotal hits: {} documents.", hits.len());
        }
        Model::Vsm | Model::VsmSublinear => {
            let weighting = if matches!(model, Model::Vsm) { TfWeighting::Linear } else { TfWeighting::Sublinear };
            let vsm = VectorSpaceModel::build(collection, VsmConfig { weighting, ..config.vsm });
            let matched = vsm.matched_terms(query);
            for (rank, hit) in vsm.rank(query, k).hits.iter().enumerate() {
                println!("{}. {:<25} | cosine={:.4} | {}", rank + 1, hit.doc_id, hit.score, snippet(collection, &hit.doc_id));
                println!("   -> matched terms: {}", if matched.is_empty() { "-".to_string() } else { matched.join(", ") });
            }
        }
        Model::Bm25 => {
            let bm25 = Bm25::build(collection, config.bm25);
            for (rank, hit) in bm25.rank(query, k).hits.iter().enumerate() {
                println!("{}. {:<25} | bm25={:.4} | {}", rank + 1, hit.doc_id, hit.score, snippet(collection, &hit.doc_id));
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct EvalSummary {
    generated_at: String,
    num_docs: usize,
    k: usize,
    models: Vec<ModelReport>,
    boolean: BooleanReport,
}

fn run_eval(collection: &Collection, queries: &Path, k: usize, config: &EngineConfig, json: Option<&Path>) -> Result<()> {
    let gold = load_gold_queries(queries)?;
    println!("Total documents: {}", collection.len());

    let linear = VectorSpaceModel::build(collection, VsmConfig { weighting: TfWeighting::Linear, ..config.vsm });
    let sublinear = VectorSpaceModel::build(collection, VsmConfig { weighting: TfWeighting::Sublinear, ..config.vsm });
    let bm25 = Bm25::build(collection, config.bm25);
    let rankers: [&dyn Ranker; 3] = [&linear, &sublinear, &bm25];

    let mut reports = Vec::with_capacity(rankers.len());
    for ranker in rankers {
        let report = evaluate_ranker(ranker, &gold, k);
        println!("\n{}", "=".repeat(70));
        println!("Model: {}", report.model);
        for q in &report.queries {
            let m = q.metrics;
            println!("\nQuery: {}", q.query);
            println!("Top-{k}: {:?}", q.retrieved.iter().map(|h: &ScoredDoc| h.doc_id.as_str()).collect::<Vec<_>>());
            println!(
                "Precision={:.2}, Recall={:.2}, F1={:.2}, MAP@{k}={:.2}, nDCG@{k}={:.2}",
                m.precision, m.recall, m.f1, m.map, m.ndcg
            );
        }
        reports.push(report);
    }

    let index = build_index(collection);
    let boolean = evaluate_boolean(&index, &gold, config.boolean_mode);
    println!("\n{}", "=".repeat(70));
    println!("Boolean retrieval ({:?} match)", boolean.mode);
    for q in &boolean.queries {
        println!("{:<30} | found {:?} | precision={:.2} recall={:.2}", q.query, q.retrieved, q.precision, q.recall);
    }

    println!("\n{}", "=".repeat(70));
    println!("Summary\n");
    print!("{}", render_comparison(&reports));
    println!("{:<16} | precision={:.2} recall={:.2}", "Boolean", boolean.precision, boolean.recall);

    if let Some(path) = json {
        let summary = EvalSummary {
            generated_at: timestamp(),
            num_docs: collection.len(),
            k,
            models: reports,
            boolean,
        };
        fs::write(path, serde_json::to_string_pretty(&summary)?).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote evaluation report");
    }
    Ok(())
}

fn timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(stamp) => stamp,
        Err(err) => {
            tracing::warn!(%err, "could not format generated_at");
            String::new()
        }
    }
}

fn chat_response(query: &str, hits: &[ScoredDoc], collection: &Collection) -> String {
    if hits.is_empty() {
        return format!("No relevant documents found for '{query}'.");
    }
    let mut response = format!("Top {} documents for '{query}':\n\n", hits.len());
    for (i, hit) in hits.iter().enumerate() {
        response.push_str(&format!("{}. {:<25} (cosine: {:.3}) {}\n", i + 1, hit.doc_id, hit.score, snippet(collection, &hit.doc_id)));
    }
    response
}

fn chat(collection: &Collection, k: usize, vsm_config: VsmConfig) -> Result<()> {
    let vsm = VectorSpaceModel::build(collection, vsm_config);
    let mut rl = DefaultEditor::new()?;
    println!("{}", "=".repeat(60));
    println!("Mini search assistant (vector space model)");
    println!("Type a question or keywords, 'exit' to quit");
    println!("{}", "=".repeat(60));

    loop {
        match rl.readline("query> ") {
            Ok(line) => {
                let query = line.trim();
                if query.is_empty() {
                    continue;
                }
                if query.eq_ignore_ascii_case("exit") {
                    break;
                }
                if let Err(err) = rl.add_history_entry(query) {
                    tracing::warn!(%err, "could not record history entry");
                }
                let ranking = vsm.rank(query, k);
                let hits: Vec<ScoredDoc> = ranking.hits.into_iter().filter(|h| h.score > 0.0).collect();
                println!("\n{}", chat_response(query, &hits, collection));
                println!("{}", "-".repeat(60));
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}
