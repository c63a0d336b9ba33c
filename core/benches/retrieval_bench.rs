use criterion::{criterion_group, criterion_main, Criterion};
use stki_core::{build_index, evaluate, Collection, MatchMode, Ranker, VectorSpaceModel, VsmConfig};

fn synthetic_collection(num_docs: usize) -> Collection {
    let words = ["pedang", "hutan", "cinta", "motivasi", "ilmu", "sains", "naga", "hantu", "surat", "semangat"];
    Collection::from_tokens((0..num_docs).map(|i| {
        let tokens: Vec<&str> = (0..40).map(|j| words[(i * 7 + j * 3) % words.len()]).collect();
        (format!("doc_{i:05}.txt"), tokens)
    }))
    .expect("unique ids")
}

fn bench_retrieval(c: &mut Criterion) {
    let collection = synthetic_collection(2_000);
    c.bench_function("build_vsm_2k", |b| b.iter(|| VectorSpaceModel::build(&collection, VsmConfig::default())));

    let vsm = VectorSpaceModel::build(&collection, VsmConfig::default());
    c.bench_function("rank_vsm_2k", |b| b.iter(|| vsm.rank("pedang hutan naga", 10)));

    let index = build_index(&collection);
    let universe = index.universe();
    c.bench_function("boolean_substring_2k", |b| {
        b.iter(|| evaluate("pedang AND hutan NOT naga", &index, &universe, MatchMode::Substring))
    });
}

criterion_group!(benches, bench_retrieval);
criterion_main!(benches);
