/// Benchmarks for document collection, chunking and full builds
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use repo_index::config::{Config, StoreBackend};
use repo_index::embedding::EmbeddingProvider;
use repo_index::indexer::{FileWalker, TextChunker, TextExtractor};
use repo_index::{Document, IndexBuilder, RepoTarget};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::runtime::Runtime;

struct ZeroEmbedder;

impl EmbeddingProvider for ZeroEmbedder {
    fn embed_batch(&self, texts: Vec<String>) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| vec![t.len() as f32; 16]).collect())
    }

    fn dimension(&self) -> usize {
        16
    }

    fn model_name(&self) -> &str {
        "zero"
    }
}

/// Create `count` source files under `<root>/repo/src`
fn create_test_files(root: &Path, count: usize) -> anyhow::Result<()> {
    let src_dir = root.join("repo").join("src");
    std::fs::create_dir_all(&src_dir)?;

    for i in 0..count {
        let content = format!(
            r#"
/// Module {i}
pub mod module_{i} {{
    pub fn function_{i}(x: i32) -> i32 {{
        x * {}
    }}

    pub struct Data{i} {{
        pub value: i32,
        pub name: String,
    }}
}}
"#,
            i + 1
        )
        .repeat(20);
        std::fs::write(src_dir.join(format!("module_{}.rs", i)), content)?;
    }

    Ok(())
}

fn collect(root: &Path, extractor: &TextExtractor) -> Vec<Document> {
    FileWalker::new(root)
        .walk()
        .filter_map(|path| {
            let name = path.to_string_lossy().to_string();
            extractor.extract(&path, &name).ok()
        })
        .flatten()
        .collect()
}

fn benchmark_walk_and_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("walk_and_extract");
    let extractor = TextExtractor::new(10 * 1_048_576);

    for file_count in [10, 50, 100].iter() {
        let dir = TempDir::new().unwrap();
        create_test_files(dir.path(), *file_count).unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_files", file_count)),
            file_count,
            |b, _| b.iter(|| collect(black_box(dir.path()), &extractor)),
        );
    }

    group.finish();
}

fn benchmark_chunking(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunking");
    let extractor = TextExtractor::new(10 * 1_048_576);

    for (size, overlap) in [(1000, 0), (500, 100), (200, 50)] {
        let dir = TempDir::new().unwrap();
        create_test_files(dir.path(), 50).unwrap();
        let documents = collect(dir.path(), &extractor);
        let chunker = TextChunker::new(size, overlap).unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_{}", size, overlap)),
            &documents,
            |b, docs| b.iter(|| chunker.chunk_documents(black_box(docs))),
        );
    }

    group.finish();
}

fn benchmark_build(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("build_local_store");

    for file_count in [10, 50].iter() {
        let data = TempDir::new().unwrap();
        create_test_files(&data.path().join("data").join("bench"), *file_count).unwrap();

        let mut config = Config::default();
        config.data_path = data.path().to_path_buf();
        config.vector_db.backend = StoreBackend::Local;
        let builder = IndexBuilder::new(config, Arc::new(ZeroEmbedder)).unwrap();
        let target = RepoTarget::Name("bench".to_string());

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_files", file_count)),
            file_count,
            |b, _| b.iter(|| rt.block_on(builder.build(black_box(&target))).unwrap()),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_walk_and_extract,
    benchmark_chunking,
    benchmark_build
);
criterion_main!(benches);
