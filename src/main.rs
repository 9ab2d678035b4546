use anyhow::{Context, Result};
use clap::Parser;
use repo_index::{Config, IndexBuilder, IssuesSource, RepoTarget, StoreBackend};
use std::path::PathBuf;

/// Build the semantic index of one repository
#[derive(Parser)]
#[command(name = "repo-index", version, about, long_about = None)]
struct Cli {
    /// Repository name or numeric id under <data_path>/data/
    target: String,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "REPO_INDEX_CONFIG")]
    config: Option<PathBuf>,

    /// Vector store backend (overrides config)
    #[arg(long, value_enum)]
    backend: Option<StoreBackend>,

    /// Index only these files from issues/ (repeatable)
    #[arg(long = "issue", value_name = "FILE")]
    issues: Vec<String>,

    /// Rebuild the index from the listed issue files only
    #[arg(long, requires = "issues")]
    issues_only: bool,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,lance=warn,lancedb=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = Config::new(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(backend) = cli.backend {
        config.vector_db.backend = backend;
    }

    let target: RepoTarget = cli.target.parse().context("Invalid repository target")?;
    let builder = IndexBuilder::from_config(config).context("Failed to initialize index builder")?;

    let report = if cli.issues_only {
        builder.rebuild_issues_index(&target, &cli.issues).await
    } else if !cli.issues.is_empty() {
        builder
            .build_with_issues(&target, &IssuesSource::Explicit(cli.issues.clone()))
            .await
    } else {
        builder.build(&target).await
    }
    .with_context(|| format!("Failed to build index for {}", target))?;

    tracing::info!(
        "{} documents, {} chunks, {} files skipped",
        report.documents,
        report.chunks_created,
        report.skipped_files
    );
    println!("done");
    Ok(())
}
