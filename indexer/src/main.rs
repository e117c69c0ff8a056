use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use time::format_description::well_known::Rfc3339;
use tracing_subscriber::{fmt, EnvFilter};
use wordmap_core::persist::{save_summary, RunSummary};
use wordmap_core::{PartitionKey, PipelineConfig, PipelineReport};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build a letter-partitioned inverted index with parallel mappers and reducers", long_about = None)]
struct Cli {
    /// Number of mapper threads
    mappers: usize,
    /// Number of reducer threads
    reducers: usize,
    /// Manifest file: a document count followed by one path per line
    manifest: PathBuf,
    /// Directory receiving the a.txt .. z.txt artifacts
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
    /// Write a JSON run summary to this path
    #[arg(long)]
    summary: Option<PathBuf>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let config = PipelineConfig::new(cli.mappers, cli.reducers, &cli.manifest, &cli.output_dir)?;
    let report = wordmap_core::run(&config)
        .with_context(|| format!("indexing {} failed", cli.manifest.display()))?;

    if let Some(path) = &cli.summary {
        save_summary(path, &summary(&config, &report))
            .with_context(|| format!("writing summary to {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote run summary");
    }
    Ok(())
}

fn summary(config: &PipelineConfig, report: &PipelineReport) -> RunSummary {
    RunSummary {
        documents: report.documents,
        skipped_documents: report.mapped.skipped,
        tokens: report.mapped.tokens,
        distinct_words: report.distinct_words,
        partitions: PartitionKey::COUNT,
        mappers: config.mappers.get(),
        reducers: config.reducers.get(),
        created_at: time::OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;
    use wordmap_core::persist::load_summary;

    #[test]
    fn cli_requires_all_positionals() {
        assert!(Cli::try_parse_from(["indexer", "2", "2"]).is_err());
        assert!(Cli::try_parse_from(["indexer", "two", "2", "m.txt"]).is_err());
        let cli = Cli::try_parse_from(["indexer", "4", "3", "m.txt", "--output-dir", "out"]).unwrap();
        assert_eq!((cli.mappers, cli.reducers), (4, 3));
        assert_eq!(cli.output_dir, PathBuf::from("out"));
        assert!(cli.summary.is_none());
    }

    #[test]
    fn summary_round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let doc = dir.path().join("doc.txt");
        fs::write(&doc, "Cat cat DOG").unwrap();
        let manifest = dir.path().join("manifest.txt");
        fs::write(&manifest, format!("1\n{}\n", doc.display())).unwrap();

        let config = PipelineConfig::new(1, 2, &manifest, dir.path().join("out")).unwrap();
        let report = wordmap_core::run(&config).unwrap();
        let written = summary(&config, &report);
        let path = dir.path().join("meta").join("summary.json");
        save_summary(&path, &written).unwrap();

        let loaded = load_summary(&path).unwrap();
        assert_eq!(loaded, written);
        assert_eq!(loaded.distinct_words, 2);
        assert_eq!(loaded.reducers, 2);
    }
}
