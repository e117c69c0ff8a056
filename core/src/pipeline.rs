use std::num::NonZeroUsize;
use std::panic;
use std::path::PathBuf;
use std::thread;

use crate::distributor::Distributor;
use crate::error::{PipelineError, Result};
use crate::gate::PhaseGate;
use crate::index::{FrozenIndex, PartitionedIndex};
use crate::manifest::{DocumentSource, FsSource, Manifest};
use crate::mapper::{Mapper, MapperStats};
use crate::persist::{ArtifactSink, FsSink};
use crate::reducer::{Reducer, ReducerStats};
use crate::PartitionKey;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub mappers: NonZeroUsize,
    pub reducers: NonZeroUsize,
    pub manifest: PathBuf,
    pub output_dir: PathBuf,
}

impl PipelineConfig {
    pub fn new(
        mappers: usize,
        reducers: usize,
        manifest: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let mappers = NonZeroUsize::new(mappers)
            .ok_or_else(|| PipelineError::Configuration("mapper count must be positive".into()))?;
        let reducers = NonZeroUsize::new(reducers)
            .ok_or_else(|| PipelineError::Configuration("reducer count must be positive".into()))?;
        Ok(Self { mappers, reducers, manifest: manifest.into(), output_dir: output_dir.into() })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineReport {
    pub documents: usize,
    pub mapped: MapperStats,
    pub reduced: ReducerStats,
    pub distinct_words: usize,
}

/// Loads the manifest and runs the pipeline against the local filesystem.
pub fn run(config: &PipelineConfig) -> Result<PipelineReport> {
    let manifest = Manifest::load(&config.manifest)?;
    let sink = FsSink::new(&config.output_dir);
    run_with(&manifest, config.mappers, config.reducers, &FsSource, &sink)
}

/// Runs both worker pools over `manifest`.
///
/// Mappers and reducers are spawned together; reducers block on the phase gate
/// until the last mapper has merged its final document and frozen the index.
/// Output failures do not stop other partitions: the first one is returned
/// once every worker has joined.
pub fn run_with(
    manifest: &Manifest,
    mappers: NonZeroUsize,
    reducers: NonZeroUsize,
    source: &dyn DocumentSource,
    sink: &dyn ArtifactSink,
) -> Result<PipelineReport> {
    if manifest.is_empty() {
        return Err(PipelineError::EmptyManifest);
    }
    tracing::info!(
        documents = manifest.len(),
        mappers = mappers.get(),
        reducers = reducers.get(),
        "starting pipeline"
    );

    let index = PartitionedIndex::new();
    let gate: PhaseGate<FrozenIndex> = PhaseGate::new(mappers);
    let documents = Distributor::new(manifest.documents());
    let partitions = Distributor::new(&PartitionKey::ALL);

    let (map_results, reduce_results) = thread::scope(|s| {
        let map_handles: Vec<_> = (0..mappers.get())
            .map(|worker| {
                let (index, gate, documents) = (&index, &gate, &documents);
                s.spawn(move || {
                    let _arrival = gate.arrival(|| freeze(index));
                    Mapper { worker, documents, source, index }.run()
                })
            })
            .collect();
        let reduce_handles: Vec<_> = (0..reducers.get())
            .map(|worker| {
                let (gate, partitions) = (&gate, &partitions);
                s.spawn(move || Reducer { worker, partitions, gate, sink }.run())
            })
            .collect();

        let map_results: Vec<_> = map_handles.into_iter().map(join).collect();
        let reduce_results: Vec<_> = reduce_handles.into_iter().map(join).collect();
        (map_results, reduce_results)
    });

    let mut mapped = MapperStats::default();
    for result in map_results {
        mapped = mapped.combine(result?);
    }
    let mut reduced = ReducerStats::default();
    let mut failures = Vec::new();
    for outcome in reduce_results {
        reduced = reduced.combine(outcome.stats);
        failures.extend(outcome.failures);
    }
    if let Some(first) = failures.into_iter().next() {
        return Err(first);
    }

    let report = PipelineReport {
        documents: manifest.len(),
        mapped,
        reduced,
        distinct_words: gate.wait().map_or(0, |index| index.distinct_words()),
    };
    tracing::info!(
        indexed = report.mapped.documents,
        skipped = report.mapped.skipped,
        words = report.distinct_words,
        partitions = report.reduced.partitions,
        "pipeline complete"
    );
    Ok(report)
}

fn freeze(index: &PartitionedIndex) -> FrozenIndex {
    let frozen = index.freeze();
    tracing::info!(pairs = frozen.pair_count(), "map phase complete");
    frozen
}

fn join<T>(handle: thread::ScopedJoinHandle<'_, T>) -> T {
    handle.join().unwrap_or_else(|payload| panic::resume_unwind(payload))
}
