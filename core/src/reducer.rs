use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::distributor::Distributor;
use crate::error::PipelineError;
use crate::gate::PhaseGate;
use crate::index::FrozenIndex;
use crate::persist::ArtifactSink;
use crate::{DocId, PartitionKey};

/// A word and every document containing it, IDs ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    pub word: String,
    pub doc_ids: BTreeSet<DocId>,
}

/// Groups a partition's (word, doc) pairs by word and orders the result by
/// document count descending, then word ascending.
pub fn rank(pairs: &HashSet<(String, DocId)>) -> Vec<RankedEntry> {
    let mut by_word: BTreeMap<&str, BTreeSet<DocId>> = BTreeMap::new();
    for (word, doc_id) in pairs {
        by_word.entry(word.as_str()).or_default().insert(*doc_id);
    }

    let mut entries: Vec<RankedEntry> = by_word
        .into_iter()
        .map(|(word, doc_ids)| RankedEntry { word: word.to_string(), doc_ids })
        .collect();
    // words are unique, so this key is a total order
    entries.sort_by(|a, b| {
        (Reverse(a.doc_ids.len()), &a.word).cmp(&(Reverse(b.doc_ids.len()), &b.word))
    });
    entries
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReducerStats {
    pub partitions: usize,
    pub words: usize,
}

impl ReducerStats {
    pub fn combine(self, other: ReducerStats) -> ReducerStats {
        ReducerStats {
            partitions: self.partitions + other.partitions,
            words: self.words + other.words,
        }
    }
}

#[derive(Debug, Default)]
pub struct ReducerOutcome {
    pub stats: ReducerStats,
    pub failures: Vec<PipelineError>,
}

/// One reduce-phase worker.
pub struct Reducer<'a> {
    pub worker: usize,
    pub partitions: &'a Distributor<'a, PartitionKey>,
    pub gate: &'a PhaseGate<FrozenIndex>,
    pub sink: &'a dyn ArtifactSink,
}

impl Reducer<'_> {
    /// Waits for the map phase to finish, then ranks and writes partitions
    /// until none remain. A failed write is recorded and the worker moves on.
    /// Nothing is written if a mapper panicked.
    pub fn run(&self) -> ReducerOutcome {
        let mut outcome = ReducerOutcome::default();
        let Some(index) = self.gate.wait() else {
            tracing::warn!(worker = self.worker, "map phase did not complete; writing nothing");
            return outcome;
        };

        while let Some(&key) = self.partitions.claim_next() {
            let entries = rank(index.partition(key));
            match self.sink.write_partition(key, &entries) {
                Ok(()) => {
                    outcome.stats.partitions += 1;
                    outcome.stats.words += entries.len();
                    tracing::debug!(worker = self.worker, partition = %key, words = entries.len(), "wrote partition");
                }
                Err(source) => {
                    tracing::warn!(worker = self.worker, partition = %key, error = %source, "failed to write partition");
                    outcome.failures.push(PipelineError::OutputWrite { partition: key, source });
                }
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{PartialIndex, PartitionedIndex};
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::io;
    use std::num::NonZeroUsize;

    fn pairs(items: &[(&str, DocId)]) -> HashSet<(String, DocId)> {
        items.iter().map(|(w, d)| (w.to_string(), *d)).collect()
    }

    #[test]
    fn ranks_by_frequency_then_word() {
        let ranked = rank(&pairs(&[
            ("dog", 1),
            ("dog", 2),
            ("dart", 3),
            ("deer", 2),
            ("deer", 3),
            ("ant", 1),
        ]));
        let words: Vec<&str> = ranked.iter().map(|e| e.word.as_str()).collect();
        assert_eq!(words, vec!["deer", "dog", "ant", "dart"]);
        assert_eq!(ranked[0].doc_ids.iter().copied().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn empty_partition_ranks_empty() {
        assert!(rank(&HashSet::new()).is_empty());
    }

    struct FlakySink {
        fail: PartitionKey,
        written: Mutex<HashMap<PartitionKey, Vec<RankedEntry>>>,
    }

    impl ArtifactSink for FlakySink {
        fn write_partition(&self, key: PartitionKey, entries: &[RankedEntry]) -> io::Result<()> {
            if key == self.fail {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
            }
            self.written.lock().insert(key, entries.to_vec());
            Ok(())
        }
    }

    #[test]
    fn failed_partition_does_not_stop_the_rest() {
        let index = PartitionedIndex::new();
        let mut partial = PartialIndex::new();
        partial.record("bird".into(), 2);
        partial.record("cat".into(), 1);
        index.merge(partial).unwrap();

        let gate = PhaseGate::new(NonZeroUsize::MIN);
        gate.arrive(|| index.freeze());

        let c = PartitionKey::from_letter('c').unwrap();
        let sink = FlakySink { fail: c, written: Mutex::new(HashMap::new()) };
        let partitions = Distributor::new(&PartitionKey::ALL);
        let reducer = Reducer { worker: 0, partitions: &partitions, gate: &gate, sink: &sink };

        let outcome = reducer.run();
        assert_eq!(outcome.stats, ReducerStats { partitions: 25, words: 1 });
        assert_eq!(outcome.failures.len(), 1);
        assert!(matches!(outcome.failures[0], PipelineError::OutputWrite { partition, .. } if partition == c));

        let written = sink.written.lock();
        assert_eq!(written.len(), 25);
        let b = PartitionKey::from_letter('b').unwrap();
        assert_eq!(written[&b][0].word, "bird");
    }
}
