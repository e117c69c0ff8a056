use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::error::{PipelineError, Result};
use crate::{DocId, PartitionKey};

/// Word occurrences collected by one mapper for the file it is processing.
#[derive(Debug, Default)]
pub struct PartialIndex {
    shards: HashMap<PartitionKey, HashMap<String, BTreeSet<DocId>>>,
}

impl PartialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `word` as present in `doc_id`. Words outside `[a-z]+` are ignored.
    pub fn record(&mut self, word: String, doc_id: DocId) {
        if let Some(key) = PartitionKey::of(&word) {
            self.shards
                .entry(key)
                .or_default()
                .entry(word)
                .or_default()
                .insert(doc_id);
        }
    }

    /// Number of distinct words recorded.
    pub fn word_count(&self) -> usize {
        self.shards.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }
}

type Shard = HashSet<(String, DocId)>;

/// The shared, lock-protected index written during the map phase.
///
/// The backing shards are never handed out. Once [`freeze`](Self::freeze) runs,
/// the index only answers merges with [`PipelineError::IndexFrozen`].
pub struct PartitionedIndex {
    shards: Mutex<Option<Vec<Shard>>>,
}

impl Default for PartitionedIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl PartitionedIndex {
    pub fn new() -> Self {
        let shards = (0..PartitionKey::COUNT).map(|_| Shard::new()).collect();
        Self { shards: Mutex::new(Some(shards)) }
    }

    /// Merges a mapper's partial index under a single lock acquisition.
    /// Returns how many (word, doc) pairs were new.
    pub fn merge(&self, partial: PartialIndex) -> Result<usize> {
        let mut guard = self.shards.lock();
        let shards = guard.as_mut().ok_or(PipelineError::IndexFrozen)?;
        let mut added = 0;
        for (key, words) in partial.shards {
            let shard = &mut shards[key.index()];
            for (word, doc_ids) in words {
                for doc_id in doc_ids {
                    if shard.insert((word.clone(), doc_id)) {
                        added += 1;
                    }
                }
            }
        }
        Ok(added)
    }

    /// Takes the shards out of the lock. Later calls yield an empty index.
    pub fn freeze(&self) -> FrozenIndex {
        let shards = self.shards.lock().take().unwrap_or_else(|| {
            (0..PartitionKey::COUNT).map(|_| Shard::new()).collect()
        });
        FrozenIndex { shards }
    }

    pub fn is_frozen(&self) -> bool {
        self.shards.lock().is_none()
    }
}

/// Read-only view of the index handed to reducers after the phase transition.
#[derive(Debug)]
pub struct FrozenIndex {
    shards: Vec<Shard>,
}

impl FrozenIndex {
    pub fn partition(&self, key: PartitionKey) -> &HashSet<(String, DocId)> {
        &self.shards[key.index()]
    }

    /// Total number of unique (word, doc) pairs.
    pub fn pair_count(&self) -> usize {
        self.shards.iter().map(HashSet::len).sum()
    }

    pub fn distinct_words(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| shard.iter().map(|(w, _)| w.as_str()).collect::<HashSet<_>>().len())
            .sum()
    }
}
