use crate::distributor::Distributor;
use crate::error::Result;
use crate::index::{PartialIndex, PartitionedIndex};
use crate::manifest::DocumentSource;
use crate::tokenizer::tokenize;
use crate::Document;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MapperStats {
    pub documents: usize,
    pub skipped: usize,
    pub tokens: usize,
}

impl MapperStats {
    pub fn combine(self, other: MapperStats) -> MapperStats {
        MapperStats {
            documents: self.documents + other.documents,
            skipped: self.skipped + other.skipped,
            tokens: self.tokens + other.tokens,
        }
    }
}

/// One map-phase worker.
pub struct Mapper<'a> {
    pub worker: usize,
    pub documents: &'a Distributor<'a, Document>,
    pub source: &'a dyn DocumentSource,
    pub index: &'a PartitionedIndex,
}

impl Mapper<'_> {
    /// Claims documents until none remain, merging each one into the shared
    /// index with a single lock acquisition. Unreadable documents are skipped.
    pub fn run(&self) -> Result<MapperStats> {
        let mut stats = MapperStats::default();
        while let Some(doc) = self.documents.claim_next() {
            let text = match self.source.read(doc) {
                Ok(text) => text,
                Err(err) => {
                    tracing::warn!(worker = self.worker, doc_id = doc.id, path = %doc.path.display(), error = %err, "skipping unreadable document");
                    stats.skipped += 1;
                    continue;
                }
            };

            let mut partial = PartialIndex::new();
            for token in tokenize(&text) {
                partial.record(token, doc.id);
                stats.tokens += 1;
            }
            let words = partial.word_count();
            let added = self.index.merge(partial)?;
            stats.documents += 1;
            tracing::debug!(worker = self.worker, doc_id = doc.id, words, added, "merged document");
        }
        Ok(stats)
    }
}
