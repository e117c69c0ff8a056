use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::reducer::RankedEntry;
use crate::PartitionKey;

/// Totals for one pipeline run, saved next to the artifacts on request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub documents: usize,
    pub skipped_documents: usize,
    pub tokens: usize,
    pub distinct_words: usize,
    pub partitions: usize,
    pub mappers: usize,
    pub reducers: usize,
    pub created_at: String,
}

pub struct OutputPaths {
    pub root: PathBuf,
}

impl OutputPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    pub fn partition(&self, key: PartitionKey) -> PathBuf {
        self.root.join(format!("{}.txt", key.letter()))
    }
}

/// Where reducers send their ranked partitions.
pub trait ArtifactSink: Sync {
    fn write_partition(&self, key: PartitionKey, entries: &[RankedEntry]) -> io::Result<()>;
}

/// Writes `<root>/<letter>.txt`, one line per entry.
pub struct FsSink {
    paths: OutputPaths,
}

impl FsSink {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { paths: OutputPaths::new(root) }
    }
}

impl ArtifactSink for FsSink {
    fn write_partition(&self, key: PartitionKey, entries: &[RankedEntry]) -> io::Result<()> {
        create_dir_all(&self.paths.root)?;
        let mut out = BufWriter::new(File::create(self.paths.partition(key))?);
        write_entries(&mut out, entries)?;
        out.flush()
    }
}

/// Renders entries as `word:[1 2 3]` lines.
pub fn write_entries<W: Write>(out: &mut W, entries: &[RankedEntry]) -> io::Result<()> {
    for entry in entries {
        write!(out, "{}:[", entry.word)?;
        for (i, doc_id) in entry.doc_ids.iter().enumerate() {
            if i > 0 {
                out.write_all(b" ")?;
            }
            write!(out, "{doc_id}")?;
        }
        out.write_all(b"]\n")?;
    }
    Ok(())
}

pub fn save_summary<P: AsRef<Path>>(path: P, summary: &RunSummary) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        create_dir_all(dir)?;
    }
    let mut f = File::create(path)?;
    let json = serde_json::to_string_pretty(summary)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_summary<P: AsRef<Path>>(path: P) -> Result<RunSummary> {
    let mut f = File::open(path)?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let summary: RunSummary = serde_json::from_str(&buf)?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn entry(word: &str, ids: &[u32]) -> RankedEntry {
        RankedEntry { word: word.to_string(), doc_ids: ids.iter().copied().collect::<BTreeSet<_>>() }
    }

    #[test]
    fn renders_lines() {
        let mut buf = Vec::new();
        write_entries(&mut buf, &[entry("dog", &[2, 1]), entry("dot", &[3])]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "dog:[1 2]\ndot:[3]\n");
    }

    #[test]
    fn empty_partition_renders_nothing() {
        let mut buf = Vec::new();
        write_entries(&mut buf, &[]).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn partition_file_is_named_by_letter() {
        let paths = OutputPaths::new("/tmp/out");
        let z = PartitionKey::from_letter('z').unwrap();
        assert_eq!(paths.partition(z), PathBuf::from("/tmp/out/z.txt"));
    }
}
