use std::fs;
use std::io;
use std::iter;
use std::path::{Path, PathBuf};

use crate::error::ManifestError;
use crate::{DocId, Document};

/// The list of input documents, numbered from 1 in listing order.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    documents: Vec<Document>,
}

impl Manifest {
    /// Reads a manifest file: a positive count line followed by that many paths.
    /// Paths missing from a short listing are left empty and fail to open like
    /// any other unreadable document.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ManifestError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let mut lines = text.lines();
        let count_line = lines.next().ok_or(ManifestError::MissingCount)?.trim();
        let count: i64 = count_line
            .parse()
            .map_err(|_| ManifestError::InvalidCount(count_line.to_string()))?;
        if count <= 0 {
            return Err(ManifestError::NonPositiveCount(count));
        }
        let expected = count as usize;

        let documents: Vec<Document> = lines
            .chain(iter::repeat(""))
            .take(expected)
            .zip(1..)
            .map(|(line, id): (&str, DocId)| Document {
                id,
                path: PathBuf::from(line.trim_end_matches('\r')),
            })
            .collect();
        if documents.iter().any(|doc| doc.path.as_os_str().is_empty()) {
            tracing::warn!(expected, "manifest lists fewer paths than declared");
        }
        Ok(Self { documents })
    }

    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let documents = paths
            .into_iter()
            .zip(1..)
            .map(|(path, id)| Document { id, path: path.into() })
            .collect();
        Self { documents }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Where mappers read document contents from.
pub trait DocumentSource: Sync {
    /// Reads the whole document. Fails if it does not exist or cannot be read.
    fn read(&self, doc: &Document) -> io::Result<Vec<u8>>;
}

/// Reads documents from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSource;

impl DocumentSource for FsSource {
    fn read(&self, doc: &Document) -> io::Result<Vec<u8>> {
        fs::read(&doc.path)
    }
}
