use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Context;

use crate::foundation::error::{SceneError, SceneResult};

/// Where scene images live. Paths are `/`-separated and relative to the
/// storage root.
pub trait AssetStorage: Send + Sync {
    fn file_exists(&self, path: &str) -> bool;

    /// Fetch the file's bytes.
    fn read(&self, path: &str) -> SceneResult<Vec<u8>>;
}

/// Storage rooted at a directory on disk.
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, path: &str) -> SceneResult<PathBuf> {
        Ok(self.root.join(normalize_rel_path(path)?))
    }
}

impl AssetStorage for FsStorage {
    fn file_exists(&self, path: &str) -> bool {
        self.full_path(path).is_ok_and(|p| p.is_file())
    }

    fn read(&self, path: &str) -> SceneResult<Vec<u8>> {
        let full = self.full_path(path)?;
        let bytes =
            std::fs::read(&full).with_context(|| format!("read asset '{}'", full.display()))?;
        Ok(bytes)
    }
}

/// Storage backed by an in-memory file table. Counts reads.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: HashMap<String, Vec<u8>>,
    reads: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(path.into(), bytes);
    }

    pub fn with_file(mut self, path: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(path, bytes);
        self
    }

    /// Number of successful or failed `read` calls so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }
}

impl AssetStorage for MemoryStorage {
    fn file_exists(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    fn read(&self, path: &str) -> SceneResult<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| SceneError::asset(format!("no such file '{path}'")))
    }
}

/// Normalize a relative asset path: backslashes become `/`, empty and `.`
/// segments are dropped, absolute paths and `..` are rejected.
pub fn normalize_rel_path(source: &str) -> SceneResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(SceneError::validation("asset paths must be relative"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(SceneError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(SceneError::validation("asset path must contain a file name"));
    }
    Ok(out.join("/"))
}
