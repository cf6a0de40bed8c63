//! Expansion of command-line inputs into candidate file paths.
//!
//! Each input is a file, a directory (walked recursively) or a glob pattern.
//! No filtering by extension happens here: every regular file is a candidate
//! and the eligibility filter decides by content.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Candidate paths plus the inputs that matched nothing.
#[derive(Debug, Clone, Default)]
pub struct Discovered {
    /// Sorted, de-duplicated candidate paths
    pub files: Vec<PathBuf>,

    /// Inputs that resolved to no files
    pub unmatched: Vec<String>,
}

/// Resolves inputs into candidate files.
#[derive(Debug, Clone, Default)]
pub struct FileDiscovery {
    follow_links: bool,
}

impl FileDiscovery {
    /// Create a discovery instance that follows symlinks while walking.
    pub fn new() -> Self {
        Self { follow_links: true }
    }

    /// Resolve every input.
    pub fn resolve<S: AsRef<str>>(&self, inputs: &[S]) -> Discovered {
        let mut files = BTreeSet::new();
        let mut unmatched = Vec::new();

        for input in inputs {
            let input = input.as_ref();
            let found = self.resolve_one(input);
            if found.is_empty() {
                tracing::warn!("No files matched {:?}", input);
                unmatched.push(input.to_string());
            }
            files.extend(found);
        }

        Discovered {
            files: files.into_iter().collect(),
            unmatched,
        }
    }

    fn resolve_one(&self, input: &str) -> Vec<PathBuf> {
        let path = Path::new(input);
        if path.is_file() {
            return vec![path.to_path_buf()];
        }
        if path.is_dir() {
            return self.walk(path);
        }
        if is_pattern(input) {
            return self.expand_glob(input);
        }
        Vec::new()
    }

    fn walk(&self, dir: &Path) -> Vec<PathBuf> {
        WalkDir::new(dir)
            .follow_links(self.follow_links)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect()
    }

    fn expand_glob(&self, pattern: &str) -> Vec<PathBuf> {
        match glob::glob(pattern) {
            Ok(paths) => paths
                .filter_map(|entry| match entry {
                    Ok(path) => Some(path),
                    Err(e) => {
                        tracing::warn!("Cannot read {:?}: {}", e.path(), e.error());
                        None
                    }
                })
                .flat_map(|path| {
                    if path.is_dir() {
                        self.walk(&path)
                    } else if path.is_file() {
                        vec![path]
                    } else {
                        Vec::new()
                    }
                })
                .collect(),
            Err(e) => {
                tracing::warn!("Invalid pattern {:?}: {}", pattern, e);
                Vec::new()
            }
        }
    }
}

fn is_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}
