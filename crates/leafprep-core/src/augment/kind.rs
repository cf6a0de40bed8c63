//! Augmentation kinds and the derivative suffix registry.
//!
//! Every kind owns exactly one filename suffix. The registry is derived from
//! the kind table and checked at compile time, so adding a kind without a
//! suffix (or reusing a suffix) fails the build.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::types::{class_label_for, file_stem};

/// Extension used for every written derivative.
pub const DERIVATIVE_EXTENSION: &str = "JPG";

/// One of the six fixed augmentation operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AugmentationKind {
    Rotated,
    Blurred,
    Contrasted,
    Illuminated,
    Scaled,
    Projected,
}

impl AugmentationKind {
    /// All kinds, in output order. Index `i` holds the kind whose discriminant is `i`.
    pub const ALL: [AugmentationKind; 6] = [
        AugmentationKind::Rotated,
        AugmentationKind::Blurred,
        AugmentationKind::Contrasted,
        AugmentationKind::Illuminated,
        AugmentationKind::Scaled,
        AugmentationKind::Projected,
    ];

    /// Filename suffix marking a derivative of this kind.
    ///
    /// `Blurred` keeps the historical `_blured` spelling so datasets produced
    /// by earlier runs are still recognized.
    pub const fn suffix(self) -> &'static str {
        match self {
            AugmentationKind::Rotated => "_rotated",
            AugmentationKind::Blurred => "_blured",
            AugmentationKind::Contrasted => "_contrasted",
            AugmentationKind::Illuminated => "_illuminated",
            AugmentationKind::Scaled => "_scaled",
            AugmentationKind::Projected => "_projected",
        }
    }

    /// Human-readable name ("rotated", "blurred", ...).
    pub const fn name(self) -> &'static str {
        match self {
            AugmentationKind::Rotated => "rotated",
            AugmentationKind::Blurred => "blurred",
            AugmentationKind::Contrasted => "contrasted",
            AugmentationKind::Illuminated => "illuminated",
            AugmentationKind::Scaled => "scaled",
            AugmentationKind::Projected => "projected",
        }
    }

    /// Destination of this kind's derivative for `source`.
    ///
    /// `stem(source) + suffix + ".JPG"`, placed next to the source, or in
    /// [`destination_dir`] when an `output_dir` is given.
    pub fn output_path(self, source: &Path, output_dir: Option<&Path>) -> PathBuf {
        let file_name = format!(
            "{}{}.{}",
            file_stem(source),
            self.suffix(),
            DERIVATIVE_EXTENSION
        );
        match output_dir {
            Some(dir) => destination_dir(source, dir).join(file_name),
            None => source.with_file_name(file_name),
        }
    }
}

/// Directory under `output_dir` receiving the derivatives of `source`.
///
/// One subdirectory per class label, so same-named sources from different
/// classes never share a destination.
pub fn destination_dir(source: &Path, output_dir: &Path) -> PathBuf {
    match class_label_for(source) {
        Some(label) => output_dir.join(label),
        None => output_dir.to_path_buf(),
    }
}

impl fmt::Display for AugmentationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Process-wide registry of derivative suffixes, one per kind.
pub const SUFFIXES: [&str; AugmentationKind::ALL.len()] = suffix_table();

const fn suffix_table() -> [&'static str; AugmentationKind::ALL.len()] {
    let mut table = [""; AugmentationKind::ALL.len()];
    let mut i = 0;
    while i < table.len() {
        table[i] = AugmentationKind::ALL[i].suffix();
        i += 1;
    }
    table
}

const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

const fn registry_is_consistent() -> bool {
    let mut i = 0;
    while i < AugmentationKind::ALL.len() {
        if AugmentationKind::ALL[i] as usize != i {
            return false;
        }
        let suffix = SUFFIXES[i];
        if suffix.len() < 2 || suffix.as_bytes()[0] != b'_' {
            return false;
        }
        let mut j = i + 1;
        while j < SUFFIXES.len() {
            if str_eq(suffix, SUFFIXES[j]) {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

const _: () = assert!(
    registry_is_consistent(),
    "augmentation kinds and suffixes are out of sync"
);

/// The registry suffix that a path's stem ends with, if any.
pub fn derived_suffix(path: &Path) -> Option<&'static str> {
    let stem = file_stem(path);
    SUFFIXES.iter().copied().find(|suffix| stem.ends_with(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_matches_kinds() {
        let suffixes: HashSet<_> = SUFFIXES.iter().collect();
        assert_eq!(suffixes.len(), AugmentationKind::ALL.len());
        for kind in AugmentationKind::ALL {
            assert!(SUFFIXES.contains(&kind.suffix()));
        }
    }

    #[test]
    fn test_output_path_next_to_source() {
        let path = AugmentationKind::Rotated.output_path(Path::new("data/apple/leaf.JPG"), None);
        assert_eq!(path, PathBuf::from("data/apple/leaf_rotated.JPG"));
    }

    #[test]
    fn test_output_path_in_destination() {
        let path = AugmentationKind::Blurred
            .output_path(Path::new("data/apple/leaf.jpeg"), Some(Path::new("out")));
        assert_eq!(path, PathBuf::from("out/apple/leaf_blured.JPG"));

        let bare =
            AugmentationKind::Blurred.output_path(Path::new("leaf.JPG"), Some(Path::new("out")));
        assert_eq!(bare, PathBuf::from("out/leaf_blured.JPG"));
    }

    #[test]
    fn test_output_paths_differ_across_classes() {
        let out = Some(Path::new("out"));
        let apple = AugmentationKind::Scaled.output_path(Path::new("data/apple/leaf.JPG"), out);
        let grape = AugmentationKind::Scaled.output_path(Path::new("data/grape/leaf.JPG"), out);
        assert_ne!(apple, grape);
    }

    #[test]
    fn test_derived_suffix_for_every_kind() {
        for kind in AugmentationKind::ALL {
            let derived = kind.output_path(Path::new("leaf.JPG"), None);
            assert_eq!(derived_suffix(&derived), Some(kind.suffix()));
        }
    }

    #[test]
    fn test_derived_suffix_ignores_sources() {
        assert_eq!(derived_suffix(Path::new("leaf.JPG")), None);
        assert_eq!(derived_suffix(Path::new("rotated_leaf.JPG")), None);
        // Suffix matching is case-sensitive, like the names we write.
        assert_eq!(derived_suffix(Path::new("leaf_ROTATED.JPG")), None);
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&AugmentationKind::Illuminated).unwrap();
        assert_eq!(json, "\"illuminated\"");
    }
}
