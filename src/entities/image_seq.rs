//! Background image sequence: directory + ordered file names.
//!
//! The store only keeps metadata. Decoding frames is someone else's job.
//! `scan_image_dir` is the helper scanners use to build the file list before
//! handing it to `CurveStore::set_image_files`.

use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSequenceState {
    #[serde(default)]
    directory: Option<PathBuf>,
    #[serde(default)]
    files: Vec<String>,
}

impl ImageSequenceState {
    pub fn new(directory: impl Into<PathBuf>, files: Vec<String>) -> Self {
        Self { directory: Some(directory.into()), files }
    }

    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Full path of the image for a 1-based frame number.
    pub fn path_for_frame(&self, frame: i32) -> Option<PathBuf> {
        let dir = self.directory.as_ref()?;
        let idx = usize::try_from(frame.checked_sub(1)?).ok()?;
        self.files.get(idx).map(|f| dir.join(f))
    }

    /// Returns true if anything changed.
    pub fn set(&mut self, directory: PathBuf, files: Vec<String>) -> bool {
        let next = Self { directory: Some(directory), files };
        if *self == next {
            return false;
        }
        *self = next;
        true
    }

    pub fn clear(&mut self) -> bool {
        if self.directory.is_none() && self.files.is_empty() {
            return false;
        }
        *self = Self::default();
        true
    }
}

/// List image files in `dir` whose extension is in `extensions`.
///
/// Matching is case-insensitive (TGA vs tga). Names are ordered by prefix,
/// then by trailing frame number, so `shot.9.exr` sorts before `shot.10.exr`.
pub fn scan_image_dir(dir: &Path, extensions: &[String]) -> StoreResult<Vec<String>> {
    let scan_err = |message: String| StoreError::ImageScan { directory: dir.to_path_buf(), message };

    if !dir.is_dir() {
        return Err(scan_err("not a directory".into()));
    }

    // Normalize path separators for cross-platform glob compatibility
    let base = glob::Pattern::escape(&dir.to_string_lossy()).replace('\\', "/");
    let pattern = format!("{}/*", base.trim_end_matches('/'));
    let options = glob::MatchOptions {
        case_sensitive: false,
        ..Default::default()
    };

    let mut names = Vec::new();
    for entry in glob::glob_with(&pattern, options).map_err(|e| scan_err(e.to_string()))? {
        let path = entry.map_err(|e| scan_err(e.to_string()))?;
        if !path.is_file() {
            continue;
        }
        let ext_ok = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| extensions.iter().any(|want| want.eq_ignore_ascii_case(e)))
            .unwrap_or(false);
        if !ext_ok {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            names.push(name.to_string());
        }
    }

    names.sort_by(|a, b| sequence_key(a).cmp(&sequence_key(b)));
    info!("Scanned {}: {} images", dir.display(), names.len());
    Ok(names)
}

/// Sort key: (prefix, frame number, full name).
///
/// Example: "seq.0012.exr" -> ("seq.", Some(12), "seq.0012.exr")
fn sequence_key(name: &str) -> (&str, Option<u64>, &str) {
    let stem = name.rsplit_once('.').map(|(s, _)| s).unwrap_or(name);
    let digits = stem.chars().rev().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return (stem, None, name);
    }
    let split = stem.len() - digits;
    (&stem[..split], stem[split..].parse().ok(), name)
}
