//! Full-state capture for undo/redo callers and inspection dumps.
//!
//! The store keeps no history. Commands that need to revert call
//! `CurveStore::snapshot()` before mutating and `CurveStore::restore()` later;
//! restore runs inside one batch so observers see one event per category that
//! actually differs.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::entities::{ImageSequenceState, Point};

fn first_frame() -> i32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub curves: IndexMap<String, Vec<Point>>,
    #[serde(default)]
    pub selections: BTreeMap<String, BTreeSet<usize>>,
    #[serde(default)]
    pub active_curve: Option<String>,
    #[serde(default = "first_frame")]
    pub current_frame: i32,
    #[serde(default)]
    pub images: ImageSequenceState,
}

impl Default for StoreSnapshot {
    fn default() -> Self {
        Self {
            curves: IndexMap::new(),
            selections: BTreeMap::new(),
            active_curve: None,
            current_frame: first_frame(),
            images: ImageSequenceState::default(),
        }
    }
}

impl StoreSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn point_count(&self) -> usize {
        self.curves.values().map(|v| v.len()).sum()
    }
}
