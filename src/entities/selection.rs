//! Per-curve selected point indices.
//!
//! Indices, not frames. Bounds are passed in by the caller (the curve length
//! at the moment of the call), so this type never looks at curve data.
//!
//! Policies:
//! - `set` / `add`: out-of-range indices are dropped, never clamped.
//! - `select_range`: swapped if reversed, then clamped to `[0, len-1]`.

use std::collections::{BTreeSet, HashMap};

use log::debug;

#[derive(Debug, Clone, Default)]
pub struct SelectionIndex {
    sets: HashMap<String, BTreeSet<usize>>,
}

impl SelectionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty selection for a new curve (no-op if present).
    pub fn ensure(&mut self, name: &str) {
        self.sets.entry(name.to_string()).or_default();
    }

    pub fn remove_curve(&mut self, name: &str) -> Option<BTreeSet<usize>> {
        self.sets.remove(name)
    }

    pub fn contains_curve(&self, name: &str) -> bool {
        self.sets.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&BTreeSet<usize>> {
        self.sets.get(name)
    }

    /// Replace the selection. Returns how many indices were dropped.
    pub fn set<I>(&mut self, name: &str, indices: I, len: usize) -> usize
    where
        I: IntoIterator<Item = usize>,
    {
        let set = self.sets.entry(name.to_string()).or_default();
        set.clear();
        insert_in_bounds(name, set, indices, len)
    }

    /// Add to the selection. Returns how many indices were dropped.
    pub fn add<I>(&mut self, name: &str, indices: I, len: usize) -> usize
    where
        I: IntoIterator<Item = usize>,
    {
        let set = self.sets.entry(name.to_string()).or_default();
        insert_in_bounds(name, set, indices, len)
    }

    pub fn remove<I>(&mut self, name: &str, indices: I)
    where
        I: IntoIterator<Item = usize>,
    {
        if let Some(set) = self.sets.get_mut(name) {
            for i in indices {
                set.remove(&i);
            }
        }
    }

    pub fn select_all(&mut self, name: &str, len: usize) {
        let set = self.sets.entry(name.to_string()).or_default();
        *set = (0..len).collect();
    }

    pub fn select_range(&mut self, name: &str, start: usize, end: usize, len: usize) {
        let set = self.sets.entry(name.to_string()).or_default();
        set.clear();
        if len == 0 {
            return;
        }
        let (lo, hi) = if start > end { (end, start) } else { (start, end) };
        let last = len - 1;
        set.extend(lo.min(last)..=hi.min(last));
    }

    pub fn clear(&mut self, name: &str) {
        if let Some(set) = self.sets.get_mut(name) {
            set.clear();
        }
    }

    /// Point `k` was removed: drop it and shift every higher index down by one.
    pub fn on_point_removed(&mut self, name: &str, k: usize) {
        if let Some(set) = self.sets.get_mut(name) {
            let shifted: BTreeSet<usize> = set
                .iter()
                .filter(|&&i| i != k)
                .map(|&i| if i > k { i - 1 } else { i })
                .collect();
            *set = shifted;
        }
    }

    /// Curve was replaced with `len` points: drop indices that no longer exist.
    pub fn truncate(&mut self, name: &str, len: usize) {
        if let Some(set) = self.sets.get_mut(name) {
            set.retain(|&i| i < len);
        }
    }
}

fn insert_in_bounds<I>(name: &str, set: &mut BTreeSet<usize>, indices: I, len: usize) -> usize
where
    I: IntoIterator<Item = usize>,
{
    let mut dropped = 0;
    for i in indices {
        if i < len {
            set.insert(i);
        } else {
            dropped += 1;
        }
    }
    if dropped > 0 {
        debug!("Selection on {}: dropped {} out-of-range indices (len {})", name, dropped, len);
    }
    dropped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(s: &SelectionIndex, name: &str) -> Vec<usize> {
        s.get(name).map(|v| v.iter().copied().collect()).unwrap_or_default()
    }

    #[test]
    fn test_set_drops_out_of_range() {
        let mut s = SelectionIndex::new();
        assert_eq!(s.set("t", [10], 5), 1);
        assert!(sel(&s, "t").is_empty());
        assert_eq!(s.set("t", [0, 4, 5], 5), 1);
        assert_eq!(sel(&s, "t"), vec![0, 4]);
    }

    #[test]
    fn test_add_and_remove() {
        let mut s = SelectionIndex::new();
        s.set("t", [1], 5);
        s.add("t", [3, 7], 5);
        assert_eq!(sel(&s, "t"), vec![1, 3]);
        s.remove("t", [1, 2]);
        assert_eq!(sel(&s, "t"), vec![3]);
    }

    #[test]
    fn test_select_range_swaps_and_clamps() {
        let mut s = SelectionIndex::new();
        s.select_range("t", 8, 2, 5);
        assert_eq!(sel(&s, "t"), vec![2, 3, 4]);
        s.select_range("t", 1, 1, 5);
        assert_eq!(sel(&s, "t"), vec![1]);
        s.select_range("t", 0, 3, 0);
        assert!(sel(&s, "t").is_empty());
    }

    #[test]
    fn test_select_all_and_clear() {
        let mut s = SelectionIndex::new();
        s.select_all("t", 3);
        assert_eq!(sel(&s, "t"), vec![0, 1, 2]);
        s.clear("t");
        s.clear("t");
        assert!(sel(&s, "t").is_empty());
        assert!(s.contains_curve("t"));
    }

    #[test]
    fn test_point_removed_shifts() {
        let mut s = SelectionIndex::new();
        s.set("t", [1, 2, 3], 5);
        s.on_point_removed("t", 2);
        assert_eq!(sel(&s, "t"), vec![1, 2]);

        s.set("t", [0, 3], 4);
        s.on_point_removed("t", 1);
        assert_eq!(sel(&s, "t"), vec![0, 2]);
    }

    #[test]
    fn test_truncate() {
        let mut s = SelectionIndex::new();
        s.set("t", [0, 2, 4], 5);
        s.truncate("t", 3);
        assert_eq!(sel(&s, "t"), vec![0, 2]);
    }
}
