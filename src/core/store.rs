//! CurveStore: single authoritative state container for tracking data.
//!
//! Owns curves, per-curve selection, the active curve, the frame cursor and
//! the background image sequence. Every mutation:
//! 1. marks the affected categories dirty (capturing a baseline first),
//! 2. applies the change to the leaf component(s),
//! 3. fixes dependent state in the same call (selection shift on point
//!    removal, active reset on delete, frame range refresh),
//! 4. flushes if it was not inside an outer batch.
//!
//! Live data is always current. Batching defers only notifications: at the
//! outermost batch exit each dirty category is compared with its baseline and
//! emits at most one event, none if the net change is nil.
//!
//! Constructed once and passed to collaborators. There is no global instance.

use std::collections::BTreeSet;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::rc::Rc;

use log::{debug, info, trace, warn};

use super::mailbox::{Mailbox, StoreCommand, StoreSender};
use super::notifier::{Baseline, BatchState, ChangeNotifier, SubscriptionId};
use super::snapshot::StoreSnapshot;
use super::store_events::{ChangeFilter, ChangeKind, StoreEvent};
use crate::config::StoreConfig;
use crate::entities::{
    ActiveCurveTracker, CurveCollection, FrameCursor, ImageSequenceState, Point, PointStatus,
    PointUpdate, SelectionIndex, same_points,
};
use crate::error::{StoreError, StoreResult};

/// Outcome of `CurveStore::drain_mailbox`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrainReport {
    pub applied: usize,
    pub errors: Vec<StoreError>,
}

/// Reactive state store for tracking curves.
///
/// Confined to the thread that created it: the type is neither `Send` nor
/// `Sync`, so handing it to another thread does not compile. Off-thread
/// producers use [`CurveStore::sender`] instead.
///
/// ```compile_fail
/// use trackstore::{CurveStore, StoreConfig};
/// let mut store = CurveStore::new(StoreConfig::default());
/// std::thread::spawn(move || {
///     store.set_current_frame(5);
/// });
/// ```
pub struct CurveStore {
    config: StoreConfig,
    curves: CurveCollection,
    selection: SelectionIndex,
    active: ActiveCurveTracker,
    frame: FrameCursor,
    images: ImageSequenceState,
    notifier: ChangeNotifier,
    mailbox: Mailbox,
    _owner_thread: PhantomData<Rc<()>>,
}

impl Default for CurveStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl std::fmt::Debug for CurveStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurveStore")
            .field("curves", &self.curves.names())
            .field("active", &self.active.get())
            .field("frame", &self.frame)
            .field("images", &self.images.len())
            .field("notifier", &self.notifier)
            .finish()
    }
}

impl CurveStore {
    pub fn new(config: StoreConfig) -> Self {
        info!(
            "CurveStore::new() duplicate_frames={:?}, min_total_frames={}",
            config.duplicate_frames, config.min_total_frames
        );
        Self {
            curves: CurveCollection::new(config.duplicate_frames),
            selection: SelectionIndex::new(),
            active: ActiveCurveTracker::new(),
            frame: FrameCursor::new(config.min_total_frames),
            images: ImageSequenceState::default(),
            notifier: ChangeNotifier::new(),
            mailbox: Mailbox::new(),
            config,
            _owner_thread: PhantomData,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // ========== Queries ==========

    /// Copy of the curve's points.
    pub fn curve(&self, name: &str) -> Option<Vec<Point>> {
        self.curves.get(name).map(|pts| pts.to_vec())
    }

    pub fn has_curve(&self, name: &str) -> bool {
        self.curves.contains(name)
    }

    pub fn curve_len(&self, name: &str) -> Option<usize> {
        self.curves.get(name).map(|pts| pts.len())
    }

    pub fn curve_count(&self) -> usize {
        self.curves.len()
    }

    pub fn all_curve_names(&self) -> Vec<String> {
        self.curves.names()
    }

    pub fn point(&self, name: &str, index: usize) -> StoreResult<Point> {
        self.curves.point(name, index)
    }

    pub fn point_index_at_frame(&self, name: &str, frame: i32) -> StoreResult<Option<usize>> {
        self.curves.index_at_frame(name, frame)
    }

    /// Copy of the selection. `None` if the curve does not exist.
    pub fn selection(&self, name: &str) -> Option<BTreeSet<usize>> {
        if !self.curves.contains(name) {
            return None;
        }
        Some(self.selection.get(name).cloned().unwrap_or_default())
    }

    pub fn active_curve(&self) -> Option<String> {
        self.active.get().map(str::to_string)
    }

    /// Points of the active curve, if one is set.
    pub fn active_curve_data(&self) -> Option<Vec<Point>> {
        self.active.get().and_then(|name| self.curve(name))
    }

    pub fn current_frame(&self) -> i32 {
        self.frame.current()
    }

    pub fn total_frames(&self) -> i32 {
        self.frame.total()
    }

    pub fn image_files(&self) -> Vec<String> {
        self.images.files().to_vec()
    }

    pub fn image_directory(&self) -> Option<PathBuf> {
        self.images.directory().map(|p| p.to_path_buf())
    }

    /// Background image for the current frame, if any.
    pub fn current_image_path(&self) -> Option<PathBuf> {
        self.images.path_for_frame(self.frame.current())
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            curves: self
                .curves
                .iter()
                .map(|(name, pts)| (name.clone(), pts.clone()))
                .collect(),
            selections: self
                .curves
                .names()
                .into_iter()
                .filter_map(|name| {
                    let sel = self.selection.get(&name)?.clone();
                    Some((name, sel))
                })
                .collect(),
            active_curve: self.active_curve(),
            current_frame: self.frame.current(),
            images: self.images.clone(),
        }
    }

    // ========== Observers ==========

    pub fn subscribe<F>(&mut self, filter: ChangeFilter, callback: F) -> SubscriptionId
    where
        F: Fn(&StoreEvent) + 'static,
    {
        self.notifier.subscribe(filter, callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// Events flushed since the last poll, for main-loop processing.
    pub fn poll_events(&mut self) -> Vec<StoreEvent> {
        self.notifier.poll()
    }

    // ========== Batching ==========

    pub fn enter_batch(&mut self) {
        self.notifier.enter();
        if self.notifier.depth() == 1 {
            trace!("batch open");
        }
    }

    /// # Panics
    /// When called without a matching `enter_batch`.
    pub fn exit_batch(&mut self) {
        if self.notifier.exit() {
            trace!("batch closed, flushing");
            self.flush();
        }
    }

    /// RAII batch: enters now, exits (and flushes if outermost) on drop.
    pub fn batch(&mut self) -> BatchGuard<'_> {
        self.enter_batch();
        BatchGuard { store: self }
    }

    pub fn batch_depth(&self) -> usize {
        self.notifier.depth()
    }

    pub fn is_batching(&self) -> bool {
        self.notifier.state() != BatchState::Idle
    }

    // ========== Curves ==========

    /// Replace (or create) a curve. Selected indices past the new end are dropped.
    pub fn store_curve(&mut self, name: &str, points: Vec<Point>) -> StoreResult<()> {
        self.mutate(|s| -> StoreResult<()> {
            s.mark_curve(name);
            s.mark_selection(name);
            let created = s.curves.store(name, points)?;
            let len = s.curves.curve_len(name)?;
            s.selection.ensure(name);
            s.selection.truncate(name, len);
            if created {
                info!("Curve created: {} ({} points)", name, len);
            } else {
                debug!("Curve replaced: {} ({} points)", name, len);
            }
            s.refresh_frame_range();
            Ok(())
        })
    }

    /// Append a point. Returns its index.
    pub fn add_point(&mut self, name: &str, point: Point) -> StoreResult<usize> {
        let len_before = self.require_curve(name)?;
        self.mutate(|s| -> StoreResult<usize> {
            s.mark_curve(name);
            let index = s.curves.add_point(name, point)?;
            if index == len_before {
                s.extend_frame_range(point.frame);
            } else {
                // Replaced in place: the old point may have been the max frame
                s.refresh_frame_range();
            }
            Ok(index)
        })
    }

    /// Remove a point, shifting selection so it keeps pointing at the same points.
    pub fn remove_point(&mut self, name: &str, index: usize) -> StoreResult<Point> {
        self.curves.point(name, index)?;
        self.mutate(|s| -> StoreResult<Point> {
            s.mark_curve(name);
            s.mark_selection(name);
            let removed = s.curves.remove_point(name, index)?;
            s.selection.on_point_removed(name, index);
            s.refresh_frame_range();
            Ok(removed)
        })
    }

    /// Partial update; unspecified fields are kept. Returns the new point.
    pub fn update_point(
        &mut self,
        name: &str,
        index: usize,
        update: PointUpdate,
    ) -> StoreResult<Point> {
        self.curves.point(name, index)?;
        self.mutate(|s| -> StoreResult<Point> {
            s.mark_curve(name);
            let point = s.curves.update_point(name, index, update)?;
            if update.frame.is_some() {
                s.refresh_frame_range();
            }
            Ok(point)
        })
    }

    pub fn set_point_status(
        &mut self,
        name: &str,
        index: usize,
        status: PointStatus,
    ) -> StoreResult<()> {
        self.update_point(name, index, PointUpdate::status(status)).map(|_| ())
    }

    /// Delete a curve with its selection. Resets the active curve if it was this one.
    pub fn delete_curve(&mut self, name: &str) -> StoreResult<()> {
        self.require_curve(name)?;
        self.mutate(|s| -> StoreResult<()> {
            s.mark_curve(name);
            s.mark_selection(name);
            s.mark_active();
            s.curves.remove(name)?;
            s.selection.remove_curve(name);
            if s.active.clear_if(name) {
                debug!("Active curve {} deleted, active reset to none", name);
            }
            s.refresh_frame_range();
            info!("Curve deleted: {}", name);
            Ok(())
        })
    }

    // ========== Selection ==========

    /// Replace the selection. Out-of-range indices are dropped; returns how many.
    pub fn set_selection<I>(&mut self, name: &str, indices: I) -> StoreResult<usize>
    where
        I: IntoIterator<Item = usize>,
    {
        let len = self.require_curve(name)?;
        Ok(self.mutate(|s| {
            s.mark_selection(name);
            s.selection.set(name, indices, len)
        }))
    }

    /// Add to the selection. Out-of-range indices are dropped; returns how many.
    pub fn add_to_selection<I>(&mut self, name: &str, indices: I) -> StoreResult<usize>
    where
        I: IntoIterator<Item = usize>,
    {
        let len = self.require_curve(name)?;
        Ok(self.mutate(|s| {
            s.mark_selection(name);
            s.selection.add(name, indices, len)
        }))
    }

    pub fn remove_from_selection<I>(&mut self, name: &str, indices: I) -> StoreResult<()>
    where
        I: IntoIterator<Item = usize>,
    {
        self.require_curve(name)?;
        self.mutate(|s| {
            s.mark_selection(name);
            s.selection.remove(name, indices);
        });
        Ok(())
    }

    pub fn select_all(&mut self, name: &str) -> StoreResult<()> {
        let len = self.require_curve(name)?;
        self.mutate(|s| {
            s.mark_selection(name);
            s.selection.select_all(name, len);
        });
        Ok(())
    }

    /// Select `[start, end]` inclusive. Reversed bounds are swapped, both are
    /// clamped to the curve.
    pub fn select_range(&mut self, name: &str, start: usize, end: usize) -> StoreResult<()> {
        let len = self.require_curve(name)?;
        self.mutate(|s| {
            s.mark_selection(name);
            s.selection.select_range(name, start, end, len);
        });
        Ok(())
    }

    pub fn clear_selection(&mut self, name: &str) -> StoreResult<()> {
        self.require_curve(name)?;
        self.mutate(|s| {
            s.mark_selection(name);
            s.selection.clear(name);
        });
        Ok(())
    }

    // ========== Active curve ==========

    /// Set or clear the active curve. Unknown names are refused and leave the
    /// current value untouched.
    pub fn set_active_curve(&mut self, name: Option<&str>) -> StoreResult<()> {
        if let Some(n) = name {
            if !self.curves.contains(n) {
                warn!("set_active_curve: unknown curve {}", n);
                return Err(StoreError::curve_not_found(n));
            }
        }
        self.mutate(|s| {
            s.mark_active();
            s.active.set(name.map(str::to_string));
        });
        Ok(())
    }

    // ========== Frame ==========

    /// Clamped into `[1, total_frames]`. Returns the applied frame.
    pub fn set_current_frame(&mut self, frame: i32) -> i32 {
        self.mutate(|s| {
            s.mark_frame();
            s.frame.set_current(frame)
        })
    }

    /// Move by `delta` frames, clamped. Returns the applied frame.
    pub fn step_frame(&mut self, delta: i32) -> i32 {
        self.mutate(|s| {
            s.mark_frame();
            s.frame.step(delta)
        })
    }

    pub fn go_to_first_frame(&mut self) -> i32 {
        self.set_current_frame(1)
    }

    pub fn go_to_last_frame(&mut self) -> i32 {
        self.set_current_frame(self.frame.total())
    }

    // ========== Image sequence ==========

    pub fn set_image_files(&mut self, directory: impl Into<PathBuf>, files: Vec<String>) {
        let directory = directory.into();
        self.mutate(|s| {
            s.mark_images();
            if s.images.set(directory, files) {
                info!(
                    "Image sequence set: {:?} ({} files)",
                    s.images.directory(),
                    s.images.len()
                );
            }
            s.refresh_frame_range();
        });
    }

    pub fn clear_image_files(&mut self) {
        self.mutate(|s| {
            s.mark_images();
            if s.images.clear() {
                info!("Image sequence cleared");
            }
            s.refresh_frame_range();
        });
    }

    // ========== Mailbox ==========

    /// `Send` handle for background workers.
    pub fn sender(&self) -> StoreSender {
        self.mailbox.sender()
    }

    /// Apply queued commands from other threads as one batch.
    pub fn drain_mailbox(&mut self) -> DrainReport {
        let commands = self.mailbox.take_pending();
        if commands.is_empty() {
            return DrainReport::default();
        }
        debug!("drain_mailbox: {} commands", commands.len());
        self.mutate(|s| {
            let mut report = DrainReport::default();
            for cmd in commands {
                let result = match cmd {
                    StoreCommand::StoreCurve { name, points } => s.store_curve(&name, points),
                    StoreCommand::DeleteCurve { name } => s.delete_curve(&name),
                    StoreCommand::SetImageFiles { directory, files } => {
                        s.set_image_files(directory, files);
                        Ok(())
                    }
                    StoreCommand::ClearImageFiles => {
                        s.clear_image_files();
                        Ok(())
                    }
                    StoreCommand::SetCurrentFrame(frame) => {
                        s.set_current_frame(frame);
                        Ok(())
                    }
                };
                match result {
                    Ok(()) => report.applied += 1,
                    Err(e) => {
                        warn!("Mailbox command failed: {}", e);
                        report.errors.push(e);
                    }
                }
            }
            report
        })
    }

    // ========== Snapshot restore ==========

    /// Replace the whole state with `snapshot` inside one batch.
    ///
    /// Curves are validated first, so a snapshot the store would reject leaves
    /// the current state untouched.
    pub fn restore(&mut self, snapshot: &StoreSnapshot) -> StoreResult<()> {
        let mut scratch = CurveCollection::new(self.config.duplicate_frames);
        for (name, points) in &snapshot.curves {
            scratch.store(name, points.clone())?;
        }

        self.mutate(|s| -> StoreResult<()> {
            for name in s.curves.names() {
                s.delete_curve(&name)?;
            }
            for (name, points) in scratch.iter() {
                s.store_curve(name, points.clone())?;
            }
            for (name, sel) in &snapshot.selections {
                if s.curves.contains(name) {
                    s.set_selection(name, sel.iter().copied())?;
                }
            }
            match snapshot.active_curve.as_deref() {
                Some(name) if s.curves.contains(name) => s.set_active_curve(Some(name))?,
                Some(name) => {
                    warn!("restore: active curve {} not in snapshot curves", name);
                    s.set_active_curve(None)?;
                }
                None => s.set_active_curve(None)?,
            }
            match snapshot.images.directory() {
                Some(dir) => s.set_image_files(dir, snapshot.images.files().to_vec()),
                None => s.clear_image_files(),
            }
            s.set_current_frame(snapshot.current_frame);
            Ok(())
        })
    }

    // ========== Internals ==========

    /// Run `f` as an implicit batch of one (or as part of the open batch).
    fn mutate<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.enter_batch();
        let out = f(self);
        self.exit_batch();
        out
    }

    fn require_curve(&self, name: &str) -> StoreResult<usize> {
        self.curves.curve_len(name)
    }

    fn mark_curve(&mut self, name: &str) {
        let curves = &self.curves;
        self.notifier.mark(ChangeKind::Curves(name.to_string()), || {
            Baseline::Curve(curves.get(name).map(|pts| pts.to_vec()))
        });
    }

    fn mark_selection(&mut self, name: &str) {
        let selection = &self.selection;
        self.notifier.mark(ChangeKind::Selection(name.to_string()), || {
            Baseline::Selection(selection.get(name).cloned())
        });
    }

    fn mark_active(&mut self) {
        let active = &self.active;
        self.notifier
            .mark(ChangeKind::ActiveCurve, || Baseline::Active(active.get().map(str::to_string)));
    }

    fn mark_frame(&mut self) {
        let frame = self.frame;
        self.notifier.mark(ChangeKind::Frame, || Baseline::Frame {
            current: frame.current(),
            total: frame.total(),
        });
    }

    fn mark_images(&mut self) {
        let images = &self.images;
        self.notifier.mark(ChangeKind::ImageFiles, || Baseline::Images(images.clone()));
    }

    /// Recompute total frames from all data and re-clamp the cursor.
    fn refresh_frame_range(&mut self) {
        self.mark_frame();
        let total = FrameCursor::derive_total(self.curves.max_frame(), self.images.len());
        self.frame.set_total(total);
    }

    /// A point was appended: the range can only grow.
    fn extend_frame_range(&mut self, frame: i32) {
        if frame > self.frame.total() {
            self.mark_frame();
            self.frame.set_total(frame);
        }
    }

    fn flush(&mut self) {
        let dirty = self.notifier.take_dirty();
        let events: Vec<StoreEvent> = dirty
            .into_iter()
            .filter_map(|(kind, baseline)| self.net_change(kind, baseline))
            .collect();
        if !events.is_empty() {
            debug!("flush: {} events", events.len());
        }
        self.notifier.emit(events);
    }

    fn net_change(&self, kind: ChangeKind, baseline: Baseline) -> Option<StoreEvent> {
        match (kind, baseline) {
            (ChangeKind::Curves(name), Baseline::Curve(before)) => {
                let changed = match (before.as_deref(), self.curves.get(&name)) {
                    (Some(before), Some(now)) => !same_points(before, now),
                    (before, now) => before.is_some() != now.is_some(),
                };
                changed.then_some(StoreEvent::CurvesChanged { name })
            }
            (ChangeKind::Selection(name), Baseline::Selection(before)) => {
                // Missing and empty are the same to observers
                let before = before.unwrap_or_default();
                let now = self.selection.get(&name).cloned().unwrap_or_default();
                (before != now).then_some(StoreEvent::SelectionChanged { name })
            }
            (ChangeKind::ActiveCurve, Baseline::Active(before)) => {
                let now = self.active_curve();
                (before != now).then_some(StoreEvent::ActiveCurveChanged { active: now })
            }
            (ChangeKind::Frame, Baseline::Frame { current, total }) => {
                let (now_current, now_total) = (self.frame.current(), self.frame.total());
                (current != now_current || total != now_total).then_some(
                    StoreEvent::FrameChanged { current: now_current, total: now_total },
                )
            }
            (ChangeKind::ImageFiles, Baseline::Images(before)) => {
                (before != self.images).then(|| StoreEvent::ImageFilesChanged {
                    directory: self.image_directory(),
                    count: self.images.len(),
                })
            }
            (kind, baseline) => {
                warn!("flush: baseline {:?} does not match {:?}", baseline, kind);
                None
            }
        }
    }
}

/// Open batch scope. Derefs to the store; closing happens on drop.
pub struct BatchGuard<'a> {
    store: &'a mut CurveStore,
}

impl Deref for BatchGuard<'_> {
    type Target = CurveStore;

    fn deref(&self) -> &CurveStore {
        self.store
    }
}

impl DerefMut for BatchGuard<'_> {
    fn deref_mut(&mut self) -> &mut CurveStore {
        self.store
    }
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        self.store.exit_batch();
    }
}
