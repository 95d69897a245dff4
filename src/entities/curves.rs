//! Named curve storage with point-level CRUD.
//!
//! Pure data container: no selection, no notifications. `CurveStore` wraps it
//! and keeps selection and active curve consistent with every mutation here.
//!
//! Curve names keep insertion order (IndexMap), so name listings are stable
//! across runs. Deleting uses `shift_remove` to preserve that order.

use indexmap::IndexMap;
use log::{debug, warn};

use super::point::{Point, PointUpdate};
use crate::config::DuplicateFramePolicy;
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone, Default)]
pub struct CurveCollection {
    curves: IndexMap<String, Vec<Point>>,
    policy: DuplicateFramePolicy,
}

impl CurveCollection {
    pub fn new(policy: DuplicateFramePolicy) -> Self {
        Self { curves: IndexMap::new(), policy }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.curves.contains_key(name)
    }

    /// Number of curves.
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.curves.keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<&[Point]> {
        self.curves.get(name).map(|v| v.as_slice())
    }

    pub fn curve_len(&self, name: &str) -> StoreResult<usize> {
        self.curves
            .get(name)
            .map(|v| v.len())
            .ok_or_else(|| StoreError::curve_not_found(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<Point>)> {
        self.curves.iter()
    }

    /// Full replace. Creates the curve if absent. Returns true when created.
    pub fn store(&mut self, name: &str, points: Vec<Point>) -> StoreResult<bool> {
        if name.is_empty() {
            return Err(StoreError::EmptyCurveName);
        }
        let points = self.dedup_frames(name, points)?;
        let created = self.curves.insert(name.to_string(), points).is_none();
        Ok(created)
    }

    /// Append a point. Returns the index it landed at.
    ///
    /// Under `Replace` a point at an existing frame overwrites that point in
    /// place and its index is returned instead.
    pub fn add_point(&mut self, name: &str, point: Point) -> StoreResult<usize> {
        let policy = self.policy;
        let points = self.curve_mut(name)?;
        if let Some(existing) = points.iter().position(|p| p.frame == point.frame) {
            return match policy {
                DuplicateFramePolicy::Reject => {
                    Err(StoreError::DuplicateFrame { name: name.to_string(), frame: point.frame })
                }
                DuplicateFramePolicy::Replace => {
                    points[existing] = point;
                    Ok(existing)
                }
            };
        }
        points.push(point);
        Ok(points.len() - 1)
    }

    pub fn remove_point(&mut self, name: &str, index: usize) -> StoreResult<Point> {
        let points = self.curve_mut(name)?;
        check_index(name, index, points.len())?;
        Ok(points.remove(index))
    }

    /// Apply a partial update. Returns the updated point.
    ///
    /// Moving a point onto a frame another point already occupies is always
    /// rejected: an update never deletes a neighbour.
    pub fn update_point(
        &mut self,
        name: &str,
        index: usize,
        update: PointUpdate,
    ) -> StoreResult<Point> {
        let points = self.curve_mut(name)?;
        check_index(name, index, points.len())?;
        if let Some(frame) = update.frame {
            let taken = points
                .iter()
                .enumerate()
                .any(|(i, p)| i != index && p.frame == frame);
            if taken {
                return Err(StoreError::DuplicateFrame { name: name.to_string(), frame });
            }
        }
        let point = &mut points[index];
        update.apply(point);
        Ok(*point)
    }

    pub fn remove(&mut self, name: &str) -> StoreResult<Vec<Point>> {
        self.curves
            .shift_remove(name)
            .ok_or_else(|| StoreError::curve_not_found(name))
    }

    pub fn point(&self, name: &str, index: usize) -> StoreResult<Point> {
        let points = self.curves.get(name).ok_or_else(|| StoreError::curve_not_found(name))?;
        check_index(name, index, points.len())?;
        Ok(points[index])
    }

    pub fn index_at_frame(&self, name: &str, frame: i32) -> StoreResult<Option<usize>> {
        let points = self.curves.get(name).ok_or_else(|| StoreError::curve_not_found(name))?;
        Ok(points.iter().position(|p| p.frame == frame))
    }

    /// Highest frame across all curves, if any curve has points.
    pub fn max_frame(&self) -> Option<i32> {
        self.curves.values().flat_map(|pts| pts.iter().map(|p| p.frame)).max()
    }

    fn curve_mut(&mut self, name: &str) -> StoreResult<&mut Vec<Point>> {
        self.curves.get_mut(name).ok_or_else(|| StoreError::curve_not_found(name))
    }

    fn dedup_frames(&self, name: &str, points: Vec<Point>) -> StoreResult<Vec<Point>> {
        let mut out: Vec<Point> = Vec::with_capacity(points.len());
        let mut seen: std::collections::HashMap<i32, usize> =
            std::collections::HashMap::with_capacity(points.len());
        for p in points {
            match seen.get(&p.frame) {
                Some(&idx) => match self.policy {
                    DuplicateFramePolicy::Reject => {
                        warn!("Rejecting curve {}: duplicate frame {}", name, p.frame);
                        return Err(StoreError::DuplicateFrame {
                            name: name.to_string(),
                            frame: p.frame,
                        });
                    }
                    DuplicateFramePolicy::Replace => {
                        debug!("Curve {}: frame {} replaced by later point", name, p.frame);
                        out[idx] = p;
                    }
                },
                None => {
                    seen.insert(p.frame, out.len());
                    out.push(p);
                }
            }
        }
        Ok(out)
    }
}

fn check_index(name: &str, index: usize, len: usize) -> StoreResult<()> {
    if index >= len {
        return Err(StoreError::PointIndexOutOfRange { name: name.to_string(), index, len });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::PointStatus;

    fn pts(n: i32) -> Vec<Point> {
        (1..=n).map(|f| Point::new(f, f as f64, f as f64 * 2.0)).collect()
    }

    #[test]
    fn test_store_and_get() {
        let mut c = CurveCollection::new(DuplicateFramePolicy::Reject);
        assert!(c.store("Track1", pts(3)).unwrap());
        assert!(!c.store("Track1", pts(4)).unwrap());
        assert_eq!(c.get("Track1").unwrap().len(), 4);
        assert_eq!(c.store("", vec![]), Err(StoreError::EmptyCurveName));
    }

    #[test]
    fn test_name_order_survives_delete() {
        let mut c = CurveCollection::new(DuplicateFramePolicy::Reject);
        for name in ["b", "a", "c"] {
            c.store(name, vec![]).unwrap();
        }
        c.remove("a").unwrap();
        assert_eq!(c.names(), vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_add_point_duplicate_reject() {
        let mut c = CurveCollection::new(DuplicateFramePolicy::Reject);
        c.store("t", pts(2)).unwrap();
        assert_eq!(c.add_point("t", Point::new(3, 0.0, 0.0)), Ok(2));
        assert_eq!(
            c.add_point("t", Point::new(1, 9.0, 9.0)),
            Err(StoreError::DuplicateFrame { name: "t".into(), frame: 1 })
        );
        assert_eq!(c.curve_len("t"), Ok(3));
    }

    #[test]
    fn test_add_point_duplicate_replace() {
        let mut c = CurveCollection::new(DuplicateFramePolicy::Replace);
        c.store("t", pts(2)).unwrap();
        assert_eq!(c.add_point("t", Point::new(1, 9.0, 9.0)), Ok(0));
        assert_eq!(c.point("t", 0).unwrap().pos(), (9.0, 9.0));
        assert_eq!(c.curve_len("t"), Ok(2));
    }

    #[test]
    fn test_store_duplicates_last_write_wins() {
        let mut c = CurveCollection::new(DuplicateFramePolicy::Replace);
        let input = vec![Point::new(1, 0.0, 0.0), Point::new(2, 0.0, 0.0), Point::new(1, 5.0, 5.0)];
        c.store("t", input).unwrap();
        let got = c.get("t").unwrap();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0], Point::new(1, 5.0, 5.0));

        let mut strict = CurveCollection::new(DuplicateFramePolicy::Reject);
        let dup = vec![Point::new(1, 0.0, 0.0), Point::new(1, 1.0, 1.0)];
        assert!(strict.store("t", dup).is_err());
        assert!(!strict.contains("t"));
    }

    #[test]
    fn test_missing_curve_and_bad_index() {
        let mut c = CurveCollection::new(DuplicateFramePolicy::Reject);
        assert!(c.remove_point("nope", 0).unwrap_err().is_not_found());
        c.store("t", pts(2)).unwrap();
        assert_eq!(
            c.remove_point("t", 2),
            Err(StoreError::PointIndexOutOfRange { name: "t".into(), index: 2, len: 2 })
        );
        assert!(c.update_point("t", 5, PointUpdate::position(0.0, 0.0)).is_err());
    }

    #[test]
    fn test_update_point_frame_collision() {
        let mut c = CurveCollection::new(DuplicateFramePolicy::Replace);
        c.store("t", pts(3)).unwrap();
        assert!(c.update_point("t", 0, PointUpdate::frame(2)).is_err());
        // Same frame on the same point is fine
        let p = c
            .update_point("t", 0, PointUpdate::frame(1).with_status(PointStatus::Keyframe))
            .unwrap();
        assert_eq!(p.status, PointStatus::Keyframe);
    }

    #[test]
    fn test_max_frame_and_lookup() {
        let mut c = CurveCollection::new(DuplicateFramePolicy::Reject);
        assert_eq!(c.max_frame(), None);
        c.store("a", pts(3)).unwrap();
        c.store("b", vec![Point::new(40, 0.0, 0.0)]).unwrap();
        assert_eq!(c.max_frame(), Some(40));
        assert_eq!(c.index_at_frame("a", 2), Ok(Some(1)));
        assert_eq!(c.index_at_frame("a", 9), Ok(None));
    }
}
