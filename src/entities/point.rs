//! Tracked point: one 2D sample of a curve at a frame.

use serde::{Deserialize, Serialize};

/// How a point came to exist on the curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointStatus {
    #[default]
    Normal,
    Interpolated,
    Keyframe,
    Endframe,
}

/// Single tracked sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub frame: i32,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub status: PointStatus,
}

impl Point {
    pub fn new(frame: i32, x: f64, y: f64) -> Self {
        Self { frame, x, y, status: PointStatus::Normal }
    }

    pub fn with_status(mut self, status: PointStatus) -> Self {
        self.status = status;
        self
    }

    pub fn pos(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Bit-exact equality. Unlike `==`, a NaN coordinate equals itself.
    pub fn identical(&self, other: &Point) -> bool {
        self.frame == other.frame
            && self.status == other.status
            && self.x.to_bits() == other.x.to_bits()
            && self.y.to_bits() == other.y.to_bits()
    }
}

/// Bit-exact comparison of two point lists, see [`Point::identical`].
pub fn same_points(a: &[Point], b: &[Point]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(p, q)| p.identical(q))
}

/// Partial point edit. `None` fields are left untouched.
///
/// A coordinate-only update keeps the point's frame and status:
/// ```
/// use trackstore::entities::{Point, PointStatus, PointUpdate};
/// let mut p = Point::new(3, 1.0, 2.0).with_status(PointStatus::Keyframe);
/// PointUpdate::position(5.0, 6.0).apply(&mut p);
/// assert_eq!(p.status, PointStatus::Keyframe);
/// assert_eq!(p.frame, 3);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointUpdate {
    pub frame: Option<i32>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub status: Option<PointStatus>,
}

impl PointUpdate {
    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Default::default() }
    }

    pub fn frame(frame: i32) -> Self {
        Self { frame: Some(frame), ..Default::default() }
    }

    pub fn status(status: PointStatus) -> Self {
        Self { status: Some(status), ..Default::default() }
    }

    pub fn with_status(mut self, status: PointStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.frame.is_none() && self.x.is_none() && self.y.is_none() && self.status.is_none()
    }

    pub fn apply(&self, point: &mut Point) {
        if let Some(frame) = self.frame {
            point.frame = frame;
        }
        if let Some(x) = self.x {
            point.x = x;
        }
        if let Some(y) = self.y {
            point.y = y;
        }
        if let Some(status) = self.status {
            point.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_preserves_unspecified_fields() {
        let mut p = Point::new(10, 1.0, 2.0).with_status(PointStatus::Endframe);
        PointUpdate::position(3.0, 4.0).apply(&mut p);
        assert_eq!(p, Point::new(10, 3.0, 4.0).with_status(PointStatus::Endframe));

        PointUpdate::status(PointStatus::Interpolated).apply(&mut p);
        assert_eq!(p.pos(), (3.0, 4.0));
        assert_eq!(p.status, PointStatus::Interpolated);
    }

    #[test]
    fn test_identical_treats_nan_as_equal() {
        let p = Point::new(1, f64::NAN, 0.0);
        assert_ne!(p, p);
        assert!(p.identical(&p));
        assert!(!p.identical(&p.with_status(PointStatus::Keyframe)));
        assert!(!Point::new(1, 0.0, 0.0).identical(&Point::new(1, -0.0, 0.0)));
        assert!(same_points(&[p, Point::new(2, 1.0, 1.0)], &[p, Point::new(2, 1.0, 1.0)]));
        assert!(!same_points(&[p], &[]));
    }

    #[test]
    fn test_empty_update() {
        assert!(PointUpdate::default().is_empty());
        assert!(!PointUpdate::frame(2).is_empty());
    }

    #[test]
    fn test_status_serde_names() {
        let json = serde_json::to_string(&Point::new(1, 0.5, 0.25).with_status(PointStatus::Keyframe))
            .unwrap();
        assert!(json.contains("\"keyframe\""));
        // status is optional on input
        let p: Point = serde_json::from_str(r#"{"frame":4,"x":1.0,"y":2.0}"#).unwrap();
        assert_eq!(p.status, PointStatus::Normal);
    }
}
