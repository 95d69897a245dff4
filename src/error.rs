//! Recoverable store errors.
//!
//! Every variant here is expected under normal UI races (a curve deleted
//! between a query and a mutation, an index computed from a stale view).
//! Invariant violations such as an unbalanced batch exit are not represented:
//! they panic at the call site.

use std::path::PathBuf;

/// Failure returned by the store's mutation API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No curve with this name exists.
    CurveNotFound { name: String },
    /// Point index is past the end of the curve.
    PointIndexOutOfRange { name: String, index: usize, len: usize },
    /// Curve already holds a point at this frame.
    DuplicateFrame { name: String, frame: i32 },
    /// Curves must have a non-empty name.
    EmptyCurveName,
    /// Image directory could not be listed.
    ImageScan { directory: PathBuf, message: String },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::CurveNotFound { name } => write!(f, "Curve not found: {}", name),
            StoreError::PointIndexOutOfRange { name, index, len } => write!(
                f,
                "Point index {} out of range for curve {} ({} points)",
                index, name, len
            ),
            StoreError::DuplicateFrame { name, frame } => {
                write!(f, "Curve {} already has a point at frame {}", name, frame)
            }
            StoreError::EmptyCurveName => write!(f, "Curve name is empty"),
            StoreError::ImageScan { directory, message } => {
                write!(f, "Image scan error in {}: {}", directory.display(), message)
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl StoreError {
    /// True for the not-found class (missing curve or point index).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::CurveNotFound { .. } | StoreError::PointIndexOutOfRange { .. }
        )
    }

    pub(crate) fn curve_not_found(name: &str) -> Self {
        StoreError::CurveNotFound { name: name.to_string() }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let e = StoreError::PointIndexOutOfRange { name: "Track1".into(), index: 7, len: 5 };
        assert_eq!(e.to_string(), "Point index 7 out of range for curve Track1 (5 points)");
        assert_eq!(StoreError::curve_not_found("a").to_string(), "Curve not found: a");
    }

    #[test]
    fn test_not_found_class() {
        assert!(StoreError::curve_not_found("x").is_not_found());
        assert!(!StoreError::DuplicateFrame { name: "x".into(), frame: 1 }.is_not_found());
        assert!(!StoreError::EmptyCurveName.is_not_found());
    }
}
