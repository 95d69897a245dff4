//! Change categories and the events delivered to observers.
//!
//! Payloads are minimal on purpose: observers get the curve name (or the new
//! frame) and re-query the store for anything else.

use std::path::PathBuf;

/// Dirty category. Per-curve categories are keyed by curve name, so two
/// curves changing in one batch yield two `CurvesChanged` events.
///
/// Ordering (derived) is the flush order: curve data first, then selection,
/// then active curve, frame and images.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChangeKind {
    Curves(String),
    Selection(String),
    ActiveCurve,
    Frame,
    ImageFiles,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// Points of `name` changed, or the curve was created or deleted.
    CurvesChanged { name: String },
    SelectionChanged { name: String },
    ActiveCurveChanged { active: Option<String> },
    FrameChanged { current: i32, total: i32 },
    ImageFilesChanged { directory: Option<PathBuf>, count: usize },
}

impl StoreEvent {
    pub fn curve_name(&self) -> Option<&str> {
        match self {
            StoreEvent::CurvesChanged { name } | StoreEvent::SelectionChanged { name } => Some(name.as_str()),
            _ => None,
        }
    }
}

/// Which events a subscriber wants.
///
/// `Curves(None)` / `Selection(None)` match every curve; `Some(name)` narrows
/// to one curve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeFilter {
    All,
    Curves(Option<String>),
    Selection(Option<String>),
    ActiveCurve,
    Frame,
    ImageFiles,
}

impl ChangeFilter {
    pub fn curves_of(name: impl Into<String>) -> Self {
        ChangeFilter::Curves(Some(name.into()))
    }

    pub fn selection_of(name: impl Into<String>) -> Self {
        ChangeFilter::Selection(Some(name.into()))
    }

    pub fn matches(&self, event: &StoreEvent) -> bool {
        match (self, event) {
            (ChangeFilter::All, _) => true,
            (ChangeFilter::Curves(want), StoreEvent::CurvesChanged { name })
            | (ChangeFilter::Selection(want), StoreEvent::SelectionChanged { name }) => {
                want.as_deref().is_none_or(|w| w == name.as_str())
            }
            (ChangeFilter::ActiveCurve, StoreEvent::ActiveCurveChanged { .. }) => true,
            (ChangeFilter::Frame, StoreEvent::FrameChanged { .. }) => true,
            (ChangeFilter::ImageFiles, StoreEvent::ImageFilesChanged { .. }) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_matching() {
        let ev = StoreEvent::CurvesChanged { name: "Track1".into() };
        assert!(ChangeFilter::All.matches(&ev));
        assert!(ChangeFilter::Curves(None).matches(&ev));
        assert!(ChangeFilter::curves_of("Track1").matches(&ev));
        assert!(!ChangeFilter::curves_of("Track2").matches(&ev));
        assert!(!ChangeFilter::Selection(None).matches(&ev));
        assert!(!ChangeFilter::Frame.matches(&ev));

        let frame = StoreEvent::FrameChanged { current: 3, total: 10 };
        assert!(ChangeFilter::Frame.matches(&frame));
        assert_eq!(frame.curve_name(), None);
    }

    #[test]
    fn test_kind_order_is_flush_order() {
        let mut kinds = vec![
            ChangeKind::Frame,
            ChangeKind::Selection("a".into()),
            ChangeKind::ImageFiles,
            ChangeKind::Curves("b".into()),
            ChangeKind::ActiveCurve,
        ];
        kinds.sort();
        assert_eq!(kinds[0], ChangeKind::Curves("b".into()));
        assert_eq!(kinds[1], ChangeKind::Selection("a".into()));
        assert_eq!(kinds[4], ChangeKind::ImageFiles);
    }
}
