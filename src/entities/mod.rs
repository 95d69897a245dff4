//! Entities module - leaf data components owned by `CurveStore`
//!
//! None of these know about notifications or about each other. Cross-entity
//! consistency (selection vs. curve length, active vs. existing curves, frame
//! range vs. data) is enforced by the store.

pub mod active;
pub mod curves;
pub mod frame_cursor;
pub mod image_seq;
pub mod point;
pub mod selection;

pub use active::ActiveCurveTracker;
pub use curves::CurveCollection;
pub use frame_cursor::FrameCursor;
pub use image_seq::{ImageSequenceState, scan_image_dir};
pub use point::{Point, PointStatus, PointUpdate, same_points};
pub use selection::SelectionIndex;
