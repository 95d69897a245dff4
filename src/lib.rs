//! TRACKSTORE - reactive state store for 2D tracking curves
//!
//! Re-exports all modules for use by binary targets.

// Core engine (notifier, store, mailbox)
pub mod core;

// App modules
pub mod cli;
pub mod config;
pub mod entities;
pub mod error;
pub mod paths;

// Re-export commonly used types from core
pub use crate::core::store::{BatchGuard, CurveStore, DrainReport};
pub use crate::core::store_events::{ChangeFilter, ChangeKind, StoreEvent};
pub use crate::core::{StoreCommand, StoreSender, StoreSnapshot, SubscriptionId};

// Re-export entities
pub use config::{DuplicateFramePolicy, StoreConfig};
pub use entities::{Point, PointStatus, PointUpdate};
pub use error::{StoreError, StoreResult};
