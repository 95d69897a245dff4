//! Store engine: change notification, batching, orchestration, mailbox.
//!
//! Independent of any UI toolkit. Entities under `crate::entities` hold the
//! data; this module keeps them consistent and tells observers what changed.

pub mod mailbox;
pub mod notifier;
pub mod snapshot;
pub mod store;
pub mod store_events;

// Re-exports for convenience
pub use mailbox::{StoreCommand, StoreSender};
pub use notifier::{BatchState, ChangeNotifier, SubscriptionId};
pub use snapshot::StoreSnapshot;
pub use store::{BatchGuard, CurveStore, DrainReport};
pub use store_events::{ChangeFilter, ChangeKind, StoreEvent};
