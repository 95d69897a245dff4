//! Cross-thread mailbox for off-thread producers.
//!
//! The store itself never leaves its owner thread. Background workers (file
//! loaders, image scanners) get a `StoreSender`, push commands through an
//! unbounded channel, and the owner thread applies them with
//! `CurveStore::drain_mailbox()`.

use std::path::PathBuf;

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::debug;

use crate::entities::Point;

/// Mutation requested from another thread.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCommand {
    StoreCurve { name: String, points: Vec<Point> },
    DeleteCurve { name: String },
    SetImageFiles { directory: PathBuf, files: Vec<String> },
    ClearImageFiles,
    SetCurrentFrame(i32),
}

/// Cloneable, `Send` handle for queueing commands to the store.
#[derive(Debug, Clone)]
pub struct StoreSender {
    tx: Sender<StoreCommand>,
}

impl StoreSender {
    /// Queue a command. Returns false if the store is gone.
    pub fn send(&self, cmd: StoreCommand) -> bool {
        match self.tx.send(cmd) {
            Ok(()) => true,
            Err(e) => {
                debug!("StoreSender: store dropped, discarding {:?}", e.0);
                false
            }
        }
    }

    pub fn store_curve(&self, name: impl Into<String>, points: Vec<Point>) -> bool {
        self.send(StoreCommand::StoreCurve { name: name.into(), points })
    }

    pub fn set_image_files(&self, directory: impl Into<PathBuf>, files: Vec<String>) -> bool {
        self.send(StoreCommand::SetImageFiles { directory: directory.into(), files })
    }
}

#[derive(Debug)]
pub(crate) struct Mailbox {
    tx: Sender<StoreCommand>,
    rx: Receiver<StoreCommand>,
}

impl Mailbox {
    pub(crate) fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub(crate) fn sender(&self) -> StoreSender {
        StoreSender { tx: self.tx.clone() }
    }

    pub(crate) fn take_pending(&self) -> Vec<StoreCommand> {
        self.rx.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_is_send_and_fifo() {
        let mailbox = Mailbox::new();
        let sender = mailbox.sender();
        let handle = std::thread::spawn(move || {
            sender.store_curve("Track1", vec![Point::new(1, 0.0, 0.0)]);
            sender.send(StoreCommand::SetCurrentFrame(3));
        });
        handle.join().unwrap();

        let cmds = mailbox.take_pending();
        assert_eq!(cmds.len(), 2);
        assert!(matches!(cmds[0], StoreCommand::StoreCurve { .. }));
        assert_eq!(cmds[1], StoreCommand::SetCurrentFrame(3));
        assert!(mailbox.take_pending().is_empty());
    }

    #[test]
    fn test_send_after_drop_reports_false() {
        let mailbox = Mailbox::new();
        let sender = mailbox.sender();
        drop(mailbox);
        assert!(!sender.send(StoreCommand::ClearImageFiles));
    }
}
