//! Single-assignment handoff of a document built on another thread.
//!
//! The engine itself never spawns threads. A host that must not block while a file loads builds
//! the [`Document`] wherever it likes and delivers it through a [`DocumentSender`]; the UI thread
//! polls the matching [`DocumentReceiver`].
//!
//! ```rust
//! use editor_engine::{Document, handoff};
//!
//! let (sender, receiver) = handoff::channel();
//! std::thread::spawn(move || sender.deliver(Ok(Document::from_text("loaded"))));
//!
//! let document = receiver.wait().unwrap().unwrap();
//! assert_eq!(document.text(), "loaded");
//! ```

use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError};

use tracing::warn;

use crate::document::Document;
use crate::error::DocumentError;

/// Outcome of a document build.
pub type DocumentResult = Result<Document, DocumentError>;

/// Producer half. Consumed by [`DocumentSender::deliver`], so a value is delivered at most once.
#[derive(Debug)]
pub struct DocumentSender {
    tx: SyncSender<DocumentResult>,
}

/// Consumer half.
#[derive(Debug)]
pub struct DocumentReceiver {
    rx: Receiver<DocumentResult>,
    taken: bool,
}

/// State of a receiver that has no value ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
    /// The sender is alive but has not delivered yet.
    Waiting,
    /// The value was already taken, or the sender was dropped without delivering.
    Closed,
}

/// Create a connected sender and receiver.
pub fn channel() -> (DocumentSender, DocumentReceiver) {
    let (tx, rx) = mpsc::sync_channel(1);
    (DocumentSender { tx }, DocumentReceiver { rx, taken: false })
}

impl DocumentSender {
    /// Deliver the build result. Dropped silently if the receiver is gone.
    pub fn deliver(self, result: DocumentResult) {
        if self.tx.send(result).is_err() {
            warn!("document receiver dropped before delivery");
        }
    }
}

impl DocumentReceiver {
    /// Take the result without blocking.
    pub fn try_take(&mut self) -> Result<DocumentResult, Pending> {
        if self.taken {
            return Err(Pending::Closed);
        }
        match self.rx.try_recv() {
            Ok(result) => {
                self.taken = true;
                Ok(result)
            }
            Err(TryRecvError::Empty) => Err(Pending::Waiting),
            Err(TryRecvError::Disconnected) => Err(Pending::Closed),
        }
    }

    /// Block until the result arrives. `None` if the sender was dropped without delivering.
    pub fn wait(self) -> Option<DocumentResult> {
        if self.taken {
            return None;
        }
        self.rx.recv().ok()
    }
}
