//! Work queue between the batch driver and its worker threads.
//!
//! One std::sync::mpsc channel carries screenshots to the workers, which
//! share the receiver behind a mutex; a second channel carries results back.

use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;

/// A screenshot waiting to be processed.
#[derive(Debug, Clone)]
pub struct WorkItem {
    /// Position in the input list, used to restore order
    pub index: usize,
    pub image_path: PathBuf,
    pub queued_at: DateTime<Local>,
}

impl WorkItem {
    pub fn new(index: usize, image_path: PathBuf) -> Self {
        Self {
            index,
            image_path,
            queued_at: Local::now(),
        }
    }
}

/// Receiver end shared by all workers.
pub type SharedReceiver = Mutex<Receiver<WorkItem>>;

/// Creates the work queue.
///
/// Returns (sender, receiver). The channel is unbounded; all items are
/// queued up front and the sender is dropped so workers stop once drained.
pub fn create_work_queue() -> (Sender<WorkItem>, SharedReceiver) {
    let (sender, receiver) = channel();
    (sender, Mutex::new(receiver))
}

/// Takes the next item, or None once the queue is closed and empty.
pub fn next_item(receiver: &SharedReceiver) -> Option<WorkItem> {
    let guard = match receiver.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    guard.recv().ok()
}
