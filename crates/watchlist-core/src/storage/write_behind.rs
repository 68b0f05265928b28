//! Write-behind snapshot persistence
//!
//! `WriteBehind` wraps any [`SnapshotStorage`] so that `save` returns as soon
//! as the snapshot is queued. A single background thread drains the queue in
//! issuance order, so an older snapshot can never land after a newer one.
//! When several snapshots are queued only the newest is written.
//!
//! Write failures do not reach the caller of `save` (the mutation has already
//! happened); they are logged and kept in a slot that `flush` and
//! `take_error` report.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use super::error::{StorageError, StorageResult};
use super::persistence::{LoadOutcome, SnapshotStorage};
use crate::snapshot::Snapshot;

enum Job {
    Write { seq: u64, snapshot: Snapshot },
    Flush(Sender<()>),
}

/// Queue-and-return wrapper around a storage backend
pub struct WriteBehind<S: SnapshotStorage + Send + Sync + 'static> {
    inner: Arc<S>,
    queue: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
    last_error: Arc<Mutex<Option<StorageError>>>,
    issued: AtomicU64,
}

impl<S: SnapshotStorage + Send + Sync + 'static> WriteBehind<S> {
    /// Start the background writer
    pub fn new(inner: S) -> Self {
        let inner = Arc::new(inner);
        let last_error = Arc::new(Mutex::new(None));
        let (tx, rx) = mpsc::channel();

        let worker = {
            let inner = Arc::clone(&inner);
            let last_error = Arc::clone(&last_error);
            thread::Builder::new()
                .name("snapshot-writer".to_string())
                .spawn(move || run_writer(inner.as_ref(), rx, &last_error))
                .ok()
        };

        // Without a worker thread, saves fall through to the backend directly
        let queue = worker.as_ref().map(|_| tx);

        Self {
            inner,
            queue,
            worker,
            last_error,
            issued: AtomicU64::new(0),
        }
    }

    /// The wrapped backend
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Number of saves issued so far
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    /// Take the most recent background write failure, if any
    pub fn take_error(&self) -> Option<StorageError> {
        self.last_error
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }
}

impl<S: SnapshotStorage + Send + Sync + 'static> SnapshotStorage for WriteBehind<S> {
    fn load(&self) -> LoadOutcome {
        self.inner.load()
    }

    fn save(&self, snapshot: &Snapshot) -> StorageResult<()> {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

        match self.queue {
            Some(ref queue) => queue
                .send(Job::Write {
                    seq,
                    snapshot: snapshot.clone(),
                })
                .map_err(|_| StorageError::WriterClosed),
            None => self.inner.save(snapshot),
        }
    }

    fn flush(&self) -> StorageResult<()> {
        if let Some(ref queue) = self.queue {
            let (ack_tx, ack_rx) = mpsc::channel();
            queue
                .send(Job::Flush(ack_tx))
                .map_err(|_| StorageError::WriterClosed)?;
            ack_rx.recv().map_err(|_| StorageError::WriterClosed)?;
        }

        match self.take_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl<S: SnapshotStorage + Send + Sync + 'static> Drop for WriteBehind<S> {
    fn drop(&mut self) {
        // Closing the queue lets the worker drain what is left and exit
        self.queue.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_writer<S: SnapshotStorage>(
    storage: &S,
    rx: Receiver<Job>,
    last_error: &Mutex<Option<StorageError>>,
) {
    while let Ok(job) = rx.recv() {
        match job {
            Job::Write {
                mut seq,
                mut snapshot,
            } => {
                // Coalesce: skip straight to the newest queued snapshot, but
                // stop at a flush so it is acknowledged after this write
                let mut acks = Vec::new();
                while let Ok(next) = rx.try_recv() {
                    match next {
                        Job::Write {
                            seq: newer,
                            snapshot: newer_snapshot,
                        } => {
                            debug!("Skipping superseded snapshot #{}", seq);
                            seq = newer;
                            snapshot = newer_snapshot;
                        }
                        Job::Flush(ack) => {
                            acks.push(ack);
                            break;
                        }
                    }
                }

                match storage.save(&snapshot) {
                    Ok(()) => debug!("Wrote snapshot #{} ({} items)", seq, snapshot.len()),
                    Err(err) => {
                        warn!("Failed to write snapshot #{}: {}", seq, err);
                        *last_error.lock().unwrap_or_else(|e| e.into_inner()) = Some(err);
                    }
                }

                for ack in acks {
                    let _ = ack.send(());
                }
            }
            Job::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
}
