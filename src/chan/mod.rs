// src/chan/mod.rs

//! CSP-style channels shared through one cheap-to-clone handle.
//!
//! A [`Chan`] is a reference-counted handle to a single lock-protected
//! channel state. Cloning a handle shares the same mailbox; it never
//! duplicates it. The state is reclaimed when the last handle drops;
//! [`Chan::close`] is purely a protocol transition and has nothing to do
//! with storage lifetime.
//!
//! Two flavors exist:
//!
//! - [`bounded`]: a FIFO buffer of fixed capacity greater than zero. Sends
//!   block while the buffer is full; receives block while it is empty.
//! - [`rendezvous`]: no buffer. At most one value is in flight; a send
//!   deposits it and a receive takes it, one at a time.
//!
//! Closing is one-way and one-shot: after `close`, sends are rejected even
//! when space is available, while values already in the channel remain
//! receivable until drained.
//!
//! # Examples
//!
//! ```
//! use strand::{bounded, rendezvous};
//! use std::thread;
//!
//! let jobs = bounded::<i32>(4);
//! let done = rendezvous::<i32>();
//!
//! let worker_jobs = jobs.clone();
//! let worker_done = done.clone();
//! thread::spawn(move || {
//!   let mut sum = 0;
//!   while let Ok(job) = worker_jobs.recv() {
//!     sum += job;
//!   }
//!   worker_done.send(sum).unwrap();
//! });
//!
//! for i in 1..=4 {
//!   jobs.send(i).unwrap();
//! }
//! jobs.close().unwrap();
//! assert_eq!(done.recv().unwrap(), 10);
//! ```

use crate::error::{CloseError, RecvError, SendError, TryRecvError, TrySendError};
use crate::internal::signal::SelectSignal;

mod core;

use self::core::Shared;
use std::fmt;
use std::sync::Arc;

/// A handle to one channel. All clones observe and mutate the same
/// underlying state.
pub struct Chan<T: Send> {
  shared: Arc<Shared<T>>,
}

impl<T: Send> Clone for Chan<T> {
  fn clone(&self) -> Self {
    Chan {
      shared: Arc::clone(&self.shared),
    }
  }
}

impl<T: Send> fmt::Debug for Chan<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Chan")
      .field("len", &self.shared.len())
      .field("capacity", &self.shared.capacity())
      .field("closed", &self.shared.is_closed())
      .finish()
  }
}

/// Creates a buffered channel with a bounded FIFO of `capacity` values.
///
/// # Panics
///
/// Panics when `capacity` is zero. An invalid capacity is a programmer
/// error caught at construction, not a runtime condition; for a channel
/// without a buffer use [`rendezvous`].
pub fn bounded<T: Send>(capacity: usize) -> Chan<T> {
  if capacity == 0 {
    panic!("bounded channel capacity must be greater than zero");
  }
  Chan {
    shared: Arc::new(Shared::new_buffered(capacity)),
  }
}

/// Creates a rendezvous channel: no buffer, at most one value in flight.
pub fn rendezvous<T: Send>() -> Chan<T> {
  Chan {
    shared: Arc::new(Shared::new_rendezvous()),
  }
}

impl<T: Send> Chan<T> {
  /// Sends a value, blocking the calling thread while the channel is full.
  ///
  /// Returns [`SendError::Closed`] with the value handed back when the
  /// channel is closed, whether it was already closed on entry or was
  /// closed while this call was blocked.
  pub fn send(&self, item: T) -> Result<(), SendError<T>> {
    self.shared.send(item)
  }

  /// Receives a value, blocking the calling thread while the channel is
  /// empty and open.
  ///
  /// A closed channel drains first: values present at close time are still
  /// received, and only then does every subsequent call report
  /// [`RecvError::Closed`].
  pub fn recv(&self) -> Result<T, RecvError> {
    self.shared.recv()
  }

  /// Attempts to send without blocking.
  pub fn try_send(&self, item: T) -> Result<(), TrySendError<T>> {
    self.shared.try_send(item)
  }

  /// Attempts to receive without blocking.
  pub fn try_recv(&self) -> Result<T, TryRecvError> {
    self.shared.try_recv()
  }

  /// Closes the channel. One-shot: the first call succeeds and wakes every
  /// blocked sender, receiver, and parked `select`; a second call returns
  /// [`CloseError`].
  pub fn close(&self) -> Result<(), CloseError> {
    self.shared.close()
  }

  /// A value is available to receive right now. Point-in-time snapshot; the
  /// caller must tolerate staleness.
  pub fn recv_ready(&self) -> bool {
    self.shared.recv_ready()
  }

  /// A value could be sent without blocking right now. Always `false` on a
  /// closed channel. Point-in-time snapshot; the caller must tolerate
  /// staleness.
  pub fn send_ready(&self) -> bool {
    self.shared.send_ready()
  }

  /// Whether the channel has been closed.
  pub fn is_closed(&self) -> bool {
    self.shared.is_closed()
  }

  /// Number of values currently held: buffered queue length, or 1/0 for an
  /// occupied/empty rendezvous slot.
  #[inline]
  pub fn len(&self) -> usize {
    self.shared.len()
  }

  /// Whether the channel currently holds no value.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// The buffer capacity. `None` for a rendezvous channel, which has no
  /// buffer at all rather than a zero-sized one.
  pub fn capacity(&self) -> Option<usize> {
    self.shared.capacity()
  }

  pub(crate) fn register_select(&self, signal: &Arc<SelectSignal>) {
    self.shared.register_select(signal);
  }

  pub(crate) fn unregister_select(&self, signal: &Arc<SelectSignal>) {
    self.shared.unregister_select(signal);
  }
}
