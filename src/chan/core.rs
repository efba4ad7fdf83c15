// src/chan/core.rs

//! The shared, lock-protected state machine backing every [`Chan`] handle.
//!
//! ### Design Principles:
//!
//! 1.  **Central Mutex**: a `parking_lot::Mutex` guards every field of the
//!     channel state. No field is read or written outside the lock.
//! 2.  **Two wait directions**: one condvar is signaled when the channel
//!     becomes more receivable (a value arrived), the other when it becomes
//!     more sendable (space freed up). Close broadcasts on both, so every
//!     pending blocked operation re-evaluates instead of staying stuck.
//! 3.  **Closed set of flavors**: buffered and rendezvous are the only two
//!     kinds a channel can be, so they live in one tagged enum rather than
//!     behind an open trait.
//! 4.  **Select interest list**: a blocked `select` leaves a wake token with
//!     each channel it watches. Any state transition (value in, value out,
//!     close) drains and notifies the list; waiters re-register each round.
//!
//! Waiters are woken outside the lock to reduce contention.
//!
//! [`Chan`]: super::Chan

use crate::error::{CloseError, RecvError, SendError, TryRecvError, TrySendError};
use crate::internal::signal::SelectSignal;
use crate::telemetry;

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;

/// The two channel kinds. Buffered holds a bounded FIFO; rendezvous holds at
/// most one in-flight value.
pub(crate) enum Flavor<T> {
  Buffered { queue: VecDeque<T>, capacity: usize },
  Rendezvous { slot: Option<T> },
}

pub(crate) struct State<T> {
  /// Monotonic: once set, never cleared.
  pub(crate) closed: bool,
  pub(crate) flavor: Flavor<T>,
  /// Wake tokens of `select` calls currently parked on this channel.
  select_waiters: Vec<Arc<SelectSignal>>,
}

impl<T> State<T> {
  /// A value is available to take right now.
  fn recv_ready(&self) -> bool {
    match &self.flavor {
      Flavor::Buffered { queue, .. } => !queue.is_empty(),
      Flavor::Rendezvous { slot } => slot.is_some(),
    }
  }

  /// A value could be inserted right now. Always false once closed: capacity
  /// becoming available after close does not retroactively permit sends.
  fn send_ready(&self) -> bool {
    if self.closed {
      return false;
    }
    match &self.flavor {
      Flavor::Buffered { queue, capacity } => queue.len() < *capacity,
      Flavor::Rendezvous { slot } => slot.is_none(),
    }
  }

  fn take_value(&mut self) -> Option<T> {
    match &mut self.flavor {
      Flavor::Buffered { queue, .. } => queue.pop_front(),
      Flavor::Rendezvous { slot } => slot.take(),
    }
  }

  /// Caller must have checked `send_ready` under the same lock hold.
  fn put_value(&mut self, item: T) {
    match &mut self.flavor {
      Flavor::Buffered { queue, .. } => queue.push_back(item),
      Flavor::Rendezvous { slot } => {
        debug_assert!(slot.is_none());
        *slot = Some(item);
      }
    }
  }

  fn drain_select_waiters(&mut self) -> Vec<Arc<SelectSignal>> {
    std::mem::take(&mut self.select_waiters)
  }
}

/// The shared owner of one channel's state, wrapped in an `Arc` by the
/// public handle.
pub(crate) struct Shared<T> {
  state: Mutex<State<T>>,
  /// Signaled when the channel becomes more receivable.
  recvable: Condvar,
  /// Signaled when the channel becomes more sendable.
  sendable: Condvar,
}

impl<T: Send> Shared<T> {
  /// Creates the state for a buffered channel. The public constructor has
  /// already rejected a zero capacity.
  pub(crate) fn new_buffered(capacity: usize) -> Self {
    debug_assert!(capacity > 0);
    Shared {
      state: Mutex::new(State {
        closed: false,
        flavor: Flavor::Buffered {
          queue: VecDeque::with_capacity(capacity),
          capacity,
        },
        select_waiters: Vec::new(),
      }),
      recvable: Condvar::new(),
      sendable: Condvar::new(),
    }
  }

  /// Creates the state for a rendezvous channel.
  pub(crate) fn new_rendezvous() -> Self {
    Shared {
      state: Mutex::new(State {
        closed: false,
        flavor: Flavor::Rendezvous { slot: None },
        select_waiters: Vec::new(),
      }),
      recvable: Condvar::new(),
      sendable: Condvar::new(),
    }
  }

  /// Blocking send. Waits while the channel is full, re-checking the closed
  /// flag on entry and after every wake; a close observed at any point hands
  /// the value back without inserting it.
  pub(crate) fn send(&self, item: T) -> Result<(), SendError<T>> {
    let mut state = self.state.lock();
    loop {
      if state.closed {
        telemetry::increment_counter("chan::send", "closed_rejected");
        return Err(SendError::Closed(item));
      }
      if state.send_ready() {
        break;
      }
      self.sendable.wait(&mut state);
    }
    state.put_value(item);
    let waiters = state.drain_select_waiters();
    drop(state);
    self.recvable.notify_one();
    wake_selects(waiters);
    Ok(())
  }

  /// Blocking receive. A closed channel still yields values until drained;
  /// only an empty, closed channel reports `Closed`.
  pub(crate) fn recv(&self) -> Result<T, RecvError> {
    let mut state = self.state.lock();
    loop {
      if let Some(item) = state.take_value() {
        let waiters = state.drain_select_waiters();
        drop(state);
        self.sendable.notify_one();
        wake_selects(waiters);
        return Ok(item);
      }
      if state.closed {
        return Err(RecvError::Closed);
      }
      self.recvable.wait(&mut state);
    }
  }

  /// Non-blocking send.
  pub(crate) fn try_send(&self, item: T) -> Result<(), TrySendError<T>> {
    let mut state = self.state.lock();
    if state.closed {
      return Err(TrySendError::Closed(item));
    }
    if !state.send_ready() {
      return Err(TrySendError::Full(item));
    }
    state.put_value(item);
    let waiters = state.drain_select_waiters();
    drop(state);
    self.recvable.notify_one();
    wake_selects(waiters);
    Ok(())
  }

  /// Non-blocking receive. Drains buffered values after close before ever
  /// reporting `Closed`.
  pub(crate) fn try_recv(&self) -> Result<T, TryRecvError> {
    let mut state = self.state.lock();
    match state.take_value() {
      Some(item) => {
        let waiters = state.drain_select_waiters();
        drop(state);
        self.sendable.notify_one();
        wake_selects(waiters);
        Ok(item)
      }
      None if state.closed => Err(TryRecvError::Closed),
      None => Err(TryRecvError::Empty),
    }
  }

  /// One-shot close. The second close reports `CloseError`; the first sets
  /// the flag and broadcasts on both conditions plus every registered select
  /// token, so no blocked operation is left waiting on stale state.
  pub(crate) fn close(&self) -> Result<(), CloseError> {
    let mut state = self.state.lock();
    if state.closed {
      return Err(CloseError);
    }
    state.closed = true;
    let waiters = state.drain_select_waiters();
    drop(state);
    self.recvable.notify_all();
    self.sendable.notify_all();
    wake_selects(waiters);
    telemetry::log_event(None, "chan::close", "CloseBroadcast", None);
    Ok(())
  }

  /// Point-in-time snapshot; may be stale by the time the caller acts on it.
  pub(crate) fn recv_ready(&self) -> bool {
    self.state.lock().recv_ready()
  }

  /// Point-in-time snapshot; may be stale by the time the caller acts on it.
  pub(crate) fn send_ready(&self) -> bool {
    self.state.lock().send_ready()
  }

  pub(crate) fn is_closed(&self) -> bool {
    self.state.lock().closed
  }

  pub(crate) fn len(&self) -> usize {
    match &self.state.lock().flavor {
      Flavor::Buffered { queue, .. } => queue.len(),
      Flavor::Rendezvous { slot } => usize::from(slot.is_some()),
    }
  }

  pub(crate) fn capacity(&self) -> Option<usize> {
    match &self.state.lock().flavor {
      Flavor::Buffered { capacity, .. } => Some(*capacity),
      Flavor::Rendezvous { .. } => None,
    }
  }

  /// Leaves a wake token to be notified on the next state transition.
  pub(crate) fn register_select(&self, signal: &Arc<SelectSignal>) {
    self.state.lock().select_waiters.push(Arc::clone(signal));
  }

  /// Removes every registration of `signal` left on this channel. Tokens
  /// already drained by a notification are gone and need no removal.
  pub(crate) fn unregister_select(&self, signal: &Arc<SelectSignal>) {
    self
      .state
      .lock()
      .select_waiters
      .retain(|waiter| !Arc::ptr_eq(waiter, signal));
  }
}

fn wake_selects(waiters: Vec<Arc<SelectSignal>>) {
  for waiter in waiters {
    waiter.notify();
  }
}
