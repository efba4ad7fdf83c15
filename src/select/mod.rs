// src/select/mod.rs

//! Multi-way `select` over heterogeneous channel operations.
//!
//! A [`Case`] is one candidate operation: receive from a channel, or send a
//! bound value to one. [`try_select`] makes a single pass over the cases;
//! [`select`] blocks until some case commits. Both report the winning case's
//! **original index** in the input slice.
//!
//! ### Fairness
//!
//! Every invocation scans the cases in a freshly shuffled order, so repeated
//! selects over simultaneously ready cases do not systematically favor
//! low-indexed channels. The shuffle draws from a caller-supplied
//! [`rand::Rng`] in the `_with` variants, which makes the scan order
//! deterministic under a seeded generator for testing.
//!
//! ### Blocking without spinning
//!
//! The blocking engine never polls in a loop. When a pass finds nothing
//! ready it registers a wake token with every watched channel, re-checks
//! readiness once (closing the window in which a value could have arrived
//! between the scan and the registration), and parks the thread. Any state
//! transition on any watched channel (value in, value out, close) notifies
//! the token, and the engine rescans with fresh shuffle order.
//!
//! ### Readiness races
//!
//! Readiness checks and commits are separate critical sections, so a case
//! found ready can have its readiness consumed by another thread before the
//! commit. The engine commits through the channel's non-blocking operation:
//! when the race is lost the candidate is skipped for that pass and the scan
//! moves on. A case therefore never wins unless its operation actually
//! completed. [`Case::exec`] remains available for direct use with ordinary
//! blocking fallback semantics.
//!
//! # Examples
//!
//! ```
//! use strand::{rendezvous, select, Case};
//! use std::thread;
//!
//! let ch1 = rendezvous::<i32>();
//! let ch2 = rendezvous::<i32>();
//!
//! let sender = ch2.clone();
//! thread::spawn(move || sender.send(2).unwrap());
//!
//! let mut cases = [Case::recv(&ch1), Case::recv(&ch2)];
//! let won = select(&mut cases);
//! assert_eq!(won, 1);
//! assert_eq!(*cases[1].get().unwrap(), 2);
//! ```

use crate::chan::Chan;
use crate::error::{CaseError, ExecError, RecvError, SendError, TryRecvError, TrySendError};
use crate::internal::signal::SelectSignal;
use crate::telemetry;

use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;
use std::sync::Arc;

/// One candidate operation offered to the select engine.
///
/// A receive case holds a slot for the value it captures; a send case holds
/// the value it will deliver. Cases are reusable: a receive case can win any
/// number of selects (each win overwrites the captured value), while a send
/// case is spent once its value has been delivered and never reports ready
/// again.
pub struct Case<T: Send> {
  chan: Chan<T>,
  kind: CaseKind<T>,
}

enum CaseKind<T> {
  Recv { received: Option<T> },
  Send { outgoing: Option<T> },
}

impl<T: Send> fmt::Debug for Case<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.kind {
      CaseKind::Recv { received } => f
        .debug_struct("Case::Recv")
        .field("captured", &received.is_some())
        .finish(),
      CaseKind::Send { outgoing } => f
        .debug_struct("Case::Send")
        .field("pending", &outgoing.is_some())
        .finish(),
    }
  }
}

impl<T: Send> Case<T> {
  /// A candidate receive from `chan`. Clones the handle; the caller's copy
  /// stays usable.
  pub fn recv(chan: &Chan<T>) -> Self {
    Case {
      chan: chan.clone(),
      kind: CaseKind::Recv { received: None },
    }
  }

  /// A candidate send of `value` into `chan`.
  pub fn send(chan: &Chan<T>, value: T) -> Self {
    Case {
      chan: chan.clone(),
      kind: CaseKind::Send {
        outgoing: Some(value),
      },
    }
  }

  /// Non-blocking readiness snapshot: could this case's operation complete
  /// right now? Stale by the time the caller acts on it; the engine
  /// tolerates that (see the module docs).
  pub fn ready(&self) -> bool {
    match &self.kind {
      CaseKind::Recv { .. } => self.chan.recv_ready(),
      CaseKind::Send { outgoing } => outgoing.is_some() && self.chan.send_ready(),
    }
  }

  /// Executes the bound operation with full blocking semantics: a receive
  /// case blocks until a value arrives (capturing it), a send case blocks
  /// until its value is delivered.
  ///
  /// Returns [`ExecError::Closed`] when the channel is closed; a send case
  /// keeps its value in that event.
  ///
  /// # Panics
  ///
  /// Panics when called on a send case whose value was already delivered.
  pub fn exec(&mut self) -> Result<(), ExecError> {
    match &mut self.kind {
      CaseKind::Recv { received } => match self.chan.recv() {
        Ok(value) => {
          *received = Some(value);
          Ok(())
        }
        Err(RecvError::Closed) => Err(ExecError::Closed),
      },
      CaseKind::Send { outgoing } => {
        let value = outgoing
          .take()
          .expect("executed a send case that already delivered its value");
        match self.chan.send(value) {
          Ok(()) => Ok(()),
          Err(SendError::Closed(value)) => {
            *outgoing = Some(value);
            Err(ExecError::Closed)
          }
        }
      }
    }
  }

  /// Borrows the value captured by the most recent successful receive.
  pub fn get(&self) -> Result<&T, CaseError> {
    match &self.kind {
      CaseKind::Recv {
        received: Some(value),
      } => Ok(value),
      CaseKind::Recv { received: None } => Err(CaseError::Empty),
      CaseKind::Send { .. } => Err(CaseError::NotAReceiver),
    }
  }

  /// Takes the value captured by the most recent successful receive,
  /// leaving the case empty.
  pub fn take(&mut self) -> Result<T, CaseError> {
    match &mut self.kind {
      CaseKind::Recv { received } => received.take().ok_or(CaseError::Empty),
      CaseKind::Send { .. } => Err(CaseError::NotAReceiver),
    }
  }

  /// Non-blocking commit used by the engine. False when the operation could
  /// not complete: the readiness race was lost, the channel is closed, or
  /// this send case is spent.
  fn try_exec(&mut self) -> bool {
    match &mut self.kind {
      CaseKind::Recv { received } => match self.chan.try_recv() {
        Ok(value) => {
          *received = Some(value);
          true
        }
        Err(TryRecvError::Empty) => {
          telemetry::increment_counter("select", "recv_commit_raced");
          false
        }
        Err(TryRecvError::Closed) => false,
      },
      CaseKind::Send { outgoing } => {
        let value = match outgoing.take() {
          Some(value) => value,
          None => return false,
        };
        match self.chan.try_send(value) {
          Ok(()) => true,
          Err(TrySendError::Full(value)) => {
            telemetry::increment_counter("select", "send_commit_raced");
            *outgoing = Some(value);
            false
          }
          Err(TrySendError::Closed(value)) => {
            *outgoing = Some(value);
            false
          }
        }
      }
    }
  }

  fn channel(&self) -> &Chan<T> {
    &self.chan
  }
}

/// One non-blocking pass: scan the cases in shuffled order, commit the first
/// one whose operation completes, and return its original index. `None` when
/// nothing commits; no case is mutated in that event.
pub fn try_select<T: Send>(cases: &mut [Case<T>]) -> Option<usize> {
  try_select_with(cases, &mut rand::rng())
}

/// [`try_select`] with a caller-supplied randomness source, for
/// deterministic scan order under a seeded generator.
pub fn try_select_with<T: Send, R: Rng + ?Sized>(
  cases: &mut [Case<T>],
  rng: &mut R,
) -> Option<usize> {
  let mut order: Vec<usize> = (0..cases.len()).collect();
  order.shuffle(rng);
  for &idx in &order {
    if cases[idx].ready() && cases[idx].try_exec() {
      telemetry::increment_counter("select", "commit");
      return Some(idx);
    }
  }
  None
}

/// Blocks until one case's operation completes, and returns its original
/// index. Scan order is reshuffled on every pass (see the module docs on
/// fairness); between passes the calling thread is parked, not spun.
///
/// If no case can ever become ready again (every watched channel closed,
/// every send case spent), this call never returns.
///
/// # Panics
///
/// Panics on an empty case list, which could never return.
pub fn select<T: Send>(cases: &mut [Case<T>]) -> usize {
  select_with(cases, &mut rand::rng())
}

/// [`select`] with a caller-supplied randomness source.
pub fn select_with<T: Send, R: Rng + ?Sized>(cases: &mut [Case<T>], rng: &mut R) -> usize {
  assert!(
    !cases.is_empty(),
    "select over an empty case list would never return"
  );
  loop {
    if let Some(idx) = try_select_with(cases, rng) {
      return idx;
    }

    // Nothing committed. Register interest with every channel, then re-check
    // once: a transition landing between the failed pass and the
    // registration has already fired its notifications, so parking without
    // this check could sleep through it.
    let signal = Arc::new(SelectSignal::new());
    for case in cases.iter() {
      case.channel().register_select(&signal);
    }
    if !cases.iter().any(|case| case.ready()) {
      telemetry::increment_counter("select", "parked");
      signal.wait();
    }
    for case in cases.iter() {
      case.channel().unregister_select(&signal);
    }
  }
}
