// src/error.rs

//! The closed set of outcomes a channel operation can produce.
//!
//! Every steady-state condition is an ordinary return value: sending on a
//! closed channel, receiving from a drained-and-closed channel, and closing a
//! channel twice are all expected results, never panics. The single
//! construction-time misuse (a zero-capacity bounded channel) panics instead,
//! because continuing with an invalid channel is unsafe; see
//! [`crate::bounded`].

use core::fmt;

// Value-carrying errors hand the undelivered item back to the caller.
// `Debug` is implemented by hand so it never requires `T: Debug`.
macro_rules! impl_error_for_enum_with_inner {
  (
    $enum_name:ident < $generic_param:ident >,
    $($variant:ident ( $message:expr ) ),+
    $(,)?
  ) => {
    impl<$generic_param> $enum_name<$generic_param> {
      /// Consumes the error, returning the value that could not be delivered.
      #[inline]
      pub fn into_inner(self) -> $generic_param {
        match self {
          $( $enum_name::$variant(v) => v, )+
        }
      }
    }

    impl<$generic_param> fmt::Display for $enum_name<$generic_param> {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
          $( $enum_name::$variant(_) => f.write_str($message), )+
        }
      }
    }

    impl<$generic_param: fmt::Debug> std::error::Error for $enum_name<$generic_param> {}
  };
}

/// Error returned by a blocking `send` on a closed channel.
///
/// The value that could not be sent is handed back to the caller.
#[derive(PartialEq, Eq, Clone)]
pub enum SendError<T> {
  /// The channel is closed; no further values are accepted, even when buffer
  /// space is available.
  Closed(T),
}

impl<T> fmt::Debug for SendError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SendError::Closed(_) => write!(f, "SendError::Closed(..)"),
    }
  }
}

impl_error_for_enum_with_inner!(SendError<T>, Closed("sending on a closed channel"));

/// Error returned by `try_send` when the value could not be delivered
/// immediately. The value being sent is returned in either variant.
#[derive(PartialEq, Eq, Clone)]
pub enum TrySendError<T> {
  /// The channel has no room right now: the buffer is at capacity, or the
  /// rendezvous slot is occupied.
  Full(T),
  /// The channel is closed; no further values are accepted.
  Closed(T),
}

impl<T> fmt::Debug for TrySendError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TrySendError::Full(_) => write!(f, "TrySendError::Full(..)"),
      TrySendError::Closed(_) => write!(f, "TrySendError::Closed(..)"),
    }
  }
}

impl_error_for_enum_with_inner!(
  TrySendError<T>,
  Full("channel full"),
  Closed("sending on a closed channel"),
);

/// Error returned by a blocking `recv`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RecvError {
  /// The channel is closed and every buffered value has been drained.
  Closed,
}
impl std::error::Error for RecvError {}
impl fmt::Display for RecvError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RecvError::Closed => write!(f, "receiving on an empty, closed channel"),
    }
  }
}

/// Error returned by `try_recv` when no value could be taken immediately.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TryRecvError {
  /// The channel holds no value right now but is still open.
  Empty,
  /// The channel is closed and every buffered value has been drained.
  Closed,
}
impl std::error::Error for TryRecvError {}
impl fmt::Display for TryRecvError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TryRecvError::Empty => write!(f, "channel empty"),
      TryRecvError::Closed => write!(f, "receiving on an empty, closed channel"),
    }
  }
}

/// Error returned when closing an already-closed channel.
///
/// Distinct from the steady-state closed results above: callers can detect
/// "this was the second close", not merely "this channel is closed".
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct CloseError;
impl std::error::Error for CloseError {}
impl fmt::Display for CloseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "channel is already closed")
  }
}

/// Error returned by [`crate::Case::exec`] when the bound channel is closed
/// before the operation can complete. A send case keeps its value and may
/// report this again on a later attempt.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ExecError {
  /// The bound channel is closed.
  Closed,
}
impl std::error::Error for ExecError {}
impl fmt::Display for ExecError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ExecError::Closed => write!(f, "case bound to a closed channel"),
    }
  }
}

/// Error returned by [`crate::Case::get`] and [`crate::Case::take`] when the
/// case carries no receivable value.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CaseError {
  /// The case is a send case; send cases never carry a received value.
  NotAReceiver,
  /// No receive has completed on this case yet.
  Empty,
}
impl std::error::Error for CaseError {}
impl fmt::Display for CaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CaseError::NotAReceiver => write!(f, "send cases carry no received value"),
      CaseError::Empty => write!(f, "no value received on this case yet"),
    }
  }
}
