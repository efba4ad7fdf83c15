#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

//! CSP-style channels for threads, with close and a fair multi-way select.
//!
//! Strand provides two channel flavors behind one cheap-to-clone handle:
//! [`bounded`] channels buffer up to a fixed capacity of values in FIFO
//! order, and [`rendezvous`] channels carry at most one value in flight.
//! Channels support a one-shot [`close`](Chan::close) protocol (closing
//! rejects future sends while values already in the channel remain
//! receivable until drained) and a [`select()`] engine that commits exactly
//! one ready operation among several candidates across different channels,
//! with statistically fair, randomized candidate order.
//!
//! Every blocking operation parks the calling OS thread; there is no
//! busy-waiting, including inside the blocking select.
//!
//! # Examples
//!
//! ```
//! use strand::{bounded, Case, select};
//! use std::thread;
//!
//! let numbers = bounded::<u32>(2);
//! let words = bounded::<u32>(2);
//!
//! let producer = words.clone();
//! thread::spawn(move || {
//!   producer.send(42).unwrap();
//! });
//!
//! let mut cases = [Case::recv(&numbers), Case::recv(&words)];
//! let winner = select(&mut cases);
//! assert_eq!(winner, 1);
//! assert_eq!(cases[winner].take().unwrap(), 42);
//! ```

pub mod error;

pub mod chan;
pub mod select;
pub mod telemetry;

mod internal;

pub use chan::{bounded, rendezvous, Chan};
pub use error::{
  CaseError, CloseError, ExecError, RecvError, SendError, TryRecvError, TrySendError,
};
pub use select::{select, select_with, try_select, try_select_with, Case};
