use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, Thread};

/// A one-shot wake token a blocked `select` registers with every channel it
/// watches.
///
/// The flag is set before the unpark, so a waiter that observes the flag
/// never misses the wake-up even if `notify` lands between its readiness
/// re-check and its park. Spurious unparks simply re-check the flag.
#[derive(Debug)]
pub(crate) struct SelectSignal {
  notified: AtomicBool,
  thread: Thread,
}

impl SelectSignal {
  /// Creates a signal owned by the calling thread.
  pub(crate) fn new() -> Self {
    SelectSignal {
      notified: AtomicBool::new(false),
      thread: thread::current(),
    }
  }

  /// Parks the creating thread until `notify` is called.
  pub(crate) fn wait(&self) {
    while !self.notified.load(Ordering::Acquire) {
      thread::park();
    }
  }

  /// Wakes the waiting thread. May be called from any thread, any number of
  /// times; only the first call has an effect on the flag.
  pub(crate) fn notify(&self) {
    self.notified.store(true, Ordering::Release);
    self.thread.unpark();
  }
}
