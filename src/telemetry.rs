// src/telemetry.rs

//! Feature-gated diagnostics: a global collector of events and counters.
//!
//! Enabled with the `strand_telemetry` cargo feature; without it every
//! instrumentation call compiles to an inline no-op. The collector is
//! process-global, so tests exercising it must not run concurrently.

#[cfg(feature = "strand_telemetry")]
pub mod enabled {
  //! The live collector.

  use std::collections::HashMap;
  use std::fmt;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Mutex;
  use std::thread::{self, ThreadId};
  use std::time::Instant;

  static NEXT_EVENT_SEQUENCE_ID: AtomicUsize = AtomicUsize::new(0);

  /// One recorded instrumentation event.
  #[derive(Clone)]
  pub struct TelemetryEvent {
    /// Global sequence number across all events.
    pub seq_id: usize,
    /// When the event was recorded.
    pub timestamp: Instant,
    /// OS thread the event was recorded on.
    pub os_thread_id: ThreadId,
    /// Optional ID for the specific data item involved.
    pub item_id: Option<usize>,
    /// Code location (e.g. `chan::close`).
    pub location: String,
    /// Event type (e.g. `CloseBroadcast`).
    pub event_type: String,
    /// Optional human-readable details.
    pub message: Option<String>,
  }

  impl fmt::Debug for TelemetryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("TelemetryEvent")
        .field("seq", &self.seq_id)
        .field("os_tid", &self.os_thread_id)
        .field("item_id", &self.item_id)
        .field("loc", &self.location)
        .field("evt", &self.event_type)
        .field("msg", &self.message.as_deref().unwrap_or(""))
        .finish()
    }
  }

  type CounterKey = (String, String); // (location, counter_name)

  struct CollectorData {
    events: Vec<TelemetryEvent>,
    counters: HashMap<CounterKey, usize>,
    start_time: Instant,
  }

  impl CollectorData {
    fn new() -> Self {
      CollectorData {
        events: Vec::new(),
        counters: HashMap::new(),
        start_time: Instant::now(),
      }
    }
  }

  lazy_static::lazy_static! {
    static ref GLOBAL_COLLECTOR: Mutex<CollectorData> = Mutex::new(CollectorData::new());
  }

  fn record_event_internal(
    item_id: Option<usize>,
    location: &str,
    event_type: &str,
    message: Option<String>,
  ) {
    let event = TelemetryEvent {
      seq_id: NEXT_EVENT_SEQUENCE_ID.fetch_add(1, Ordering::Relaxed),
      timestamp: Instant::now(),
      os_thread_id: thread::current().id(),
      item_id,
      location: location.to_string(),
      event_type: event_type.to_string(),
      message,
    };

    if let Ok(mut collector) = GLOBAL_COLLECTOR.lock() {
      collector.events.push(event);
    } else {
      eprintln!("[TELEMETRY ERROR] collector mutex poisoned while recording event");
    }
  }

  fn increment_counter_internal(location: &str, counter_name: &str) {
    let key = (location.to_string(), counter_name.to_string());
    if let Ok(mut collector) = GLOBAL_COLLECTOR.lock() {
      *collector.counters.entry(key).or_insert(0) += 1;
    } else {
      eprintln!("[TELEMETRY ERROR] collector mutex poisoned while incrementing counter");
    }
  }

  fn print_report_internal() {
    if let Ok(collector) = GLOBAL_COLLECTOR.lock() {
      println!("\n--- Strand Telemetry Report (feature: strand_telemetry) ---");

      if collector.events.is_empty() {
        println!("\n[Events] No events recorded.");
      } else {
        println!("\n[Events] Recorded events ({}):", collector.events.len());
        let mut sorted_events = collector.events.clone();
        sorted_events.sort_by_key(|e| e.seq_id);

        for event in sorted_events.iter() {
          let time_since_start = event.timestamp.duration_since(collector.start_time);
          println!(
            "  +{:<10.6}s [Seq:{:<5}] TID:{:<18} Item:{:<6} Loc:{:<20} Evt:{:<24} Msg: {}",
            time_since_start.as_secs_f64(),
            event.seq_id,
            format!("{:?}", event.os_thread_id),
            event.item_id.map_or_else(|| "N/A".to_string(), |id| id.to_string()),
            event.location,
            event.event_type,
            event.message.as_deref().unwrap_or("")
          );
        }
      }

      if collector.counters.is_empty() {
        println!("\n[Counters] No counters recorded.");
      } else {
        println!("\n[Counters] Recorded counters ({}):", collector.counters.len());
        let mut sorted_counters: Vec<_> = collector.counters.iter().collect();
        sorted_counters.sort_by_key(|(k, _v)| *k);
        for ((loc, name), count) in sorted_counters {
          println!("  Loc:{:<20} Counter:{:<24} Value: {}", loc, name, count);
        }
      }
      println!("\n--- End of Telemetry Report ---");
    } else {
      eprintln!("[TELEMETRY ERROR] collector mutex poisoned, cannot print report");
    }
  }

  fn clear_data_internal() {
    if let Ok(mut collector) = GLOBAL_COLLECTOR.lock() {
      collector.events.clear();
      collector.counters.clear();
      collector.start_time = Instant::now();
    } else {
      eprintln!("[TELEMETRY ERROR] collector mutex poisoned, cannot clear data");
    }
    NEXT_EVENT_SEQUENCE_ID.store(0, Ordering::Relaxed);
  }

  /// Records one event.
  pub fn log_event_fn(
    item_id: Option<usize>,
    location: &str,
    event_type: &str,
    message: Option<String>,
  ) {
    record_event_internal(item_id, location, event_type, message);
  }

  /// Bumps the named counter at the given location.
  pub fn increment_counter_fn(location: &'static str, counter_name: &str) {
    increment_counter_internal(location, counter_name);
  }

  /// Prints everything collected so far to stdout.
  pub fn print_telemetry_report_fn() {
    print_report_internal();
  }

  /// Discards everything collected so far.
  pub fn clear_telemetry_fn() {
    clear_data_internal();
  }

  /// Reads the named counter, for tests. Zero when never incremented.
  pub fn counter_value_fn(location: &str, counter_name: &str) -> usize {
    GLOBAL_COLLECTOR
      .lock()
      .map(|collector| {
        collector
          .counters
          .get(&(location.to_string(), counter_name.to_string()))
          .copied()
          .unwrap_or(0)
      })
      .unwrap_or(0)
  }

  #[cfg(test)]
  mod tests {
    use super::*;
    use crate::{bounded, try_select, Case};
    use serial_test::serial;

    #[test]
    #[serial]
    fn close_records_an_event() {
      clear_telemetry_fn();
      let ch = bounded::<i32>(1);
      ch.close().unwrap();
      let collector = GLOBAL_COLLECTOR.lock().unwrap();
      assert!(collector
        .events
        .iter()
        .any(|e| e.location == "chan::close" && e.event_type == "CloseBroadcast"));
    }

    #[test]
    #[serial]
    fn select_commit_counts() {
      clear_telemetry_fn();
      let ch = bounded::<i32>(1);
      ch.send(1).unwrap();
      let mut cases = [Case::recv(&ch)];
      assert_eq!(try_select(&mut cases), Some(0));
      assert!(counter_value_fn("select", "commit") >= 1);
    }
  }
}

#[cfg(not(feature = "strand_telemetry"))]
pub mod disabled {
  //! Inline no-op stubs used when the feature is off.

  /// Records one event (no-op).
  #[inline(always)]
  pub fn log_event_fn(
    _item_id: Option<usize>,
    _location: &'static str,
    _event_type: &'static str,
    _message: Option<String>,
  ) {
  }
  /// Bumps a counter (no-op).
  #[inline(always)]
  pub fn increment_counter_fn(_location: &'static str, _counter_name: &'static str) {}
  /// Prints the report (no-op).
  #[inline(always)]
  pub fn print_telemetry_report_fn() {}
  /// Clears collected data (no-op).
  #[inline(always)]
  pub fn clear_telemetry_fn() {}
}

// Re-export the correct set of functions based on the feature flag
#[cfg(feature = "strand_telemetry")]
pub use enabled::{
  clear_telemetry_fn as clear_telemetry, increment_counter_fn as increment_counter,
  log_event_fn as log_event, print_telemetry_report_fn as print_telemetry_report,
};

#[cfg(not(feature = "strand_telemetry"))]
pub use disabled::{
  clear_telemetry_fn as clear_telemetry, increment_counter_fn as increment_counter,
  log_event_fn as log_event, print_telemetry_report_fn as print_telemetry_report,
};
