// The close protocol: drain-then-reject, one-shot semantics, and the
// broadcast wake of every blocked operation.

use strand::error::{CloseError, RecvError, SendError};
use strand::{bounded, rendezvous};

use serial_test::serial;
use std::thread;
use std::time::Duration;

#[test]
fn close_drains_then_rejects() {
  let ch = bounded::<i32>(2);
  ch.send(1).unwrap();
  ch.send(2).unwrap();
  assert_eq!(ch.recv().unwrap(), 1);
  assert_eq!(ch.recv().unwrap(), 2);

  ch.send(3).unwrap();
  ch.close().unwrap();

  // The buffered value survives the close...
  assert_eq!(ch.recv().unwrap(), 3);
  // ...then the channel is exhausted...
  assert_eq!(ch.recv(), Err(RecvError::Closed));
  // ...and a send is rejected without touching the queue, despite the room.
  match ch.send(4) {
    Err(SendError::Closed(v)) => assert_eq!(v, 4),
    other => panic!("expected Closed, got {:?}", other),
  }
  assert_eq!(ch.len(), 0);
}

#[test]
fn close_is_one_shot() {
  let ch = bounded::<i32>(2);
  assert!(ch.close().is_ok());
  assert_eq!(ch.close(), Err(CloseError));
  assert_eq!(ch.close(), Err(CloseError));

  // Close affects the protocol, not the shape of the channel.
  assert_eq!(ch.capacity(), Some(2));
  assert_eq!(ch.len(), 0);
  assert!(ch.is_closed());
}

#[test]
fn recv_after_close_fails_deterministically() {
  let ch = bounded::<i32>(1);
  ch.close().unwrap();
  for _ in 0..3 {
    assert_eq!(ch.recv(), Err(RecvError::Closed));
  }
}

#[test]
#[serial]
fn close_wakes_a_blocked_receiver() {
  let ch = rendezvous::<i32>();
  let receiver = ch.clone();
  let handle = thread::spawn(move || receiver.recv());

  thread::sleep(Duration::from_millis(100));
  ch.close().unwrap();

  assert_eq!(handle.join().unwrap(), Err(RecvError::Closed));
}

#[test]
#[serial]
fn close_wakes_every_blocked_sender() {
  // Two senders parked on a full channel; the close broadcast must free
  // both, not just one, and both get their values back.
  let ch = bounded::<i32>(1);
  ch.send(0).unwrap();

  let mut handles = Vec::new();
  for v in [1, 2] {
    let sender = ch.clone();
    handles.push(thread::spawn(move || sender.send(v)));
  }

  thread::sleep(Duration::from_millis(100));
  ch.close().unwrap();

  let mut returned = Vec::new();
  for handle in handles {
    match handle.join().unwrap() {
      Err(SendError::Closed(v)) => returned.push(v),
      other => panic!("expected Closed, got {:?}", other),
    }
  }
  returned.sort_unstable();
  assert_eq!(returned, vec![1, 2]);

  // The buffered value from before the close is still receivable.
  assert_eq!(ch.recv().unwrap(), 0);
  assert_eq!(ch.recv(), Err(RecvError::Closed));
}

#[test]
fn worker_drains_jobs_until_closed() {
  let jobs = bounded::<i32>(6);
  let done = rendezvous::<i32>();

  let worker_jobs = jobs.clone();
  let worker_done = done.clone();
  let handle = thread::spawn(move || {
    let mut count = 0;
    while worker_jobs.recv().is_ok() {
      count += 1;
    }
    worker_done.send(count).unwrap();
  });

  for i in 0..4 {
    jobs.send(i).unwrap();
  }
  jobs.close().unwrap();
  assert!(matches!(jobs.send(6), Err(SendError::Closed(6))));

  assert_eq!(done.recv().unwrap(), 4);
  handle.join().unwrap();
}
