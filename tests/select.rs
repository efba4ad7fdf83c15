// The select engine: winner reporting, fairness distribution, race-free
// commits, and the parked blocking path.

use strand::error::{CaseError, ExecError};
use strand::{bounded, rendezvous, select, select_with, try_select, try_select_with, Case};

use rand::SeedableRng;
use rand_pcg::Pcg64;
use serial_test::serial;
use std::thread;
use std::time::Duration;

#[test]
#[serial]
fn faster_channel_wins_the_select() {
  let ch1 = rendezvous::<i32>();
  let ch2 = rendezvous::<i32>();

  let slow = ch1.clone();
  let slow_handle = thread::spawn(move || {
    thread::sleep(Duration::from_millis(300));
    slow.send(1).unwrap();
  });
  let fast = ch2.clone();
  let fast_handle = thread::spawn(move || {
    thread::sleep(Duration::from_millis(100));
    fast.send(2).unwrap();
  });

  let mut cases = [Case::recv(&ch1), Case::recv(&ch2)];
  let winner = select(&mut cases);
  assert_eq!(winner, 1);
  assert_eq!(*cases[1].get().unwrap(), 2);

  slow_handle.join().unwrap();
  fast_handle.join().unwrap();
}

#[test]
fn rolling_over_six_channels_sees_each_once() {
  // One thread deposits a value on each of six rendezvous channels; six
  // blocking selects observe every channel exactly once, in whatever order
  // the shuffle picks.
  let channels: Vec<_> = (0..6).map(|_| rendezvous::<usize>()).collect();

  let producers = channels.clone();
  let handle = thread::spawn(move || {
    for (i, ch) in producers.iter().enumerate() {
      ch.send(i).unwrap();
    }
  });

  let mut cases: Vec<_> = channels.iter().map(Case::recv).collect();
  let mut seen = Vec::new();
  for _ in 0..6 {
    let winner = select(&mut cases);
    let value = cases[winner].take().unwrap();
    assert_eq!(value, winner);
    seen.push(winner);
  }
  seen.sort_unstable();
  assert_eq!(seen, vec![0, 1, 2, 3, 4, 5]);

  handle.join().unwrap();
}

#[test]
fn ready_cases_win_approximately_uniformly() {
  // Three channels are kept continuously ready; over many trials the
  // shuffled scan should spread wins roughly evenly across them.
  let channels: Vec<_> = (0..3).map(|_| bounded::<usize>(1)).collect();
  for (i, ch) in channels.iter().enumerate() {
    ch.send(i).unwrap();
  }

  let mut cases: Vec<_> = channels.iter().map(Case::recv).collect();
  let mut rng = Pcg64::seed_from_u64(0xFA1A);
  let trials = 3000;
  let mut counts = [0usize; 3];

  for _ in 0..trials {
    let winner = try_select_with(&mut cases, &mut rng).expect("all cases ready");
    let value = cases[winner].take().unwrap();
    counts[winner] += 1;
    channels[winner].send(value).unwrap(); // keep the winner ready
  }

  let expected = trials / 3;
  for count in counts {
    assert!(
      count > expected - 200 && count < expected + 200,
      "distribution skewed: {:?}",
      counts
    );
  }
}

#[test]
fn winner_actually_committed() {
  let ch1 = bounded::<i32>(4);
  let ch2 = bounded::<i32>(4);
  ch2.send(9).unwrap();

  let mut cases = [Case::recv(&ch1), Case::recv(&ch2)];
  let winner = select(&mut cases);
  assert_eq!(winner, 1);

  // The reported winner holds the value and the channel was drained; the
  // loser captured nothing.
  assert_eq!(*cases[1].get().unwrap(), 9);
  assert_eq!(ch2.len(), 0);
  assert_eq!(cases[0].get(), Err(CaseError::Empty));
}

#[test]
fn try_select_with_nothing_ready_has_no_effect() {
  let ch1 = bounded::<i32>(1);
  let ch2 = bounded::<i32>(1);

  let mut cases = [Case::recv(&ch1), Case::recv(&ch2)];
  assert_eq!(try_select(&mut cases), None);
  assert_eq!(cases[0].get(), Err(CaseError::Empty));
  assert_eq!(cases[1].get(), Err(CaseError::Empty));
  assert!(ch1.is_empty() && ch2.is_empty());
}

#[test]
fn send_case_picks_the_channel_with_room() {
  let full = bounded::<i32>(1);
  full.send(0).unwrap();
  let open = bounded::<i32>(1);

  let mut cases = [Case::send(&full, 1), Case::send(&open, 2)];
  assert_eq!(try_select(&mut cases), Some(1));
  assert_eq!(open.recv().unwrap(), 2);

  // The winning send case is spent; the other is still blocked on room.
  assert!(!cases[1].ready());
  assert_eq!(try_select(&mut cases), None);
}

#[test]
fn mixed_send_and_recv_cases() {
  let incoming = bounded::<i32>(1);
  incoming.send(5).unwrap();
  let outgoing = bounded::<i32>(1);
  outgoing.send(0).unwrap(); // full, so the send case cannot fire

  let mut cases = [Case::recv(&incoming), Case::send(&outgoing, 7)];
  assert_eq!(try_select(&mut cases), Some(0));
  assert_eq!(cases[0].take().unwrap(), 5);
}

#[test]
fn get_and_take_reject_send_cases() {
  let ch = bounded::<i32>(1);
  let mut case = Case::send(&ch, 1);
  assert_eq!(case.get(), Err(CaseError::NotAReceiver));
  assert_eq!(case.take(), Err(CaseError::NotAReceiver));
}

#[test]
fn get_before_any_receive_is_empty() {
  let ch = bounded::<i32>(1);
  let case = Case::recv(&ch);
  assert_eq!(case.get(), Err(CaseError::Empty));
}

#[test]
#[serial]
fn blocking_select_parks_until_a_send_arrives() {
  let ch = rendezvous::<i32>();
  let sender = ch.clone();
  let handle = thread::spawn(move || {
    thread::sleep(Duration::from_millis(150));
    sender.send(11).unwrap();
  });

  let mut cases = [Case::recv(&ch)];
  assert_eq!(select(&mut cases), 0);
  assert_eq!(cases[0].take().unwrap(), 11);
  handle.join().unwrap();
}

#[test]
#[serial]
fn blocking_select_woken_by_any_watched_channel() {
  let ch1 = rendezvous::<i32>();
  let ch2 = rendezvous::<i32>();
  let ch3 = rendezvous::<i32>();

  let sender = ch3.clone();
  let handle = thread::spawn(move || {
    thread::sleep(Duration::from_millis(150));
    sender.send(3).unwrap();
  });

  let mut cases = [Case::recv(&ch1), Case::recv(&ch2), Case::recv(&ch3)];
  assert_eq!(select(&mut cases), 2);
  assert_eq!(cases[2].take().unwrap(), 3);
  handle.join().unwrap();
}

#[test]
fn exec_blocks_like_the_underlying_operation() {
  let ch = rendezvous::<i32>();
  let sender = ch.clone();
  let handle = thread::spawn(move || {
    sender.send(21).unwrap();
  });

  let mut case = Case::recv(&ch);
  case.exec().unwrap();
  assert_eq!(*case.get().unwrap(), 21);
  handle.join().unwrap();
}

#[test]
fn exec_on_closed_channel_keeps_the_send_value() {
  let ch = bounded::<i32>(1);
  ch.close().unwrap();

  let mut case = Case::send(&ch, 8);
  assert_eq!(case.exec(), Err(ExecError::Closed));
  // The value was retained, so a second attempt reports Closed again
  // instead of panicking on a spent case.
  assert_eq!(case.exec(), Err(ExecError::Closed));
}

#[test]
fn seeded_scan_order_is_deterministic() {
  let run = |seed: u64| {
    let ch1 = bounded::<i32>(1);
    let ch2 = bounded::<i32>(1);
    ch1.send(1).unwrap();
    ch2.send(2).unwrap();
    let mut cases = [Case::recv(&ch1), Case::recv(&ch2)];
    let mut rng = Pcg64::seed_from_u64(seed);
    select_with(&mut cases, &mut rng)
  };

  assert_eq!(run(42), run(42));
}
