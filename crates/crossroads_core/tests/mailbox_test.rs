//! Integration tests for the latest-value mailbox.
//!
//! Run with: cargo test --package crossroads_core --test mailbox_test -- --nocapture

use crossroads_core::{Mailbox, MailboxClosed};
use crossroads_shared::Phase;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

// ============================================================================
// FRESHNESS
// ============================================================================

#[test]
fn test_red_then_green_delivers_green_then_blocks() {
    let mailbox = Arc::new(Mailbox::new());

    let producer = Arc::clone(&mailbox);
    thread::spawn(move || {
        producer.send(Phase::Red);
        producer.send(Phase::Green);
    })
    .join()
    .unwrap();

    assert_eq!(mailbox.receive(), Phase::Green);
    assert!(mailbox.is_empty());

    // Second receive must park: nothing is left.
    let (tx, rx) = mpsc::channel();
    let consumer = Arc::clone(&mailbox);
    thread::spawn(move || {
        let result = consumer.receive_until_closed();
        tx.send(result).unwrap();
    });

    assert!(
        rx.recv_timeout(Duration::from_millis(100)).is_err(),
        "second receive returned without a new send"
    );

    // Release the parked thread so the test does not leak it.
    mailbox.close();
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), Err(MailboxClosed));
}

#[test]
fn test_any_send_sequence_yields_last_value() {
    let sequences: [&[u32]; 4] = [&[1], &[1, 2], &[5, 4, 3, 2, 1], &[9; 32]];

    for sequence in sequences {
        let mailbox = Mailbox::new();
        for value in sequence {
            mailbox.send(*value);
        }

        assert_eq!(mailbox.receive(), *sequence.last().unwrap());
        assert!(mailbox.is_empty(), "backlog not empty after {sequence:?}");
        assert_eq!(mailbox.stats().superseded, sequence.len() as u64 - 1);
    }
}

#[test]
fn test_receive_blocks_until_next_send_after_drain() {
    let mailbox = Arc::new(Mailbox::new());
    mailbox.send(1u32);
    assert_eq!(mailbox.receive(), 1);

    let (tx, rx) = mpsc::channel();
    let consumer = Arc::clone(&mailbox);
    let handle = thread::spawn(move || {
        tx.send(consumer.receive()).unwrap();
    });

    assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    mailbox.send(2);
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 2);
    handle.join().unwrap();
}

// ============================================================================
// WAKEUPS
// ============================================================================

#[test]
fn test_each_send_releases_one_waiter() {
    let mailbox = Arc::new(Mailbox::new());
    let woken = Arc::new(AtomicUsize::new(0));
    let num_waiters = 4;

    let handles: Vec<_> = (0..num_waiters)
        .map(|_| {
            let mailbox = Arc::clone(&mailbox);
            let woken = Arc::clone(&woken);
            thread::spawn(move || {
                if mailbox.receive_until_closed().is_ok() {
                    woken.fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();

    // Let every waiter park.
    thread::sleep(Duration::from_millis(50));

    for i in 0..num_waiters {
        mailbox.send(i);
        // Give the woken waiter time to drain before the next send.
        thread::sleep(Duration::from_millis(20));
    }

    mailbox.close();
    for h in handles {
        h.join().unwrap();
    }

    let stats = mailbox.stats();
    assert_eq!(stats.sent, num_waiters as u64);
    assert_eq!(
        woken.load(Ordering::SeqCst) as u64,
        stats.received,
        "every successful receive must be counted exactly once"
    );
    assert_eq!(stats.received + stats.superseded, stats.sent);
}

#[test]
fn test_close_releases_all_waiters() {
    let mailbox: Arc<Mailbox<Phase>> = Arc::new(Mailbox::new());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let mailbox = Arc::clone(&mailbox);
            thread::spawn(move || mailbox.receive_until_closed())
        })
        .collect();

    thread::sleep(Duration::from_millis(30));
    mailbox.close();

    for h in handles {
        assert_eq!(h.join().unwrap(), Err(MailboxClosed));
    }
}

#[test]
fn test_concurrent_producers_keep_backlog_consistent() {
    let mailbox = Arc::new(Mailbox::new());
    let num_threads = 8;
    let sends_per_thread = 1000u64;

    let producers: Vec<_> = (0..num_threads)
        .map(|_| {
            let mailbox = Arc::clone(&mailbox);
            thread::spawn(move || {
                for i in 0..sends_per_thread {
                    mailbox.send(i);
                }
            })
        })
        .collect();

    let mut received = 0u64;
    while received < 100 {
        if mailbox.receive_timeout(Duration::from_millis(100)).is_some() {
            received += 1;
        } else {
            break;
        }
    }

    for h in producers {
        h.join().unwrap();
    }
    while mailbox.try_receive().is_some() {}

    let stats = mailbox.stats();
    println!("Mailbox stats after contention: {stats:?}");
    assert_eq!(stats.sent, num_threads * sends_per_thread);
    assert_eq!(stats.received + stats.superseded, stats.sent);
    assert!(mailbox.is_empty());
}
