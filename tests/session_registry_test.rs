//! Tests for the session registry: exclusive claims, exactly-once delivery,
//! group forwarding.

use std::sync::{Arc, Barrier};
use std::thread;

use strictly_rps::{
    AlreadyClaimed, ChatKind, Choice, Delivery, Forward, InboundMessage, PairConflict,
    Participant, SessionRegistry, SlotClosed,
};

fn group_message(user: i64, group: i64, text: &str) -> InboundMessage {
    InboundMessage::new(
        1,
        Participant::new(user, format!("user{user}")),
        group,
        ChatKind::Group,
        Some(text.to_string()),
    )
}

#[test]
fn test_concurrent_claims_yield_one_winner() {
    let registry = SessionRegistry::new();
    let threads = 16;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let registry = registry.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                registry.try_claim(7)
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("Thread panicked"))
        .collect();

    let winners = results.iter().filter(|r| r.is_ok()).count();
    let losers = results
        .iter()
        .filter(|r| matches!(r, Err(AlreadyClaimed)))
        .count();
    assert_eq!(winners, 1);
    assert_eq!(losers, threads - 1);
    assert!(registry.has_slot(7));
}

#[test]
fn test_concurrent_group_opens_yield_one_winner() {
    let registry = SessionRegistry::new();
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let registry = registry.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                registry.open_group(-42)
            })
        })
        .collect();

    let opened = handles
        .into_iter()
        .map(|h| h.join().expect("Thread panicked"))
        .filter(|r| r.is_ok())
        .count();
    assert_eq!(opened, 1);
}

#[tokio::test]
async fn test_deliver_is_exactly_once() {
    let registry = SessionRegistry::new();
    let slot = registry.try_claim(1).expect("Claim failed");

    assert_eq!(registry.deliver(1, Choice::Paper), Delivery::Delivered);
    assert!(!registry.has_slot(1));
    assert_eq!(registry.deliver(1, Choice::Rock), Delivery::NoSuchSlot);

    assert_eq!(slot.recv().await, Ok(Choice::Paper));
}

#[test]
fn test_deliver_without_slot() {
    let registry = SessionRegistry::new();
    assert_eq!(registry.deliver(99, Choice::Rock), Delivery::NoSuchSlot);
}

#[tokio::test]
async fn test_release_wakes_waiter_with_closed() {
    let registry = SessionRegistry::new();
    let slot = registry.try_claim(3).expect("Claim failed");
    registry.release(3);
    assert!(!registry.has_slot(3));
    assert_eq!(slot.recv().await, Err(SlotClosed));
    assert!(registry.try_claim(3).is_ok());
}

#[tokio::test]
async fn test_forward_reaches_open_group_only() {
    let registry = SessionRegistry::new();
    let mut inbox = registry.open_group(-1).expect("Open failed");
    assert!(registry.open_group(-1).is_err());

    let message = group_message(5, -1, "/join");
    assert_eq!(registry.forward(-1, message.clone()), Forward::Delivered);
    assert_eq!(
        registry.forward(-2, group_message(5, -2, "/join")),
        Forward::NoSuchGroup
    );

    assert_eq!(inbox.next().await, Some(message));
}

#[tokio::test]
async fn test_close_group_stops_forwarding() {
    let registry = SessionRegistry::new();
    let mut inbox = registry.open_group(-1).expect("Open failed");

    registry.close_group(-1);
    assert!(!registry.is_group_open(-1));
    assert_eq!(
        registry.forward(-1, group_message(5, -1, "/join")),
        Forward::NoSuchGroup
    );
    assert_eq!(inbox.next().await, None);
}

#[test]
fn test_dropping_inbox_reopens_group() {
    let registry = SessionRegistry::new();
    let inbox = registry.open_group(-3).expect("Open failed");
    drop(inbox);
    assert!(!registry.is_group_open(-3));
    assert!(registry.open_group(-3).is_ok());
}

#[test]
fn test_pair_claim_races_solo_claim() {
    const CREATOR: i64 = 1;
    const PARTNER: i64 = 2;

    for _ in 0..200 {
        let registry = SessionRegistry::new();
        let barrier = Arc::new(Barrier::new(2));

        let solo = {
            let registry = registry.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                registry.try_claim(PARTNER)
            })
        };
        let pair = {
            let registry = registry.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                registry.try_claim_pair(CREATOR, PARTNER, || true)
            })
        };

        // Both results stay alive until compared, so neither claim is
        // released early.
        let solo = solo.join().expect("Solo thread panicked");
        let pair = pair.join().expect("Pair thread panicked");

        match (&solo, &pair) {
            (Ok(_), Err(conflict)) => {
                assert_eq!(*conflict, PairConflict::PartnerBusy);
                assert!(!registry.has_slot(CREATOR));
            }
            (Err(AlreadyClaimed), Ok(_)) => assert!(registry.has_slot(CREATOR)),
            (Ok(_), Ok(_)) => panic!("Both claims won for one participant"),
            (Err(_), Err(_)) => panic!("Neither claim won"),
        }
        assert!(registry.has_slot(PARTNER));
    }
}
