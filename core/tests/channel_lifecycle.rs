//! Channel open/send/close state-machine behavior against a scripted
//! supervisor.

mod common;

use common::MockSupervisor;
use node_core::channel::ChannelManager;
use node_core::config::NodeConfig;
use node_core::error::{FatalFault, OpenError, SendError};
use node_core::notify::NotificationRing;
use node_core::supervisor::{NetworkHandle, NotificationHandle, SvcStatus};
use node_core::worker::IRQ_CHANNEL_NOTIFY;

fn manager() -> ChannelManager {
    ChannelManager::new(NotificationHandle(10), &NodeConfig::default())
}

const NET: NetworkHandle = NetworkHandle(40);

#[test]
fn close_with_no_channel_skips_the_supervisor() {
    let mut sv = MockSupervisor::new();
    let mut mgr = manager();

    assert!(mgr.close(&mut sv).is_ok());
    assert_eq!(sv.closes, 0);
}

#[test]
fn open_then_close_returns_to_the_initial_state() {
    let mut sv = MockSupervisor::new();
    let mut mgr = manager();

    mgr.open(&mut sv, NET).unwrap();
    assert!(mgr.is_open());
    assert_ne!(mgr.handle(), 0);

    mgr.close(&mut sv).unwrap();
    assert!(!mgr.is_open());
    assert_eq!(mgr.handle(), 0);
    assert_eq!(sv.closes, 1);

    // A fresh open works from the restored state.
    mgr.open(&mut sv, NET).unwrap();
    assert!(mgr.is_open());
    assert_eq!(sv.opens, 2);
}

#[test]
fn open_without_network_makes_no_supervisor_call() {
    let mut sv = MockSupervisor::new();
    let mut mgr = manager();

    assert_eq!(
        mgr.open(&mut sv, NetworkHandle::NONE),
        Err(OpenError::NetworkNotReady)
    );
    assert_eq!(sv.opens, 0);
    assert!(!mgr.is_open());
    assert!(mgr.pending().is_none());
}

#[test]
fn open_rejection_leaves_the_handle_zero() {
    let mut sv = MockSupervisor::new();
    sv.open_status = SvcStatus::Unavailable;
    let mut mgr = manager();

    assert_eq!(
        mgr.open(&mut sv, NET),
        Err(OpenError::Rejected(SvcStatus::Unavailable.code()))
    );
    assert!(!mgr.is_open());
}

#[test]
fn open_is_idempotent_while_a_channel_exists() {
    let mut sv = MockSupervisor::new();
    let mut mgr = manager();

    mgr.open(&mut sv, NET).unwrap();
    let handle = mgr.handle();
    mgr.open(&mut sv, NET).unwrap();
    assert_eq!(mgr.handle(), handle);
    assert_eq!(sv.opens, 1);
}

#[test]
fn send_requires_an_open_channel() {
    let mut sv = MockSupervisor::new();
    let mut mgr = manager();

    assert_eq!(
        mgr.send(&mut sv, b"{\"temp\":20.00}", 0),
        Err(SendError::NotOpen)
    );
    assert_eq!(sv.sends, 0);
}

#[test]
fn send_builds_the_request_and_starts_the_kill_timer() {
    let mut sv = MockSupervisor::new();
    let mut mgr = manager();

    mgr.open(&mut sv, NET).unwrap();
    mgr.send(&mut sv, b"{\"temp\":23.45}", 1_000).unwrap();

    let pending = mgr.pending().unwrap();
    assert_eq!(pending.sent_at, 1_000);
    assert_eq!(pending.kill_deadline, 16_000);

    let request = sv.last_request();
    assert_eq!(request.method, "POST");
    assert_eq!(request.url, NodeConfig::default().endpoint_url);
    assert_eq!(request.headers, ["Content-Type: application/json"]);
    assert_eq!(request.body.as_slice(), b"{\"temp\":23.45}");
    assert_eq!(request.timeout_ms, 10_000);
}

#[test]
fn a_second_send_is_rejected_while_one_is_in_flight() {
    let mut sv = MockSupervisor::new();
    let mut mgr = manager();

    mgr.open(&mut sv, NET).unwrap();
    mgr.send(&mut sv, b"first", 1_000).unwrap();
    assert_eq!(
        mgr.send(&mut sv, b"second", 1_010),
        Err(SendError::RequestInFlight)
    );
    assert_eq!(sv.sends, 1, "the second request must not be issued");

    // Once the first resolves (here: via close), sending works again.
    mgr.close(&mut sv).unwrap();
    mgr.open(&mut sv, NET).unwrap();
    mgr.send(&mut sv, b"second", 2_000).unwrap();
    assert_eq!(sv.sends, 2);
}

#[test]
fn send_reports_a_remotely_closed_channel() {
    let mut sv = MockSupervisor::new();
    let mut mgr = manager();

    mgr.open(&mut sv, NET).unwrap();
    sv.send_status = SvcStatus::ChannelClosed;
    assert_eq!(
        mgr.send(&mut sv, b"body", 0),
        Err(SendError::ChannelClosed)
    );
    assert!(mgr.pending().is_none());
}

#[test]
fn close_accepts_the_already_closed_status() {
    let mut sv = MockSupervisor::new();
    let mut mgr = manager();

    mgr.open(&mut sv, NET).unwrap();
    sv.close_status = SvcStatus::ChannelClosed;
    mgr.close(&mut sv).unwrap();
    assert!(!mgr.is_open());
}

#[test]
fn close_rejection_is_a_fatal_fault() {
    let mut sv = MockSupervisor::new();
    let mut mgr = manager();

    mgr.open(&mut sv, NET).unwrap();
    sv.close_status = SvcStatus::InvalidHandle;
    let fault = mgr.close(&mut sv).unwrap_err();
    assert_eq!(
        fault,
        FatalFault::ChannelNotClosed {
            status: SvcStatus::InvalidHandle.code()
        }
    );
    assert_eq!(fault.code(), 20);
}

#[test]
fn a_handle_left_nonzero_after_close_is_a_fatal_fault() {
    let mut sv = MockSupervisor::new();
    sv.close_leaves_handle = true;
    let mut mgr = manager();

    mgr.open(&mut sv, NET).unwrap();
    let fault = mgr.close(&mut sv).unwrap_err();
    assert_eq!(fault, FatalFault::ChannelHandleNotZero);
    assert_eq!(fault.code(), 21);
}

#[test]
fn close_clears_the_pending_request_and_stops_the_timer() {
    let mut sv = MockSupervisor::new();
    let mut mgr = manager();

    mgr.open(&mut sv, NET).unwrap();
    mgr.send(&mut sv, b"body", 1_000).unwrap();
    assert!(mgr.poll_timeout(16_000));

    mgr.close(&mut sv).unwrap();
    assert!(mgr.pending().is_none());
    assert!(!mgr.poll_timeout(16_000));
}

#[test]
fn notification_ring_rejection_is_a_fatal_fault() {
    let mut sv = MockSupervisor::new();
    sv.setup_status = SvcStatus::Unavailable;
    let mut ring = NotificationRing::new();

    let fault = ring.register(&mut sv, IRQ_CHANNEL_NOTIFY).unwrap_err();
    assert_eq!(
        fault,
        FatalFault::NotificationCenterNotOpen {
            status: SvcStatus::Unavailable.code()
        }
    );
    assert_eq!(fault.code(), 30);
}
