//! Notification ring and the interrupt-to-thread event latch
//!
//! The supervisor reports channel completion events by writing fixed-size
//! records into a pre-registered ring and firing an interrupt. The handler
//! must not call back into the supervisor, so it does the minimum possible:
//! it inspects the record under the cursor and sets one of two one-way
//! flags for the worker thread.
//!
//! Flag ownership is strictly one-directional — the handler only sets, the
//! worker only clears. With exactly one writer per variable there is no
//! reordering hazard and no need for a mutex on either side.

#![deny(unsafe_code)]

use core::sync::atomic::{AtomicBool, Ordering};

use crate::config::NOTIFICATION_RING_RECORDS;
use crate::error::FatalFault;
use crate::supervisor::{NotificationHandle, NotificationSetup, Supervisor};

/// Channel has buffered response data ready to read.
pub const EVENT_DATA_READABLE: u32 = 1;
/// Space opened up in the channel's send buffer.
pub const EVENT_WRITE_SPACE: u32 = 2;
/// The channel lost its connection and was closed remotely.
pub const EVENT_NOT_CONNECTED: u32 = 3;

/// Kind value of a consumed record.
const EVENT_NONE: u32 = 0;
/// Fill pattern for records the supervisor has never written.
const EVENT_SENTINEL: u32 = u32::MAX;

/// One supervisor-written event record.
#[derive(Debug, Clone, Copy)]
pub struct NotificationRecord {
    /// Supervisor wall-clock at the time of the event, microseconds.
    pub timestamp_us: u64,
    /// One of the `EVENT_*` kinds.
    pub event_kind: u32,
    /// Tag supplied when the emitting resource was created.
    pub tag: u32,
}

/// The flags crossing the interrupt/thread boundary.
///
/// `signal_*` belongs to the interrupt handler, `take_*` to the worker
/// loop; neither side may call the other's half.
#[derive(Debug)]
pub struct EventLatch {
    response_ready: AtomicBool,
    channel_force_closed: AtomicBool,
}

impl EventLatch {
    pub const fn new() -> Self {
        Self {
            response_ready: AtomicBool::new(false),
            channel_force_closed: AtomicBool::new(false),
        }
    }

    /// Producer side: a response is waiting in the channel.
    pub fn signal_response_ready(&self) {
        self.response_ready.store(true, Ordering::Release);
    }

    /// Producer side: the channel was closed out from under us.
    pub fn signal_channel_force_closed(&self) {
        self.channel_force_closed.store(true, Ordering::Release);
    }

    /// Consumer side: observe-and-clear the response flag.
    pub fn take_response_ready(&self) -> bool {
        self.response_ready.swap(false, Ordering::AcqRel)
    }

    /// Consumer side: observe-and-clear the remote-close flag.
    pub fn take_channel_force_closed(&self) -> bool {
        self.channel_force_closed.swap(false, Ordering::AcqRel)
    }
}

impl Default for EventLatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed-size ring of event records plus the handler's read cursor.
///
/// The supervisor appends records at its own position; the interrupt
/// handler is the only writer of `cursor`. The ring is sentinel-filled
/// before registration so a never-written record can't be mistaken for a
/// live event.
pub struct NotificationRing {
    records: [NotificationRecord; NOTIFICATION_RING_RECORDS],
    cursor: usize,
    write_index: usize,
}

impl NotificationRing {
    pub const fn new() -> Self {
        const SENTINEL: NotificationRecord = NotificationRecord {
            timestamp_us: 0,
            event_kind: EVENT_SENTINEL,
            tag: 0,
        };
        Self {
            records: [SENTINEL; NOTIFICATION_RING_RECORDS],
            cursor: 0,
            write_index: 0,
        }
    }

    /// Register the ring with the supervisor.
    ///
    /// Clears the store first, then asks the supervisor to attach it to
    /// the given interrupt line. Rejection is fatal: without a working
    /// notification center no response can ever be correlated.
    pub fn register<S: Supervisor>(
        &mut self,
        sv: &mut S,
        irq: u32,
    ) -> Result<NotificationHandle, FatalFault> {
        for record in self.records.iter_mut() {
            record.timestamp_us = 0;
            record.event_kind = EVENT_SENTINEL;
            record.tag = 0;
        }
        self.cursor = 0;
        self.write_index = 0;

        let setup = NotificationSetup {
            irq,
            records: NOTIFICATION_RING_RECORDS,
        };
        match sv.notifications_setup(&setup) {
            Ok(handle) => {
                info!("notification center handle: {}", handle.0);
                Ok(handle)
            }
            Err(status) => Err(FatalFault::NotificationCenterNotOpen {
                status: status.code(),
            }),
        }
    }

    /// Supervisor-side write of one record. On hardware this is done by
    /// the supervisor itself; platform glue and test harnesses call it
    /// just before raising the interrupt.
    pub fn deliver(&mut self, record: NotificationRecord) {
        self.records[self.write_index] = record;
        self.write_index = (self.write_index + 1) % NOTIFICATION_RING_RECORDS;
    }

    /// The interrupt-handler body.
    ///
    /// Inspects the record under the cursor and translates the two kinds
    /// we care about into latch flags. A consumed record's kind is reset
    /// to the empty value before the cursor advances, so a stale record
    /// can never be re-consumed after the ring wraps. Never blocks, never
    /// calls the supervisor.
    pub fn service(&mut self, latch: &EventLatch) {
        let record = &mut self.records[self.cursor];
        let handled = match record.event_kind {
            EVENT_DATA_READABLE => {
                latch.signal_response_ready();
                true
            }
            EVENT_NOT_CONNECTED => {
                latch.signal_channel_force_closed();
                true
            }
            _ => false,
        };

        if handled {
            record.event_kind = EVENT_NONE;
            self.cursor = (self.cursor + 1) % NOTIFICATION_RING_RECORDS;
        }
    }
}

impl Default for NotificationRing {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: u32) -> NotificationRecord {
        NotificationRecord {
            timestamp_us: 0,
            event_kind: kind,
            tag: 0,
        }
    }

    #[test]
    fn readable_event_sets_response_flag_and_consumes_record() {
        let latch = EventLatch::new();
        let mut ring = NotificationRing::new();

        ring.deliver(record(EVENT_DATA_READABLE));
        ring.service(&latch);

        assert!(latch.take_response_ready());
        assert!(!latch.take_channel_force_closed());
        // The record was consumed: servicing the same slot again is a no-op.
        ring.service(&latch);
        assert!(!latch.take_response_ready());
    }

    #[test]
    fn not_connected_event_sets_force_close_flag() {
        let latch = EventLatch::new();
        let mut ring = NotificationRing::new();

        ring.deliver(record(EVENT_NOT_CONNECTED));
        ring.service(&latch);

        assert!(latch.take_channel_force_closed());
        assert!(!latch.take_response_ready());
    }

    #[test]
    fn unknown_kinds_are_ignored_and_do_not_advance_the_cursor() {
        let latch = EventLatch::new();
        let mut ring = NotificationRing::new();

        ring.deliver(record(EVENT_WRITE_SPACE));
        ring.service(&latch);
        assert!(!latch.take_response_ready());
        assert!(!latch.take_channel_force_closed());

        // The cursor stayed put: a consumable event landing in the next
        // slot is only seen after the ignored one is overwritten.
        assert_eq!(ring.cursor, 0);
    }

    #[test]
    fn cursor_wraps_modulo_ring_size() {
        let latch = EventLatch::new();
        let mut ring = NotificationRing::new();

        for _ in 0..NOTIFICATION_RING_RECORDS + 2 {
            ring.deliver(record(EVENT_DATA_READABLE));
            ring.service(&latch);
            assert!(latch.take_response_ready());
        }
        assert_eq!(ring.cursor, 2);
        assert_eq!(ring.write_index, 2);
    }

    #[test]
    fn latch_flags_clear_on_take_and_stay_cleared() {
        let latch = EventLatch::new();
        latch.signal_response_ready();
        latch.signal_response_ready();
        assert!(latch.take_response_ready());
        assert!(!latch.take_response_ready());
    }

    #[test]
    fn latch_handoff_across_threads() {
        let latch = EventLatch::new();
        std::thread::scope(|scope| {
            scope.spawn(|| {
                latch.signal_response_ready();
                latch.signal_channel_force_closed();
            });
        });
        assert!(latch.take_response_ready());
        assert!(latch.take_channel_force_closed());
    }
}
