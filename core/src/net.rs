//! Network attach procedure
//!
//! The supervisor brings the network up asynchronously after a single
//! attach request. This is the only place in the firmware that blocks: a
//! bounded-iteration spin between status polls until the attachment
//! reports connected. Everything after startup is non-blocking.

#![deny(unsafe_code)]

use crate::config::{NOTIFICATION_RING_RECORDS, TAG_REQUEST_NETWORK};
use crate::error::FatalFault;
use crate::supervisor::{
    NetworkHandle, NetworkStatus, NotificationHandle, NotificationSetup, Supervisor,
};

/// Interrupt line assigned to network-attachment notifications.
pub const IRQ_NETWORK_NOTIFY: u32 = 1;

/// Spin iterations between connection-status polls.
const POLL_SPIN_ITERATIONS: u32 = 50_000;

/// Owns the network attachment handle. Read-only to the rest of the core;
/// the channel manager borrows the handle value, never the attachment.
pub struct NetworkLink {
    handle: NetworkHandle,
    notification: Option<NotificationHandle>,
}

impl NetworkLink {
    pub const fn new() -> Self {
        Self {
            handle: NetworkHandle::NONE,
            notification: None,
        }
    }

    /// The attachment handle; zero until [`attach`](Self::attach) has
    /// completed.
    pub fn handle(&self) -> NetworkHandle {
        self.handle
    }

    /// Request the network attachment and busy-poll until it is up.
    ///
    /// Registers the network's own notification center on first use, then
    /// issues the attach request and spins until the supervisor reports
    /// the attachment connected. Rejection of either setup call is fatal.
    /// Idempotent once attached.
    pub fn attach<S: Supervisor>(&mut self, sv: &mut S) -> Result<(), FatalFault> {
        let notification = match self.notification {
            Some(handle) => handle,
            None => {
                let setup = NotificationSetup {
                    irq: IRQ_NETWORK_NOTIFY,
                    records: NOTIFICATION_RING_RECORDS,
                };
                let handle = sv.notifications_setup(&setup).map_err(|status| {
                    FatalFault::NotificationCenterNotOpen {
                        status: status.code(),
                    }
                })?;
                self.notification = Some(handle);
                handle
            }
        };

        if !self.handle.is_attached() {
            self.handle = sv
                .request_network(notification, TAG_REQUEST_NETWORK)
                .map_err(|status| FatalFault::NetworkNotOpen {
                    status: status.code(),
                })?;

            info!("waiting for network, handle: {}", self.handle.0);
            loop {
                if matches!(sv.network_status(self.handle), Ok(NetworkStatus::Connected)) {
                    break;
                }
                for _ in 0..POLL_SPIN_ITERATIONS {
                    core::hint::spin_loop();
                }
            }
            info!("network attached");
        }

        Ok(())
    }

    /// Whether the attachment currently reports connected. Used for the
    /// display's connectivity indicator only; channel errors are what
    /// actually drive retry behavior.
    pub fn is_connected<S: Supervisor>(&self, sv: &mut S) -> bool {
        self.handle.is_attached()
            && matches!(sv.network_status(self.handle), Ok(NetworkStatus::Connected))
    }
}

impl Default for NetworkLink {
    fn default() -> Self {
        Self::new()
    }
}
