//! Channel lifecycle state machine
//!
//! One request/response channel exists at a time, by construction: the
//! node carries a single fixed-size send/receive buffer pair, so there is
//! nothing for a second channel to use. [`ChannelManager`] owns the handle
//! and walks it through Closed → Open → Sent → Closed. The open and close
//! transitions are synchronous supervisor calls; completion of the request
//! itself arrives later through the notification ring.
//!
//! A local kill-timer bounds how long one request may hold the channel.
//! It is deliberately longer than the supervisor-side request timeout, so
//! the supervisor gets first say; the kill-timer only catches a supervisor
//! that never signals completion at all.

#![deny(unsafe_code)]

use crate::config::{NodeConfig, RX_BUFFER_LEN, TAG_HTTP_OPEN_CHANNEL, TX_BUFFER_LEN};
use crate::error::{FatalFault, OpenError, SendError};
use crate::supervisor::{
    ChannelParams, HttpHeader, HttpRequest, NetworkHandle, NotificationHandle, RawChannelHandle,
    Supervisor, SvcStatus,
};

const CONTENT_TYPE_JSON: HttpHeader<'static> = HttpHeader {
    text: "Content-Type: application/json",
};

/// Book-keeping for the one request allowed in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRequest {
    /// Tick-counter value when the request was issued.
    pub sent_at: u32,
    /// `sent_at + kill_period`; the channel is forced closed at or after
    /// this instant.
    pub kill_deadline: u32,
}

/// Owns the single outbound channel handle and its state transitions.
pub struct ChannelManager {
    notification: NotificationHandle,
    channel: RawChannelHandle,
    pending: Option<PendingRequest>,
    endpoint_url: &'static str,
    kill_period_ms: u32,
    request_timeout_ms: u32,
}

impl ChannelManager {
    /// Build a manager bound to an already-registered notification ring.
    pub fn new(notification: NotificationHandle, config: &NodeConfig) -> Self {
        Self {
            notification,
            channel: 0,
            pending: None,
            endpoint_url: config.endpoint_url,
            kill_period_ms: config.kill_period_ms,
            request_timeout_ms: config.request_timeout_ms,
        }
    }

    /// Whether a channel is currently open.
    pub fn is_open(&self) -> bool {
        self.channel != 0
    }

    /// The raw channel handle; `0` when closed.
    pub fn handle(&self) -> RawChannelHandle {
        self.channel
    }

    /// The in-flight request, if any.
    pub fn pending(&self) -> Option<PendingRequest> {
        self.pending
    }

    /// Open a new channel over the given network attachment.
    ///
    /// With the attachment not yet up (zero handle) this returns
    /// [`OpenError::NetworkNotReady`] without any supervisor call, so a
    /// failed attempt leaves no state to clean up. Already-open channels
    /// are left alone.
    pub fn open<S: Supervisor>(
        &mut self,
        sv: &mut S,
        network: NetworkHandle,
    ) -> Result<(), OpenError> {
        if self.channel != 0 {
            return Ok(());
        }
        if !network.is_attached() {
            return Err(OpenError::NetworkNotReady);
        }

        let params = ChannelParams {
            notification: self.notification,
            notification_tag: TAG_HTTP_OPEN_CHANNEL,
            network,
            receive_buffer_len: RX_BUFFER_LEN,
            send_buffer_len: TX_BUFFER_LEN,
            endpoint: "",
        };

        match sv.channel_open(&params) {
            Ok(handle) => {
                debug!("channel open, handle: {}", handle);
                self.channel = handle;
                Ok(())
            }
            Err(status) => {
                error!("could not open channel, status: {}", status.code());
                Err(OpenError::Rejected(status.code()))
            }
        }
    }

    /// Issue one POST on the open channel.
    ///
    /// Exactly one request may be outstanding; a second send is rejected
    /// until the first resolves through a response, a remote close, or the
    /// kill-timer. On acceptance the kill deadline starts counting from
    /// `now`.
    pub fn send<S: Supervisor>(
        &mut self,
        sv: &mut S,
        body: &[u8],
        now: u32,
    ) -> Result<(), SendError> {
        if self.channel == 0 {
            return Err(SendError::NotOpen);
        }
        if self.pending.is_some() {
            return Err(SendError::RequestInFlight);
        }

        let headers = [CONTENT_TYPE_JSON];
        let request = HttpRequest {
            method: "POST",
            url: self.endpoint_url,
            headers: &headers,
            body,
            timeout_ms: self.request_timeout_ms,
        };

        match sv.http_send(self.channel, &request) {
            SvcStatus::Okay => {
                debug!("request sent");
                self.pending = Some(PendingRequest {
                    sent_at: now,
                    kill_deadline: now.wrapping_add(self.kill_period_ms),
                });
                Ok(())
            }
            SvcStatus::ChannelClosed => {
                error!("channel {} already closed", self.channel);
                Err(SendError::ChannelClosed)
            }
            status => {
                error!("could not issue request, status: {}", status.code());
                Err(SendError::Rejected(status.code()))
            }
        }
    }

    /// Close the channel and clear any pending request.
    ///
    /// A no-op when no channel is open — the supervisor is not called.
    /// The supervisor may legitimately report the channel as already
    /// closed (a remote close raced us); any other non-success status, or
    /// a handle left nonzero afterwards, is a contract breach and fatal.
    pub fn close<S: Supervisor>(&mut self, sv: &mut S) -> Result<(), FatalFault> {
        if self.channel != 0 {
            let old = self.channel;
            let status = sv.channel_close(&mut self.channel);
            match status {
                SvcStatus::Okay | SvcStatus::ChannelClosed => {
                    debug!("channel {} closed, status: {}", old, status.code());
                }
                other => {
                    return Err(FatalFault::ChannelNotClosed {
                        status: other.code(),
                    });
                }
            }

            if self.channel != 0 {
                return Err(FatalFault::ChannelHandleNotZero);
            }
        }

        self.pending = None;
        Ok(())
    }

    /// Whether the kill-timer has expired for an in-flight request.
    ///
    /// Returns `true` iff a request is pending and at least the kill
    /// period has elapsed since it was sent. The comparison is wrapping,
    /// so it stays monotonic across the u32 tick counter rolling over.
    /// The caller must follow a `true` with [`close`](Self::close).
    pub fn poll_timeout(&self, now: u32) -> bool {
        match self.pending {
            Some(pending) => now.wrapping_sub(pending.sent_at) >= self.kill_period_ms,
            None => false,
        }
    }
}
