//! The privileged supervisor's syscall surface
//!
//! The firmware never owns a network stack. A separate privileged
//! supervisor does, and exposes it through a small handle-based API:
//! register a notification ring, request a network attachment, open a
//! single-use HTTP channel over it, send one request, read one response.
//! This module models that surface as a trait so the lifecycle logic can
//! be driven against the real syscall layer on target and against scripted
//! doubles on the host.
//!
//! All calls return synchronously: a success status means the supervisor
//! *accepted* the request. Physical completion of sends and receives is
//! signaled later through the notification ring, never through the return
//! value.

#![deny(unsafe_code)]

/// Raw channel handle. `0` means "no channel".
pub type RawChannelHandle = u32;

/// Handle to a registered notification ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NotificationHandle(pub u32);

/// Handle to the underlying network attachment. `0` until attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NetworkHandle(pub u32);

impl NetworkHandle {
    pub const NONE: Self = Self(0);

    /// Whether the attachment exists yet.
    pub fn is_attached(self) -> bool {
        self.0 != 0
    }
}

/// Status codes returned by supervisor calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SvcStatus {
    /// Request accepted.
    Okay,
    /// One of the supplied parameters was invalid.
    ParametersInvalid,
    /// A supplied buffer was too small for the operation.
    BufferTooSmall,
    /// The referenced handle is unknown to the supervisor.
    InvalidHandle,
    /// The network attachment is not connected.
    NetworkNotConnected,
    /// The channel is (already) closed.
    ChannelClosed,
    /// The supervisor cannot service the request right now.
    Unavailable,
}

impl SvcStatus {
    /// Stable numeric code, for logging and error payloads.
    pub fn code(self) -> u32 {
        match self {
            Self::Okay => 0,
            Self::ParametersInvalid => 1,
            Self::BufferTooSmall => 2,
            Self::InvalidHandle => 3,
            Self::NetworkNotConnected => 4,
            Self::ChannelClosed => 5,
            Self::Unavailable => 6,
        }
    }
}

/// State of the network attachment as reported by the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetworkStatus {
    Connected,
    Connecting,
    Offline,
}

/// Parameters for registering a notification ring.
#[derive(Debug, Clone, Copy)]
pub struct NotificationSetup {
    /// Interrupt line the supervisor fires after writing a record.
    pub irq: u32,
    /// Ring capacity in records.
    pub records: usize,
}

/// Parameters for opening a request/response channel.
#[derive(Debug, Clone, Copy)]
pub struct ChannelParams {
    /// Ring that receives this channel's completion events.
    pub notification: NotificationHandle,
    /// Tag echoed back in this channel's notification records.
    pub notification_tag: u32,
    /// The network attachment to open the channel over.
    pub network: NetworkHandle,
    /// Receive buffer length in bytes.
    pub receive_buffer_len: usize,
    /// Send buffer length in bytes.
    pub send_buffer_len: usize,
    /// Endpoint string; empty for the generic HTTP channel type.
    pub endpoint: &'static str,
}

/// One HTTP request header line, e.g. `"Content-Type: application/json"`.
#[derive(Debug, Clone, Copy)]
pub struct HttpHeader<'a> {
    pub text: &'a str,
}

/// A complete HTTP request record handed to the supervisor.
#[derive(Debug, Clone, Copy)]
pub struct HttpRequest<'a> {
    pub method: &'a str,
    pub url: &'a str,
    pub headers: &'a [HttpHeader<'a>],
    pub body: &'a [u8],
    /// Supervisor-side timeout for the whole transaction, in milliseconds.
    pub timeout_ms: u32,
}

/// Result of the supervisor's own transport attempt. `0` means the
/// transaction completed and an HTTP status line was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransportResult(pub u32);

impl TransportResult {
    pub const OK: Self = Self(0);

    pub fn is_ok(self) -> bool {
        self.0 == 0
    }
}

/// Response metadata, fetched once the channel signals readable data.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HttpResponseData {
    pub result: TransportResult,
    pub status_code: u32,
    pub num_headers: u32,
    pub body_length: u32,
}

/// The supervisor syscall surface used by this firmware.
///
/// Calls must never be made from interrupt context; the host environment's
/// contract forbids it, which is why the interrupt handler only sets flags
/// for the worker thread to act on.
pub trait Supervisor {
    /// Register a notification ring serviced by the given interrupt line.
    fn notifications_setup(
        &mut self,
        setup: &NotificationSetup,
    ) -> Result<NotificationHandle, SvcStatus>;

    /// Request a network attachment. The attachment comes up
    /// asynchronously; poll [`network_status`](Supervisor::network_status)
    /// until it reports `Connected`.
    fn request_network(
        &mut self,
        notification: NotificationHandle,
        tag: u32,
    ) -> Result<NetworkHandle, SvcStatus>;

    /// Query the state of a network attachment.
    fn network_status(&mut self, network: NetworkHandle) -> Result<NetworkStatus, SvcStatus>;

    /// Open a request/response channel. Returns a nonzero handle on
    /// acceptance.
    fn channel_open(&mut self, params: &ChannelParams) -> Result<RawChannelHandle, SvcStatus>;

    /// Close a channel. On success the supervisor invalidates the handle
    /// in place, writing `0` through the reference — the caller must
    /// verify the postcondition.
    fn channel_close(&mut self, handle: &mut RawChannelHandle) -> SvcStatus;

    /// Issue one HTTP request on an open channel.
    fn http_send(&mut self, handle: RawChannelHandle, request: &HttpRequest<'_>) -> SvcStatus;

    /// Fetch response metadata from a readable channel.
    fn http_response_data(
        &mut self,
        handle: RawChannelHandle,
    ) -> Result<HttpResponseData, SvcStatus>;

    /// Copy `out.len()` bytes of response body, starting at `offset`.
    fn http_response_body(
        &mut self,
        handle: RawChannelHandle,
        offset: u32,
        out: &mut [u8],
    ) -> SvcStatus;
}
