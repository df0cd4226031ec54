//! Node configuration structures and buffer-size constants

#![deny(unsafe_code)]

/// Records held by the channel notification ring. Size in records, not bytes.
pub const NOTIFICATION_RING_RECORDS: usize = 8;

/// Channel receive buffer length in bytes.
pub const RX_BUFFER_LEN: usize = 1536;

/// Channel send buffer length in bytes.
pub const TX_BUFFER_LEN: usize = 512;

/// Notification tag carried by channel-open requests.
pub const TAG_HTTP_OPEN_CHANNEL: u32 = 3;

/// Notification tag carried by the network-attach request.
pub const TAG_REQUEST_NETWORK: u32 = 1;

/// Worker-loop and reporting cadence configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Cloud endpoint for telemetry and alert POSTs.
    pub endpoint_url: &'static str,
    /// How often a reading is reported upstream, in milliseconds.
    pub read_period_ms: u32,
    /// Local deadline after which an unanswered request's channel is
    /// forcibly closed. Must exceed `request_timeout_ms` so the supervisor
    /// gets first say.
    pub kill_period_ms: u32,
    /// Per-request timeout handed to the supervisor, in milliseconds.
    pub request_timeout_ms: u32,
    /// Worker-loop tick, in milliseconds.
    pub tick_ms: u32,
    /// Display/LED refresh cadence, in milliseconds.
    pub display_refresh_ms: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            endpoint_url: "https://example.com/telemetry",
            read_period_ms: 60_000,
            kill_period_ms: 15_000,
            request_timeout_ms: 10_000,
            tick_ms: 10,
            display_refresh_ms: 500,
        }
    }
}
