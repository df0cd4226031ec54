//! Scripted stand-in for the privileged supervisor.
//!
//! Accepts every call the way the real supervisor would, and models the
//! asynchronous parts with virtual time: the network comes up after a few
//! status polls, and each accepted request produces a readable-data event
//! a fixed latency later. The simulation loop collects due events with
//! [`SimSupervisor::take_due`] and plays them through the notification
//! ring, standing in for the interrupt the hardware would raise.

use std::collections::VecDeque;

use node_core::config::TAG_HTTP_OPEN_CHANNEL;
use node_core::notify::{NotificationRecord, EVENT_DATA_READABLE};
use node_core::supervisor::{
    ChannelParams, HttpRequest, HttpResponseData, NetworkHandle, NetworkStatus,
    NotificationHandle, NotificationSetup, RawChannelHandle, Supervisor, SvcStatus,
    TransportResult,
};

/// Virtual round-trip latency between a send and the readable event.
const RESPONSE_LATENCY_MS: u32 = 120;

/// Status polls the network attachment stays in `Connecting`.
const POLLS_UNTIL_CONNECTED: u32 = 3;

struct ScheduledEvent {
    due_ms: u32,
    record: NotificationRecord,
}

pub struct SimSupervisor {
    /// Virtual wall clock, advanced by the simulation loop each tick.
    pub now_ms: u32,

    events: VecDeque<ScheduledEvent>,
    response: Option<(HttpResponseData, Vec<u8>)>,
    status_polls: u32,
    next_channel: u32,
    next_notification: u32,
    next_network: u32,
}

impl SimSupervisor {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            events: VecDeque::new(),
            response: None,
            status_polls: 0,
            next_channel: 100,
            next_notification: 10,
            next_network: 40,
        }
    }

    /// Drain every scheduled event whose due time has passed.
    pub fn take_due(&mut self, now_ms: u32) -> Vec<NotificationRecord> {
        let mut due = Vec::new();
        while self.events.front().is_some_and(|e| e.due_ms <= now_ms) {
            if let Some(event) = self.events.pop_front() {
                due.push(event.record);
            }
        }
        due
    }
}

impl Supervisor for SimSupervisor {
    fn notifications_setup(
        &mut self,
        setup: &NotificationSetup,
    ) -> Result<NotificationHandle, SvcStatus> {
        log::debug!(
            "notification center: irq {}, {} record(s)",
            setup.irq,
            setup.records
        );
        let handle = NotificationHandle(self.next_notification);
        self.next_notification += 1;
        Ok(handle)
    }

    fn request_network(
        &mut self,
        _notification: NotificationHandle,
        _tag: u32,
    ) -> Result<NetworkHandle, SvcStatus> {
        self.status_polls = 0;
        let handle = NetworkHandle(self.next_network);
        self.next_network += 1;
        Ok(handle)
    }

    fn network_status(&mut self, _network: NetworkHandle) -> Result<NetworkStatus, SvcStatus> {
        if self.status_polls < POLLS_UNTIL_CONNECTED {
            self.status_polls += 1;
            return Ok(NetworkStatus::Connecting);
        }
        Ok(NetworkStatus::Connected)
    }

    fn channel_open(&mut self, params: &ChannelParams) -> Result<RawChannelHandle, SvcStatus> {
        if !params.network.is_attached() {
            return Err(SvcStatus::NetworkNotConnected);
        }
        let handle = self.next_channel;
        self.next_channel += 1;
        log::debug!("channel {} opened", handle);
        Ok(handle)
    }

    fn channel_close(&mut self, handle: &mut RawChannelHandle) -> SvcStatus {
        log::debug!("channel {} closed", *handle);
        *handle = 0;
        // Anything still in flight dies with the channel.
        self.events.clear();
        self.response = None;
        SvcStatus::Okay
    }

    fn http_send(&mut self, handle: RawChannelHandle, request: &HttpRequest<'_>) -> SvcStatus {
        if handle == 0 {
            return SvcStatus::InvalidHandle;
        }
        log::info!(
            "cloud <- {} {} {}",
            request.method,
            request.url,
            String::from_utf8_lossy(request.body)
        );

        let body = br#"{"ok":true}"#.to_vec();
        self.response = Some((
            HttpResponseData {
                result: TransportResult::OK,
                status_code: 200,
                num_headers: 1,
                body_length: body.len() as u32,
            },
            body,
        ));
        self.events.push_back(ScheduledEvent {
            due_ms: self.now_ms.wrapping_add(RESPONSE_LATENCY_MS),
            record: NotificationRecord {
                timestamp_us: u64::from(self.now_ms) * 1_000,
                event_kind: EVENT_DATA_READABLE,
                tag: TAG_HTTP_OPEN_CHANNEL,
            },
        });
        SvcStatus::Okay
    }

    fn http_response_data(
        &mut self,
        handle: RawChannelHandle,
    ) -> Result<HttpResponseData, SvcStatus> {
        if handle == 0 {
            return Err(SvcStatus::InvalidHandle);
        }
        match &self.response {
            Some((data, _)) => Ok(*data),
            None => Err(SvcStatus::Unavailable),
        }
    }

    fn http_response_body(
        &mut self,
        handle: RawChannelHandle,
        offset: u32,
        out: &mut [u8],
    ) -> SvcStatus {
        if handle == 0 {
            return SvcStatus::InvalidHandle;
        }
        match &self.response {
            Some((_, body)) => {
                let start = offset as usize;
                let end = start + out.len();
                if end > body.len() {
                    return SvcStatus::ParametersInvalid;
                }
                out.copy_from_slice(&body[start..end]);
                SvcStatus::Okay
            }
            None => SvcStatus::Unavailable,
        }
    }
}
