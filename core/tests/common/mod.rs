//! Scripted test doubles for the supervisor and the hardware collaborators.

#![allow(dead_code)] // not every test file uses every double

use std::collections::VecDeque;

use hal_abstractions::{
    AccelSample, ClickEvents, MotionSensor, SegmentDisplay, TemperatureSensor,
};
use node_core::supervisor::{
    ChannelParams, HttpRequest, HttpResponseData, NetworkHandle, NetworkStatus,
    NotificationHandle, NotificationSetup, RawChannelHandle, Supervisor, SvcStatus,
    TransportResult,
};

/// A request as captured by the mock supervisor.
#[derive(Debug, Clone)]
pub struct SentRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<String>,
    pub body: Vec<u8>,
    pub timeout_ms: u32,
}

/// Scripted supervisor double. Every behavior knob defaults to "accept";
/// tests flip individual statuses to script rejections and faults.
pub struct MockSupervisor {
    pub setup_status: SvcStatus,
    pub open_status: SvcStatus,
    pub send_status: SvcStatus,
    pub close_status: SvcStatus,
    pub body_status: SvcStatus,
    /// Simulates a supervisor that breaks the close contract by leaving
    /// the handle nonzero.
    pub close_leaves_handle: bool,
    pub net_status: NetworkStatus,
    /// Metadata + body served once a channel is read.
    pub response: Option<(HttpResponseData, Vec<u8>)>,

    pub opens: usize,
    pub sends: usize,
    pub closes: usize,
    pub response_data_reads: usize,
    pub body_reads: usize,
    pub requests: Vec<SentRequest>,

    next_channel: u32,
    next_notification: u32,
    next_network: u32,
}

impl MockSupervisor {
    pub fn new() -> Self {
        Self {
            setup_status: SvcStatus::Okay,
            open_status: SvcStatus::Okay,
            send_status: SvcStatus::Okay,
            close_status: SvcStatus::Okay,
            body_status: SvcStatus::Okay,
            close_leaves_handle: false,
            net_status: NetworkStatus::Connected,
            response: None,
            opens: 0,
            sends: 0,
            closes: 0,
            response_data_reads: 0,
            body_reads: 0,
            requests: Vec::new(),
            next_channel: 100,
            next_notification: 10,
            next_network: 40,
        }
    }

    /// A completed exchange with the given HTTP status and body.
    pub fn http_response(status_code: u32, body: &[u8]) -> (HttpResponseData, Vec<u8>) {
        (
            HttpResponseData {
                result: TransportResult::OK,
                status_code,
                num_headers: 1,
                body_length: body.len() as u32,
            },
            body.to_vec(),
        )
    }

    /// A failed transport attempt with the given result code.
    pub fn transport_failure(code: u32) -> (HttpResponseData, Vec<u8>) {
        (
            HttpResponseData {
                result: TransportResult(code),
                status_code: 0,
                num_headers: 0,
                body_length: 0,
            },
            Vec::new(),
        )
    }

    pub fn last_request(&self) -> &SentRequest {
        self.requests.last().expect("no request was issued")
    }
}

impl Default for MockSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl Supervisor for MockSupervisor {
    fn notifications_setup(
        &mut self,
        _setup: &NotificationSetup,
    ) -> Result<NotificationHandle, SvcStatus> {
        if self.setup_status != SvcStatus::Okay {
            return Err(self.setup_status);
        }
        let handle = NotificationHandle(self.next_notification);
        self.next_notification += 1;
        Ok(handle)
    }

    fn request_network(
        &mut self,
        _notification: NotificationHandle,
        _tag: u32,
    ) -> Result<NetworkHandle, SvcStatus> {
        let handle = NetworkHandle(self.next_network);
        self.next_network += 1;
        Ok(handle)
    }

    fn network_status(&mut self, _network: NetworkHandle) -> Result<NetworkStatus, SvcStatus> {
        Ok(self.net_status)
    }

    fn channel_open(&mut self, params: &ChannelParams) -> Result<RawChannelHandle, SvcStatus> {
        self.opens += 1;
        assert!(params.network.is_attached(), "open with zero network handle");
        if self.open_status != SvcStatus::Okay {
            return Err(self.open_status);
        }
        let handle = self.next_channel;
        self.next_channel += 1;
        Ok(handle)
    }

    fn channel_close(&mut self, handle: &mut RawChannelHandle) -> SvcStatus {
        self.closes += 1;
        match self.close_status {
            SvcStatus::Okay | SvcStatus::ChannelClosed if !self.close_leaves_handle => {
                *handle = 0;
            }
            _ => {}
        }
        self.close_status
    }

    fn http_send(&mut self, _handle: RawChannelHandle, request: &HttpRequest<'_>) -> SvcStatus {
        self.sends += 1;
        if self.send_status == SvcStatus::Okay {
            self.requests.push(SentRequest {
                method: request.method.to_owned(),
                url: request.url.to_owned(),
                headers: request.headers.iter().map(|h| h.text.to_owned()).collect(),
                body: request.body.to_vec(),
                timeout_ms: request.timeout_ms,
            });
        }
        self.send_status
    }

    fn http_response_data(
        &mut self,
        _handle: RawChannelHandle,
    ) -> Result<HttpResponseData, SvcStatus> {
        self.response_data_reads += 1;
        match &self.response {
            Some((data, _)) => Ok(*data),
            None => Err(SvcStatus::Unavailable),
        }
    }

    fn http_response_body(
        &mut self,
        _handle: RawChannelHandle,
        offset: u32,
        out: &mut [u8],
    ) -> SvcStatus {
        self.body_reads += 1;
        if self.body_status != SvcStatus::Okay {
            return self.body_status;
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

/// Always-present thermometer reporting a fixed value.
pub struct FakeThermometer(pub f64);

impl TemperatureSensor for FakeThermometer {
    fn init(&mut self) -> bool {
        true
    }

    fn read(&mut self) -> f64 {
        self.0
    }
}

/// A thermometer that never acknowledges.
pub struct AbsentThermometer;

impl TemperatureSensor for AbsentThermometer {
    fn init(&mut self) -> bool {
        false
    }

    fn read(&mut self) -> f64 {
        unreachable!("read on absent sensor")
    }
}

/// Motion sensor with a scripted queue of click events.
#[derive(Default)]
pub struct FakeMotion {
    pub clicks: VecDeque<ClickEvents>,
}

impl FakeMotion {
    pub fn queue_double_tap(&mut self) {
        self.clicks.push_back(ClickEvents {
            single: false,
            double: true,
            axes: 0b0100,
        });
    }
}

impl MotionSensor for FakeMotion {
    fn init(&mut self) -> bool {
        true
    }

    fn read_accel(&mut self) -> AccelSample {
        AccelSample::default()
    }

    fn poll_clicks(&mut self) -> ClickEvents {
        self.clicks.pop_front().unwrap_or_default()
    }
}

/// Display double that records every call for assertions.
#[derive(Default)]
pub struct RecordingDisplay {
    pub shown: Vec<(u16, bool)>,
    pub alphas: Vec<(char, usize, bool)>,
    pub points: Vec<(usize, bool)>,
    pub clears: usize,
    pub draws: usize,
}

impl SegmentDisplay for RecordingDisplay {
    fn show_value(&mut self, value: u16, decimal: bool) {
        self.shown.push((value, decimal));
    }

    fn set_alpha(&mut self, ch: char, digit: usize, dot: bool) {
        self.alphas.push((ch, digit, dot));
    }

    fn set_point(&mut self, digit: usize, on: bool) {
        self.points.push((digit, on));
    }

    fn clear(&mut self) {
        self.clears += 1;
    }

    fn draw(&mut self) {
        self.draws += 1;
    }
}
