//! Request payload building and response reading
//!
//! The wire protocol itself lives in the supervisor; this module only
//! formats the JSON bodies the node sends and converts the supervisor's
//! buffered response into a structured outcome. Reading never retries —
//! retry policy belongs to the worker loop, which answers every outcome
//! (good or bad) by closing the single-use channel.

#![deny(unsafe_code)]

use core::fmt::Write;

use heapless::{String, Vec};

use crate::config::RX_BUFFER_LEN;
use crate::supervisor::{RawChannelHandle, Supervisor, SvcStatus};

/// Fixed body for the motion alert push.
pub const WARNING_MOVEMENT: &str = "movement detected";

/// Structured result of one request/response exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// Transport succeeded and the server answered 200.
    Success {
        status_code: u32,
        body: Vec<u8, RX_BUFFER_LEN>,
    },
    /// The supervisor's transport attempt failed, or the response could
    /// not be fetched from the channel.
    TransportError { code: u32 },
    /// Transport succeeded but the server answered with a non-200 status.
    ApplicationError { status_code: u32 },
}

/// Format the telemetry body, e.g. `{"temp":23.45}`.
///
/// Fails only if the rendered value exceeds the buffer, which a sane
/// sensor reading never does.
pub fn telemetry_body(temp: f64) -> Result<String<48>, core::fmt::Error> {
    let mut body = String::new();
    write!(body, "{{\"temp\":{:.2}}}", temp)?;
    Ok(body)
}

/// Format an alert body, e.g. `{"warning":"movement detected"}`.
pub fn warning_body(reason: &str) -> Result<String<64>, core::fmt::Error> {
    let mut body = String::new();
    write!(body, "{{\"warning\":\"{}\"}}", reason)?;
    Ok(body)
}

/// Convert a readable channel's buffered response into an outcome.
///
/// Fetches metadata first, then the body. Every supervisor failure along
/// the way is reported as `TransportError` with the status code; nothing
/// here panics or retries.
pub fn read_response<S: Supervisor>(sv: &mut S, handle: RawChannelHandle) -> ResponseOutcome {
    let data = match sv.http_response_data(handle) {
        Ok(data) => data,
        Err(status) => {
            error!("response data read failed, status: {}", status.code());
            return ResponseOutcome::TransportError {
                code: status.code(),
            };
        }
    };

    debug!(
        "response: transport {}, status {}, {} header(s), {} body byte(s)",
        data.result.0,
        data.status_code,
        data.num_headers,
        data.body_length
    );

    if !data.result.is_ok() {
        return ResponseOutcome::TransportError { code: data.result.0 };
    }

    if data.status_code != 200 {
        return ResponseOutcome::ApplicationError {
            status_code: data.status_code,
        };
    }

    // Body plus a terminating sentinel byte must fit the receive buffer.
    let body_len = data.body_length as usize;
    if body_len >= RX_BUFFER_LEN {
        return ResponseOutcome::TransportError {
            code: SvcStatus::BufferTooSmall.code(),
        };
    }

    let mut body: Vec<u8, RX_BUFFER_LEN> = Vec::new();
    if body.resize_default(body_len).is_err() {
        return ResponseOutcome::TransportError {
            code: SvcStatus::BufferTooSmall.code(),
        };
    }

    match sv.http_response_body(handle, 0, &mut body) {
        SvcStatus::Okay => ResponseOutcome::Success {
            status_code: data.status_code,
            body,
        },
        status => {
            error!("response body read failed, status: {}", status.code());
            ResponseOutcome::TransportError {
                code: status.code(),
            }
        }
    }
}
