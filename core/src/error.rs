//! Error types for the channel lifecycle core
//!
//! Two tiers. [`OpenError`] and [`SendError`] are recoverable: the worker
//! loop forces the channel closed and retries from a clean state on the
//! next read period. [`FatalFault`] marks an unrecoverable contract breach
//! with the supervisor; the top-level loop renders its code on the display
//! and halts scheduling — the core itself never terminates the process.

#![deny(unsafe_code)]

/// Failure to open the request/response channel. Recoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OpenError {
    /// The network attachment is not up yet (handle is zero). No
    /// supervisor call was made.
    NetworkNotReady,
    /// The supervisor rejected the open request with the given status code.
    Rejected(u32),
}

/// Failure to issue a request on an open channel. Recoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendError {
    /// No channel is open; the caller must open one first.
    NotOpen,
    /// A request is already in flight; one channel carries one request.
    RequestInFlight,
    /// The channel was closed on the remote side before the send.
    ChannelClosed,
    /// The supervisor rejected the request with the given status code.
    Rejected(u32),
}

/// An unrecoverable contract breach with the supervisor.
///
/// Each variant carries the numeric code shown on the local display
/// before the device halts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FatalFault {
    /// A channel close call returned something other than success or
    /// "already closed".
    ChannelNotClosed { status: u32 },
    /// The channel handle was not invalidated after a close call.
    ChannelHandleNotZero,
    /// The notification center could not be registered at startup.
    NotificationCenterNotOpen { status: u32 },
    /// The notification center could not be torn down.
    NotificationCenterNotClosed { status: u32 },
    /// The network attachment could not be requested.
    NetworkNotOpen { status: u32 },
    /// The network attachment could not be released.
    NetworkNotClosed { status: u32 },
}

impl FatalFault {
    /// The numeric code rendered on the 4-digit display.
    pub fn code(&self) -> u16 {
        match self {
            Self::ChannelNotClosed { .. } => 20,
            Self::ChannelHandleNotZero => 21,
            Self::NotificationCenterNotOpen { .. } => 30,
            Self::NotificationCenterNotClosed { .. } => 31,
            Self::NetworkNotOpen { .. } => 50,
            Self::NetworkNotClosed { .. } => 51,
        }
    }
}

impl core::fmt::Display for OpenError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NetworkNotReady => write!(f, "network not ready"),
            Self::Rejected(code) => write!(f, "channel open rejected (status {})", code),
        }
    }
}

impl core::fmt::Display for SendError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotOpen => write!(f, "no open channel"),
            Self::RequestInFlight => write!(f, "request already in flight"),
            Self::ChannelClosed => write!(f, "channel closed remotely"),
            Self::Rejected(code) => write!(f, "request rejected (status {})", code),
        }
    }
}

impl core::fmt::Display for FatalFault {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ChannelNotClosed { status } => {
                write!(f, "channel not closed (status {})", status)
            }
            Self::ChannelHandleNotZero => write!(f, "channel handle not zero after close"),
            Self::NotificationCenterNotOpen { status } => {
                write!(f, "notification center not opened (status {})", status)
            }
            Self::NotificationCenterNotClosed { status } => {
                write!(f, "notification center not closed (status {})", status)
            }
            Self::NetworkNotOpen { status } => {
                write!(f, "network not opened (status {})", status)
            }
            Self::NetworkNotClosed { status } => {
                write!(f, "network not closed (status {})", status)
            }
        }
    }
}

impl core::error::Error for OpenError {}
impl core::error::Error for SendError {}
impl core::error::Error for FatalFault {}
