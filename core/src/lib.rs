//! Platform-agnostic core logic for the sensor-node firmware
//!
//! This crate owns the single piece of the firmware with real state-machine
//! and concurrency concerns: the lifecycle of the supervisor-provided HTTP
//! channel. A request/response channel is single-use by construction — it
//! is opened, carries exactly one request, and is closed again either after
//! the response has been consumed or after the local kill-timer expires.
//!
//! The crate is split along the hardware boundaries:
//! - **`supervisor`**: the privileged supervisor's syscall surface as a trait
//! - **`notify`**: notification ring + the interrupt-to-thread event latch
//! - **`channel`**: the channel open/send/close state machine
//! - **`http`**: request payload building and response reading
//! - **`net`**: the one-time network-attach procedure
//! - **`worker`**: the cooperative tick loop tying everything together
//! - **`config`**, **`error`**: periods, buffer sizes, and the two error tiers
//!
//! No allocator, no mutexes: every shared variable has a single designated
//! writer, and the only interrupt/thread crossing is the pair of one-way
//! atomic flags in [`notify::EventLatch`].

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// This module must come first so the others see its macros.
pub(crate) mod fmt;

pub mod channel;
pub mod config;
pub mod error;
pub mod http;
pub mod net;
pub mod notify;
pub mod supervisor;
pub mod worker;

pub use channel::ChannelManager;
pub use config::NodeConfig;
pub use error::{FatalFault, OpenError, SendError};
pub use http::ResponseOutcome;
pub use net::NetworkLink;
pub use notify::{EventLatch, NotificationRing};
pub use supervisor::Supervisor;
pub use worker::WorkerLoop;
