//! Fixture-backed simulation harness for Tapo device testing.
//!
//! [`FakeProtocol`] implements the [`Protocol`](tapo_proto::Protocol)
//! contract against an in-memory state mapping instead of a network
//! connection, so device abstractions can be driven end to end without
//! hardware.
//!
//! # Architecture
//!
//! ```text
//! fixtures/*.json ──► FixtureLoader ──► StateMap ──► FakeProtocol
//!                     (shallow merge)                 │
//!                                      Command::parse ┤ route by method
//!                                                     ▼
//!                                          TapoResponse (error_code 0)
//! ```
//!
//! Hub children are plain entries of the same mapping keyed by
//! `{method}_{device_id}`; a `control_child` request is re-keyed and
//! dispatched like any top-level request.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
mod command;
mod fake_protocol;
mod fixture;

pub use command::Command;
pub use fake_protocol::{FAKE_PROTOCOL_NAME, FakeProtocol};
pub use fixture::{FIXTURES_DIR_ENV, FixtureConfig, FixtureError, FixtureLoader, StateMap};
