//! Protocol abstraction for device I/O.
//!
//! The `Protocol` trait is the only surface device abstractions use to talk
//! to a device. This allows the same device logic to run over:
//!
//! - **KLAP / passthrough transports** (production, real network waits)
//! - **Fixture-backed simulation** (tests, no I/O at all)
//!
//! The implementation is chosen when the connection is established, so tests
//! inject a simulator there and nothing downstream changes.

use async_trait::async_trait;

use crate::{ProtocolResult, TapoRequest, TapoResponse};

/// Retry budget real clients pass by default.
pub const DEFAULT_RETRIES: u32 = 3;

/// Request/response channel to a single device.
///
/// # Implementations
///
/// - Network transports: encrypt, send, await the reply, retry up to `retry`
///   times on transient failure
/// - `FakeProtocol` (tapo-harness): answers from an in-memory state mapping
#[async_trait]
pub trait Protocol: Send {
    /// Human-readable protocol name, for logs.
    fn name(&self) -> &str;

    /// Sends a request and waits for the device response.
    ///
    /// `retry` bounds how many times a transient failure is retried.
    /// Implementations that cannot fail transiently may ignore it.
    async fn send(&mut self, request: TapoRequest, retry: u32) -> ProtocolResult<TapoResponse>;

    /// Tears down the underlying channel.
    async fn close(&mut self) -> ProtocolResult<()>;
}
