//! Replay recorded requests against a simulated device.
//!
//! A replay loads fixtures into a [`FakeProtocol`], sends every request from
//! a JSON array through the [`Protocol`] contract in order, and writes one
//! JSON line per request. Requests share state, so a `set_device_info` early
//! in the file is visible to later queries.
//!
//! # Output
//!
//! ```text
//! {"method":"set_device_info","response":{"error_code":0,"result":{},"msg":""}}
//! {"method":"set_unknown","error":"no state entry for get_unknown"}
//! {"state":{...}}            (only with dump_state)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use serde::Serialize;
use tapo_harness::{FakeProtocol, FixtureConfig, FixtureError, FixtureLoader, StateMap};
use tapo_proto::{DEFAULT_RETRIES, Protocol, ProtocolError, TapoRequest, TapoResponse};
use thiserror::Error;

/// Replay run configuration.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Where fixture names are resolved.
    pub fixtures: FixtureConfig,
    /// Fixtures merged in order to seed the device.
    pub fixture_names: Vec<PathBuf>,
    /// JSON file holding an array of requests.
    pub requests_path: PathBuf,
    /// Retry budget passed with every request.
    pub retry: u32,
    /// Write the final state mapping after the last response.
    pub dump_state: bool,
}

impl ReplayConfig {
    /// Configuration with default fixtures directory and retry budget.
    pub fn new(fixture_names: Vec<PathBuf>, requests_path: impl Into<PathBuf>) -> Self {
        Self {
            fixtures: FixtureConfig::default(),
            fixture_names,
            requests_path: requests_path.into(),
            retry: DEFAULT_RETRIES,
            dump_state: false,
        }
    }
}

/// Counts from a finished replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Requests sent.
    pub sent: usize,
    /// Requests answered with an error.
    pub failed: usize,
}

impl ReplaySummary {
    /// True if every request succeeded.
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Errors that abort a replay.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Fixtures could not be loaded.
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    /// Request file could not be read.
    #[error("failed to read requests {}: {source}", path.display())]
    ReadRequests {
        /// Request file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Request file is not a JSON array of requests.
    #[error("failed to parse requests {}: {source}", path.display())]
    ParseRequests {
        /// Request file path.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Output line could not be encoded.
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),

    /// Output could not be written.
    #[error("failed to write output: {0}")]
    Write(#[from] io::Error),

    /// Protocol teardown failed.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

#[derive(Serialize)]
struct ResponseLine<'a> {
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<&'a TapoResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct StateLine<'a> {
    state: &'a StateMap,
}

/// Read a JSON array of requests.
pub fn load_requests(path: &Path) -> Result<Vec<TapoRequest>, ReplayError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ReplayError::ReadRequests { path: path.to_path_buf(), source })?;
    serde_json::from_str(&raw)
        .map_err(|source| ReplayError::ParseRequests { path: path.to_path_buf(), source })
}

/// Send `requests` in order, writing one line per answer.
///
/// Request failures are reported in the output and counted; they do not
/// stop the replay.
pub async fn replay<P, W>(
    protocol: &mut P,
    requests: Vec<TapoRequest>,
    retry: u32,
    out: &mut W,
) -> Result<ReplaySummary, ReplayError>
where
    P: Protocol + ?Sized,
    W: Write,
{
    let mut summary = ReplaySummary::default();

    for request in requests {
        let method = request.method.clone();
        summary.sent += 1;

        match protocol.send(request, retry).await {
            Ok(response) => {
                let line = ResponseLine { method: &method, response: Some(&response), error: None };
                write_line(out, &line)?;
            },
            Err(err) => {
                tracing::warn!(
                    %method,
                    error = %err,
                    authoring_bug = err.is_authoring_bug(),
                    "request failed"
                );
                summary.failed += 1;
                write_line(
                    out,
                    &ResponseLine { method: &method, response: None, error: Some(err.to_string()) },
                )?;
            },
        }
    }

    Ok(summary)
}

/// [`replay`], then close `protocol` whether or not the replay finished.
///
/// A replay error takes precedence over a close error.
pub async fn replay_and_close<P, W>(
    protocol: &mut P,
    requests: Vec<TapoRequest>,
    retry: u32,
    out: &mut W,
) -> Result<ReplaySummary, ReplayError>
where
    P: Protocol + ?Sized,
    W: Write,
{
    let replayed = replay(protocol, requests, retry, out).await;
    let closed = protocol.close().await;

    let summary = replayed?;
    closed?;
    Ok(summary)
}

/// Load fixtures and requests per `config`, replay them, then close.
pub async fn run<W: Write>(
    config: &ReplayConfig,
    out: &mut W,
) -> Result<ReplaySummary, ReplayError> {
    let loader = FixtureLoader::new(config.fixtures.clone());
    let mut protocol = FakeProtocol::from_fixtures(&loader, &config.fixture_names)?;
    let requests = load_requests(&config.requests_path)?;

    tracing::info!(
        protocol = protocol.name(),
        fixtures = config.fixture_names.len(),
        requests = requests.len(),
        "starting replay"
    );

    let summary = replay_and_close(&mut protocol, requests, config.retry, out).await?;

    if config.dump_state {
        write_line(out, &StateLine { state: &protocol.into_state() })?;
    }

    tracing::info!(sent = summary.sent, failed = summary.failed, "replay finished");
    Ok(summary)
}

fn write_line<W: Write, T: Serialize>(out: &mut W, line: &T) -> Result<(), ReplayError> {
    let mut encoded = serde_json::to_vec(line)?;
    encoded.push(b'\n');
    out.write_all(&encoded)?;
    Ok(())
}
