//! Tapo device control protocol types.
//!
//! Wire-level request and response shapes plus the [`Protocol`] contract that
//! device abstractions talk to. Real transports (KLAP, passthrough) and the
//! simulated protocol in `tapo-harness` both implement [`Protocol`], so device
//! code can be exercised without hardware by swapping the implementation at
//! connection time.
//!
//! # Components
//!
//! - [`TapoRequest`]: Method name plus structured params
//! - [`TapoResponse`]: `{error_code, result, msg}` envelope
//! - [`ControlChildResult`]: Nested envelope returned for hub child requests
//! - [`ProtocolResult`]: Success/failure wrapper composed with `and_then`

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod protocol;
pub mod request;
pub mod response;

pub use error::{ProtocolError, ProtocolResult};
pub use protocol::{DEFAULT_RETRIES, Protocol};
pub use request::{
    ControlChildParams, MultipleRequestParams, PaginationParams, RequestParams, TapoRequest,
};
pub use response::{
    ChildResponse, ChildResponseData, ControlChildResult, MultipleResponse, TapoResponse,
};
