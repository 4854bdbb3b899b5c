//! AWS-backed implementations of the collaborator traits.
//!
//! Each adapter is synchronous at its trait boundary and drives the async SDK
//! call on the current Tokio runtime, so binaries must use the multi-threaded
//! runtime.

pub mod glue;
pub mod http_response;
pub mod lake_formation;
pub mod sns;

pub(crate) fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
