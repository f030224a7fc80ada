use std::future::Future;

use crate::core::errors::Result;
use crate::core::models::request::{HttpResponse, OutboundRequest};

/// Port for the raw HTTP call.
///
/// Any response the server produced, whatever its status, is `Ok`.
/// Only failures to obtain a response (connect errors, timeouts) are `Err`,
/// reported as `VerseError::Transport`.
pub trait Transport: Send + Sync {
    fn call(&self, request: OutboundRequest) -> impl Future<Output = Result<HttpResponse>> + Send;
}
