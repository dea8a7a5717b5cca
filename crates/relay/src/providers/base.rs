use async_trait::async_trait;

use crate::errors::BackendResult;

/// A chat backend that turns one prompt into one complete reply.
///
/// Implementations send a single request, wait for the whole response and
/// return the aggregated text. Content-level problems never fail the call;
/// only transport, status and timeout problems do.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn complete(&self, prompt: &str) -> BackendResult<String>;
}
