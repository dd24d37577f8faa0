// Media Provider Traits
//
// Core interface for resolving an asset into player-ready media

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::{MediaDescription, MediaProviderConfig, ResolveError};

/// Media provider trait
///
/// A provider may be shared between tasks and called concurrently; each
/// `load_media` call keeps its own state.
#[async_trait]
pub trait MediaProvider: Send + Sync {
    /// Provider type name (e.g., "phoenix")
    fn name(&self) -> &'static str;

    /// Resolve the configured asset into a media description
    ///
    /// Completes exactly once with either a description holding at least
    /// one source or a single classified failure. `cancel` is honored only
    /// before the first request is dispatched.
    async fn load_media(
        &self,
        config: &MediaProviderConfig,
        cancel: &CancellationToken,
    ) -> Result<MediaDescription, ResolveError>;

    /// Ask the provider to stop in-flight work
    ///
    /// Providers are not required to abort anything; callers must not rely
    /// on this stopping a request that is already on the wire.
    fn cancel(&self) {}
}
