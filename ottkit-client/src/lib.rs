// OTTKit Backend Clients
//
// This crate is the transport side of media resolution: it knows how to
// build Phoenix (OTT) API requests, bundle them into multi-requests and send
// them. It never interprets response bodies beyond size limits and HTTP status.
//
// Architecture:
// - ottkit-client: request types, service request builders, RequestExecutor + HttpExecutor
// - ottkit-core/provider: response parsing, source selection, playback orchestration

// Shared error types
pub mod error;

// Phoenix (OTT) backend
pub mod phoenix;

// Re-export client types for convenience
pub use error::ClientError;
pub use phoenix::{
    AssetType, HttpExecutor, MultiRequestBuilder, OttRequest, PlaybackContextOptions,
    PlaybackContextType, Request, RequestExecutor,
};
