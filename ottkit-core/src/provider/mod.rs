// Media Resolution
//
// Two-tier architecture:
//
// Tier 1: ottkit-client (transport)
//   - OttRequest, MultiRequestBuilder, RequestExecutor, HttpExecutor
//   - Builds and sends requests, never interprets bodies
//
// Tier 2: ottkit-core/provider (resolution pipeline)
//   - registry: payload shape -> typed domain object
//   - selector: server sources -> ranked playable sources
//   - phoenix: request orchestration and result assembly
//   - classify: backend error codes -> failure kinds

// Core traits and types
pub mod config;
pub mod error;
pub mod media;
pub mod models;
pub mod registry;
pub mod traits;

// Pipeline stages
pub mod classify;
pub mod selector;
pub mod session;

// MediaProvider implementations
pub mod phoenix;

pub use self::config::*;
pub use self::error::*;
pub use self::media::*;
pub use self::models::*;
pub use self::registry::*;
pub use self::traits::*;

pub use self::classify::{classify_backend_error, report_event, BackendEvent, OttErrorCode};
pub use self::phoenix::PhoenixMediaProvider;
pub use self::selector::{select_playable_sources, Selection, SourcePreference};
pub use self::session::AnonymousSession;
