// OTTKit Core
//
// Turns a Phoenix (OTT) playback context into a player-ready media
// description: payload parsing, source selection, request orchestration and
// error classification. Requests are sent through `ottkit-client`.

pub mod config;
pub mod logging;
pub mod provider;

pub use crate::config::Config;
pub use provider::{
    MediaDescription, MediaProvider, MediaProviderConfig, PhoenixMediaProvider, ResolveError,
};
