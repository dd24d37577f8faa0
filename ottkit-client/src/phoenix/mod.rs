//! Phoenix (OTT) Backend Client
//!
//! Request builders and executors for the Phoenix REST API. Responses are
//! returned as raw bytes; parsing belongs to `ottkit-core`.
//!
//! # Example
//!
//! ```no_run
//! use ottkit_client::phoenix::{ott_user, HttpExecutor, RequestExecutor};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let executor = HttpExecutor::new();
//! let request = ott_user::anonymous_login("https://ott.example.com/api_v3", 198, None);
//! let body = executor.send(&request.into()).await?;
//! # Ok(())
//! # }
//! ```

mod executor;
pub mod request;
pub mod services;

pub use executor::{HttpExecutor, RequestExecutor};
pub use request::{result_reference, MultiRequest, MultiRequestBuilder, OttRequest, Request};
pub use services::{asset, ott_user, AssetType, PlaybackContextOptions, PlaybackContextType};
