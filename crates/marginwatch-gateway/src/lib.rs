//! # marginwatch-gateway
//!
//! HTTP implementations of the feed and analysis boundaries.
//!
//! - [`HttpFeedClient`]: authenticates against the account feed and pulls
//!   every LP account in one request.
//! - [`HttpAnalysisClient`]: posts initial and recheck requests to the
//!   analysis engine.
//!
//! Payload decoding lives in [`decode`] so it can be exercised without a
//! network.

pub mod analysis;
pub mod decode;
pub mod feed;

pub use analysis::HttpAnalysisClient;
pub use decode::{decode_accounts, decode_analysis_response};
pub use feed::HttpFeedClient;
