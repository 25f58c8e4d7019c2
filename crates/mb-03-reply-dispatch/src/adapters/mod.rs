//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements the `ReplyPoster` outbound port.

mod twitter;

pub use twitter::{
    classify_response, RateLimitInfo, TwitterConfig, TwitterPoster, DEFAULT_API_BASE,
    LOW_RATE_LIMIT_THRESHOLD,
};
