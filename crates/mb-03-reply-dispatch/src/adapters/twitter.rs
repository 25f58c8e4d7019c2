//! X (Twitter) API v2 poster.
//!
//! `POST {base}/2/tweets` with an OAuth 2.0 user token. Rate-limit headers of
//! every response are logged; a warning fires when five or fewer calls
//! remain in the window.

use crate::domain::{PostError, PostedReply};
use crate::ports::ReplyPoster;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, warn};

/// Default API origin.
pub const DEFAULT_API_BASE: &str = "https://api.twitter.com";

/// Remaining-call count at or below which a warning is logged.
pub const LOW_RATE_LIMIT_THRESHOLD: u64 = 5;

/// Client settings.
#[derive(Debug, Clone)]
pub struct TwitterConfig {
    /// API origin, without trailing path.
    pub api_base: String,
    /// OAuth 2.0 user access token.
    pub access_token: String,
    /// Transport-level request timeout.
    pub request_timeout: Duration,
}

impl TwitterConfig {
    /// Config against the public API with a 30s timeout.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            access_token: access_token.into(),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Builder: overrides the API origin.
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    fn tweets_url(&self) -> String {
        format!("{}/2/tweets", self.api_base.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct ReplySettings<'a> {
    in_reply_to_tweet_id: &'a str,
}

#[derive(Serialize)]
struct CreateTweet<'a> {
    text: &'a str,
    reply: ReplySettings<'a>,
}

#[derive(Deserialize)]
struct CreateTweetResponse {
    data: CreatedTweet,
}

#[derive(Deserialize)]
struct CreatedTweet {
    id: String,
}

/// Rate-limit window reported in response headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Calls left in the window.
    pub remaining: Option<u64>,
    /// Window size.
    pub limit: Option<u64>,
    /// Unix seconds at which the window resets.
    pub reset_at: Option<u64>,
}

impl RateLimitInfo {
    /// Reads the `x-rate-limit-*` headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let read = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
        };
        Self {
            remaining: read("x-rate-limit-remaining"),
            limit: read("x-rate-limit-limit"),
            reset_at: read("x-rate-limit-reset"),
        }
    }

    /// True when the window is nearly used up.
    pub fn is_low(&self) -> bool {
        self.remaining
            .is_some_and(|remaining| remaining <= LOW_RATE_LIMIT_THRESHOLD)
    }

    fn log(&self, endpoint: &str) {
        if self.remaining.is_none() && self.limit.is_none() {
            return;
        }
        info!(
            endpoint,
            remaining = ?self.remaining,
            limit = ?self.limit,
            reset_at = ?self.reset_at,
            "[mb-03] Rate limit status"
        );
        if self.is_low() {
            warn!(
                endpoint,
                remaining = ?self.remaining,
                "[mb-03] Very low rate limit remaining"
            );
        }
    }
}

/// Maps a non-success response onto a `PostError`.
pub fn classify_response(status: u16, body: &str, reset_at: Option<u64>) -> PostError {
    let detail = body.to_ascii_lowercase();
    let message: String = body.chars().take(200).collect();

    if status != 429 {
        if detail.contains("duplicate") {
            return PostError::DuplicateContent;
        }
        if is_unavailable_target(&detail) {
            return PostError::TargetUnavailable(message);
        }
    }

    match status {
        401 | 403 => PostError::Unauthorized { status },
        404 => PostError::NotFound,
        429 => PostError::RateLimited { reset_at },
        _ => PostError::Service { status, message },
    }
}

fn is_unavailable_target(detail: &str) -> bool {
    [
        "deleted or not visible",
        "not allowed to reply",
        "reply to this conversation",
        "has been deleted",
    ]
    .iter()
    .any(|needle| detail.contains(needle))
}

/// `ReplyPoster` over the X API v2.
pub struct TwitterPoster {
    client: Client,
    config: TwitterConfig,
}

impl TwitterPoster {
    /// Create a new poster.
    pub fn new(config: TwitterConfig) -> Result<Self, PostError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| PostError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl ReplyPoster for TwitterPoster {
    async fn post_reply(
        &self,
        target_post_id: &str,
        text: &str,
    ) -> Result<PostedReply, PostError> {
        let body = CreateTweet {
            text,
            reply: ReplySettings {
                in_reply_to_tweet_id: target_post_id,
            },
        };

        let response = self
            .client
            .post(self.config.tweets_url())
            .bearer_auth(&self.config.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PostError::Timeout
                } else {
                    PostError::Transport(e.to_string())
                }
            })?;

        let rate_limit = RateLimitInfo::from_headers(response.headers());
        rate_limit.log("POST /2/tweets");

        let status = response.status();
        if status.is_success() {
            let created: CreateTweetResponse = response.json().await.map_err(|e| {
                PostError::Service {
                    status: status.as_u16(),
                    message: format!("unreadable response: {}", e),
                }
            })?;
            return Ok(PostedReply {
                post_id: created.data.id,
            });
        }

        let text = response.text().await.unwrap_or_default();
        let err = classify_response(status.as_u16(), &text, rate_limit.reset_at);
        error!(
            target_post = target_post_id,
            status = status.as_u16(),
            error = %err,
            "[mb-03] Reply post failed"
        );
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!("[mb-03] Authentication/authorization issue with the posting token");
        }
        Err(err)
    }
}
