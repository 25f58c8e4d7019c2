//! # Outbound Ports
//!
//! The social posting collaborator and an observer for completed cycles.

use crate::domain::{CycleReport, PostError, PostedReply};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

/// Posts a reply to an existing social post.
#[async_trait]
pub trait ReplyPoster: Send + Sync {
    /// Replies to `target_post_id` with `text`.
    async fn post_reply(&self, target_post_id: &str, text: &str)
        -> Result<PostedReply, PostError>;
}

/// Notified after each poll cycle (metrics export).
pub trait CycleObserver: Send + Sync {
    /// Called once per completed cycle.
    fn on_cycle(&self, report: &CycleReport);
}

/// Observer that ignores every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl CycleObserver for NoopObserver {
    fn on_cycle(&self, _report: &CycleReport) {}
}

/// One scripted poster response.
#[derive(Debug, Clone)]
pub enum MockPostResponse {
    /// Succeed with a generated post id.
    Success,
    /// Fail with this error.
    Fail(PostError),
    /// Sleep, then succeed (exercises the post timeout).
    Delay(Duration),
}

/// Scripted poster recording every call.
///
/// Unscripted calls succeed with ids `reply-1`, `reply-2`, ...
#[derive(Debug, Default)]
pub struct MockReplyPoster {
    script: Mutex<VecDeque<MockPostResponse>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockReplyPoster {
    /// Poster that always succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response.
    pub fn push(&self, response: MockPostResponse) {
        self.script.lock().push_back(response);
    }

    /// Queues a failure.
    pub fn fail_next(&self, error: PostError) {
        self.push(MockPostResponse::Fail(error));
    }

    /// `(target, text)` of every call, in order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }

    /// Number of calls.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl ReplyPoster for MockReplyPoster {
    async fn post_reply(
        &self,
        target_post_id: &str,
        text: &str,
    ) -> Result<PostedReply, PostError> {
        let call_number = {
            let mut calls = self.calls.lock();
            calls.push((target_post_id.to_string(), text.to_string()));
            calls.len()
        };
        let response = self.script.lock().pop_front();

        match response {
            Some(MockPostResponse::Fail(err)) => Err(err),
            Some(MockPostResponse::Delay(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(PostedReply {
                    post_id: format!("reply-{}", call_number),
                })
            }
            Some(MockPostResponse::Success) | None => Ok(PostedReply {
                post_id: format!("reply-{}", call_number),
            }),
        }
    }
}
