//! # Outbound Ports
//!
//! Dependencies of the reply generators: the generation backend and a
//! time source. Mocks live next to the traits so downstream crates can use
//! them in their own tests.

use crate::domain::{GenerationContext, GenerationError};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

/// Response of the generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeneratedText {
    /// Generated text, if any.
    #[serde(default)]
    pub text: Option<String>,
    /// Set when the backend itself fell back to canned text.
    #[serde(default)]
    pub fallback: bool,
}

impl GeneratedText {
    /// A real (non-fallback) generation.
    pub fn generated(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            fallback: false,
        }
    }

    /// A backend-side fallback.
    pub fn fallback(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            fallback: true,
        }
    }

    /// Usable text, present only for non-fallback, non-blank responses.
    pub fn usable_text(&self) -> Option<&str> {
        if self.fallback {
            return None;
        }
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// Text-in, text-out generation service.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Requests text for `action` given `context`.
    async fn generate(
        &self,
        action: &str,
        context: &GenerationContext,
    ) -> Result<GeneratedText, GenerationError>;
}

/// Millisecond clock, abstracted for deterministic tests.
pub trait TimeSource: Send + Sync {
    /// Current time in milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Manually advanced clock.
#[derive(Debug, Default)]
pub struct MockTimeSource {
    time: AtomicU64,
}

impl MockTimeSource {
    /// Clock starting at `initial` ms.
    pub fn new(initial: u64) -> Self {
        Self {
            time: AtomicU64::new(initial),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, ms: u64) {
        self.time.fetch_add(ms, Ordering::SeqCst);
    }

    /// Sets the clock.
    pub fn set(&self, ms: u64) {
        self.time.store(ms, Ordering::SeqCst);
    }
}

impl TimeSource for MockTimeSource {
    fn now_ms(&self) -> u64 {
        self.time.load(Ordering::SeqCst)
    }
}

/// Scripted generation backend.
///
/// Pops one scripted response per call; once the script is empty every call
/// returns `GeneratedText::generated(default_text)`.
pub struct MockGenerationBackend {
    script: Mutex<VecDeque<Result<GeneratedText, GenerationError>>>,
    default_text: String,
    calls: Mutex<Vec<(String, GenerationContext)>>,
}

impl Default for MockGenerationBackend {
    fn default() -> Self {
        Self::new("Your payment is on its way")
    }
}

impl MockGenerationBackend {
    /// Backend answering `default_text` when unscripted.
    pub fn new(default_text: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default_text: default_text.into(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queues a response.
    pub fn push_response(&self, response: Result<GeneratedText, GenerationError>) {
        self.script.lock().push_back(response);
    }

    /// Number of calls received.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Context of the most recent call.
    pub fn last_context(&self) -> Option<GenerationContext> {
        self.calls.lock().last().map(|(_, ctx)| ctx.clone())
    }

    /// Action of the most recent call.
    pub fn last_action(&self) -> Option<String> {
        self.calls.lock().last().map(|(action, _)| action.clone())
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn generate(
        &self,
        action: &str,
        context: &GenerationContext,
    ) -> Result<GeneratedText, GenerationError> {
        self.calls
            .lock()
            .push((action.to_string(), context.clone()));
        match self.script.lock().pop_front() {
            Some(response) => response,
            None => Ok(GeneratedText::generated(self.default_text.clone())),
        }
    }
}
