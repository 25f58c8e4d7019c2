//! # Backoff Governor
//!
//! Cooldown window opened by upstream quota or rate-limit responses.
//!
//! ```text
//! [OPEN] ──trigger(now)──→ [COOLING: until now + d] ──now ≥ until──→ [OPEN, d kept]
//!    ↑                           │
//!    └───────── reset() ─────────┘        next trigger: d = min(d * 2, cap)
//! ```
//!
//! The duration survives the end of a cooldown; only a successful
//! non-fallback generation resets it to zero.

/// Cooldown applied on the first trigger.
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 60_000;

/// Upper bound for the cooldown.
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 300_000;

/// Governor tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffConfig {
    /// First cooldown duration.
    pub initial_ms: u64,
    /// Cap on the cooldown duration.
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_ms: DEFAULT_INITIAL_BACKOFF_MS,
            max_ms: DEFAULT_MAX_BACKOFF_MS,
        }
    }
}

/// Cooldown state. Mutated only through the governor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackoffState {
    /// Millisecond timestamp at which the current cooldown ends.
    pub cooldown_until_ms: u64,
    /// Current cooldown length; 0 when the governor is reset.
    pub cooldown_duration_ms: u64,
}

/// Tracks the shared cooldown for the generation backend.
#[derive(Debug, Clone, Default)]
pub struct BackoffGovernor {
    config: BackoffConfig,
    state: BackoffState,
    triggers: u64,
}

impl BackoffGovernor {
    /// Governor with the given tuning.
    pub fn new(config: BackoffConfig) -> Self {
        Self {
            config,
            state: BackoffState::default(),
            triggers: 0,
        }
    }

    /// True while a cooldown is active at `now_ms`.
    pub fn is_cooling_down(&self, now_ms: u64) -> bool {
        self.state.cooldown_duration_ms > 0 && now_ms < self.state.cooldown_until_ms
    }

    /// Milliseconds left in the active cooldown, 0 when none.
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        if self.is_cooling_down(now_ms) {
            self.state.cooldown_until_ms - now_ms
        } else {
            0
        }
    }

    /// Opens a cooldown starting at `now_ms`; returns its duration.
    pub fn trigger(&mut self, now_ms: u64) -> u64 {
        let duration = if self.state.cooldown_duration_ms > 0 {
            self.state.cooldown_duration_ms.saturating_mul(2)
        } else {
            self.config.initial_ms
        }
        .min(self.config.max_ms);

        self.state = BackoffState {
            cooldown_until_ms: now_ms.saturating_add(duration),
            cooldown_duration_ms: duration,
        };
        self.triggers += 1;
        duration
    }

    /// Clears the cooldown and its duration.
    pub fn reset(&mut self) {
        self.state = BackoffState::default();
    }

    /// Current state snapshot.
    pub fn state(&self) -> BackoffState {
        self.state
    }

    /// Number of triggers since creation.
    pub fn trigger_count(&self) -> u64 {
        self.triggers
    }
}
