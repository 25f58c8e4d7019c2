//! # Service Configuration
//!
//! Environment-driven configuration for the reply service.
//!
//! ## Rules
//!
//! - Unset variable: the documented default applies
//! - Set but unparsable or out of range: [`ConfigError::InvalidValue`]
//! - Required credential unset or empty: [`ConfigError::Missing`]

use mb_01_reply_ledger::adapters::DEFAULT_TABLE;
use mb_01_reply_ledger::{LedgerConfig, DEFAULT_BATCH_SIZE, DEFAULT_MAX_RETRIES};
use mb_02_reply_content::{ChainLabels, GenerativeConfig, HttpBackendConfig, OutcomeClassifier};
use mb_03_reply_dispatch::adapters::DEFAULT_API_BASE;
use mb_03_reply_dispatch::{DispatchConfig, SentinelPolicy};
use shared_types::{DEFAULT_CHAIN, DEFAULT_SUCCESS_PREFIX, DEFAULT_TOKEN};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Default health/metrics port.
pub const DEFAULT_PORT: u16 = 3000;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but its value is not acceptable.
    #[error("Invalid value for {key}: {value:?} ({expected})")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Raw value.
        value: String,
        /// What would have been accepted.
        expected: &'static str,
    },

    /// A required variable is unset or empty.
    #[error("Missing required variable {key} ({context})")]
    Missing {
        /// Variable name.
        key: &'static str,
        /// Why it is needed.
        context: &'static str,
    },
}

/// How reply text is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyStrategy {
    /// Rotating template banks only.
    #[default]
    Template,
    /// Generation backend with template fallback.
    Generative,
}

impl FromStr for ReplyStrategy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "template" => Ok(ReplyStrategy::Template),
            "generative" => Ok(ReplyStrategy::Generative),
            _ => Err(()),
        }
    }
}

/// Where transaction records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedgerBackend {
    /// Supabase PostgREST table.
    #[default]
    Supabase,
    /// Process-local store for dry runs, optionally seeded from
    /// `LEDGER_SEED_FILE`. Nothing is persisted.
    Memory,
}

impl FromStr for LedgerBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "supabase" => Ok(LedgerBackend::Supabase),
            "memory" => Ok(LedgerBackend::Memory),
            _ => Err(()),
        }
    }
}

/// Supabase credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseSettings {
    /// Project URL.
    pub url: String,
    /// Service role key used for ledger reads/writes.
    pub service_key: String,
    /// Ledger table.
    pub table: String,
}

/// Generation backend endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerativeSettings {
    /// Function URL.
    pub url: String,
    /// Anonymous key sent as bearer token.
    pub anon_key: String,
}

/// Complete service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyConfig {
    /// Pause between polls.
    pub poll_interval: Duration,
    /// Recoverable failures allowed per record.
    pub max_retries: u32,
    /// Records fetched per poll.
    pub batch_size: usize,
    /// Pause after a successful post when more records remain.
    pub post_pacing: Duration,
    /// Deadline for one post call.
    pub post_timeout: Duration,
    /// Health/metrics port.
    pub port: u16,
    /// Chain served.
    pub chain: String,
    /// Token label.
    pub token: String,
    /// Outcome-code prefix of a settled payment.
    pub success_prefix: String,
    /// Content strategy.
    pub strategy: ReplyStrategy,
    /// Handling of upstream sentinel codes.
    pub sentinel_policy: SentinelPolicy,
    /// Ledger backend.
    pub ledger_backend: LedgerBackend,
    /// Present when `ledger_backend` is Supabase.
    pub supabase: Option<SupabaseSettings>,
    /// JSON array of table rows loaded into the memory ledger at startup.
    pub memory_seed: Option<PathBuf>,
    /// Present when `strategy` is Generative.
    pub generative: Option<GenerativeSettings>,
    /// OAuth 2.0 user access token for posting.
    pub twitter_access_token: String,
    /// Posting API origin.
    pub twitter_api_base: String,
}

impl ReplyConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through `lookup`, which returns the raw value of a variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(&lookup);

        let poll_interval = Duration::from_millis(env.positive("POLL_INTERVAL_MS", 30_000)?);
        let max_retries = env.positive("MAX_RETRIES", u64::from(DEFAULT_MAX_RETRIES))?;
        let max_retries = u32::try_from(max_retries).map_err(|_| ConfigError::InvalidValue {
            key: "MAX_RETRIES",
            value: max_retries.to_string(),
            expected: "positive integer",
        })?;
        let batch_size = env.positive("BATCH_SIZE", DEFAULT_BATCH_SIZE as u64)? as usize;
        let post_pacing = Duration::from_millis(env.parsed(
            "POST_PACING_MS",
            3_000u64,
            |_| true,
            "non-negative integer",
        )?);
        let post_timeout = Duration::from_millis(env.positive("POST_TIMEOUT_MS", 30_000)?);
        let port = env.parsed("PORT", DEFAULT_PORT, |_| true, "port number")?;

        let chain = env.non_empty("CHAIN", DEFAULT_CHAIN)?;
        let token = env.non_empty("TOKEN", DEFAULT_TOKEN)?;
        let success_prefix = env.non_empty("SUCCESS_PREFIX", DEFAULT_SUCCESS_PREFIX)?;

        let strategy = env.choice(
            "REPLY_STRATEGY",
            ReplyStrategy::default(),
            "template | generative",
        )?;
        let sentinel_policy = match env.get("SENTINEL_POLICY") {
            None => SentinelPolicy::default(),
            Some(raw) => SentinelPolicy::parse(&raw).ok_or(ConfigError::InvalidValue {
                key: "SENTINEL_POLICY",
                value: raw,
                expected: "reply-known | silence-all",
            })?,
        };
        let ledger_backend =
            env.choice("LEDGER_BACKEND", LedgerBackend::default(), "supabase | memory")?;
        let table = env.non_empty("REPLY_TABLE", DEFAULT_TABLE)?;

        let supabase_url = env.get("SUPABASE_URL").filter(|v| !v.trim().is_empty());

        let memory_seed = match ledger_backend {
            LedgerBackend::Memory => env
                .get("LEDGER_SEED_FILE")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            LedgerBackend::Supabase => None,
        };

        let supabase = match ledger_backend {
            LedgerBackend::Memory => None,
            LedgerBackend::Supabase => Some(SupabaseSettings {
                url: supabase_url.clone().ok_or(ConfigError::Missing {
                    key: "SUPABASE_URL",
                    context: "supabase ledger backend",
                })?,
                service_key: env.required("SUPABASE_SERVICE_KEY", "supabase ledger backend")?,
                table,
            }),
        };

        let generative = match strategy {
            ReplyStrategy::Template => None,
            ReplyStrategy::Generative => {
                let url = match env.get("MONIBOT_AI_URL").filter(|v| !v.trim().is_empty()) {
                    Some(url) => url,
                    None => supabase_url
                        .as_deref()
                        .map(HttpBackendConfig::function_url)
                        .ok_or(ConfigError::Missing {
                            key: "MONIBOT_AI_URL",
                            context: "generative strategy without SUPABASE_URL",
                        })?,
                };
                Some(GenerativeSettings {
                    url,
                    anon_key: env.required("SUPABASE_ANON_KEY", "generative strategy")?,
                })
            }
        };

        Ok(Self {
            poll_interval,
            max_retries,
            batch_size,
            post_pacing,
            post_timeout,
            port,
            chain,
            token,
            success_prefix,
            strategy,
            sentinel_policy,
            ledger_backend,
            supabase,
            memory_seed,
            generative,
            twitter_access_token: env.required("TWITTER_ACCESS_TOKEN", "posting replies")?,
            twitter_api_base: env
                .get("TWITTER_API_BASE")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        })
    }

    /// Ledger settings.
    pub fn ledger(&self) -> LedgerConfig {
        LedgerConfig {
            chain: self.chain.clone(),
            max_retries: self.max_retries,
        }
    }

    /// Dispatch settings.
    pub fn dispatch(&self) -> DispatchConfig {
        DispatchConfig {
            batch_size: self.batch_size,
            poll_interval: self.poll_interval,
            post_pacing: self.post_pacing,
            post_timeout: self.post_timeout,
            sentinel_policy: self.sentinel_policy,
        }
    }

    /// Outcome classifier for the configured success prefix.
    pub fn classifier(&self) -> OutcomeClassifier {
        OutcomeClassifier::new(self.success_prefix.clone())
    }

    /// Chain and token names used in reply texts.
    pub fn labels(&self) -> ChainLabels {
        ChainLabels {
            chain: self.chain.clone(),
            token: self.token.clone(),
        }
    }

    /// Generative strategy settings.
    pub fn generative_config(&self) -> GenerativeConfig {
        GenerativeConfig {
            labels: self.labels(),
            ..GenerativeConfig::default()
        }
    }
}

struct Env<'a, F>(&'a F);

impl<F> Env<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    fn parsed<T, C>(
        &self,
        key: &'static str,
        default: T,
        accept: C,
        expected: &'static str,
    ) -> Result<T, ConfigError>
    where
        T: FromStr,
        C: Fn(&T) -> bool,
    {
        let Some(raw) = self.get(key) else {
            return Ok(default);
        };
        match raw.trim().parse::<T>() {
            Ok(value) if accept(&value) => Ok(value),
            _ => Err(ConfigError::InvalidValue {
                key,
                value: raw,
                expected,
            }),
        }
    }

    fn positive(&self, key: &'static str, default: u64) -> Result<u64, ConfigError> {
        self.parsed(key, default, |v| *v > 0, "positive integer")
    }

    fn choice<T: FromStr>(
        &self,
        key: &'static str,
        default: T,
        expected: &'static str,
    ) -> Result<T, ConfigError> {
        self.parsed(key, default, |_| true, expected)
    }

    fn non_empty(&self, key: &'static str, default: &str) -> Result<String, ConfigError> {
        match self.get(key) {
            None => Ok(default.to_string()),
            Some(raw) if raw.trim().is_empty() => Err(ConfigError::InvalidValue {
                key,
                value: raw,
                expected: "non-empty string",
            }),
            Some(raw) => Ok(raw.trim().to_string()),
        }
    }

    fn required(&self, key: &'static str, context: &'static str) -> Result<String, ConfigError> {
        self.get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing { key, context })
    }
}
