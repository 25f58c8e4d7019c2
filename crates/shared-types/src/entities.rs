//! # Core Domain Entities
//!
//! The transaction record polled from the ledger and the small value types
//! around it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default chain label of the reference deployment.
pub const DEFAULT_CHAIN: &str = "BSC";

/// Default token label of the reference deployment.
pub const DEFAULT_TOKEN: &str = "USDT";

/// Default prefix marking a settled on-chain transaction hash.
pub const DEFAULT_SUCCESS_PREFIX: &str = "0x";

/// Opaque unique identifier of a transaction record.
///
/// Deserializes from a string or an integer column; integers keep their
/// decimal form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    /// Creates an id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, used in log lines.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl<'de> serde::de::Visitor<'de> for IdVisitor {
            type Value = RecordId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or integer record id")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<RecordId, E> {
                Ok(RecordId::new(v))
            }

            fn visit_string<E: serde::de::Error>(self, v: String) -> Result<RecordId, E> {
                Ok(RecordId(v))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<RecordId, E> {
                Ok(RecordId(v.to_string()))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<RecordId, E> {
                Ok(RecordId(v.to_string()))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// Payment category of a record (`type` column).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PaymentKind {
    /// Campaign grant paid out of the treasury.
    Grant,
    /// Peer-to-peer transfer issued by a social command.
    #[default]
    P2pCommand,
    /// Any other upstream category, kept verbatim.
    Other(String),
}

impl PaymentKind {
    /// Wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            PaymentKind::Grant => "grant",
            PaymentKind::P2pCommand => "p2p_command",
            PaymentKind::Other(raw) => raw,
        }
    }
}

impl From<&str> for PaymentKind {
    fn from(value: &str) -> Self {
        match value {
            "grant" => PaymentKind::Grant,
            "p2p_command" => PaymentKind::P2pCommand,
            other => PaymentKind::Other(other.to_string()),
        }
    }
}

impl Serialize for PaymentKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PaymentKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(PaymentKind::from).unwrap_or_default())
    }
}

/// A payment record awaiting (or past) its social reply.
///
/// Field names follow the `monibot_transactions` table.
///
/// INVARIANT: once `replied` is true the record is never mutated again.
/// INVARIANT: `retry_count` never decreases and never exceeds the ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Unique record id.
    pub id: RecordId,
    /// Chain label (`BSC`, `Base`, ...).
    pub chain: String,
    /// Payment category.
    #[serde(rename = "type", default)]
    pub kind: PaymentKind,
    /// Recipient's pay tag, when one was resolved.
    #[serde(rename = "recipient_pay_tag", default)]
    pub recipient_tag: Option<String>,
    /// Payer's pay tag, when one was resolved.
    #[serde(rename = "payer_pay_tag", default)]
    pub payer_tag: Option<String>,
    /// Either a success hash or an upstream `ERROR_*` / `SKIP_*` / `LIMIT_*` code.
    #[serde(rename = "tx_hash", default)]
    pub outcome_code: Option<String>,
    /// Optional campaign status (`limit_reached`, `completed`, ...).
    #[serde(default)]
    pub status: Option<String>,
    /// Post this record should be replied to. `None` means no reply is owed.
    #[serde(rename = "tweet_id", default)]
    pub social_post_id: Option<String>,
    /// Terminal marker.
    #[serde(default)]
    pub replied: bool,
    /// Number of recoverable failures so far.
    #[serde(default)]
    pub retry_count: u32,
    /// Last failure detail.
    #[serde(default)]
    pub error_reason: Option<String>,
    /// Creation time, used for oldest-first ordering.
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Creates an unreplied record with no outcome, mostly useful for tests
    /// and fixtures.
    pub fn new(id: impl Into<String>, chain: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: RecordId::new(id),
            chain: chain.into(),
            kind: PaymentKind::default(),
            recipient_tag: None,
            payer_tag: None,
            outcome_code: None,
            status: None,
            social_post_id: None,
            replied: false,
            retry_count: 0,
            error_reason: None,
            created_at,
        }
    }

    /// Builder: sets the outcome code.
    pub fn with_outcome(mut self, code: impl Into<String>) -> Self {
        self.outcome_code = Some(code.into());
        self
    }

    /// Builder: sets the social post to reply to.
    pub fn with_post(mut self, post_id: impl Into<String>) -> Self {
        self.social_post_id = Some(post_id.into());
        self
    }

    /// Builder: sets the payment kind.
    pub fn with_kind(mut self, kind: PaymentKind) -> Self {
        self.kind = kind;
        self
    }

    /// Builder: sets the recipient tag.
    pub fn with_recipient(mut self, tag: impl Into<String>) -> Self {
        self.recipient_tag = Some(tag.into());
        self
    }

    /// Outcome code or the empty string.
    pub fn outcome(&self) -> &str {
        self.outcome_code.as_deref().unwrap_or("")
    }

    /// True when the outcome code is a settled transaction hash.
    pub fn is_success_hash(&self, success_prefix: &str) -> bool {
        !success_prefix.is_empty() && self.outcome().starts_with(success_prefix)
    }

    /// Post id to reply to, ignoring blank values.
    pub fn reply_target(&self) -> Option<&str> {
        self.social_post_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// True when the record may still be picked up by a poll.
    pub fn is_eligible(&self, chain: &str, max_retries: u32) -> bool {
        self.chain == chain && !self.replied && self.retry_count < max_retries
    }
}
