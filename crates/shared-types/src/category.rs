//! # Outcome Categories
//!
//! Semantic buckets an outcome code can fall into. Produced by the classifier
//! in `mb-02-reply-content`, consumed by template selection and the dispatch
//! pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic category of a transaction outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeCategory {
    /// Settled on-chain.
    Success,
    /// Recipient tag does not resolve to an account.
    TargetNotFound,
    /// Payer balance too low.
    InsufficientBalance,
    /// Payer has not approved spending.
    InsufficientAllowance,
    /// Campaign already handed out every grant.
    CampaignLimitReached,
    /// Chain-side failure.
    BlockchainError,
    /// Recipient already received this campaign's grant.
    DuplicateGrant,
    /// Campaign treasury has no funds left.
    TreasuryEmpty,
    /// Command could not be parsed.
    InvalidSyntax,
    /// Command carried no pay tag.
    SkipNoIdentifier,
    /// Sender has no account.
    SenderNotFound,
    /// Upstream gave up after repeated attempts.
    MaxRetries,
    /// Duplicate command or grant already on-chain.
    AlreadyClaimed,
    /// Campaign is no longer running.
    CampaignInactive,
    /// Anything not recognised.
    GenericError,
}

impl OutcomeCategory {
    /// Every category, in declaration order.
    pub const ALL: [OutcomeCategory; 15] = [
        OutcomeCategory::Success,
        OutcomeCategory::TargetNotFound,
        OutcomeCategory::InsufficientBalance,
        OutcomeCategory::InsufficientAllowance,
        OutcomeCategory::CampaignLimitReached,
        OutcomeCategory::BlockchainError,
        OutcomeCategory::DuplicateGrant,
        OutcomeCategory::TreasuryEmpty,
        OutcomeCategory::InvalidSyntax,
        OutcomeCategory::SkipNoIdentifier,
        OutcomeCategory::SenderNotFound,
        OutcomeCategory::MaxRetries,
        OutcomeCategory::AlreadyClaimed,
        OutcomeCategory::CampaignInactive,
        OutcomeCategory::GenericError,
    ];

    /// Stable snake_case label, used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeCategory::Success => "success",
            OutcomeCategory::TargetNotFound => "target_not_found",
            OutcomeCategory::InsufficientBalance => "insufficient_balance",
            OutcomeCategory::InsufficientAllowance => "insufficient_allowance",
            OutcomeCategory::CampaignLimitReached => "campaign_limit_reached",
            OutcomeCategory::BlockchainError => "blockchain_error",
            OutcomeCategory::DuplicateGrant => "duplicate_grant",
            OutcomeCategory::TreasuryEmpty => "treasury_empty",
            OutcomeCategory::InvalidSyntax => "invalid_syntax",
            OutcomeCategory::SkipNoIdentifier => "skip_no_identifier",
            OutcomeCategory::SenderNotFound => "sender_not_found",
            OutcomeCategory::MaxRetries => "max_retries",
            OutcomeCategory::AlreadyClaimed => "already_claimed",
            OutcomeCategory::CampaignInactive => "campaign_inactive",
            OutcomeCategory::GenericError => "generic_error",
        }
    }

    /// True only for [`OutcomeCategory::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, OutcomeCategory::Success)
    }
}

impl fmt::Display for OutcomeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
