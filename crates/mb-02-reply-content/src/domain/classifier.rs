//! # Outcome Classifier
//!
//! Maps a record's stored status and outcome code onto an [`OutcomeCategory`].
//!
//! Decision order (first match wins):
//!
//! 1. `status` is `limit_reached` → `CampaignLimitReached`
//! 2. outcome code starts with the success prefix → `Success`
//! 3. exact upstream codes (`LIMIT_REACHED`, `ERROR_BALANCE`, ...)
//! 4. substring / prefix codes (`ERROR_BLOCKCHAIN*`, `*MAX_RETRIES*`, `SKIP_NO_*`, ...)
//! 5. anything else → `GenericError`
//!
//! Status outranks the code so a campaign-full signal is never misread
//! through a substring collision.

use shared_types::{OutcomeCategory, TransactionRecord, DEFAULT_SUCCESS_PREFIX};

/// Prefixes of codes written by the upstream payment stage.
pub const UPSTREAM_CODE_PREFIXES: [&str; 3] = ["SKIP_", "ERROR_", "LIMIT_"];

/// Pure classifier, parameterised by the chain's success prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeClassifier {
    success_prefix: String,
}

impl Default for OutcomeClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_SUCCESS_PREFIX)
    }
}

impl OutcomeClassifier {
    /// Classifier recognising `success_prefix` as a settled hash.
    pub fn new(success_prefix: impl Into<String>) -> Self {
        Self {
            success_prefix: success_prefix.into(),
        }
    }

    /// Configured success prefix.
    pub fn success_prefix(&self) -> &str {
        &self.success_prefix
    }

    /// Classifies a record.
    pub fn classify(&self, record: &TransactionRecord) -> OutcomeCategory {
        if record.status.as_deref().is_some_and(is_limit_status) {
            return OutcomeCategory::CampaignLimitReached;
        }
        self.classify_code(record.outcome())
    }

    /// Classifies a bare outcome code.
    pub fn classify_code(&self, code: &str) -> OutcomeCategory {
        let code = code.trim();

        if !self.success_prefix.is_empty() && code.starts_with(&self.success_prefix) {
            return OutcomeCategory::Success;
        }

        match code {
            "LIMIT_REACHED" => return OutcomeCategory::CampaignLimitReached,
            "ERROR_ALLOWANCE" => return OutcomeCategory::InsufficientAllowance,
            "ERROR_BALANCE" => return OutcomeCategory::InsufficientBalance,
            "ERROR_TARGET_NOT_FOUND" => return OutcomeCategory::TargetNotFound,
            "ERROR_DUPLICATE_GRANT" => return OutcomeCategory::DuplicateGrant,
            "ERROR_TREASURY_EMPTY" => return OutcomeCategory::TreasuryEmpty,
            "ERROR_SENDER_NOT_FOUND" => return OutcomeCategory::SenderNotFound,
            _ => {}
        }

        if code.contains("ERROR_BLOCKCHAIN") {
            OutcomeCategory::BlockchainError
        } else if code.contains("MAX_RETRIES") {
            OutcomeCategory::MaxRetries
        } else if code.contains("SKIP_DUPLICATE") || code == "SKIP_ALREADY_ONCHAIN" {
            OutcomeCategory::AlreadyClaimed
        } else if code.starts_with("SKIP_NO_") {
            OutcomeCategory::SkipNoIdentifier
        } else if code == "SKIP_CAMPAIGN_INACTIVE" {
            OutcomeCategory::CampaignInactive
        } else if code == "SKIP_INVALID_SYNTAX" {
            OutcomeCategory::InvalidSyntax
        } else {
            OutcomeCategory::GenericError
        }
    }
}

/// Classifies with the default (`0x`) success prefix.
pub fn classify(record: &TransactionRecord) -> OutcomeCategory {
    OutcomeClassifier::default().classify(record)
}

/// True for `SKIP_*`, `ERROR_*` and `LIMIT_*` codes.
pub fn is_upstream_code(code: &str) -> bool {
    let code = code.trim();
    UPSTREAM_CODE_PREFIXES
        .iter()
        .any(|prefix| code.starts_with(prefix))
}

fn is_limit_status(status: &str) -> bool {
    let status = status.trim();
    status.eq_ignore_ascii_case("limit_reached") || status.eq_ignore_ascii_case("limit reached")
}
