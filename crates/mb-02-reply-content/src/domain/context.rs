//! Generation request context.

use serde::{Deserialize, Serialize};
use shared_types::{OutcomeCategory, TransactionRecord, DEFAULT_CHAIN, DEFAULT_TOKEN};

/// Backend action used for reply generation.
pub const GENERATE_REPLY_ACTION: &str = "generate-reply";

/// Fixed chain/token labels of a deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainLabels {
    /// Chain label sent to the backend.
    pub chain: String,
    /// Token label sent to the backend.
    pub token: String,
}

impl Default for ChainLabels {
    fn default() -> Self {
        Self {
            chain: DEFAULT_CHAIN.to_string(),
            token: DEFAULT_TOKEN.to_string(),
        }
    }
}

/// What the generation backend sees about a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationContext {
    /// Record id.
    pub id: String,
    /// Outcome code (`tx_hash` column).
    pub tx_hash: Option<String>,
    /// Post being replied to.
    pub tweet_id: Option<String>,
    /// Recipient tag, `unknown` when absent.
    pub recipient_tag: String,
    /// Payer tag, `MoniBot` when absent.
    pub payer_tag: String,
    /// Payment category, `p2p_command` when absent.
    #[serde(rename = "type")]
    pub kind: String,
    /// Record status, `completed` when absent.
    pub status: String,
    /// Classifier output.
    pub category: OutcomeCategory,
    /// Chain label.
    pub chain: String,
    /// Token label.
    pub token: String,
}

impl GenerationContext {
    /// Builds the context, filling defaults for missing fields.
    pub fn from_record(
        record: &TransactionRecord,
        category: OutcomeCategory,
        labels: &ChainLabels,
    ) -> Self {
        Self {
            id: record.id.as_str().to_string(),
            tx_hash: record.outcome_code.clone(),
            tweet_id: record.social_post_id.clone(),
            recipient_tag: non_blank(record.recipient_tag.as_deref()).unwrap_or("unknown").to_string(),
            payer_tag: non_blank(record.payer_tag.as_deref()).unwrap_or("MoniBot").to_string(),
            kind: record.kind.as_str().to_string(),
            status: non_blank(record.status.as_deref()).unwrap_or("completed").to_string(),
            category,
            chain: labels.chain.clone(),
            token: labels.token.clone(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
