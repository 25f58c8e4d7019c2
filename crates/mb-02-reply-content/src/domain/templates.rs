//! Template banks.
//!
//! One fixed list of candidate replies per bank. Success is split by payment
//! kind; every other bank maps one-to-one onto an [`OutcomeCategory`].
//!
//! Texts carry `{chain}` and `{token}` placeholders, filled from the
//! configured [`ChainLabels`] by [`BankKey::rendered`].

use crate::domain::ChainLabels;
use shared_types::{OutcomeCategory, PaymentKind};

/// Fills the `{chain}` and `{token}` placeholders of a bank text.
pub fn render(template: &str, labels: &ChainLabels) -> String {
    template
        .replace("{chain}", &labels.chain)
        .replace("{token}", &labels.token)
}

/// Key of a template bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BankKey {
    /// Campaign grant paid out.
    GrantSuccess,
    /// Peer-to-peer transfer settled.
    PeerTransferSuccess,
    /// Recipient unknown.
    TargetNotFound,
    /// Balance too low.
    InsufficientBalance,
    /// Allowance not approved.
    InsufficientAllowance,
    /// Campaign full.
    CampaignLimitReached,
    /// Chain-side failure.
    BlockchainError,
    /// Grant already paid to this recipient.
    DuplicateGrant,
    /// Treasury drained.
    TreasuryEmpty,
    /// Unparseable command.
    InvalidSyntax,
    /// No pay tag in the command.
    SkipNoIdentifier,
    /// Sender has no account.
    SenderNotFound,
    /// Upstream retries exhausted.
    MaxRetries,
    /// Already claimed.
    AlreadyClaimed,
    /// Campaign no longer running.
    CampaignInactive,
    /// Catch-all.
    GenericError,
}

impl BankKey {
    /// Bank used for a classified record.
    pub fn for_outcome(category: OutcomeCategory, kind: &PaymentKind) -> Self {
        match category {
            OutcomeCategory::Success => match kind {
                PaymentKind::Grant => BankKey::GrantSuccess,
                _ => BankKey::PeerTransferSuccess,
            },
            OutcomeCategory::TargetNotFound => BankKey::TargetNotFound,
            OutcomeCategory::InsufficientBalance => BankKey::InsufficientBalance,
            OutcomeCategory::InsufficientAllowance => BankKey::InsufficientAllowance,
            OutcomeCategory::CampaignLimitReached => BankKey::CampaignLimitReached,
            OutcomeCategory::BlockchainError => BankKey::BlockchainError,
            OutcomeCategory::DuplicateGrant => BankKey::DuplicateGrant,
            OutcomeCategory::TreasuryEmpty => BankKey::TreasuryEmpty,
            OutcomeCategory::InvalidSyntax => BankKey::InvalidSyntax,
            OutcomeCategory::SkipNoIdentifier => BankKey::SkipNoIdentifier,
            OutcomeCategory::SenderNotFound => BankKey::SenderNotFound,
            OutcomeCategory::MaxRetries => BankKey::MaxRetries,
            OutcomeCategory::AlreadyClaimed => BankKey::AlreadyClaimed,
            OutcomeCategory::CampaignInactive => BankKey::CampaignInactive,
            OutcomeCategory::GenericError => BankKey::GenericError,
        }
    }

    /// Candidate texts with placeholders filled.
    pub fn rendered(&self, labels: &ChainLabels) -> Vec<String> {
        self.templates().iter().map(|t| render(t, labels)).collect()
    }

    /// Raw candidate texts, never empty.
    pub fn templates(&self) -> &'static [&'static str] {
        match self {
            BankKey::GrantSuccess => GRANT_SUCCESS,
            BankKey::PeerTransferSuccess => PEER_TRANSFER_SUCCESS,
            BankKey::TargetNotFound => TARGET_NOT_FOUND,
            BankKey::InsufficientBalance => INSUFFICIENT_BALANCE,
            BankKey::InsufficientAllowance => INSUFFICIENT_ALLOWANCE,
            BankKey::CampaignLimitReached => CAMPAIGN_LIMIT_REACHED,
            BankKey::BlockchainError => BLOCKCHAIN_ERROR,
            BankKey::DuplicateGrant => DUPLICATE_GRANT,
            BankKey::TreasuryEmpty => TREASURY_EMPTY,
            BankKey::InvalidSyntax => INVALID_SYNTAX,
            BankKey::SkipNoIdentifier => SKIP_NO_IDENTIFIER,
            BankKey::SenderNotFound => SENDER_NOT_FOUND,
            BankKey::MaxRetries => MAX_RETRIES,
            BankKey::AlreadyClaimed => ALREADY_CLAIMED,
            BankKey::CampaignInactive => CAMPAIGN_INACTIVE,
            BankKey::GenericError => GENERIC_ERROR,
        }
    }
}

const GRANT_SUCCESS: &[&str] = &[
    "Transfer confirmed on {chain}. {token} delivered to your wallet",
    "Grant processed on {chain}. Check your balance",
    "Payment complete. Your {token} just landed via {chain}",
    "Done on {chain}. Funds in your wallet now",
    "{chain} grant executed. {token} sent successfully",
    "Processed on {chain}. Your {token} has arrived",
    "Grant delivered via {chain} network. Wallet updated",
    "{token} transfer complete on {chain}",
    "{chain} transaction confirmed. Grant received",
    "Funds dispatched on {chain}. Check your wallet",
    "Grant settled on {chain}. {token} in your account",
    "{chain} delivery complete. Funds available now",
];

const PEER_TRANSFER_SUCCESS: &[&str] = &[
    "Sent on {chain}. {token} transferred successfully",
    "Payment complete on {chain}. Recipient notified",
    "Transfer done. {token} moved via {chain} network",
    "Processed on {chain}. Payment delivered",
    "{chain} transfer confirmed. {token} sent",
    "Payment settled on {chain}. All clear",
    "{token} delivered via {chain}. Transaction complete",
    "Transfer executed on {chain} successfully",
    "{chain} payment processed. Funds moved",
    "Sent via {chain}. {token} received on the other end",
    "{chain} transfer settled. Payment confirmed",
    "{token} payment routed through {chain}. Done",
];

const TARGET_NOT_FOUND: &[&str] = &[
    "Recipient not found in MoniPay. They need to create an account first",
    "That username does not exist yet. Ask them to sign up",
    "No MoniPay account for that username. Registration required",
    "User not registered on MoniPay. Account needed before receiving",
    "Unknown recipient. They should create a MoniPay wallet first",
    "Recipient has no MoniPay profile. Sign-up needed",
    "That monitag is not registered yet. Invite them to join",
    "No wallet found for that user. MoniPay account required",
    "Recipient unregistered. They can sign up to receive payments",
    "Cannot find that user on MoniPay. Account creation needed",
];

const INSUFFICIENT_BALANCE: &[&str] = &[
    "Insufficient {token} balance on {chain}. Add funds to your wallet and try again",
    "Not enough balance for this transaction. Top up your wallet",
    "Balance too low. Deposit {token} to complete this payment",
    "{token} balance insufficient on {chain}. Fund your wallet first",
    "Not enough {token}. Add more to your {chain} wallet",
    "Transaction failed, low balance. Deposit {token} and retry",
    "Wallet balance too low on {chain}. Top up to proceed",
    "Insufficient funds on {chain}. Add {token} to continue",
    "Cannot complete, {token} balance short on {chain}",
    "Need more {token} in your wallet. Deposit and try again",
];

const INSUFFICIENT_ALLOWANCE: &[&str] = &[
    "Allowance not approved on {chain}. Visit your dashboard to enable spending",
    "You need to approve {token} spending first. Check your settings",
    "Approval required on {chain}. Go to dashboard to authorize",
    "{token} spending not authorized on {chain}. Approve in your wallet",
    "Transaction needs approval. Enable {token} allowance on {chain}",
    "Allowance too low on {chain}. Increase your approval limit",
    "Spending not permitted yet. Approve {token} in your dashboard",
    "{chain} allowance needed. Authorize {token} spending to proceed",
    "No approval set on {chain}. Visit settings to enable",
    "{token} not approved for transactions. Set allowance first",
];

const CAMPAIGN_LIMIT_REACHED: &[&str] = &[
    "Campaign filled. You were too late for this one",
    "All spots taken. Better luck on the next campaign",
    "Campaign complete. Follow for upcoming opportunities",
    "This campaign has ended. Stay tuned for the next one",
    "Limit reached. Campaign fully distributed",
    "Campaign closed. All grants have been claimed",
    "Too late for this round. Watch for new campaigns",
    "Grant pool exhausted. Next campaign coming soon",
    "All grants distributed for this campaign",
    "Campaign maxed out. Keep an eye out for more",
];

const BLOCKCHAIN_ERROR: &[&str] = &[
    "Transaction failed due to a {chain} network issue. Try again in a few minutes.",
    "Temporary {chain} hiccup. Please retry shortly.",
];

const DUPLICATE_GRANT: &[&str] = &[
    "You've already claimed from this campaign. One per person.",
    "Already sent {token} to you for this campaign. Check your balance.",
];

const TREASURY_EMPTY: &[&str] = &[
    "Campaign {token} funds are depleted. Check back for the next one.",
    "This campaign's budget is exhausted. More {token} drops coming soon.",
];

const INVALID_SYNTAX: &[&str] = &[
    "Couldn't parse that. Use: @monibot send $5 usdt to monitag",
    "Invalid format. Try: @monibot send $X usdt to monitag",
];

const SKIP_NO_IDENTIFIER: &[&str] = &[
    "Drop your monitag to claim {token}. Need a MoniPay account? Create one first.",
    "Reply with your monitag to receive {token}. No monitag = no transfer.",
];

const SENDER_NOT_FOUND: &[&str] =
    &["You need a MoniPay account first. Create your monitag to use social payments."];

const MAX_RETRIES: &[&str] =
    &["We couldn't process this after multiple attempts. Check your MoniPay account."];

const ALREADY_CLAIMED: &[&str] =
    &["You already received {token} from this campaign. Check your MoniPay balance."];

const CAMPAIGN_INACTIVE: &[&str] = &["This campaign has ended. Follow MoniBot for future {token} drops."];

const GENERIC_ERROR: &[&str] = &[
    "Transaction could not be completed on {chain}. Try again later",
    "Something went wrong on {chain}. Please retry",
    "{chain} transaction failed. Give it another shot",
    "Error processing on {chain}. Try again shortly",
    "Transaction unsuccessful on {chain}. Retry in a moment",
];
