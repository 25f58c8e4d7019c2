//! Scenario modules (test-only).

mod generation;
mod ledger_props;
mod reply_flow;
mod runtime;
