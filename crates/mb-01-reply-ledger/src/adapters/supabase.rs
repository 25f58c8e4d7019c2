//! PostgREST-backed record store (Supabase).
//!
//! Maps the `RecordStore` port onto three REST calls against
//! `{url}/rest/v1/{table}`:
//!
//! | Port call        | Request                                                    |
//! |------------------|------------------------------------------------------------|
//! | `query_eligible` | `GET ?chain=eq.X&replied=eq.false&retry_count=lt.N&order=created_at.asc&limit=L` |
//! | `update_fields`  | `PATCH ?id=eq.ID` with `Prefer: return=minimal`            |
//! | `read_field`     | `GET ?select=COLUMN&id=eq.ID`                              |
//!
//! Rows that fail to decode are logged and dropped from the batch. Their ids
//! are quarantined and excluded (`id=not.in.(...)`) from later eligibility
//! queries, so a bad row at the head of the order cannot starve the rows
//! behind it.

use crate::domain::{EligibilityQuery, FieldValue, LedgerError, RecordField, RecordOrder, RecordPatch};
use crate::ports::RecordStore;
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use shared_types::{RecordError, RecordId, TransactionRecord};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// Default table name.
pub const DEFAULT_TABLE: &str = "monibot_transactions";

/// Upper bound on quarantined ids kept in the exclusion filter.
pub const MAX_QUARANTINED: usize = 200;

/// Connection settings for the PostgREST endpoint.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// Service-role key; sent as both `apikey` and bearer token.
    pub service_key: String,
    /// Table holding the transaction records.
    pub table: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl SupabaseConfig {
    /// Config with the default table and a 10s timeout.
    pub fn new(url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            service_key: service_key.into(),
            table: DEFAULT_TABLE.to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Builder: overrides the table name.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.url.trim_end_matches('/'), self.table)
    }
}

/// `RecordStore` talking to Supabase over HTTP.
pub struct SupabaseRecordStore {
    client: Client,
    config: SupabaseConfig,
    quarantined: Mutex<BTreeSet<String>>,
    malformed_rows: AtomicU64,
}

impl SupabaseRecordStore {
    /// Create a new store client.
    pub fn new(config: SupabaseConfig) -> Result<Self, LedgerError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            client,
            config,
            quarantined: Mutex::new(BTreeSet::new()),
            malformed_rows: AtomicU64::new(0),
        })
    }

    /// Rows dropped because they could not be decoded.
    pub fn malformed_rows(&self) -> u64 {
        self.malformed_rows.load(Ordering::Relaxed)
    }

    /// Ids currently excluded from eligibility queries.
    pub fn quarantined(&self) -> Vec<String> {
        self.quarantined.lock().iter().cloned().collect()
    }

    fn quarantine(&self, rejected: &[RejectedRow]) {
        if rejected.is_empty() {
            return;
        }
        self.malformed_rows
            .fetch_add(rejected.len() as u64, Ordering::Relaxed);
        let mut quarantined = self.quarantined.lock();
        for row in rejected {
            let Some(id) = &row.id else { continue };
            if quarantined.len() >= MAX_QUARANTINED {
                warn!(id = %id, "[mb-01] Quarantine full, malformed row stays in the result set");
                continue;
            }
            quarantined.insert(id.clone());
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.service_key)
            .bearer_auth(&self.config.service_key)
    }

    async fn check(response: Response) -> Result<Response, LedgerError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "[mb-01] Record store rejected request");
        Err(LedgerError::status(status.as_u16(), body))
    }

    fn map_send_error(&self, err: reqwest::Error) -> LedgerError {
        if err.is_connect() || err.is_timeout() {
            LedgerError::Unavailable(format!("cannot reach {}: {}", self.config.url, err))
        } else {
            LedgerError::Http(err)
        }
    }
}

/// Query-string pairs for an eligibility query, skipping `excluded` ids.
pub(crate) fn eligibility_params(
    query: &EligibilityQuery,
    excluded: &BTreeSet<String>,
) -> Vec<(&'static str, String)> {
    let order = match query.order {
        RecordOrder::OldestFirst => "created_at.asc",
    };
    let mut params = vec![
        ("select", "*".to_string()),
        ("chain", format!("eq.{}", query.chain)),
        ("replied", "eq.false".to_string()),
        ("retry_count", format!("lt.{}", query.max_retries)),
    ];
    if !excluded.is_empty() {
        let list: Vec<String> = excluded
            .iter()
            .map(|id| format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\"")))
            .collect();
        params.push(("id", format!("not.in.({})", list.join(","))));
    }
    params.push(("order", order.to_string()));
    params.push(("limit", query.limit.to_string()));
    params
}

/// A row that could not be decoded into a record.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RejectedRow {
    /// Raw `id` column, when it was readable.
    pub id: Option<String>,
    /// Decode error.
    pub error: String,
}

/// Decodes each row on its own; one bad row never fails the batch.
pub(crate) fn decode_rows(rows: Vec<Value>) -> (Vec<TransactionRecord>, Vec<RejectedRow>) {
    let mut records = Vec::with_capacity(rows.len());
    let mut rejected = Vec::new();
    for row in rows {
        let id = raw_id(&row);
        match serde_json::from_value::<TransactionRecord>(row) {
            Ok(record) => records.push(record),
            Err(e) => {
                let error = RecordError::Malformed(e.to_string()).to_string();
                warn!(
                    id = id.as_deref().unwrap_or("?"),
                    error = %error,
                    "[mb-01] Skipping undecodable record"
                );
                rejected.push(RejectedRow { id, error });
            }
        }
    }
    (records, rejected)
}

fn raw_id(row: &Value) -> Option<String> {
    match row.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Decodes one JSON column value.
pub(crate) fn decode_field(field: RecordField, value: &Value) -> Result<FieldValue, RecordError> {
    let mismatch = |found: &str| RecordError::FieldType {
        field: field.column().to_string(),
        found: found.to_string(),
    };

    match (field, value) {
        (_, Value::Null) => Ok(FieldValue::Null),
        (RecordField::Replied, Value::Bool(b)) => Ok(FieldValue::Bool(*b)),
        (RecordField::RetryCount, Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(FieldValue::Count)
            .ok_or_else(|| mismatch(&n.to_string())),
        (RecordField::ErrorReason, Value::String(s)) => Ok(FieldValue::Text(s.clone())),
        (_, other) => Err(mismatch(json_type(other))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[async_trait]
impl RecordStore for SupabaseRecordStore {
    async fn query_eligible(
        &self,
        query: &EligibilityQuery,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        let excluded = self.quarantined.lock().clone();
        let request = self
            .client
            .get(self.config.table_url())
            .query(&eligibility_params(query, &excluded));
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let rows: Vec<Value> = Self::check(response).await?.json().await?;

        let (records, rejected) = decode_rows(rows);
        self.quarantine(&rejected);

        debug!(
            chain = %query.chain,
            returned = records.len(),
            rejected = rejected.len(),
            "[mb-01] Fetched eligible records"
        );
        Ok(records)
    }

    async fn update_fields(&self, id: &RecordId, patch: &RecordPatch) -> Result<(), LedgerError> {
        let request = self
            .client
            .patch(self.config.table_url())
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=minimal")
            .json(patch);
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        Self::check(response).await?;
        Ok(())
    }

    async fn read_field(
        &self,
        id: &RecordId,
        field: RecordField,
    ) -> Result<Option<FieldValue>, LedgerError> {
        let request = self.client.get(self.config.table_url()).query(&[
            ("select", field.column().to_string()),
            ("id", format!("eq.{}", id)),
        ]);
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let rows: Vec<Value> = Self::check(response).await?.json().await?;

        match rows.first() {
            None => Ok(None),
            Some(row) => {
                let value = row.get(field.column()).unwrap_or(&Value::Null);
                Ok(Some(decode_field(field, value)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LedgerConfig;
    use serde_json::json;

    #[test]
    fn test_table_url_trims_trailing_slash() {
        let config = SupabaseConfig::new("https://demo.supabase.co/", "key").with_table("t");
        assert_eq!(config.table_url(), "https://demo.supabase.co/rest/v1/t");
    }

    #[test]
    fn test_eligibility_params() {
        let params = eligibility_params(
            &LedgerConfig::default().eligibility_query(5),
            &BTreeSet::new(),
        );
        assert!(params.contains(&("chain", "eq.BSC".to_string())));
        assert!(params.contains(&("replied", "eq.false".to_string())));
        assert!(params.contains(&("retry_count", "lt.3".to_string())));
        assert!(params.contains(&("order", "created_at.asc".to_string())));
        assert!(params.contains(&("limit", "5".to_string())));
        assert!(params.iter().all(|(k, _)| *k != "id"));
    }

    #[test]
    fn test_eligibility_params_exclude_quarantined_ids() {
        let excluded: BTreeSet<String> = ["7", "a,b", "q\"x"].iter().map(|s| s.to_string()).collect();
        let params = eligibility_params(&LedgerConfig::default().eligibility_query(5), &excluded);
        assert!(params.contains(&("id", r#"not.in.("7","a,b","q\"x")"#.to_string())));
    }

    fn good_row(id: Value) -> Value {
        json!({ "id": id, "chain": "BSC", "created_at": "2024-05-01T10:00:00Z" })
    }

    #[test]
    fn test_decode_rows_keeps_good_rows_behind_bad_ones() {
        let rows = vec![
            json!({ "id": "bad-1", "chain": "BSC", "created_at": null }),
            json!({ "id": "bad-2", "chain": "BSC", "retry_count": "x", "created_at": "2024-05-01T10:00:00Z" }),
            json!({ "chain": "BSC" }),
            good_row(json!("ok-1")),
            good_row(json!(42)),
        ];

        let (records, rejected) = decode_rows(rows);

        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["ok-1", "42"]);
        let rejected_ids: Vec<Option<&str>> = rejected.iter().map(|r| r.id.as_deref()).collect();
        assert_eq!(rejected_ids, vec![Some("bad-1"), Some("bad-2"), None]);
        assert!(rejected.iter().all(|r| r.error.starts_with("Malformed record")));
    }

    #[test]
    fn test_quarantine_counts_and_caps() {
        let store = SupabaseRecordStore::new(SupabaseConfig::new("http://localhost:54321", "k")).unwrap();
        let mut rejected: Vec<RejectedRow> = (0..MAX_QUARANTINED + 5)
            .map(|i| RejectedRow { id: Some(format!("r{i}")), error: "e".into() })
            .collect();
        rejected.push(RejectedRow { id: None, error: "e".into() });

        store.quarantine(&rejected);

        assert_eq!(store.malformed_rows(), (MAX_QUARANTINED + 6) as u64);
        assert_eq!(store.quarantined().len(), MAX_QUARANTINED);
    }

    #[test]
    fn test_decode_field_values() {
        assert_eq!(
            decode_field(RecordField::Replied, &json!(true)).unwrap(),
            FieldValue::Bool(true)
        );
        assert_eq!(
            decode_field(RecordField::RetryCount, &json!(2)).unwrap(),
            FieldValue::Count(2)
        );
        assert_eq!(
            decode_field(RecordField::RetryCount, &Value::Null).unwrap(),
            FieldValue::Null
        );
        assert_eq!(
            decode_field(RecordField::ErrorReason, &json!("boom")).unwrap(),
            FieldValue::Text("boom".into())
        );
    }

    #[test]
    fn test_decode_field_type_mismatch() {
        let err = decode_field(RecordField::RetryCount, &json!("three")).unwrap_err();
        assert!(err.to_string().contains("retry_count"));

        assert!(decode_field(RecordField::RetryCount, &json!(-1)).is_err());
        assert!(decode_field(RecordField::Replied, &json!(1)).is_err());
    }

    #[test]
    fn test_store_builds() {
        let store = SupabaseRecordStore::new(SupabaseConfig::new("http://localhost:54321", "k"));
        assert!(store.is_ok());
    }
}
