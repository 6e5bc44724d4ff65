//! Firestore REST client.
//!
//! This module is the only place that talks to the external document store.
//! It wraps the Firestore REST API (`firestore.googleapis.com/v1`) with a
//! small typed surface:
//!
//! - point lookup of a document by id
//! - create-only document write (fails when the id is taken)
//! - document deletion
//! - ordered collection query via `:runQuery`
//!
//! The client is constructed once at startup from [`Config`] and shared with
//! every handler through axum state. Construction fails fast when the HTTP
//! client cannot be built; missing credentials never get this far because
//! config loading already rejected them.

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::Config;

const FIRESTORE_BASE: &str = "https://firestore.googleapis.com/v1";

/// A typed Firestore field value.
///
/// The REST API wraps every field in a single-key envelope naming its type,
/// e.g. `{"stringValue": "abc"}` or `{"timestampValue": "2025-01-01T00:00:00Z"}`.
/// Only the envelopes this service actually stores are modeled.
///
/// Timestamps are kept as the raw wire string; [`Value::as_timestamp`] does
/// the runtime type check and conversion, so a malformed or missing value
/// degrades to `None` instead of failing the whole document decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    StringValue(String),
    TimestampValue(String),
    NullValue(()),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::StringValue(s.into())
    }

    pub fn timestamp(t: DateTime<Utc>) -> Self {
        Value::TimestampValue(t.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn null() -> Self {
        Value::NullValue(())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::StringValue(s) => Some(s),
            _ => None,
        }
    }

    /// Decode a `timestampValue` into a concrete instant.
    ///
    /// Returns `None` for non-timestamp envelopes and for timestamp strings
    /// that do not parse as RFC 3339.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::TimestampValue(raw) => DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|t| t.with_timezone(&Utc)),
            _ => None,
        }
    }
}

/// Map of field name to typed value, as stored in a document.
pub type Fields = BTreeMap<String, Value>;

/// A Firestore document as returned by the REST API.
///
/// `name` is the full resource path
/// (`projects/{p}/databases/{d}/documents/{collection}/{id}`); the document
/// id is its last segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub name: String,

    #[serde(default)]
    pub fields: Fields,
}

impl Document {
    /// Document id, i.e. the last segment of the resource name.
    pub fn doc_id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

/// Errors returned by the store client.
#[derive(Debug, thiserror::Error)]
pub enum FirestoreError {
    /// Create-only write hit an existing document id.
    #[error("document already exists")]
    AlreadyExists,

    /// The store's security rules rejected the operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The request never produced a store reply (connect failure, timeout,
    /// malformed response body).
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Any other non-success reply from the store.
    #[error("store error {status}: {message}")]
    Api { status: u16, message: String },
}

/// Error body shape used by Google APIs:
/// `{"error": {"code": 403, "message": "...", "status": "PERMISSION_DENIED"}}`.
#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleErrorStatus,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorStatus {
    message: String,
}

/// Request body for a create-only document write.
#[derive(Debug, Serialize)]
struct CreateDocumentBody<'a> {
    fields: &'a Fields,
}

/// One row of a `:runQuery` response. Rows carrying only a `readTime` (no
/// document) are skipped by the caller.
#[derive(Debug, Deserialize)]
struct QueryRow {
    #[serde(default)]
    document: Option<Document>,
}

/// Shared handle to the Firestore REST API.
///
/// Cheap to clone (wraps a pooled `reqwest::Client`); one instance is built
/// at startup and injected everywhere store access is needed.
#[derive(Debug, Clone)]
pub struct FirestoreClient {
    http: reqwest::Client,
    documents_url: String,
    api_key: String,
}

impl FirestoreClient {
    /// Build the client from loaded configuration.
    ///
    /// No local request timeout is configured; waiting is bounded only by
    /// the HTTP client's defaults, matching the store SDK behavior this
    /// service replaces.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().build()?;
        let documents_url = format!(
            "{FIRESTORE_BASE}/projects/{}/databases/{}/documents",
            config.firebase_project_id, config.firebase_database_id
        );

        Ok(Self {
            http,
            documents_url,
            api_key: config.firebase_api_key.clone(),
        })
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{collection}", self.documents_url)
    }

    fn document_url(&self, collection: &str, doc_id: &str) -> String {
        format!("{}/{collection}/{doc_id}", self.documents_url)
    }

    /// Point lookup of a document by id.
    ///
    /// Returns `Ok(None)` when the document does not exist; every other
    /// non-success reply is an error.
    pub async fn get_document(
        &self,
        collection: &str,
        doc_id: &str,
    ) -> Result<Option<Document>, FirestoreError> {
        let response = self
            .http
            .get(self.document_url(collection, doc_id))
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = Self::check(response).await?;
        Ok(Some(response.json().await?))
    }

    /// Create-only write of a document with an explicit id.
    ///
    /// Firestore's `createDocument` with a `documentId` parameter fails with
    /// `409 ALREADY_EXISTS` when the id is taken, which makes the existence
    /// check and the write a single atomic operation — there is no window
    /// for a concurrent writer between a separate lookup and the insert.
    pub async fn create_document(
        &self,
        collection: &str,
        doc_id: &str,
        fields: &Fields,
    ) -> Result<Document, FirestoreError> {
        let response = self
            .http
            .post(self.collection_url(collection))
            .query(&[("documentId", doc_id), ("key", self.api_key.as_str())])
            .json(&CreateDocumentBody { fields })
            .send()
            .await?;

        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// Delete a document by id.
    ///
    /// Firestore deletes are idempotent (deleting a missing document
    /// succeeds); callers that need a 404 check existence first.
    pub async fn delete_document(
        &self,
        collection: &str,
        doc_id: &str,
    ) -> Result<(), FirestoreError> {
        let response = self
            .http
            .delete(self.document_url(collection, doc_id))
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    /// Fetch every document of a collection ordered by `order_field`
    /// descending.
    ///
    /// Uses the `:runQuery` endpoint with a structured query; the whole
    /// collection is returned in one shot, there is no pagination.
    pub async fn list_descending(
        &self,
        collection: &str,
        order_field: &str,
    ) -> Result<Vec<Document>, FirestoreError> {
        let query = serde_json::json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection }],
                "orderBy": [{
                    "field": { "fieldPath": order_field },
                    "direction": "DESCENDING"
                }]
            }
        });

        let response = self
            .http
            .post(format!("{}:runQuery", self.documents_url))
            .query(&[("key", self.api_key.as_str())])
            .json(&query)
            .send()
            .await?;

        let response = Self::check(response).await?;
        let rows: Vec<QueryRow> = response.json().await?;

        // Rows without a document only carry the query read time.
        Ok(rows.into_iter().filter_map(|row| row.document).collect())
    }

    /// Cheap reachability probe: list at most one document of a collection.
    pub async fn ping(&self, collection: &str) -> Result<(), FirestoreError> {
        let response = self
            .http
            .get(self.collection_url(collection))
            .query(&[("pageSize", "1"), ("key", self.api_key.as_str())])
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    /// Convert a non-success reply into a [`FirestoreError`].
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, FirestoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Pull the human-readable message out of the google error body when
        // there is one; fall back to the bare status line otherwise.
        let message = match response.json::<GoogleErrorBody>().await {
            Ok(body) => body.error.message,
            Err(_) => status.to_string(),
        };

        Err(classify(status, message))
    }
}

/// Map an HTTP status plus store message to the error taxonomy.
fn classify(status: StatusCode, message: String) -> FirestoreError {
    match status {
        StatusCode::CONFLICT => FirestoreError::AlreadyExists,
        StatusCode::FORBIDDEN => FirestoreError::PermissionDenied(message),
        _ => FirestoreError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn should_serialize_string_value_with_tagged_envelope() {
        let value = Value::string("anasilvavip");
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json, serde_json::json!({ "stringValue": "anasilvavip" }));
    }

    #[test]
    fn should_serialize_null_value_as_explicit_null() {
        let json = serde_json::to_value(Value::null()).unwrap();
        assert_eq!(json, serde_json::json!({ "nullValue": null }));
    }

    #[test]
    fn should_round_trip_timestamp_value() {
        let instant = Utc.with_ymd_and_hms(2025, 8, 7, 14, 30, 0).unwrap();
        let value = Value::timestamp(instant);
        let json = serde_json::to_string(&value).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_timestamp(), Some(instant));
    }

    #[test]
    fn should_return_none_for_malformed_timestamp() {
        let value = Value::TimestampValue("not a date".to_string());
        assert_eq!(value.as_timestamp(), None);
    }

    #[test]
    fn should_return_none_when_reading_string_as_timestamp() {
        assert_eq!(Value::string("2025-08-07").as_timestamp(), None);
    }

    #[test]
    fn should_extract_doc_id_from_resource_name() {
        let doc = Document {
            name: "projects/p/databases/(default)/documents/afiliados/marcossilvavip".to_string(),
            fields: Fields::new(),
        };
        assert_eq!(doc.doc_id(), "marcossilvavip");
    }

    #[test]
    fn should_decode_document_without_fields() {
        let doc: Document = serde_json::from_value(serde_json::json!({
            "name": "projects/p/databases/(default)/documents/afiliados/x",
            "createTime": "2025-08-07T14:30:00Z",
            "updateTime": "2025-08-07T14:30:00Z"
        }))
        .unwrap();
        assert!(doc.fields.is_empty());
    }

    #[test]
    fn should_classify_conflict_as_already_exists() {
        let err = classify(StatusCode::CONFLICT, "Document already exists".to_string());
        assert!(matches!(err, FirestoreError::AlreadyExists));
    }

    #[test]
    fn should_classify_forbidden_as_permission_denied() {
        let err = classify(
            StatusCode::FORBIDDEN,
            "Missing or insufficient permissions.".to_string(),
        );
        match err {
            FirestoreError::PermissionDenied(msg) => {
                assert_eq!(msg, "Missing or insufficient permissions.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn should_classify_other_statuses_as_api_error() {
        let err = classify(StatusCode::SERVICE_UNAVAILABLE, "backend down".to_string());
        match err {
            FirestoreError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "backend down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn should_decode_google_error_body() {
        let body: GoogleErrorBody = serde_json::from_value(serde_json::json!({
            "error": {
                "code": 403,
                "message": "Missing or insufficient permissions.",
                "status": "PERMISSION_DENIED"
            }
        }))
        .unwrap();
        assert_eq!(body.error.message, "Missing or insufficient permissions.");
    }
}
