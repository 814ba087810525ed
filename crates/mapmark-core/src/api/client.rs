//! HTTP client for the spreadsheet-backed place store.
//!
//! The remote is a single web-app URL: GET returns the full place list,
//! POST carries `{action, ...fields, appKey}` mutations. Both respond with
//! an `{ok, data?, error?}` envelope.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::models::place::deserialize_opt_id;
use crate::models::{Place, PlaceDraft};

use super::ApiError;

/// HTTP request timeout.
/// 30s rides out slow script cold starts while still failing fast enough
/// for an interactive frontend.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// The hosted script reads JSON out of a plain-text body; a JSON content
/// type would cost web callers a CORS pre-flight round-trip per mutation.
const POST_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

#[derive(Debug, Deserialize)]
struct ListEnvelope {
    ok: bool,
    #[serde(default)]
    data: Vec<Place>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MutateEnvelope {
    ok: bool,
    #[serde(default)]
    data: Option<MutateData>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct MutateData {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    id: Option<String>,
}

/// Remote CRUD surface for place records.
///
/// [`ApiClient`] is the production implementation; the store is generic
/// over this trait so an in-memory remote can stand in under test.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Place>, ApiError>;

    /// Returns the id the remote assigned to the new record.
    async fn create(&self, draft: &PlaceDraft) -> Result<String, ApiError>;

    async fn update(&self, place: &Place) -> Result<(), ApiError>;

    async fn delete(&self, id: &str) -> Result<(), ApiError>;
}

/// Client for the place store web app.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    endpoint: String,
    app_key: String,
}

impl ApiClient {
    pub fn new(endpoint: impl Into<String>, app_key: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            app_key: app_key.into(),
        })
    }

    async fn post_action(&self, mut body: Value) -> Result<MutateEnvelope, ApiError> {
        if let Some(map) = body.as_object_mut() {
            map.insert("appKey".to_string(), Value::String(self.app_key.clone()));
        }
        let text = serde_json::to_string(&body)?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(header::CONTENT_TYPE, POST_CONTENT_TYPE)
            .body(text)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }

        let text = response.text().await?;
        debug!(bytes = text.len(), "Mutation response received");
        Ok(serde_json::from_str(&text)?)
    }

    fn check_mutation(envelope: MutateEnvelope) -> Result<Option<MutateData>, ApiError> {
        if envelope.ok {
            Ok(envelope.data)
        } else {
            Err(ApiError::Rejected(
                envelope
                    .error
                    .unwrap_or_else(|| "no error detail".to_string()),
            ))
        }
    }
}

#[async_trait]
impl RemoteStore for ApiClient {
    async fn fetch_all(&self) -> Result<Vec<Place>, ApiError> {
        let response = self.client.get(&self.endpoint).send().await?;

        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }

        let text = response.text().await?;
        debug!(bytes = text.len(), "Place list response received");

        let envelope: ListEnvelope = serde_json::from_str(&text)?;
        if envelope.ok {
            Ok(envelope.data)
        } else {
            Err(ApiError::Rejected(
                envelope
                    .error
                    .unwrap_or_else(|| "no error detail".to_string()),
            ))
        }
    }

    async fn create(&self, draft: &PlaceDraft) -> Result<String, ApiError> {
        let body = serde_json::json!({
            "action": "add",
            "id": null,
            "name": draft.name,
            "address": draft.address,
            "lat": draft.lat,
            "lng": draft.lng,
            "color": draft.color,
            "timestamp": draft.timestamp,
        });

        let data = Self::check_mutation(self.post_action(body).await?)?;
        data.and_then(|d| d.id).ok_or(ApiError::MissingId)
    }

    async fn update(&self, place: &Place) -> Result<(), ApiError> {
        let body = serde_json::json!({
            "action": "update",
            "id": place.id,
            "name": place.name,
            "address": place.address,
            "lat": place.lat,
            "lng": place.lng,
            "color": place.color,
            "timestamp": place.timestamp,
        });

        Self::check_mutation(self.post_action(body).await?)?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let body = serde_json::json!({
            "action": "delete",
            "id": id,
        });

        Self::check_mutation(self.post_action(body).await?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_envelope() {
        let json = r##"{"ok":true,"data":[{"id":"1","name":"A","lat":10.0,"lng":106.0},{"id":2,"name":"B","lat":10.1,"lng":106.1,"color":"#00ff00"}]}"##;
        let envelope: ListEnvelope = serde_json::from_str(json).unwrap();
        assert!(envelope.ok);
        assert_eq!(envelope.data.len(), 2);
        assert_eq!(envelope.data[1].id, "2");
        assert_eq!(envelope.data[1].color, "#00ff00");
    }

    #[test]
    fn test_parse_list_envelope_error() {
        let json = r#"{"ok":false,"error":"appKey mismatch"}"#;
        let envelope: ListEnvelope = serde_json::from_str(json).unwrap();
        assert!(!envelope.ok);
        assert!(envelope.data.is_empty());
        assert_eq!(envelope.error.as_deref(), Some("appKey mismatch"));
    }

    #[test]
    fn test_parse_mutate_envelope_with_numeric_id() {
        let json = r#"{"ok":true,"data":{"id":1712345678901}}"#;
        let envelope: MutateEnvelope = serde_json::from_str(json).unwrap();
        let data = ApiClient::check_mutation(envelope).unwrap();
        assert_eq!(data.unwrap().id.as_deref(), Some("1712345678901"));
    }

    #[test]
    fn test_parse_mutate_envelope_without_data() {
        let json = r#"{"ok":true}"#;
        let envelope: MutateEnvelope = serde_json::from_str(json).unwrap();
        let data = ApiClient::check_mutation(envelope).unwrap();
        assert!(data.is_none());
    }

    #[test]
    fn test_check_mutation_rejected() {
        let envelope: MutateEnvelope =
            serde_json::from_str(r#"{"ok":false,"error":"row not found"}"#).unwrap();
        let err = ApiClient::check_mutation(envelope).unwrap_err();
        assert!(matches!(err, ApiError::Rejected(ref msg) if msg == "row not found"));
    }
}
