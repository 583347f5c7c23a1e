//! Async HTTP client wrapping the catalog platform's JSON API.

use std::time::Duration;

use anyhow::Context;
use loupe_core::{
  SaveFailure,
  activity::Activity,
  catalog::Catalog,
  entity::DataEntityDetails,
  query::{ActivityCounts, ActivityQuery},
};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Connection settings for the catalog API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub token:    Option<String>,
}

#[derive(Debug, Error)]
pub enum ClientError {
  #[error("{method} {path} failed: {source}")]
  Transport {
    method: &'static str,
    path:   String,
    #[source]
    source: reqwest::Error,
  },

  #[error("{method} {path} → {status}")]
  Status {
    method: &'static str,
    path:   String,
    status: StatusCode,
  },

  #[error(transparent)]
  Query(#[from] loupe_core::Error),
}

type Result<T> = std::result::Result<T, ClientError>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DescriptionUpdate<'a> {
  internal_description: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescriptionResponse {
  #[serde(default)]
  internal_description: Option<String>,
}

/// Async HTTP client for the catalog REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    match self.config.token.as_deref().filter(|t| !t.is_empty()) {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  /// `GET /api{path}` with `params`, decoding a JSON body.
  async fn get_json<T: serde::de::DeserializeOwned>(
    &self,
    path: String,
    params: &[(&'static str, String)],
  ) -> Result<T> {
    tracing::debug!(%path, "GET");
    let transport = |source| ClientError::Transport {
      method: "GET",
      path: path.clone(),
      source,
    };

    let resp = self
      .auth(self.client.get(self.url(&path)))
      .query(params)
      .send()
      .await
      .map_err(transport)?;

    if !resp.status().is_success() {
      return Err(ClientError::Status {
        method: "GET",
        path,
        status: resp.status(),
      });
    }
    resp.json().await.map_err(transport)
  }
}

impl Catalog for ApiClient {
  type Error = ClientError;

  /// `GET /api/activity`
  async fn list_activities(&self, query: &ActivityQuery) -> Result<Vec<Activity>> {
    query.validate()?;
    self.get_json("/activity".into(), &query.to_params()).await
  }

  /// `GET /api/activity/counts`
  async fn activity_counts(&self, query: &ActivityQuery) -> Result<ActivityCounts> {
    query.validate()?;
    let mut params = query.first_page().to_params();
    params.retain(|(key, _)| *key != "type" && *key != "size");
    self.get_json("/activity/counts".into(), &params).await
  }

  /// `GET /api/dataentities/{id}/activity`
  async fn entity_activities(
    &self,
    entity_id: i64,
    query: &ActivityQuery,
  ) -> Result<Vec<Activity>> {
    query.validate()?;
    let mut params = query.to_params();
    params.retain(|(key, _)| *key != "type");
    self
      .get_json(format!("/dataentities/{entity_id}/activity"), &params)
      .await
  }

  /// `GET /api/dataentities/{id}/details`
  async fn entity_details(&self, entity_id: i64) -> Result<DataEntityDetails> {
    self
      .get_json(format!("/dataentities/{entity_id}/details"), &[])
      .await
  }

  /// `PUT /api/dataentities/{id}/description`
  async fn update_description(
    &self,
    entity_id: i64,
    text: String,
  ) -> std::result::Result<String, SaveFailure> {
    let path = format!("/dataentities/{entity_id}/description");
    tracing::debug!(%path, "PUT");

    let resp = self
      .auth(self.client.put(self.url(&path)))
      .json(&DescriptionUpdate { internal_description: &text })
      .send()
      .await
      .map_err(|e| {
        tracing::warn!(%path, error = %e, "description save did not reach the server");
        SaveFailure::default()
      })?;

    let status = resp.status();
    if !status.is_success() {
      return Err(save_failure(status));
    }

    // Older servers answer with an empty body.
    match resp.json::<DescriptionResponse>().await {
      Ok(DescriptionResponse { internal_description: Some(saved) }) => Ok(saved),
      Ok(_) => Ok(text),
      Err(e) => {
        tracing::debug!(%path, error = %e, "unreadable save response, keeping sent text");
        Ok(text)
      }
    }
  }
}

/// A non-2xx save answer, carrying the status's reason phrase.
fn save_failure(status: StatusCode) -> SaveFailure {
  SaveFailure {
    status_text: status.canonical_reason().map(str::to_string),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn client(base_url: &str, token: Option<&str>) -> ApiClient {
    ApiClient::new(ApiConfig {
      base_url: base_url.to_string(),
      token:    token.map(Into::into),
    })
    .unwrap()
  }

  #[test]
  fn url_joins_without_double_slash() {
    let c = client("http://catalog:8080/", None);
    assert_eq!(c.url("/activity"), "http://catalog:8080/api/activity");
  }

  #[test]
  fn save_failure_carries_reason_phrase() {
    assert_eq!(
      save_failure(StatusCode::SERVICE_UNAVAILABLE).message(),
      "Service Unavailable"
    );
    assert_eq!(
      save_failure(StatusCode::from_u16(599).unwrap()).message(),
      SaveFailure::FALLBACK_MESSAGE
    );
  }

  #[test]
  fn update_body_uses_api_field_name() {
    let body = serde_json::to_value(DescriptionUpdate { internal_description: "hi" }).unwrap();
    assert_eq!(body, serde_json::json!({ "internalDescription": "hi" }));
  }
}
