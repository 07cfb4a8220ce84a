//! HTTP client for the external narrative/content service, plus the
//! `ContentProvider` trait that keeps the Event Engine backend-agnostic.
//! The service may be unavailable indefinitely; every failure mode here maps
//! to a `ContentError` the engine recovers from locally.

pub mod error;
pub mod provider;

pub use error::{ContentError, ContentResult};
pub use provider::{ContentProvider, EventContext};

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sim_core::{GameEvent, ResolvedConsequences};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    operation: &'static str,
    context: &'a EventContext,
}

#[derive(Debug, Serialize)]
struct ResolveRequest<'a> {
    operation: &'static str,
    event: &'a GameEvent,
    choice_id: &'a str,
    context: &'a EventContext,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    event: GameEvent,
}

#[derive(Debug, Deserialize)]
struct ResolveResponse {
    consequences: ResolvedConsequences,
}

/// HTTP-backed content provider.
#[derive(Clone)]
pub struct HttpContentClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpContentClient {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { base_url, client }
    }

    fn endpoint(&self) -> String {
        format!("{}/events", self.base_url.trim_end_matches('/'))
    }

    fn map_transport_error(err: reqwest::Error) -> ContentError {
        if err.is_timeout() {
            ContentError::Timeout
        } else {
            ContentError::RequestFailed(err)
        }
    }
}

#[async_trait]
impl ContentProvider for HttpContentClient {
    async fn generate_event(&self, context: &EventContext) -> ContentResult<GameEvent> {
        let request = GenerateRequest {
            operation: "generate",
            context,
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        if !response.status().is_success() {
            return Err(ContentError::ServiceUnavailable(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ContentError::InvalidResponse(e.to_string()))?;
        tracing::debug!(event_type = %body.event.event_type, "content service generated event");
        Ok(body.event)
    }

    async fn resolve_event(
        &self,
        event: &GameEvent,
        choice_id: &str,
        context: &EventContext,
    ) -> ContentResult<ResolvedConsequences> {
        let request = ResolveRequest {
            operation: "resolve",
            event,
            choice_id,
            context,
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        if !response.status().is_success() {
            return Err(ContentError::ServiceUnavailable(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body: ResolveResponse = response
            .json()
            .await
            .map_err(|e| ContentError::InvalidResponse(e.to_string()))?;
        Ok(body.consequences)
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::{GameSnapshot, Season};

    #[test]
    fn test_context_from_snapshot() {
        let mut snapshot = GameSnapshot::new_game("p1");
        snapshot.weather.drought_risk = 0.7;

        let ctx = EventContext::from_snapshot(&snapshot);
        assert_eq!(ctx.money, 50_000);
        assert_eq!(ctx.season, Season::Kharif);
        assert_eq!(ctx.day, 1);
        assert_eq!(ctx.drought_risk, 0.7);
        assert_eq!(ctx.active_loans, 0);
    }

    #[test]
    fn test_generate_request_wire_shape() {
        let snapshot = GameSnapshot::new_game("p1");
        let ctx = EventContext::from_snapshot(&snapshot);
        let request = GenerateRequest {
            operation: "generate",
            context: &ctx,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["operation"], "generate");
        assert_eq!(value["context"]["money"], 50_000);
        assert_eq!(value["context"]["season"], "Kharif");
    }

    #[test]
    fn test_endpoint_normalizes_trailing_slash() {
        let client = HttpContentClient::new(
            "http://localhost:8006/".to_string(),
            Duration::from_secs(5),
        );
        assert_eq!(client.endpoint(), "http://localhost:8006/events");
    }
}
