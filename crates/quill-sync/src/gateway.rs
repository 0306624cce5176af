//! # Session Gateway Client
//!
//! The orchestrator's view of the server: an object-safe trait so tests
//! can substitute a stub, plus the reqwest implementation used in
//! production.
//!
//! ## Status Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Endpoint         OK            Failure → SyncError                    │
//! │  ─────────        ──            ───────────────────                    │
//! │  POST register    201           409 Conflict, 400 Validation           │
//! │  POST login       200           401 InvalidCredentials, 400 Validation │
//! │  POST refresh     200           403 InvalidRefreshToken                │
//! │  POST logout      200           (lenient - logout is best effort)      │
//! │  POST sync        200           401 AuthExpired (access token stale)   │
//! │                                                                         │
//! │  connect/timeout failures → NetworkOrTimeout on every endpoint         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use quill_core::User;

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};

// =============================================================================
// Wire Types
// =============================================================================

/// Request body for register/login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRequest {
    pub email: String,
    pub password: String,
    pub device_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
}

/// Successful register/login response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Outcome of one sync cycle.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReceipt {
    /// Server-side timestamp of the completed cycle.
    pub server_time: DateTime<Utc>,

    /// Internal device row id the cycle was recorded against.
    pub device_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

// =============================================================================
// Gateway Trait
// =============================================================================

/// The session gateway contract the orchestrator depends on.
///
/// Object-safe so the orchestrator holds `Arc<dyn SessionGateway>` and
/// tests can substitute stubs.
#[async_trait]
pub trait SessionGateway: Send + Sync {
    /// Registers a new account; returns the user and a fresh token pair.
    async fn register(&self, request: &CredentialRequest) -> SyncResult<SessionResponse>;

    /// Logs into an existing account; returns the user and a fresh pair.
    async fn login(&self, request: &CredentialRequest) -> SyncResult<SessionResponse>;

    /// Exchanges a refresh token for a new access token.
    async fn refresh(&self, refresh_token: &str) -> SyncResult<String>;

    /// Revokes a refresh token.
    async fn logout(&self, refresh_token: &str) -> SyncResult<()>;

    /// Performs one authenticated sync cycle.
    async fn sync_cycle(&self, access_token: &str) -> SyncResult<CycleReceipt>;
}

// =============================================================================
// HTTP Implementation
// =============================================================================

/// reqwest-backed gateway client.
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    /// Creates a gateway client with the config's bounded timeout.
    pub fn new(config: &SyncConfig) -> SyncResult<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| SyncError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(HttpGateway {
            client,
            base_url: config.server_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Extracts the `error` field from a failure body, falling back to the
    /// status text.
    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        }
    }

    async fn credentials_call(
        &self,
        path: &str,
        request: &CredentialRequest,
        expect: StatusCode,
    ) -> SyncResult<SessionResponse> {
        let response = self.client.post(self.url(path)).json(request).send().await?;

        let status = response.status();
        if status == expect {
            return Ok(response.json::<SessionResponse>().await?);
        }

        let message = Self::error_message(response).await;
        Err(match status {
            StatusCode::BAD_REQUEST => SyncError::Validation(message),
            StatusCode::UNAUTHORIZED => SyncError::InvalidCredentials,
            StatusCode::CONFLICT => SyncError::Conflict,
            _ => SyncError::Gateway {
                status: status.as_u16(),
                message,
            },
        })
    }
}

#[async_trait]
impl SessionGateway for HttpGateway {
    async fn register(&self, request: &CredentialRequest) -> SyncResult<SessionResponse> {
        self.credentials_call("/auth/register", request, StatusCode::CREATED)
            .await
    }

    async fn login(&self, request: &CredentialRequest) -> SyncResult<SessionResponse> {
        self.credentials_call("/auth/login", request, StatusCode::OK)
            .await
    }

    async fn refresh(&self, refresh_token: &str) -> SyncResult<String> {
        let response = self
            .client
            .post(self.url("/auth/refresh"))
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(response.json::<RefreshResponse>().await?.access_token);
        }

        let message = Self::error_message(response).await;
        Err(match status {
            StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => SyncError::InvalidRefreshToken,
            _ => SyncError::Gateway {
                status: status.as_u16(),
                message,
            },
        })
    }

    async fn logout(&self, refresh_token: &str) -> SyncResult<()> {
        let response = self
            .client
            .post(self.url("/auth/logout"))
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;

        // Logout is idempotent server-side; any 2xx is success.
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let message = Self::error_message(response).await;
            Err(SyncError::Gateway {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn sync_cycle(&self, access_token: &str) -> SyncResult<CycleReceipt> {
        let response = self
            .client
            .post(self.url("/sync"))
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(response.json::<CycleReceipt>().await?);
        }

        let message = Self::error_message(response).await;
        Err(match status {
            // The access token was rejected; the orchestrator gets one
            // transparent refresh before giving up on the cycle.
            StatusCode::UNAUTHORIZED => SyncError::AuthExpired,
            _ => SyncError::Gateway {
                status: status.as_u16(),
                message,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncConfig;

    #[test]
    fn test_url_building() {
        let gateway =
            HttpGateway::new(&SyncConfig::new("http://localhost:8080/", "dev1")).unwrap();
        assert_eq!(gateway.url("/auth/login"), "http://localhost:8080/auth/login");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(HttpGateway::new(&SyncConfig::new("::not-a-url::", "dev1")).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Reserved TEST-NET-1 address: connections fail fast.
        let config = SyncConfig::new("http://192.0.2.1:9", "dev1").request_timeout_secs(1);
        let gateway = HttpGateway::new(&config).unwrap();

        let err = gateway.sync_cycle("token").await.unwrap_err();
        assert!(matches!(err, SyncError::NetworkOrTimeout(_)));
    }
}
