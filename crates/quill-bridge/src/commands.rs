//! # Bridge Commands
//!
//! The operations a UI shell invokes. Each wraps an orchestrator call and
//! normalizes the outcome into [`CommandResponse`]; commands never return a
//! Rust error to the shell.

use serde::Deserialize;
use tracing::debug;

use quill_core::User;
use quill_sync::SyncOrchestrator;

use crate::dto::{Acknowledgement, SyncConfigDto, SyncReceiptDto, SyncStatusDto};
use crate::error::CommandResponse;

/// Request body for `login` and `register`.
///
/// Device identity is not part of the request: the orchestrator binds the
/// device it was configured with.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsInput {
    pub email: String,
    pub password: String,
}

/// Registers a new account and signs the device in.
pub async fn register(
    orchestrator: &SyncOrchestrator,
    input: CredentialsInput,
) -> CommandResponse<User> {
    debug!("register command");
    CommandResponse::from_result(orchestrator.register(&input.email, &input.password).await)
}

/// Logs the device into an existing account.
pub async fn login(
    orchestrator: &SyncOrchestrator,
    input: CredentialsInput,
) -> CommandResponse<User> {
    debug!("login command");
    CommandResponse::from_result(orchestrator.login(&input.email, &input.password).await)
}

/// Logs out and revokes the held session.
pub async fn logout(orchestrator: &SyncOrchestrator) -> CommandResponse<Acknowledgement> {
    debug!("logout command");
    CommandResponse::from_result(
        orchestrator
            .logout()
            .await
            .map(|_| Acknowledgement::new("Logged out")),
    )
}

/// Runs one sync cycle now.
pub async fn manual_sync(orchestrator: &SyncOrchestrator) -> CommandResponse<SyncReceiptDto> {
    debug!("manual_sync command");
    CommandResponse::from_result(orchestrator.manual_sync().await.map(SyncReceiptDto::from))
}

/// Returns the current status snapshot. Never blocks.
pub fn get_status(orchestrator: &SyncOrchestrator) -> CommandResponse<SyncStatusDto> {
    CommandResponse::ok(SyncStatusDto::from(orchestrator.status()))
}

/// Returns the sync configuration. Read-only.
pub fn get_config(orchestrator: &SyncOrchestrator) -> CommandResponse<SyncConfigDto> {
    CommandResponse::ok(SyncConfigDto::from(orchestrator.config()))
}

/// Enables the periodic timer; returns the updated status.
pub fn start_periodic_sync(orchestrator: &SyncOrchestrator) -> CommandResponse<SyncStatusDto> {
    orchestrator.start_periodic_sync();
    CommandResponse::ok(SyncStatusDto::from(orchestrator.status()))
}

/// Disables the periodic timer; returns the updated status.
pub fn stop_periodic_sync(orchestrator: &SyncOrchestrator) -> CommandResponse<SyncStatusDto> {
    orchestrator.stop_periodic_sync();
    CommandResponse::ok(SyncStatusDto::from(orchestrator.status()))
}

// =============================================================================
// Unit Tests
// =============================================================================
