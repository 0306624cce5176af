//! # quill-sync: Client-Side Sync Orchestrator
//!
//! Manages the lifecycle of synchronization from the client's perspective,
//! independent of any particular UI.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Sync Orchestrator Architecture                      │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      SyncOrchestrator                            │  │
//! │  │                                                                  │  │
//! │  │  • Owns the held session (token pair) and its lifecycle          │  │
//! │  │  • Serializes sync cycles through a single-slot guard            │  │
//! │  │  • Runs the coalescing periodic timer                            │  │
//! │  │  • Emits auth-state-changed to the control surface               │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ SessionGateway │  │  SyncStatus    │  │  AuthEventEmitter      │    │
//! │  │ (HTTP client)  │  │  (in-memory)   │  │  (observer seam)       │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  STATE MACHINE:                                                        │
//! │  Disconnected ──login/register──► Idle ──manual_sync──► Syncing        │
//! │       ▲                            ▲                       │            │
//! │       │◄───logout/auth-expiry──────┴───────cycle ends─────┘            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`orchestrator`] - `SyncOrchestrator`, `SyncStatus`, emitter trait
//! - [`gateway`] - `SessionGateway` trait + reqwest implementation
//! - [`session`] - the held token pair
//! - [`config`] - `SyncConfig`
//! - [`error`] - sync error taxonomy

pub mod config;
pub mod error;
pub mod gateway;
pub mod orchestrator;
pub mod session;

pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use gateway::{
    CredentialRequest, CycleReceipt, HttpGateway, SessionGateway, SessionResponse,
};
pub use orchestrator::{AuthEventEmitter, NoOpEmitter, SyncOrchestrator, SyncStatus};
pub use session::Session;
