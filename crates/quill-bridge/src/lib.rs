//! # quill-bridge: Control Surface for Quillsync
//!
//! Exposes orchestrator and auth operations to a UI process and relays the
//! asynchronous auth-state-changed notification back to it.
//!
//! ## Command Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bridge Commands                                  │
//! │                                                                         │
//! │  login / register       - authenticate, adopt session                  │
//! │  logout                 - revoke session, stop timer                   │
//! │  manual_sync            - run one cycle now                            │
//! │  get_status             - non-blocking status snapshot                 │
//! │  get_config             - server URL + interval                        │
//! │  start_periodic_sync    - enable the recurring timer                   │
//! │  stop_periodic_sync     - disable the recurring timer                  │
//! │                                                                         │
//! │  Every command returns CommandResponse { success, data?, error? }.     │
//! │                                                                         │
//! │  OUTBOUND NOTIFICATION:                                                │
//! │  auth-state-changed (no payload) - the UI re-queries status/config     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod dto;
pub mod error;
pub mod events;

pub use commands::*;
pub use dto::{Acknowledgement, SyncConfigDto, SyncReceiptDto, SyncStatusDto};
pub use error::{BridgeError, CommandResponse, ErrorCode};
pub use events::AuthEventChannel;
