//! # Sync Orchestrator
//!
//! The client-side state machine driving scheduled and on-demand sync.
//!
//! ## States
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Orchestrator States                              │
//! │                                                                         │
//! │              login / register                                          │
//! │  Disconnected ───────────────► Idle ◄──────────────┐                   │
//! │       ▲                          │                 │                   │
//! │       │                          │ manual_sync     │ cycle ends        │
//! │       │ logout /                 ▼                 │ (ok or err)       │
//! │       │ AuthExpired           Syncing ─────────────┘                   │
//! │       └──────────────────────────┘                                     │
//! │                                                                         │
//! │  • The Syncing state is the single-slot guard: a second manual_sync    │
//! │    while a cycle is in flight fails with AlreadyInProgress             │
//! │  • Idle carries a periodic-enabled / periodic-disabled sub-mode        │
//! │  • A cycle whose access token is rejected gets exactly one             │
//! │    transparent refresh; a second rejection forces Disconnected         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex as StdMutex, RwLock as StdRwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, Mutex};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use quill_core::User;

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::gateway::{CredentialRequest, CycleReceipt, HttpGateway, SessionGateway};
use crate::session::Session;

// =============================================================================
// Sync Status
// =============================================================================

/// Current sync status for external queries. Mutated only by the
/// orchestrator; reads are non-blocking snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncStatus {
    /// Whether a sync cycle is currently in flight.
    pub is_running: bool,

    /// Whether a session is held.
    pub is_authenticated: bool,

    /// Timestamp of the last successful cycle.
    pub last_sync_at: Option<DateTime<Utc>>,

    /// Message from the last failed cycle, cleared by the next success.
    pub last_error: Option<String>,

    /// Whether the periodic timer is enabled.
    pub periodic_enabled: bool,
}

impl Default for SyncStatus {
    fn default() -> Self {
        SyncStatus {
            is_running: false,
            is_authenticated: false,
            last_sync_at: None,
            last_error: None,
            periodic_enabled: false,
        }
    }
}

// =============================================================================
// Event Emitter Trait
// =============================================================================

/// Observer seam for the control surface.
///
/// Fired after login, register, logout, and forced disconnect. Carries no
/// payload: the UI re-queries `status()`/`config()`.
pub trait AuthEventEmitter: Send + Sync {
    /// Signals that authentication state changed.
    fn auth_state_changed(&self);
}

/// No-op event emitter for headless use and testing.
pub struct NoOpEmitter;

impl AuthEventEmitter for NoOpEmitter {
    fn auth_state_changed(&self) {}
}

// =============================================================================
// Sync Orchestrator
// =============================================================================

/// Client-side sync orchestrator.
///
/// Cheap to clone; clones share the session, status, and the single-slot
/// cycle guard. One logical instance exists per client session.
#[derive(Clone)]
pub struct SyncOrchestrator {
    /// Orchestrator configuration (read-only).
    config: Arc<SyncConfig>,

    /// Gateway used for auth and sync calls.
    gateway: Arc<dyn SessionGateway>,

    /// Held session, if any. Never locked across an await.
    session: Arc<StdRwLock<Option<Session>>>,

    /// Current status. Never locked across an await.
    status: Arc<StdRwLock<SyncStatus>>,

    /// Single-slot in-flight guard; the holder is the Syncing state.
    cycle_guard: Arc<Mutex<()>>,

    /// Shutdown sender for the periodic timer task, when running.
    periodic: Arc<StdMutex<Option<mpsc::Sender<()>>>>,

    /// Event emitter for the control surface.
    emitter: Arc<dyn AuthEventEmitter>,
}

impl SyncOrchestrator {
    /// Creates an orchestrator backed by the HTTP gateway.
    pub fn new(config: SyncConfig) -> SyncResult<Self> {
        let gateway = Arc::new(HttpGateway::new(&config)?);
        Ok(Self::with_gateway(config, gateway, Arc::new(NoOpEmitter)))
    }

    /// Creates an orchestrator with a custom gateway and emitter.
    pub fn with_gateway(
        config: SyncConfig,
        gateway: Arc<dyn SessionGateway>,
        emitter: Arc<dyn AuthEventEmitter>,
    ) -> Self {
        SyncOrchestrator {
            config: Arc::new(config),
            gateway,
            session: Arc::new(StdRwLock::new(None)),
            status: Arc::new(StdRwLock::new(SyncStatus::default())),
            cycle_guard: Arc::new(Mutex::new(())),
            periodic: Arc::new(StdMutex::new(None)),
            emitter,
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Returns a snapshot of the current status. Never blocks on network,
    /// never fails.
    pub fn status(&self) -> SyncStatus {
        self.status.read().map(|s| s.clone()).unwrap_or_default()
    }

    /// Returns the orchestrator configuration.
    pub fn config(&self) -> SyncConfig {
        (*self.config).clone()
    }

    // =========================================================================
    // Auth Operations
    // =========================================================================

    /// Registers a new account and adopts the returned session.
    pub async fn register(&self, email: &str, password: &str) -> SyncResult<User> {
        let request = self.credential_request(email, password);
        let response = self.gateway.register(&request).await?;

        info!(user_id = %response.user.id, "Account registered");
        Ok(self.adopt_session(response))
    }

    /// Logs in and adopts the returned session.
    pub async fn login(&self, email: &str, password: &str) -> SyncResult<User> {
        let request = self.credential_request(email, password);
        let response = self.gateway.login(&request).await?;

        info!(user_id = %response.user.id, "Logged in");
        Ok(self.adopt_session(response))
    }

    /// Logs out: revokes the session on the server (best effort), clears
    /// held tokens, stops the periodic timer, and signals the change.
    ///
    /// A no-op when no session is held.
    pub async fn logout(&self) -> SyncResult<()> {
        let session = match self.session.write() {
            Ok(mut s) => s.take(),
            Err(_) => None,
        };

        let Some(session) = session else {
            return Ok(());
        };

        self.stop_periodic_sync();

        if let Err(e) = self.gateway.logout(&session.refresh_token).await {
            // The local session is gone either way; the server row dies at
            // its natural expiry.
            warn!(error = %e, "Failed to revoke session on server");
        }

        self.update_status(|s| s.is_authenticated = false);
        self.emitter.auth_state_changed();

        info!("Logged out");
        Ok(())
    }

    // =========================================================================
    // Sync Operations
    // =========================================================================

    /// Performs one sync cycle.
    ///
    /// Fails with [`SyncError::AlreadyInProgress`] if a cycle is in flight.
    /// A cycle whose access token is rejected attempts exactly one
    /// transparent refresh; a second rejection surfaces as
    /// [`SyncError::AuthExpired`] and forces Disconnected. The outcome is
    /// recorded in `last_sync_at`/`last_error` either way.
    pub async fn manual_sync(&self) -> SyncResult<CycleReceipt> {
        let guard = match self.cycle_guard.try_lock() {
            Ok(guard) => guard,
            Err(_) => return Err(SyncError::AlreadyInProgress),
        };

        let (access, refresh) = {
            let session = self.session.read().map_err(|_| {
                SyncError::Internal("session lock poisoned".into())
            })?;
            match session.as_ref() {
                Some(s) => (s.access_token.clone(), s.refresh_token.clone()),
                None => return Err(SyncError::NotAuthenticated),
            }
        };

        self.update_status(|s| s.is_running = true);
        debug!("Sync cycle started");

        let outcome = self.run_cycle(&access, &refresh).await;

        self.update_status(|s| {
            s.is_running = false;
            match &outcome {
                Ok(receipt) => {
                    s.last_sync_at = Some(receipt.server_time);
                    s.last_error = None;
                }
                Err(e) => {
                    s.last_error = Some(e.to_string());
                }
            }
        });

        match &outcome {
            Ok(_) => debug!("Sync cycle completed"),
            Err(e) => debug!(error = %e, "Sync cycle failed"),
        }

        drop(guard);
        outcome
    }

    /// One cycle with at most one transparent refresh.
    async fn run_cycle(&self, access: &str, refresh: &str) -> SyncResult<CycleReceipt> {
        match self.gateway.sync_cycle(access).await {
            Err(SyncError::AuthExpired) => {
                debug!("Access token rejected, attempting refresh");

                let new_access = match self.gateway.refresh(refresh).await {
                    Ok(token) => token,
                    Err(e) => {
                        warn!(error = %e, "Token refresh failed, session expired");
                        self.force_disconnect();
                        return Err(SyncError::AuthExpired);
                    }
                };

                if let Ok(mut session) = self.session.write() {
                    if let Some(s) = session.as_mut() {
                        s.access_token = new_access.clone();
                    }
                }

                match self.gateway.sync_cycle(&new_access).await {
                    Err(SyncError::AuthExpired) => {
                        warn!("Access token rejected after refresh, session expired");
                        self.force_disconnect();
                        Err(SyncError::AuthExpired)
                    }
                    other => other,
                }
            }
            other => other,
        }
    }

    // =========================================================================
    // Periodic Sync
    // =========================================================================

    /// Enables the periodic timer. Idempotent: starting an already-started
    /// timer is a no-op.
    ///
    /// Ticks that land while a cycle is still running hit the in-flight
    /// guard and are skipped, never queued. One failed cycle never stops
    /// the timer.
    pub fn start_periodic_sync(&self) {
        let Ok(mut slot) = self.periodic.lock() else {
            return;
        };

        if slot.is_some() {
            debug!("Periodic sync already running");
            return;
        }

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        *slot = Some(shutdown_tx);
        drop(slot);

        self.update_status(|s| s.periodic_enabled = true);
        info!(interval_secs = self.config.interval_secs, "Periodic sync started");

        let orchestrator = self.clone();
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(orchestrator.config.interval_secs));
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick fires immediately; consume it so cycles run
            // every interval from now, not at start.
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        match orchestrator.manual_sync().await {
                            Err(SyncError::AlreadyInProgress) => {
                                debug!("Periodic tick coalesced, cycle still running");
                            }
                            Err(e) => {
                                // Recorded in last_error; retried next tick.
                                debug!(error = %e, "Periodic cycle failed");
                            }
                            Ok(_) => {}
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }

            debug!("Periodic sync task stopped");
        });
    }

    /// Disables the periodic timer. Idempotent: stopping an
    /// already-stopped timer is a no-op. Does not abort an in-flight
    /// cycle; it only prevents future scheduling.
    pub fn stop_periodic_sync(&self) {
        let sender = match self.periodic.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };

        if sender.is_some() {
            // Dropping the sender ends the timer task's recv arm.
            self.update_status(|s| s.periodic_enabled = false);
            info!("Periodic sync stopped");
        }
    }

    /// Releases orchestrator resources. Called when the owning session
    /// ends; safe to call multiple times.
    pub fn dispose(&self) {
        self.stop_periodic_sync();
        debug!("Orchestrator disposed");
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn credential_request(&self, email: &str, password: &str) -> CredentialRequest {
        CredentialRequest {
            email: email.to_string(),
            password: password.to_string(),
            device_id: self.config.device_id.clone(),
            device_name: self.config.device_name.clone(),
        }
    }

    /// Stores a fresh session, transitions to Idle, and signals the change.
    fn adopt_session(&self, response: crate::gateway::SessionResponse) -> User {
        let user = response.user.clone();

        if let Ok(mut session) = self.session.write() {
            *session = Some(Session::new(
                response.user,
                response.access_token,
                response.refresh_token,
            ));
        }

        self.update_status(|s| {
            s.is_authenticated = true;
            s.last_error = None;
        });
        self.emitter.auth_state_changed();

        user
    }

    /// Clears the session after an unrecoverable auth failure. The caller
    /// must re-login; the periodic timer keeps ticking and records
    /// NotAuthenticated until then.
    fn force_disconnect(&self) {
        if let Ok(mut session) = self.session.write() {
            *session = None;
        }

        self.update_status(|s| s.is_authenticated = false);
        self.emitter.auth_state_changed();
    }

    fn update_status(&self, apply: impl FnOnce(&mut SyncStatus)) {
        if let Ok(mut status) = self.status.write() {
            apply(&mut status);
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::SessionResponse;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scriptable in-memory gateway.
    struct StubGateway {
        /// How many sync_cycle calls (counting from 1) should be rejected
        /// with AuthExpired before succeeding.
        reject_cycles: usize,

        /// Whether refresh calls succeed.
        refresh_ok: bool,

        /// Virtual duration of one sync cycle.
        cycle_delay: Duration,

        cycle_calls: AtomicUsize,
        refresh_calls: AtomicUsize,
        logout_calls: AtomicUsize,
    }

    impl StubGateway {
        fn ok() -> Self {
            StubGateway {
                reject_cycles: 0,
                refresh_ok: true,
                cycle_delay: Duration::ZERO,
                cycle_calls: AtomicUsize::new(0),
                refresh_calls: AtomicUsize::new(0),
                logout_calls: AtomicUsize::new(0),
            }
        }

        fn rejecting(reject_cycles: usize, refresh_ok: bool) -> Self {
            StubGateway {
                reject_cycles,
                refresh_ok,
                ..Self::ok()
            }
        }

        fn slow(cycle_delay: Duration) -> Self {
            StubGateway {
                cycle_delay,
                ..Self::ok()
            }
        }

        fn response() -> SessionResponse {
            SessionResponse {
                user: User {
                    id: "user-1".to_string(),
                    email: "a@x.com".to_string(),
                    created_at: Utc::now(),
                },
                access_token: "access-0".to_string(),
                refresh_token: "refresh-0".to_string(),
            }
        }
    }

    #[async_trait]
    impl SessionGateway for StubGateway {
        async fn register(&self, _request: &CredentialRequest) -> SyncResult<SessionResponse> {
            Ok(Self::response())
        }

        async fn login(&self, _request: &CredentialRequest) -> SyncResult<SessionResponse> {
            Ok(Self::response())
        }

        async fn refresh(&self, _refresh_token: &str) -> SyncResult<String> {
            self.refresh_calls.fetch_add(1, Ordering::SeqCst);
            if self.refresh_ok {
                Ok("access-refreshed".to_string())
            } else {
                Err(SyncError::InvalidRefreshToken)
            }
        }

        async fn logout(&self, _refresh_token: &str) -> SyncResult<()> {
            self.logout_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn sync_cycle(&self, _access_token: &str) -> SyncResult<CycleReceipt> {
            let call = self.cycle_calls.fetch_add(1, Ordering::SeqCst) + 1;
            if !self.cycle_delay.is_zero() {
                tokio::time::sleep(self.cycle_delay).await;
            }
            if call <= self.reject_cycles {
                return Err(SyncError::AuthExpired);
            }
            Ok(CycleReceipt {
                server_time: Utc::now(),
                device_id: "device-row-1".to_string(),
            })
        }
    }

    struct CountingEmitter {
        events: AtomicUsize,
    }

    impl CountingEmitter {
        fn new() -> Self {
            CountingEmitter {
                events: AtomicUsize::new(0),
            }
        }
    }

    impl AuthEventEmitter for CountingEmitter {
        fn auth_state_changed(&self) {
            self.events.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn orchestrator_with(
        gateway: Arc<StubGateway>,
        emitter: Arc<CountingEmitter>,
    ) -> SyncOrchestrator {
        let config = SyncConfig::new("http://localhost:8080", "dev1").interval_secs(60);
        SyncOrchestrator::with_gateway(config, gateway, emitter)
    }

    #[tokio::test]
    async fn test_login_transitions_to_idle_and_emits() {
        let gateway = Arc::new(StubGateway::ok());
        let emitter = Arc::new(CountingEmitter::new());
        let orch = orchestrator_with(gateway, emitter.clone());

        assert!(!orch.status().is_authenticated);

        let user = orch.login("a@x.com", "pw12345678").await.unwrap();
        assert_eq!(user.id, "user-1");
        assert!(orch.status().is_authenticated);
        assert_eq!(emitter.events.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_manual_sync_requires_session() {
        let orch = orchestrator_with(
            Arc::new(StubGateway::ok()),
            Arc::new(CountingEmitter::new()),
        );

        let err = orch.manual_sync().await.unwrap_err();
        assert!(matches!(err, SyncError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_manual_sync_records_outcome() {
        let gateway = Arc::new(StubGateway::ok());
        let orch = orchestrator_with(gateway.clone(), Arc::new(CountingEmitter::new()));
        orch.login("a@x.com", "pw12345678").await.unwrap();

        orch.manual_sync().await.unwrap();

        let status = orch.status();
        assert!(!status.is_running);
        assert!(status.last_sync_at.is_some());
        assert!(status.last_error.is_none());
        assert_eq!(gateway.cycle_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_manual_sync_rejected() {
        let gateway = Arc::new(StubGateway::slow(Duration::from_secs(5)));
        let orch = orchestrator_with(gateway.clone(), Arc::new(CountingEmitter::new()));
        orch.login("a@x.com", "pw12345678").await.unwrap();

        let first = {
            let orch = orch.clone();
            tokio::spawn(async move { orch.manual_sync().await })
        };

        // Let the first cycle acquire the slot and park in its delay.
        tokio::task::yield_now().await;
        assert!(orch.status().is_running);

        let err = orch.manual_sync().await.unwrap_err();
        assert!(matches!(err, SyncError::AlreadyInProgress));

        // The first cycle still completes normally.
        assert!(first.await.unwrap().is_ok());
        assert!(!orch.status().is_running);
        assert_eq!(gateway.cycle_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transparent_refresh_retries_once() {
        let gateway = Arc::new(StubGateway::rejecting(1, true));
        let orch = orchestrator_with(gateway.clone(), Arc::new(CountingEmitter::new()));
        orch.login("a@x.com", "pw12345678").await.unwrap();

        orch.manual_sync().await.unwrap();

        // First cycle rejected, one refresh, one retry.
        assert_eq!(gateway.cycle_calls.load(Ordering::SeqCst), 2);
        assert_eq!(gateway.refresh_calls.load(Ordering::SeqCst), 1);
        assert!(orch.status().is_authenticated);

        // The refreshed access token is now held by the session.
        let session = orch.session.read().unwrap();
        assert_eq!(session.as_ref().unwrap().access_token, "access-refreshed");
    }

    #[tokio::test]
    async fn test_failed_refresh_forces_disconnected() {
        let gateway = Arc::new(StubGateway::rejecting(usize::MAX, false));
        let emitter = Arc::new(CountingEmitter::new());
        let orch = orchestrator_with(gateway.clone(), emitter.clone());
        orch.login("a@x.com", "pw12345678").await.unwrap();

        let err = orch.manual_sync().await.unwrap_err();
        assert!(matches!(err, SyncError::AuthExpired));

        let status = orch.status();
        assert!(!status.is_authenticated);
        assert!(status.last_error.is_some());
        // login + forced disconnect
        assert_eq!(emitter.events.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_rejection_after_refresh_forces_disconnected() {
        // Refresh succeeds but the new token is rejected too.
        let gateway = Arc::new(StubGateway::rejecting(2, true));
        let orch = orchestrator_with(gateway.clone(), Arc::new(CountingEmitter::new()));
        orch.login("a@x.com", "pw12345678").await.unwrap();

        let err = orch.manual_sync().await.unwrap_err();
        assert!(matches!(err, SyncError::AuthExpired));
        assert_eq!(gateway.cycle_calls.load(Ordering::SeqCst), 2);
        assert_eq!(gateway.refresh_calls.load(Ordering::SeqCst), 1);
        assert!(!orch.status().is_authenticated);
    }

    #[tokio::test]
    async fn test_logout_clears_session_and_stops_timer() {
        let gateway = Arc::new(StubGateway::ok());
        let emitter = Arc::new(CountingEmitter::new());
        let orch = orchestrator_with(gateway.clone(), emitter.clone());
        orch.login("a@x.com", "pw12345678").await.unwrap();
        orch.start_periodic_sync();

        orch.logout().await.unwrap();

        let status = orch.status();
        assert!(!status.is_authenticated);
        assert!(!status.periodic_enabled);
        assert_eq!(gateway.logout_calls.load(Ordering::SeqCst), 1);
        assert_eq!(emitter.events.load(Ordering::SeqCst), 2);

        // Logging out again is a no-op.
        orch.logout().await.unwrap();
        assert_eq!(gateway.logout_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_sync_double_start_single_timer() {
        let gateway = Arc::new(StubGateway::ok());
        let orch = orchestrator_with(gateway.clone(), Arc::new(CountingEmitter::new()));
        orch.login("a@x.com", "pw12345678").await.unwrap();

        orch.start_periodic_sync();
        orch.start_periodic_sync();
        assert!(orch.status().periodic_enabled);

        // Five intervals elapse: exactly five attempts, not ten.
        tokio::time::sleep(Duration::from_secs(5 * 60 + 10)).await;
        assert_eq!(gateway.cycle_calls.load(Ordering::SeqCst), 5);

        orch.stop_periodic_sync();
        orch.stop_periodic_sync();
        assert!(!orch.status().periodic_enabled);

        tokio::time::sleep(Duration::from_secs(3 * 60)).await;
        assert_eq!(gateway.cycle_calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_failure_never_stops_timer() {
        // Every cycle is rejected and every refresh fails: the session dies
        // on the first tick, later ticks record NotAuthenticated, and the
        // timer keeps going.
        let gateway = Arc::new(StubGateway::rejecting(usize::MAX, false));
        let orch = orchestrator_with(gateway.clone(), Arc::new(CountingEmitter::new()));
        orch.login("a@x.com", "pw12345678").await.unwrap();
        orch.start_periodic_sync();

        tokio::time::sleep(Duration::from_secs(3 * 60 + 10)).await;

        let status = orch.status();
        assert!(status.periodic_enabled);
        assert!(status.last_error.is_some());
        assert_eq!(gateway.cycle_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dispose_is_idempotent() {
        let orch = orchestrator_with(
            Arc::new(StubGateway::ok()),
            Arc::new(CountingEmitter::new()),
        );
        orch.start_periodic_sync();

        orch.dispose();
        orch.dispose();
        assert!(!orch.status().periodic_enabled);
    }
}
