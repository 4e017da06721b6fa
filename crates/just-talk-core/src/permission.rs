//! Microphone permission collaborator.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tracing::{info, instrument};

/// Answer from the permission provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    /// Microphone capture is allowed.
    Granted,
    /// Microphone capture is not allowed.
    Denied,
}

impl PermissionStatus {
    /// Whether capture may proceed.
    pub fn is_granted(self) -> bool {
        self == PermissionStatus::Granted
    }
}

/// Source of truth for microphone permission.
///
/// Permission can be revoked behind the application's back, so callers
/// must ask [`check`](PermissionProvider::check) right before every capture
/// rather than caching an earlier answer.
pub trait PermissionProvider {
    /// Current permission without prompting.
    fn check(&self) -> PermissionStatus;

    /// Ask for permission, prompting where the platform supports it.
    fn request(&mut self) -> PermissionStatus;
}

/// Shared permission flag.
///
/// Desktop hosts have no prompt API, so the grant lives in a flag seeded
/// from configuration and flipped by the user at runtime. Clones share the
/// same flag.
#[derive(Debug, Clone)]
pub struct PermissionGate {
    granted: Arc<AtomicBool>,
}

impl PermissionGate {
    /// Create a gate with an initial grant.
    pub fn new(granted: bool) -> Self {
        Self {
            granted: Arc::new(AtomicBool::new(granted)),
        }
    }

    /// Grant microphone access.
    #[instrument(skip(self))]
    pub fn grant(&self) {
        self.granted.store(true, Ordering::Release);
        info!("Microphone permission granted");
    }

    /// Revoke microphone access.
    #[instrument(skip(self))]
    pub fn revoke(&self) {
        self.granted.store(false, Ordering::Release);
        info!("Microphone permission revoked");
    }
}

impl PermissionProvider for PermissionGate {
    fn check(&self) -> PermissionStatus {
        if self.granted.load(Ordering::Acquire) {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }

    fn request(&mut self) -> PermissionStatus {
        self.check()
    }
}
