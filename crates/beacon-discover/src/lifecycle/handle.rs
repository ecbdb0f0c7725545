use std::sync::Arc;

use beacon_model::{InstanceId, RegistrationRecord, RegistrationState};
use tokio::{sync::watch, task::JoinHandle};

/// Result of the single deregistration attempt made at shutdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeregisterOutcome {
    /// The backend dropped the registration.
    Removed,
    /// The backend was unreachable or refused; its health-check expiry cleans up.
    Failed(String),
    /// The backend did not answer within the configured bound.
    TimedOut,
}

/// Live registration returned by [`register`](crate::register).
pub struct RegistrationHandle {
    pub(crate) record: Arc<RegistrationRecord>,
    pub(crate) state: watch::Receiver<RegistrationState>,
    pub(crate) watcher: JoinHandle<DeregisterOutcome>,
}

impl RegistrationHandle {
    #[inline]
    pub fn instance_id(&self) -> &InstanceId {
        &self.record.id
    }

    /// Record exactly as it was submitted.
    #[inline]
    pub fn record(&self) -> &RegistrationRecord {
        &self.record
    }

    pub fn state(&self) -> RegistrationState {
        *self.state.borrow()
    }

    /// Wait for the shutdown path to finish.
    ///
    /// Resolves only after the shutdown token fired and the deregistration attempt
    /// completed, failed, or hit its time bound.
    pub async fn closed(self) -> DeregisterOutcome {
        match self.watcher.await {
            Ok(outcome) => outcome,
            Err(e) => DeregisterOutcome::Failed(format!("deregistration task aborted: {e}")),
        }
    }
}

impl std::fmt::Debug for RegistrationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationHandle")
            .field("instance_id", &self.record.id)
            .field("state", &self.state())
            .finish()
    }
}
