//! Register at startup, deregister once when the host starts shutting down.

mod handle;
pub use handle::{DeregisterOutcome, RegistrationHandle};

use std::{sync::Arc, time::Duration};

use beacon_model::{InstanceId, RegistrationRecord, RegistrationState};
use tokio::{sync::watch, time::timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    config::ServiceInstanceConfig,
    errors::DiscoverError,
    registry::{ConsulAgent, ServiceRegistry},
};

/// Register this instance with the Consul agent described by `config`.
///
/// Returns once the agent acknowledged the record; any failure is returned and must
/// abort the host's startup. Cancelling `shutdown` triggers a single, time-bounded
/// deregistration.
pub async fn register(
    config: ServiceInstanceConfig,
    shutdown: CancellationToken,
) -> Result<RegistrationHandle, DiscoverError> {
    let agent = ConsulAgent::new(config.discovery_endpoint())?;
    register_with(Arc::new(agent), config, shutdown).await
}

/// Same as [`register`] against an arbitrary backend.
pub async fn register_with(
    registry: Arc<dyn ServiceRegistry>,
    config: ServiceInstanceConfig,
    shutdown: CancellationToken,
) -> Result<RegistrationHandle, DiscoverError> {
    config.validate()?;

    let record = RegistrationRecord::new(
        InstanceId::generate(),
        config.service_name.as_str(),
        config.instance_address.as_str(),
        config.instance_port,
        &config.extra_tags,
    );
    debug!(
        id = %record.id,
        service = %record.name,
        address = %record.address,
        port = record.port,
        "registering instance"
    );

    let submitted = timeout(config.register_timeout, registry.register(&record))
        .await
        .unwrap_or(Err(DiscoverError::Timeout(config.register_timeout)));
    if let Err(e) = submitted {
        error!(id = %record.id, service = %record.name, "registration failed: {e}");
        return Err(e);
    }
    info!(id = %record.id, service = %record.name, "instance registered");

    let record = Arc::new(record);
    let (state_tx, state_rx) = watch::channel(RegistrationState::Registered);
    let watcher = tokio::spawn(deregister_on_shutdown(
        registry,
        Arc::clone(&record),
        shutdown,
        config.deregister_timeout,
        state_tx,
    ));

    Ok(RegistrationHandle {
        record,
        state: state_rx,
        watcher,
    })
}

/// Single consumer of the shutdown token; runs to completion at most once.
async fn deregister_on_shutdown(
    registry: Arc<dyn ServiceRegistry>,
    record: Arc<RegistrationRecord>,
    shutdown: CancellationToken,
    bound: Duration,
    state: watch::Sender<RegistrationState>,
) -> DeregisterOutcome {
    shutdown.cancelled().await;
    debug!(id = %record.id, "shutdown started, deregistering instance");

    let outcome = match timeout(bound, registry.deregister(&record.id)).await {
        Ok(Ok(())) => {
            info!(id = %record.id, service = %record.name, "instance deregistered");
            DeregisterOutcome::Removed
        }
        Ok(Err(e)) => {
            warn!(id = %record.id, service = %record.name, "deregistration failed: {e}");
            DeregisterOutcome::Failed(e.to_string())
        }
        Err(_) => {
            warn!(
                id = %record.id,
                service = %record.name,
                timeout_ms = bound.as_millis() as u64,
                "deregistration timed out"
            );
            DeregisterOutcome::TimedOut
        }
    };
    state.send_replace(RegistrationState::Deregistered);
    outcome
}
