//! Remote side of the registration lifecycle.

mod consul;
pub use consul::ConsulAgent;

use async_trait::async_trait;
use beacon_model::{InstanceId, RegistrationRecord};

use crate::errors::DiscoverError;

/// Discovery backend able to store and drop instance registrations.
#[async_trait]
pub trait ServiceRegistry: Send + Sync {
    /// Submit `record`; resolves once the backend acknowledged or refused it.
    async fn register(&self, record: &RegistrationRecord) -> Result<(), DiscoverError>;

    /// Remove the registration keyed by `id`.
    async fn deregister(&self, id: &InstanceId) -> Result<(), DiscoverError>;
}
