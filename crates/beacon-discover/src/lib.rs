mod config;
pub use config::{
    DEFAULT_DEREGISTER_TIMEOUT, DEFAULT_REGISTER_TIMEOUT, ServiceInstanceConfig,
};

mod errors;
pub use errors::{ConfigError, DiscoverError};

mod registry;
pub use registry::{ConsulAgent, ServiceRegistry};

mod lifecycle;
pub use lifecycle::{DeregisterOutcome, RegistrationHandle, register, register_with};

pub use beacon_model::{InstanceId, RegistrationRecord, RegistrationState};
pub use tokio_util::sync::CancellationToken;
