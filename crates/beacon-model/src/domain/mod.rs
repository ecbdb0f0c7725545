mod duration;
pub use duration::{DurationParseError, format_duration, parse_duration};

mod instance_id;
pub use instance_id::InstanceId;

mod health_check;
pub use health_check::{
    DEFAULT_CHECK_INTERVAL, DEFAULT_CHECK_TIMEOUT, DEFAULT_DEREGISTER_CRITICAL_AFTER, HEALTH_PATH,
    HealthCheck, url_host,
};

mod registration;
pub use registration::{ROUTING_TAG_PREFIX, RegistrationRecord, routing_tag};

mod registration_state;
pub use registration_state::RegistrationState;

/// Network port of an instance or of the discovery backend.
pub type Port = u16;
