use serde::{Deserialize, Serialize};

use crate::domain::{HealthCheck, InstanceId, Port};

/// Prefix a path-based routing layer (e.g. fabio) looks for in service tags.
pub const ROUTING_TAG_PREFIX: &str = "urlprefix-/";

/// Routing tag mapping `/{service_name}` to the instances of that service.
#[inline]
pub fn routing_tag(service_name: &str) -> String {
    format!("{ROUTING_TAG_PREFIX}{service_name}")
}

/// One instance as submitted to the discovery backend.
///
/// Field names follow the Consul agent service-registration payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    #[serde(rename = "ID")]
    pub id: InstanceId,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "Port")]
    pub port: Port,
    #[serde(rename = "Tags", default)]
    pub tags: Vec<String>,
    #[serde(rename = "Checks", default)]
    pub checks: Vec<HealthCheck>,
}

impl RegistrationRecord {
    /// Build a record with the routing tag first, then `extra_tags` without duplicates,
    /// and a single HTTP health check against the instance itself.
    pub fn new(
        id: InstanceId,
        name: impl Into<String>,
        address: impl Into<String>,
        port: Port,
        extra_tags: &[String],
    ) -> Self {
        let name = name.into();
        let address = address.into();

        let mut tags = vec![routing_tag(&name)];
        for tag in extra_tags {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
        let checks = vec![HealthCheck::http_for(&address, port)];

        Self {
            id,
            name,
            address,
            port,
            tags,
            checks,
        }
    }
}
