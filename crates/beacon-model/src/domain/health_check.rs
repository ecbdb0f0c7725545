use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::duration::go_duration;

/// Path the discovery backend polls on every instance.
pub const HEALTH_PATH: &str = "/api/health";

pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_DEREGISTER_CRITICAL_AFTER: Duration = Duration::from_secs(5);

/// HTTP health check attached to a registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheck {
    /// URL the backend polls.
    #[serde(rename = "HTTP")]
    pub http: String,
    /// Period between two probes.
    #[serde(rename = "Interval", with = "go_duration")]
    pub interval: Duration,
    /// How long the backend waits for a probe response.
    #[serde(rename = "Timeout", with = "go_duration")]
    pub timeout: Duration,
    /// The backend drops the registration once the check stays critical this long.
    ///
    /// Safety net for instances whose explicit deregistration never arrives.
    #[serde(rename = "DeregisterCriticalServiceAfter", with = "go_duration")]
    pub deregister_critical_service_after: Duration,
}

impl HealthCheck {
    /// Check polling `http://{address}:{port}/api/health` with the default timings.
    pub fn http_for(address: &str, port: u16) -> Self {
        Self {
            http: format!("http://{}:{port}{HEALTH_PATH}", url_host(address)),
            interval: DEFAULT_CHECK_INTERVAL,
            timeout: DEFAULT_CHECK_TIMEOUT,
            deregister_critical_service_after: DEFAULT_DEREGISTER_CRITICAL_AFTER,
        }
    }
}

/// Host part of an `http://host:port` URL; IPv6 literals get brackets.
pub fn url_host(address: &str) -> String {
    if address.contains(':') && !address.starts_with('[') {
        format!("[{address}]")
    } else {
        address.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_check_uses_health_path() {
        let check = HealthCheck::http_for("10.0.0.5", 8080);
        assert_eq!(check.http, "http://10.0.0.5:8080/api/health");
        assert_eq!(check.interval, Duration::from_secs(10));
        assert_eq!(check.timeout, Duration::from_secs(5));
        assert_eq!(check.deregister_critical_service_after, Duration::from_secs(5));
    }

    #[test]
    fn ipv6_address_is_bracketed() {
        let check = HealthCheck::http_for("fd00::5", 8080);
        assert_eq!(check.http, "http://[fd00::5]:8080/api/health");
    }

    #[test]
    fn serializes_consul_field_names() {
        let check = HealthCheck::http_for("127.0.0.1", 9000);
        let json = serde_json::to_value(&check).unwrap();

        assert_eq!(json["HTTP"], "http://127.0.0.1:9000/api/health");
        assert_eq!(json["Interval"], "10s");
        assert_eq!(json["Timeout"], "5s");
        assert_eq!(json["DeregisterCriticalServiceAfter"], "5s");
    }
}
