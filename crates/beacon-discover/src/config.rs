use std::time::Duration;

use beacon_model::{Port, url_host};

use crate::errors::ConfigError;

/// Upper bound on the startup registration call.
pub const DEFAULT_REGISTER_TIMEOUT: Duration = Duration::from_secs(10);
/// Upper bound on the shutdown deregistration call; same magnitude as the health-check timeout.
pub const DEFAULT_DEREGISTER_TIMEOUT: Duration = Duration::from_secs(5);

/// Identity and location of this instance and of the discovery backend.
///
/// Supplied once by the host and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ServiceInstanceConfig {
    /// Logical service name shared by all instances.
    pub service_name: String,
    /// Address other services (and health checks) use to reach this instance.
    pub instance_address: String,
    pub instance_port: Port,
    /// Discovery backend (Consul agent) API address.
    pub discovery_address: String,
    pub discovery_port: Port,
    /// Tags appended after the routing tag.
    pub extra_tags: Vec<String>,
    pub register_timeout: Duration,
    pub deregister_timeout: Duration,
}

impl ServiceInstanceConfig {
    pub fn new(
        service_name: impl Into<String>,
        instance_address: impl Into<String>,
        instance_port: Port,
        discovery_address: impl Into<String>,
        discovery_port: Port,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            instance_address: instance_address.into(),
            instance_port,
            discovery_address: discovery_address.into(),
            discovery_port,
            extra_tags: Vec::new(),
            register_timeout: DEFAULT_REGISTER_TIMEOUT,
            deregister_timeout: DEFAULT_DEREGISTER_TIMEOUT,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_register_timeout(mut self, timeout: Duration) -> Self {
        self.register_timeout = timeout;
        self
    }

    pub fn with_deregister_timeout(mut self, timeout: Duration) -> Self {
        self.deregister_timeout = timeout;
        self
    }

    /// Read the config from `BEACON_*` environment variables.
    ///
    /// `BEACON_TAGS` is an optional comma separated list.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(key))
        };
        let port = |key: &'static str| -> Result<Port, ConfigError> {
            let raw = required(key)?;
            raw.parse().map_err(|_| ConfigError::Invalid {
                field: key,
                value: raw,
                reason: "not a tcp port",
            })
        };

        let cfg = Self::new(
            required("BEACON_SERVICE_NAME")?,
            required("BEACON_INSTANCE_ADDRESS")?,
            port("BEACON_INSTANCE_PORT")?,
            required("BEACON_DISCOVERY_ADDRESS")?,
            port("BEACON_DISCOVERY_PORT")?,
        );
        let tags = lookup("BEACON_TAGS").unwrap_or_default();
        let tags = tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>();

        Ok(cfg.with_tags(tags))
    }

    /// Base URL of the discovery backend API.
    pub fn discovery_endpoint(&self) -> String {
        format!(
            "http://{}:{}",
            url_host(&self.discovery_address),
            self.discovery_port
        )
    }

    /// Reject anything that would make the first network call meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_name("service_name", &self.service_name)?;
        check_address("instance_address", &self.instance_address, self.instance_port)?;
        check_port("instance_port", self.instance_port)?;
        check_address(
            "discovery_address",
            &self.discovery_address,
            self.discovery_port,
        )?;
        check_port("discovery_port", self.discovery_port)?;

        if self.register_timeout.is_zero() {
            return Err(invalid("register_timeout", "0s", "must be positive"));
        }
        if self.deregister_timeout.is_zero() {
            return Err(invalid("deregister_timeout", "0s", "must be positive"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, value: impl Into<String>, reason: &'static str) -> ConfigError {
    ConfigError::Invalid {
        field,
        value: value.into(),
        reason,
    }
}

fn check_name(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Missing(field));
    }
    if value.chars().any(|c| c.is_whitespace() || c == '/') {
        return Err(invalid(field, value, "must not contain whitespace or '/'"));
    }
    Ok(())
}

fn check_address(field: &'static str, value: &str, port: Port) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Missing(field));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(invalid(field, value, "must not contain whitespace"));
    }
    if value.contains(['/', '?', '#', '@']) {
        return Err(invalid(field, value, "expected a bare host, not a url"));
    }
    let url = format!("http://{}:{port}", url_host(value));
    match reqwest::Url::parse(&url) {
        Ok(u)
            if u.host_str().is_some_and(|h| !h.is_empty())
                && u.port_or_known_default() == Some(port)
                && u.username().is_empty()
                && u.password().is_none()
                && u.query().is_none()
                && u.fragment().is_none() =>
        {
            Ok(())
        }
        _ => Err(invalid(field, value, "not a valid host")),
    }
}

fn check_port(field: &'static str, port: Port) -> Result<(), ConfigError> {
    if port == 0 {
        return Err(invalid(field, "0", "port must be in 1..=65535"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn orders() -> ServiceInstanceConfig {
        ServiceInstanceConfig::new("orders", "10.0.0.5", 8080, "10.0.0.1", 8500)
    }

    #[test]
    fn valid_config_passes() {
        let cfg = orders();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.discovery_endpoint(), "http://10.0.0.1:8500");
        assert_eq!(cfg.register_timeout, DEFAULT_REGISTER_TIMEOUT);
        assert_eq!(cfg.deregister_timeout, Duration::from_secs(5));
    }

    #[test]
    fn hostnames_and_ipv6_are_accepted() {
        let cfg = ServiceInstanceConfig::new("orders", "orders.internal", 80, "::1", 8500);
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.discovery_endpoint(), "http://[::1]:8500");
    }

    #[test]
    fn empty_fields_are_missing() {
        let mut cfg = orders();
        cfg.service_name.clear();
        assert_eq!(cfg.validate(), Err(ConfigError::Missing("service_name")));

        let mut cfg = orders();
        cfg.discovery_address.clear();
        assert_eq!(cfg.validate(), Err(ConfigError::Missing("discovery_address")));
    }

    #[test]
    fn zero_port_is_invalid() {
        let mut cfg = orders();
        cfg.instance_port = 0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { field: "instance_port", .. })
        ));
    }

    #[test]
    fn url_instead_of_host_is_invalid() {
        let mut cfg = orders();
        cfg.discovery_address = "http://10.0.0.1".to_string();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { field: "discovery_address", .. })
        ));
    }

    #[test]
    fn url_fragments_in_address_are_invalid() {
        for addr in ["10.0.0.1?x", "user@10.0.0.1", "10.0.0.1#frag", "10.0.0.1:8500"] {
            let mut cfg = orders();
            cfg.discovery_address = addr.to_string();
            assert!(
                matches!(
                    cfg.validate(),
                    Err(ConfigError::Invalid { field: "discovery_address", .. })
                ),
                "{addr} should be rejected"
            );

            let mut cfg = orders();
            cfg.instance_address = addr.to_string();
            assert!(cfg.validate().is_err(), "{addr} should be rejected");
        }
    }

    #[test]
    fn slash_in_name_is_invalid() {
        let mut cfg = orders();
        cfg.service_name = "orders/v1".to_string();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { field: "service_name", .. })
        ));
    }

    #[test]
    fn whitespace_in_name_is_invalid() {
        let mut cfg = orders();
        cfg.service_name = "order service".to_string();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { field: "service_name", .. })
        ));
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let cfg = orders().with_deregister_timeout(Duration::ZERO);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { field: "deregister_timeout", .. })
        ));
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn reads_environment() {
        let cfg = ServiceInstanceConfig::from_lookup(lookup(&[
            ("BEACON_SERVICE_NAME", "orders"),
            ("BEACON_INSTANCE_ADDRESS", "10.0.0.5"),
            ("BEACON_INSTANCE_PORT", "8080"),
            ("BEACON_DISCOVERY_ADDRESS", "10.0.0.1"),
            ("BEACON_DISCOVERY_PORT", "8500"),
            ("BEACON_TAGS", "v1, primary,,"),
        ]))
        .unwrap();

        assert_eq!(cfg.service_name, "orders");
        assert_eq!(cfg.instance_port, 8080);
        assert_eq!(cfg.discovery_port, 8500);
        assert_eq!(cfg.extra_tags, vec!["v1", "primary"]);
    }

    #[test]
    fn missing_environment_value_is_reported() {
        let err = ServiceInstanceConfig::from_lookup(lookup(&[
            ("BEACON_SERVICE_NAME", "orders"),
            ("BEACON_INSTANCE_ADDRESS", "10.0.0.5"),
            ("BEACON_INSTANCE_PORT", "8080"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing("BEACON_DISCOVERY_ADDRESS"));
    }

    #[test]
    fn bad_port_in_environment_is_reported() {
        let err = ServiceInstanceConfig::from_lookup(lookup(&[
            ("BEACON_SERVICE_NAME", "orders"),
            ("BEACON_INSTANCE_ADDRESS", "10.0.0.5"),
            ("BEACON_INSTANCE_PORT", "99999"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { field: "BEACON_INSTANCE_PORT", .. }
        ));
    }
}
