use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

use crate::connectivity::SetupSettings;
use crate::error::DesiredResourcesError;
use crate::k8s::DEFAULT_AGNHOST_IMAGE;
use crate::models::{DesiredResources, Protocol};

/// Environment variable prefix, e.g. `NETSIM_NAMESPACES=x,y,z`
pub const ENV_PREFIX: &str = "NETSIM";

/// Runtime configuration. List values are comma-separated.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_namespaces")]
    pub namespaces: String,

    #[serde(default = "default_pods")]
    pub pods: String,

    #[serde(default = "default_ports")]
    pub ports: String,

    #[serde(default = "default_protocols")]
    pub protocols: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_image")]
    pub image: String,
}

fn default_namespaces() -> String {
    "x,y,z".to_string()
}

fn default_pods() -> String {
    "a,b,c".to_string()
}

fn default_ports() -> String {
    "80,81".to_string()
}

fn default_protocols() -> String {
    "TCP,UDP".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_image() -> String {
    DEFAULT_AGNHOST_IMAGE.to_string()
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_env(config::Environment::with_prefix(ENV_PREFIX))
    }

    fn from_env(env: config::Environment) -> Result<Self> {
        let config = config::Config::builder().add_source(env).build()?;
        Ok(config.try_deserialize()?)
    }

    /// Declarative target state described by this configuration
    pub fn desired_resources(&self) -> Result<DesiredResources, DesiredResourcesError> {
        let ports = split_list(&self.ports)
            .into_iter()
            .map(|p| {
                p.parse::<i32>()
                    .map_err(|_| DesiredResourcesError::UnparseablePort(p.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let protocols = split_list(&self.protocols)
            .iter()
            .map(|p| Protocol::parse(p))
            .collect::<Result<Vec<_>, _>>()?;

        DesiredResources::from_ports_and_protocols(
            split_list(&self.namespaces),
            &split_list(&self.pods),
            &ports,
            &protocols,
        )
    }

    pub fn setup_settings(&self) -> SetupSettings {
        SetupSettings {
            ready_timeout: Duration::from_secs(self.timeout_secs),
            poll_interval: Duration::from_secs(self.poll_interval_secs),
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespaces: default_namespaces(),
            pods: default_pods(),
            ports: default_ports(),
            protocols: default_protocols(),
            timeout_secs: default_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            image: default_image(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.poll_interval_secs, 5);
        assert_eq!(config.image, DEFAULT_AGNHOST_IMAGE);

        let desired = config.desired_resources().unwrap();
        assert_eq!(desired.expected_pod_count(), 9);
        assert_eq!(desired.ports().len(), 4);
        assert_eq!(config.setup_settings(), SetupSettings::default());
    }

    #[test]
    fn test_from_env_overrides() {
        let config = Config::from_env(env(&[
            ("NETSIM_NAMESPACES", "a, b"),
            ("NETSIM_PODS", "p1"),
            ("NETSIM_PORTS", "8080"),
            ("NETSIM_PROTOCOLS", "sctp"),
            ("NETSIM_TIMEOUT_SECS", "120"),
        ]))
        .unwrap();

        assert_eq!(config.timeout_secs, 120);
        assert_eq!(config.poll_interval_secs, 5);

        let desired = config.desired_resources().unwrap();
        assert_eq!(desired.namespaces(), &["a".to_string(), "b".to_string()]);
        assert_eq!(desired.ports()[0].protocol, Protocol::Sctp);
        assert_eq!(desired.ports()[0].port, 8080);
    }

    #[test]
    fn test_invalid_lists_rejected() {
        let config = Config {
            ports: "80,http".to_string(),
            ..Config::default()
        };
        assert_eq!(
            config.desired_resources(),
            Err(DesiredResourcesError::UnparseablePort("http".to_string()))
        );

        let config = Config {
            protocols: "TCP,ICMP".to_string(),
            ..Config::default()
        };
        assert_eq!(
            config.desired_resources(),
            Err(DesiredResourcesError::UnsupportedProtocol("ICMP".to_string()))
        );
    }
}
