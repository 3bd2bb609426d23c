use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::synthetic::SyntheticNamespace;
use crate::error::DesiredResourcesError;

/// Label applied to every object this crate creates
pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";
pub const MANAGED_BY_VALUE: &str = "networksim";

/// Label carrying a namespace's own name
pub const NAMESPACE_LABEL: &str = "ns";

/// Label carrying a pod's template name
pub const POD_LABEL: &str = "pod";

/// Transport protocol of a container port
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString,
)]
pub enum Protocol {
    #[strum(serialize = "TCP")]
    #[serde(rename = "TCP")]
    Tcp,
    #[strum(serialize = "UDP")]
    #[serde(rename = "UDP")]
    Udp,
    #[strum(serialize = "SCTP")]
    #[serde(rename = "SCTP")]
    Sctp,
}

impl Protocol {
    /// Parse a protocol string, accepting any case ("tcp", "Tcp", "TCP")
    pub fn parse(value: &str) -> Result<Self, DesiredResourcesError> {
        value
            .to_ascii_uppercase()
            .parse()
            .map_err(|_| DesiredResourcesError::UnsupportedProtocol(value.to_string()))
    }
}

/// A (port, protocol) pair exposed by one container of every pod
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortSpec {
    pub port: i32,
    pub protocol: Protocol,
}

impl PortSpec {
    pub fn new(port: i32, protocol: Protocol) -> Self {
        Self { port, protocol }
    }

    /// Container name, e.g. `cont-80-tcp`
    pub fn container_name(&self) -> String {
        format!(
            "cont-{}-{}",
            self.port,
            self.protocol.to_string().to_lowercase()
        )
    }
}

/// Where one pod is created
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PodPlacement {
    pub namespace: String,
    pub name: String,
}

impl PodPlacement {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }
}

/// Declarative target state of one setup run.
///
/// Each placed pod carries one container per port spec. Namespaces may be
/// declared without any pod placed in them.
#[derive(Debug, Clone, PartialEq)]
pub struct DesiredResources {
    namespaces: Vec<String>,
    pods: Vec<PodPlacement>,
    ports: Vec<PortSpec>,
}

impl DesiredResources {
    /// Build from explicit placements. Duplicates are dropped, first occurrence wins.
    pub fn new(
        namespaces: Vec<String>,
        pods: Vec<PodPlacement>,
        ports: Vec<PortSpec>,
    ) -> Result<Self, DesiredResourcesError> {
        if namespaces.iter().any(|ns| ns.is_empty()) {
            return Err(DesiredResourcesError::EmptyNamespace);
        }
        if pods.iter().any(|p| p.name.is_empty()) {
            return Err(DesiredResourcesError::EmptyPod);
        }
        if let Some(stray) = pods.iter().find(|p| !namespaces.contains(&p.namespace)) {
            return Err(DesiredResourcesError::UndeclaredNamespace {
                namespace: stray.namespace.clone(),
                pod: stray.name.clone(),
            });
        }
        if let Some(bad) = ports.iter().find(|p| !(1..=65535).contains(&p.port)) {
            return Err(DesiredResourcesError::InvalidPort(bad.port));
        }

        Ok(Self {
            namespaces: dedup(namespaces),
            pods: dedup(pods),
            ports: dedup(ports),
        })
    }

    /// Place every pod name in every namespace
    pub fn in_every_namespace(
        namespaces: Vec<String>,
        pod_names: &[String],
        ports: Vec<PortSpec>,
    ) -> Result<Self, DesiredResourcesError> {
        let pods = namespaces
            .iter()
            .flat_map(|ns| pod_names.iter().map(move |name| PodPlacement::new(ns, name)))
            .collect();
        Self::new(namespaces, pods, ports)
    }

    /// Place every pod name in every namespace, with one port spec per
    /// combination of `ports` and `protocols`
    pub fn from_ports_and_protocols(
        namespaces: Vec<String>,
        pod_names: &[String],
        ports: &[i32],
        protocols: &[Protocol],
    ) -> Result<Self, DesiredResourcesError> {
        let specs = ports
            .iter()
            .flat_map(|&port| protocols.iter().map(move |&p| PortSpec::new(port, p)))
            .collect();
        Self::in_every_namespace(namespaces, pod_names, specs)
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    pub fn pods(&self) -> &[PodPlacement] {
        &self.pods
    }

    pub fn ports(&self) -> &[PortSpec] {
        &self.ports
    }

    /// Number of pods that must be ready once everything is provisioned
    pub fn expected_pod_count(&self) -> usize {
        self.pods.len()
    }

    pub fn namespace_labels(&self, namespace: &str) -> BTreeMap<String, String> {
        [
            (MANAGED_BY_LABEL.to_string(), MANAGED_BY_VALUE.to_string()),
            (NAMESPACE_LABEL.to_string(), namespace.to_string()),
        ]
        .into_iter()
        .collect()
    }

    /// Declared namespaces in declaration order, as the synthetic model sees them
    pub fn synthetic_namespaces(&self) -> Vec<SyntheticNamespace> {
        self.namespaces
            .iter()
            .map(|ns| SyntheticNamespace {
                name: ns.clone(),
                labels: self.namespace_labels(ns),
            })
            .collect()
    }

    pub fn pod_labels(&self, pod: &str) -> BTreeMap<String, String> {
        [
            (MANAGED_BY_LABEL.to_string(), MANAGED_BY_VALUE.to_string()),
            (POD_LABEL.to_string(), pod.to_string()),
        ]
        .into_iter()
        .collect()
    }
}

fn dedup<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
