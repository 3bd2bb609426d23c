use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Lifecycle phase reported by the cluster for a pod
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl From<&str> for PodPhase {
    fn from(phase: &str) -> Self {
        match phase {
            "Pending" => PodPhase::Pending,
            "Running" => PodPhase::Running,
            "Succeeded" => PodPhase::Succeeded,
            "Failed" => PodPhase::Failed,
            _ => PodPhase::Unknown,
        }
    }
}

/// A port declared on a live container; the protocol is kept as reported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedPort {
    pub port: i32,
    pub protocol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedContainer {
    pub name: String,
    pub ports: Vec<ObservedPort>,
}

/// One snapshot of a live pod, re-fetched on every poll
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedPod {
    pub namespace: String,
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub phase: PodPhase,
    /// Empty until the pod is assigned an address
    pub ip: String,
    pub containers: Vec<ObservedContainer>,
}

impl ObservedPod {
    /// Running and addressable
    pub fn is_ready(&self) -> bool {
        self.phase == PodPhase::Running && !self.ip.is_empty()
    }
}
