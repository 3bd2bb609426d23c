//! Network-independent model of the cluster topology
//!
//! Everything here owns its data; nothing borrows from live cluster objects.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::desired::Protocol;
use crate::error::ProjectionError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticContainer {
    pub port: i32,
    pub protocol: Protocol,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticPod {
    pub namespace: String,
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub ip: String,
    pub containers: Vec<SyntheticContainer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticNamespace {
    pub name: String,
    pub labels: BTreeMap<String, String>,
}

/// Terminal artifact handed to the connectivity engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticResources {
    namespaces: Vec<SyntheticNamespace>,
    pods: Vec<SyntheticPod>,
}

impl SyntheticResources {
    /// Every pod must live in one of `namespaces`
    pub fn new(
        namespaces: Vec<SyntheticNamespace>,
        pods: Vec<SyntheticPod>,
    ) -> Result<Self, ProjectionError> {
        for pod in &pods {
            if !namespaces.iter().any(|ns| ns.name == pod.namespace) {
                return Err(ProjectionError::UnknownNamespace {
                    namespace: pod.namespace.clone(),
                    name: pod.name.clone(),
                });
            }
        }
        Ok(Self { namespaces, pods })
    }

    pub fn namespaces(&self) -> &[SyntheticNamespace] {
        &self.namespaces
    }

    pub fn namespace_names(&self) -> Vec<&str> {
        self.namespaces.iter().map(|ns| ns.name.as_str()).collect()
    }

    pub fn pods(&self) -> &[SyntheticPod] {
        &self.pods
    }

    pub fn pods_in_namespace<'a>(
        &'a self,
        namespace: &'a str,
    ) -> impl Iterator<Item = &'a SyntheticPod> + 'a {
        self.pods.iter().filter(move |p| p.namespace == namespace)
    }

    pub fn get_pod(&self, namespace: &str, name: &str) -> Option<&SyntheticPod> {
        self.pods
            .iter()
            .find(|p| p.namespace == namespace && p.name == name)
    }
}
