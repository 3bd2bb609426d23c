//! Connectivity setup
//!
//! Brings a cluster to a state from which connectivity can be reasoned about:
//! - Provisioning the desired namespaces and pods
//! - Waiting until every pod is running with an IP address
//! - Projecting the live pods into the synthetic model

mod projector;
mod provisioner;
mod readiness;
mod setup;

pub use projector::project;
pub use provisioner::ResourceProvisioner;
pub use readiness::{ReadinessWaiter, DEFAULT_POLL_INTERVAL, DEFAULT_READY_TIMEOUT};
pub use setup::{ClusterSetup, SetupSettings, SetupState};

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::ClusterError;
use crate::models::{DesiredResources, ObservedPod};

/// Read and write access to the live cluster
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Current pods in all of `namespaces`
    async fn fetch_pods(&self, namespaces: &[String]) -> Result<Vec<ObservedPod>, ClusterError>;

    /// Create every namespace and pod in `desired`
    async fn create_resources(&self, desired: &DesiredResources) -> Result<(), ClusterError>;
}
