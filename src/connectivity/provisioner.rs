//! One-shot resource creation
//!
//! Creation is handed to the cluster client in a single call and the first
//! failure is surfaced as a `ProvisionError`. Partially created resources are
//! left in place.

use tracing::{error, info, instrument};

use super::ClusterClient;
use crate::error::ProvisionError;
use crate::models::DesiredResources;

/// Issues one-shot creation of the desired resources
pub struct ResourceProvisioner<'a, C: ClusterClient + ?Sized> {
    client: &'a C,
}

impl<'a, C: ClusterClient + ?Sized> ResourceProvisioner<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Create everything in `desired`. Nothing is rolled back on failure.
    #[instrument(skip_all, fields(namespaces = desired.namespaces().len(), pods = desired.pods().len()))]
    pub async fn provision(&self, desired: &DesiredResources) -> Result<(), ProvisionError> {
        match self.client.create_resources(desired).await {
            Ok(()) => {
                info!("Provisioned resources");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to provision resources");
                Err(ProvisionError(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::MockClusterClient;
    use crate::error::ClusterError;
    use crate::models::{PortSpec, Protocol};

    fn desired() -> DesiredResources {
        DesiredResources::in_every_namespace(
            vec!["x".to_string()],
            &["a".to_string()],
            vec![PortSpec::new(80, Protocol::Tcp)],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_provision_creates_once() {
        let mut client = MockClusterClient::new();
        client
            .expect_create_resources()
            .times(1)
            .returning(|_| Ok(()));
        client.expect_fetch_pods().never();

        let provisioner = ResourceProvisioner::new(&client);
        assert!(provisioner.provision(&desired()).await.is_ok());
    }

    #[tokio::test]
    async fn test_provision_propagates_first_error() {
        let mut client = MockClusterClient::new();
        client
            .expect_create_resources()
            .times(1)
            .returning(|_| Err(ClusterError::other("namespace x: forbidden")));

        let provisioner = ResourceProvisioner::new(&client);
        let err = provisioner.provision(&desired()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to create resources: namespace x: forbidden"
        );
    }
}
