//! Kubernetes client wrapper for connectivity setup

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Pod, Service};
use kube::{
    api::{Api, ListParams, PostParams},
    Client, Config, Resource,
};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;
use tracing::{info, instrument};

use super::resources::{create_namespace, create_pod_spec, create_service, DEFAULT_AGNHOST_IMAGE};
use crate::connectivity::ClusterClient;
use crate::error::ClusterError;
use crate::models::{DesiredResources, ObservedPod};

/// Wrapper around kube::Client implementing [`ClusterClient`]
#[derive(Clone)]
pub struct K8sClient {
    client: Client,
    image: String,
}

impl K8sClient {
    /// Create a new K8sClient using the default kubeconfig or in-cluster config
    #[instrument(skip_all)]
    pub async fn new() -> Result<Self, ClusterError> {
        let config = Config::infer()
            .await
            .map_err(|e| ClusterError::other(format!("failed to infer kube config: {}", e)))?;
        let client = Client::try_from(config)?;

        info!("Connected to Kubernetes cluster");

        Ok(Self::from_client(client))
    }

    pub fn from_client(client: Client) -> Self {
        Self {
            client,
            image: DEFAULT_AGNHOST_IMAGE.to_string(),
        }
    }

    /// Use `image` for every created container
    pub fn with_image(mut self, image: &str) -> Self {
        self.image = image.to_string();
        self
    }

    /// Check if cluster is reachable
    pub async fn health_check(&self) -> Result<(), ClusterError> {
        let version = self.client.apiserver_version().await?;
        info!(version = %version.git_version, "Kubernetes cluster is healthy");
        Ok(())
    }

    /// Create a namespace
    #[instrument(skip(self, desired))]
    pub async fn ensure_namespace(
        &self,
        desired: &DesiredResources,
        namespace: &str,
    ) -> Result<(), ClusterError> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        create_if_absent(&namespaces, &create_namespace(desired, namespace)).await
    }

    /// Create a pod
    #[instrument(skip(self, desired))]
    pub async fn ensure_pod(
        &self,
        desired: &DesiredResources,
        namespace: &str,
        pod: &str,
    ) -> Result<(), ClusterError> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        create_if_absent(&pods, &create_pod_spec(desired, namespace, pod, &self.image)).await
    }

    /// Create a service
    #[instrument(skip(self, desired))]
    pub async fn ensure_service(
        &self,
        desired: &DesiredResources,
        namespace: &str,
        pod: &str,
    ) -> Result<(), ClusterError> {
        let services: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        create_if_absent(&services, &create_service(desired, namespace, pod)).await
    }

    /// List all pods in a namespace
    pub async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, ClusterError> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let list = pods.list(&ListParams::default()).await?;
        Ok(list.items)
    }
}

/// Create `object`, treating 409 AlreadyExists as success
async fn create_if_absent<K>(api: &Api<K>, object: &K) -> Result<(), ClusterError>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Serialize + Debug,
{
    let name = object.meta().name.as_deref().unwrap_or("unknown");
    match api.create(&PostParams::default(), object).await {
        Ok(_) => {
            info!(name, kind = %K::kind(&()), "Created resource");
            Ok(())
        }
        Err(kube::Error::Api(e)) if e.code == 409 => {
            // Already exists, that's fine
            info!(name, kind = %K::kind(&()), "Resource already exists");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl ClusterClient for K8sClient {
    #[instrument(skip(self))]
    async fn fetch_pods(&self, namespaces: &[String]) -> Result<Vec<ObservedPod>, ClusterError> {
        let mut observed = Vec::new();
        for namespace in namespaces {
            let pods = self.list_pods(namespace).await?;
            observed.extend(pods.iter().map(ObservedPod::from));
        }
        Ok(observed)
    }

    #[instrument(skip_all)]
    async fn create_resources(&self, desired: &DesiredResources) -> Result<(), ClusterError> {
        for namespace in desired.namespaces() {
            self.ensure_namespace(desired, namespace).await?;
        }

        for placement in desired.pods() {
            self.ensure_pod(desired, &placement.namespace, &placement.name)
                .await?;
            self.ensure_service(desired, &placement.namespace, &placement.name)
                .await?;
        }

        info!(
            namespaces = desired.namespaces().len(),
            pods = desired.expected_pod_count(),
            "Created all resources"
        );
        Ok(())
    }
}
