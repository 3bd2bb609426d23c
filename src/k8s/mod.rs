//! Kubernetes integration module for connectivity setup
//!
//! This module handles all interactions with the cluster:
//! - Creating namespaces, pods and services for desired resources
//! - Listing pods and converting them into observed snapshots

mod client;
mod observe;
mod resources;

pub use client::K8sClient;
pub use resources::{
    create_namespace, create_pod_spec, create_service, service_name, DEFAULT_AGNHOST_IMAGE,
};
