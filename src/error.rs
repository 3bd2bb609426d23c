//! Error types for cluster setup and synthetic projection
//!
//! Every error here is terminal for the setup run that produced it.

use std::time::Duration;

use thiserror::Error;

use crate::connectivity::SetupState;

/// Opaque failure talking to the cluster
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error(transparent)]
    Kube(#[from] kube::Error),

    #[error("{0}")]
    Other(String),
}

impl ClusterError {
    pub fn other(msg: impl Into<String>) -> Self {
        ClusterError::Other(msg.into())
    }
}

/// Invalid declarative target state
#[derive(Debug, Error, PartialEq)]
pub enum DesiredResourcesError {
    #[error("namespace name must not be empty")]
    EmptyNamespace,

    #[error("pod name must not be empty")]
    EmptyPod,

    #[error("pod {pod} is placed in undeclared namespace {namespace}")]
    UndeclaredNamespace { namespace: String, pod: String },

    #[error("invalid port '{0}'")]
    UnparseablePort(String),

    #[error("port {0} is out of range (1-65535)")]
    InvalidPort(i32),

    #[error("unsupported protocol '{0}'")]
    UnsupportedProtocol(String),
}

/// Resource creation failed
#[derive(Debug, Error)]
#[error("failed to create resources: {0}")]
pub struct ProvisionError(#[source] pub ClusterError);

/// Readiness polling failed
#[derive(Debug, Error)]
pub enum WaitError {
    #[error("failed to fetch pods: {0}")]
    Fetch(#[source] ClusterError),

    #[error("pods not ready after {elapsed:?}: {ready}/{expected} running with an IP")]
    Timeout {
        elapsed: Duration,
        ready: usize,
        expected: usize,
    },
}

/// Live pod state could not be represented in the synthetic model
#[derive(Debug, Error, PartialEq)]
pub enum ProjectionError {
    #[error("no ip found for pod {namespace}/{name}")]
    MissingIp { namespace: String, name: String },

    #[error(
        "expected 1 port on container {container_index} of pod {namespace}/{name}, found {port_count}"
    )]
    AmbiguousPort {
        namespace: String,
        name: String,
        container_index: usize,
        port_count: usize,
    },

    #[error(
        "unsupported protocol '{protocol}' on container {container_index} of pod {namespace}/{name}"
    )]
    UnsupportedProtocol {
        namespace: String,
        name: String,
        container_index: usize,
        protocol: String,
    },

    #[error("namespace {namespace} of pod {name} was not declared")]
    UnknownNamespace { namespace: String, name: String },
}

/// Top-level failure of a setup run
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error(transparent)]
    Wait(#[from] WaitError),

    #[error("failed to fetch pods for projection: {0}")]
    Fetch(#[source] ClusterError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error("setup cannot run from state {0}")]
    InvalidState(SetupState),
}

pub type SetupResult<T> = Result<T, SetupError>;
