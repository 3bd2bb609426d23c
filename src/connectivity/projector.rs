//! Projection of live pods into the synthetic model
//!
//! A pure function: no cluster access, no partial results.

use tracing::info;

use crate::error::ProjectionError;
use crate::models::{
    ObservedContainer, ObservedPod, Protocol, SyntheticContainer, SyntheticNamespace,
    SyntheticPod, SyntheticResources,
};

/// Map `observed` into a [`SyntheticResources`] over the declared `namespaces`.
///
/// Declared namespaces without pods are kept. Output pods follow input order.
/// The first invalid pod or container aborts the whole projection.
pub fn project(
    namespaces: &[SyntheticNamespace],
    observed: &[ObservedPod],
) -> Result<SyntheticResources, ProjectionError> {
    let pods = observed
        .iter()
        .map(project_pod)
        .collect::<Result<Vec<_>, _>>()?;

    SyntheticResources::new(namespaces.to_vec(), pods)
}

fn project_pod(pod: &ObservedPod) -> Result<SyntheticPod, ProjectionError> {
    if pod.ip.is_empty() {
        return Err(ProjectionError::MissingIp {
            namespace: pod.namespace.clone(),
            name: pod.name.clone(),
        });
    }

    let containers = pod
        .containers
        .iter()
        .enumerate()
        .map(|(index, container)| project_container(pod, index, container))
        .collect::<Result<Vec<_>, _>>()?;

    info!("ip for pod {}/{}: {}", pod.namespace, pod.name, pod.ip);

    Ok(SyntheticPod {
        namespace: pod.namespace.clone(),
        name: pod.name.clone(),
        labels: pod.labels.clone(),
        ip: pod.ip.clone(),
        containers,
    })
}

fn project_container(
    pod: &ObservedPod,
    index: usize,
    container: &ObservedContainer,
) -> Result<SyntheticContainer, ProjectionError> {
    let [port] = container.ports.as_slice() else {
        return Err(ProjectionError::AmbiguousPort {
            namespace: pod.namespace.clone(),
            name: pod.name.clone(),
            container_index: index,
            port_count: container.ports.len(),
        });
    };

    let protocol = Protocol::parse(&port.protocol).map_err(|_| {
        ProjectionError::UnsupportedProtocol {
            namespace: pod.namespace.clone(),
            name: pod.name.clone(),
            container_index: index,
            protocol: port.protocol.clone(),
        }
    })?;

    Ok(SyntheticContainer {
        port: port.port,
        protocol,
    })
}
