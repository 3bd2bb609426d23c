//! Conversion of live Pod objects into observed snapshots

use k8s_openapi::api::core::v1::{Container, Pod};

use crate::models::{ObservedContainer, ObservedPod, ObservedPort, PodPhase};

/// Kubernetes defaults an unset container port protocol to TCP
const DEFAULT_PROTOCOL: &str = "TCP";

impl From<&Pod> for ObservedPod {
    fn from(pod: &Pod) -> Self {
        let phase = pod
            .status
            .as_ref()
            .and_then(|s| s.phase.as_deref())
            .map(PodPhase::from)
            .unwrap_or(PodPhase::Unknown);

        let ip = pod
            .status
            .as_ref()
            .and_then(|s| s.pod_ip.clone())
            .unwrap_or_default();

        let containers = pod
            .spec
            .as_ref()
            .map(|spec| spec.containers.iter().map(observe_container).collect())
            .unwrap_or_default();

        ObservedPod {
            namespace: pod.metadata.namespace.clone().unwrap_or_default(),
            name: pod.metadata.name.clone().unwrap_or_default(),
            labels: pod.metadata.labels.clone().unwrap_or_default(),
            phase,
            ip,
            containers,
        }
    }
}

fn observe_container(container: &Container) -> ObservedContainer {
    let ports = container
        .ports
        .iter()
        .flatten()
        .map(|p| ObservedPort {
            port: p.container_port,
            protocol: p
                .protocol
                .clone()
                .unwrap_or_else(|| DEFAULT_PROTOCOL.to_string()),
        })
        .collect();

    ObservedContainer {
        name: container.name.clone(),
        ports,
    }
}

#[cfg(test)]
mod tests {
    use k8s_openapi::api::core::v1::{ContainerPort, PodSpec, PodStatus};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    use super::*;

    #[test]
    fn test_running_pod_with_ports() {
        let pod = Pod {
            metadata: ObjectMeta {
                name: Some("a".to_string()),
                namespace: Some("x".to_string()),
                labels: Some([("pod".to_string(), "a".to_string())].into_iter().collect()),
                ..Default::default()
            },
            spec: Some(PodSpec {
                containers: vec![Container {
                    name: "cont-80-udp".to_string(),
                    ports: Some(vec![ContainerPort {
                        container_port: 80,
                        protocol: Some("UDP".to_string()),
                        ..Default::default()
                    }]),
                    ..Default::default()
                }],
                ..Default::default()
            }),
            status: Some(PodStatus {
                phase: Some("Running".to_string()),
                pod_ip: Some("10.0.0.1".to_string()),
                ..Default::default()
            }),
        };

        let observed = ObservedPod::from(&pod);
        assert_eq!(observed.namespace, "x");
        assert_eq!(observed.name, "a");
        assert_eq!(observed.labels.get("pod"), Some(&"a".to_string()));
        assert!(observed.is_ready());
        assert_eq!(
            observed.containers,
            vec![ObservedContainer {
                name: "cont-80-udp".to_string(),
                ports: vec![ObservedPort {
                    port: 80,
                    protocol: "UDP".to_string(),
                }],
            }]
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let pod = Pod {
            spec: Some(PodSpec {
                containers: vec![
                    Container {
                        name: "no-ports".to_string(),
                        ..Default::default()
                    },
                    Container {
                        name: "implicit-tcp".to_string(),
                        ports: Some(vec![ContainerPort {
                            container_port: 8080,
                            ..Default::default()
                        }]),
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }),
            ..Default::default()
        };

        let observed = ObservedPod::from(&pod);
        assert_eq!(observed.phase, PodPhase::Unknown);
        assert!(observed.ip.is_empty());
        assert!(observed.labels.is_empty());
        assert!(observed.containers[0].ports.is_empty());
        assert_eq!(observed.containers[1].ports[0].protocol, "TCP");
    }
}
