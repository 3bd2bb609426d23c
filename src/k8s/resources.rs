//! Kubernetes resource builders for connectivity setup
//!
//! Functions to create Namespace, Pod, and Service specs from desired resources

use k8s_openapi::api::core::v1::{
    Container, ContainerPort, EnvVar, Namespace, Pod, PodSpec, Service, ServicePort, ServiceSpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use crate::models::{DesiredResources, PortSpec, Protocol};

/// Default container image; agnhost can serve any of the supported protocols
pub const DEFAULT_AGNHOST_IMAGE: &str = "registry.k8s.io/e2e-test-images/agnhost:2.43";

/// Create a Namespace labelled with its own name
pub fn create_namespace(desired: &DesiredResources, namespace: &str) -> Namespace {
    Namespace {
        metadata: ObjectMeta {
            name: Some(namespace.to_string()),
            labels: Some(desired.namespace_labels(namespace)),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Create a Pod with one container per port spec
pub fn create_pod_spec(
    desired: &DesiredResources,
    namespace: &str,
    pod: &str,
    image: &str,
) -> Pod {
    let containers = desired
        .ports()
        .iter()
        .map(|spec| create_container(spec, image))
        .collect();

    Pod {
        metadata: ObjectMeta {
            name: Some(pod.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(desired.pod_labels(pod)),
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers,
            // Pods must stay up for the whole analysis session
            restart_policy: Some("Always".to_string()),
            termination_grace_period_seconds: Some(0),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Build a container serving a single port
fn create_container(spec: &PortSpec, image: &str) -> Container {
    let port = spec.port.to_string();
    let (args, env) = match spec.protocol {
        Protocol::Tcp => (serve_hostname_args("--tcp", &port), None),
        Protocol::Udp => (serve_hostname_args("--udp", &port), None),
        Protocol::Sctp => (
            vec!["porter".to_string()],
            Some(vec![EnvVar {
                name: format!("SERVE_SCTP_PORT_{}", spec.port),
                value: Some("foo".to_string()),
                ..Default::default()
            }]),
        ),
    };

    Container {
        name: spec.container_name(),
        image: Some(image.to_string()),
        image_pull_policy: Some("IfNotPresent".to_string()),
        command: Some(vec!["/agnhost".to_string()]),
        args: Some(args),
        env,
        ports: Some(vec![ContainerPort {
            container_port: spec.port,
            name: Some(port_name(spec)),
            protocol: Some(spec.protocol.to_string()),
            ..Default::default()
        }]),
        ..Default::default()
    }
}

fn serve_hostname_args(flag: &str, port: &str) -> Vec<String> {
    vec![
        "serve-hostname".to_string(),
        flag.to_string(),
        "--http=false".to_string(),
        "--port".to_string(),
        port.to_string(),
    ]
}

// Container port names are limited to 15 characters
fn port_name(spec: &PortSpec) -> String {
    format!("p{}-{}", spec.port, spec.protocol.to_string().to_lowercase())
}

/// Create a ClusterIP Service selecting one pod, exposing every port spec
pub fn create_service(desired: &DesiredResources, namespace: &str, pod: &str) -> Service {
    let ports = desired
        .ports()
        .iter()
        .map(|spec| ServicePort {
            name: Some(format!("service-{}", port_name(spec))),
            port: spec.port,
            target_port: Some(IntOrString::Int(spec.port)),
            protocol: Some(spec.protocol.to_string()),
            ..Default::default()
        })
        .collect();

    Service {
        metadata: ObjectMeta {
            name: Some(service_name(namespace, pod)),
            namespace: Some(namespace.to_string()),
            labels: Some(desired.pod_labels(pod)),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            selector: Some(desired.pod_labels(pod)),
            ports: Some(ports),
            type_: Some("ClusterIP".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// DNS-safe service name, `s-<namespace>-<pod>`
pub fn service_name(namespace: &str, pod: &str) -> String {
    format!("s-{}-{}", namespace, pod).to_lowercase()
}
