//! Setup orchestration
//!
//! Runs provisioning, readiness and projection in sequence. A run either
//! reaches `Projected` or stops in one of the terminal failure states; there
//! is no resuming from an intermediate state.

use std::time::Duration;

use strum::Display;
use tracing::{error, info, instrument};

use super::projector::project;
use super::provisioner::ResourceProvisioner;
use super::readiness::{ReadinessWaiter, DEFAULT_POLL_INTERVAL, DEFAULT_READY_TIMEOUT};
use super::ClusterClient;
use crate::error::{SetupError, SetupResult};
use crate::models::{DesiredResources, SyntheticResources};

/// Progress of a setup run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SetupState {
    Unprovisioned,
    Provisioned,
    Ready,
    Projected,
    ProvisionFailed,
    TimedOut,
    ProjectionFailed,
}

impl SetupState {
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            SetupState::Unprovisioned | SetupState::Provisioned | SetupState::Ready
        )
    }
}

/// Timing of the readiness phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupSettings {
    pub ready_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for SetupSettings {
    fn default() -> Self {
        Self {
            ready_timeout: DEFAULT_READY_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Drives one cluster from nothing to a synthetic model
pub struct ClusterSetup<C: ClusterClient> {
    client: C,
    settings: SetupSettings,
    state: SetupState,
}

impl<C: ClusterClient> ClusterSetup<C> {
    pub fn new(client: C, settings: SetupSettings) -> Self {
        Self {
            client,
            settings,
            state: SetupState::Unprovisioned,
        }
    }

    pub fn state(&self) -> SetupState {
        self.state
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Provision `desired`, wait for its pods, and project them
    #[instrument(skip_all, fields(expected_pods = desired.expected_pod_count()))]
    pub async fn run(&mut self, desired: &DesiredResources) -> SetupResult<SyntheticResources> {
        if self.state != SetupState::Unprovisioned {
            return Err(SetupError::InvalidState(self.state));
        }

        let provisioned = ResourceProvisioner::new(&self.client)
            .provision(desired)
            .await;
        if let Err(e) = provisioned {
            return Err(self.fail(SetupState::ProvisionFailed, e.into()));
        }
        self.transition(SetupState::Provisioned);

        let waiter =
            ReadinessWaiter::new(&self.client).with_poll_interval(self.settings.poll_interval);
        let ready = waiter
            .wait_ready(
                desired.namespaces(),
                desired.expected_pod_count(),
                self.settings.ready_timeout,
            )
            .await;
        if let Err(e) = ready {
            return Err(self.fail(SetupState::TimedOut, e.into()));
        }
        self.transition(SetupState::Ready);

        let observed = match self.client.fetch_pods(desired.namespaces()).await {
            Ok(pods) => pods,
            Err(e) => return Err(self.fail(SetupState::ProjectionFailed, SetupError::Fetch(e))),
        };

        match project(&desired.synthetic_namespaces(), &observed) {
            Ok(resources) => {
                self.transition(SetupState::Projected);
                Ok(resources)
            }
            Err(e) => Err(self.fail(SetupState::ProjectionFailed, e.into())),
        }
    }

    fn transition(&mut self, next: SetupState) {
        info!(from = %self.state, to = %next, "Setup state changed");
        self.state = next;
    }

    fn fail(&mut self, terminal: SetupState, err: SetupError) -> SetupError {
        error!(from = %self.state, to = %terminal, error = %err, "Setup failed");
        self.state = terminal;
        err
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::connectivity::MockClusterClient;
    use crate::error::{ClusterError, ProjectionError, WaitError};
    use crate::models::{
        ObservedContainer, ObservedPod, ObservedPort, PodPhase, PortSpec, Protocol,
    };

    fn desired() -> DesiredResources {
        DesiredResources::in_every_namespace(
            vec!["a".to_string(), "b".to_string()],
            &["p1".to_string()],
            vec![PortSpec::new(80, Protocol::Tcp)],
        )
        .unwrap()
    }

    fn pod(ns: &str, phase: PodPhase, ip: &str, ports: usize) -> ObservedPod {
        ObservedPod {
            namespace: ns.to_string(),
            name: "p1".to_string(),
            labels: BTreeMap::new(),
            phase,
            ip: ip.to_string(),
            containers: vec![ObservedContainer {
                name: "cont-80-tcp".to_string(),
                ports: vec![
                    ObservedPort {
                        port: 80,
                        protocol: "TCP".to_string(),
                    };
                    ports
                ],
            }],
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_reaches_projected() {
        let mut client = MockClusterClient::new();
        client
            .expect_create_resources()
            .times(1)
            .returning(|_| Ok(()));
        let mut calls = 0;
        client.expect_fetch_pods().returning(move |_| {
            calls += 1;
            Ok(if calls == 1 {
                vec![pod("a", PodPhase::Pending, "", 1), pod("b", PodPhase::Pending, "", 1)]
            } else {
                vec![
                    pod("a", PodPhase::Running, "10.0.0.1", 1),
                    pod("b", PodPhase::Running, "10.0.0.2", 1),
                ]
            })
        });

        let mut setup = ClusterSetup::new(client, SetupSettings::default());
        let resources = setup.run(&desired()).await.unwrap();

        assert_eq!(setup.state(), SetupState::Projected);
        assert_eq!(resources.namespace_names(), vec!["a", "b"]);
        assert_eq!(resources.get_pod("b", "p1").unwrap().ip, "10.0.0.2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_provision_failure_skips_waiting() {
        let mut client = MockClusterClient::new();
        client
            .expect_create_resources()
            .returning(|_| Err(ClusterError::other("forbidden")));
        client.expect_fetch_pods().never();

        let mut setup = ClusterSetup::new(client, SetupSettings::default());
        let err = setup.run(&desired()).await.unwrap_err();

        assert!(matches!(err, SetupError::Provision(_)));
        assert_eq!(setup.state(), SetupState::ProvisionFailed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_pod_times_out_without_projection() {
        let mut client = MockClusterClient::new();
        client.expect_create_resources().returning(|_| Ok(()));
        client.expect_fetch_pods().returning(|_| {
            Ok(vec![
                pod("a", PodPhase::Running, "10.0.0.1", 1),
                pod("b", PodPhase::Pending, "", 1),
            ])
        });

        let mut setup = ClusterSetup::new(client, SetupSettings::default());
        let err = setup.run(&desired()).await.unwrap_err();

        assert!(matches!(
            err,
            SetupError::Wait(WaitError::Timeout { ready: 1, expected: 2, .. })
        ));
        assert_eq!(setup.state(), SetupState::TimedOut);
        assert!(setup.state().is_terminal());
    }

    #[tokio::test(start_paused = true)]
    async fn test_projection_failure_is_terminal() {
        let mut client = MockClusterClient::new();
        client.expect_create_resources().returning(|_| Ok(()));
        client.expect_fetch_pods().returning(|_| {
            Ok(vec![
                pod("a", PodPhase::Running, "10.0.0.1", 1),
                pod("b", PodPhase::Running, "10.0.0.2", 2),
            ])
        });

        let mut setup = ClusterSetup::new(client, SetupSettings::default());
        let err = setup.run(&desired()).await.unwrap_err();

        assert!(matches!(
            err,
            SetupError::Projection(ProjectionError::AmbiguousPort { port_count: 2, .. })
        ));
        assert_eq!(setup.state(), SetupState::ProjectionFailed);

        let err = setup.run(&desired()).await.unwrap_err();
        assert!(matches!(
            err,
            SetupError::InvalidState(SetupState::ProjectionFailed)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_final_fetch_failure() {
        let mut client = MockClusterClient::new();
        client.expect_create_resources().returning(|_| Ok(()));
        let mut calls = 0;
        client.expect_fetch_pods().returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok(vec![
                    pod("a", PodPhase::Running, "10.0.0.1", 1),
                    pod("b", PodPhase::Running, "10.0.0.2", 1),
                ])
            } else {
                Err(ClusterError::other("connection reset"))
            }
        });

        let mut setup = ClusterSetup::new(client, SetupSettings::default());
        let err = setup.run(&desired()).await.unwrap_err();

        assert!(matches!(err, SetupError::Fetch(_)));
        assert_eq!(setup.state(), SetupState::ProjectionFailed);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(SetupState::TimedOut.to_string(), "timed_out");
        assert!(!SetupState::Ready.is_terminal());
        assert!(SetupState::Projected.is_terminal());
    }
}
