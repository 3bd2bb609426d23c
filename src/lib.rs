//! NetworkSim Connectivity Library
//!
//! Provisions cluster workloads, waits for them to become addressable, and
//! projects the live topology into a synthetic model for connectivity analysis.

pub mod config;
pub mod connectivity;
pub mod error;
pub mod k8s;
pub mod models;

pub use connectivity::{ClusterClient, ClusterSetup, SetupSettings, SetupState};
pub use error::{SetupError, SetupResult};
pub use models::{DesiredResources, PodPlacement, SyntheticResources};
