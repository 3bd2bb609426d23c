use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use networksim_connectivity::{config::Config, k8s::K8sClient, ClusterSetup};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; stdout is reserved for the synthetic model
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting NetworkSim connectivity setup");

    // Load configuration
    let config = Config::load()?;
    let desired = config
        .desired_resources()
        .context("Invalid desired resources")?;
    tracing::info!(
        namespaces = ?desired.namespaces(),
        pods = desired.expected_pod_count(),
        "Configuration loaded"
    );

    let k8s = K8sClient::new().await?.with_image(&config.image);
    k8s.health_check().await?;

    let mut setup = ClusterSetup::new(k8s, config.setup_settings());
    let resources = setup.run(&desired).await?;

    tracing::info!(
        pods = resources.pods().len(),
        state = %setup.state(),
        "Synthetic resources ready"
    );
    println!("{}", serde_json::to_string_pretty(&resources)?);

    Ok(())
}
