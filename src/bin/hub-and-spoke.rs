// Copyright (c) 2025 - Cowboy AI, Inc.
//! Hub-and-Spoke Program
//!
//! Declares an Azure hub running Argo CD and two AWS spokes registered with
//! it, then hands the plan to an engine.
//!
//! Run with: cargo run --bin hub-and-spoke -- [plan|preview|simulate]
//!
//! - `plan` (default): print the plan as JSON, secrets redacted
//! - `preview`: log what would be created
//! - `simulate`: resolve the plan in-process and print the stack exports
//!
//! Configuration is read from `MULTICLOUD_*` environment variables.

use anyhow::{bail, Context, Result};
use cim_multicloud_kubernetes::{
    engine::{PreviewEngine, ProvisioningEngine, SimulatedEngine},
    topology::HubSpokeTopology,
    StackConfig, StackContext,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let mode = std::env::args().nth(1).unwrap_or_else(|| "plan".to_string());

    let config = StackConfig::from_env().context("Invalid stack configuration")?;
    info!("Configuration loaded:");
    info!("  - Project: {}", config.project);
    info!("  - Stack: {}", config.stack);
    info!("  - Argo CD namespace: {}", config.argocd.namespace);

    let mut ctx = StackContext::new(config).context("Failed to start declaration")?;
    let topology = HubSpokeTopology::workshop_default();
    topology
        .declare(&mut ctx)
        .context("Failed to declare hub-and-spoke topology")?;

    for warning in ctx.warnings() {
        warn!("{}", warning.message);
    }

    let plan = ctx.plan().context("Declaration graph is invalid")?;
    info!(
        "Declared {} resources in {} waves",
        plan.graph.len(),
        plan.waves.len()
    );

    match mode.as_str() {
        "plan" => {
            println!("{}", plan.to_json().context("Failed to render plan")?);
        }
        "preview" => {
            let mut engine = PreviewEngine::new();
            engine.apply(&plan).await.context("Preview failed")?;
            info!("{} resources to create", engine.previewed().len());
        }
        "simulate" => {
            let mut engine = SimulatedEngine::new();
            let deployment = engine.apply(&plan).await.context("Simulation failed")?;
            info!("Created {} resources", deployment.applied.len());

            let exports: serde_json::Map<String, serde_json::Value> = plan
                .exports
                .iter()
                .map(|export| {
                    let value = if export.value.is_secret() {
                        serde_json::json!("[secret]")
                    } else {
                        deployment
                            .exports
                            .get(&export.name)
                            .cloned()
                            .unwrap_or_default()
                    };
                    (export.name.clone(), value)
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&exports).context("Failed to render exports")?
            );
        }
        other => bail!("Unknown mode '{}': expected plan, preview or simulate", other),
    }

    Ok(())
}
