// Copyright (c) 2025 - Cowboy AI, Inc.
//! Preview engine - logs a plan but doesn't apply it
//!
//! Useful for dry runs. Every node is logged in creation order and recorded;
//! outputs are reported only where they were known at declaration time.

use async_trait::async_trait;
use tracing::info;

use super::{DeclarationPlan, Deployment, ProvisioningEngine};
use crate::errors::DeclarationResult;

/// Engine that resolves nothing
#[derive(Debug, Clone, Default)]
pub struct PreviewEngine {
    /// Node names in the order they would be created
    pub previewed: Vec<String>,
}

impl PreviewEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previewed(&self) -> &[String] {
        &self.previewed
    }
}

#[async_trait]
impl ProvisioningEngine for PreviewEngine {
    async fn apply(&mut self, plan: &DeclarationPlan) -> DeclarationResult<Deployment> {
        self.previewed.clear();
        for node in plan.nodes_in_order() {
            info!(
                resource = %node.name,
                type_token = %node.type_token,
                kind = %node.kind,
                "+ create"
            );
            self.previewed.push(node.name.clone());
        }
        for diagnostic in &plan.diagnostics {
            info!(severity = ?diagnostic.severity, "{}", diagnostic.message);
        }
        Ok(Deployment::unresolved(plan))
    }
}
