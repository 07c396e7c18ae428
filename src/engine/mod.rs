// Copyright (c) 2025 - Cowboy AI, Inc.
//! Provisioning Engine Boundary
//!
//! Declaration is pure: it produces a [`DeclarationPlan`]. Engines interpret
//! the plan and perform (or simulate) the provisioning.
//!
//! # Architecture
//!
//! ```text
//! Declaration pass             Engine
//! ────────────────            ──────────
//!
//! StackContext                 DeclarationPlan
//!      │                            │
//!      ▼                            ▼
//! ┌─────────────┐           ┌──────────────┐
//! │   plan()    │   Plan    │   apply()    │
//! │ (pure func) │ ───────>  │ (async I/O)  │
//! └─────────────┘           └──────────────┘
//!                                   │
//!                                   ▼
//!                              Deployment
//!                  (resolved outputs, component outputs, exports)
//! ```
//!
//! # Engines
//!
//! - [`SimulatedEngine`] - resolves the plan in-process with plausible outputs
//! - [`PreviewEngine`] - logs the plan and resolves nothing

pub mod plan;
pub mod preview;
pub mod simulated;

pub use plan::DeclarationPlan;
pub use preview::PreviewEngine;
pub use simulated::SimulatedEngine;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::errors::{DeclarationError, DeclarationResult};
use crate::output::{Inputs, ResolvedOutputs};
use crate::stack::StackReference;

/// Interprets a declaration plan
///
/// Implementations must create a node only after every node it depends on,
/// and must reject plans that declare two nodes with the same name under
/// one parent or register a component's outputs twice.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProvisioningEngine: Send + Sync {
    /// Apply a plan and report the resolved outputs
    ///
    /// Fails fast: the first failing node aborts the run and the error names
    /// that node.
    async fn apply(&mut self, plan: &DeclarationPlan) -> DeclarationResult<Deployment>;
}

/// Result of applying a plan
#[derive(Debug, Clone, Default)]
pub struct Deployment {
    /// Id of the applied plan
    pub plan_id: Uuid,
    /// Outputs of every node, as reported by the engine
    pub resolved: ResolvedOutputs,
    /// Registered outputs, keyed by component name
    pub components: BTreeMap<String, Map<String, Value>>,
    /// Stack exports, keyed by export name
    pub exports: BTreeMap<String, Value>,
    /// Node names in the order they were created
    pub applied: Vec<String>,
}

impl Deployment {
    /// Resolve the plan's registrations and exports against engine state
    ///
    /// # Errors
    ///
    /// Any registration or export that is still unknown fails.
    pub fn from_resolved(
        plan: &DeclarationPlan,
        resolved: ResolvedOutputs,
        applied: Vec<String>,
    ) -> DeclarationResult<Self> {
        let mut components = BTreeMap::new();
        for registration in &plan.registrations {
            let name = plan.graph.name_of(registration.component);
            components.insert(name, registration.outputs.resolve(&resolved)?);
        }

        let mut exports = BTreeMap::new();
        for export in &plan.exports {
            exports.insert(export.name.clone(), export.value.resolve(&resolved)?);
        }

        Ok(Self {
            plan_id: plan.id,
            resolved,
            components,
            exports,
            applied,
        })
    }

    /// Deployment of a plan nothing has been applied for
    ///
    /// Only values known at declaration time are reported.
    pub fn unresolved(plan: &DeclarationPlan) -> Self {
        let components = plan
            .registrations
            .iter()
            .map(|registration| {
                (
                    plan.graph.name_of(registration.component),
                    known_values(&registration.outputs),
                )
            })
            .collect();

        let exports = plan
            .exports
            .iter()
            .filter_map(|export| {
                export
                    .value
                    .known()
                    .map(|value| (export.name.clone(), value.clone()))
            })
            .collect();

        Self {
            plan_id: plan.id,
            resolved: ResolvedOutputs::new(),
            components,
            exports,
            applied: Vec::new(),
        }
    }

    /// Registered outputs of a component
    pub fn component(&self, name: &str) -> Option<&Map<String, Value>> {
        self.components.get(name)
    }

    /// Decode one registered output of a component
    pub fn component_output<T: DeserializeOwned>(
        &self,
        component: &str,
        key: &str,
    ) -> DeclarationResult<T> {
        let outputs = self.component(component).ok_or_else(|| {
            DeclarationError::configuration(format!("no outputs registered for {}", component))
        })?;
        let value = outputs.get(key).cloned().unwrap_or(Value::Null);
        Ok(serde_json::from_value(value)?)
    }

    /// Read-only view of the exports for other stacks
    pub fn stack_reference(&self, name: impl Into<String>) -> StackReference {
        StackReference::new(name, self.exports.clone())
    }
}

fn known_values(inputs: &Inputs) -> Map<String, Value> {
    inputs
        .iter()
        .filter_map(|(key, input)| input.known().map(|value| (key.clone(), value.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{ClusterRole, KubernetesCluster, KubernetesClusterArgs};
    use crate::config::StackConfig;
    use crate::context::StackContext;
    use crate::resource::ResourceOptions;
    use serde_json::json;

    fn hub_plan() -> DeclarationPlan {
        let mut ctx = StackContext::new(StackConfig::default()).unwrap();
        let hub = KubernetesCluster::new(
            &mut ctx,
            "hub",
            KubernetesClusterArgs::new("azure").role(ClusterRole::Hub),
            ResourceOptions::new(),
        )
        .unwrap();
        ctx.export::<String>("clusterName", hub.cluster_name.clone())
            .unwrap();
        ctx.plan().unwrap()
    }

    #[tokio::test]
    async fn test_mock_engine_receives_plan() {
        let plan = hub_plan();
        let mut engine = MockProvisioningEngine::new();
        engine
            .expect_apply()
            .times(1)
            .returning(|plan| Ok(Deployment::unresolved(plan)));

        let deployment = engine.apply(&plan).await.unwrap();
        assert_eq!(deployment.plan_id, plan.id);
        assert_eq!(deployment.exports.get("clusterName"), Some(&json!("hub")));
    }

    #[test]
    fn test_unresolved_reports_known_outputs_only() {
        let plan = hub_plan();
        let deployment = Deployment::unresolved(&plan);
        let outputs = deployment.component("hub").unwrap();

        assert_eq!(outputs.get("provider"), Some(&json!("azure")));
        assert_eq!(outputs.get("clusterName"), Some(&json!("hub")));
        assert!(!outputs.contains_key("kubeconfig"));
        assert!(!outputs.contains_key("endpoint"));
    }

    #[test]
    fn test_from_resolved_requires_every_output() {
        let plan = hub_plan();
        let result = Deployment::from_resolved(&plan, ResolvedOutputs::new(), Vec::new());
        assert!(matches!(result, Err(DeclarationError::Output(_))));
    }
}
