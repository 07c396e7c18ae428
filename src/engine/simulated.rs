// Copyright (c) 2025 - Cowboy AI, Inc.
//! Simulated provisioning engine
//!
//! Resolves a plan in-process. Nodes are created wave by wave: every node of
//! a wave has all of its dependencies in earlier waves, so a wave is
//! resolved concurrently and waves run strictly in order.
//!
//! Each node reports its resolved inputs as outputs, plus the values a real
//! cloud would compute for its type (VPC and subnet ids, cluster endpoints,
//! kubeconfigs, service-account tokens, release namespaces).
//!
//! # Example
//!
//! ```rust,ignore
//! let mut engine = SimulatedEngine::new().fail_on("spoke-kubeconfig-secret");
//! let err = engine.apply(&plan).await.unwrap_err();
//! assert_eq!(err.resource(), Some("spoke-kubeconfig-secret"));
//! ```

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::try_join_all;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use super::{DeclarationPlan, Deployment, ProvisioningEngine};
use crate::errors::{DeclarationError, DeclarationResult};
use crate::graph::{NodeId, PrimitiveKind, ResourceNode};
use crate::kubeconfig::{Kubeconfig, UserEntry};
use crate::output::ResolvedOutputs;
use crate::resource::aws::{EksClusterArgs, VpcArgs};
use crate::resource::azure::{ManagedClusterArgs, ResourceGroupArgs};
use crate::resource::ResourceArgs;

/// Bearer token issued to simulated service accounts
pub const DEFAULT_BEARER_TOKEN: &str = "simulated-service-account-token";

/// CA certificate reported by simulated clusters
pub const DEFAULT_CA_CERTIFICATE: &str =
    "-----BEGIN CERTIFICATE-----\nc2ltdWxhdGVkLWNh\n-----END CERTIFICATE-----\n";

/// In-process engine producing plausible outputs
#[derive(Debug, Clone)]
pub struct SimulatedEngine {
    bearer_token: String,
    ca_certificate: String,
    failures: BTreeSet<String>,
    applied: Vec<String>,
}

impl Default for SimulatedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedEngine {
    pub fn new() -> Self {
        Self {
            bearer_token: DEFAULT_BEARER_TOKEN.to_string(),
            ca_certificate: DEFAULT_CA_CERTIFICATE.to_string(),
            failures: BTreeSet::new(),
            applied: Vec::new(),
        }
    }

    /// Token issued to service accounts (stored base64-encoded)
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = token.into();
        self
    }

    /// Fail when creating the named node
    pub fn fail_on(mut self, name: impl Into<String>) -> Self {
        self.failures.insert(name.into());
        self
    }

    /// Names of the nodes created by the last apply, in creation order
    pub fn applied(&self) -> &[String] {
        &self.applied
    }

    /// Reject name collisions and repeated output registrations
    pub fn validate(plan: &DeclarationPlan) -> DeclarationResult<()> {
        let mut seen: BTreeSet<(Option<NodeId>, &str)> = BTreeSet::new();
        for node in plan.graph.nodes() {
            if !seen.insert((node.parent, node.name.as_str())) {
                return Err(DeclarationError::NameCollision {
                    name: node.name.clone(),
                    parent: node
                        .parent
                        .map(|id| plan.graph.name_of(id))
                        .unwrap_or_else(|| "stack".to_string()),
                });
            }
        }

        let mut registered = BTreeSet::new();
        for registration in &plan.registrations {
            if !registered.insert(registration.component) {
                return Err(DeclarationError::DuplicateOutputRegistration {
                    component: plan.graph.name_of(registration.component),
                });
            }
        }

        Ok(())
    }

    async fn create(
        &self,
        node: &ResourceNode,
        resolved: &ResolvedOutputs,
    ) -> DeclarationResult<(NodeId, Map<String, Value>)> {
        tokio::task::yield_now().await;

        if self.failures.contains(&node.name) {
            return Err(failure(node, "injected failure"));
        }

        let inputs = node
            .inputs
            .resolve(resolved)
            .map_err(|err| failure(node, err.to_string()))?;
        let outputs = self
            .simulate(node, inputs, resolved)
            .map_err(|err| failure(node, err.to_string()))?;

        debug!(resource = %node.name, kind = %node.kind, "Simulated resource");
        Ok((node.id, outputs))
    }

    fn simulate(
        &self,
        node: &ResourceNode,
        inputs: Map<String, Value>,
        resolved: &ResolvedOutputs,
    ) -> DeclarationResult<Map<String, Value>> {
        let mut outputs = inputs;
        let index = node.id.index();

        match node.type_token.as_str() {
            VpcArgs::TYPE_TOKEN => {
                outputs.insert("vpcId".into(), json!(format!("vpc-{:08x}", index)));
                outputs.insert(
                    "publicSubnetIds".into(),
                    json!([
                        format!("subnet-{:08x}a", index),
                        format!("subnet-{:08x}b", index)
                    ]),
                );
                outputs.insert(
                    "privateSubnetIds".into(),
                    json!([
                        format!("subnet-{:08x}c", index),
                        format!("subnet-{:08x}d", index)
                    ]),
                );
            }
            EksClusterArgs::TYPE_TOKEN => {
                let name = string_field(&outputs, "name");
                let region = node
                    .provider
                    .and_then(|provider| resolved.lookup(provider, "region"))
                    .and_then(Value::as_str)
                    .unwrap_or("us-east-1")
                    .to_string();
                let endpoint = format!(
                    "https://{:032X}.gr7.{}.eks.amazonaws.com",
                    index, region
                );
                let user = UserEntry {
                    exec: Some(json!({
                        "apiVersion": "client.authentication.k8s.io/v1beta1",
                        "command": "aws",
                        "args": ["eks", "get-token", "--cluster-name", name, "--region", region],
                    })),
                    ..UserEntry::default()
                };
                let kubeconfig =
                    Kubeconfig::for_cluster(&name, &endpoint, Some(self.encoded_ca()), user);

                outputs.insert("kubeconfigJson".into(), json!(kubeconfig.to_json()?));
                outputs.insert(
                    "eksCluster".into(),
                    json!({ "name": name, "endpoint": endpoint, "status": "ACTIVE" }),
                );
            }
            ResourceGroupArgs::TYPE_TOKEN => {
                let name = string_field(&outputs, "resourceGroupName");
                outputs.insert("name".into(), json!(name));
            }
            ManagedClusterArgs::TYPE_TOKEN => {
                let name = string_field(&outputs, "resourceName");
                let location = string_field(&outputs, "location");
                let dns_prefix = outputs
                    .get("properties")
                    .and_then(|properties| properties.get("dnsPrefix"))
                    .and_then(Value::as_str)
                    .unwrap_or(name.as_str())
                    .to_string();
                let fqdn = format!("{}-{:08x}.hcp.{}.azmk8s.io", dns_prefix, index, location);
                let server = format!("https://{}:443", fqdn);
                let user = UserEntry {
                    token: Some(format!("{}-user-token", name)),
                    ..UserEntry::default()
                };
                let kubeconfig =
                    Kubeconfig::for_cluster(&name, &server, Some(self.encoded_ca()), user)
                        .to_yaml()?;

                if let Some(Value::Object(properties)) = outputs.get_mut("properties") {
                    properties.insert("fqdn".into(), json!(fqdn));
                    properties.insert("provisioningState".into(), json!("Succeeded"));
                }
                outputs.insert("name".into(), json!(name));
                outputs.insert(
                    "userCredentials".into(),
                    json!({
                        "kubeconfigs": [
                            { "name": "clusterUser", "value": STANDARD.encode(kubeconfig) }
                        ]
                    }),
                );
            }
            _ => match node.kind {
                PrimitiveKind::Credential => {
                    outputs.insert(
                        "data".into(),
                        json!({
                            "token": STANDARD.encode(&self.bearer_token),
                            "ca.crt": self.encoded_ca(),
                        }),
                    );
                }
                PrimitiveKind::AddOn => {
                    let namespace = string_field(&outputs, "namespace");
                    outputs.insert(
                        "status".into(),
                        json!({ "namespace": namespace, "status": "deployed" }),
                    );
                }
                _ => {}
            },
        }

        Ok(outputs)
    }

    fn encoded_ca(&self) -> String {
        STANDARD.encode(&self.ca_certificate)
    }
}

#[async_trait]
impl ProvisioningEngine for SimulatedEngine {
    async fn apply(&mut self, plan: &DeclarationPlan) -> DeclarationResult<Deployment> {
        Self::validate(plan)?;
        info!(
            project = %plan.project,
            stack = %plan.stack,
            resources = plan.graph.len(),
            waves = plan.waves.len(),
            "Applying plan"
        );

        let mut resolved = ResolvedOutputs::new();
        let mut applied = Vec::with_capacity(plan.graph.len());

        for (number, wave) in plan.waves.iter().enumerate() {
            let nodes = wave
                .iter()
                .map(|id| plan.graph.node(*id))
                .collect::<DeclarationResult<Vec<_>>>()?;
            debug!(wave = number, size = nodes.len(), "Resolving wave");

            let created: BTreeMap<NodeId, Map<String, Value>> =
                try_join_all(nodes.iter().map(|node| self.create(node, &resolved)))
                    .await?
                    .into_iter()
                    .collect();

            for (id, outputs) in created {
                applied.push(plan.graph.name_of(id));
                resolved.insert(id, outputs);
            }
        }

        info!(resources = applied.len(), "Plan applied");
        self.applied = applied.clone();
        Deployment::from_resolved(plan, resolved, applied)
    }
}

fn string_field(outputs: &Map<String, Value>, key: &str) -> String {
    outputs
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn failure(node: &ResourceNode, reason: impl Into<String>) -> DeclarationError {
    if node.kind == PrimitiveKind::RegistryEntry {
        DeclarationError::registration(&node.name, reason)
    } else {
        DeclarationError::primitive(&node.name, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{ClusterRole, KubernetesCluster, KubernetesClusterArgs};
    use crate::config::StackConfig;
    use crate::context::StackContext;
    use crate::kubeconfig::Kubeconfig;
    use crate::resource::ResourceOptions;
    use pretty_assertions::assert_eq;

    fn context() -> StackContext {
        StackContext::new(StackConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_eks_cluster_resolves_endpoint_and_kubeconfig() {
        let mut ctx = context();
        KubernetesCluster::new(
            &mut ctx,
            "spoke",
            KubernetesClusterArgs::new("aws").region("il-central-1"),
            ResourceOptions::new(),
        )
        .unwrap();
        let plan = ctx.plan().unwrap();

        let mut engine = SimulatedEngine::new();
        let deployment = engine.apply(&plan).await.unwrap();

        let endpoint: String = deployment.component_output("spoke", "endpoint").unwrap();
        assert!(endpoint.starts_with("https://"));
        assert!(endpoint.contains("il-central-1"));

        let kubeconfig: Option<String> = deployment.component_output("spoke", "kubeconfig").unwrap();
        let parsed = Kubeconfig::parse(&kubeconfig.unwrap()).unwrap();
        assert_eq!(parsed.server(), Some(endpoint.as_str()));
        assert_eq!(engine.applied().len(), plan.graph.len());
    }

    #[tokio::test]
    async fn test_aks_endpoint_uses_api_port() {
        let mut ctx = context();
        KubernetesCluster::new(
            &mut ctx,
            "hub",
            KubernetesClusterArgs::new("azure").role(ClusterRole::Hub),
            ResourceOptions::new(),
        )
        .unwrap();
        let deployment = SimulatedEngine::new()
            .apply(&ctx.plan().unwrap())
            .await
            .unwrap();

        let endpoint: String = deployment.component_output("hub", "endpoint").unwrap();
        assert!(endpoint.ends_with(".azmk8s.io:4443"));
        let hub = ctx.graph().find("hub", None).unwrap().id;
        let apps = ctx.graph().find("hub-argocd-apps", Some(hub)).unwrap().id;
        assert_eq!(
            deployment.resolved.lookup(apps, "status.namespace"),
            Some(&json!("argocd"))
        );
    }

    #[tokio::test]
    async fn test_injected_failure_names_resource() {
        let mut ctx = context();
        KubernetesCluster::new(
            &mut ctx,
            "spoke",
            KubernetesClusterArgs::new("aws"),
            ResourceOptions::new(),
        )
        .unwrap();

        let err = SimulatedEngine::new()
            .fail_on("spoke-cluster")
            .apply(&ctx.plan().unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, DeclarationError::PrimitiveCreation { .. }));
        assert_eq!(err.resource(), Some("spoke-cluster"));
    }

    #[test]
    fn test_name_collision_under_same_parent() {
        let mut ctx = context();
        let component = ctx
            .register_component("test:index:Group", "group", ResourceOptions::new())
            .unwrap();
        for _ in 0..2 {
            ctx.register_component(
                "test:index:Group",
                "child",
                ResourceOptions::new().parent(component.id()),
            )
            .unwrap();
        }

        let err = SimulatedEngine::validate(&ctx.plan().unwrap()).unwrap_err();
        match err {
            DeclarationError::NameCollision { name, parent } => {
                assert_eq!(name, "child");
                assert_eq!(parent, "group");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_same_name_under_different_parents_is_allowed() {
        let mut ctx = context();
        for group in ["a", "b"] {
            let component = ctx
                .register_component("test:index:Group", group, ResourceOptions::new())
                .unwrap();
            ctx.register_component(
                "test:index:Group",
                "child",
                ResourceOptions::new().parent(component.id()),
            )
            .unwrap();
        }

        assert!(SimulatedEngine::validate(&ctx.plan().unwrap()).is_ok());
    }
}
