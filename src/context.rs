// Copyright (c) 2025 - Cowboy AI, Inc.
//! Declaration context
//!
//! A [`StackContext`] is the single mutable value threaded through one
//! top-down declaration pass. It owns the node arena, the component output
//! registrations, stack exports and the diagnostics raised along the way.
//! Nothing is provisioned here: [`StackContext::plan`] freezes the result
//! into a [`DeclarationPlan`] for a provisioning engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crate::config::StackConfig;
use crate::engine::DeclarationPlan;
use crate::errors::{DeclarationError, DeclarationResult};
use crate::graph::arena::NewNode;
use crate::graph::{DeclarationGraph, NodeId, PrimitiveKind};
use crate::output::{Input, InputValue, Inputs};
use crate::resource::{ResourceArgs, ResourceHandle, ResourceOptions};

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

/// Message raised during declaration, attributed to a resource when possible
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub resource: Option<String>,
}

/// Output mapping published by a component
#[derive(Debug, Clone)]
pub struct OutputRegistration {
    pub component: NodeId,
    pub outputs: Inputs,
}

/// Named stack-level output
#[derive(Debug, Clone)]
pub struct StackExport {
    pub name: String,
    pub value: InputValue,
}

/// State of one declaration pass
#[derive(Debug)]
pub struct StackContext {
    config: StackConfig,
    graph: DeclarationGraph,
    registrations: Vec<OutputRegistration>,
    exports: Vec<StackExport>,
    diagnostics: Vec<Diagnostic>,
}

impl StackContext {
    /// Start a pass with a validated configuration
    pub fn new(config: StackConfig) -> DeclarationResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            graph: DeclarationGraph::new(),
            registrations: Vec::new(),
            exports: Vec::new(),
            diagnostics: Vec::new(),
        })
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    pub fn graph(&self) -> &DeclarationGraph {
        &self.graph
    }

    pub fn registrations(&self) -> &[OutputRegistration] {
        &self.registrations
    }

    pub fn exports(&self) -> &[StackExport] {
        &self.exports
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Diagnostics of warning severity
    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .collect()
    }

    /// Declare a component that will own other resources
    pub fn register_component(
        &mut self,
        type_token: &str,
        name: &str,
        opts: ResourceOptions,
    ) -> DeclarationResult<ResourceHandle> {
        if opts.provider.is_some() {
            return Err(DeclarationError::configuration(format!(
                "component {} cannot be created through a provider",
                name
            )));
        }

        let id = self.graph.insert(NewNode {
            name: name.to_string(),
            type_token: type_token.to_string(),
            kind: PrimitiveKind::Component,
            parent: opts.parent,
            provider: None,
            inputs: Inputs::new(),
            depends_on: opts.depends_on,
            ignore_changes: Vec::new(),
        })?;

        debug!(component = name, type_token, "Registered component");
        Ok(ResourceHandle::new(id, name, type_token, PrimitiveKind::Component))
    }

    /// Declare a primitive resource
    ///
    /// Failures are attributed to `name`; registry entries fail with a
    /// registration error, every other kind with a primitive-creation error.
    pub fn register<A: ResourceArgs>(
        &mut self,
        name: &str,
        args: A,
        opts: ResourceOptions,
    ) -> DeclarationResult<A::Handle> {
        let inputs = args
            .into_inputs()
            .map_err(|err| attribute(name, A::KIND, err))?;

        let id = self
            .graph
            .insert(NewNode {
                name: name.to_string(),
                type_token: A::TYPE_TOKEN.to_string(),
                kind: A::KIND,
                parent: opts.parent,
                provider: opts.provider,
                inputs,
                depends_on: opts.depends_on,
                ignore_changes: opts.ignore_changes,
            })
            .map_err(|err| attribute(name, A::KIND, err))?;

        debug!(resource = name, type_token = A::TYPE_TOKEN, kind = %A::KIND, "Declared resource");
        Ok(A::Handle::from(ResourceHandle::new(
            id,
            name,
            A::TYPE_TOKEN,
            A::KIND,
        )))
    }

    /// Publish a component's output mapping
    ///
    /// Repeated registration is recorded as-is and rejected by the engine.
    pub fn register_outputs(
        &mut self,
        component: &ResourceHandle,
        outputs: Inputs,
    ) -> DeclarationResult<()> {
        if component.kind() != PrimitiveKind::Component {
            return Err(DeclarationError::configuration(format!(
                "{} is a {}, only components register outputs",
                component.name(),
                component.kind()
            )));
        }
        for dependency in outputs.dependencies() {
            if self.graph.get(dependency).is_none() {
                return Err(DeclarationError::configuration(format!(
                    "outputs of {} refer to undeclared node {}",
                    component.name(),
                    dependency
                )));
            }
        }

        self.registrations.push(OutputRegistration {
            component: component.id(),
            outputs,
        });
        Ok(())
    }

    /// Publish a stack-level output for cross-stack references
    pub fn export<T>(&mut self, name: &str, value: impl Into<Input<T>>) -> DeclarationResult<()>
    where
        T: Serialize + Clone + Send + Sync + 'static,
    {
        if self.exports.iter().any(|export| export.name == name) {
            return Err(DeclarationError::configuration(format!(
                "stack output {} exported twice",
                name
            )));
        }
        let value = InputValue::from_input(value.into())?;
        self.exports.push(StackExport {
            name: name.to_string(),
            value,
        });
        Ok(())
    }

    /// Add an ordering constraint between two declared nodes
    pub fn add_dependency(&mut self, dependent: NodeId, dependency: NodeId) -> DeclarationResult<()> {
        self.graph.add_dependency(dependent, dependency)
    }

    /// Record an informational message
    pub fn info(&mut self, message: impl Into<String>, resource: Option<&str>) {
        let message = message.into();
        info!(resource = resource.unwrap_or("-"), "{}", message);
        self.diagnostics.push(Diagnostic {
            severity: Severity::Info,
            message,
            resource: resource.map(str::to_string),
        });
    }

    /// Record a warning
    pub fn warn(&mut self, message: impl Into<String>, resource: Option<&str>) {
        let message = message.into();
        warn!(resource = resource.unwrap_or("-"), "{}", message);
        self.diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            message,
            resource: resource.map(str::to_string),
        });
    }

    /// Names of every node owned (transitively) by a component
    pub fn owned_names(&self, component: NodeId) -> BTreeSet<String> {
        self.graph
            .descendants(component)
            .into_iter()
            .map(|id| self.graph.name_of(id))
            .collect()
    }

    /// Freeze the pass into an acyclic, ordered plan
    pub fn plan(&self) -> DeclarationResult<DeclarationPlan> {
        DeclarationPlan::from_context(self)
    }
}

fn attribute(name: &str, kind: PrimitiveKind, err: DeclarationError) -> DeclarationError {
    let reason = match err {
        DeclarationError::PrimitiveCreation { reason, .. }
        | DeclarationError::Registration { reason, .. } => reason,
        DeclarationError::Serialization(reason) => reason,
        DeclarationError::Output(err) => err.to_string(),
        other => return other,
    };
    if kind == PrimitiveKind::RegistryEntry {
        DeclarationError::registration(name, reason)
    } else {
        DeclarationError::primitive(name, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::aws::{AwsProviderArgs, VpcArgs};
    use crate::resource::kubernetes::{ClusterSecretArgs, ObjectMeta};
    use std::collections::BTreeMap;

    fn context() -> StackContext {
        StackContext::new(StackConfig::default()).unwrap()
    }

    #[test]
    fn test_register_attaches_parent_and_provider() {
        let mut ctx = context();
        let component = ctx
            .register_component("multicloud:index:KubernetesCluster", "hub", ResourceOptions::new())
            .unwrap();
        let provider = ctx
            .register(
                "hub-aws-provider",
                AwsProviderArgs::new("us-east-1", BTreeMap::new()),
                ResourceOptions::new().parent(component.id()),
            )
            .unwrap();
        let vpc = ctx
            .register(
                "hub-vpc",
                VpcArgs::for_cluster("hub".into(), BTreeMap::new()),
                ResourceOptions::new().parent(component.id()).provider(provider.id()),
            )
            .unwrap();

        let node = ctx.graph().node(vpc.id()).unwrap();
        assert_eq!(node.parent, Some(component.id()));
        assert_eq!(node.provider, Some(provider.id()));
        assert_eq!(ctx.owned_names(component.id()).len(), 2);
    }

    #[test]
    fn test_registry_entry_failures_are_registration_errors() {
        let mut ctx = context();
        let err = ctx
            .register(
                "spoke kubeconfig",
                ClusterSecretArgs {
                    metadata: ObjectMeta::named("spoke"),
                    string_data: BTreeMap::new(),
                },
                ResourceOptions::new(),
            )
            .unwrap_err();
        assert!(matches!(err, DeclarationError::Registration { .. }));
        assert_eq!(err.resource(), Some("spoke kubeconfig"));
    }

    #[test]
    fn test_outputs_only_for_components() {
        let mut ctx = context();
        let provider = ctx
            .register(
                "aws-provider",
                AwsProviderArgs::new("us-east-1", BTreeMap::new()),
                ResourceOptions::new(),
            )
            .unwrap();
        let result = ctx.register_outputs(provider.resource(), Inputs::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_export_rejected() {
        let mut ctx = context();
        ctx.export::<String>("clusterName", "hub").unwrap();
        assert!(ctx.export::<String>("clusterName", "hub").is_err());
    }

    #[test]
    fn test_warnings_are_recorded() {
        let mut ctx = context();
        ctx.info("declared", None);
        ctx.warn("unsupported provider gcp", Some("edge"));
        let warnings = ctx.warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].resource.as_deref(), Some("edge"));
    }
}
