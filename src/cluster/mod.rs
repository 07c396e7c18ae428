// Copyright (c) 2025 - Cowboy AI, Inc.
//! Composite Cluster Component
//!
//! [`KubernetesCluster`] aggregates the primitives of one managed cluster
//! into a named unit with a fixed output contract:
//!
//! ```text
//! { kubeconfig: Option<String> (secret), endpoint: String,
//!   clusterName: String, provider: "aws" | "azure" | ... }
//! ```
//!
//! # Declaration Order
//!
//! 1. Resolve defaults (name, version, role, region)
//! 2. Bind the provider and declare its network + managed cluster
//! 3. Declare a cluster-API provider from the resolved kubeconfig
//! 4. Apply the role (hub add-ons, or spoke identity + registration)
//! 5. Register the outputs, exactly once
//!
//! An unsupported provider records a warning and yields empty outputs; steps
//! 3 and 4 are skipped since there is no cluster to configure. Sibling
//! components are unaffected.

pub mod args;
pub mod aws;
pub mod azure;
pub mod hub;
pub mod spoke;

pub use args::{ClusterRole, KubernetesClusterArgs, ResolvedClusterArgs};
pub use hub::HubAddOns;
pub use spoke::SpokeAccess;

use chrono::Utc;
use serde_json::json;
use tracing::debug;

use crate::context::StackContext;
use crate::errors::DeclarationResult;
use crate::graph::NodeId;
use crate::output::{Inputs, Output};
use crate::provider::{self, ProviderHandle, ProviderId};
use crate::resource::kubernetes::{ClusterSecret, KubernetesProvider, KubernetesProviderArgs};
use crate::resource::{ResourceHandle, ResourceOptions};
use crate::state_machine::{RoleCommand, RoleEffect, RoleLifecycle, RoleState, RoleStep};

/// Type token of the component
pub const COMPONENT_TYPE: &str = "multicloud:index:KubernetesCluster";

/// How to reach a cluster: its kubeconfig and API endpoint
#[derive(Debug, Clone)]
pub struct ClusterConnection {
    /// Kubeconfig document; `None` when no cluster was created
    pub kubeconfig: Output<Option<String>>,
    /// API server URL; empty when no cluster was created
    pub endpoint: Output<String>,
}

impl ClusterConnection {
    /// Connection of a cluster that was not created
    pub fn empty() -> Self {
        Self {
            kubeconfig: Output::known(None),
            endpoint: Output::known(String::new()),
        }
    }
}

/// Resources attached by the role
#[derive(Debug, Clone)]
pub enum RoleResources {
    /// Role skipped (unsupported provider)
    None,
    Hub(HubAddOns),
    Spoke {
        access: SpokeAccess,
        /// Present only when hub connection info was supplied
        registration: Option<ClusterSecret>,
    },
}

/// Multi-cloud Kubernetes cluster component
#[derive(Debug, Clone)]
pub struct KubernetesCluster {
    resource: ResourceHandle,
    /// Kubeconfig for accessing the cluster (secret)
    pub kubeconfig: Output<Option<String>>,
    /// API server endpoint
    pub endpoint: Output<String>,
    /// Resolved cluster name
    pub cluster_name: Output<String>,
    /// Provider the cluster was declared for
    pub provider: ProviderId,
    role: ClusterRole,
    lifecycle: RoleLifecycle,
    k8s_provider: Option<KubernetesProvider>,
    role_resources: RoleResources,
}

impl KubernetesCluster {
    /// Declare a cluster component named `name`
    ///
    /// # Errors
    ///
    /// Fails fast on the first primitive that cannot be declared; the error
    /// names that primitive. An unsupported provider is not an error.
    pub fn new(
        ctx: &mut StackContext,
        name: &str,
        args: KubernetesClusterArgs,
        opts: ResourceOptions,
    ) -> DeclarationResult<Self> {
        let component = ctx.register_component(COMPONENT_TYPE, name, opts)?;
        let args = ResolvedClusterArgs::resolve(name, args, ctx.config());
        debug!(
            cluster = name,
            provider = %args.provider,
            role = %args.role,
            region = %args.region,
            "Declaring cluster"
        );

        let binding = provider::bind(ctx, &args.provider, name, &args.region, component.id())?;
        let connection = match &binding {
            Some(ProviderHandle::Aws(aws)) => aws::declare(ctx, name, &args, aws, component.id())?,
            Some(ProviderHandle::Azure(azure)) => {
                azure::declare(ctx, name, &args, azure, component.id())?
            }
            None => ClusterConnection::empty(),
        };

        let mut lifecycle = RoleLifecycle::new();
        let mut k8s_provider = None;
        let mut role_resources = RoleResources::None;

        if binding.is_some() {
            let k8s = ctx.register(
                &format!("{}-k8s-provider", name),
                KubernetesProviderArgs {
                    kubeconfig: connection.kubeconfig.clone(),
                },
                ResourceOptions::new().parent(component.id()),
            )?;

            role_resources = match advance(ctx, name, &mut lifecycle, args.role.assignment())? {
                RoleEffect::InstallAddOns => {
                    RoleResources::Hub(hub::declare(ctx, name, &k8s, component.id())?)
                }
                RoleEffect::GrantAccess => {
                    ctx.info(
                        format!("Spoke cluster {} created with management access", name),
                        Some(name),
                    );
                    let access = spoke::declare_access(ctx, name, &k8s, component.id())?;
                    let registration = match args.hub_kubeconfig.clone() {
                        Some(hub_kubeconfig) => {
                            match advance(ctx, name, &mut lifecycle, RoleCommand::DeclareRegistration)? {
                                RoleEffect::Register => Some(spoke::declare_registration(
                                    ctx,
                                    name,
                                    &args,
                                    connection.endpoint.clone(),
                                    &access,
                                    hub_kubeconfig,
                                    component.id(),
                                )?),
                                _ => None,
                            }
                        }
                        None => {
                            advance(ctx, name, &mut lifecycle, RoleCommand::SkipRegistration)?;
                            None
                        }
                    };
                    RoleResources::Spoke {
                        access,
                        registration,
                    }
                }
                _ => RoleResources::None,
            };
            k8s_provider = Some(k8s);
        } else {
            ctx.info(
                format!("Role {} not applied to cluster {}: no cluster declared", args.role, name),
                Some(name),
            );
        }

        let cluster = Self {
            resource: component,
            kubeconfig: connection.kubeconfig.secret(),
            endpoint: connection.endpoint,
            cluster_name: args.cluster_name.into_output(),
            provider: args.provider,
            role: args.role,
            lifecycle,
            k8s_provider,
            role_resources,
        };

        ctx.register_outputs(&cluster.resource, cluster.outputs()?)?;
        Ok(cluster)
    }

    /// Output mapping registered for the component
    pub fn outputs(&self) -> DeclarationResult<Inputs> {
        Ok(Inputs::new()
            .with::<Option<String>>("kubeconfig", self.kubeconfig.clone())?
            .with::<String>("endpoint", self.endpoint.clone())?
            .with::<String>("clusterName", self.cluster_name.clone())?
            .with_value("provider", json!(self.provider.as_str())))
    }

    pub fn resource(&self) -> &ResourceHandle {
        &self.resource
    }

    pub fn id(&self) -> NodeId {
        self.resource.id()
    }

    pub fn name(&self) -> &str {
        self.resource.name()
    }

    /// Requested role (applied only when a cluster was declared)
    pub fn role(&self) -> ClusterRole {
        self.role
    }

    /// Current role state
    pub fn role_state(&self) -> RoleState {
        self.lifecycle.state()
    }

    /// Role commands applied during declaration
    pub fn role_history(&self) -> &[RoleStep] {
        self.lifecycle.steps()
    }

    /// Cluster-API provider built from the cluster's kubeconfig
    pub fn k8s_provider(&self) -> Option<&KubernetesProvider> {
        self.k8s_provider.as_ref()
    }

    pub fn role_resources(&self) -> &RoleResources {
        &self.role_resources
    }

    /// Registry entry declared in the hub, if any
    pub fn registration(&self) -> Option<&ClusterSecret> {
        match &self.role_resources {
            RoleResources::Spoke { registration, .. } => registration.as_ref(),
            _ => None,
        }
    }

    /// Connection info for spokes registering with this cluster
    pub fn connection(&self) -> ClusterConnection {
        ClusterConnection {
            kubeconfig: self.kubeconfig.clone(),
            endpoint: self.endpoint.clone(),
        }
    }
}

fn advance(
    ctx: &mut StackContext,
    name: &str,
    lifecycle: &mut RoleLifecycle,
    command: RoleCommand,
) -> DeclarationResult<RoleEffect> {
    let effect = lifecycle.apply(command, Utc::now())?;
    if let RoleEffect::Skip(reason) = &effect {
        ctx.info(format!("Cluster {}: {}", name, reason), Some(name));
    }
    Ok(effect)
}
