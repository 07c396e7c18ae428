// Copyright (c) 2025 - Cowboy AI, Inc.
//! AKS branch: resource group, then an AKS Automatic cluster
//!
//! The kubeconfig is the decoded first user credential of the cluster and
//! the endpoint is derived from its FQDN.

use super::args::ResolvedClusterArgs;
use super::ClusterConnection;
use crate::context::StackContext;
use crate::errors::DeclarationResult;
use crate::graph::NodeId;
use crate::resource::azure::{AzureProvider, ManagedClusterArgs, ResourceGroupArgs};
use crate::resource::ResourceOptions;

/// Declare the resource group and managed cluster for `name`
pub fn declare(
    ctx: &mut StackContext,
    name: &str,
    args: &ResolvedClusterArgs,
    provider: &AzureProvider,
    component: NodeId,
) -> DeclarationResult<ClusterConnection> {
    let opts = ResourceOptions::new()
        .parent(component)
        .provider(provider.id());

    let group = ctx.register(
        &format!("{}-rg", name),
        ResourceGroupArgs::for_cluster(args.cluster_name.clone(), args.region.clone().into()),
        opts.clone(),
    )?;

    let cluster = ctx.register(
        &format!("{}-aks-cluster", name),
        ManagedClusterArgs::in_group(
            &group,
            args.cluster_name.clone(),
            args.region.clone().into(),
            args.version.clone(),
            args.tags.clone(),
        ),
        opts,
    )?;

    Ok(ClusterConnection {
        kubeconfig: cluster.user_kubeconfig(),
        endpoint: cluster.endpoint(),
    })
}
