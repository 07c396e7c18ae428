// Copyright (c) 2025 - Cowboy AI, Inc.
//! EKS branch: VPC with tagged subnet tiers, then an auto-mode cluster

use super::args::ResolvedClusterArgs;
use super::ClusterConnection;
use crate::context::StackContext;
use crate::errors::DeclarationResult;
use crate::graph::NodeId;
use crate::resource::aws::{AwsProvider, EksClusterArgs, VpcArgs};
use crate::resource::ResourceOptions;

/// Declare the network and managed cluster for `name`
pub fn declare(
    ctx: &mut StackContext,
    name: &str,
    args: &ResolvedClusterArgs,
    provider: &AwsProvider,
    component: NodeId,
) -> DeclarationResult<ClusterConnection> {
    let opts = ResourceOptions::new()
        .parent(component)
        .provider(provider.id());

    let vpc = ctx.register(
        &format!("{}-vpc", name),
        VpcArgs::for_cluster(args.cluster_name.clone(), args.tags.clone()),
        opts.clone(),
    )?;

    let cluster = ctx.register(
        &format!("{}-cluster", name),
        EksClusterArgs::in_vpc(args.cluster_name.clone(), args.version.clone(), &vpc),
        opts,
    )?;

    Ok(ClusterConnection {
        kubeconfig: cluster.kubeconfig_json(),
        endpoint: cluster.endpoint(),
    })
}
