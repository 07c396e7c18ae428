// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Declaration Defaults
//!
//! Cluster names fall back to the declaration name, overrides always win,
//! and every child of a cluster is named after its component.

use cim_multicloud_kubernetes::cluster::ResolvedClusterArgs;
use cim_multicloud_kubernetes::output::ResolvedOutputs;
use cim_multicloud_kubernetes::{
    ClusterRole, KubernetesCluster, KubernetesClusterArgs, ProviderId, ResourceOptions,
    StackConfig, StackContext,
};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// DNS-label-like declaration names
fn cluster_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,30}[a-z0-9]"
}

fn provider() -> impl Strategy<Value = ProviderId> {
    prop_oneof![Just(ProviderId::Aws), Just(ProviderId::Azure)]
}

fn role() -> impl Strategy<Value = ClusterRole> {
    prop_oneof![Just(ClusterRole::Hub), Just(ClusterRole::Spoke)]
}

fn known(input: cim_multicloud_kubernetes::Input<String>) -> String {
    input
        .into_output()
        .resolve(&ResolvedOutputs::new())
        .unwrap()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Property: An unset cluster name is the declaration name
    #[test]
    fn prop_cluster_name_defaults_to_declaration_name(name in cluster_name(), provider in provider()) {
        let resolved = ResolvedClusterArgs::resolve(
            &name,
            KubernetesClusterArgs::new(provider),
            &StackConfig::default(),
        );
        prop_assert_eq!(known(resolved.cluster_name), name);
        prop_assert_eq!(resolved.role, ClusterRole::Spoke);
    }

    /// Property: An explicit cluster name always wins
    #[test]
    fn prop_cluster_name_override_wins(name in cluster_name(), other in cluster_name()) {
        let resolved = ResolvedClusterArgs::resolve(
            &name,
            KubernetesClusterArgs::new(ProviderId::Aws).cluster_name(other.as_str()),
            &StackConfig::default(),
        );
        prop_assert_eq!(known(resolved.cluster_name), other);
    }

    /// Property: Blank regions fall back to the configured region
    #[test]
    fn prop_blank_region_uses_default(name in cluster_name(), blank in "[ \t]{0,3}") {
        let config = StackConfig::default();
        let resolved = ResolvedClusterArgs::resolve(
            &name,
            KubernetesClusterArgs::new(ProviderId::Azure).region(blank),
            &config,
        );
        prop_assert_eq!(resolved.region, config.default_region);
    }

    /// Property: Every child of a cluster is owned by it and named after it
    #[test]
    fn prop_children_are_prefixed_and_owned(
        name in cluster_name(),
        provider in provider(),
        role in role(),
    ) {
        let mut ctx = StackContext::new(StackConfig::default()).unwrap();
        let cluster = KubernetesCluster::new(
            &mut ctx,
            &name,
            KubernetesClusterArgs::new(provider).role(role),
            ResourceOptions::new(),
        )
        .unwrap();

        let owned = ctx.owned_names(cluster.id());
        prop_assert_eq!(owned.len() + 1, ctx.graph().len());
        let prefix = format!("{}-", name);
        for child in &owned {
            prop_assert!(child.starts_with(&prefix), "{} lacks prefix {}", child, prefix);
        }
        prop_assert_eq!(ctx.registrations().len(), 1);
    }
}
