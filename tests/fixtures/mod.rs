// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-multicloud-kubernetes
//!
//! Provides deterministic topologies and stack references for integration
//! tests.
//!
//! # Design Principles
//! - Every fixture starts from the same fixed configuration
//! - Cluster names are constants so assertions can name resources
//! - Fixtures declare; tests apply and assert

#![allow(dead_code)]

use serde_json::json;
use std::collections::BTreeMap;

use cim_multicloud_kubernetes::cluster::{ClusterConnection, ClusterRole};
use cim_multicloud_kubernetes::{
    KubernetesCluster, KubernetesClusterArgs, ProviderId, ResourceOptions, StackConfig,
    StackContext, StackReference,
};

pub const HUB_NAME: &str = "azure-hub-cluster";
pub const SPOKE_1_NAME: &str = "aws-spoke-1-cluster";
pub const SPOKE_2_NAME: &str = "aws-spoke-2-cluster";

pub const BEARER_TOKEN: &str = "eyJhbGciOiJSUzI1NiJ9.fixture-token";

pub const HUB_KUBECONFIG: &str = "apiVersion: v1
kind: Config
clusters:
- name: azure-hub-cluster
  cluster:
    server: https://aks-azure-hub-cluster.hcp.westeurope.azmk8s.io:443
contexts:
- name: azure-hub-cluster
  context:
    cluster: azure-hub-cluster
    user: azure-hub-cluster
users:
- name: azure-hub-cluster
  user:
    token: fixture
current-context: azure-hub-cluster
";

/// Fixed configuration used by every fixture
pub fn fixed_config() -> StackConfig {
    StackConfig {
        project: "hub-and-spoke".to_string(),
        stack: "test".to_string(),
        ..StackConfig::default()
    }
}

/// Fresh declaration context
pub fn context() -> StackContext {
    StackContext::new(fixed_config()).expect("Invalid fixture configuration")
}

/// Azure hub in West Europe
pub fn declare_hub(ctx: &mut StackContext) -> KubernetesCluster {
    KubernetesCluster::new(
        ctx,
        HUB_NAME,
        KubernetesClusterArgs::new(ProviderId::Azure)
            .version("1.33.5")
            .role(ClusterRole::Hub)
            .region("westeurope"),
        ResourceOptions::new(),
    )
    .expect("Failed to declare hub")
}

/// AWS spoke, registered with `hub` when given
pub fn declare_spoke(
    ctx: &mut StackContext,
    name: &str,
    region: &str,
    hub: Option<&ClusterConnection>,
) -> KubernetesCluster {
    let mut args = KubernetesClusterArgs::new(ProviderId::Aws)
        .version("1.33")
        .role(ClusterRole::Spoke)
        .region(region);
    if let Some(hub) = hub {
        args = args.hub(hub);
    }
    KubernetesCluster::new(ctx, name, args, ResourceOptions::new())
        .expect("Failed to declare spoke")
}

/// Exports of a hub stack as read by a spoke stack
pub fn hub_reference() -> StackReference {
    StackReference::new(
        "organization/hub/test",
        BTreeMap::from([
            ("azureKubeconfig".to_string(), json!(HUB_KUBECONFIG)),
            ("clusterName".to_string(), json!(HUB_NAME)),
            (
                "clusterEndpoint".to_string(),
                json!("https://aks-azure-hub-cluster.hcp.westeurope.azmk8s.io:4443"),
            ),
        ]),
    )
}
