// Copyright (c) 2025 - Cowboy AI, Inc.
//! Hub-and-spoke topology
//!
//! One hub cluster running the GitOps controller and any number of spokes
//! registering with it. The default topology is an Azure hub with two AWS
//! spokes in different regions.
//!
//! # Exports
//!
//! ```text
//! <provider>Kubeconfig   hub kubeconfig (secret), e.g. azureKubeconfig
//! clusterName            hub cluster name
//! clusterEndpoint        hub API endpoint
//! spoke<N>Kubeconfig     kubeconfig of spoke N (secret), N from 1
//! spoke<N>ClusterName    cluster name of spoke N
//! ```

use serde::{Deserialize, Serialize};

use crate::cluster::{ClusterConnection, ClusterRole, KubernetesCluster, KubernetesClusterArgs};
use crate::context::StackContext;
use crate::errors::DeclarationResult;
use crate::provider::ProviderId;
use crate::resource::ResourceOptions;

/// One cluster of a topology
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    /// Declaration name, also used as cluster name
    pub name: String,
    pub provider: ProviderId,
    pub version: String,
    pub region: String,
}

impl ClusterSpec {
    pub fn new(
        name: impl Into<String>,
        provider: impl Into<ProviderId>,
        version: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            provider: provider.into(),
            version: version.into(),
            region: region.into(),
        }
    }

    fn args(&self, role: ClusterRole) -> KubernetesClusterArgs {
        KubernetesClusterArgs::new(self.provider.clone())
            .cluster_name(self.name.as_str())
            .version(self.version.as_str())
            .role(role)
            .region(self.region.as_str())
    }
}

/// Hub and spokes to declare
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubSpokeTopology {
    pub hub: ClusterSpec,
    pub spokes: Vec<ClusterSpec>,
}

/// Declared clusters of a topology
#[derive(Debug, Clone)]
pub struct DeclaredTopology {
    pub hub: KubernetesCluster,
    pub spokes: Vec<KubernetesCluster>,
}

impl HubSpokeTopology {
    /// Azure hub in West Europe with AWS spokes in us-east-1 and il-central-1
    pub fn workshop_default() -> Self {
        Self {
            hub: ClusterSpec::new("azure-hub-cluster", ProviderId::Azure, "1.33.5", "westeurope"),
            spokes: vec![
                ClusterSpec::new("aws-spoke-1-cluster", ProviderId::Aws, "1.33", "us-east-1"),
                ClusterSpec::new("aws-spoke-2-cluster", ProviderId::Aws, "1.33", "il-central-1"),
            ],
        }
    }

    /// Declare the hub, then every spoke registered with it, and export
    /// their connection details
    pub fn declare(&self, ctx: &mut StackContext) -> DeclarationResult<DeclaredTopology> {
        let hub = KubernetesCluster::new(
            ctx,
            &self.hub.name,
            self.hub.args(ClusterRole::Hub),
            ResourceOptions::new(),
        )?;

        ctx.export::<Option<String>>(
            &hub_kubeconfig_export(&self.hub.provider),
            hub.kubeconfig.clone(),
        )?;
        ctx.export::<String>("clusterName", hub.cluster_name.clone())?;
        ctx.export::<String>("clusterEndpoint", hub.endpoint.clone())?;

        let spokes = self.declare_spokes(ctx, &hub.connection())?;
        Ok(DeclaredTopology { hub, spokes })
    }

    /// Declare only the spokes, registering with an existing hub
    ///
    /// Used when the hub lives in another stack.
    pub fn declare_spokes(
        &self,
        ctx: &mut StackContext,
        hub: &ClusterConnection,
    ) -> DeclarationResult<Vec<KubernetesCluster>> {
        let mut spokes = Vec::with_capacity(self.spokes.len());
        for (index, spec) in self.spokes.iter().enumerate() {
            let spoke = KubernetesCluster::new(
                ctx,
                &spec.name,
                spec.args(ClusterRole::Spoke).hub(hub),
                ResourceOptions::new(),
            )?;

            let number = index + 1;
            ctx.export::<Option<String>>(
                &format!("spoke{}Kubeconfig", number),
                spoke.kubeconfig.clone(),
            )?;
            ctx.export::<String>(
                &format!("spoke{}ClusterName", number),
                spoke.cluster_name.clone(),
            )?;
            spokes.push(spoke);
        }
        Ok(spokes)
    }
}

/// Export name of the hub kubeconfig
pub fn hub_kubeconfig_export(provider: &ProviderId) -> String {
    format!("{}Kubeconfig", provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StackConfig;
    use crate::graph::PrimitiveKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_workshop_topology_declares_hub_and_two_spokes() {
        let mut ctx = StackContext::new(StackConfig::default()).unwrap();
        let topology = HubSpokeTopology::workshop_default().declare(&mut ctx).unwrap();

        assert_eq!(topology.spokes.len(), 2);
        assert_eq!(ctx.graph().of_kind(PrimitiveKind::AddOn).len(), 2);
        assert_eq!(ctx.graph().of_kind(PrimitiveKind::RegistryEntry).len(), 2);
        assert_eq!(ctx.registrations().len(), 3);

        let exports: Vec<&str> = ctx.exports().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            exports,
            vec![
                "azureKubeconfig",
                "clusterName",
                "clusterEndpoint",
                "spoke1Kubeconfig",
                "spoke1ClusterName",
                "spoke2Kubeconfig",
                "spoke2ClusterName",
            ]
        );
        assert!(ctx.exports()[0].value.is_secret());
    }
}
