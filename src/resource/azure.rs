// Copyright (c) 2025 - Cowboy AI, Inc.
//! Azure primitives: provider, resource group and AKS managed cluster
//!
//! The managed cluster is declared through the generic ARM resource type so
//! that AKS Automatic settings (Base/Standard SKU, Cilium dataplane) can be
//! passed as raw properties.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

use super::ResourceArgs;
use crate::errors::DeclarationResult;
use crate::graph::PrimitiveKind;
use crate::output::{Input, Inputs, Output};

/// ARM API version used for `managedClusters`
pub const MANAGED_CLUSTER_API_VERSION: &str = "2025-09-01";

/// Port the AKS API server is reached on
pub const AKS_API_PORT: u16 = 4443;

/// Azure Native provider arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureProviderArgs {
    pub location: String,
}

resource_handle!(
    /// Configured Azure Native provider
    AzureProvider
);

impl ResourceArgs for AzureProviderArgs {
    type Handle = AzureProvider;
    const TYPE_TOKEN: &'static str = "pulumi:providers:azure-native";
    const KIND: PrimitiveKind = PrimitiveKind::Provider;

    fn into_inputs(self) -> DeclarationResult<Inputs> {
        Ok(Inputs::new().with_value("location", json!(self.location)))
    }
}

/// Resource group arguments
#[derive(Debug, Clone)]
pub struct ResourceGroupArgs {
    pub location: Input<String>,
    pub resource_group_name: Input<String>,
}

impl ResourceGroupArgs {
    /// `rg-<cluster>` in the given location
    pub fn for_cluster(cluster_name: Input<String>, location: Input<String>) -> Self {
        Self {
            location,
            resource_group_name: cluster_name.map(|name| format!("rg-{}", name)),
        }
    }
}

resource_handle!(
    /// Declared resource group
    ResourceGroup
);

impl ResourceGroup {
    pub fn name(&self) -> Output<String> {
        self.resource.output("name")
    }
}

impl ResourceArgs for ResourceGroupArgs {
    type Handle = ResourceGroup;
    const TYPE_TOKEN: &'static str = "azure-native:resources:ResourceGroup";
    const KIND: PrimitiveKind = PrimitiveKind::ResourceGroup;

    fn into_inputs(self) -> DeclarationResult<Inputs> {
        Inputs::new()
            .with::<String>("location", self.location)?
            .with::<String>("resourceGroupName", self.resource_group_name)
    }
}

/// SKU of a managed cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    pub name: String,
    pub tier: String,
}

impl Default for Sku {
    fn default() -> Self {
        Self {
            name: "Base".to_string(),
            tier: "Standard".to_string(),
        }
    }
}

/// Cluster network configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkProfile {
    pub network_dataplane: String,
    pub network_plugin: String,
    pub network_plugin_mode: String,
}

impl Default for NetworkProfile {
    /// Azure CNI overlay with the Cilium dataplane
    fn default() -> Self {
        Self {
            network_dataplane: "cilium".to_string(),
            network_plugin: "azure".to_string(),
            network_plugin_mode: "overlay".to_string(),
        }
    }
}

/// Node pool of a managed cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPoolProfile {
    pub name: String,
    pub mode: String,
    pub vm_size: String,
    pub count: u32,
    pub os_type: String,
}

impl AgentPoolProfile {
    /// Three-node Linux system pool
    pub fn system() -> Self {
        Self {
            name: "systempool".to_string(),
            mode: "System".to_string(),
            vm_size: "Standard_D2s_v3".to_string(),
            count: 3,
            os_type: "Linux".to_string(),
        }
    }
}

/// AKS managed cluster arguments
#[derive(Debug, Clone)]
pub struct ManagedClusterArgs {
    pub resource_name: Input<String>,
    pub resource_group_name: Output<String>,
    pub location: Input<String>,
    pub dns_prefix: Input<String>,
    pub kubernetes_version: Input<String>,
    pub sku: Sku,
    pub network_profile: NetworkProfile,
    pub agent_pool_profiles: Vec<AgentPoolProfile>,
    pub tags: BTreeMap<String, String>,
}

impl ManagedClusterArgs {
    /// AKS Automatic cluster in a resource group
    pub fn in_group(
        group: &ResourceGroup,
        cluster_name: Input<String>,
        location: Input<String>,
        kubernetes_version: Input<String>,
        tags: BTreeMap<String, String>,
    ) -> Self {
        Self {
            resource_name: cluster_name.clone(),
            resource_group_name: group.name(),
            location,
            dns_prefix: cluster_name.map(|name| format!("aks-{}", name)),
            kubernetes_version,
            sku: Sku::default(),
            network_profile: NetworkProfile::default(),
            agent_pool_profiles: vec![AgentPoolProfile::system()],
            tags,
        }
    }
}

/// One entry of a cluster credential listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialResult {
    pub name: String,
    /// Base64-encoded kubeconfig
    pub value: String,
}

resource_handle!(
    /// Declared AKS managed cluster
    ManagedCluster
);

impl ManagedCluster {
    pub fn name(&self) -> Output<String> {
        self.resource.output("name")
    }

    /// Fully qualified API server host name
    pub fn fqdn(&self) -> Output<String> {
        self.resource.output("properties.fqdn")
    }

    /// API server endpoint, `https://<fqdn>:4443`
    pub fn endpoint(&self) -> Output<String> {
        self.fqdn()
            .map(|fqdn| format!("https://{}:{}", fqdn, AKS_API_PORT))
    }

    /// Decoded kubeconfig of the first user credential
    pub fn user_kubeconfig(&self) -> Output<Option<String>> {
        self.resource
            .output::<Vec<CredentialResult>>("userCredentials.kubeconfigs")
            .then(|credentials| match credentials.first() {
                Some(credential) => decode_kubeconfig(&credential.value).map(Some),
                None => Ok(None),
            })
            .secret()
    }
}

/// User credential that could not be turned into a kubeconfig
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("invalid base64 kubeconfig: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("kubeconfig is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

fn decode_kubeconfig(encoded: &str) -> Result<String, CredentialError> {
    Ok(String::from_utf8(STANDARD.decode(encoded)?)?)
}

impl ResourceArgs for ManagedClusterArgs {
    type Handle = ManagedCluster;
    const TYPE_TOKEN: &'static str = "azure-native:resources:Resource";
    const KIND: PrimitiveKind = PrimitiveKind::ManagedCluster;

    fn into_inputs(self) -> DeclarationResult<Inputs> {
        let network_profile = serde_json::to_value(&self.network_profile)?;
        let agent_pools = serde_json::to_value(&self.agent_pool_profiles)?;
        let properties = self
            .dns_prefix
            .into_output()
            .zip(self.kubernetes_version.into_output())
            .map(move |(dns_prefix, version)| {
                json!({
                    "dnsPrefix": dns_prefix,
                    "kubernetesVersion": version,
                    "networkProfile": network_profile,
                    "agentPoolProfiles": agent_pools,
                })
            });

        Ok(Inputs::new()
            .with::<String>("resourceName", self.resource_name)?
            .with::<String>("resourceGroupName", self.resource_group_name)?
            .with::<String>("location", self.location)?
            .with_value("apiVersion", json!(MANAGED_CLUSTER_API_VERSION))
            .with_value("resourceType", json!("managedClusters"))
            .with_value("resourceProviderNamespace", json!("Microsoft.ContainerService"))
            .with_value("parentResourcePath", json!(""))
            .with_value("identity", json!({ "type": "SystemAssigned" }))
            .with_value("sku", serde_json::to_value(&self.sku)?)
            .with_value("tags", json!(self.tags))
            .with_output("properties", properties))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeId;
    use crate::output::ResolvedOutputs;
    use crate::resource::ResourceHandle;
    use pretty_assertions::assert_eq;

    fn cluster_handle() -> ManagedCluster {
        ManagedCluster::from(ResourceHandle::new(
            NodeId::new(3),
            "hub-aks-cluster",
            ManagedClusterArgs::TYPE_TOKEN,
            PrimitiveKind::ManagedCluster,
        ))
    }

    fn resolved(outputs: serde_json::Value) -> ResolvedOutputs {
        let mut resolved = ResolvedOutputs::new();
        if let serde_json::Value::Object(map) = outputs {
            resolved.insert(NodeId::new(3), map);
        }
        resolved
    }

    #[test]
    fn test_resource_group_name_is_prefixed() {
        let args = ResourceGroupArgs::for_cluster("azure-hub-cluster".into(), "westeurope".into());
        let inputs = args.into_inputs().unwrap();
        assert_eq!(
            inputs.get("resourceGroupName").unwrap().known(),
            Some(&json!("rg-azure-hub-cluster"))
        );
    }

    #[test]
    fn test_endpoint_uses_fqdn_and_port() {
        let cluster = cluster_handle();
        let state = resolved(json!({"properties": {"fqdn": "aks-hub.hcp.westeurope.azmk8s.io"}}));
        assert_eq!(
            cluster.endpoint().resolve(&state).unwrap(),
            "https://aks-hub.hcp.westeurope.azmk8s.io:4443"
        );
    }

    #[test]
    fn test_user_kubeconfig_is_decoded() {
        let cluster = cluster_handle();
        let encoded = STANDARD.encode("apiVersion: v1\nkind: Config\n");
        let state = resolved(json!({
            "userCredentials": {"kubeconfigs": [{"name": "clusterUser", "value": encoded}]}
        }));

        let kubeconfig = cluster.user_kubeconfig();
        assert!(kubeconfig.is_secret());
        assert_eq!(
            kubeconfig.resolve(&state).unwrap().as_deref(),
            Some("apiVersion: v1\nkind: Config\n")
        );
    }

    #[test]
    fn test_invalid_kubeconfig_encoding_fails() {
        let cluster = cluster_handle();
        let state = resolved(json!({
            "userCredentials": {"kubeconfigs": [{"name": "clusterUser", "value": "%%%"}]}
        }));
        assert!(cluster.user_kubeconfig().resolve(&state).is_err());
    }
}
