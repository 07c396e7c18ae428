// Copyright (c) 2025 - Cowboy AI, Inc.
//! Arguments of the cluster component and their defaults

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::ClusterConnection;
use crate::config::StackConfig;
use crate::errors::{DeclarationError, DeclarationResult};
use crate::output::{Input, Output};
use crate::provider::ProviderId;
use crate::state_machine::RoleCommand;

/// Topology role of a cluster
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterRole {
    /// Runs the GitOps controller managing the spokes
    Hub,
    /// Managed by a hub
    #[default]
    Spoke,
}

impl ClusterRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hub => "hub",
            Self::Spoke => "spoke",
        }
    }

    /// Role-assignment input of the role state machine
    pub fn assignment(&self) -> RoleCommand {
        match self {
            Self::Hub => RoleCommand::AssignHub,
            Self::Spoke => RoleCommand::AssignSpoke,
        }
    }
}

impl FromStr for ClusterRole {
    type Err = DeclarationError;

    /// Parse a role name; the empty string selects the default (spoke)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hub" => Ok(Self::Hub),
            "spoke" | "" => Ok(Self::Spoke),
            other => Err(DeclarationError::configuration(format!(
                "unknown cluster role: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for ClusterRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input arguments of [`super::KubernetesCluster`]
///
/// # Examples
///
/// ```rust,ignore
/// let args = KubernetesClusterArgs::new(ProviderId::Aws)
///     .cluster_name("aws-spoke-1-cluster")
///     .version("1.33")
///     .role(ClusterRole::Spoke)
///     .region("us-east-1")
///     .hub(&hub.connection());
/// ```
#[derive(Debug, Clone)]
pub struct KubernetesClusterArgs {
    pub provider: ProviderId,
    /// Defaults to the declaration name
    pub cluster_name: Option<Input<String>>,
    /// Defaults to the configured Kubernetes version
    pub version: Option<Input<String>>,
    /// Defaults to spoke
    pub role: Option<ClusterRole>,
    /// Defaults to the configured region
    pub region: Option<String>,
    /// Extra tags for subnets and cluster resources
    pub tags: BTreeMap<String, String>,
    /// Kubeconfig of the hub a spoke registers with
    pub hub_kubeconfig: Option<Output<Option<String>>>,
}

impl KubernetesClusterArgs {
    pub fn new(provider: impl Into<ProviderId>) -> Self {
        Self {
            provider: provider.into(),
            cluster_name: None,
            version: None,
            role: None,
            region: None,
            tags: BTreeMap::new(),
            hub_kubeconfig: None,
        }
    }

    pub fn cluster_name(mut self, name: impl Into<Input<String>>) -> Self {
        self.cluster_name = Some(name.into());
        self
    }

    pub fn version(mut self, version: impl Into<Input<String>>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn role(mut self, role: ClusterRole) -> Self {
        self.role = Some(role);
        self
    }

    /// Set the role from its name
    pub fn role_name(self, role: &str) -> DeclarationResult<Self> {
        Ok(self.role(role.parse()?))
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn hub_kubeconfig(mut self, kubeconfig: Output<Option<String>>) -> Self {
        self.hub_kubeconfig = Some(kubeconfig);
        self
    }

    /// Register with the given hub (spokes only)
    pub fn hub(self, hub: &ClusterConnection) -> Self {
        self.hub_kubeconfig(hub.kubeconfig.clone())
    }
}

/// Arguments with every default applied
#[derive(Debug, Clone)]
pub struct ResolvedClusterArgs {
    pub provider: ProviderId,
    pub cluster_name: Input<String>,
    pub version: Input<String>,
    pub role: ClusterRole,
    pub region: String,
    pub tags: BTreeMap<String, String>,
    pub hub_kubeconfig: Option<Output<Option<String>>>,
}

impl ResolvedClusterArgs {
    /// Apply defaults for a component declared as `name`
    pub fn resolve(name: &str, args: KubernetesClusterArgs, config: &StackConfig) -> Self {
        Self {
            provider: args.provider,
            cluster_name: args
                .cluster_name
                .unwrap_or_else(|| Input::Value(name.to_string())),
            version: args
                .version
                .unwrap_or_else(|| Input::Value(config.default_kubernetes_version.clone())),
            role: args.role.unwrap_or_default(),
            region: args
                .region
                .filter(|region| !region.trim().is_empty())
                .unwrap_or_else(|| config.default_region.clone()),
            tags: args.tags,
            hub_kubeconfig: args.hub_kubeconfig,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::ResolvedOutputs;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn known(input: &Input<String>) -> String {
        input
            .clone()
            .into_output()
            .resolve(&ResolvedOutputs::new())
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let resolved = ResolvedClusterArgs::resolve(
            "edge-cluster",
            KubernetesClusterArgs::new("aws"),
            &StackConfig::default(),
        );

        assert_eq!(known(&resolved.cluster_name), "edge-cluster");
        assert_eq!(known(&resolved.version), "1.28");
        assert_eq!(resolved.role, ClusterRole::Spoke);
        assert_eq!(resolved.region, "us-east-1");
        assert!(resolved.hub_kubeconfig.is_none());
    }

    #[test]
    fn test_overrides() {
        let args = KubernetesClusterArgs::new("azure")
            .cluster_name("azure-hub-cluster")
            .version("1.33.5")
            .role(ClusterRole::Hub)
            .region("westeurope");
        let resolved = ResolvedClusterArgs::resolve("hub", args, &StackConfig::default());

        assert_eq!(known(&resolved.cluster_name), "azure-hub-cluster");
        assert_eq!(known(&resolved.version), "1.33.5");
        assert_eq!(resolved.role, ClusterRole::Hub);
        assert_eq!(resolved.region, "westeurope");
    }

    #[test_case("hub", ClusterRole::Hub ; "hub")]
    #[test_case("Spoke", ClusterRole::Spoke ; "spoke mixed case")]
    #[test_case("", ClusterRole::Spoke ; "empty defaults to spoke")]
    fn test_parse_role(value: &str, expected: ClusterRole) {
        assert_eq!(value.parse::<ClusterRole>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_role_is_configuration_error() {
        let err = KubernetesClusterArgs::new("aws").role_name("edge").unwrap_err();
        assert!(matches!(err, DeclarationError::Configuration(_)));
    }
}
