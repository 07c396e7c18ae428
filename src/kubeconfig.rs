// Copyright (c) 2025 - Cowboy AI, Inc.
//! Kubeconfig documents
//!
//! Standard cluster/user/context triples. EKS reports its kubeconfig as
//! JSON and AKS as YAML; both parse through `serde_yaml` since JSON is a
//! YAML subset.

use serde::{Deserialize, Serialize};

use crate::errors::{DeclarationError, DeclarationResult};

/// Kubeconfig document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Kubeconfig {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub clusters: Vec<NamedCluster>,
    #[serde(default)]
    pub contexts: Vec<NamedContext>,
    #[serde(default)]
    pub users: Vec<NamedUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedCluster {
    pub name: String,
    pub cluster: ClusterEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClusterEntry {
    pub server: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_authority_data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedContext {
    pub name: String,
    pub context: ContextEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub cluster: String,
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedUser {
    pub name: String,
    pub user: UserEntry,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_certificate_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_key_data: Option<String>,
    /// Credential plugin (e.g. `aws eks get-token`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec: Option<serde_json::Value>,
}

impl Kubeconfig {
    /// Single-context kubeconfig for one cluster
    pub fn for_cluster(name: &str, server: &str, ca_data: Option<String>, user: UserEntry) -> Self {
        Self {
            api_version: "v1".to_string(),
            kind: "Config".to_string(),
            clusters: vec![NamedCluster {
                name: name.to_string(),
                cluster: ClusterEntry {
                    server: server.to_string(),
                    certificate_authority_data: ca_data,
                },
            }],
            contexts: vec![NamedContext {
                name: name.to_string(),
                context: ContextEntry {
                    cluster: name.to_string(),
                    user: name.to_string(),
                    namespace: None,
                },
            }],
            users: vec![NamedUser {
                name: name.to_string(),
                user,
            }],
            current_context: Some(name.to_string()),
        }
    }

    /// Parse a YAML or JSON document and validate it
    pub fn parse(document: &str) -> DeclarationResult<Self> {
        let config: Self = serde_yaml::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> DeclarationResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json(&self) -> DeclarationResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Context selected by `current-context` (or the only context)
    pub fn current(&self) -> Option<&NamedContext> {
        match &self.current_context {
            Some(name) => self.contexts.iter().find(|c| &c.name == name),
            None if self.contexts.len() == 1 => self.contexts.first(),
            None => None,
        }
    }

    /// API server of the current context
    pub fn server(&self) -> Option<&str> {
        let context = self.current()?;
        self.clusters
            .iter()
            .find(|c| c.name == context.context.cluster)
            .map(|c| c.cluster.server.as_str())
    }

    /// Validate the document
    ///
    /// # Rules
    /// - `kind` is `Config`
    /// - every context refers to a declared cluster and user
    /// - `current-context`, when set, names a declared context
    /// - cluster servers are `https://` URLs
    pub fn validate(&self) -> DeclarationResult<()> {
        if self.kind != "Config" {
            return Err(DeclarationError::configuration(format!(
                "kubeconfig kind must be Config, got {}",
                self.kind
            )));
        }

        for cluster in &self.clusters {
            if !cluster.cluster.server.starts_with("https://") {
                return Err(DeclarationError::configuration(format!(
                    "cluster {} server must be https: {}",
                    cluster.name, cluster.cluster.server
                )));
            }
        }

        for context in &self.contexts {
            if !self.clusters.iter().any(|c| c.name == context.context.cluster) {
                return Err(DeclarationError::configuration(format!(
                    "context {} refers to unknown cluster {}",
                    context.name, context.context.cluster
                )));
            }
            if !self.users.iter().any(|u| u.name == context.context.user) {
                return Err(DeclarationError::configuration(format!(
                    "context {} refers to unknown user {}",
                    context.name, context.context.user
                )));
            }
        }

        if let Some(current) = &self.current_context {
            if !self.contexts.iter().any(|c| &c.name == current) {
                return Err(DeclarationError::configuration(format!(
                    "current-context {} is not defined",
                    current
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const AKS_KUBECONFIG: &str = r#"
apiVersion: v1
kind: Config
clusters:
- name: azure-hub-cluster
  cluster:
    server: https://aks-azure-hub-cluster.hcp.westeurope.azmk8s.io:443
    certificate-authority-data: Q0E=
contexts:
- name: azure-hub-cluster
  context:
    cluster: azure-hub-cluster
    user: clusterUser
users:
- name: clusterUser
  user:
    token: secret-token
current-context: azure-hub-cluster
"#;

    #[test]
    fn test_parse_yaml() {
        let config = Kubeconfig::parse(AKS_KUBECONFIG).unwrap();
        assert_eq!(
            config.server(),
            Some("https://aks-azure-hub-cluster.hcp.westeurope.azmk8s.io:443")
        );
        assert_eq!(config.users[0].user.token.as_deref(), Some("secret-token"));
    }

    #[test]
    fn test_json_document_parses() {
        let config = Kubeconfig::for_cluster(
            "aws-spoke-1-cluster",
            "https://ABC.gr7.us-east-1.eks.amazonaws.com",
            Some("Q0E=".to_string()),
            UserEntry::default(),
        );
        let parsed = Kubeconfig::parse(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_dangling_context_rejected() {
        let mut config = Kubeconfig::for_cluster(
            "spoke",
            "https://spoke.example",
            None,
            UserEntry::default(),
        );
        config.users.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_plain_http_rejected() {
        let config = Kubeconfig::for_cluster("spoke", "http://spoke", None, UserEntry::default());
        assert!(config.validate().is_err());
    }
}
