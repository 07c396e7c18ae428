// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stack configuration
//!
//! All ambient settings of a declaration pass live in [`StackConfig`], built
//! once at startup (from the environment or an explicit lookup) and
//! validated before any resource is declared.
//!
//! # Environment Variables
//!
//! | Variable                                 | Default                       |
//! |------------------------------------------|-------------------------------|
//! | `MULTICLOUD_PROJECT`                     | `multi-cloud-kubernetes`      |
//! | `MULTICLOUD_STACK`                       | `dev`                         |
//! | `MULTICLOUD_ENVIRONMENT`                 | `dev`                         |
//! | `MULTICLOUD_MANAGED_BY`                  | `Pulumi`                      |
//! | `MULTICLOUD_DEFAULT_REGION`              | `us-east-1`                   |
//! | `MULTICLOUD_KUBERNETES_VERSION`          | `1.28`                        |
//! | `MULTICLOUD_ARGOCD_NAMESPACE`            | `argocd`                      |
//! | `MULTICLOUD_ARGOCD_CHART`                | argo-cd OCI chart             |
//! | `MULTICLOUD_ARGOCD_APPS_CHART`           | argocd-apps OCI chart         |
//! | `MULTICLOUD_ARGOCD_CHART_VERSION`        | unset (latest)                |
//! | `MULTICLOUD_ARGOCD_ADMIN_PASSWORD_HASH`  | workshop bcrypt hash          |
//! | `MULTICLOUD_ARGOCD_INITIAL_OBJECTS_URL`  | workshop initial objects file |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::{DeclarationError, DeclarationResult};

/// Argo CD chart reference
pub const DEFAULT_ARGOCD_CHART: &str = "oci://ghcr.io/argoproj/argo-helm/argo-cd";

/// Argo CD applications chart reference
pub const DEFAULT_ARGOCD_APPS_CHART: &str = "oci://ghcr.io/argoproj/argo-helm/argocd-apps";

/// bcrypt hash of the workshop admin password
pub const DEFAULT_ARGOCD_ADMIN_PASSWORD_HASH: &str =
    "$2a$10$5vm8wXaSdbuff0m9l21JdevzXBzJFPCi8sy6OOnpZMAG.fOXL7jvO";

/// Values file seeding the hub with its initial projects and applications
pub const DEFAULT_ARGOCD_INITIAL_OBJECTS_URL: &str = "https://raw.githubusercontent.com/pulumi/workshops/refs/heads/main/agentic-workflows-for-production-ready-kubernetes/gitops/hub/argocd/argocd-initial-objects.yaml";

/// Hub GitOps controller settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgoCdConfig {
    /// Namespace of the controller and of the cluster registry
    pub namespace: String,
    pub chart: String,
    pub apps_chart: String,
    /// Pinned chart version (both charts); latest when unset
    pub chart_version: Option<String>,
    pub admin_password_hash: String,
    pub initial_objects_url: String,
}

impl Default for ArgoCdConfig {
    fn default() -> Self {
        Self {
            namespace: "argocd".to_string(),
            chart: DEFAULT_ARGOCD_CHART.to_string(),
            apps_chart: DEFAULT_ARGOCD_APPS_CHART.to_string(),
            chart_version: None,
            admin_password_hash: DEFAULT_ARGOCD_ADMIN_PASSWORD_HASH.to_string(),
            initial_objects_url: DEFAULT_ARGOCD_INITIAL_OBJECTS_URL.to_string(),
        }
    }
}

/// Configuration of one declaration pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackConfig {
    pub project: String,
    pub stack: String,
    /// Value of the `Environment` default tag
    pub environment: String,
    /// Value of the `ManagedBy` default tag
    pub managed_by: String,
    /// Region used when a cluster does not name one
    pub default_region: String,
    /// Kubernetes version used when a cluster does not name one
    pub default_kubernetes_version: String,
    pub argocd: ArgoCdConfig,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            project: "multi-cloud-kubernetes".to_string(),
            stack: "dev".to_string(),
            environment: "dev".to_string(),
            managed_by: "Pulumi".to_string(),
            default_region: "us-east-1".to_string(),
            default_kubernetes_version: "1.28".to_string(),
            argocd: ArgoCdConfig::default(),
        }
    }
}

impl StackConfig {
    /// Load configuration from `MULTICLOUD_*` environment variables
    pub fn from_env() -> DeclarationResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup, then validate it
    ///
    /// Unset or empty keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> DeclarationResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: String| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or(default)
        };
        let defaults = Self::default();

        let config = Self {
            project: get("MULTICLOUD_PROJECT", defaults.project),
            stack: get("MULTICLOUD_STACK", defaults.stack),
            environment: get("MULTICLOUD_ENVIRONMENT", defaults.environment),
            managed_by: get("MULTICLOUD_MANAGED_BY", defaults.managed_by),
            default_region: get("MULTICLOUD_DEFAULT_REGION", defaults.default_region),
            default_kubernetes_version: get(
                "MULTICLOUD_KUBERNETES_VERSION",
                defaults.default_kubernetes_version,
            ),
            argocd: ArgoCdConfig {
                namespace: get("MULTICLOUD_ARGOCD_NAMESPACE", defaults.argocd.namespace),
                chart: get("MULTICLOUD_ARGOCD_CHART", defaults.argocd.chart),
                apps_chart: get("MULTICLOUD_ARGOCD_APPS_CHART", defaults.argocd.apps_chart),
                chart_version: lookup("MULTICLOUD_ARGOCD_CHART_VERSION")
                    .filter(|value| !value.trim().is_empty()),
                admin_password_hash: get(
                    "MULTICLOUD_ARGOCD_ADMIN_PASSWORD_HASH",
                    defaults.argocd.admin_password_hash,
                ),
                initial_objects_url: get(
                    "MULTICLOUD_ARGOCD_INITIAL_OBJECTS_URL",
                    defaults.argocd.initial_objects_url,
                ),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Rules
    /// - project, stack and default region are non-empty
    /// - the default Kubernetes version is `major.minor[.patch]`
    /// - the Argo CD namespace is a DNS label
    /// - chart references and the values file URL are non-empty
    /// - the admin password is a bcrypt hash
    pub fn validate(&self) -> DeclarationResult<()> {
        for (field, value) in [
            ("project", &self.project),
            ("stack", &self.stack),
            ("default_region", &self.default_region),
            ("argocd.chart", &self.argocd.chart),
            ("argocd.apps_chart", &self.argocd.apps_chart),
            ("argocd.initial_objects_url", &self.argocd.initial_objects_url),
        ] {
            if value.trim().is_empty() {
                return Err(DeclarationError::configuration(format!(
                    "{} cannot be empty",
                    field
                )));
            }
        }

        if !is_kubernetes_version(&self.default_kubernetes_version) {
            return Err(DeclarationError::configuration(format!(
                "invalid Kubernetes version: {}",
                self.default_kubernetes_version
            )));
        }

        if !is_dns_label(&self.argocd.namespace) {
            return Err(DeclarationError::configuration(format!(
                "invalid Argo CD namespace: {}",
                self.argocd.namespace
            )));
        }

        if !self.argocd.admin_password_hash.starts_with("$2") {
            return Err(DeclarationError::configuration(
                "Argo CD admin password must be a bcrypt hash",
            ));
        }

        Ok(())
    }

    /// Tags every provider applies to the resources it creates
    pub fn default_tags(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("ManagedBy".to_string(), self.managed_by.clone()),
            ("Project".to_string(), self.project.clone()),
            ("Environment".to_string(), self.environment.clone()),
        ])
    }
}

/// `major.minor` or `major.minor.patch`, all numeric
pub fn is_kubernetes_version(version: &str) -> bool {
    let parts: Vec<&str> = version.split('.').collect();
    (2..=3).contains(&parts.len())
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}

/// RFC 1123 label: lowercase alphanumerics and `-`, at most 63 characters
pub fn is_dns_label(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= 63
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !value.starts_with('-')
        && !value.ends_with('-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use test_case::test_case;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = StackConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.argocd.namespace, "argocd");
        assert_eq!(config.default_kubernetes_version, "1.28");
    }

    #[test]
    fn test_lookup_overrides_defaults() {
        let config = StackConfig::from_lookup(lookup_from(&[
            ("MULTICLOUD_STACK", "prod"),
            ("MULTICLOUD_DEFAULT_REGION", "eu-west-1"),
            ("MULTICLOUD_ARGOCD_CHART_VERSION", "7.7.0"),
            ("MULTICLOUD_PROJECT", ""),
        ]))
        .unwrap();

        assert_eq!(config.stack, "prod");
        assert_eq!(config.default_region, "eu-west-1");
        assert_eq!(config.argocd.chart_version.as_deref(), Some("7.7.0"));
        assert_eq!(config.project, "multi-cloud-kubernetes");
    }

    #[test]
    fn test_invalid_namespace_is_rejected() {
        let result = StackConfig::from_lookup(lookup_from(&[(
            "MULTICLOUD_ARGOCD_NAMESPACE",
            "Argo_CD",
        )]));
        assert!(matches!(result, Err(DeclarationError::Configuration(_))));
    }

    #[test]
    fn test_default_tags() {
        let tags = StackConfig::default().default_tags();
        assert_eq!(tags.get("ManagedBy").map(String::as_str), Some("Pulumi"));
        assert_eq!(tags.get("Project").map(String::as_str), Some("multi-cloud-kubernetes"));
        assert_eq!(tags.get("Environment").map(String::as_str), Some("dev"));
    }

    #[test_case("1.28", true ; "major minor")]
    #[test_case("1.33.5", true ; "with patch")]
    #[test_case("1", false ; "major only")]
    #[test_case("v1.28", false ; "prefixed")]
    #[test_case("1..2", false ; "empty part")]
    fn test_kubernetes_version(version: &str, valid: bool) {
        assert_eq!(is_kubernetes_version(version), valid);
    }
}
