// Copyright (c) 2025 - Cowboy AI, Inc.
//! Kubernetes primitives declared through a cluster-API provider
//!
//! # Resources
//!
//! | Args                      | Kind              | Type token                                         |
//! |---------------------------|-------------------|----------------------------------------------------|
//! | `KubernetesProviderArgs`  | Provider          | `pulumi:providers:kubernetes`                      |
//! | `ServiceAccountArgs`      | Identity          | `kubernetes:core/v1:ServiceAccount`                |
//! | `ServiceAccountTokenArgs` | Credential        | `kubernetes:core/v1:Secret`                        |
//! | `ClusterRoleArgs`         | PermissionRole    | `kubernetes:rbac.authorization.k8s.io/v1:ClusterRole` |
//! | `ClusterRoleBindingArgs`  | PermissionBinding | `kubernetes:rbac.authorization.k8s.io/v1:ClusterRoleBinding` |
//! | `HelmReleaseArgs`         | AddOn             | `kubernetes:helm.sh/v3:Release`                    |
//! | `ClusterSecretArgs`       | RegistryEntry     | `kubernetes:core/v1:Secret`                        |

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use super::ResourceArgs;
use crate::errors::DeclarationResult;
use crate::graph::PrimitiveKind;
use crate::output::{all, Input, Inputs, Output};

/// Secret type of service-account token secrets
pub const SERVICE_ACCOUNT_TOKEN_TYPE: &str = "kubernetes.io/service-account-token";

/// Annotation binding a token secret to its service account
pub const SERVICE_ACCOUNT_NAME_ANNOTATION: &str = "kubernetes.io/service-account.name";

/// API group of RBAC objects
pub const RBAC_API_GROUP: &str = "rbac.authorization.k8s.io";

/// Join a map of string inputs into one deferred map
fn join_strings(entries: BTreeMap<String, Input<String>>) -> Output<BTreeMap<String, String>> {
    all(entries
        .into_iter()
        .map(|(key, value)| value.into_output().map(move |value| (key.clone(), value)))
        .collect())
    .map(|pairs| pairs.into_iter().collect())
}

/// Object metadata
#[derive(Debug, Clone, Default)]
pub struct ObjectMeta {
    pub name: Option<Input<String>>,
    pub namespace: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, Input<String>>,
}

impl ObjectMeta {
    /// Cluster-scoped object with a fixed name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(Input::Value(name.into())),
            ..Self::default()
        }
    }

    /// Namespaced object with a fixed name
    pub fn namespaced(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            ..Self::named(name)
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: Input<String>) -> Self {
        self.annotations.insert(key.into(), value);
        self
    }

    fn into_output(self) -> Output<Value> {
        let name = match self.name {
            Some(name) => name.into_output().map(Some),
            None => Output::known(None),
        };
        let namespace = self.namespace;
        let labels = self.labels;

        name.zip(join_strings(self.annotations))
            .map(move |(name, annotations)| {
                let mut meta = Map::new();
                if let Some(name) = name {
                    meta.insert("name".to_string(), json!(name));
                }
                if let Some(namespace) = &namespace {
                    meta.insert("namespace".to_string(), json!(namespace));
                }
                if !labels.is_empty() {
                    meta.insert("labels".to_string(), json!(labels));
                }
                if !annotations.is_empty() {
                    meta.insert("annotations".to_string(), json!(annotations));
                }
                Value::Object(meta)
            })
    }
}

/// Kubernetes provider arguments
#[derive(Debug, Clone)]
pub struct KubernetesProviderArgs {
    /// Kubeconfig document; `None` falls back to the ambient configuration
    pub kubeconfig: Output<Option<String>>,
}

resource_handle!(
    /// Configured cluster-API provider
    KubernetesProvider
);

impl ResourceArgs for KubernetesProviderArgs {
    type Handle = KubernetesProvider;
    const TYPE_TOKEN: &'static str = "pulumi:providers:kubernetes";
    const KIND: PrimitiveKind = PrimitiveKind::Provider;

    fn into_inputs(self) -> DeclarationResult<Inputs> {
        Inputs::new().with::<Option<String>>("kubeconfig", self.kubeconfig.secret())
    }
}

/// Service account arguments
#[derive(Debug, Clone)]
pub struct ServiceAccountArgs {
    pub metadata: ObjectMeta,
}

resource_handle!(
    /// Declared service account
    ServiceAccount
);

impl ServiceAccount {
    pub fn name(&self) -> Output<String> {
        self.resource.output("metadata.name")
    }
}

impl ResourceArgs for ServiceAccountArgs {
    type Handle = ServiceAccount;
    const TYPE_TOKEN: &'static str = "kubernetes:core/v1:ServiceAccount";
    const KIND: PrimitiveKind = PrimitiveKind::Identity;

    fn into_inputs(self) -> DeclarationResult<Inputs> {
        Ok(Inputs::new().with_output("metadata", self.metadata.into_output()))
    }
}

/// Long-lived token secret of a service account
#[derive(Debug, Clone)]
pub struct ServiceAccountTokenArgs {
    pub metadata: ObjectMeta,
}

impl ServiceAccountTokenArgs {
    /// Token secret bound to `account`
    pub fn for_account(metadata: ObjectMeta, account: &ServiceAccount) -> Self {
        Self {
            metadata: metadata
                .with_annotation(SERVICE_ACCOUNT_NAME_ANNOTATION, account.name().into()),
        }
    }
}

resource_handle!(
    /// Declared service-account token secret
    ServiceAccountToken
);

impl ServiceAccountToken {
    /// Base64-encoded bearer token (`data.token`)
    pub fn token(&self) -> Output<String> {
        self.resource.output::<String>("data.token").secret()
    }

    /// CA certificate of the cluster (`data.ca.crt`)
    pub fn ca_crt(&self) -> Output<String> {
        self.resource.output::<String>("data.ca.crt").secret()
    }
}

impl ResourceArgs for ServiceAccountTokenArgs {
    type Handle = ServiceAccountToken;
    const TYPE_TOKEN: &'static str = "kubernetes:core/v1:Secret";
    const KIND: PrimitiveKind = PrimitiveKind::Credential;

    fn into_inputs(self) -> DeclarationResult<Inputs> {
        Ok(Inputs::new()
            .with_output("metadata", self.metadata.into_output())
            .with_value("type", json!(SERVICE_ACCOUNT_TOKEN_TYPE)))
    }
}

/// One RBAC policy rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRule {
    pub api_groups: Vec<String>,
    pub resources: Vec<String>,
    pub verbs: Vec<String>,
}

impl PolicyRule {
    /// Every verb on every resource of every API group
    pub fn all() -> Self {
        let any = vec!["*".to_string()];
        Self {
            api_groups: any.clone(),
            resources: any.clone(),
            verbs: any,
        }
    }
}

/// Cluster role arguments
#[derive(Debug, Clone)]
pub struct ClusterRoleArgs {
    pub metadata: ObjectMeta,
    pub rules: Vec<PolicyRule>,
}

resource_handle!(
    /// Declared cluster role
    ClusterRole
);

impl ClusterRole {
    pub fn name(&self) -> Output<String> {
        self.resource.output("metadata.name")
    }
}

impl ResourceArgs for ClusterRoleArgs {
    type Handle = ClusterRole;
    const TYPE_TOKEN: &'static str = "kubernetes:rbac.authorization.k8s.io/v1:ClusterRole";
    const KIND: PrimitiveKind = PrimitiveKind::PermissionRole;

    fn into_inputs(self) -> DeclarationResult<Inputs> {
        Ok(Inputs::new()
            .with_output("metadata", self.metadata.into_output())
            .with_value("rules", serde_json::to_value(&self.rules)?))
    }
}

/// Subject of a role binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub kind: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl Subject {
    pub fn service_account(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            kind: "ServiceAccount".to_string(),
            name: name.into(),
            namespace: Some(namespace.into()),
        }
    }
}

/// Cluster role binding arguments
#[derive(Debug, Clone)]
pub struct ClusterRoleBindingArgs {
    pub metadata: ObjectMeta,
    /// Name of the bound cluster role
    pub role_ref: Input<String>,
    pub subjects: Vec<Subject>,
}

impl ClusterRoleBindingArgs {
    /// Bind `role` to the given subjects
    pub fn bind(metadata: ObjectMeta, role: &ClusterRole, subjects: Vec<Subject>) -> Self {
        Self {
            metadata,
            role_ref: role.name().into(),
            subjects,
        }
    }
}

resource_handle!(
    /// Declared cluster role binding
    ClusterRoleBinding
);

impl ResourceArgs for ClusterRoleBindingArgs {
    type Handle = ClusterRoleBinding;
    const TYPE_TOKEN: &'static str = "kubernetes:rbac.authorization.k8s.io/v1:ClusterRoleBinding";
    const KIND: PrimitiveKind = PrimitiveKind::PermissionBinding;

    fn into_inputs(self) -> DeclarationResult<Inputs> {
        let role_ref = self.role_ref.into_output().map(|name| {
            json!({
                "apiGroup": RBAC_API_GROUP,
                "kind": "ClusterRole",
                "name": name,
            })
        });

        Ok(Inputs::new()
            .with_output("metadata", self.metadata.into_output())
            .with_output("roleRef", role_ref)
            .with_value("subjects", serde_json::to_value(&self.subjects)?))
    }
}

/// Helm release arguments
#[derive(Debug, Clone)]
pub struct HelmReleaseArgs {
    /// Release name
    pub name: String,
    /// Chart reference (repository name or `oci://` URL)
    pub chart: String,
    pub version: Option<String>,
    pub namespace: Input<String>,
    pub create_namespace: bool,
    /// Inline chart values
    pub values: Value,
    /// Remote values files, applied before inline values
    pub value_yaml_files: Vec<String>,
}

impl HelmReleaseArgs {
    /// Release of `chart` into `namespace` with no values
    pub fn new(name: impl Into<String>, chart: impl Into<String>, namespace: Input<String>) -> Self {
        Self {
            name: name.into(),
            chart: chart.into(),
            version: None,
            namespace,
            create_namespace: false,
            values: json!({}),
            value_yaml_files: Vec::new(),
        }
    }
}

resource_handle!(
    /// Declared Helm release
    HelmRelease
);

impl HelmRelease {
    /// Namespace the release was installed into
    pub fn status_namespace(&self) -> Output<String> {
        self.resource.output("status.namespace")
    }
}

impl ResourceArgs for HelmReleaseArgs {
    type Handle = HelmRelease;
    const TYPE_TOKEN: &'static str = "kubernetes:helm.sh/v3:Release";
    const KIND: PrimitiveKind = PrimitiveKind::AddOn;

    fn into_inputs(self) -> DeclarationResult<Inputs> {
        let value_files: Vec<Value> = self
            .value_yaml_files
            .iter()
            .map(|url| json!({ "remoteAsset": url }))
            .collect();

        let inputs = Inputs::new()
            .with_value("name", json!(self.name))
            .with_value("chart", json!(self.chart))
            .with::<String>("namespace", self.namespace)?
            .with_value("createNamespace", json!(self.create_namespace))
            .with_value("values", self.values)
            .with_value("valueYamlFiles", Value::Array(value_files));

        Ok(match self.version {
            Some(version) => inputs.with_value("version", json!(version)),
            None => inputs,
        })
    }
}

/// Opaque secret carrying string data
#[derive(Debug, Clone)]
pub struct ClusterSecretArgs {
    pub metadata: ObjectMeta,
    pub string_data: BTreeMap<String, Input<String>>,
}

resource_handle!(
    /// Declared secret in a hub's cluster registry
    ClusterSecret
);

impl ClusterSecret {
    pub fn name(&self) -> Output<String> {
        self.resource.output("metadata.name")
    }
}

impl ResourceArgs for ClusterSecretArgs {
    type Handle = ClusterSecret;
    const TYPE_TOKEN: &'static str = "kubernetes:core/v1:Secret";
    const KIND: PrimitiveKind = PrimitiveKind::RegistryEntry;

    fn into_inputs(self) -> DeclarationResult<Inputs> {
        let string_data = join_strings(self.string_data).map(|data| json!(data));
        Ok(Inputs::new()
            .with_output("metadata", self.metadata.into_output())
            .with_output("stringData", string_data))
    }
}
