// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cluster Registry Entries
//!
//! A spoke registers with its hub by declaring a labeled secret in the hub's
//! registry namespace. The hub's GitOps controller discovers the secret by
//! label and connects to the spoke with the bearer token and CA it carries.
//!
//! # Entry Format
//!
//! ```text
//! metadata:
//!   name: <clusterName>
//!   namespace: argocd
//!   labels:
//!     argocd.argoproj.io/secret-type: cluster
//!     clusterType: eks | aks
//! stringData:
//!   name: <clusterName>
//!   server: <endpoint URL>
//!   clusterResources: "true"
//!   config: {"bearerToken": ..., "tlsClientConfig": {"caData": ..., "insecure": false}}
//! ```

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::{DeclarationError, DeclarationResult};
use crate::output::{Input, Output};
use crate::resource::kubernetes::{ClusterSecretArgs, ObjectMeta};

/// Label the controller selects registry entries by
pub const SECRET_TYPE_LABEL: &str = "argocd.argoproj.io/secret-type";

/// Value of [`SECRET_TYPE_LABEL`] on cluster entries
pub const SECRET_TYPE_CLUSTER: &str = "cluster";

/// Label carrying the managed-cluster flavour
pub const CLUSTER_TYPE_LABEL: &str = "clusterType";

/// Token secret contents that cannot become a connection document
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid base64 token: {0}")]
    InvalidToken(#[from] base64::DecodeError),

    #[error("connection config could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// TLS settings the hub uses to reach a spoke
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsClientConfig {
    /// Base64-encoded CA certificate
    pub ca_data: String,
    pub insecure: bool,
}

/// Connection document stored under `config`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConnectionConfig {
    /// Decoded service-account token
    pub bearer_token: String,
    pub tls_client_config: TlsClientConfig,
}

impl ClusterConnectionConfig {
    /// Build from a token secret's raw `data.token` and `data.ca.crt`
    pub fn from_token_secret(encoded_token: &str, ca_crt: &str) -> Result<Self, RegistryError> {
        Ok(Self {
            bearer_token: decode_bearer_token(encoded_token)?,
            tls_client_config: TlsClientConfig {
                ca_data: ca_crt.to_string(),
                insecure: false,
            },
        })
    }

    pub fn to_json(&self) -> Result<String, RegistryError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Decode a base64 token as stored in a secret's `data`
///
/// The token bytes are taken as they are; sequences that are not UTF-8
/// become U+FFFD rather than failing the registration.
pub fn decode_bearer_token(encoded: &str) -> Result<String, RegistryError> {
    let bytes = STANDARD.decode(encoded.trim())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Deferred `config` document joining token and CA
///
/// The result is secret: it carries the decoded bearer token.
pub fn connection_config(encoded_token: Output<String>, ca_crt: Output<String>) -> Output<String> {
    encoded_token
        .zip(ca_crt)
        .then(|(token, ca)| ClusterConnectionConfig::from_token_secret(&token, &ca)?.to_json())
        .secret()
}

/// Labels of a registry entry for a cluster flavour
pub fn registry_labels(cluster_type: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (SECRET_TYPE_LABEL.to_string(), SECRET_TYPE_CLUSTER.to_string()),
        (CLUSTER_TYPE_LABEL.to_string(), cluster_type.to_string()),
    ])
}

/// Declaration arguments of a registry entry
///
/// The entry is keyed by the cluster name both as object name and as the
/// `name` the controller displays.
pub fn registry_entry_args(
    cluster_name: Input<String>,
    cluster_type: &str,
    namespace: &str,
    server: Output<String>,
    config: Output<String>,
) -> ClusterSecretArgs {
    let mut metadata = ObjectMeta {
        name: Some(cluster_name.clone()),
        namespace: Some(namespace.to_string()),
        ..ObjectMeta::default()
    };
    for (key, value) in registry_labels(cluster_type) {
        metadata = metadata.with_label(key, value);
    }

    ClusterSecretArgs {
        metadata,
        string_data: BTreeMap::from([
            ("name".to_string(), cluster_name),
            ("server".to_string(), server.into()),
            ("clusterResources".to_string(), "true".into()),
            ("config".to_string(), config.into()),
        ]),
    }
}

/// Registry entry as read back from resolved `stringData`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterRegistryEntry {
    pub name: String,
    pub server: String,
    pub cluster_resources: bool,
    pub config: ClusterConnectionConfig,
}

impl ClusterRegistryEntry {
    /// Parse resolved string data
    pub fn from_string_data(data: &BTreeMap<String, String>) -> DeclarationResult<Self> {
        let field = |key: &str| {
            data.get(key).cloned().ok_or_else(|| {
                DeclarationError::configuration(format!("registry entry is missing {}", key))
            })
        };

        let cluster_resources = match field("clusterResources")?.as_str() {
            "true" => true,
            "false" => false,
            other => {
                return Err(DeclarationError::configuration(format!(
                    "clusterResources must be \"true\" or \"false\", got {}",
                    other
                )))
            }
        };

        Ok(Self {
            name: field("name")?,
            server: field("server")?,
            cluster_resources,
            config: serde_json::from_str(&field("config")?)?,
        })
    }
}
