// Copyright (c) 2025 - Cowboy AI, Inc.
//! Provider Binding
//!
//! Selects and configures the cloud backend a cluster is created through.
//! Credentials are taken from the ambient environment by the engine; the
//! binding only fixes region/location and default tags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::context::StackContext;
use crate::errors::{DeclarationError, DeclarationResult};
use crate::graph::NodeId;
use crate::resource::aws::{AwsProvider, AwsProviderArgs};
use crate::resource::azure::{AzureProvider, AzureProviderArgs};
use crate::resource::{ResourceHandle, ResourceOptions};

/// Cloud provider identifier
///
/// Unknown identifiers are kept verbatim so that the component can report
/// them and degrade gracefully.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProviderId {
    Aws,
    Azure,
    Unsupported(String),
}

impl ProviderId {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Aws => "aws",
            Self::Azure => "azure",
            Self::Unsupported(other) => other,
        }
    }

    /// Value of the `clusterType` registry label
    pub fn cluster_type(&self) -> Option<&'static str> {
        match self {
            Self::Aws => Some("eks"),
            Self::Azure => Some("aks"),
            Self::Unsupported(_) => None,
        }
    }
}

impl From<&str> for ProviderId {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "aws" => Self::Aws,
            "azure" => Self::Azure,
            _ => Self::Unsupported(value.to_string()),
        }
    }
}

impl From<String> for ProviderId {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<ProviderId> for String {
    fn from(value: ProviderId) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for ProviderId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configured provider handle shared by every primitive beneath it
#[derive(Debug, Clone)]
pub enum ProviderHandle {
    Aws(AwsProvider),
    Azure(AzureProvider),
}

impl ProviderHandle {
    pub fn id(&self) -> NodeId {
        self.resource().id()
    }

    pub fn resource(&self) -> &ResourceHandle {
        match self {
            Self::Aws(provider) => provider.resource(),
            Self::Azure(provider) => provider.resource(),
        }
    }
}

/// Logical name of the provider node for a cluster
pub fn provider_resource_name(cluster: &str, provider: &ProviderId) -> String {
    format!("{}-{}-provider", cluster, provider)
}

/// Bind a provider for the named cluster
///
/// Returns `Ok(None)` after recording a warning when the provider is not
/// supported. Failure to declare a supported provider is fatal.
pub fn bind(
    ctx: &mut StackContext,
    provider: &ProviderId,
    cluster: &str,
    region: &str,
    component: NodeId,
) -> DeclarationResult<Option<ProviderHandle>> {
    let name = provider_resource_name(cluster, provider);
    let opts = ResourceOptions::new().parent(component);

    match provider {
        ProviderId::Aws => {
            let args = AwsProviderArgs::new(region, ctx.config().default_tags());
            let handle = ctx.register(&name, args, opts)?;
            Ok(Some(ProviderHandle::Aws(handle)))
        }
        ProviderId::Azure => {
            let args = AzureProviderArgs {
                location: region.to_string(),
            };
            let handle = ctx.register(&name, args, opts)?;
            Ok(Some(ProviderHandle::Azure(handle)))
        }
        ProviderId::Unsupported(other) => {
            let err = DeclarationError::UnsupportedProvider {
                provider: other.clone(),
                resource: cluster.to_string(),
            };
            ctx.warn(err.to_string(), Some(cluster));
            Ok(None)
        }
    }
}
