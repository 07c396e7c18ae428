// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for declaration and provisioning operations

use thiserror::Error;

use crate::output::OutputError;
use crate::state_machine::TransitionError;

/// Errors that can occur while declaring or provisioning a resource graph
///
/// Every variant that concerns a specific resource carries its logical name so
/// the failure can be attributed to a single node of the graph.
#[derive(Debug, Error)]
pub enum DeclarationError {
    /// Missing or invalid arguments / configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Provider identifier not supported (non-fatal, reported as a warning)
    #[error("Unsupported provider {provider} for cluster {resource}")]
    UnsupportedProvider { provider: String, resource: String },

    /// A primitive resource could not be declared or created
    #[error("Failed to create resource {resource}: {reason}")]
    PrimitiveCreation { resource: String, reason: String },

    /// Spoke registration with its hub failed
    #[error("Failed to register cluster via {resource}: {reason}")]
    Registration { resource: String, reason: String },

    /// Two resources share a name under the same parent
    #[error("Duplicate resource name {name} under {parent}")]
    NameCollision { name: String, parent: String },

    /// The dependency graph contains a cycle
    #[error("Dependency cycle detected between: {}", .nodes.join(" -> "))]
    DependencyCycle { nodes: Vec<String> },

    /// Component outputs were registered more than once
    #[error("Outputs of component {component} registered more than once")]
    DuplicateOutputRegistration { component: String },

    /// A deferred value could not be resolved
    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for declaration operations
pub type DeclarationResult<T> = Result<T, DeclarationError>;

impl DeclarationError {
    /// Create a configuration error with the given message
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a primitive creation error for the named resource
    pub fn primitive(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PrimitiveCreation {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    /// Create a registration error for the named registry entry
    pub fn registration(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Registration {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error aborts the enclosing declaration pass
    ///
    /// Only an unsupported provider degrades to a warning.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::UnsupportedProvider { .. })
    }

    /// Name of the resource the failure is attributed to, if any
    pub fn resource(&self) -> Option<&str> {
        match self {
            Self::UnsupportedProvider { resource, .. }
            | Self::PrimitiveCreation { resource, .. }
            | Self::Registration { resource, .. } => Some(resource),
            Self::NameCollision { name, .. } => Some(name),
            Self::DuplicateOutputRegistration { component } => Some(component),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DeclarationError {
    fn from(err: serde_json::Error) -> Self {
        DeclarationError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for DeclarationError {
    fn from(err: serde_yaml::Error) -> Self {
        DeclarationError::Serialization(err.to_string())
    }
}

impl From<TransitionError> for DeclarationError {
    fn from(err: TransitionError) -> Self {
        DeclarationError::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_provider_is_not_fatal() {
        let err = DeclarationError::UnsupportedProvider {
            provider: "gcp".to_string(),
            resource: "edge".to_string(),
        };
        assert!(!err.is_fatal());
        assert_eq!(err.resource(), Some("edge"));
        assert!(err.to_string().contains("gcp"));
    }

    #[test]
    fn test_failures_are_attributed_to_named_resource() {
        let err = DeclarationError::primitive("hub-cluster", "quota exceeded");
        assert!(err.is_fatal());
        assert_eq!(err.resource(), Some("hub-cluster"));

        let err = DeclarationError::registration("spoke-kubeconfig-secret", "forbidden");
        assert!(err.is_fatal());
        assert_eq!(err.resource(), Some("spoke-kubeconfig-secret"));
        assert!(err.to_string().contains("forbidden"));
    }

    #[test]
    fn test_cycle_message_lists_nodes() {
        let err = DeclarationError::DependencyCycle {
            nodes: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        assert_eq!(err.to_string(), "Dependency cycle detected between: a -> b -> a");
        assert_eq!(err.resource(), None);
    }

    #[test]
    fn test_serde_errors_convert() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: DeclarationError = parse.unwrap_err().into();
        assert!(matches!(err, DeclarationError::Serialization(_)));
    }
}
