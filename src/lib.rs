//! Multi-cloud Kubernetes composition for hub/spoke topologies
//!
//! This crate declares cluster topologies as a dependency-ordered resource
//! graph: provider bindings, network and managed-cluster primitives, a
//! composite cluster component, hub add-ons and spoke registration. The
//! resulting plan is handed to a provisioning engine.

pub mod cluster;
pub mod config;
pub mod context;
pub mod engine;
pub mod errors;
pub mod graph;
pub mod kubeconfig;
pub mod output;
pub mod provider;
pub mod registry;
pub mod resource;
pub mod stack;
pub mod state_machine;
pub mod topology;

// Re-export commonly used types
pub use cluster::{ClusterConnection, ClusterRole, KubernetesCluster, KubernetesClusterArgs};
pub use config::StackConfig;
pub use context::{Diagnostic, Severity, StackContext};
pub use engine::{DeclarationPlan, Deployment, ProvisioningEngine};
pub use errors::{DeclarationError, DeclarationResult};
pub use output::{Input, Output};
pub use provider::ProviderId;
pub use resource::ResourceOptions;
pub use stack::StackReference;
