// Copyright (c) 2025 - Cowboy AI, Inc.
//! Declaration Graph
//!
//! Every resource declared during a pass becomes a [`ResourceNode`] in an
//! arena ([`DeclarationGraph`]). Ownership and ordering are separate
//! relations:
//!
//! - **Ownership**: a component owns its children (`parent` / `children`).
//!   A node has at most one parent; ownership never implies ordering.
//! - **Ordering**: [`DependencyEdge`]s, either declared explicitly
//!   (`depends_on`), implied by consuming another node's output, or implied
//!   by creating the node through a provider.
//!
//! ```text
//! KubernetesCluster (component)
//!  ├── hub-aws-provider ◄──────┐ provider
//!  ├── hub-vpc ◄───────────────┤
//!  ├── hub-cluster ────────────┘ input (vpcId)
//!  ├── hub-k8s-provider ◄── input (kubeconfigJson)
//!  ├── hub-argocd
//!  └── hub-argocd-apps ─── explicit ──► hub-argocd
//! ```
//!
//! The ordering relation must be acyclic; see [`invariants`].

pub mod arena;
pub mod invariants;
pub mod node;

pub use arena::DeclarationGraph;
pub use node::{DependencyEdge, EdgeKind, NodeId, PrimitiveKind, ResourceNode};
